use std::{collections::HashMap, sync::Arc};

use log::debug;

use crate::{
    database::Database,
    error::TinyError,
    execution::{OpIterator, SeqScan},
    optimizer::{IntHistogram, StringHistogram},
    predicate::Op,
    storage::{Field, Type},
    transaction::Transaction,
    utils::HandyRwLock,
};

/// Default number of bins per histogram.
pub const NUM_HIST_BINS: usize = 100;

/// Per-table statistics: one histogram per column plus the page count,
/// feeding the scan-cost and cardinality estimates of a plan chooser.
pub struct TableStats {
    io_cost_per_page: usize,
    num_pages: usize,
    total_tuples: usize,

    int_histograms: HashMap<usize, IntHistogram>,
    string_histograms: HashMap<usize, StringHistogram>,
}

impl TableStats {
    /// Build the statistics with two scans of the table: the first
    /// finds per-column extremes and the tuple count, the second fills
    /// the histograms.
    pub fn new(db: &Arc<Database>, table_id: u32, io_cost_per_page: usize) -> Result<Self, TinyError> {
        let tx = Transaction::new();
        let result = Self::build(db, &tx, table_id, io_cost_per_page);
        tx.commit(db)?;
        result
    }

    fn build(
        db: &Arc<Database>,
        tx: &Transaction,
        table_id: u32,
        io_cost_per_page: usize,
    ) -> Result<Self, TinyError> {
        let tuple_desc = db.catalog().get_tuple_desc(&table_id)?;
        let num_pages = {
            let table_rc = db.catalog().get_table(&table_id)?;
            let n = table_rc.rl().num_pages();
            n
        };

        let mut scan = SeqScan::new(db.clone(), tx, table_id, "stats")?;
        scan.open()?;

        // pass 1: per-column extremes and the tuple count
        let mut mins: HashMap<usize, i32> = HashMap::new();
        let mut maxs: HashMap<usize, i32> = HashMap::new();
        let mut total_tuples = 0;

        while let Some(tuple) = scan.next()? {
            total_tuples += 1;
            for (i, item) in tuple_desc.get_fields().iter().enumerate() {
                if item.field_type == Type::Int {
                    let v = tuple.get_cell(i).get_int()?;
                    let min = mins.entry(i).or_insert(v);
                    *min = (*min).min(v);
                    let max = maxs.entry(i).or_insert(v);
                    *max = (*max).max(v);
                }
            }
        }

        // every column gets a histogram, even over an empty table
        let mut int_histograms = HashMap::new();
        let mut string_histograms = HashMap::new();
        for (i, item) in tuple_desc.get_fields().iter().enumerate() {
            match item.field_type {
                Type::Int => {
                    let min = mins.get(&i).copied().unwrap_or(0);
                    let max = maxs.get(&i).copied().unwrap_or(0);
                    int_histograms.insert(i, IntHistogram::new(NUM_HIST_BINS, min, max));
                }
                Type::Str => {
                    string_histograms.insert(i, StringHistogram::new(NUM_HIST_BINS));
                }
            }
        }

        // pass 2: fill the histograms
        scan.rewind()?;
        while let Some(tuple) = scan.next()? {
            for (i, item) in tuple_desc.get_fields().iter().enumerate() {
                match item.field_type {
                    Type::Int => {
                        if let Some(hist) = int_histograms.get_mut(&i) {
                            hist.add_value(tuple.get_cell(i).get_int()?);
                        }
                    }
                    Type::Str => {
                        if let Some(hist) = string_histograms.get_mut(&i) {
                            hist.add_value(&tuple.get_cell(i).get_string()?);
                        }
                    }
                }
            }
        }
        scan.close()?;

        debug!(
            "table stats built, table: {}, tuples: {}, pages: {}",
            table_id, total_tuples, num_pages
        );

        Ok(Self {
            io_cost_per_page,
            num_pages,
            total_tuples,
            int_histograms,
            string_histograms,
        })
    }

    /// Cost of a full sequential scan: one io charge per page.
    pub fn estimate_scan_cost(&self) -> f64 {
        (self.num_pages * self.io_cost_per_page) as f64
    }

    /// Number of tuples a predicate with the given selectivity keeps.
    pub fn estimate_table_cardinality(&self, selectivity: f64) -> usize {
        (self.total_tuples as f64 * selectivity).round() as usize
    }

    pub fn total_tuples(&self) -> usize {
        self.total_tuples
    }

    /// Selectivity of `column op constant` against the column's
    /// histogram.
    pub fn estimate_selectivity(
        &self,
        field: usize,
        op: &Op,
        constant: &Field,
    ) -> Result<f64, TinyError> {
        match constant {
            Field::Int(v) => self
                .int_histograms
                .get(&field)
                .map(|hist| hist.estimate_selectivity(op, *v))
                .ok_or_else(|| TinyError::not_found(&format!("no int histogram for field {}", field))),
            Field::Str(s) => self
                .string_histograms
                .get(&field)
                .map(|hist| hist.estimate_selectivity(op, s))
                .ok_or_else(|| {
                    TinyError::not_found(&format!("no string histogram for field {}", field))
                }),
        }
    }

    pub fn avg_selectivity(&self, field: usize) -> Result<f64, TinyError> {
        if let Some(hist) = self.int_histograms.get(&field) {
            return Ok(hist.avg_selectivity());
        }
        if let Some(hist) = self.string_histograms.get(&field) {
            return Ok(hist.avg_selectivity());
        }
        Err(TinyError::not_found(&format!(
            "no histogram for field {}",
            field
        )))
    }
}
