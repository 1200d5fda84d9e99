use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, RwLock,
};

use rand::prelude::*;
use tiny_db::{
    error::TinyError,
    execution::OpIterator,
    storage::{Field, HeapPage, HeapPageID, HeapTable, Tuple, TupleDesc},
    types::{Pod, TinyResult},
    utils, Database,
};

static SEQ: AtomicU32 = AtomicU32::new(0);

/// Build a fresh, isolated database instance under ./data. Every test
/// gets its own directory, so tests can run in parallel.
pub fn setup() -> Arc<Database> {
    utils::init_log();

    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    let path = format!("data/test_{}_{}", std::process::id(), seq);

    // stale directories from an earlier run must not leak tables in
    let _ = std::fs::remove_dir_all(&path);

    Arc::new(Database::new(&path).unwrap())
}

/// Create a table with the given int rows, written page by page
/// straight to disk, and register it in the catalog.
pub fn create_heap_table(
    db: &Arc<Database>,
    columns: usize,
    cells: &[Vec<i32>],
) -> Pod<HeapTable> {
    let tuple_desc = TupleDesc::small_int_desc(columns);

    let seq = SEQ.fetch_add(1, Ordering::Relaxed);
    let file_path = db.get_path().join(format!("table_{}.dat", seq));
    let table = HeapTable::new(
        file_path.to_str().unwrap(),
        &format!("table_{}", seq),
        "int-column-0",
        &tuple_desc,
    )
    .unwrap();
    let table_id = table.get_id();

    let slots = HeapPage::calculate_slots_count(&tuple_desc);
    for (page_index, chunk) in cells.chunks(slots).enumerate() {
        let pid = HeapPageID::new(table_id, page_index);
        let mut page = HeapPage::new(&pid, &HeapPage::empty_page_data(), &tuple_desc).unwrap();
        for row in chunk {
            let fields: Vec<Field> = row.iter().map(|v| Field::Int(*v)).collect();
            page.insert_tuple(&Tuple::new(&tuple_desc, &fields)).unwrap();
        }
        table.write_page_to_disk(&pid, &page.get_page_data()).unwrap();
    }

    let table_rc = Arc::new(RwLock::new(table));
    db.mut_catalog().add_table(table_rc.clone());
    table_rc
}

/// Create a table filled with random values. The generated rows are
/// returned through `cells` for later comparison.
pub fn create_random_heap_table(
    db: &Arc<Database>,
    columns: usize,
    rows: usize,
    cells: &mut Vec<Vec<i32>>,
) -> Pod<HeapTable> {
    let mut rng = rand::thread_rng();
    for _ in 0..rows {
        let mut row = Vec::with_capacity(columns);
        for _ in 0..columns {
            row.push(rng.gen_range(-10000, 10000));
        }
        cells.push(row);
    }

    create_heap_table(db, columns, cells)
}

/// An operator over an in-memory list of tuples, used as a child where
/// a test wants full control over the input.
pub struct TupleList {
    tuple_desc: TupleDesc,
    tuples: Vec<Tuple>,
    cursor: usize,
    opened: bool,
}

impl TupleList {
    pub fn new(tuple_desc: TupleDesc, tuples: Vec<Tuple>) -> Self {
        Self {
            tuple_desc,
            tuples,
            cursor: 0,
            opened: false,
        }
    }
}

impl OpIterator for TupleList {
    fn open(&mut self) -> TinyResult {
        self.cursor = 0;
        self.opened = true;
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool, TinyError> {
        Ok(self.opened && self.cursor < self.tuples.len())
    }

    fn next(&mut self) -> Result<Option<Tuple>, TinyError> {
        if !self.has_next()? {
            return Ok(None);
        }
        let tuple = self.tuples[self.cursor].clone();
        self.cursor += 1;
        Ok(Some(tuple))
    }

    fn rewind(&mut self) -> TinyResult {
        self.cursor = 0;
        Ok(())
    }

    fn close(&mut self) -> TinyResult {
        self.opened = false;
        Ok(())
    }

    fn get_tuple_desc(&self) -> &TupleDesc {
        &self.tuple_desc
    }
}

/// Drain an operator into a vector.
pub fn collect_all(op: &mut dyn OpIterator) -> Vec<Tuple> {
    let mut tuples = Vec::new();
    while let Some(tuple) = op.next().unwrap() {
        tuples.push(tuple);
    }
    tuples
}
