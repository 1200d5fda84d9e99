use crate::{
    error::TinyError,
    execution::{
        aggregator::{AggregateOp, Aggregator, IntegerAggregator, StringAggregator},
        OpIterator,
    },
    storage::{Field, FieldItem, Tuple, TupleDesc, Type},
    types::TinyResult,
};

/// Aggregation operator. On `open` it drains the child into an
/// aggregator and materializes the output, so `rewind` only resets a
/// cursor.
pub struct Aggregate {
    child: Box<dyn OpIterator>,
    a_field: usize,
    g_field: Option<usize>,
    op: AggregateOp,

    tuple_desc: TupleDesc,

    results: Vec<Tuple>,
    cursor: usize,
    opened: bool,
}

impl Aggregate {
    pub fn new(
        child: Box<dyn OpIterator>,
        a_field: usize,
        g_field: Option<usize>,
        op: AggregateOp,
    ) -> Result<Self, TinyError> {
        let child_desc = child.get_tuple_desc();

        // A string aggregate column restricts the operation set, fail
        // at construction rather than at open.
        if child_desc.get_field_type(a_field)? == Type::Str && op != AggregateOp::Count {
            return Err(TinyError::unsupported(&format!(
                "string aggregator only supports COUNT, got {}",
                op
            )));
        }

        let a_name = child_desc
            .get_field_name(a_field)?
            .unwrap_or_else(|| "null".to_string());
        let agg_item = FieldItem::new(Type::Int, &format!("{} ({})", op, a_name));

        let tuple_desc = match g_field {
            None => TupleDesc::new(vec![agg_item]),
            Some(g) => {
                let g_type = child_desc.get_field_type(g)?;
                let g_name = child_desc
                    .get_field_name(g)?
                    .unwrap_or_else(|| "null".to_string());
                TupleDesc::new(vec![FieldItem::new(g_type, &g_name), agg_item])
            }
        };

        Ok(Self {
            child,
            a_field,
            g_field,
            op,
            tuple_desc,
            results: Vec::new(),
            cursor: 0,
            opened: false,
        })
    }

    /// The name of the aggregate column, derived from the aggregate
    /// field index against the child schema.
    pub fn aggregate_field_name(&self) -> Result<Option<String>, TinyError> {
        self.child.get_tuple_desc().get_field_name(self.a_field)
    }

    pub fn group_field_name(&self) -> Result<Option<String>, TinyError> {
        match self.g_field {
            Some(g) => self.child.get_tuple_desc().get_field_name(g),
            None => Ok(None),
        }
    }

    fn build(&mut self) -> TinyResult {
        let a_type = self.child.get_tuple_desc().get_field_type(self.a_field)?;
        let mut aggregator: Box<dyn Aggregator> = match a_type {
            Type::Int => Box::new(IntegerAggregator::new(self.g_field, self.a_field, self.op)),
            Type::Str => Box::new(StringAggregator::new(self.g_field, self.a_field, self.op)?),
        };

        while let Some(tuple) = self.child.next()? {
            aggregator.merge(&tuple)?;
        }

        self.results = match self.g_field {
            None => {
                // Exactly one output tuple, even for an empty input.
                // The value for an empty MIN/MAX/AVG is unspecified;
                // this engine emits 0, callers must not rely on it.
                let value = aggregator
                    .results()
                    .pop()
                    .map(|(_, v)| v)
                    .unwrap_or(0);
                vec![Tuple::new(&self.tuple_desc, &[Field::Int(value)])]
            }
            Some(_) => aggregator
                .results()
                .into_iter()
                .filter_map(|(group, value)| {
                    group.map(|g| Tuple::new(&self.tuple_desc, &[g, Field::Int(value)]))
                })
                .collect(),
        };

        Ok(())
    }
}

impl OpIterator for Aggregate {
    fn open(&mut self) -> TinyResult {
        self.child.open()?;
        if let Err(e) = self.build() {
            let _ = self.child.close();
            return Err(e);
        }
        self.cursor = 0;
        self.opened = true;
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool, TinyError> {
        if !self.opened {
            return Err(TinyError::new("operator is not open"));
        }
        Ok(self.cursor < self.results.len())
    }

    fn next(&mut self) -> Result<Option<Tuple>, TinyError> {
        if !self.has_next()? {
            return Ok(None);
        }
        let tuple = self.results[self.cursor].clone();
        self.cursor += 1;
        Ok(Some(tuple))
    }

    fn rewind(&mut self) -> TinyResult {
        // the output is materialized, restarting is a cursor reset
        self.cursor = 0;
        Ok(())
    }

    fn close(&mut self) -> TinyResult {
        self.opened = false;
        self.results.clear();
        self.cursor = 0;
        self.child.close()
    }

    fn get_tuple_desc(&self) -> &TupleDesc {
        &self.tuple_desc
    }
}
