use crate::{
    error::TinyError,
    execution::OpIterator,
    storage::{Tuple, TupleDesc},
    types::TinyResult,
};

/// Sort the child's output by one field. The child is drained and
/// materialized on `open`.
pub struct OrderBy {
    child: Box<dyn OpIterator>,
    order_by_field: usize,
    asc: bool,

    tuples: Vec<Tuple>,
    cursor: usize,
    opened: bool,
}

impl OrderBy {
    pub fn new(child: Box<dyn OpIterator>, order_by_field: usize, asc: bool) -> Self {
        Self {
            child,
            order_by_field,
            asc,
            tuples: Vec::new(),
            cursor: 0,
            opened: false,
        }
    }

    fn build(&mut self) -> TinyResult {
        self.tuples.clear();
        while let Some(tuple) = self.child.next()? {
            self.tuples.push(tuple);
        }

        let field = self.order_by_field;
        self.tuples
            .sort_by(|a, b| a.get_cell(field).cmp(&b.get_cell(field)));
        if !self.asc {
            self.tuples.reverse();
        }
        Ok(())
    }
}

impl OpIterator for OrderBy {
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
        Ok(self.cursor < self.tuples.len())
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
        self.tuples.clear();
        self.cursor = 0;
        self.child.close()
    }

    fn get_tuple_desc(&self) -> &TupleDesc {
        self.child.get_tuple_desc()
    }
}
