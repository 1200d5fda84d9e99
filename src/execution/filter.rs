use crate::{
    error::TinyError,
    execution::OpIterator,
    predicate::Predicate,
    storage::{Tuple, TupleDesc},
    types::TinyResult,
};

/// Emit exactly the child tuples that satisfy the predicate.
pub struct Filter {
    predicate: Predicate,
    child: Box<dyn OpIterator>,
    pending: Option<Tuple>,
    opened: bool,
}

impl Filter {
    pub fn new(predicate: Predicate, child: Box<dyn OpIterator>) -> Self {
        Self {
            predicate,
            child,
            pending: None,
            opened: false,
        }
    }

    fn read_next(&mut self) -> Result<Option<Tuple>, TinyError> {
        while let Some(tuple) = self.child.next()? {
            if self.predicate.matches(&tuple) {
                return Ok(Some(tuple));
            }
        }
        Ok(None)
    }
}

impl OpIterator for Filter {
    fn open(&mut self) -> TinyResult {
        self.child.open()?;
        self.opened = true;
        self.pending = None;
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool, TinyError> {
        if !self.opened {
            return Err(TinyError::new("operator is not open"));
        }
        if self.pending.is_none() {
            self.pending = self.read_next()?;
        }
        Ok(self.pending.is_some())
    }

    fn next(&mut self) -> Result<Option<Tuple>, TinyError> {
        if !self.has_next()? {
            return Ok(None);
        }
        Ok(self.pending.take())
    }

    fn rewind(&mut self) -> TinyResult {
        self.child.rewind()?;
        self.pending = None;
        Ok(())
    }

    fn close(&mut self) -> TinyResult {
        self.opened = false;
        self.pending = None;
        self.child.close()
    }

    fn get_tuple_desc(&self) -> &TupleDesc {
        self.child.get_tuple_desc()
    }
}
