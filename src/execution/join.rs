use crate::{
    error::TinyError,
    execution::OpIterator,
    predicate::JoinPredicate,
    storage::{Tuple, TupleDesc},
    types::TinyResult,
};

/// Nested-loop join: for every left tuple, rewind the right child and
/// emit the concatenation of every matching pair.
pub struct Join {
    predicate: JoinPredicate,
    left: Box<dyn OpIterator>,
    right: Box<dyn OpIterator>,

    tuple_desc: TupleDesc,

    current_left: Option<Tuple>,
    pending: Option<Tuple>,
    opened: bool,
}

impl Join {
    pub fn new(
        predicate: JoinPredicate,
        left: Box<dyn OpIterator>,
        right: Box<dyn OpIterator>,
    ) -> Self {
        let tuple_desc = TupleDesc::merge(left.get_tuple_desc(), right.get_tuple_desc());
        Self {
            predicate,
            left,
            right,
            tuple_desc,
            current_left: None,
            pending: None,
            opened: false,
        }
    }

    fn read_next(&mut self) -> Result<Option<Tuple>, TinyError> {
        loop {
            if self.current_left.is_none() {
                self.current_left = self.left.next()?;
                if self.current_left.is_none() {
                    return Ok(None);
                }
            }

            // the borrow checker wants the left tuple cloned out before
            // the right child is advanced
            let left_tuple = self.current_left.clone().unwrap();
            while let Some(right_tuple) = self.right.next()? {
                if self.predicate.matches(&left_tuple, &right_tuple) {
                    return Ok(Some(Tuple::merge(&left_tuple, &right_tuple)));
                }
            }

            // right child exhausted for this left tuple
            self.current_left = None;
            self.right.rewind()?;
        }
    }
}

impl OpIterator for Join {
    fn open(&mut self) -> TinyResult {
        self.left.open()?;
        if let Err(e) = self.right.open() {
            let _ = self.left.close();
            return Err(e);
        }
        self.opened = true;
        self.current_left = None;
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
        self.left.rewind()?;
        self.right.rewind()?;
        self.current_left = None;
        self.pending = None;
        Ok(())
    }

    fn close(&mut self) -> TinyResult {
        self.opened = false;
        self.current_left = None;
        self.pending = None;

        let left_result = self.left.close();
        let right_result = self.right.close();
        left_result.and(right_result)
    }

    fn get_tuple_desc(&self) -> &TupleDesc {
        &self.tuple_desc
    }
}
