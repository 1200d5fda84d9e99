use std::sync::Arc;

use crate::{
    buffer_pool::BufferPool,
    database::Database,
    error::TinyError,
    execution::OpIterator,
    storage::{Field, FieldItem, Tuple, TupleDesc, Type},
    transaction::Transaction,
    types::TinyResult,
};

/// Drain the child and delete every tuple it produces, emitting a
/// single one-field tuple with the number of deleted records. The
/// target table is implied by each tuple's record id.
pub struct Delete {
    db: Arc<Database>,
    tx: Transaction,
    child: Box<dyn OpIterator>,

    tuple_desc: TupleDesc,

    done: bool,
    opened: bool,
}

impl Delete {
    pub fn new(db: Arc<Database>, tx: &Transaction, child: Box<dyn OpIterator>) -> Self {
        Self {
            db,
            tx: tx.clone(),
            child,
            tuple_desc: TupleDesc::new(vec![FieldItem::new(Type::Int, "count")]),
            done: false,
            opened: false,
        }
    }
}

impl OpIterator for Delete {
    fn open(&mut self) -> TinyResult {
        self.child.open()?;
        self.done = false;
        self.opened = true;
        Ok(())
    }

    fn has_next(&mut self) -> Result<bool, TinyError> {
        if !self.opened {
            return Err(TinyError::new("operator is not open"));
        }
        Ok(!self.done)
    }

    fn next(&mut self) -> Result<Option<Tuple>, TinyError> {
        if !self.has_next()? {
            return Ok(None);
        }

        let mut count = 0;
        while let Some(tuple) = self.child.next()? {
            BufferPool::delete_tuple(&self.db, &self.tx, &tuple)?;
            count += 1;
        }

        self.done = true;
        Ok(Some(Tuple::new(&self.tuple_desc, &[Field::Int(count)])))
    }

    fn rewind(&mut self) -> TinyResult {
        self.child.rewind()?;
        self.done = false;
        Ok(())
    }

    fn close(&mut self) -> TinyResult {
        self.opened = false;
        self.child.close()
    }

    fn get_tuple_desc(&self) -> &TupleDesc {
        &self.tuple_desc
    }
}
