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

/// Drain the child and insert every tuple into the target table,
/// emitting a single one-field tuple with the number of inserted
/// records.
pub struct Insert {
    db: Arc<Database>,
    tx: Transaction,
    child: Box<dyn OpIterator>,
    table_id: u32,

    tuple_desc: TupleDesc,

    done: bool,
    opened: bool,
}

impl Insert {
    pub fn new(
        db: Arc<Database>,
        tx: &Transaction,
        child: Box<dyn OpIterator>,
        table_id: u32,
    ) -> Self {
        Self {
            db,
            tx: tx.clone(),
            child,
            table_id,
            tuple_desc: TupleDesc::new(vec![FieldItem::new(Type::Int, "count")]),
            done: false,
            opened: false,
        }
    }
}

impl OpIterator for Insert {
    fn open(&mut self) -> TinyResult {
        // the child must feed tuples of the table's schema
        let table_desc = self.db.catalog().get_tuple_desc(&self.table_id)?;
        if !table_desc.compatible(self.child.get_tuple_desc()) {
            return Err(TinyError::new(&format!(
                "schema mismatch, table: {}, child: {}",
                table_desc,
                self.child.get_tuple_desc()
            )));
        }

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
            BufferPool::insert_tuple(&self.db, &self.tx, self.table_id, &tuple)?;
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
