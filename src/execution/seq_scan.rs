use std::sync::Arc;

use crate::{
    buffer_pool::BufferPool,
    database::Database,
    error::TinyError,
    execution::OpIterator,
    storage::{HeapPageID, HeapPageIterator, Tuple, TupleDesc},
    transaction::{Permission, Transaction},
    types::TinyResult,
    utils::HandyRwLock,
};

/// Sequential scan over every tuple of a table, pulling pages through
/// the buffer pool with read-only permission.
pub struct SeqScan {
    db: Arc<Database>,
    tx: Transaction,
    table_id: u32,

    // output schema, every field renamed to "alias.field"
    tuple_desc: TupleDesc,

    page_index: usize,
    page_iter: Option<HeapPageIterator>,
    pending: Option<Tuple>,
    opened: bool,
}

impl SeqScan {
    pub fn new(
        db: Arc<Database>,
        tx: &Transaction,
        table_id: u32,
        table_alias: &str,
    ) -> Result<Self, TinyError> {
        let tuple_desc = db.catalog().get_tuple_desc(&table_id)?.alias(table_alias);

        Ok(Self {
            db,
            tx: tx.clone(),
            table_id,
            tuple_desc,
            page_index: 0,
            page_iter: None,
            pending: None,
            opened: false,
        })
    }

    fn num_pages(&self) -> Result<usize, TinyError> {
        let table_rc = self.db.catalog().get_table(&self.table_id)?;
        let num_pages = table_rc.rl().num_pages();
        Ok(num_pages)
    }

    fn read_next(&mut self) -> Result<Option<Tuple>, TinyError> {
        loop {
            if let Some(iter) = &mut self.page_iter {
                if let Some(tuple) = iter.next() {
                    return Ok(Some(tuple));
                }
            }

            // current page exhausted, move to the next one
            if self.page_index >= self.num_pages()? {
                return Ok(None);
            }

            let pid = HeapPageID::new(self.table_id, self.page_index);
            let page_rc = BufferPool::get_page(&self.db, &self.tx, Permission::ReadOnly, &pid)?;
            self.page_iter = Some(HeapPageIterator::new(page_rc));
            self.page_index += 1;
        }
    }
}

impl OpIterator for SeqScan {
    fn open(&mut self) -> TinyResult {
        self.opened = true;
        self.page_index = 0;
        self.page_iter = None;
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
        if !self.opened {
            return Err(TinyError::new("operator is not open"));
        }
        self.page_index = 0;
        self.page_iter = None;
        self.pending = None;
        Ok(())
    }

    fn close(&mut self) -> TinyResult {
        self.opened = false;
        self.page_iter = None;
        self.pending = None;
        Ok(())
    }

    fn get_tuple_desc(&self) -> &TupleDesc {
        &self.tuple_desc
    }
}
