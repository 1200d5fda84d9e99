use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::{buffer_pool::BufferPool, database::Database, types::TinyResult};

pub type TransactionID = u64;

static TRANSACTION_ID: AtomicU64 = AtomicU64::new(1);

/// Handle of one transaction. The id is process-unique and increases
/// monotonically by 1.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct Transaction {
    id: TransactionID,
}

impl Transaction {
    pub fn new() -> Self {
        let id = TRANSACTION_ID.fetch_add(1, Ordering::Relaxed);
        Self { id }
    }

    pub fn get_id(&self) -> TransactionID {
        self.id
    }

    pub fn commit(&self, db: &Database) -> TinyResult {
        BufferPool::tx_complete(db, self, true)
    }

    /// Roll the transaction back. A transaction that observed a
    /// deadlock abort must end up here before its id is retired, and
    /// must stop issuing buffer-pool calls afterwards.
    pub fn abort(&self, db: &Database) -> TinyResult {
        BufferPool::tx_complete(db, self, false)
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "tx_{}", self.id)
    }
}

impl fmt::Debug for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}
