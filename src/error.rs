use core::fmt;
use std::error::Error;

use backtrace::Backtrace;
use log::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Corrupt page, bad schema, cache exhausted with only dirty pages.
    Db,
    /// Deadlock, or a wait that cannot be completed.
    TransactionAborted,
    /// Underlying file failure.
    Io,
    /// Missing slot, missing field, missing table.
    NotFound,
    /// Operation the component does not support.
    Unsupported,
}

pub struct TinyError {
    kind: ErrorKind,
    details: String,
    backtrace: Backtrace,
}

impl TinyError {
    pub fn new(msg: &str) -> Self {
        Self::with_kind(ErrorKind::Db, msg)
    }

    pub fn with_kind(kind: ErrorKind, msg: &str) -> Self {
        Self {
            kind,
            details: msg.to_string(),
            backtrace: Backtrace::new(),
        }
    }

    pub fn aborted(msg: &str) -> Self {
        Self::with_kind(ErrorKind::TransactionAborted, msg)
    }

    pub fn io(msg: &str) -> Self {
        Self::with_kind(ErrorKind::Io, msg)
    }

    pub fn not_found(msg: &str) -> Self {
        Self::with_kind(ErrorKind::NotFound, msg)
    }

    pub fn unsupported(msg: &str) -> Self {
        Self::with_kind(ErrorKind::Unsupported, msg)
    }

    pub fn get_kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is_aborted(&self) -> bool {
        self.kind == ErrorKind::TransactionAborted
    }

    pub fn show_backtrace(&self) {
        error!("{}\nbacktrace:\n{:?}", self, self.backtrace);
    }
}

impl fmt::Display for TinyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.details)
    }
}

impl fmt::Debug for TinyError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl Error for TinyError {}
