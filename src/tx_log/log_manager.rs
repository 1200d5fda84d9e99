use std::{
    fs::{File, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use log::debug;

use crate::{
    error::TinyError,
    storage::HeapPageID,
    transaction::Transaction,
    types::TinyResult,
};

#[derive(Debug, PartialEq, Clone, Copy)]
enum RecordType {
    Update,
    Commit,
}

impl RecordType {
    fn to_u8(self) -> u8 {
        match self {
            RecordType::Update => 0,
            RecordType::Commit => 1,
        }
    }
}

/// Naive append-only write-ahead log.
///
/// The buffer pool appends one UPDATE record per dirty page (before
/// and after images) followed by a forced COMMIT record. Nothing reads
/// the log back here: recovery is out of scope, the records only have
/// to be durable before the commit returns.
pub struct LogManager {
    file: File,

    file_path: PathBuf,

    total_records: usize,
}

impl LogManager {
    pub fn new<P: AsRef<Path>>(file_path: P) -> Result<Self, TinyError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&file_path)
            .or(Err(TinyError::io("cannot open log file")))?;

        Ok(Self {
            file,
            file_path: file_path.as_ref().to_path_buf(),
            total_records: 0,
        })
    }

    /// Append a redo/undo record for one page modified by the
    /// transaction.
    pub fn log_update(
        &mut self,
        tx: &Transaction,
        pid: &HeapPageID,
        before_image: &[u8],
        after_image: &[u8],
    ) -> TinyResult {
        debug!("log update, tx: {:?}, pid: {:?}", tx, pid);

        let mut record = Vec::with_capacity(32 + before_image.len() + after_image.len());
        record.push(RecordType::Update.to_u8());
        record.extend_from_slice(&tx.get_id().to_be_bytes());
        record.extend_from_slice(&pid.table_id.to_be_bytes());
        record.extend_from_slice(&(pid.page_index as u64).to_be_bytes());
        record.extend_from_slice(&(before_image.len() as u32).to_be_bytes());
        record.extend_from_slice(before_image);
        record.extend_from_slice(&(after_image.len() as u32).to_be_bytes());
        record.extend_from_slice(after_image);

        self.append(&record)
    }

    /// Append a commit record and force the log to disk.
    pub fn log_commit(&mut self, tx: &Transaction) -> TinyResult {
        debug!("log commit, tx: {:?}", tx);

        let mut record = Vec::with_capacity(9);
        record.push(RecordType::Commit.to_u8());
        record.extend_from_slice(&tx.get_id().to_be_bytes());

        self.append(&record)?;
        self.force()
    }

    /// Push everything written so far onto the platter.
    pub fn force(&mut self) -> TinyResult {
        self.file
            .flush()
            .and_then(|_| self.file.sync_all())
            .or(Err(TinyError::io("log force failed")))
    }

    pub fn records_count(&self) -> usize {
        self.total_records
    }

    /// Truncate the log, used by tests.
    pub fn reset(&mut self) -> TinyResult {
        self.file
            .set_len(0)
            .or(Err(TinyError::io("log truncate failed")))?;
        self.total_records = 0;
        Ok(())
    }

    pub fn get_file_path(&self) -> &Path {
        &self.file_path
    }

    fn append(&mut self, record: &[u8]) -> TinyResult {
        self.file
            .write_all(record)
            .or(Err(TinyError::io("log append failed")))?;
        self.total_records += 1;
        Ok(())
    }
}
