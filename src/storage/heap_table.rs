use core::fmt;
use std::{
    collections::hash_map::DefaultHasher,
    fs::{File, OpenOptions},
    hash::{Hash, Hasher},
    io::{Read, Seek, SeekFrom, Write},
    sync::{Mutex, MutexGuard},
};

use log::debug;

use crate::{
    buffer_pool::BufferPool,
    database::Database,
    error::TinyError,
    storage::{HeapPage, HeapPageID, TupleDesc, Tuple},
    transaction::{Permission, Transaction},
    types::{ResultPod, TinyResult},
    utils::HandyRwLock,
};

/// A table stored as an unordered sequence of heap pages in one file.
pub struct HeapTable {
    // the file that stores the on-disk backing store for this table
    file_path: String,

    pub name: String,

    // the name of the primary-key field
    pub pkey_field: String,

    pub tuple_desc: TupleDesc,

    file: Mutex<File>,

    table_id: u32,
}

impl HeapTable {
    pub fn new(
        file_path: &str,
        name: &str,
        pkey_field: &str,
        tuple_desc: &TupleDesc,
    ) -> Result<Self, TinyError> {
        let file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .open(file_path)
            .or(Err(TinyError::io(&format!(
                "cannot open table file {}",
                file_path
            ))))?;

        // The table id is a hash of the absolute path, so reopening the
        // same file yields the same id.
        let absolute_path = std::fs::canonicalize(file_path)
            .or(Err(TinyError::io(&format!(
                "cannot resolve table file {}",
                file_path
            ))))?;
        let mut hasher = DefaultHasher::new();
        absolute_path.hash(&mut hasher);
        let table_id = hasher.finish() as u32;

        debug!("open table {}, id: {}", file_path, table_id);

        Ok(Self {
            file_path: file_path.to_string(),
            name: name.to_string(),
            pkey_field: pkey_field.to_string(),
            tuple_desc: tuple_desc.clone(),
            file: Mutex::new(file),
            table_id,
        })
    }

    pub fn get_id(&self) -> u32 {
        self.table_id
    }

    pub fn get_tuple_desc(&self) -> &TupleDesc {
        &self.tuple_desc
    }

    fn get_file(&self) -> MutexGuard<'_, File> {
        self.file.lock().unwrap()
    }

    /// The number of whole pages in the backing file. The file length
    /// must be a multiple of the page size.
    pub fn num_pages(&self) -> usize {
        let len = self
            .get_file()
            .metadata()
            .map(|m| m.len() as usize)
            .unwrap_or(0);
        len / BufferPool::get_page_size()
    }

    /// Read the raw content of one page. Reading past the last page is
    /// an error.
    pub fn read_page_data(&self, page_index: usize) -> Result<Vec<u8>, TinyError> {
        if page_index >= self.num_pages() {
            return Err(TinyError::new(&format!(
                "page {} out of range, table {} has {} pages",
                page_index,
                self.table_id,
                self.num_pages()
            )));
        }

        let page_size = BufferPool::get_page_size();
        let mut file = self.get_file();
        file.seek(SeekFrom::Start((page_index * page_size) as u64))
            .or(Err(TinyError::io("seek failed")))?;

        let mut buf = vec![0; page_size];
        file.read_exact(&mut buf)
            .or(Err(TinyError::io("read page failed")))?;
        Ok(buf)
    }

    /// Write the content of a specific page to disk.
    pub fn write_page_to_disk(&self, pid: &HeapPageID, data: &[u8]) -> TinyResult {
        let page_size = BufferPool::get_page_size();
        let mut file = self.get_file();
        file.seek(SeekFrom::Start((pid.page_index * page_size) as u64))
            .or(Err(TinyError::io("seek failed")))?;
        file.write_all(data)
            .or(Err(TinyError::io("write page failed")))?;
        Ok(())
    }

    /// Grow the file by one zeroed page at the given index.
    pub fn write_empty_page_to_disk(&self, pid: &HeapPageID) -> TinyResult {
        self.write_page_to_disk(pid, &HeapPage::empty_page_data())
    }

    /// Add a tuple to the first page with a free slot, extending the
    /// file when every page is full. Returns the page that was
    /// modified; the caller owns dirty marking.
    pub fn insert_tuple(
        &self,
        db: &Database,
        tx: &Transaction,
        tuple: &Tuple,
    ) -> ResultPod<HeapPage> {
        // stage 1: probe existing pages for a free slot
        for page_index in 0..self.num_pages() {
            let pid = HeapPageID::new(self.table_id, page_index);
            let page_rc = BufferPool::get_page(db, tx, Permission::ReadWrite, &pid)?;

            let has_room = page_rc.rl().empty_slots_count() > 0;
            if has_room {
                page_rc.wl().insert_tuple(tuple)?;
                return Ok(page_rc);
            }
        }

        // stage 2: every page is full, extend the file by one page
        let pid = HeapPageID::new(self.table_id, self.num_pages());
        self.write_empty_page_to_disk(&pid)?;
        debug!("table {} extended to {} pages", self.table_id, self.num_pages());

        let page_rc = BufferPool::get_page(db, tx, Permission::ReadWrite, &pid)?;
        page_rc.wl().insert_tuple(tuple)?;
        Ok(page_rc)
    }

    /// Remove a tuple through its record id. Returns the page that was
    /// modified; the caller owns dirty marking.
    pub fn delete_tuple(
        &self,
        db: &Database,
        tx: &Transaction,
        tuple: &Tuple,
    ) -> ResultPod<HeapPage> {
        let record_id = tuple
            .get_record_id()
            .ok_or_else(|| TinyError::not_found("tuple has no record id"))?;

        let page_rc = BufferPool::get_page(db, tx, Permission::ReadWrite, &record_id.pid)?;
        page_rc.wl().delete_tuple(&record_id)?;
        Ok(page_rc)
    }
}

impl fmt::Display for HeapTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "<HeapTable, file: {}, id: {}>",
            self.file_path, self.table_id
        )
    }
}
