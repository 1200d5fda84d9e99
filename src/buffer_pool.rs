use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, RwLock,
    },
};

use log::debug;

use crate::{
    database::Database,
    error::TinyError,
    storage::{HeapPage, HeapPageID, Tuple},
    transaction::{Permission, Transaction},
    types::{Pod, ResultPod, TinyResult},
    utils::HandyRwLock,
};

pub const DEFAULT_PAGE_SIZE: usize = 4096;
pub const DEFAULT_PAGES: usize = 50;

static PAGE_SIZE: AtomicUsize = AtomicUsize::new(DEFAULT_PAGE_SIZE);

/// A cached page plus the snapshot of its content at the last clean
/// boundary. The pool owns the before-image so pages stay pure data.
struct CacheEntry {
    page: Pod<HeapPage>,
    before_image: Vec<u8>,
}

/// Bounded cache of heap pages, the only path by which transactions
/// touch pages.
///
/// The pool never evicts a dirty page (NO STEAL), and committed pages
/// are written through to the data file, so a clean cached page always
/// equals its on-disk image.
pub struct BufferPool {
    buffer: HashMap<HeapPageID, CacheEntry>,

    capacity: usize,
}

impl BufferPool {
    pub fn new() -> Self {
        Self {
            buffer: HashMap::new(),
            capacity: DEFAULT_PAGES,
        }
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn pages_count(&self) -> usize {
        self.buffer.len()
    }

    pub fn get_capacity(&self) -> usize {
        self.capacity
    }

    /// Change the page budget, used by tests.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity;
    }

    pub fn set_page_size(page_size: usize) {
        PAGE_SIZE.store(page_size, Ordering::Relaxed);
    }

    pub fn get_page_size() -> usize {
        PAGE_SIZE.load(Ordering::Relaxed)
    }

    /// Retrieve the specified page with the associated permissions,
    /// loading it from disk on a cache miss. Will acquire a lock and
    /// may block if that lock is held by another transaction.
    ///
    /// We have to request the lock on the page before accessing the
    /// buffer pool. Here are the reasons:
    ///
    /// 1. (main reason) Logically, getting a page from the buffer pool
    ///    is an access operation, which requires the permission of the
    ///    page.
    ///
    /// 2. If we requested the lock after getting access to the buffer
    ///    pool, the request could block while we hold the pool lock,
    ///    and every other transaction would be stuck behind us.
    pub fn get_page(
        db: &Database,
        tx: &Transaction,
        perm: Permission,
        pid: &HeapPageID,
    ) -> ResultPod<HeapPage> {
        // step 1: request the page lock
        db.lock_manager().acquire_lock(tx, &perm.to_lock(), pid)?;

        // step 2: check the cache
        let mut bp = db.mut_buffer_pool();
        if let Some(entry) = bp.buffer.get(pid) {
            return Ok(entry.page.clone());
        }

        // step 3: make room, then load the page from disk
        if bp.buffer.len() >= bp.capacity {
            bp.evict_page()?;
        }

        debug!("get page from disk, pid: {}", pid);
        let entry = Self::load_page(db, pid)?;
        let page_rc = entry.page.clone();
        bp.buffer.insert(*pid, entry);
        Ok(page_rc)
    }

    fn load_page(db: &Database, pid: &HeapPageID) -> Result<CacheEntry, TinyError> {
        // stage 1: get table
        let table_rc = db.catalog().get_table(&pid.get_table_id())?;
        let table = table_rc.rl();

        // stage 2: read page content from disk
        let buf = table.read_page_data(pid.page_index)?;

        // stage 3: page instantiation
        let page = HeapPage::new(pid, &buf, table.get_tuple_desc())?;

        Ok(CacheEntry {
            page: Arc::new(RwLock::new(page)),
            before_image: buf,
        })
    }

    /// Drop one clean page from the cache. Dirty pages must stay until
    /// their transaction resolves, so a cache full of dirty pages
    /// cannot make room.
    fn evict_page(&mut self) -> TinyResult {
        let victim = self
            .buffer
            .iter()
            .find(|(_, entry)| entry.page.rl().is_dirty().is_none())
            .map(|(pid, _)| *pid);

        match victim {
            Some(pid) => {
                debug!("evict page {}", pid);
                self.buffer.remove(&pid);
                Ok(())
            }
            None => Err(TinyError::new(
                "cannot evict: every cached page is dirty",
            )),
        }
    }

    /// Add a tuple to the specified table on behalf of the
    /// transaction. The modified page is marked dirty and stays in the
    /// cache so that future requests see the update.
    pub fn insert_tuple(
        db: &Database,
        tx: &Transaction,
        table_id: u32,
        tuple: &Tuple,
    ) -> TinyResult {
        let table_rc = db.catalog().get_table(&table_id)?;
        let page_rc = table_rc.rl().insert_tuple(db, tx, tuple)?;
        page_rc.wl().set_dirty(Some(tx.get_id()));
        Ok(())
    }

    /// Remove a tuple on behalf of the transaction. The table is
    /// implied by the tuple's record id.
    pub fn delete_tuple(db: &Database, tx: &Transaction, tuple: &Tuple) -> TinyResult {
        let record_id = tuple
            .get_record_id()
            .ok_or_else(|| TinyError::not_found("tuple has no record id"))?;

        let table_rc = db.catalog().get_table(&record_id.pid.get_table_id())?;
        let page_rc = table_rc.rl().delete_tuple(db, tx, tuple)?;
        page_rc.wl().set_dirty(Some(tx.get_id()));
        Ok(())
    }

    /// Release one page lock before the transaction completes.
    ///
    /// Dangerous: this breaks two-phase locking, keep it to recovery
    /// paths.
    pub fn release_page(db: &Database, tx: &Transaction, pid: &HeapPageID) {
        db.lock_manager().release_lock(tx, pid);
    }

    /// Remove the specific page id from the buffer pool, without
    /// writing anything. Needed to make sure the pool doesn't keep a
    /// rolled back page in its cache.
    pub fn discard_page(&mut self, pid: &HeapPageID) {
        self.buffer.remove(pid);
    }

    /// Finish the transaction: settle its dirty pages, then release
    /// every lock it holds, whatever happened before.
    pub fn tx_complete(db: &Database, tx: &Transaction, commit: bool) -> TinyResult {
        let result = {
            let mut bp = db.mut_buffer_pool();
            if commit {
                bp.commit_pages(db, tx)
            } else {
                bp.rollback_pages(db, tx)
            }
        };

        db.lock_manager().release_all_locks(tx);
        result
    }

    fn commit_pages(&mut self, db: &Database, tx: &Transaction) -> TinyResult {
        let tid = tx.get_id();

        let dirty_pids: Vec<HeapPageID> = self
            .buffer
            .iter()
            .filter(|(_, entry)| entry.page.rl().is_dirty() == Some(tid))
            .map(|(pid, _)| *pid)
            .collect();

        // step 1: one update record per dirty page, then a forced
        // commit record; log failures surface to the caller untouched
        {
            let mut log_manager = db.mut_log_manager();
            for pid in &dirty_pids {
                if let Some(entry) = self.buffer.get(pid) {
                    let after_image = entry.page.rl().get_page_data();
                    log_manager.log_update(tx, pid, &entry.before_image, &after_image)?;
                }
            }
            log_manager.log_commit(tx)?;
        }

        // step 2: write through to the data file and open a new clean
        // boundary
        for pid in &dirty_pids {
            let table_rc = db.catalog().get_table(&pid.get_table_id())?;
            if let Some(entry) = self.buffer.get_mut(pid) {
                let after_image = entry.page.rl().get_page_data();
                table_rc.rl().write_page_to_disk(pid, &after_image)?;

                entry.before_image = after_image;
                entry.page.wl().set_dirty(None);
            }
        }

        debug!("commit settled {} pages, tx: {:?}", dirty_pids.len(), tx);
        Ok(())
    }

    fn rollback_pages(&mut self, db: &Database, tx: &Transaction) -> TinyResult {
        let tid = tx.get_id();

        let dirty_pids: Vec<HeapPageID> = self
            .buffer
            .iter()
            .filter(|(_, entry)| entry.page.rl().is_dirty() == Some(tid))
            .map(|(pid, _)| *pid)
            .collect();

        // replace every page the transaction touched with the clean
        // on-disk version; nothing is logged on abort
        for pid in &dirty_pids {
            debug!("rollback page {}", pid);
            let entry = Self::load_page(db, pid)?;
            self.buffer.insert(*pid, entry);
        }

        Ok(())
    }

    /// Write every cached page to its data file. Administrative; the
    /// transactional path goes through `tx_complete`.
    pub fn flush_all_pages(&self, db: &Database) -> TinyResult {
        for (pid, entry) in self.buffer.iter() {
            let table_rc = db.catalog().get_table(&pid.get_table_id())?;
            let data = entry.page.rl().get_page_data();
            table_rc.rl().write_page_to_disk(pid, &data)?;
        }
        Ok(())
    }
}
