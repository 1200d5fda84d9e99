use std::{
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::{
    buffer_pool::BufferPool,
    catalog::Catalog,
    error::TinyError,
    transaction::LockManager,
    tx_log::LogManager,
    types::Pod,
    utils::HandyRwLock,
};

/// All shared state of one database instance.
///
/// There is deliberately no process-wide singleton: callers pass the
/// instance around explicitly, which lets tests run several isolated
/// databases side by side.
pub struct Database {
    path: PathBuf,

    buffer_pool: Pod<BufferPool>,
    catalog: Pod<Catalog>,
    lock_manager: Arc<LockManager>,
    log_manager: Pod<LogManager>,
}

impl Database {
    /// Create a database rooted at the given directory. The directory
    /// is created when missing; the write-ahead log lives inside it.
    pub fn new(path: &str) -> Result<Self, TinyError> {
        let db_path = PathBuf::from(path);
        if !db_path.exists() {
            std::fs::create_dir_all(&db_path)
                .or(Err(TinyError::io("cannot create database directory")))?;
        }

        let log_path = db_path.join("wal.log");

        Ok(Self {
            path: db_path,

            buffer_pool: Arc::new(RwLock::new(BufferPool::new())),
            catalog: Arc::new(RwLock::new(Catalog::new())),
            lock_manager: Arc::new(LockManager::new()),
            log_manager: Arc::new(RwLock::new(LogManager::new(log_path)?)),
        })
    }

    pub fn buffer_pool(&self) -> RwLockReadGuard<'_, BufferPool> {
        self.buffer_pool.rl()
    }

    pub fn mut_buffer_pool(&self) -> RwLockWriteGuard<'_, BufferPool> {
        self.buffer_pool.wl()
    }

    pub fn catalog(&self) -> RwLockReadGuard<'_, Catalog> {
        self.catalog.rl()
    }

    pub fn mut_catalog(&self) -> RwLockWriteGuard<'_, Catalog> {
        self.catalog.wl()
    }

    pub fn lock_manager(&self) -> &LockManager {
        &self.lock_manager
    }

    pub fn log_manager(&self) -> RwLockReadGuard<'_, LogManager> {
        self.log_manager.rl()
    }

    pub fn mut_log_manager(&self) -> RwLockWriteGuard<'_, LogManager> {
        self.log_manager.wl()
    }

    pub fn get_path(&self) -> &Path {
        &self.path
    }
}
