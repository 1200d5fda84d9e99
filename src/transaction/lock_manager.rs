use core::fmt;
use std::{
    collections::{HashMap, HashSet},
    sync::{Condvar, Mutex},
};

use log::debug;

use crate::{
    error::TinyError,
    storage::HeapPageID,
    transaction::{Transaction, TransactionID, WaitForGraph},
    types::TinyResult,
};

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Lock {
    XLock,
    SLock,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Permission {
    ReadOnly,
    ReadWrite,
}

impl Permission {
    pub fn to_lock(&self) -> Lock {
        match self {
            Permission::ReadOnly => Lock::SLock,
            Permission::ReadWrite => Lock::XLock,
        }
    }
}

struct LockState {
    s_lock_map: HashMap<HeapPageID, HashSet<TransactionID>>,
    x_lock_map: HashMap<HeapPageID, TransactionID>,

    hold_pages: HashMap<TransactionID, HashSet<HeapPageID>>,

    wait_for_graph: WaitForGraph,
}

impl LockState {
    fn new() -> Self {
        Self {
            s_lock_map: HashMap::new(),
            x_lock_map: HashMap::new(),
            hold_pages: HashMap::new(),
            wait_for_graph: WaitForGraph::new(),
        }
    }

    // Add a lock to the given page if the compatibility table allows
    // it. This api is idempotent.
    //
    // # Return
    //
    // Return a bool value to indicate whether the lock is added
    // successfully.
    fn add_lock(&mut self, tid: TransactionID, lock: &Lock, pid: &HeapPageID) -> bool {
        // If the page is held by another transaction with X-Lock,
        // nothing can be granted.
        if let Some(holder) = self.x_lock_map.get(pid) {
            if *holder != tid {
                return false;
            }

            // The requester already holds the X-Lock, which covers both
            // request kinds.
            return true;
        }

        match lock {
            Lock::SLock => {
                self.s_lock_map
                    .entry(*pid)
                    .or_insert_with(HashSet::new)
                    .insert(tid);
            }
            Lock::XLock => {
                // If another transaction holds an S-Lock on the page,
                // the X-Lock request has to wait.
                if let Some(sharers) = self.s_lock_map.get(pid) {
                    if sharers.iter().any(|t| *t != tid) {
                        return false;
                    }
                }

                // Upgrade in place: the requester was the only sharer,
                // if it was one at all.
                if let Some(sharers) = self.s_lock_map.get_mut(pid) {
                    sharers.remove(&tid);
                    if sharers.is_empty() {
                        self.s_lock_map.remove(pid);
                    }
                }

                self.x_lock_map.insert(*pid, tid);
            }
        }

        self.hold_pages
            .entry(tid)
            .or_insert_with(HashSet::new)
            .insert(*pid);
        true
    }

    /// The holders of locks on the page that conflict with the request,
    /// the requester excluded.
    fn blockers(&self, tid: TransactionID, lock: &Lock, pid: &HeapPageID) -> HashSet<TransactionID> {
        let mut blockers = HashSet::new();

        if let Some(holder) = self.x_lock_map.get(pid) {
            if *holder != tid {
                blockers.insert(*holder);
            }
        }

        // Only an X-Lock request conflicts with the sharers.
        if lock == &Lock::XLock {
            if let Some(sharers) = self.s_lock_map.get(pid) {
                for t in sharers {
                    if *t != tid {
                        blockers.insert(*t);
                    }
                }
            }
        }

        blockers
    }

    fn release_lock(&mut self, tid: TransactionID, pid: &HeapPageID) {
        if let Some(sharers) = self.s_lock_map.get_mut(pid) {
            sharers.remove(&tid);
            if sharers.is_empty() {
                self.s_lock_map.remove(pid);
            }
        }

        if self.x_lock_map.get(pid) == Some(&tid) {
            self.x_lock_map.remove(pid);
        }

        if let Some(pages) = self.hold_pages.get_mut(&tid) {
            pages.remove(pid);
            if pages.is_empty() {
                self.hold_pages.remove(&tid);
            }
        }
    }
}

/// Page-granular two-phase locking with deadlock detection.
///
/// All state lives under one mutex; blocked requests wait on a condvar
/// that every release signals via broadcast. Spurious wakeups are
/// harmless because each waiter re-checks grantability.
pub struct LockManager {
    state: Mutex<LockState>,
    waiters: Condvar,
}

impl LockManager {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(LockState::new()),
            waiters: Condvar::new(),
        }
    }

    /// Request a lock on the given page. Blocks while the request
    /// conflicts with locks held by other transactions.
    ///
    /// The requester's edges in the waits-for graph are rebuilt from
    /// the current blocker set on every pass, and a cycle found by the
    /// depth-first search from the requester fails the request with
    /// `TransactionAborted`. The transaction that closes a cycle is
    /// always the one that detects it, so the system cannot deadlock.
    pub fn acquire_lock(&self, tx: &Transaction, lock: &Lock, pid: &HeapPageID) -> TinyResult {
        let tid = tx.get_id();
        debug!("request lock, tx: {:?}, lock: {:?}, pid: {:?}", tx, lock, pid);

        let mut state = self
            .state
            .lock()
            .or(Err(TinyError::aborted("lock manager unavailable")))?;

        loop {
            if state.add_lock(tid, lock, pid) {
                state.wait_for_graph.remove_waiter(tid);
                debug!("lock acquired, tx: {:?}, lock: {:?}, pid: {:?}", tx, lock, pid);
                return Ok(());
            }

            let blockers = state.blockers(tid, lock, pid);
            state.wait_for_graph.set_edges(tid, blockers);

            if state.wait_for_graph.has_cycle_from(tid) {
                state.wait_for_graph.remove_waiter(tid);
                let err = TinyError::aborted(&format!(
                    "deadlock detected, tx: {:?}, lock: {:?}, pid: {:?}",
                    tx, lock, pid
                ));
                err.show_backtrace();
                return Err(err);
            }

            state = self
                .waiters
                .wait(state)
                .or(Err(TinyError::aborted("interrupted while waiting")))?;

            // clear the stale edges, the next pass rebuilds them from
            // the current holders
            state.wait_for_graph.remove_waiter(tid);
        }
    }

    /// Release one lock.
    ///
    /// Dangerous outside of `release_all_locks`: dropping a lock before
    /// the transaction completes breaks two-phase locking.
    pub fn release_lock(&self, tx: &Transaction, pid: &HeapPageID) {
        let tid = tx.get_id();
        let mut state = self.state.lock().unwrap();

        state.release_lock(tid, pid);
        state.wait_for_graph.remove_transaction(tid);

        debug!("lock released, tx: {:?}, pid: {:?}", tx, pid);
        self.waiters.notify_all();
    }

    /// Release every lock of the transaction and purge it from the
    /// waits-for graph. Called at commit or abort.
    pub fn release_all_locks(&self, tx: &Transaction) {
        let tid = tx.get_id();
        let mut state = self.state.lock().unwrap();

        let hold_pages = state.hold_pages.get(&tid).cloned().unwrap_or_default();
        for pid in hold_pages {
            state.release_lock(tid, &pid);
        }
        state.hold_pages.remove(&tid);
        state.wait_for_graph.remove_transaction(tid);

        debug!("all locks released, tx: {:?}", tx);
        self.waiters.notify_all();
    }

    pub fn holds_lock(&self, tx: &Transaction, pid: &HeapPageID) -> bool {
        let state = self.state.lock().unwrap();
        state
            .hold_pages
            .get(&tx.get_id())
            .map(|pages| pages.contains(pid))
            .unwrap_or(false)
    }

    /// The pages the transaction currently holds locks on.
    pub fn hold_pages(&self, tx: &Transaction) -> HashSet<HeapPageID> {
        let state = self.state.lock().unwrap();
        state.hold_pages.get(&tx.get_id()).cloned().unwrap_or_default()
    }

    pub fn clear(&self) {
        let mut state = self.state.lock().unwrap();
        state.s_lock_map.clear();
        state.x_lock_map.clear();
        state.hold_pages.clear();
        state.wait_for_graph = WaitForGraph::new();
        self.waiters.notify_all();
    }
}

impl fmt::Display for LockManager {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let state = self.state.lock().unwrap();

        let mut depiction = "\n".to_string();

        depiction.push_str("s_lock_map: {");
        for (pid, sharers) in state.s_lock_map.iter() {
            depiction.push_str(&format!("\n\t{:?} -> {:?},", pid, sharers));
        }
        depiction.push_str("\n}\n");

        depiction.push_str("x_lock_map: {");
        for (pid, holder) in state.x_lock_map.iter() {
            depiction.push_str(&format!("\n\t{:?} -> tx_{},", pid, holder));
        }
        depiction.push_str("\n}\n");

        depiction.push_str("hold_pages: {");
        for (tid, pages) in state.hold_pages.iter() {
            depiction.push_str(&format!("\n\t tx_{} -> {:?},", tid, pages));
        }
        depiction.push_str("\n}\n");

        write!(f, "{}", depiction)
    }
}

impl fmt::Debug for LockManager {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}
