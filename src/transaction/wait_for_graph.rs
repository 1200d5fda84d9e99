use std::collections::{HashMap, HashSet};

use super::TransactionID;

/// The waits-for graph of blocked transactions. An edge `t -> u` means
/// `t` is blocked on a lock that `u` holds; a cycle is a deadlock.
pub(crate) struct WaitForGraph {
    // key: transaction id, value: the transactions that the key transaction is waiting for
    graph: HashMap<TransactionID, HashSet<TransactionID>>,
}

impl WaitForGraph {
    pub(crate) fn new() -> Self {
        Self {
            graph: HashMap::new(),
        }
    }

    /// Replace the out-edges of a waiter with its current blocker set.
    pub(crate) fn set_edges(&mut self, from: TransactionID, to: HashSet<TransactionID>) {
        self.graph.insert(from, to);
    }

    /// Drop the out-edges of a waiter. Called whenever the waiter stops
    /// waiting, for any reason.
    pub(crate) fn remove_waiter(&mut self, tid: TransactionID) {
        self.graph.remove(&tid);
    }

    /// Drop every edge that mentions the transaction, in either
    /// direction.
    pub(crate) fn remove_transaction(&mut self, tid: TransactionID) {
        self.graph.remove(&tid);
        for neighbours in self.graph.values_mut() {
            neighbours.remove(&tid);
        }
    }

    /// Depth-first search from the given transaction; an edge back to
    /// any node on the current path is a deadlock.
    pub(crate) fn has_cycle_from(&self, start: TransactionID) -> bool {
        let mut path = HashSet::new();
        let mut visited = HashSet::new();
        self.dfs(start, &mut path, &mut visited)
    }

    fn dfs(
        &self,
        tid: TransactionID,
        path: &mut HashSet<TransactionID>,
        visited: &mut HashSet<TransactionID>,
    ) -> bool {
        if path.contains(&tid) {
            return true;
        }
        if visited.contains(&tid) {
            return false;
        }

        visited.insert(tid);
        path.insert(tid);

        if let Some(neighbours) = self.graph.get(&tid) {
            for &t in neighbours {
                if self.dfs(t, path, visited) {
                    return true;
                }
            }
        }

        path.remove(&tid);
        false
    }
}
