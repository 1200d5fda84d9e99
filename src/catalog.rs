use std::collections::HashMap;

use log::debug;

use crate::{
    error::TinyError,
    storage::{HeapTable, TupleDesc},
    types::{Pod, ResultPod},
    utils::HandyRwLock,
};

type TableID = u32;
type TableRC = Pod<HeapTable>;

/// Registry of the tables known to one database instance.
pub struct Catalog {
    tables: HashMap<TableID, TableRC>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    pub fn add_table(&mut self, table_rc: TableRC) {
        let id = table_rc.rl().get_id();
        debug!("add table, id: {}, name: {}", id, table_rc.rl().name);
        self.tables.insert(id, table_rc);
    }

    pub fn get_table(&self, table_id: &TableID) -> ResultPod<HeapTable> {
        self.tables
            .get(table_id)
            .cloned()
            .ok_or_else(|| TinyError::not_found(&format!("no table with id {}", table_id)))
    }

    pub fn get_table_by_name(&self, name: &str) -> ResultPod<HeapTable> {
        for table_rc in self.tables.values() {
            if table_rc.rl().name == name {
                return Ok(table_rc.clone());
            }
        }
        Err(TinyError::not_found(&format!("no table named {:?}", name)))
    }

    pub fn get_table_id(&self, name: &str) -> Result<TableID, TinyError> {
        let table_rc = self.get_table_by_name(name)?;
        let id = table_rc.rl().get_id();
        Ok(id)
    }

    pub fn get_tuple_desc(&self, table_id: &TableID) -> Result<TupleDesc, TinyError> {
        let table_rc = self.get_table(table_id)?;
        let tuple_desc = table_rc.rl().get_tuple_desc().clone();
        Ok(tuple_desc)
    }

    pub fn get_primary_key(&self, table_id: &TableID) -> Result<String, TinyError> {
        let table_rc = self.get_table(table_id)?;
        let pkey = table_rc.rl().pkey_field.clone();
        Ok(pkey)
    }

    /// Ids of every known table.
    pub fn table_ids(&self) -> Vec<TableID> {
        self.tables.keys().copied().collect()
    }

    pub fn clear(&mut self) {
        self.tables.clear();
    }
}
