use core::fmt;
use std::io::Cursor;

use bit_vec::BitVec;
use log::debug;

use crate::{
    buffer_pool::BufferPool,
    error::TinyError,
    io::Encodeable,
    storage::{HeapPageID, RecordId, Tuple, TupleDesc},
    transaction::TransactionID,
    types::{Pod, TinyResult},
    utils::{ceil_div, HandyRwLock},
};

/// A slotted heap page: a bitmap of occupied slots followed by
/// fixed-width tuple records, zero-padded to the page size.
pub struct HeapPage {
    pid: HeapPageID,

    tuple_desc: TupleDesc,

    slot_count: usize,

    // indicate slots' status: true means occupied, false means empty
    header: BitVec,

    // all tuples (include empty slots, which hold zero-filled tuples)
    tuples: Vec<Tuple>,

    // the transaction that last modified the page, if any
    dirty_by: Option<TransactionID>,
}

impl HeapPage {
    pub fn new(pid: &HeapPageID, bytes: &[u8], tuple_desc: &TupleDesc) -> Result<Self, TinyError> {
        let page_size = BufferPool::get_page_size();
        if bytes.len() != page_size {
            return Err(TinyError::new(&format!(
                "corrupt page {}, expect {} bytes, got {}",
                pid,
                page_size,
                bytes.len()
            )));
        }

        let slot_count = Self::calculate_slots_count(tuple_desc);
        let header_size = Self::calculate_header_size(slot_count);
        let tuple_size = tuple_desc.get_size();

        let mut tuples = Vec::with_capacity(slot_count);
        for i in 0..slot_count {
            let start = header_size + i * tuple_size;
            let mut reader = Cursor::new(&bytes[start..start + tuple_size]);
            let mut tuple = Tuple::read_from(&mut reader, tuple_desc)?;
            tuple.set_record_id(Some(RecordId::new(*pid, i)));
            tuples.push(tuple);
        }

        Ok(Self {
            pid: *pid,
            tuple_desc: tuple_desc.clone(),
            slot_count,
            header: BitVec::from_bytes(&bytes[..header_size]),
            tuples,
            dirty_by: None,
        })
    }

    pub fn empty_page_data() -> Vec<u8> {
        vec![0; BufferPool::get_page_size()]
    }

    /// Retrieve the maximum number of tuples a page of this schema can
    /// hold: each tuple needs its record bytes plus one header bit.
    pub fn calculate_slots_count(tuple_desc: &TupleDesc) -> usize {
        let bits_per_tuple_including_header = tuple_desc.get_size() * 8 + 1;
        (BufferPool::get_page_size() * 8) / bits_per_tuple_including_header
    }

    pub fn calculate_header_size(slot_count: usize) -> usize {
        ceil_div(slot_count, 8)
    }

    pub fn get_pid(&self) -> HeapPageID {
        self.pid
    }

    pub fn get_tuple_desc(&self) -> &TupleDesc {
        &self.tuple_desc
    }

    pub fn get_slots_count(&self) -> usize {
        self.slot_count
    }

    pub fn empty_slots_count(&self) -> usize {
        let mut count = 0;
        for i in 0..self.slot_count {
            if !self.is_slot_used(i) {
                count += 1;
            }
        }
        count
    }

    /// Returns the number of tuples currently stored on this page.
    pub fn tuples_count(&self) -> usize {
        self.slot_count - self.empty_slots_count()
    }

    /// Returns true if the associated slot on this page is filled.
    pub fn is_slot_used(&self, slot_index: usize) -> bool {
        self.header.get(slot_index).unwrap_or(false)
    }

    fn mark_slot_status(&mut self, slot_index: usize, used: bool) {
        self.header.set(slot_index, used);
    }

    /// Add the tuple to the first empty slot and stamp its record id.
    pub fn insert_tuple(&mut self, tuple: &Tuple) -> TinyResult {
        for i in 0..self.slot_count {
            if !self.is_slot_used(i) {
                let mut stored = tuple.clone();
                stored.set_record_id(Some(RecordId::new(self.pid, i)));
                self.tuples[i] = stored;
                self.mark_slot_status(i, true);

                debug!("insert tuple into {}, slot: {}", self.pid, i);
                return Ok(());
            }
        }

        Err(TinyError::new(&format!("page {} is full", self.pid)))
    }

    /// Clear the slot the record id points to.
    pub fn delete_tuple(&mut self, record_id: &RecordId) -> TinyResult {
        if record_id.pid != self.pid {
            return Err(TinyError::not_found(&format!(
                "record {:?} does not belong to {}",
                record_id, self.pid
            )));
        }
        if record_id.slot >= self.slot_count || !self.is_slot_used(record_id.slot) {
            return Err(TinyError::not_found(&format!(
                "no tuple at {:?}",
                record_id
            )));
        }

        self.mark_slot_status(record_id.slot, false);
        debug!("delete tuple from {}, slot: {}", self.pid, record_id.slot);
        Ok(())
    }

    pub fn get_tuple(&self, slot_index: usize) -> Option<Tuple> {
        if self.is_slot_used(slot_index) {
            return Some(self.tuples[slot_index].clone());
        }
        None
    }

    /// Serialize the page back into its on-disk form.
    pub fn get_page_data(&self) -> Vec<u8> {
        let page_size = BufferPool::get_page_size();
        let header_size = Self::calculate_header_size(self.slot_count);
        let tuple_size = self.tuple_desc.get_size();

        let mut bytes = Vec::with_capacity(page_size);
        let mut header = self.header.to_bytes();
        header.resize(header_size, 0);
        bytes.extend_from_slice(&header);

        for i in 0..self.slot_count {
            if self.is_slot_used(i) {
                bytes.extend_from_slice(&self.tuples[i].encode());
            } else {
                bytes.extend_from_slice(&vec![0; tuple_size]);
            }
        }

        bytes.resize(page_size, 0);
        bytes
    }

    pub fn set_dirty(&mut self, dirty_by: Option<TransactionID>) {
        self.dirty_by = dirty_by;
    }

    pub fn is_dirty(&self) -> Option<TransactionID> {
        self.dirty_by
    }
}

impl fmt::Display for HeapPage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "<HeapPage, pid: {}, tuples: {}/{}>",
            self.pid,
            self.tuples_count(),
            self.slot_count
        )
    }
}

impl fmt::Debug for HeapPage {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

/// Iterator over the occupied slots of a shared page.
pub struct HeapPageIterator {
    page: Pod<HeapPage>,
    cursor: i32,
}

impl HeapPageIterator {
    pub fn new(page: Pod<HeapPage>) -> Self {
        Self { page, cursor: -1 }
    }
}

impl Iterator for HeapPageIterator {
    type Item = Tuple;

    fn next(&mut self) -> Option<Self::Item> {
        let page = self.page.rl();
        loop {
            self.cursor += 1;
            let cursor = self.cursor as usize;
            if cursor >= page.get_slots_count() {
                return None;
            }

            if page.is_slot_used(cursor) {
                return Some(page.tuples[cursor].clone());
            }
        }
    }
}
