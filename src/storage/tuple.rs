use std::fmt;

use crate::{
    error::TinyError,
    io::Encodeable,
    storage::{Field, HeapPageID, TupleDesc},
};

/// Position of a tuple on disk: the page plus the slot index on that
/// page.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct RecordId {
    pub pid: HeapPageID,
    pub slot: usize,
}

impl RecordId {
    pub fn new(pid: HeapPageID, slot: usize) -> Self {
        Self { pid, slot }
    }
}

#[derive(Clone)]
pub struct Tuple {
    tuple_desc: TupleDesc,
    cells: Vec<Field>,
    record_id: Option<RecordId>,
}

// constructors
impl Tuple {
    pub fn new(tuple_desc: &TupleDesc, cells: &[Field]) -> Self {
        debug_assert_eq!(tuple_desc.fields_count(), cells.len());
        Self {
            tuple_desc: tuple_desc.clone(),
            cells: cells.to_vec(),
            record_id: None,
        }
    }

    pub fn read_from<R: std::io::Read>(
        reader: &mut R,
        tuple_desc: &TupleDesc,
    ) -> Result<Self, TinyError> {
        let mut cells = Vec::with_capacity(tuple_desc.fields_count());
        for field in tuple_desc.get_fields() {
            cells.push(Field::read_from(reader, &field.field_type)?);
        }
        Ok(Self {
            tuple_desc: tuple_desc.clone(),
            cells,
            record_id: None,
        })
    }

    pub fn new_int_tuple(value: i32, width: usize) -> Self {
        let tuple_desc = TupleDesc::small_int_desc(width);
        let cells = vec![Field::Int(value); width];
        Self::new(&tuple_desc, &cells)
    }

    /// Concatenation of two tuples, left cells first. The result has no
    /// record id.
    pub fn merge(left: &Tuple, right: &Tuple) -> Self {
        let tuple_desc = TupleDesc::merge(&left.tuple_desc, &right.tuple_desc);
        let mut cells = left.cells.clone();
        cells.extend(right.cells.clone());
        Self::new(&tuple_desc, &cells)
    }
}

impl Tuple {
    pub fn get_tuple_desc(&self) -> &TupleDesc {
        &self.tuple_desc
    }

    pub fn get_cell(&self, i: usize) -> Field {
        self.cells[i].clone()
    }

    pub fn get_cells(&self) -> Vec<Field> {
        self.cells.clone()
    }

    pub fn set_cell(&mut self, i: usize, cell: Field) {
        self.cells[i] = cell;
    }

    pub fn get_record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    pub fn set_record_id(&mut self, record_id: Option<RecordId>) {
        self.record_id = record_id;
    }

    /// Compare the cells against a plain list of ints, used by tests
    /// on all-int tables.
    pub fn equal_cells(&self, expect: &[i32]) -> bool {
        if self.cells.len() != expect.len() {
            return false;
        }
        self.cells
            .iter()
            .zip(expect.iter())
            .all(|(cell, v)| cell == &Field::Int(*v))
    }
}

impl Encodeable for Tuple {
    fn encode(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.tuple_desc.get_size());
        for cell in &self.cells {
            bytes.append(&mut cell.encode());
        }
        bytes
    }
}

impl PartialEq for Tuple {
    fn eq(&self, other: &Self) -> bool {
        self.cells == other.cells
    }
}

impl Eq for Tuple {}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut content: String = "{".to_owned();
        for cell in &self.cells {
            content.push_str(&format!("{}, ", cell));
        }
        if !self.cells.is_empty() {
            content.truncate(content.len() - 2);
        }
        content.push('}');
        write!(f, "{}", content)
    }
}

impl fmt::Debug for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}
