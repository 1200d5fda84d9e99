use std::fmt;

use itertools::Itertools;

use crate::{error::TinyError, storage::Type};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldItem {
    pub field_type: Type,
    pub field_name: Option<String>,
}

impl FieldItem {
    pub fn new(field_type: Type, field_name: &str) -> Self {
        Self {
            field_type,
            field_name: Some(field_name.to_string()),
        }
    }

    pub fn anonymous(field_type: Type) -> Self {
        Self {
            field_type,
            field_name: None,
        }
    }
}

/// The schema of a tuple: an ordered list of typed, optionally named
/// fields. Immutable after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleDesc {
    fields: Vec<FieldItem>,
}

// Constructors
impl TupleDesc {
    pub fn new(fields: Vec<FieldItem>) -> Self {
        Self { fields }
    }

    /// A schema of `width` int columns named `int-column-0..`, keyed on
    /// the first one. Used all over the tests.
    pub fn small_int_desc(width: usize) -> Self {
        let mut fields = Vec::new();
        for i in 0..width {
            fields.push(FieldItem::new(Type::Int, &format!("int-column-{}", i)));
        }
        Self::new(fields)
    }

    /// Concatenate two schemas, left fields first.
    pub fn merge(left: &TupleDesc, right: &TupleDesc) -> TupleDesc {
        let mut fields = left.fields.clone();
        fields.extend(right.fields.clone());
        TupleDesc::new(fields)
    }
}

impl TupleDesc {
    pub fn get_fields(&self) -> &Vec<FieldItem> {
        &self.fields
    }

    pub fn fields_count(&self) -> usize {
        self.fields.len()
    }

    /// Get the size of a tuple of this schema on disk, in bytes.
    pub fn get_size(&self) -> usize {
        self.fields
            .iter()
            .map(|field| field.field_type.get_disk_size())
            .sum()
    }

    pub fn get_field_type(&self, i: usize) -> Result<Type, TinyError> {
        match self.fields.get(i) {
            Some(field) => Ok(field.field_type),
            None => Err(TinyError::not_found(&format!("no field at index {}", i))),
        }
    }

    pub fn get_field_name(&self, i: usize) -> Result<Option<String>, TinyError> {
        match self.fields.get(i) {
            Some(field) => Ok(field.field_name.clone()),
            None => Err(TinyError::not_found(&format!("no field at index {}", i))),
        }
    }

    pub fn get_field_pos(&self, field_name: &str) -> Result<usize, TinyError> {
        for (i, field) in self.fields.iter().enumerate() {
            if field.field_name.as_deref() == Some(field_name) {
                return Ok(i);
            }
        }
        Err(TinyError::not_found(&format!(
            "no field named {:?}",
            field_name
        )))
    }

    /// Field-type compatibility, ignoring names. Two schemas that only
    /// differ through aliasing describe the same tuples.
    pub fn compatible(&self, other: &TupleDesc) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(other.fields.iter())
                .all(|(a, b)| a.field_type == b.field_type)
    }

    /// A copy of this schema with every field renamed to
    /// "alias.field_name".
    pub fn alias(&self, alias: &str) -> TupleDesc {
        let fields = self
            .fields
            .iter()
            .map(|field| FieldItem {
                field_type: field.field_type,
                field_name: Some(format!(
                    "{}.{}",
                    alias,
                    field.field_name.as_deref().unwrap_or("null")
                )),
            })
            .collect();
        TupleDesc::new(fields)
    }
}

impl fmt::Display for TupleDesc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let content = self
            .fields
            .iter()
            .map(|field| {
                format!(
                    "{:?}({})",
                    field.field_type,
                    field.field_name.as_deref().unwrap_or("null")
                )
            })
            .join(", ");
        write!(f, "[{}]", content)
    }
}
