use std::{cmp::Ordering, fmt};

use crate::{
    error::TinyError,
    io::{read_exact, Decodeable, Encodeable},
};

/// Fixed capacity of a string cell on disk, in bytes. Shorter strings
/// are zero-padded, longer ones are truncated on write.
pub const MAX_STRING_LEN: usize = 128;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Type {
    Int,
    Str,
}

impl Type {
    /// Get the size of the type on disk, in bytes.
    pub fn get_disk_size(&self) -> usize {
        match self {
            Type::Int => 4,
            // The first 4 bytes record the actual length of the string.
            Type::Str => 4 + MAX_STRING_LEN,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Field {
    Int(i32),
    Str(String),
}

impl Field {
    pub fn get_type(&self) -> Type {
        match self {
            Field::Int(_) => Type::Int,
            Field::Str(_) => Type::Str,
        }
    }

    pub fn get_int(&self) -> Result<i32, TinyError> {
        match self {
            Field::Int(v) => Ok(*v),
            _ => Err(TinyError::new("not an int field")),
        }
    }

    pub fn get_string(&self) -> Result<String, TinyError> {
        match self {
            Field::Str(v) => Ok(v.clone()),
            _ => Err(TinyError::new("not a string field")),
        }
    }

    pub fn read_from<R: std::io::Read>(reader: &mut R, t: &Type) -> Result<Self, TinyError> {
        match t {
            Type::Int => Ok(Field::Int(i32::decode_from(reader)?)),
            Type::Str => {
                let len = u32::decode_from(reader)? as usize;
                let payload = read_exact(reader, MAX_STRING_LEN)?;
                if len > MAX_STRING_LEN {
                    return Err(TinyError::new(&format!(
                        "corrupt string cell, length {} exceeds {}",
                        len, MAX_STRING_LEN
                    )));
                }
                let s = String::from_utf8(payload[..len].to_vec())
                    .or(Err(TinyError::new("corrupt string cell, invalid utf-8")))?;
                Ok(Field::Str(s))
            }
        }
    }
}

impl Encodeable for Field {
    fn encode(&self) -> Vec<u8> {
        match self {
            Field::Int(v) => v.to_be_bytes().to_vec(),
            Field::Str(v) => {
                let payload = v.as_bytes();
                let len = payload.len().min(MAX_STRING_LEN);

                let mut bytes = Vec::with_capacity(4 + MAX_STRING_LEN);
                bytes.extend_from_slice(&(len as u32).to_be_bytes());
                bytes.extend_from_slice(&payload[..len]);
                bytes.resize(4 + MAX_STRING_LEN, 0);
                bytes
            }
        }
    }
}

impl PartialOrd for Field {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Field::Int(a), Field::Int(b)) => a.partial_cmp(b),
            (Field::Str(a), Field::Str(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl Ord for Field {
    fn cmp(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap()
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Field::Int(v) => write!(f, "{}", v),
            Field::Str(v) => write!(f, "{}", v),
        }
    }
}
