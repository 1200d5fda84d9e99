use std::fmt;

use crate::storage::{Field, Tuple};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Op {
    Equals,
    GreaterThan,
    GreaterThanOrEq,
    LessThan,
    LessThanOrEq,
    Like,
    NotEquals,
}

/// Compare two cells under an operator. Comparisons across field kinds
/// never hold; `Like` is substring containment on strings and plain
/// equality on ints.
pub(crate) fn cell_matches(lhs: &Field, op: &Op, rhs: &Field) -> bool {
    match op {
        Op::Equals => lhs == rhs,
        Op::NotEquals => lhs != rhs,
        Op::GreaterThan => matches!(lhs.partial_cmp(rhs), Some(std::cmp::Ordering::Greater)),
        Op::GreaterThanOrEq => matches!(
            lhs.partial_cmp(rhs),
            Some(std::cmp::Ordering::Greater) | Some(std::cmp::Ordering::Equal)
        ),
        Op::LessThan => matches!(lhs.partial_cmp(rhs), Some(std::cmp::Ordering::Less)),
        Op::LessThanOrEq => matches!(
            lhs.partial_cmp(rhs),
            Some(std::cmp::Ordering::Less) | Some(std::cmp::Ordering::Equal)
        ),
        Op::Like => match (lhs, rhs) {
            (Field::Str(a), Field::Str(b)) => a.contains(b.as_str()),
            _ => lhs == rhs,
        },
    }
}

/// Compare one field of a tuple against a constant.
#[derive(Clone)]
pub struct Predicate {
    pub field_index: usize,
    pub op: Op,
    pub operand: Field,
}

impl Predicate {
    pub fn new(field_index: usize, op: Op, operand: &Field) -> Self {
        Self {
            field_index,
            op,
            operand: operand.clone(),
        }
    }

    pub fn matches(&self, tuple: &Tuple) -> bool {
        cell_matches(&tuple.get_cell(self.field_index), &self.op, &self.operand)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "field_index: {}, op: {:?}, operand: {:?}",
            self.field_index, self.op, self.operand
        )
    }
}

/// Compare one field of a left tuple against one field of a right
/// tuple.
#[derive(Clone)]
pub struct JoinPredicate {
    pub field1: usize,
    pub op: Op,
    pub field2: usize,
}

impl JoinPredicate {
    pub fn new(field1: usize, op: Op, field2: usize) -> Self {
        Self { field1, op, field2 }
    }

    pub fn matches(&self, left: &Tuple, right: &Tuple) -> bool {
        cell_matches(
            &left.get_cell(self.field1),
            &self.op,
            &right.get_cell(self.field2),
        )
    }
}
