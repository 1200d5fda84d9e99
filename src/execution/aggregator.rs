use core::fmt;
use std::collections::HashMap;

use itertools::Itertools;

use crate::{
    error::TinyError,
    storage::{Field, Tuple},
    types::TinyResult,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AggregateOp {
    Min,
    Max,
    Sum,
    Avg,
    Count,
}

impl fmt::Display for AggregateOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            AggregateOp::Min => "MIN",
            AggregateOp::Max => "MAX",
            AggregateOp::Sum => "SUM",
            AggregateOp::Avg => "AVG",
            AggregateOp::Count => "COUNT",
        };
        write!(f, "{}", name)
    }
}

/// Folds the tuples of a relation into one value per group. The group
/// key is `None` when the caller aggregates without grouping.
pub trait Aggregator {
    fn merge(&mut self, tuple: &Tuple) -> TinyResult;

    /// One `(group, value)` pair per group seen so far, in group order.
    fn results(&self) -> Vec<(Option<Field>, i32)>;
}

struct IntAggState {
    sum: i64,
    count: i64,
    min: i32,
    max: i32,
}

impl IntAggState {
    fn new(first: i32) -> Self {
        Self {
            sum: first as i64,
            count: 1,
            min: first,
            max: first,
        }
    }

    fn merge(&mut self, v: i32) {
        self.sum += v as i64;
        self.count += 1;
        self.min = self.min.min(v);
        self.max = self.max.max(v);
    }

    fn value(&self, op: &AggregateOp) -> i32 {
        match op {
            AggregateOp::Min => self.min,
            AggregateOp::Max => self.max,
            AggregateOp::Sum => self.sum as i32,
            // integer division truncates toward zero, like the rest of
            // the arithmetic in the engine
            AggregateOp::Avg => (self.sum / self.count) as i32,
            AggregateOp::Count => self.count as i32,
        }
    }
}

/// Running aggregate over an int column, one state per group.
pub struct IntegerAggregator {
    g_field: Option<usize>,
    a_field: usize,
    op: AggregateOp,

    groups: HashMap<Option<Field>, IntAggState>,
}

impl IntegerAggregator {
    pub fn new(g_field: Option<usize>, a_field: usize, op: AggregateOp) -> Self {
        Self {
            g_field,
            a_field,
            op,
            groups: HashMap::new(),
        }
    }
}

impl Aggregator for IntegerAggregator {
    fn merge(&mut self, tuple: &Tuple) -> TinyResult {
        let group = self.g_field.map(|g| tuple.get_cell(g));
        let v = tuple.get_cell(self.a_field).get_int()?;

        match self.groups.get_mut(&group) {
            Some(state) => state.merge(v),
            None => {
                self.groups.insert(group, IntAggState::new(v));
            }
        }
        Ok(())
    }

    fn results(&self) -> Vec<(Option<Field>, i32)> {
        self.groups
            .iter()
            .map(|(group, state)| (group.clone(), state.value(&self.op)))
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .collect()
    }
}

/// Counting aggregate over a string column. COUNT is the only
/// operation that makes sense on strings; anything else is rejected
/// up front.
pub struct StringAggregator {
    g_field: Option<usize>,

    groups: HashMap<Option<Field>, i64>,
}

impl StringAggregator {
    pub fn new(g_field: Option<usize>, _a_field: usize, op: AggregateOp) -> Result<Self, TinyError> {
        if op != AggregateOp::Count {
            return Err(TinyError::unsupported(&format!(
                "string aggregator only supports COUNT, got {}",
                op
            )));
        }

        Ok(Self {
            g_field,
            groups: HashMap::new(),
        })
    }
}

impl Aggregator for StringAggregator {
    fn merge(&mut self, tuple: &Tuple) -> TinyResult {
        let group = self.g_field.map(|g| tuple.get_cell(g));
        *self.groups.entry(group).or_insert(0) += 1;
        Ok(())
    }

    fn results(&self) -> Vec<(Option<Field>, i32)> {
        self.groups
            .iter()
            .map(|(group, count)| (group.clone(), *count as i32))
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .collect()
    }
}
