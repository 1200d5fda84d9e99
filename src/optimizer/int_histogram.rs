use core::fmt;
use std::cmp;

use crate::predicate::Op;

/// Equi-width histogram over a closed integer range, used to estimate
/// the selectivity of a predicate over one column.
///
/// The arithmetic runs in i64/f64 so the range edges cannot overflow.
pub struct IntHistogram {
    min: i64,
    max: i64,
    width: i64,

    counts: Vec<usize>,
    total: usize,
}

impl IntHistogram {
    pub fn new(buckets_requested: usize, min: i32, max: i32) -> Self {
        let min = min as i64;
        let max = max as i64;
        let span = max - min + 1;

        // never more buckets than distinct values
        let buckets = cmp::max(1, cmp::min(buckets_requested as i64, span)) as usize;
        let width = (span + buckets as i64 - 1) / buckets as i64;

        Self {
            min,
            max,
            width,
            counts: vec![0; buckets],
            total: 0,
        }
    }

    /// Record one value. Out-of-range values are ignored.
    pub fn add_value(&mut self, v: i32) {
        let v = v as i64;
        if v < self.min || v > self.max {
            return;
        }
        let b = self.bucket_of(v);
        self.counts[b] += 1;
        self.total += 1;
    }

    /// Estimated fraction of recorded values satisfying `v_column op v`,
    /// always in [0, 1].
    pub fn estimate_selectivity(&self, op: &Op, v: i32) -> f64 {
        if self.total == 0 {
            return 0.0;
        }

        let v = v as i64;

        // out-of-range short-circuits, before any bucket math
        if v < self.min {
            return match op {
                Op::GreaterThan | Op::GreaterThanOrEq | Op::NotEquals => 1.0,
                _ => 0.0,
            };
        }
        if v > self.max {
            return match op {
                Op::LessThan | Op::LessThanOrEq | Op::NotEquals => 1.0,
                _ => 0.0,
            };
        }

        match op {
            Op::Equals | Op::Like => self.selectivity_eq(v),
            Op::NotEquals => 1.0 - self.selectivity_eq(v),
            Op::GreaterThan => self.selectivity_gt(v),
            Op::LessThan => self.selectivity_lt(v),
            Op::GreaterThanOrEq => {
                if v - 1 < self.min {
                    1.0
                } else {
                    self.selectivity_gt(v - 1)
                }
            }
            Op::LessThanOrEq => {
                if v + 1 > self.max {
                    1.0
                } else {
                    self.selectivity_lt(v + 1)
                }
            }
        }
    }

    /// Mean selectivity of an equality predicate over the buckets.
    pub fn avg_selectivity(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }

        let mut sum = 0.0;
        for count in &self.counts {
            sum += (*count as f64 / self.width as f64) / self.total as f64;
        }
        sum / self.counts.len() as f64
    }

    fn bucket_of(&self, v: i64) -> usize {
        let b = (v - self.min) / self.width;
        cmp::min(b as usize, self.counts.len() - 1)
    }

    fn selectivity_eq(&self, v: i64) -> f64 {
        let b = self.bucket_of(v);
        self.counts[b] as f64 / self.width as f64 / self.total as f64
    }

    fn selectivity_gt(&self, v: i64) -> f64 {
        let b = self.bucket_of(v);
        let right = self.min + (b as i64 + 1) * self.width - 1;

        // the fraction of bucket b to the right of v, plus every
        // bucket above it
        let mut tuples = ((right - v) as f64 / self.width as f64) * self.counts[b] as f64;
        for count in &self.counts[b + 1..] {
            tuples += *count as f64;
        }
        tuples / self.total as f64
    }

    fn selectivity_lt(&self, v: i64) -> f64 {
        let b = self.bucket_of(v);
        let left = self.min + b as i64 * self.width;

        let mut tuples = ((v - left) as f64 / self.width as f64) * self.counts[b] as f64;
        for count in &self.counts[..b] {
            tuples += *count as f64;
        }
        tuples / self.total as f64
    }
}

impl fmt::Display for IntHistogram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "<IntHistogram, range: [{}, {}], width: {}, total: {}>",
            self.min, self.max, self.width, self.total
        )
    }
}
