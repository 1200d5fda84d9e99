mod aggregate;
mod aggregator;
mod delete;
mod filter;
mod insert;
mod join;
mod op_iterator;
mod order_by;
mod seq_scan;

pub use aggregate::Aggregate;
pub use aggregator::{AggregateOp, Aggregator, IntegerAggregator, StringAggregator};
pub use delete::Delete;
pub use filter::Filter;
pub use insert::Insert;
pub use join::Join;
pub use op_iterator::OpIterator;
pub use order_by::OrderBy;
pub use seq_scan::SeqScan;
