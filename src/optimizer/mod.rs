mod int_histogram;
mod string_histogram;
mod table_stats;

pub use int_histogram::IntHistogram;
pub use string_histogram::StringHistogram;
pub use table_stats::{TableStats, NUM_HIST_BINS};
