mod field;
mod heap_page;
mod heap_table;
mod page_id;
mod schema;
mod tuple;

pub use field::{Field, Type, MAX_STRING_LEN};
pub use heap_page::{HeapPage, HeapPageIterator};
pub use heap_table::HeapTable;
pub use page_id::HeapPageID;
pub use schema::{FieldItem, TupleDesc};
pub use tuple::{RecordId, Tuple};
