use crate::{
    error::TinyError,
    storage::{Tuple, TupleDesc},
    types::TinyResult,
};

/// The contract every operator in the pipeline implements.
///
/// `next` pulls the next output tuple; end-of-stream is `Ok(None)` and
/// stays `Ok(None)` on further calls. `rewind` restarts the stream from
/// the first output tuple. `close` releases child resources and must be
/// called on every exit path, including after a failed `next`.
pub trait OpIterator {
    fn open(&mut self) -> TinyResult;

    fn has_next(&mut self) -> Result<bool, TinyError>;

    fn next(&mut self) -> Result<Option<Tuple>, TinyError>;

    fn rewind(&mut self) -> TinyResult;

    fn close(&mut self) -> TinyResult;

    fn get_tuple_desc(&self) -> &TupleDesc;
}
