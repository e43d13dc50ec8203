//! Library error type. The CLI driver wraps these in `anyhow`; nothing in
//! `monitor65` itself needs more than a handful of named failure modes.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("ROM image is missing the `{0}` segment")]
    MissingSegment(&'static str),

    #[error("ROM segment `{name}` is {len} bytes, which does not fit in {capacity}")]
    SegmentTooLarge {
        name: &'static str,
        len: usize,
        capacity: usize,
    },

    #[error("I/O error loading ROM: {0}")]
    Io(#[from] std::io::Error),
}
