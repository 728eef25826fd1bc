use crate::DocId;
use thiserror::Error;

/// Faults raised by the index itself, as opposed to I/O plumbing.
#[derive(Debug, Error, PartialEq)]
pub enum IndexError {
    /// A posting points at a document the store does not hold.
    #[error("document {0} is referenced by a posting but missing from the store")]
    MissingDocument(DocId),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("index metadata missing at {0}")]
    MissingMeta(String),
}
