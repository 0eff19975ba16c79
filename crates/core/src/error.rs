use thiserror::Error;

/// Errors crossing the database's only fallible boundary: snapshot I/O.
///
/// The build itself is total over a well-formed deck; internal invariant
/// violations panic rather than surface here.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot serialization: {0}")]
    Serialize(String),
}
