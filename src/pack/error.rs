use std::path::PathBuf;

use thiserror::Error;

/// Typed packing errors. Everything here is fatal to the pack run; in
/// particular a duplicate media identifier aborts indexing outright, since
/// silently picking one of two colliding files would corrupt the archive.
#[derive(Debug, Error)]
pub enum PackError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    #[error("duplicate media id {id}: {} and {}", first.display(), second.display())]
    DuplicateId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("cannot decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed line {line} in {}", path.display())]
    MalformedIndex { path: PathBuf, line: usize },

    #[error("bad created_time {value:?} in {}", path.display())]
    BadTimestamp { path: PathBuf, value: String },
}
