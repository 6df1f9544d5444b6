//! Common error types for the podcast site

use thiserror::Error;

/// Common result type for podcast operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the podcast crates
#[derive(Error, Debug)]
pub enum Error {
    /// Remote data source unreachable or answering with a server error
    #[error("Source fetch error: {0}")]
    SourceFetch(String),

    /// Record missing `file`, carrying a bad timestamp, or failing schema decoding
    #[error("Malformed record {id}: {reason}")]
    MalformedRecord { id: String, reason: String },

    /// Requested episode does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// `play_list` called with an index outside the list
    #[error("Invalid playback index {index} for queue of length {len}")]
    InvalidPlaybackIndex { index: usize, len: usize },

    /// Queue sent by a client that cannot be played as given
    #[error("Invalid queue: {0}")]
    InvalidQueue(String),

    /// Navigation requested on an empty playback queue
    #[error("Playback queue is empty")]
    EmptyQueue,

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::MalformedRecord {
            id: id.into(),
            reason: reason.into(),
        }
    }
}
