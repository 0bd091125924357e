//! Error types for the scheduler.

use crate::category::CategoryId;

/// Errors surfaced by scheduler and job operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A category tag outside the range configured at startup.
    #[error("category {index} out of range (scheduler has {count} categories)")]
    InvalidCategory {
        /// The offending tag.
        index: usize,
        /// Number of categories the scheduler was started with.
        count: usize,
    },

    /// The job was already dispatched; late dependency registration or a
    /// second `dispatch()` would race against the running graph.
    #[error("job '{0}' already dispatched")]
    AlreadyDispatched(&'static str),

    /// Rejected scheduler configuration.
    #[error("invalid scheduler config: {0}")]
    InvalidConfig(&'static str),

    /// One or more worker threads panicked during shutdown.
    #[error("{0} worker thread(s) panicked")]
    WorkersPanicked(usize),
}

impl Error {
    /// Helper for the bounds check on category tags.
    pub(crate) fn invalid_category(id: CategoryId, count: usize) -> Self {
        Error::InvalidCategory {
            index: id.index(),
            count,
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
