//! Error types for nutty-engine operations.

use std::time::Duration;

use thiserror::Error;

use crate::record::UserId;

/// Failure reported by an [`AvailabilitySource`](crate::source::AvailabilitySource).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// The backing store could not be reached.
    #[error("availability store unavailable: {0}")]
    Unavailable(String),

    /// The store was reached but the query failed.
    #[error("availability query failed: {0}")]
    Query(String),
}

#[derive(Error, Debug)]
pub enum NuttyError {
    /// Fetching one participant's availability failed; the group computation is aborted.
    #[error("failed to fetch availability for user '{user_id}': {source}")]
    Fetch {
        user_id: UserId,
        #[source]
        source: FetchError,
    },

    #[error("Invalid availability record: {0}")]
    InvalidRecord(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Duplicate user in request: {0}")]
    DuplicateUser(UserId),

    #[error("Availability fetch timed out after {0:?}")]
    Timeout(Duration),

    /// Availability JSON could not be parsed.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, NuttyError>;
