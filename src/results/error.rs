//! Results API Errors

use thiserror::Error;

/// Errors from fetching a results snapshot.
///
/// The poller treats all of these the same way: skip the tick and keep
/// showing the last good snapshot.
#[derive(Debug, Error)]
pub enum ResultsError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Results API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed results payload: {0}")]
    Decode(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Results API unavailable")]
    Unavailable,

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl ResultsError {
    /// Map a transport error onto the coarser categories
    pub(crate) fn from_transport(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            ResultsError::Timeout
        } else if error.is_connect() {
            ResultsError::Unavailable
        } else {
            ResultsError::Request(error)
        }
    }
}
