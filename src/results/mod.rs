//! Live Results
//!
//! Wire types and the HTTP client for the voting backend's results
//! endpoint. The backend is the authority on vote counts; this side only
//! reads snapshots.

mod client;
mod error;
mod types;

pub use client::{HttpResultsClient, ResultsApi, ResultsClientConfig};
pub use error::ResultsError;
pub use types::{ResultRow, ResultsPayload, VoteCounts};
