//! Results Wire Types
//!
//! `GET /api/categories/{id}/results` returns
//! `{ "results": [{ "nominee_id": 1, "votes": 12 }, ...] }`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Vote count for one nominee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    /// 1-based position of the nominee in its category
    pub nominee_id: u32,
    pub votes: u64,
}

impl ResultRow {
    pub fn new(nominee_id: u32, votes: u64) -> Self {
        Self { nominee_id, votes }
    }
}

/// Response body of the results endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultsPayload {
    #[serde(default)]
    pub results: Vec<ResultRow>,
}

/// Results snapshot for one category: nominee id -> votes.
///
/// Snapshots are always replaced wholesale; a later row for the same
/// nominee overrides an earlier one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoteCounts(BTreeMap<u32, u64>);

impl VoteCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Votes for a nominee, 0 when absent
    pub fn get(&self, nominee_id: u32) -> u64 {
        self.0.get(&nominee_id).copied().unwrap_or(0)
    }

    pub fn set(&mut self, nominee_id: u32, votes: u64) {
        self.0.insert(nominee_id, votes);
    }

    /// Highest count in the snapshot, 0 when empty
    pub fn max(&self) -> u64 {
        self.0.values().copied().max().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ResultRow> + '_ {
        self.0
            .iter()
            .map(|(&nominee_id, &votes)| ResultRow { nominee_id, votes })
    }
}

impl FromIterator<ResultRow> for VoteCounts {
    fn from_iter<I: IntoIterator<Item = ResultRow>>(iter: I) -> Self {
        let mut counts = Self::new();
        for row in iter {
            counts.set(row.nominee_id, row.votes);
        }
        counts
    }
}

impl From<ResultsPayload> for VoteCounts {
    fn from(payload: ResultsPayload) -> Self {
        payload.results.into_iter().collect()
    }
}
