//! Chart Data
//!
//! Joins a category's nominee list with its latest results snapshot.

use serde::{Deserialize, Serialize};

use crate::catalog::Category;
use crate::results::VoteCounts;

/// One bar's worth of data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDataPoint {
    pub name: String,
    pub value: u64,
}

/// Join nominees (declared order) with vote counts.
///
/// Nominees missing from the snapshot get 0; rows for nominee ids outside
/// the list are ignored. The result is never sorted by value.
pub fn join_results(category: &Category, counts: Option<&VoteCounts>) -> Vec<ChartDataPoint> {
    category
        .nominees
        .iter()
        .enumerate()
        .map(|(position, name)| {
            let nominee_id = position as u32 + 1;
            ChartDataPoint {
                name: name.clone(),
                value: counts.map(|c| c.get(nominee_id)).unwrap_or(0),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::ResultRow;

    fn category() -> Category {
        Category::new(1, "Best Newcomer", ["Alice", "Bob", "Carol"])
    }

    #[test]
    fn test_missing_nominee_defaults_to_zero() {
        let counts: VoteCounts = vec![ResultRow::new(1, 12), ResultRow::new(3, 7)]
            .into_iter()
            .collect();

        let points = join_results(&category(), Some(&counts));

        assert_eq!(
            points,
            vec![
                ChartDataPoint { name: "Alice".into(), value: 12 },
                ChartDataPoint { name: "Bob".into(), value: 0 },
                ChartDataPoint { name: "Carol".into(), value: 7 },
            ]
        );
    }

    #[test]
    fn test_order_follows_nominee_list_not_votes() {
        let counts: VoteCounts = vec![
            ResultRow::new(1, 1),
            ResultRow::new(2, 500),
            ResultRow::new(3, 40),
        ]
        .into_iter()
        .collect();

        let names: Vec<_> = join_results(&category(), Some(&counts))
            .into_iter()
            .map(|p| p.name)
            .collect();

        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
    }

    #[test]
    fn test_no_snapshot_is_all_zero() {
        let points = join_results(&category(), None);
        assert!(points.iter().all(|p| p.value == 0));
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn test_unknown_nominee_ids_ignored() {
        let counts: VoteCounts = vec![ResultRow::new(9, 100)].into_iter().collect();
        let points = join_results(&category(), Some(&counts));
        assert!(points.iter().all(|p| p.value == 0));
    }
}
