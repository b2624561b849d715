//! Sorting logic for sibling issues.
//!
//! Roots and every node's children are ordered here once, when a graph is
//! built. Display order afterwards is exactly the order of `Graph::roots`
//! and `Node::children`.

use super::{IssueRecord, SortMode};
use std::cmp::Ordering;

/// Compare two sibling records under the given sort mode.
///
/// The sort is stable, so ties keep the order `bd` emitted them in.
pub fn compare(a: &IssueRecord, b: &IssueRecord, sort_mode: SortMode) -> Ordering {
    match sort_mode {
        SortMode::ByStatus => a
            .status
            .sort_order()
            .cmp(&b.status.sort_order())
            .then_with(|| a.priority.sort_order().cmp(&b.priority.sort_order())),
        SortMode::ByPriority => a.priority.sort_order().cmp(&b.priority.sort_order()),
        // Most recent first
        SortMode::ByLastUpdated => b.updated_at.cmp(&a.updated_at),
        SortMode::ById => a.id.cmp(&b.id),
    }
}

/// Sort sibling records in place.
pub fn sort_siblings(siblings: &mut [&IssueRecord], sort_mode: SortMode) {
    siblings.sort_by(|a, b| compare(a, b, sort_mode));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{BeadPriority, BeadStatus, IssueType};
    use chrono::{TimeZone, Utc};

    fn make_record(id: &str, status: BeadStatus, priority: BeadPriority, day: u32) -> IssueRecord {
        IssueRecord {
            id: id.to_string(),
            title: format!("Issue {}", id),
            description: None,
            status,
            priority,
            issue_type: IssueType::Task,
            assignee: None,
            labels: vec![],
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            updated_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            dependencies: vec![],
        }
    }

    #[test]
    fn test_sort_by_status() {
        let r1 = make_record("1", BeadStatus::Closed, BeadPriority::Medium, 1);
        let r2 = make_record("2", BeadStatus::InProgress, BeadPriority::Medium, 1);
        let r3 = make_record("3", BeadStatus::Open, BeadPriority::Medium, 1);

        let mut siblings = vec![&r1, &r2, &r3];
        sort_siblings(&mut siblings, SortMode::ByStatus);

        // InProgress comes before Open comes before Closed
        assert_eq!(siblings[0].id, "2");
        assert_eq!(siblings[1].id, "3");
        assert_eq!(siblings[2].id, "1");
    }

    #[test]
    fn test_sort_by_priority_is_stable() {
        let r1 = make_record("1", BeadStatus::Open, BeadPriority::Low, 1);
        let r2 = make_record("2", BeadStatus::Open, BeadPriority::Critical, 1);
        let r3 = make_record("3", BeadStatus::Open, BeadPriority::Low, 1);

        let mut siblings = vec![&r1, &r2, &r3];
        sort_siblings(&mut siblings, SortMode::ByPriority);

        assert_eq!(siblings[0].id, "2");
        assert_eq!(siblings[1].id, "1");
        assert_eq!(siblings[2].id, "3");
    }

    #[test]
    fn test_sort_by_last_updated_newest_first() {
        let r1 = make_record("1", BeadStatus::Open, BeadPriority::Medium, 3);
        let r2 = make_record("2", BeadStatus::Open, BeadPriority::Medium, 9);

        let mut siblings = vec![&r1, &r2];
        sort_siblings(&mut siblings, SortMode::ByLastUpdated);

        assert_eq!(siblings[0].id, "2");
        assert_eq!(siblings[1].id, "1");
    }
}
