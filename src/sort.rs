// Sort comparators, one per sort key

use crate::models::Task;
use crate::query::{SortKey, SortOrder};
use std::cmp::Ordering;

impl SortKey {
    /// Compare two tasks under this key and direction
    pub fn compare(self, a: &Task, b: &Task, order: SortOrder) -> Ordering {
        match self {
            SortKey::Title => order.apply(a.title.to_lowercase().cmp(&b.title.to_lowercase())),
            SortKey::Priority => order.apply(priority_label(a).cmp(priority_label(b))),
            SortKey::Completed => order.apply(a.completed.cmp(&b.completed)),
            SortKey::DueDate => undated_last(a.due_date, b.due_date, order),
            SortKey::CreatedAt => nulls_follow_order(a.created_at, b.created_at, order),
        }
    }
}

/// Lexical label, not severity: "Critical" < "High" < "Low" < "Medium"
fn priority_label(task: &Task) -> &'static str {
    task.priority.map(|p| p.as_str()).unwrap_or("")
}

/// Missing values sort last in both directions
fn undated_last<T: Ord>(a: Option<T>, b: Option<T>, order: SortOrder) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => order.apply(a.cmp(&b)),
    }
}

/// Missing values sort last ascending and first descending
fn nulls_follow_order<T: Ord>(a: Option<T>, b: Option<T>, order: SortOrder) -> Ordering {
    let ascending = match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => a.cmp(&b),
    };
    order.apply(ascending)
}

/// Stable in-place sort; ties keep their input order
pub fn sort_tasks(tasks: &mut [&Task], key: SortKey, order: SortOrder) {
    tasks.sort_by(|a, b| key.compare(a, b, order));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;
    use chrono::{TimeZone, Utc};

    fn task(id: &str, title: &str) -> Task {
        let mut task = Task::new(title);
        task.id = id.to_string();
        task.created_at = None;
        task.updated_at = None;
        task
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn test_title_is_case_insensitive() {
        let a = task("a", "banana");
        let b = task("b", "Apple");
        let c = task("c", "cherry");
        let mut view = vec![&a, &b, &c];

        sort_tasks(&mut view, SortKey::Title, SortOrder::Asc);
        assert_eq!(ids(&view), ["b", "a", "c"]);

        sort_tasks(&mut view, SortKey::Title, SortOrder::Desc);
        assert_eq!(ids(&view), ["c", "a", "b"]);
    }

    #[test]
    fn test_priority_is_lexical_with_absent_as_empty() {
        let mut low = task("low", "x");
        low.priority = Some(Priority::Low);
        let mut critical = task("critical", "x");
        critical.priority = Some(Priority::Critical);
        let mut medium = task("medium", "x");
        medium.priority = Some(Priority::Medium);
        let mut high = task("high", "x");
        high.priority = Some(Priority::High);
        let none = task("none", "x");

        let mut view = vec![&low, &critical, &medium, &none, &high];
        sort_tasks(&mut view, SortKey::Priority, SortOrder::Asc);
        assert_eq!(ids(&view), ["none", "critical", "high", "low", "medium"]);

        sort_tasks(&mut view, SortKey::Priority, SortOrder::Desc);
        assert_eq!(ids(&view), ["medium", "low", "high", "critical", "none"]);
    }

    #[test]
    fn test_completed_false_before_true_ascending() {
        let mut done = task("done", "x");
        done.completed = true;
        let open = task("open", "x");

        let mut view = vec![&done, &open];
        sort_tasks(&mut view, SortKey::Completed, SortOrder::Asc);
        assert_eq!(ids(&view), ["open", "done"]);

        sort_tasks(&mut view, SortKey::Completed, SortOrder::Desc);
        assert_eq!(ids(&view), ["done", "open"]);
    }

    #[test]
    fn test_due_date_undated_last_in_both_directions() {
        let mut early = task("early", "x");
        early.due_date = Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let mut late = task("late", "x");
        late.due_date = Some(Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap());
        let undated = task("undated", "x");

        let mut view = vec![&undated, &late, &early];
        sort_tasks(&mut view, SortKey::DueDate, SortOrder::Asc);
        assert_eq!(ids(&view), ["early", "late", "undated"]);

        sort_tasks(&mut view, SortKey::DueDate, SortOrder::Desc);
        assert_eq!(ids(&view), ["late", "early", "undated"]);
    }

    #[test]
    fn test_created_at_nulls_follow_direction() {
        let mut old = task("old", "x");
        old.created_at = Some(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let mut new = task("new", "x");
        new.created_at = Some(Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap());
        let unknown = task("unknown", "x");

        let mut view = vec![&unknown, &new, &old];
        sort_tasks(&mut view, SortKey::CreatedAt, SortOrder::Asc);
        assert_eq!(ids(&view), ["old", "new", "unknown"]);

        sort_tasks(&mut view, SortKey::CreatedAt, SortOrder::Desc);
        assert_eq!(ids(&view), ["unknown", "new", "old"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let a = task("a", "Same");
        let b = task("b", "same");
        let c = task("c", "SAME");

        let mut view = vec![&b, &c, &a];
        sort_tasks(&mut view, SortKey::Title, SortOrder::Desc);
        assert_eq!(ids(&view), ["b", "c", "a"]);
    }
}
