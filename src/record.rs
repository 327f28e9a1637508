// Keyed record trait for append-only storage

use crate::models::Task;
use serde::{Deserialize, Serialize};

/// A record that can be reconciled by id, latest `updated_at` winning
pub trait Record: Serialize + for<'de> Deserialize<'de> + Clone + Send + Sync + 'static {
    /// Unique identifier for this record
    fn id(&self) -> &str;

    /// Timestamp when this record was last updated (milliseconds since epoch)
    fn updated_at(&self) -> i64;
}

impl Record for Task {
    fn id(&self) -> &str {
        &self.id
    }

    fn updated_at(&self) -> i64 {
        self.updated_at
            .or(self.created_at)
            .map(|ts| ts.timestamp_millis())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_task_record_updated_at_fallbacks() {
        let mut task = Task::new("Test");
        task.created_at = Some(Utc.timestamp_millis_opt(1_000).unwrap());
        task.updated_at = Some(Utc.timestamp_millis_opt(2_000).unwrap());
        assert_eq!(Record::updated_at(&task), 2_000);

        task.updated_at = None;
        assert_eq!(Record::updated_at(&task), 1_000);

        task.created_at = None;
        assert_eq!(Record::updated_at(&task), 0);
    }

    #[test]
    fn test_task_record_id() {
        let task = Task::new("Test");
        assert_eq!(Record::id(&task), task.id);
    }
}
