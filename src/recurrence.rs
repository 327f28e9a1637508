// Recurring tasks: roll a completed task forward to its next occurrence

use crate::models::{RecurrenceType, Task};
use chrono::{DateTime, Datelike, Duration, Months, Utc};
use tracing::debug;

/// Next due date after `due` for the given recurrence
///
/// Monthly recurrence keeps the day of month, clamped to the last day of the
/// target month (Jan 31 -> Feb 28/29).
pub fn next_due_date(due: DateTime<Utc>, recurrence: RecurrenceType) -> Option<DateTime<Utc>> {
    match recurrence {
        RecurrenceType::Daily => due.checked_add_signed(Duration::days(1)),
        RecurrenceType::Weekly => due.checked_add_signed(Duration::weeks(1)),
        RecurrenceType::Monthly => due.checked_add_months(Months::new(1)),
    }
}

/// Fresh pending copy of a completed recurring task, due at its next date
///
/// Returns `None` for tasks that are not completed, do not recur, or have no
/// due date to advance from.
pub fn next_occurrence(task: &Task, now: DateTime<Utc>) -> Option<Task> {
    if !task.completed {
        return None;
    }
    let recurrence = task.recurrence_type?;
    let due = task.due_date?;
    let next_due = next_due_date(due, recurrence)?;

    debug!(
        id = %task.id,
        recurrence = %recurrence,
        next_due = %next_due,
        day = next_due.day(),
        "Scheduling next occurrence"
    );

    Some(Task {
        id: uuid::Uuid::now_v7().to_string(),
        completed: false,
        due_date: Some(next_due),
        created_at: Some(now),
        updated_at: Some(now),
        ..task.clone()
    })
}
