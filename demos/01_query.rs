//! Example 01: Querying a Task List
//!
//! This example builds a small in-memory task list and runs searches, filters
//! and sorts against it with a frozen clock, so the due-date windows are
//! reproducible.
//!
//! Run with: cargo run --example 01_query

use chrono::{DateTime, Utc};
use eyre::Result;
use taskquery::{
    DueDateRange, FixedClock, Priority, QueryEngine, QuerySpec, SortKey, SortOrder, StatusFilter, Tag, Task,
};

fn task(title: &str, priority: Option<Priority>, due: Option<&str>, tags: &[(i64, &str)]) -> Result<Task> {
    let mut task = Task::new(title);
    task.priority = priority;
    task.due_date = due
        .map(|d| DateTime::parse_from_rfc3339(d).map(|d| d.with_timezone(&Utc)))
        .transpose()?;
    task.tags = tags.iter().map(|(id, name)| Tag::new(*id, *name)).collect();
    Ok(task)
}

fn show(label: &str, view: &[&Task]) {
    println!("{} ({} tasks)", label, view.len());
    for task in view {
        let priority = task.priority.map(|p| p.to_string()).unwrap_or_default();
        let due = task
            .due_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("  {:<28} {:<9} {}", task.title, priority, due);
    }
    println!();
}

fn main() -> Result<()> {
    println!("TaskQuery Query Example");
    println!("=======================\n");

    let engine = QueryEngine::new(FixedClock::parse("2026-05-13T12:00:00+00:00")?);

    let mut paid = task("Pay electricity bill", Some(Priority::High), Some("2026-05-11T09:00:00Z"), &[
        (1, "money"),
    ])?;
    paid.completed = true;

    let tasks = vec![
        task("Renew passport", Some(Priority::Critical), Some("2026-05-12T17:00:00Z"), &[
            (2, "travel"),
        ])?,
        task("Book flights", Some(Priority::Medium), Some("2026-05-13T20:00:00Z"), &[
            (2, "travel"),
            (1, "money"),
        ])?,
        task("Water the plants", Some(Priority::Low), Some("2026-05-16T08:00:00Z"), &[(3, "home")])?,
        task("Plan summer trip", None, Some("2026-05-28T10:00:00Z"), &[(2, "travel")])?,
        task("Read a novel", None, None, &[])?,
        paid,
    ];

    show("Everything, newest first", &engine.evaluate(&tasks, &QuerySpec::default()));

    let query = QuerySpec::default().with_search("TRAVEL");
    show("Search \"TRAVEL\" (matches tag names too)", &engine.evaluate(&tasks, &query));

    let query = QuerySpec::default()
        .with_status(StatusFilter::Pending)
        .with_due_date_range(DueDateRange::Overdue);
    show("Pending and overdue", &engine.evaluate(&tasks, &query));

    let query = QuerySpec::default()
        .with_due_date_range(DueDateRange::Week)
        .sorted_by(SortKey::DueDate, SortOrder::Asc);
    show("Due this week, soonest first", &engine.evaluate(&tasks, &query));

    let query = QuerySpec::default().sorted_by(SortKey::DueDate, SortOrder::Desc);
    show("By due date descending (undated still last)", &engine.evaluate(&tasks, &query));

    // Query parameters as a web client would send them; bad values are dropped
    let query = QuerySpec::from_params([
        ("tag", "travel"),
        ("priority", "Urgent"),
        ("sort_by", "title"),
        ("sort_order", "asc"),
    ]);
    println!("Parsed query: {}", serde_json::to_string(&query)?);
    show("Tagged travel, by title", &engine.evaluate(&tasks, &query));

    println!("Tags in use: {:?}", engine.available_tags(&tasks));

    Ok(())
}
