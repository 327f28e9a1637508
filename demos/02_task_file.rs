//! Example 02: Task File
//!
//! This example keeps tasks in a JSONL file: adding tasks with tags,
//! completing a recurring task, deleting a task and querying what is left.
//!
//! Run with: cargo run --example 02_task_file

use chrono::{Duration, Utc};
use eyre::Result;
use taskquery::{QuerySpec, RecurrenceType, SortKey, SortOrder, SystemClock, Task, TaskFile, evaluate};

fn main() -> Result<()> {
    println!("TaskQuery Task File Example");
    println!("===========================\n");

    let temp_dir = tempfile::tempdir()?;
    let file = TaskFile::new(temp_dir.path().join("tasks.jsonl"));
    println!("Task file: {}\n", file.path().display());

    // Tag ids are reused by name across the file
    let mut laundry = Task::new("Do the laundry");
    laundry.due_date = Some(Utc::now() + Duration::days(1));
    laundry.recurrence_type = Some(RecurrenceType::Weekly);
    let laundry = file.add_with_tags(&laundry, &["home", "chores"])?;

    let groceries = file.add_with_tags(&Task::new("Buy groceries"), &["home", "errands"])?;
    let taxes = file.add_with_tags(&Task::new("File taxes"), &["money"])?;

    println!("Added:");
    for task in [&laundry, &groceries, &taxes] {
        let tags: Vec<String> = task.tags.iter().map(|t| format!("{}#{}", t.name, t.id)).collect();
        println!("  {} [{}]", task.title, tags.join(", "));
    }

    // Completing a recurring task appends its next occurrence
    println!("\nCompleting '{}'...", laundry.title);
    let (done, next) = file.set_completed(&laundry.id, true)?;
    println!("  completed: {}", done.completed);
    if let Some(next) = next {
        println!(
            "  next occurrence {} due {}",
            &next.id[..8],
            next.due_date.map(|d| d.to_rfc3339()).unwrap_or_default()
        );
    }

    println!("\nRemoving '{}'...", taxes.title);
    file.remove(&taxes.id)?;

    let tasks = file.load()?;
    println!("\n{} tasks on file:", tasks.len());
    let query = QuerySpec::default().sorted_by(SortKey::Title, SortOrder::Asc);
    for task in evaluate(&tasks, &query, &SystemClock) {
        let mark = if task.completed { "[x]" } else { "[ ]" };
        println!("  {} {}", mark, task.title);
    }

    println!("\nTags in use: {:?}", taskquery::available_tags(&tasks));

    Ok(())
}
