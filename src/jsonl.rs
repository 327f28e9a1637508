// JSONL task file: append-only log, latest version per id wins

use crate::models::{Tag, Task};
use crate::recurrence::next_occurrence;
use crate::record::Record;
use chrono::{DateTime, Utc};
use eyre::{Context, Result, eyre};
use fs2::FileExt;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Deletion marker appended in place of a record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tombstone {
    pub id: String,
    pub deleted: bool,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Tombstone {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            deleted: true,
            updated_at: Some(Utc::now()),
        }
    }

    fn updated_at_ms(&self) -> i64 {
        self.updated_at.map(|ts| ts.timestamp_millis()).unwrap_or(0)
    }
}

/// Append a record to a JSONL file under an exclusive lock
pub fn append_jsonl<T: Serialize>(path: &Path, record: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context("Failed to create task file directory")?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .context("Failed to open JSONL file for appending")?;

    file.lock_exclusive().context("Failed to acquire file lock")?;

    let json = serde_json::to_string(record)?;
    writeln!(file, "{}", json)?;
    file.sync_all()?; // Ensure data is flushed to disk

    FileExt::unlock(&file).context("Failed to release file lock")?;

    Ok(())
}

enum Entry<T> {
    Live(T),
    Deleted(i64),
}

impl<T: Record> Entry<T> {
    fn updated_at(&self) -> i64 {
        match self {
            Entry::Live(record) => record.updated_at(),
            Entry::Deleted(ts) => *ts,
        }
    }
}

/// Read all records from a JSONL file, returning the latest version per id
///
/// Later lines win ties. Ids whose latest entry is a tombstone are dropped.
/// Unreadable or unparseable lines are logged and skipped.
pub fn read_jsonl_latest<T>(path: &Path) -> Result<HashMap<String, T>>
where
    T: Record + DeserializeOwned,
{
    if !path.exists() {
        // File doesn't exist yet, return empty map
        return Ok(HashMap::new());
    }

    let file = File::open(path).context("Failed to open JSONL file")?;
    let reader = BufReader::new(file);
    let mut entries: HashMap<String, Entry<T>> = HashMap::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to read line, skipping"
                );
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let (id, entry) = match parse_line::<T>(&line) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = %e,
                    "Failed to parse JSON, skipping"
                );
                continue;
            }
        };

        // Keep the entry with the latest updated_at
        let stale = entries
            .get(&id)
            .is_some_and(|existing| entry.updated_at() < existing.updated_at());
        if !stale {
            entries.insert(id, entry);
        }
    }

    let records: HashMap<String, T> = entries
        .into_iter()
        .filter_map(|(id, entry)| match entry {
            Entry::Live(record) => Some((id, record)),
            Entry::Deleted(_) => None,
        })
        .collect();

    info!(
        file = ?path,
        count = records.len(),
        "Loaded latest records from JSONL"
    );

    Ok(records)
}

fn parse_line<T: Record + DeserializeOwned>(line: &str) -> Result<(String, Entry<T>)> {
    let value: serde_json::Value = serde_json::from_str(line)?;

    if value.get("deleted").and_then(|d| d.as_bool()) == Some(true) {
        let tombstone: Tombstone = serde_json::from_value(value)?;
        let ts = tombstone.updated_at_ms();
        return Ok((tombstone.id, Entry::Deleted(ts)));
    }

    let record: T = serde_json::from_value(value)?;
    Ok((record.id().to_string(), Entry::Live(record)))
}

/// Task collection backed by a JSONL file
#[derive(Debug, Clone)]
pub struct TaskFile {
    path: PathBuf,
}

impl TaskFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current tasks, ordered by id
    pub fn load(&self) -> Result<Vec<Task>> {
        let mut tasks: Vec<Task> = read_jsonl_latest::<Task>(&self.path)?.into_values().collect();
        tasks.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(tasks)
    }

    pub fn add(&self, task: &Task) -> Result<()> {
        Self::validate_task(task)?;
        debug!(id = %task.id, title = %task.title, "Adding task");
        append_jsonl(&self.path, task)
    }

    /// Append a new version of a task, stamping `updatedAt`
    pub fn update(&self, task: &Task) -> Result<Task> {
        Self::validate_task(task)?;
        let mut task = task.clone();
        task.updated_at = Some(Utc::now());
        debug!(id = %task.id, "Updating task");
        append_jsonl(&self.path, &task)?;
        Ok(task)
    }

    /// Add a task, attaching tags by name (existing ids reused, new ones allocated)
    pub fn add_with_tags<S: AsRef<str>>(&self, task: &Task, tag_names: &[S]) -> Result<Task> {
        self.locked(|| {
            let existing = self.load()?;
            let mut task = task.clone();
            for name in tag_names {
                let name = name.as_ref();
                if !task.has_tag(name) {
                    task.tags.push(Tag::resolve_in(&existing, name)?);
                }
            }
            self.add(&task)?;
            Ok(task)
        })
    }

    /// Remove a task by id or unique id prefix, returning the removed task
    pub fn remove(&self, id: &str) -> Result<Task> {
        self.locked(|| {
            let tasks = self.load()?;
            let task = resolve(&tasks, id)?.clone();
            append_jsonl(&self.path, &Tombstone::new(&task.id))?;
            info!(id = %task.id, "Removed task");
            Ok(task)
        })
    }

    /// Mark a task (by id or unique prefix) done or not done
    ///
    /// Completing a recurring task appends its next occurrence, which is returned.
    pub fn set_completed(&self, id: &str, completed: bool) -> Result<(Task, Option<Task>)> {
        self.locked(|| {
            let tasks = self.load()?;
            let mut task = resolve(&tasks, id)?.clone();
            let was_completed = task.completed;
            task.completed = completed;
            let task = self.update(&task)?;

            let next = if completed && !was_completed {
                next_occurrence(&task, Utc::now())
            } else {
                None
            };
            if let Some(next) = &next {
                self.add(next)?;
                info!(id = %task.id, next_id = %next.id, "Spawned next occurrence");
            }

            Ok((task, next))
        })
    }

    /// Sidecar lock file guarding read-modify-append sequences
    pub fn lock_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".lock");
        self.path.with_file_name(name)
    }

    /// Run `f` holding an exclusive lock on the sidecar lock file
    fn locked<R>(&self, f: impl FnOnce() -> Result<R>) -> Result<R> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).context("Failed to create task file directory")?;
        }

        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .context("Failed to open task file lock")?;
        lock.lock_exclusive().context("Failed to acquire task file lock")?;
        debug!(lock = ?lock_path, "Acquired task file lock");

        let result = f();

        FileExt::unlock(&lock).context("Failed to release task file lock")?;
        result
    }

    fn validate_task(task: &Task) -> Result<()> {
        if task.id.is_empty() {
            return Err(eyre!("Task id cannot be empty"));
        }
        if task.title.trim().is_empty() {
            return Err(eyre!("Task title cannot be empty"));
        }
        Ok(())
    }
}

/// Find the task whose id equals or uniquely starts with `prefix`
pub fn resolve<'a>(tasks: &'a [Task], prefix: &str) -> Result<&'a Task> {
    if let Some(exact) = tasks.iter().find(|t| t.id == prefix) {
        return Ok(exact);
    }
    let mut matches = tasks.iter().filter(|t| !prefix.is_empty() && t.id.starts_with(prefix));
    match (matches.next(), matches.next()) {
        (Some(task), None) => Ok(task),
        (Some(_), Some(_)) => Err(eyre!("Ambiguous task id prefix: {}", prefix)),
        (None, _) => Err(eyre!("No task with id: {}", prefix)),
    }
}
