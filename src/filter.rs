// Filter predicates for task queries

use crate::bucket::DueWindow;
use crate::models::{Priority, Task};
use crate::query::{QuerySpec, StatusFilter};
use chrono::{DateTime, FixedOffset};
use std::fmt;

/// One independent predicate a task must satisfy to stay in the view
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Lowercased needle matched against title, description and tag names
    Search(String),
    Status(StatusFilter),
    /// Exact priority; tasks without one never match
    Priority(Priority),
    /// Exact tag name
    Tag(String),
    DueDate(DueWindow),
}

impl Filter {
    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Filter::Search(needle) => {
                task.title.to_lowercase().contains(needle.as_str())
                    || task
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(needle.as_str()))
                    || task
                        .tags
                        .iter()
                        .any(|tag| tag.name.to_lowercase().contains(needle.as_str()))
            }
            Filter::Status(StatusFilter::Pending) => !task.completed,
            Filter::Status(StatusFilter::Completed) => task.completed,
            Filter::Priority(priority) => task.priority == Some(*priority),
            Filter::Tag(name) => task.has_tag(name),
            Filter::DueDate(window) => window.admits(task.due_date),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Search(needle) => write!(f, "search ~ {:?}", needle),
            Filter::Status(status) => write!(f, "status = {}", status),
            Filter::Priority(priority) => write!(f, "priority = {}", priority),
            Filter::Tag(name) => write!(f, "tag = {:?}", name),
            Filter::DueDate(window) => write!(f, "due in {}", window.range()),
        }
    }
}

/// Conjunction of the active predicates of a query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    /// Collect one predicate per constrained dimension
    pub fn from_query(query: &QuerySpec, now: DateTime<FixedOffset>) -> Self {
        let mut filters = Vec::new();

        if !query.search.is_empty() {
            filters.push(Filter::Search(query.search.to_lowercase()));
        }
        if let Some(status) = query.filters.status {
            filters.push(Filter::Status(status));
        }
        if let Some(priority) = query.filters.priority {
            filters.push(Filter::Priority(priority));
        }
        if let Some(tag) = &query.filters.tag {
            filters.push(Filter::Tag(tag.clone()));
        }
        if let Some(range) = query.filters.due_date_range {
            filters.push(Filter::DueDate(DueWindow::new(range, now)));
        }

        Self { filters }
    }

    pub fn push(&mut self, filter: Filter) {
        self.filters.push(filter);
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    /// True when every predicate passes
    pub fn matches(&self, task: &Task) -> bool {
        self.filters.iter().all(|filter| filter.matches(task))
    }
}

impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.filters.is_empty() {
            return write!(f, "(none)");
        }
        for (i, filter) in self.filters.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "{}", filter)?;
        }
        Ok(())
    }
}
