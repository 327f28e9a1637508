// Task queries: search text, per-dimension filters, sort key and direction

use crate::models::Priority;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// One desired view over a task collection
///
/// Serialized in the camelCase shape used by the web client, where an empty
/// string means "no constraint". Deserialization never fails on unknown values:
/// they degrade to the permissive default for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawQuery", into = "RawQuery")]
pub struct QuerySpec {
    /// Case-insensitive text matched against title, description and tag names
    pub search: String,
    pub filters: Filters,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
}

/// Per-dimension constraints; `None` admits everything on that dimension
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub status: Option<StatusFilter>,
    pub priority: Option<Priority>,
    pub tag: Option<String>,
    pub due_date_range: Option<DueDateRange>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.priority.is_none() && self.tag.is_none() && self.due_date_range.is_none()
    }
}

impl QuerySpec {
    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    pub fn with_status(mut self, status: StatusFilter) -> Self {
        self.filters.status = Some(status);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.filters.priority = Some(priority);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.filters.tag = Some(tag.into());
        self
    }

    pub fn with_due_date_range(mut self, range: DueDateRange) -> Self {
        self.filters.due_date_range = Some(range);
        self
    }

    pub fn sorted_by(mut self, key: SortKey, order: SortOrder) -> Self {
        self.sort_by = key;
        self.sort_order = order;
        self
    }

    /// Build a query from URL-style parameters
    ///
    /// Accepts the search endpoint's names (`q`, `status`, `priority`, `tag`,
    /// `due_date_range`, `sort_by`, `sort_order`) and their camelCase forms.
    /// Unknown parameters are ignored.
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        Self::default().merge_params(params)
    }

    /// Override dimensions of this query with URL-style parameters
    ///
    /// An empty value clears that dimension.
    pub fn merge_params<I, K, V>(self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut raw = RawQuery::from(self);
        for (key, value) in params {
            let value = value.as_ref().to_string();
            match key.as_ref() {
                "q" | "search" | "searchText" => raw.search_text = value,
                "status" => raw.filters.status = value,
                "priority" => raw.filters.priority = value,
                "tag" => raw.filters.tag = value,
                "due_date_range" | "dueDateRange" => raw.filters.due_date_range = value,
                "sort_by" | "sortBy" => raw.sort_by = value,
                "sort_order" | "sortOrder" => raw.sort_order = value,
                other => debug!(param = other, "Ignoring unknown query parameter"),
            }
        }
        raw.into()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusFilter {
    Pending,
    Completed,
}

impl StatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::Pending => "pending",
            StatusFilter::Completed => "completed",
        }
    }
}

impl FromStr for StatusFilter {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(StatusFilter::Pending),
            "completed" => Ok(StatusFilter::Completed),
            other => Err(eyre::eyre!("Unknown status filter: {}", other)),
        }
    }
}

/// Named due-date window, relative to the evaluation instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DueDateRange {
    Today,
    Week,
    Month,
    Overdue,
    NoDueDate,
}

impl DueDateRange {
    pub fn as_str(self) -> &'static str {
        match self {
            DueDateRange::Today => "today",
            DueDateRange::Week => "week",
            DueDateRange::Month => "month",
            DueDateRange::Overdue => "overdue",
            DueDateRange::NoDueDate => "no-due-date",
        }
    }
}

impl FromStr for DueDateRange {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(DueDateRange::Today),
            "week" => Ok(DueDateRange::Week),
            "month" => Ok(DueDateRange::Month),
            "overdue" => Ok(DueDateRange::Overdue),
            "no-due-date" => Ok(DueDateRange::NoDueDate),
            other => Err(eyre::eyre!("Unknown due date range: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    #[default]
    CreatedAt,
    DueDate,
    Priority,
    Title,
    Completed,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::CreatedAt => "createdAt",
            SortKey::DueDate => "dueDate",
            SortKey::Priority => "priority",
            SortKey::Title => "title",
            SortKey::Completed => "completed",
        }
    }
}

impl FromStr for SortKey {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" | "created_at" => Ok(SortKey::CreatedAt),
            "dueDate" | "due_date" => Ok(SortKey::DueDate),
            "priority" => Ok(SortKey::Priority),
            "title" => Ok(SortKey::Title),
            "completed" => Ok(SortKey::Completed),
            other => Err(eyre::eyre!("Unknown sort key: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// Orient an ascending comparison result
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

impl FromStr for SortOrder {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(eyre::eyre!("Unknown sort order: {}", other)),
        }
    }
}

macro_rules! impl_display_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

impl_display_as_str!(StatusFilter, DueDateRange, SortKey, SortOrder);

/// Wire shape of a query: every dimension is a plain string
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawQuery {
    search_text: String,
    filters: RawFilters,
    sort_by: String,
    sort_order: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawFilters {
    status: String,
    priority: String,
    tag: String,
    due_date_range: String,
}

/// Parse one dimension; empty means unconstrained, unknown values are dropped
fn dimension<T: FromStr>(name: &'static str, raw: &str) -> Option<T> {
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(dimension = name, value = raw, "Unrecognized filter value, ignoring");
            None
        }
    }
}

impl From<RawQuery> for QuerySpec {
    fn from(raw: RawQuery) -> Self {
        let sort_by = if raw.sort_by.is_empty() {
            SortKey::default()
        } else {
            raw.sort_by.parse::<SortKey>().unwrap_or_else(|_| {
                debug!(sort_by = %raw.sort_by, "Unrecognized sort key, falling back to createdAt");
                SortKey::CreatedAt
            })
        };
        // Anything other than "asc" sorts descending
        let sort_order = if raw.sort_order == "asc" {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        };

        Self {
            search: raw.search_text,
            filters: Filters {
                status: dimension("status", &raw.filters.status),
                priority: dimension("priority", &raw.filters.priority),
                tag: (!raw.filters.tag.is_empty()).then_some(raw.filters.tag),
                due_date_range: dimension("dueDateRange", &raw.filters.due_date_range),
            },
            sort_by,
            sort_order,
        }
    }
}

impl From<QuerySpec> for RawQuery {
    fn from(query: QuerySpec) -> Self {
        fn label<T: fmt::Display>(value: Option<T>) -> String {
            value.map(|v| v.to_string()).unwrap_or_default()
        }

        Self {
            search_text: query.search,
            filters: RawFilters {
                status: label(query.filters.status),
                priority: label(query.filters.priority),
                tag: query.filters.tag.unwrap_or_default(),
                due_date_range: label(query.filters.due_date_range),
            },
            sort_by: query.sort_by.to_string(),
            sort_order: query.sort_order.to_string(),
        }
    }
}
