// TaskQuery - Search, filter and sort personal task collections

pub mod bucket;
pub mod clock;
pub mod config;
pub mod engine;
pub mod filter;
pub mod jsonl;
pub mod models;
pub mod query;
pub mod record;
pub mod recurrence;
pub mod sort;

// Re-export main types for convenience
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use engine::{QueryEngine, available_tags, evaluate};
pub use filter::{Filter, FilterSet};
pub use jsonl::TaskFile;
pub use models::{Priority, RecurrenceType, Tag, Task};
pub use query::{DueDateRange, Filters, QuerySpec, SortKey, SortOrder, StatusFilter};
pub use record::Record;
