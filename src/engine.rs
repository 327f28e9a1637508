// Query evaluation: filter then sort a borrowed task collection

use crate::clock::{Clock, SystemClock};
use crate::filter::FilterSet;
use crate::models::Task;
use crate::query::QuerySpec;
use crate::sort::sort_tasks;
use std::collections::BTreeSet;
use tracing::debug;

/// Produce the ordered view of `tasks` described by `query`
///
/// Pure apart from reading `clock`; never fails. Accepts anything that yields
/// task references, so a previous view can be fed back in.
pub fn evaluate<'a, I, C>(tasks: I, query: &QuerySpec, clock: &C) -> Vec<&'a Task>
where
    I: IntoIterator<Item = &'a Task>,
    C: Clock + ?Sized,
{
    let filters = FilterSet::from_query(query, clock.now());

    let mut scanned = 0usize;
    let mut view: Vec<&Task> = tasks
        .into_iter()
        .inspect(|_| scanned += 1)
        .filter(|task| filters.matches(task))
        .collect();

    sort_tasks(&mut view, query.sort_by, query.sort_order);

    debug!(
        scanned,
        matched = view.len(),
        filters = %filters,
        sort_by = %query.sort_by,
        sort_order = %query.sort_order,
        "Evaluated task query"
    );

    view
}

/// Distinct tag names across the whole collection, sorted
pub fn available_tags<'a, I>(tasks: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a Task>,
{
    tasks
        .into_iter()
        .flat_map(|task| task.tags.iter())
        .map(|tag| tag.name.clone())
        .collect()
}

/// Query engine bound to a clock
#[derive(Debug, Clone, Default)]
pub struct QueryEngine<C: Clock = SystemClock> {
    clock: C,
}

impl<C: Clock> QueryEngine<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn evaluate<'a, I>(&self, tasks: I, query: &QuerySpec) -> Vec<&'a Task>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        evaluate(tasks, query, &self.clock)
    }

    pub fn available_tags<'a, I>(&self, tasks: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a Task>,
    {
        available_tags(tasks)
    }
}
