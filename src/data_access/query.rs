//! Filters, sort keys and partial updates over task documents.
//!
//! Both stores evaluate these in memory after a full scan, the same way
//! a document database would apply `find(filter).sort(keys)`.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::task::Task;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub topped: Option<bool>,
    /// Inclusive lower bound on priority.
    pub min_priority: Option<i64>,
}

impl TaskFilter {
    pub const ALL: TaskFilter = TaskFilter { topped: None, min_priority: None };

    pub fn topped(topped: bool) -> Self {
        TaskFilter { topped: Some(topped), ..Self::ALL }
    }

    pub fn with_min_priority(self, min_priority: i64) -> Self {
        TaskFilter { min_priority: Some(min_priority), ..self }
    }

    pub fn matches(&self, task: &Task) -> bool {
        if let Some(topped) = self.topped {
            if task.topped != topped {
                return false;
            }
        }
        if let Some(min) = self.min_priority {
            if task.priority < min {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Topped,
    CreatedAt,
}

/// Descending sort on one field. Pages only ever list pinned or newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
}

impl SortKey {
    pub const fn desc(field: SortField) -> Self {
        SortKey { field }
    }

    fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ord = match self.field {
            SortField::Topped => a.topped.cmp(&b.topped),
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        };
        ord.reverse()
    }
}

/// Sorts by each key in turn. Ties left after the last key fall back to id
/// order so the result never depends on storage iteration order.
pub fn sort_tasks(tasks: &mut [Task], keys: &[SortKey]) {
    tasks.sort_by(|a, b| {
        keys.iter()
            .map(|key| key.compare(a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or_else(|| a.id.cmp(&b.id))
    });
}

/// `$set`-style update: only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub priority: Option<i64>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl TaskPatch {
    pub fn apply(&self, task: &mut Task) {
        if let Some(name) = &self.name {
            task.name = name.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(created_at) = self.created_at {
            task.created_at = created_at;
        }
    }
}
