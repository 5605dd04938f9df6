//! Application-level task operations on top of a `TaskStore`.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    data_access::{
        query::{SortField, SortKey, TaskFilter, TaskPatch},
        task_store::{StoreError, TaskStore},
    },
    task::{NewTask, Task, TaskEdit},
};

/// Unpinned tasks at or above this priority show up on the home page.
pub const IMPORTANT_PRIORITY: i64 = 5;

/// Order of the full task list: pinned first, newest first within each group.
pub const LIST_ORDER: [SortKey; 2] = [SortKey::desc(SortField::Topped), SortKey::desc(SortField::CreatedAt)];

const NEWEST_FIRST: [SortKey; 1] = [SortKey::desc(SortField::CreatedAt)];

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("{0}")]
    Validation(String),
    #[error("task {0} not found")]
    NotFound(Uuid),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct TaskRepository {
    store: Arc<dyn TaskStore>,
}

impl TaskRepository {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    pub fn ping(&self) -> Result<(), TaskError> {
        Ok(self.store.ping()?)
    }

    pub fn count_all(&self) -> Result<usize, TaskError> {
        Ok(self.store.count(&TaskFilter::ALL)?)
    }

    pub fn list_all(&self, order: &[SortKey]) -> Result<Vec<Task>, TaskError> {
        Ok(self.store.find(&TaskFilter::ALL, order)?)
    }

    /// Pinned tasks, then unpinned important ones, each group newest first.
    pub fn list_highlighted(&self) -> Result<Vec<Task>, TaskError> {
        let mut tasks = self.store.find(&TaskFilter::topped(true), &NEWEST_FIRST)?;
        let important = TaskFilter::topped(false).with_min_priority(IMPORTANT_PRIORITY);
        tasks.extend(self.store.find(&important, &NEWEST_FIRST)?);
        Ok(tasks)
    }

    pub fn get(&self, id: Uuid) -> Result<Task, TaskError> {
        self.store.find_one(id)?.ok_or(TaskError::NotFound(id))
    }

    pub fn create(&self, request: NewTask) -> Result<Uuid, TaskError> {
        if request.name.trim().is_empty() {
            return Err(TaskError::Validation("Task name is required.".to_string()));
        }
        if request.description.trim().is_empty() {
            return Err(TaskError::Validation("Description is required.".to_string()));
        }

        let task = Task::new(request);
        self.store.insert_one(&task)?;
        tracing::info!(task_id = %task.id, priority = task.priority, "task created");
        Ok(task.id)
    }

    /// Replaces the editable fields. `created_at` is reset to now on every
    /// edit, which also moves the task to the top of its recency group.
    ///
    /// Returns `false` when no task has this id; nothing is created then.
    pub fn update(&self, id: Uuid, edit: TaskEdit) -> Result<bool, TaskError> {
        let patch = TaskPatch {
            name: Some(edit.name),
            priority: Some(edit.priority),
            description: Some(edit.description),
            created_at: Some(Utc::now()),
        };
        let matched = self.store.update_one(id, &patch)?;
        if matched {
            tracing::info!(task_id = %id, "task updated");
        }
        Ok(matched)
    }

    /// Returns `false` when there was nothing to delete.
    pub fn delete(&self, id: Uuid) -> Result<bool, TaskError> {
        let deleted = self.store.delete_one(id)?;
        if deleted {
            tracing::info!(task_id = %id, "task deleted");
        }
        Ok(deleted)
    }

    /// Flips the pin flag and returns its new value.
    pub fn toggle_top(&self, id: Uuid) -> Result<bool, TaskError> {
        let topped = self.store.toggle_topped(id)?.ok_or(TaskError::NotFound(id))?;
        tracing::info!(task_id = %id, topped, "task pin toggled");
        Ok(topped)
    }
}
