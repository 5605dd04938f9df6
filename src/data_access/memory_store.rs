use std::{
    collections::HashMap,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use uuid::Uuid;

use crate::{
    data_access::{
        query::{sort_tasks, SortKey, TaskFilter, TaskPatch},
        task_store::{StoreError, TaskStore},
    },
    task::Task,
};

/// Process-local task collection. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryTaskStore {
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<Uuid, Task>>, StoreError> {
        self.tasks.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<Uuid, Task>>, StoreError> {
        self.tasks.write().map_err(|_| StoreError::Poisoned)
    }
}

impl TaskStore for InMemoryTaskStore {
    fn ping(&self) -> Result<(), StoreError> {
        self.read().map(|_| ())
    }

    fn insert_one(&self, task: &Task) -> Result<(), StoreError> {
        self.write()?.insert(task.id, task.clone());
        Ok(())
    }

    fn find(&self, filter: &TaskFilter, sort: &[SortKey]) -> Result<Vec<Task>, StoreError> {
        let mut tasks: Vec<Task> = self
            .read()?
            .values()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect();
        sort_tasks(&mut tasks, sort);
        Ok(tasks)
    }

    fn find_one(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn update_one(&self, id: Uuid, patch: &TaskPatch) -> Result<bool, StoreError> {
        match self.write()?.get_mut(&id) {
            Some(task) => {
                patch.apply(task);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn toggle_topped(&self, id: Uuid) -> Result<Option<bool>, StoreError> {
        Ok(self.write()?.get_mut(&id).map(|task| {
            task.topped = !task.topped;
            task.topped
        }))
    }

    fn delete_one(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.write()?.remove(&id).is_some())
    }

    fn count(&self, filter: &TaskFilter) -> Result<usize, StoreError> {
        Ok(self.read()?.values().filter(|t| filter.matches(t)).count())
    }
}
