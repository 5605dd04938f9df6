use std::{path::Path, sync::Arc};

use redb::{Database, ReadableTable, TableDefinition};
use uuid::Uuid;

use crate::{
    data_access::{
        query::{sort_tasks, SortKey, TaskFilter, TaskPatch},
        task_store::{StoreError, TaskStore},
    },
    task::Task,
};

/// Task collection persisted in a redb file.
///
/// Each document is the JSON encoding of a `Task`, keyed by the raw UUID
/// bytes. The collection name doubles as the redb table name.
#[derive(Clone)]
pub struct DataContext {
    db: Arc<Database>,
    collection: Arc<str>,
}

impl DataContext {
    /// Open (or create) the database file and make sure the collection exists.
    pub fn open(path: impl AsRef<Path>, collection: &str) -> Result<Self, StoreError> {
        let db = Database::create(path)?;
        let context = DataContext { db: Arc::new(db), collection: Arc::from(collection) };

        let write_txn = context.db.begin_write()?;
        {
            let _ = write_txn.open_table(context.table())?;
        }
        write_txn.commit()?;

        Ok(context)
    }

    fn table(&self) -> TableDefinition<'_, &'static [u8], &'static [u8]> {
        TableDefinition::new(&self.collection)
    }

    fn scan(&self, filter: &TaskFilter) -> Result<Vec<Task>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(self.table())?;

        let mut tasks = Vec::new();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let task = decode(value.value())?;
            if filter.matches(&task) {
                tasks.push(task);
            }
        }
        Ok(tasks)
    }
}

impl TaskStore for DataContext {
    fn ping(&self) -> Result<(), StoreError> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(self.table())?;
        Ok(())
    }

    fn insert_one(&self, task: &Task) -> Result<(), StoreError> {
        let bytes = encode(task)?;
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(self.table())?;
            table.insert(task.id.as_bytes().as_slice(), bytes.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn find(&self, filter: &TaskFilter, sort: &[SortKey]) -> Result<Vec<Task>, StoreError> {
        let mut tasks = self.scan(filter)?;
        sort_tasks(&mut tasks, sort);
        Ok(tasks)
    }

    fn find_one(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(self.table())?;

        match table.get(id.as_bytes().as_slice())? {
            Some(data) => Ok(Some(decode(data.value())?)),
            None => Ok(None),
        }
    }

    fn update_one(&self, id: Uuid, patch: &TaskPatch) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write()?;
        let matched;
        {
            let mut table = write_txn.open_table(self.table())?;
            let existing = match table.get(id.as_bytes().as_slice())? {
                Some(data) => Some(decode(data.value())?),
                None => None,
            };

            matched = match existing {
                Some(mut task) => {
                    patch.apply(&mut task);
                    let bytes = encode(&task)?;
                    table.insert(id.as_bytes().as_slice(), bytes.as_slice())?;
                    true
                }
                None => false,
            };
        }
        write_txn.commit()?;
        Ok(matched)
    }

    fn toggle_topped(&self, id: Uuid) -> Result<Option<bool>, StoreError> {
        let write_txn = self.db.begin_write()?;
        let topped;
        {
            let mut table = write_txn.open_table(self.table())?;
            let existing = match table.get(id.as_bytes().as_slice())? {
                Some(data) => Some(decode(data.value())?),
                None => None,
            };

            topped = match existing {
                Some(mut task) => {
                    task.topped = !task.topped;
                    let bytes = encode(&task)?;
                    table.insert(id.as_bytes().as_slice(), bytes.as_slice())?;
                    Some(task.topped)
                }
                None => None,
            };
        }
        write_txn.commit()?;
        Ok(topped)
    }

    fn delete_one(&self, id: Uuid) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write()?;
        let deleted;
        {
            let mut table = write_txn.open_table(self.table())?;
            deleted = table.remove(id.as_bytes().as_slice())?.is_some();
        }
        write_txn.commit()?;
        Ok(deleted)
    }

    fn count(&self, filter: &TaskFilter) -> Result<usize, StoreError> {
        Ok(self.scan(filter)?.len())
    }
}

fn encode(task: &Task) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(task).map_err(|e| StoreError::Encode(e.to_string()))
}

fn decode(bytes: &[u8]) -> Result<Task, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_access::query::SortField;
    use chrono::{Duration, Utc};
    use tempfile::TempDir;

    fn temp_context(collection: &str) -> (DataContext, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let context = DataContext::open(dir.path().join("todos.redb"), collection).unwrap();
        (context, dir)
    }

    fn task(name: &str, priority: i64, minutes_ago: i64) -> Task {
        Task {
            id: Uuid::new_v4(),
            name: name.into(),
            priority,
            description: "desc".into(),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
            topped: false,
        }
    }

    #[test]
    fn insert_and_find_one() {
        let (ctx, _dir) = temp_context("todos");
        let t = task("Buy milk", 3, 0);

        ctx.insert_one(&t).unwrap();

        assert_eq!(ctx.find_one(t.id).unwrap(), Some(t));
        assert_eq!(ctx.find_one(Uuid::new_v4()).unwrap(), None);
    }

    #[test]
    fn find_filters_and_sorts() {
        let (ctx, _dir) = temp_context("todos");
        ctx.insert_one(&task("old", 8, 30)).unwrap();
        ctx.insert_one(&task("new", 6, 1)).unwrap();
        ctx.insert_one(&task("low", 1, 5)).unwrap();

        let found = ctx
            .find(&TaskFilter::ALL.with_min_priority(5), &[SortKey::desc(SortField::CreatedAt)])
            .unwrap();

        let names: Vec<_> = found.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["new", "old"]);
        assert_eq!(ctx.count(&TaskFilter::ALL).unwrap(), 3);
    }

    #[test]
    fn update_one_patches_in_place() {
        let (ctx, _dir) = temp_context("todos");
        let t = task("Draft", 1, 0);
        ctx.insert_one(&t).unwrap();

        let patch = TaskPatch { description: Some("final".into()), priority: Some(4), ..Default::default() };
        assert!(ctx.update_one(t.id, &patch).unwrap());

        let stored = ctx.find_one(t.id).unwrap().unwrap();
        assert_eq!(stored.description, "final");
        assert_eq!(stored.priority, 4);
        assert_eq!(stored.name, "Draft");
    }

    #[test]
    fn update_unknown_id_creates_nothing() {
        let (ctx, _dir) = temp_context("todos");
        let patch = TaskPatch { name: Some("ghost".into()), ..Default::default() };

        assert!(!ctx.update_one(Uuid::new_v4(), &patch).unwrap());
        assert_eq!(ctx.count(&TaskFilter::ALL).unwrap(), 0);
    }

    #[test]
    fn toggle_topped_flips_in_place() {
        let (ctx, _dir) = temp_context("todos");
        let t = task("Pin", 1, 0);
        ctx.insert_one(&t).unwrap();

        assert_eq!(ctx.toggle_topped(t.id).unwrap(), Some(true));
        assert!(ctx.find_one(t.id).unwrap().unwrap().topped);
        assert_eq!(ctx.toggle_topped(t.id).unwrap(), Some(false));
        assert_eq!(ctx.toggle_topped(Uuid::new_v4()).unwrap(), None);
        assert_eq!(ctx.count(&TaskFilter::ALL).unwrap(), 1);
    }

    #[test]
    fn concurrent_toggles_are_not_lost() {
        let (ctx, _dir) = temp_context("todos");
        let t = task("Contended", 1, 0);
        ctx.insert_one(&t).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ctx = ctx.clone();
                std::thread::spawn(move || ctx.toggle_topped(t.id).unwrap())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // An even number of flips lands back where it started.
        assert!(!ctx.find_one(t.id).unwrap().unwrap().topped);
    }

    #[test]
    fn delete_reports_whether_removed() {
        let (ctx, _dir) = temp_context("todos");
        let t = task("Doomed", 0, 0);
        ctx.insert_one(&t).unwrap();

        assert!(ctx.delete_one(t.id).unwrap());
        assert!(!ctx.delete_one(t.id).unwrap());
        assert_eq!(ctx.find_one(t.id).unwrap(), None);
    }

    #[test]
    fn collections_are_separate_and_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.redb");
        let t = task("Persisted", 2, 0);

        {
            let ctx = DataContext::open(&path, "todos").unwrap();
            ctx.insert_one(&t).unwrap();
        }

        {
            let reopened = DataContext::open(&path, "todos").unwrap();
            assert_eq!(reopened.find_one(t.id).unwrap(), Some(t));
        }

        // Only one handle per file may be open at a time.
        let other = DataContext::open(&path, "archive").unwrap();
        assert_eq!(other.count(&TaskFilter::ALL).unwrap(), 0);
        other.ping().unwrap();
    }
}
