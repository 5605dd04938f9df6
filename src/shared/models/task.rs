use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A todo item as stored in the tasks collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    pub priority: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    /// Pinned tasks sort ahead of everything else.
    #[serde(default)]
    pub topped: bool,
}

impl Task {
    pub fn new(request: NewTask) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: request.name,
            priority: request.priority,
            description: request.description,
            created_at: Utc::now(),
            topped: false,
        }
    }
}

/// Fields supplied when creating a task. Validated by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub priority: i64,
    pub description: String,
}

/// Replacement values for an edit. Not validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskEdit {
    pub name: String,
    pub priority: i64,
    pub description: String,
}
