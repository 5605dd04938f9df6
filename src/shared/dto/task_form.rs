use serde::{Deserialize, Serialize};

use crate::task::{NewTask, Task, TaskEdit};

/// Urlencoded body of the create and edit forms.
///
/// Every field is optional so a half-filled form still deserializes; the
/// repository decides what is missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl TaskForm {
    pub fn from_task(task: &Task) -> Self {
        Self {
            task_name: Some(task.name.clone()),
            priority: Some(task.priority.to_string()),
            description: Some(task.description.clone()),
        }
    }

    /// Absent or unparsable priorities count as 0.
    pub fn priority_value(&self) -> i64 {
        self.priority
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(0)
    }

    pub fn to_new_task(&self) -> NewTask {
        NewTask {
            name: self.task_name.clone().unwrap_or_default(),
            priority: self.priority_value(),
            description: self.description.clone().unwrap_or_default(),
        }
    }

    pub fn to_edit(&self) -> TaskEdit {
        TaskEdit {
            name: self.task_name.clone().unwrap_or_default(),
            priority: self.priority_value(),
            description: self.description.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(priority: Option<&str>) -> TaskForm {
        TaskForm {
            task_name: Some("Write report".into()),
            priority: priority.map(str::to_string),
            description: Some("Quarterly numbers".into()),
        }
    }

    #[test]
    fn priority_parses_integers() {
        assert_eq!(form(Some("7")).priority_value(), 7);
        assert_eq!(form(Some(" -3 ")).priority_value(), -3);
    }

    #[test]
    fn priority_defaults_to_zero() {
        assert_eq!(form(None).priority_value(), 0);
        assert_eq!(form(Some("")).priority_value(), 0);
        assert_eq!(form(Some("high")).priority_value(), 0);
        assert_eq!(form(Some("4.5")).priority_value(), 0);
    }

    #[test]
    fn missing_text_becomes_empty() {
        let new_task = TaskForm::default().to_new_task();
        assert_eq!(new_task.name, "");
        assert_eq!(new_task.description, "");
        assert_eq!(new_task.priority, 0);
    }

    #[test]
    fn omitted_fields_deserialize_as_none() {
        let form: TaskForm = serde_json::from_value(serde_json::json!({
            "task_name": "Call plumber",
            "priority": "9"
        }))
        .unwrap();

        let edit = form.to_edit();
        assert_eq!(edit.name, "Call plumber");
        assert_eq!(edit.priority, 9);
        assert_eq!(edit.description, "");
    }
}
