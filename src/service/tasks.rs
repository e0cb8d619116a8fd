//! Task endpoints.
//!
//! Subtasks are embedded in their task and addressed by title, which is not
//! required to be unique; a toggle by title therefore flips every subtask
//! carrying that title.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Service, ServiceError, Session};
use crate::core::{SubTask, Task};
use crate::store::DocumentStore;

/// Task fields supplied on creation; the id is assigned by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub due_date: NaiveDate,
    pub priority: u8,
    #[serde(default)]
    pub sub_tasks: Vec<SubTask>,
}

/// Partial task update; omitted fields keep their stored value. Supplying
/// `sub_tasks` replaces the whole subtask list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub done: Option<bool>,
    #[serde(default)]
    pub sub_tasks: Option<Vec<SubTask>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskResponse {
    pub message: String,
    pub task: Task,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskDeleted {
    pub message: String,
    pub task_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TasksResponse {
    pub message: String,
    pub tasks: Vec<Task>,
}

fn validate_priority(priority: u8) -> Result<(), ServiceError> {
    if !(1..=3).contains(&priority) {
        return Err(ServiceError::InvalidArgument(format!(
            "priority must be 1, 2 or 3, got {priority}"
        )));
    }
    Ok(())
}

impl<S: DocumentStore> Service<S> {
    pub fn create_task(
        &self,
        session: &Session,
        task: NewTask,
    ) -> Result<TaskResponse, ServiceError> {
        let uid = session.uid()?;
        if task.title.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "task title is required".to_string(),
            ));
        }
        validate_priority(task.priority)?;
        for sub in &task.sub_tasks {
            validate_priority(sub.priority)?;
        }
        let (mut user, revision) = self.load_user(uid)?;
        let task = Task {
            id: self.allocate_id(),
            title: task.title,
            description: task.description,
            due_date: task.due_date,
            priority: task.priority,
            done: false,
            sub_tasks: task.sub_tasks,
        };
        user.tasks.push(task.clone());
        self.write_field(uid, "tasks", &user.tasks, revision)?;
        tracing::info!(uid, task_id = %task.id, "task created");
        Ok(TaskResponse {
            message: "task created".to_string(),
            task,
        })
    }

    pub fn update_task(
        &self,
        session: &Session,
        task_id: &str,
        patch: TaskPatch,
    ) -> Result<TaskResponse, ServiceError> {
        let uid = session.uid()?;
        if task_id.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "task id is required".to_string(),
            ));
        }
        if let Some(priority) = patch.priority {
            validate_priority(priority)?;
        }
        if let Some(sub_tasks) = &patch.sub_tasks {
            for sub in sub_tasks {
                validate_priority(sub.priority)?;
            }
        }
        let (mut user, revision) = self.load_user(uid)?;
        let Some(task) = user.tasks.iter_mut().find(|t| t.id == task_id) else {
            return Err(ServiceError::NotFound(format!("task {task_id} not found")));
        };
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(done) = patch.done {
            task.done = done;
        }
        if let Some(sub_tasks) = patch.sub_tasks {
            task.sub_tasks = sub_tasks;
        }
        let task = task.clone();
        self.write_field(uid, "tasks", &user.tasks, revision)?;
        Ok(TaskResponse {
            message: "task updated".to_string(),
            task,
        })
    }

    pub fn delete_task(
        &self,
        session: &Session,
        task_id: &str,
    ) -> Result<TaskDeleted, ServiceError> {
        let uid = session.uid()?;
        if task_id.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "task id is required".to_string(),
            ));
        }
        let (mut user, revision) = self.load_user(uid)?;
        let before = user.tasks.len();
        user.tasks.retain(|t| t.id != task_id);
        if user.tasks.len() == before {
            return Err(ServiceError::NotFound(format!("task {task_id} not found")));
        }
        self.write_field(uid, "tasks", &user.tasks, revision)?;
        tracing::info!(uid, task_id, "task deleted");
        Ok(TaskDeleted {
            message: "task deleted".to_string(),
            task_id: task_id.to_string(),
        })
    }

    pub fn get_task(&self, session: &Session, task_id: &str) -> Result<TaskResponse, ServiceError> {
        let uid = session.uid()?;
        if task_id.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "task id is required".to_string(),
            ));
        }
        let (user, _) = self.load_user(uid)?;
        let task = user
            .tasks
            .into_iter()
            .find(|t| t.id == task_id)
            .ok_or_else(|| ServiceError::NotFound(format!("task {task_id} not found")))?;
        Ok(TaskResponse {
            message: "task found".to_string(),
            task,
        })
    }

    pub fn get_all_tasks(&self, session: &Session) -> Result<TasksResponse, ServiceError> {
        let uid = session.uid()?;
        let (user, _) = self.load_user(uid)?;
        Ok(TasksResponse {
            message: "tasks found".to_string(),
            tasks: user.tasks,
        })
    }

    /// Flips a task's done flag and forces every subtask's done flag to
    /// match the new value.
    pub fn toggle_task_status(
        &self,
        session: &Session,
        task_id: &str,
    ) -> Result<TaskResponse, ServiceError> {
        let uid = session.uid()?;
        if task_id.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "task id is required".to_string(),
            ));
        }
        let (mut user, revision) = self.load_user(uid)?;
        let Some(task) = user.tasks.iter_mut().find(|t| t.id == task_id) else {
            return Err(ServiceError::NotFound(format!("task {task_id} not found")));
        };
        task.done = !task.done;
        for sub in &mut task.sub_tasks {
            sub.done = task.done;
        }
        let task = task.clone();
        self.write_field(uid, "tasks", &user.tasks, revision)?;
        Ok(TaskResponse {
            message: "task status toggled".to_string(),
            task,
        })
    }

    /// Flips the done flag of every subtask whose title appears in `titles`.
    /// Duplicate titles are all affected; a title matching nothing is ignored
    /// as long as at least one subtask matched.
    pub fn toggle_sub_task_status(
        &self,
        session: &Session,
        task_id: &str,
        titles: &[String],
    ) -> Result<TaskResponse, ServiceError> {
        let uid = session.uid()?;
        if task_id.trim().is_empty() {
            return Err(ServiceError::InvalidArgument(
                "task id is required".to_string(),
            ));
        }
        if titles.is_empty() {
            return Err(ServiceError::InvalidArgument(
                "at least one subtask title is required".to_string(),
            ));
        }
        let (mut user, revision) = self.load_user(uid)?;
        let Some(task) = user.tasks.iter_mut().find(|t| t.id == task_id) else {
            return Err(ServiceError::NotFound(format!("task {task_id} not found")));
        };
        let mut toggled = 0usize;
        for sub in &mut task.sub_tasks {
            if titles.contains(&sub.title) {
                sub.done = !sub.done;
                toggled += 1;
            }
        }
        if toggled == 0 {
            return Err(ServiceError::NotFound(format!(
                "no matching subtask in task {task_id}"
            )));
        }
        let task = task.clone();
        self.write_field(uid, "tasks", &user.tasks, revision)?;
        tracing::debug!(uid, task_id, toggled, "subtask status toggled");
        Ok(TaskResponse {
            message: "subtask status toggled".to_string(),
            task,
        })
    }
}
