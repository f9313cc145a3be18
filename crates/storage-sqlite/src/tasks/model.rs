use chrono::NaiveDateTime;
use diesel::prelude::*;
use std::str::FromStr;

use cybersentinel_core::errors::{Error, Result};
use cybersentinel_core::tasks::{MessagePlatform, Task, TaskMessage, TaskPriority, TaskStatus};

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::tasks)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct TaskDB {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: String,
    pub status: String,
    pub assignee_id: Option<String>,
    pub assignee_name: Option<String>,
    pub created_at: NaiveDateTime,
    pub due_date: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub asset_name: Option<String>,
}

impl TaskDB {
    /// Builds the domain task; messages are attached by the caller.
    pub fn into_task(self, messages: Vec<TaskMessage>) -> Result<Task> {
        Ok(Task {
            priority: TaskPriority::from_str(&self.priority)?,
            status: TaskStatus::from_str(&self.status)?,
            id: self.id,
            title: self.title,
            description: self.description,
            assignee_id: self.assignee_id,
            assignee_name: self.assignee_name,
            created_at: self.created_at,
            due_date: self.due_date,
            completed_at: self.completed_at,
            asset_name: self.asset_name,
            messages,
        })
    }
}

impl From<&Task> for TaskDB {
    fn from(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority.as_str().to_string(),
            status: task.status.as_str().to_string(),
            assignee_id: task.assignee_id.clone(),
            assignee_name: task.assignee_name.clone(),
            created_at: task.created_at,
            due_date: task.due_date,
            completed_at: task.completed_at,
            asset_name: task.asset_name.clone(),
        }
    }
}

#[derive(Queryable, Identifiable, Insertable, Selectable, Associations, PartialEq, Debug, Clone)]
#[diesel(belongs_to(TaskDB, foreign_key = task_id))]
#[diesel(table_name = crate::schema::task_messages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TaskMessageDB {
    pub id: String,
    pub task_id: String,
    pub sender: String,
    pub message: String,
    pub sent_at: NaiveDateTime,
    pub platform: String,
}

impl TryFrom<TaskMessageDB> for TaskMessage {
    type Error = Error;

    fn try_from(db: TaskMessageDB) -> Result<Self> {
        Ok(Self {
            platform: MessagePlatform::from_str(&db.platform)?,
            id: db.id,
            task_id: db.task_id,
            sender: db.sender,
            message: db.message,
            timestamp: db.sent_at,
        })
    }
}

impl From<&TaskMessage> for TaskMessageDB {
    fn from(m: &TaskMessage) -> Self {
        Self {
            id: m.id.clone(),
            task_id: m.task_id.clone(),
            sender: m.sender.clone(),
            message: m.message.clone(),
            sent_at: m.timestamp,
            platform: m.platform.as_str().to_string(),
        }
    }
}
