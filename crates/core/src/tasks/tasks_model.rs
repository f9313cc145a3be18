use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::validation::require_non_empty;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Critical => "critical",
            TaskPriority::High => "high",
            TaskPriority::Medium => "medium",
            TaskPriority::Low => "low",
        }
    }
}

impl FromStr for TaskPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "critical" => Ok(TaskPriority::Critical),
            "high" => Ok(TaskPriority::High),
            "medium" => Ok(TaskPriority::Medium),
            "low" => Ok(TaskPriority::Low),
            _ => Err(Error::invalid(format!("Invalid priority: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Overdue,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Overdue => "overdue",
        }
    }
}

impl FromStr for TaskStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            "overdue" => Ok(TaskStatus::Overdue),
            _ => Err(Error::invalid(format!("Invalid status: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessagePlatform {
    #[default]
    Internal,
    Slack,
    Jira,
    Email,
}

impl MessagePlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessagePlatform::Internal => "internal",
            MessagePlatform::Slack => "slack",
            MessagePlatform::Jira => "jira",
            MessagePlatform::Email => "email",
        }
    }
}

impl FromStr for MessagePlatform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "internal" => Ok(MessagePlatform::Internal),
            "slack" => Ok(MessagePlatform::Slack),
            "jira" => Ok(MessagePlatform::Jira),
            "email" => Ok(MessagePlatform::Email),
            _ => Err(Error::invalid(format!("Invalid platform: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskMessage {
    pub id: String,
    #[serde(skip_serializing, default)]
    pub task_id: String,
    pub sender: String,
    pub message: String,
    pub timestamp: NaiveDateTime,
    pub platform: MessagePlatform,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub assignee_id: Option<String>,
    pub assignee_name: Option<String>,
    pub created_at: NaiveDateTime,
    pub due_date: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub asset_name: Option<String>,
    #[serde(default)]
    pub messages: Vec<TaskMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub priority: TaskPriority,
    pub assignee_id: Option<String>,
    pub assignee_name: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub asset_name: Option<String>,
}

impl NewTask {
    pub fn validate(&self) -> Result<()> {
        require_non_empty(&self.title, "Title")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub assignee_id: Option<String>,
    pub assignee_name: Option<String>,
    pub due_date: Option<NaiveDateTime>,
    pub completed_at: Option<NaiveDateTime>,
    pub asset_name: Option<String>,
}

impl TaskUpdate {
    /// Applies the set fields to `task`. Completing a task stamps
    /// `completed_at` with `now` unless one was given.
    pub fn apply(self, task: &mut Task, now: NaiveDateTime) -> Result<()> {
        if let Some(title) = self.title {
            require_non_empty(&title, "Title")?;
            task.title = title;
        }
        if self.description.is_some() {
            task.description = self.description;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if self.assignee_id.is_some() {
            task.assignee_id = self.assignee_id;
        }
        if self.assignee_name.is_some() {
            task.assignee_name = self.assignee_name;
        }
        if self.due_date.is_some() {
            task.due_date = self.due_date;
        }
        if self.asset_name.is_some() {
            task.asset_name = self.asset_name;
        }
        if self.completed_at.is_some() {
            task.completed_at = self.completed_at;
        }
        if let Some(status) = self.status {
            task.status = status;
            if status == TaskStatus::Completed && self.completed_at.is_none() {
                task.completed_at = Some(now);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Case-insensitive match on title or assignee name.
    pub q: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTaskMessage {
    pub message: String,
    #[serde(default)]
    pub platform: MessagePlatform,
}
