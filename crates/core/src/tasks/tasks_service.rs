use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use super::tasks_model::{
    NewTask, NewTaskMessage, Task, TaskFilter, TaskMessage, TaskStatus, TaskUpdate,
};
use super::tasks_traits::{TaskRepositoryTrait, TaskServiceTrait};
use crate::errors::{Error, Result};
use crate::users::User;
use crate::utils::validation::require_non_empty;
use crate::utils::{Page, PageRequest};

pub struct TaskService {
    repository: Arc<dyn TaskRepositoryTrait>,
}

impl TaskService {
    pub fn new(repository: Arc<dyn TaskRepositoryTrait>) -> Self {
        Self { repository }
    }

    fn not_found(e: Error) -> Error {
        if e.is_not_found() {
            Error::not_found("Task not found")
        } else {
            e
        }
    }
}

#[async_trait]
impl TaskServiceTrait for TaskService {
    fn list_tasks(&self, filter: TaskFilter, page: PageRequest) -> Result<Page<Task>> {
        self.repository.search(&filter, page)
    }

    fn get_task(&self, task_id: &str) -> Result<Task> {
        self.repository.get_by_id(task_id).map_err(Self::not_found)
    }

    async fn create_task(&self, new_task: NewTask) -> Result<Task> {
        new_task.validate()?;
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: new_task.title.trim().to_string(),
            description: new_task.description,
            priority: new_task.priority,
            status: TaskStatus::Pending,
            assignee_id: new_task.assignee_id,
            assignee_name: new_task.assignee_name,
            created_at: Utc::now().naive_utc(),
            due_date: new_task.due_date,
            completed_at: None,
            asset_name: new_task.asset_name,
            messages: Vec::new(),
        };
        self.repository.insert(task).await
    }

    async fn update_task(&self, task_id: &str, update: TaskUpdate) -> Result<Task> {
        let mut task = self.get_task(task_id)?;
        update.apply(&mut task, Utc::now().naive_utc())?;
        self.repository.update(task).await.map_err(Self::not_found)
    }

    async fn delete_task(&self, task_id: &str) -> Result<()> {
        match self.repository.delete(task_id).await? {
            0 => Err(Error::not_found("Task not found")),
            _ => Ok(()),
        }
    }

    fn list_messages(&self, task_id: &str) -> Result<Vec<TaskMessage>> {
        self.get_task(task_id)?;
        self.repository.list_messages(task_id)
    }

    async fn add_message(
        &self,
        sender: Option<&User>,
        task_id: &str,
        message: NewTaskMessage,
    ) -> Result<TaskMessage> {
        require_non_empty(&message.message, "Message")?;
        self.get_task(task_id)?;
        let sender = sender
            .map(|u| u.name.clone())
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| "System".to_string());
        self.repository
            .insert_message(TaskMessage {
                id: Uuid::new_v4().to_string(),
                task_id: task_id.to_string(),
                sender,
                message: message.message,
                timestamp: Utc::now().naive_utc(),
                platform: message.platform,
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{MessagePlatform, TaskPriority};
    use crate::users::test_support::member;
    use crate::users::Role;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockTaskRepository {
        tasks: Mutex<Vec<Task>>,
        messages: Mutex<Vec<TaskMessage>>,
    }

    #[async_trait]
    impl TaskRepositoryTrait for MockTaskRepository {
        fn search(&self, _: &TaskFilter, _: PageRequest) -> Result<Page<Task>> {
            unimplemented!()
        }
        fn get_by_id(&self, task_id: &str) -> Result<Task> {
            self.tasks
                .lock()
                .unwrap()
                .iter()
                .find(|t| t.id == task_id)
                .cloned()
                .ok_or_else(|| Error::not_found("missing"))
        }
        fn list_messages(&self, task_id: &str) -> Result<Vec<TaskMessage>> {
            Ok(self
                .messages
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.task_id == task_id)
                .cloned()
                .collect())
        }
        async fn insert(&self, task: Task) -> Result<Task> {
            self.tasks.lock().unwrap().push(task.clone());
            Ok(task)
        }
        async fn update(&self, task: Task) -> Result<Task> {
            let mut tasks = self.tasks.lock().unwrap();
            let slot = tasks
                .iter_mut()
                .find(|t| t.id == task.id)
                .ok_or_else(|| Error::not_found("missing"))?;
            *slot = task.clone();
            Ok(task)
        }
        async fn delete(&self, task_id: &str) -> Result<usize> {
            let mut tasks = self.tasks.lock().unwrap();
            let before = tasks.len();
            tasks.retain(|t| t.id != task_id);
            Ok(before - tasks.len())
        }
        async fn insert_message(&self, message: TaskMessage) -> Result<TaskMessage> {
            self.messages.lock().unwrap().push(message.clone());
            Ok(message)
        }
    }

    fn new_task(title: &str) -> NewTask {
        NewTask {
            title: title.into(),
            description: None,
            priority: TaskPriority::High,
            assignee_id: None,
            assignee_name: Some("Sarah Johnson".into()),
            due_date: None,
            asset_name: None,
        }
    }

    #[tokio::test]
    async fn create_update_delete() {
        let svc = TaskService::new(Arc::new(MockTaskRepository::default()));
        let task = svc.create_task(new_task("Patch server")).await.unwrap();
        assert_eq!(task.status, TaskStatus::Pending);

        let updated = svc
            .update_task(
                &task.id,
                TaskUpdate {
                    status: Some(TaskStatus::Completed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.completed_at.is_some());

        svc.delete_task(&task.id).await.unwrap();
        let err = svc.delete_task(&task.id).await.unwrap_err();
        assert_eq!(err.to_string(), "Task not found");
        assert_eq!(svc.get_task(&task.id).unwrap_err().to_string(), "Task not found");
    }

    #[tokio::test]
    async fn messages_use_sender_name_or_system() {
        let svc = TaskService::new(Arc::new(MockTaskRepository::default()));
        let task = svc.create_task(new_task("Rotate keys")).await.unwrap();
        let user = member("alice", "c1", Role::Analyst);

        let msg = svc
            .add_message(
                Some(&user),
                &task.id,
                NewTaskMessage {
                    message: "on it".into(),
                    platform: MessagePlatform::Slack,
                },
            )
            .await
            .unwrap();
        assert_eq!(msg.sender, "alice");

        let msg = svc
            .add_message(
                None,
                &task.id,
                NewTaskMessage {
                    message: "reminder".into(),
                    platform: MessagePlatform::Internal,
                },
            )
            .await
            .unwrap();
        assert_eq!(msg.sender, "System");
        assert_eq!(svc.list_messages(&task.id).unwrap().len(), 2);

        assert!(svc
            .add_message(
                None,
                "missing",
                NewTaskMessage {
                    message: "x".into(),
                    platform: MessagePlatform::Email,
                },
            )
            .await
            .unwrap_err()
            .is_not_found());
    }
}
