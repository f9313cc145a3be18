use async_trait::async_trait;

use super::tasks_model::{
    NewTask, NewTaskMessage, Task, TaskFilter, TaskMessage, TaskUpdate,
};
use crate::errors::Result;
use crate::users::User;
use crate::utils::{Page, PageRequest};

#[async_trait]
pub trait TaskRepositoryTrait: Send + Sync {
    /// Tasks matching the filter, with their messages attached.
    fn search(&self, filter: &TaskFilter, page: PageRequest) -> Result<Page<Task>>;
    fn get_by_id(&self, task_id: &str) -> Result<Task>;
    fn list_messages(&self, task_id: &str) -> Result<Vec<TaskMessage>>;

    async fn insert(&self, task: Task) -> Result<Task>;
    async fn update(&self, task: Task) -> Result<Task>;
    async fn delete(&self, task_id: &str) -> Result<usize>;
    async fn insert_message(&self, message: TaskMessage) -> Result<TaskMessage>;
}

#[async_trait]
pub trait TaskServiceTrait: Send + Sync {
    fn list_tasks(&self, filter: TaskFilter, page: PageRequest) -> Result<Page<Task>>;
    fn get_task(&self, task_id: &str) -> Result<Task>;
    async fn create_task(&self, new_task: NewTask) -> Result<Task>;
    async fn update_task(&self, task_id: &str, update: TaskUpdate) -> Result<Task>;
    async fn delete_task(&self, task_id: &str) -> Result<()>;
    fn list_messages(&self, task_id: &str) -> Result<Vec<TaskMessage>>;
    async fn add_message(
        &self,
        sender: Option<&User>,
        task_id: &str,
        message: NewTaskMessage,
    ) -> Result<TaskMessage>;
}
