//! Remediation tasks shared by every tenant, with their discussion threads.

mod tasks_model;
mod tasks_service;
mod tasks_traits;

pub use tasks_model::{
    MessagePlatform, NewTask, NewTaskMessage, Task, TaskFilter, TaskMessage, TaskPriority,
    TaskStatus, TaskUpdate,
};
pub use tasks_service::TaskService;
pub use tasks_traits::{TaskRepositoryTrait, TaskServiceTrait};
