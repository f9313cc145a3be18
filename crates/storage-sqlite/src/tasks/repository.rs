use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::{TaskDB, TaskMessageDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{task_messages, tasks};
use crate::utils::like_pattern;
use cybersentinel_core::tasks::{Task, TaskFilter, TaskMessage, TaskRepositoryTrait};
use cybersentinel_core::utils::{Page, PageRequest};
use cybersentinel_core::Result;

pub struct TaskRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl TaskRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }

    fn filtered(filter: &TaskFilter) -> tasks::BoxedQuery<'_, diesel::sqlite::Sqlite> {
        let mut query = tasks::table.into_boxed();
        if let Some(q) = filter.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = like_pattern(q);
            query = query.filter(
                tasks::title
                    .like(pattern.clone())
                    .escape('\\')
                    .or(tasks::assignee_name.like(pattern).escape('\\')),
            );
        }
        if let Some(status) = filter.status {
            query = query.filter(tasks::status.eq(status.as_str()));
        }
        if let Some(priority) = filter.priority {
            query = query.filter(tasks::priority.eq(priority.as_str()));
        }
        query
    }
}

/// Attaches each task's messages, oldest message first.
fn with_messages(conn: &mut SqliteConnection, rows: Vec<TaskDB>) -> Result<Vec<Task>> {
    let messages = TaskMessageDB::belonging_to(&rows)
        .order(task_messages::sent_at.asc())
        .select(TaskMessageDB::as_select())
        .load::<TaskMessageDB>(conn)
        .map_err(StorageError::from)?
        .grouped_by(&rows);

    rows.into_iter()
        .zip(messages)
        .map(|(task, messages)| {
            let messages = messages
                .into_iter()
                .map(TaskMessage::try_from)
                .collect::<Result<Vec<_>>>()?;
            task.into_task(messages)
        })
        .collect()
}

#[async_trait]
impl TaskRepositoryTrait for TaskRepository {
    fn search(&self, filter: &TaskFilter, page: PageRequest) -> Result<Page<Task>> {
        let mut conn = get_connection(&self.pool)?;
        let total = Self::filtered(filter)
            .count()
            .get_result::<i64>(&mut conn)
            .map_err(StorageError::from)?;
        let rows = Self::filtered(filter)
            .order((tasks::created_at.asc(), tasks::id.asc()))
            .offset(page.offset())
            .limit(page.limit())
            .select(TaskDB::as_select())
            .load::<TaskDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(page.wrap(with_messages(&mut conn, rows)?, total))
    }

    fn get_by_id(&self, task_id: &str) -> Result<Task> {
        let mut conn = get_connection(&self.pool)?;
        let row = tasks::table
            .find(task_id)
            .select(TaskDB::as_select())
            .first(&mut conn)
            .map_err(StorageError::from)?;
        let mut found = with_messages(&mut conn, vec![row])?;
        found
            .pop()
            .ok_or_else(|| StorageError::QueryFailed(diesel::result::Error::NotFound).into())
    }

    fn list_messages(&self, task_id: &str) -> Result<Vec<TaskMessage>> {
        let mut conn = get_connection(&self.pool)?;
        task_messages::table
            .filter(task_messages::task_id.eq(task_id))
            .order(task_messages::sent_at.asc())
            .select(TaskMessageDB::as_select())
            .load::<TaskMessageDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(TaskMessage::try_from)
            .collect()
    }

    async fn insert(&self, task: Task) -> Result<Task> {
        let row = TaskDB::from(&task);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Task> {
                diesel::insert_into(tasks::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(task)
            })
            .await
    }

    async fn update(&self, task: Task) -> Result<Task> {
        let row = TaskDB::from(&task);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Task> {
                let affected = diesel::update(tasks::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(StorageError::QueryFailed(diesel::result::Error::NotFound).into());
                }
                Ok(task)
            })
            .await
    }

    async fn delete(&self, task_id: &str) -> Result<usize> {
        let task_id = task_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(tasks::table.find(task_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    async fn insert_message(&self, message: TaskMessage) -> Result<TaskMessage> {
        let row = TaskMessageDB::from(&message);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<TaskMessage> {
                diesel::insert_into(task_messages::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(message)
            })
            .await
    }
}
