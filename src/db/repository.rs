use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskFilter, TaskStatus};

const TASK_COLUMNS: &str =
    "id, title, description, status, completed, fecha, created_at, updated_at";

/// Persistence gateway for tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Newest-created first.
    async fn find_all(&self, filter: TaskFilter) -> Result<Vec<Task>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Task>, AppError>;
    async fn create(&self, new_task: NewTask) -> Result<Task, AppError>;
    /// Writes `status` together with its derived `completed` flag.
    /// Fails with `NotFound` when no row has this id.
    async fn update_status(&self, id: &str, status: TaskStatus) -> Result<Task, AppError>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct SqliteTaskStore {
    db: SqlitePool,
}

impl SqliteTaskStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    async fn find_all(&self, filter: TaskFilter) -> Result<Vec<Task>, AppError> {
        // rowid breaks ties between rows created within the same instant
        let tasks = match filter.status {
            Some(status) => {
                sqlx::query_as::<_, Task>(&format!(
                    r#"
                    SELECT {TASK_COLUMNS} FROM tasks
                    WHERE status = ?
                    ORDER BY created_at DESC, rowid DESC
                    "#
                ))
                .bind(status)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as::<_, Task>(&format!(
                    "SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at DESC, rowid DESC"
                ))
                .fetch_all(&self.db)
                .await?
            }
        };
        Ok(tasks)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Task>, AppError> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(task)
    }

    async fn create(&self, new_task: NewTask) -> Result<Task, AppError> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let status = TaskStatus::Pending;

        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks
                (id, title, description, status, completed, fecha, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(&id)
        .bind(&new_task.title)
        .bind(&new_task.description)
        .bind(status)
        .bind(status.is_completed())
        .bind(new_task.fecha.unwrap_or(now))
        .bind(now)
        .fetch_one(&self.db)
        .await?;

        Ok(task)
    }

    async fn update_status(&self, id: &str, status: TaskStatus) -> Result<Task, AppError> {
        let now = Utc::now();

        sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET status = ?1,
                completed = ?2,
                updated_at = ?3
            WHERE id = ?4
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(status)
        .bind(status.is_completed())
        .bind(now)
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("task {id} does not exist")))
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await?
            .rows_affected();

        Ok(result > 0)
    }
}
