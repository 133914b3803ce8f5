use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::db::TaskStore;
use crate::error::AppError;
use crate::models::{NewTask, Task, TaskFilter, TaskStatus};

/// Task operations on top of a [`TaskStore`].
pub struct TaskService {
    store: Arc<dyn TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(skip(self, new_task), fields(title = %new_task.title))]
    pub async fn create_task(&self, mut new_task: NewTask) -> Result<Task, AppError> {
        new_task.fecha.get_or_insert_with(Utc::now);
        let task = self.store.create(new_task).await?;
        info!("created task {}", task.id);
        Ok(task)
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, AppError> {
        self.store.find_all(filter).await
    }

    /// Moves a task to `status`.
    ///
    /// The read and the write are separate store calls, so two concurrent
    /// updates may both pass the no-op check; the last write wins.
    #[tracing::instrument(skip(self))]
    pub async fn update_task_status(&self, id: &str, status: TaskStatus) -> Result<Task, AppError> {
        let current = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("task {id} does not exist")))?;

        if current.status == status {
            warn!("rejected no-op transition for task {}", id);
            return Err(AppError::InvalidTransition(format!(
                "task {id} already has status {status}"
            )));
        }

        let task = self.store.update_status(id, status).await?;
        info!("task {} moved from {} to {}", id, current.status, task.status);
        Ok(task)
    }
}
