pub mod task;

pub use task::{
    NewTask, NewTaskRequest, Task, TaskFilter, TaskQueryParams, TaskStatus,
    UpdateTaskStatusRequest,
};
