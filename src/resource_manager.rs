//! Resource management

use crate::error::IngestError;

use tokio::sync::{Semaphore, SemaphorePermit};

/// [crate::resource_manager::ResourceManager] bounds the number of enumeration tasks that may run
/// at once. Enumeration is CPU bound, so running more tasks than cores only adds latency.
#[derive(Debug)]
pub struct ResourceManager {
    /// Optional semaphore for tasks.
    tasks: Option<Semaphore>,
}

impl ResourceManager {
    /// Returns a new ResourceManager object.
    pub fn new(task_limit: Option<usize>) -> Self {
        Self {
            tasks: task_limit.map(Semaphore::new),
        }
    }

    /// Acquire a task resource.
    ///
    /// Returns `None` when tasks are unlimited.
    pub async fn task(&self) -> Result<Option<SemaphorePermit>, IngestError> {
        match &self.tasks {
            Some(tasks) => Ok(Some(tasks.acquire().await?)),
            None => Ok(None),
        }
    }
}
