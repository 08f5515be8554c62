use taskboard_shared::{TaskDto, TaskId, TaskInsert, TaskPatch};

/// The remote `tasks` table as seen by the task panel.
///
/// Any `Err` aborts the operation that issued the call; the panel turns it
/// into a fixed message and keeps running.
#[allow(async_fn_in_trait)]
pub trait TaskTable {
    /// Every row, newest `created_at` first. `None` when the store answered
    /// with a null payload.
    async fn list_all(&self) -> anyhow::Result<Option<Vec<TaskDto>>>;

    /// Inserts one row and returns it as stored, if the store echoed it.
    async fn insert_one(&self, row: TaskInsert) -> anyhow::Result<Option<TaskDto>>;

    async fn update_one(&self, id: &TaskId, patch: TaskPatch) -> anyhow::Result<()>;

    async fn delete_one(&self, id: &TaskId) -> anyhow::Result<()>;
}
