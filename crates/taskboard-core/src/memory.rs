use anyhow::anyhow;
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use taskboard_shared::{TaskDto, TaskId, TaskInsert, TaskPatch};
use tracing::debug;

use crate::table::TaskTable;

/// Number of calls each table method has received.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub insert: usize,
    pub update: usize,
    pub delete: usize,
}

impl CallCounts {
    pub fn total(&self) -> usize {
        self.list + self.insert + self.update + self.delete
    }
}

#[derive(Debug, Default)]
struct Inner {
    rows: Vec<TaskDto>,
    calls: CallCounts,
    fail_next: usize,
    fail_all: bool,
    null_list: bool,
    last_created: Option<DateTime<Utc>>,
}

impl Inner {
    fn should_fail(&mut self) -> bool {
        if self.fail_all {
            return true;
        }
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return true;
        }
        false
    }

    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let created = match self.last_created {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created = Some(created);
        created
    }
}

/// A `tasks` table held in process memory.
///
/// Rows are kept newest first. Failures can be armed to exercise the error
/// paths of the panel.
#[derive(Debug, Default)]
pub struct MemoryTable {
    inner: Mutex<Inner>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `rows`, which must already be newest first.
    pub fn with_rows(rows: Vec<TaskDto>) -> Self {
        let last_created = rows.iter().map(|row| row.created_at).max();
        Self {
            inner: Mutex::new(Inner {
                rows,
                last_created,
                ..Inner::default()
            }),
        }
    }

    pub fn rows(&self) -> Vec<TaskDto> {
        self.inner.lock().rows.clone()
    }

    pub fn calls(&self) -> CallCounts {
        self.inner.lock().calls
    }

    /// Fails the next `count` calls, whatever the method.
    pub fn fail_next(&self, count: usize) {
        self.inner.lock().fail_next = count;
    }

    pub fn fail_all(&self, fail: bool) {
        self.inner.lock().fail_all = fail;
    }

    /// Makes `list_all` answer with a null payload.
    pub fn answer_null_list(&self, null: bool) {
        self.inner.lock().null_list = null;
    }
}

impl TaskTable for MemoryTable {
    async fn list_all(&self) -> anyhow::Result<Option<Vec<TaskDto>>> {
        let mut inner = self.inner.lock();
        inner.calls.list += 1;
        if inner.should_fail() {
            return Err(anyhow!("memory table: list failed"));
        }
        if inner.null_list {
            return Ok(None);
        }
        Ok(Some(inner.rows.clone()))
    }

    async fn insert_one(&self, row: TaskInsert) -> anyhow::Result<Option<TaskDto>> {
        let mut inner = self.inner.lock();
        inner.calls.insert += 1;
        if inner.should_fail() {
            return Err(anyhow!("memory table: insert failed"));
        }

        let task = TaskDto {
            id: TaskId::random(),
            title: row.title,
            description: row.description,
            priority: row.priority,
            created_at: inner.next_created_at(),
            updated_at: None,
        };
        debug!(id = %task.id, "memory table row inserted");
        inner.rows.insert(0, task.clone());
        Ok(Some(task))
    }

    async fn update_one(&self, id: &TaskId, patch: TaskPatch) -> anyhow::Result<()> {
        let mut inner = self.inner.lock();
        inner.calls.update += 1;
        if inner.should_fail() {
            return Err(anyhow!("memory table: update failed"));
        }

        // Like an `eq` filter, a missing id matches nothing and is not an error.
        if let Some(task) = inner.rows.iter_mut().find(|task| task.id == *id) {
            task.title = patch.title;
            task.description = patch.description;
            task.priority = patch.priority;
            task.updated_at = Some(patch.updated_at);
        }
        Ok(())
    }

    async fn delete_one(&self, id: &TaskId) -> anyhow::Result<()> {
        let mut inner = self.inner.lock();
        inner.calls.delete += 1;
        if inner.should_fail() {
            return Err(anyhow!("memory table: delete failed"));
        }
        inner.rows.retain(|task| task.id != *id);
        Ok(())
    }
}
