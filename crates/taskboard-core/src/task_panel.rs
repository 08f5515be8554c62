//! State container behind the remote task panel.
//!
//! Every remote operation is split in two: a synchronous `begin_*` step that
//! validates the draft, raises the loading flag and hands back a call ticket,
//! and a `finish_*` step that consumes the ticket together with the call's
//! result. Hosts that run on an event loop (the Yew front end) await the call
//! between the two steps without holding a borrow of the panel, so a second
//! call can be issued while the first one is still out. The `load`, `create`,
//! `save_edit` and `delete` drivers chain both steps for sequential callers.
//!
//! Overlapping calls are governed by [`FlightPolicy`].

use std::collections::BTreeSet;

use chrono::Utc;
use taskboard_shared::{TaskDto, TaskId, TaskInsert, TaskPatch, TaskPriority};
use tracing::{debug, error, info, instrument, warn};

use crate::error::PanelError;
use crate::table::TaskTable;

/// How the panel treats a call issued while another one is still out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlightPolicy {
    /// Every call goes out. Create, update and delete apply their change to
    /// the list as it was when the call began, so the last response to land
    /// wins.
    #[default]
    Unguarded,
    /// At most one call per [`FlightKey`]; results patch the live list.
    SingleFlight,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FlightKey {
    Fetch,
    Create,
    Update(TaskId),
    Delete(TaskId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    Priority,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: TaskPriority,
}

#[must_use = "a fetch ticket must be passed to finish_fetch"]
#[derive(Debug)]
pub struct FetchCall {
    _issued: (),
}

#[must_use = "a create ticket must be passed to finish_create"]
#[derive(Debug)]
pub struct CreateCall {
    row: TaskInsert,
    snapshot: Vec<TaskDto>,
}

impl CreateCall {
    pub fn row(&self) -> &TaskInsert {
        &self.row
    }
}

#[must_use = "an update ticket must be passed to finish_save_edit"]
#[derive(Debug)]
pub struct UpdateCall {
    edited: TaskDto,
    patch: TaskPatch,
    snapshot: Vec<TaskDto>,
}

impl UpdateCall {
    pub fn id(&self) -> &TaskId {
        &self.edited.id
    }

    pub fn patch(&self) -> &TaskPatch {
        &self.patch
    }
}

#[must_use = "a delete ticket must be passed to finish_delete"]
#[derive(Debug)]
pub struct DeleteCall {
    id: TaskId,
    snapshot: Vec<TaskDto>,
}

impl DeleteCall {
    pub fn id(&self) -> &TaskId {
        &self.id
    }
}

#[derive(Debug, Clone)]
pub struct TaskPanel {
    tasks: Vec<TaskDto>,
    new_task: TaskDraft,
    editing_task: Option<TaskDto>,
    is_editing: bool,
    loading: bool,
    error: Option<PanelError>,
    policy: FlightPolicy,
    in_flight: BTreeSet<FlightKey>,
}

impl Default for TaskPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskPanel {
    /// A panel about to mount: empty list, loading raised for the initial
    /// fetch.
    pub fn new() -> Self {
        Self::with_policy(FlightPolicy::default())
    }

    pub fn with_policy(policy: FlightPolicy) -> Self {
        Self {
            tasks: Vec::new(),
            new_task: TaskDraft::default(),
            editing_task: None,
            is_editing: false,
            loading: true,
            error: None,
            policy,
            in_flight: BTreeSet::new(),
        }
    }

    pub fn tasks(&self) -> &[TaskDto] {
        &self.tasks
    }

    pub fn new_task(&self) -> &TaskDraft {
        &self.new_task
    }

    pub fn editing_task(&self) -> Option<&TaskDto> {
        self.editing_task.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.is_editing
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<PanelError> {
        self.error
    }

    pub fn policy(&self) -> FlightPolicy {
        self.policy
    }

    pub fn is_in_flight(&self, key: &FlightKey) -> bool {
        self.in_flight.contains(key)
    }

    pub fn change_new_task(&mut self, field: TaskField, value: &str) {
        apply_field(
            &mut self.new_task.title,
            &mut self.new_task.description,
            &mut self.new_task.priority,
            field,
            value,
        );
    }

    pub fn change_editing_task(&mut self, field: TaskField, value: &str) {
        let Some(task) = self.editing_task.as_mut() else {
            debug!(?field, "no task is being edited; change ignored");
            return;
        };
        apply_field(
            &mut task.title,
            &mut task.description,
            &mut task.priority,
            field,
            value,
        );
    }

    #[instrument(skip(self))]
    pub fn begin_fetch(&mut self) -> Option<FetchCall> {
        if !self.claim(FlightKey::Fetch) {
            return None;
        }
        self.loading = true;
        info!("fetching tasks");
        Some(FetchCall { _issued: () })
    }

    #[instrument(skip_all)]
    pub fn finish_fetch(
        &mut self,
        call: FetchCall,
        result: anyhow::Result<Option<Vec<TaskDto>>>,
    ) {
        let FetchCall { _issued } = call;
        self.release(&FlightKey::Fetch);
        match result {
            Ok(rows) => {
                let rows = rows.unwrap_or_default();
                debug!(count = rows.len(), "tasks fetched");
                self.tasks = rows;
            }
            Err(err) => self.fail(PanelError::Fetch, &err),
        }
        self.loading = false;
    }

    #[instrument(skip(self), fields(title_len = self.new_task.title.len()))]
    pub fn begin_create(&mut self) -> Option<CreateCall> {
        if self.new_task.title.trim().is_empty() {
            debug!("new task title is blank; nothing to add");
            return None;
        }
        if !self.claim(FlightKey::Create) {
            return None;
        }
        self.loading = true;

        let row = TaskInsert {
            title: self.new_task.title.clone(),
            description: self.new_task.description.clone(),
            priority: self.new_task.priority,
        };
        Some(CreateCall {
            row,
            snapshot: self.tasks.clone(),
        })
    }

    #[instrument(skip_all)]
    pub fn finish_create(&mut self, call: CreateCall, result: anyhow::Result<Option<TaskDto>>) {
        self.release(&FlightKey::Create);
        match result {
            Ok(inserted) => {
                if let Some(task) = inserted {
                    info!(id = %task.id, "task added");
                    let mut tasks = self.settle(call.snapshot);
                    tasks.insert(0, task);
                    self.tasks = tasks;
                } else {
                    warn!("insert returned no row; list left as is");
                }
                self.new_task = TaskDraft::default();
            }
            Err(err) => self.fail(PanelError::Create, &err),
        }
        self.loading = false;
    }

    /// Copies `task` into the edit draft, replacing any edit in progress.
    #[instrument(skip(self, task), fields(id = %task.id))]
    pub fn begin_edit(&mut self, task: &TaskDto) {
        if let Some(previous) = self.editing_task.as_ref()
            && previous.id != task.id
        {
            debug!(previous = %previous.id, "discarding previous edit draft");
        }
        self.editing_task = Some(task.clone());
        self.is_editing = true;
    }

    /// Starts editing the listed task with `id`. Returns `false` when no such
    /// task is listed.
    pub fn begin_edit_by_id(&mut self, id: &TaskId) -> bool {
        let Some(task) = self.tasks.iter().find(|task| task.id == *id).cloned() else {
            warn!(%id, "task not listed; cannot edit");
            return false;
        };
        self.begin_edit(&task);
        true
    }

    #[instrument(skip(self))]
    pub fn begin_save_edit(&mut self) -> Option<UpdateCall> {
        let edited = match (self.is_editing, self.editing_task.as_ref()) {
            (true, Some(task)) => task.clone(),
            _ => {
                debug!("no edit in progress; nothing to save");
                return None;
            }
        };
        if edited.title.trim().is_empty() {
            debug!(id = %edited.id, "edited title is blank; nothing to save");
            return None;
        }
        if !self.claim(FlightKey::Update(edited.id.clone())) {
            return None;
        }
        self.loading = true;

        let patch = TaskPatch {
            title: edited.title.clone(),
            description: edited.description.clone(),
            priority: edited.priority,
            updated_at: Utc::now(),
        };
        Some(UpdateCall {
            edited,
            patch,
            snapshot: self.tasks.clone(),
        })
    }

    #[instrument(skip_all, fields(id = %call.edited.id))]
    pub fn finish_save_edit(&mut self, call: UpdateCall, result: anyhow::Result<()>) {
        let UpdateCall {
            edited, snapshot, ..
        } = call;
        self.release(&FlightKey::Update(edited.id.clone()));
        match result {
            Ok(()) => {
                let updated = TaskDto {
                    updated_at: Some(Utc::now()),
                    ..edited
                };
                info!(id = %updated.id, "task updated");
                self.tasks = self
                    .settle(snapshot)
                    .into_iter()
                    .map(|task| {
                        if task.id == updated.id {
                            updated.clone()
                        } else {
                            task
                        }
                    })
                    .collect();
                self.is_editing = false;
                self.editing_task = None;
            }
            Err(err) => self.fail(PanelError::Update, &err),
        }
        self.loading = false;
    }

    pub fn cancel_edit(&mut self) {
        self.is_editing = false;
        self.editing_task = None;
    }

    #[instrument(skip(self))]
    pub fn begin_delete(&mut self, id: &TaskId) -> Option<DeleteCall> {
        if !self.claim(FlightKey::Delete(id.clone())) {
            return None;
        }
        self.loading = true;
        Some(DeleteCall {
            id: id.clone(),
            snapshot: self.tasks.clone(),
        })
    }

    #[instrument(skip_all, fields(id = %call.id))]
    pub fn finish_delete(&mut self, call: DeleteCall, result: anyhow::Result<()>) {
        let DeleteCall { id, snapshot } = call;
        self.release(&FlightKey::Delete(id.clone()));
        match result {
            Ok(()) => {
                info!(%id, "task deleted");
                let mut tasks = self.settle(snapshot);
                tasks.retain(|task| task.id != id);
                self.tasks = tasks;
            }
            Err(err) => self.fail(PanelError::Delete, &err),
        }
        self.loading = false;
    }

    pub async fn load<T: TaskTable>(&mut self, table: &T) {
        let Some(call) = self.begin_fetch() else {
            return;
        };
        let result = table.list_all().await;
        self.finish_fetch(call, result);
    }

    pub async fn create<T: TaskTable>(&mut self, table: &T) {
        let Some(call) = self.begin_create() else {
            return;
        };
        let result = table.insert_one(call.row().clone()).await;
        self.finish_create(call, result);
    }

    pub async fn save_edit<T: TaskTable>(&mut self, table: &T) {
        let Some(call) = self.begin_save_edit() else {
            return;
        };
        let result = table.update_one(call.id(), call.patch().clone()).await;
        self.finish_save_edit(call, result);
    }

    pub async fn delete<T: TaskTable>(&mut self, table: &T, id: &TaskId) {
        let Some(call) = self.begin_delete(id) else {
            return;
        };
        let result = table.delete_one(id).await;
        self.finish_delete(call, result);
    }

    fn claim(&mut self, key: FlightKey) -> bool {
        if self.policy == FlightPolicy::Unguarded {
            return true;
        }
        if self.in_flight.contains(&key) {
            warn!(?key, "call already in flight; rejected");
            return false;
        }
        self.in_flight.insert(key);
        true
    }

    fn release(&mut self, key: &FlightKey) {
        if self.policy == FlightPolicy::SingleFlight {
            self.in_flight.remove(key);
        }
    }

    /// The list a finished call writes its change onto.
    fn settle(&mut self, snapshot: Vec<TaskDto>) -> Vec<TaskDto> {
        match self.policy {
            FlightPolicy::Unguarded => snapshot,
            FlightPolicy::SingleFlight => std::mem::take(&mut self.tasks),
        }
    }

    fn fail(&mut self, err: PanelError, cause: &anyhow::Error) {
        error!(cause = %format!("{cause:#}"), "{err}");
        self.error = Some(err);
    }
}

fn apply_field(
    title: &mut String,
    description: &mut String,
    priority: &mut TaskPriority,
    field: TaskField,
    value: &str,
) {
    match field {
        TaskField::Title => *title = value.to_string(),
        TaskField::Description => *description = value.to_string(),
        TaskField::Priority => match value.parse::<TaskPriority>() {
            Ok(parsed) => *priority = parsed,
            Err(err) => warn!(error = %err, "priority change ignored"),
        },
    }
}
