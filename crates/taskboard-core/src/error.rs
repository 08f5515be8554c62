use thiserror::Error;

/// The single error slot of the task panel.
///
/// Every failed remote call collapses into one of these fixed messages; the
/// underlying cause is only logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PanelError {
    #[error("Failed to fetch tasks")]
    Fetch,
    #[error("Failed to add task")]
    Create,
    #[error("Failed to update task")]
    Update,
    #[error("Failed to delete task")]
    Delete,
}
