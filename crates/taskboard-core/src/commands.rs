use anyhow::{anyhow, bail};
use taskboard_shared::BookDto;
use tracing::{info, instrument};

use crate::book_panel::{BookField, BookPanel};
use crate::cli::{BooksCommand, TasksCommand};
use crate::table::TaskTable;
use crate::task_panel::{FlightPolicy, TaskField, TaskPanel};

/// Mounts a task panel against `table`, performs `command` through it and
/// returns the panel so the caller can render it. A set error slot becomes
/// the returned error.
#[instrument(skip(table))]
pub async fn run_tasks<T: TaskTable>(
    table: &T,
    policy: FlightPolicy,
    command: TasksCommand,
) -> anyhow::Result<TaskPanel> {
    let mut panel = TaskPanel::with_policy(policy);
    panel.load(table).await;
    check(&panel)?;

    match command {
        TasksCommand::List => {}
        TasksCommand::Add {
            title,
            description,
            priority,
        } => {
            if title.trim().is_empty() {
                bail!("task title cannot be blank");
            }
            panel.change_new_task(TaskField::Title, &title);
            panel.change_new_task(TaskField::Description, &description);
            panel.change_new_task(TaskField::Priority, priority.as_str());
            panel.create(table).await;
        }
        TasksCommand::Edit {
            id,
            title,
            description,
            priority,
        } => {
            if !panel.begin_edit_by_id(&id) {
                bail!("task {id} not found");
            }
            if let Some(title) = title {
                if title.trim().is_empty() {
                    panel.cancel_edit();
                    bail!("task title cannot be blank");
                }
                panel.change_editing_task(TaskField::Title, &title);
            }
            if let Some(description) = description {
                panel.change_editing_task(TaskField::Description, &description);
            }
            if let Some(priority) = priority {
                panel.change_editing_task(TaskField::Priority, priority.as_str());
            }
            panel.save_edit(table).await;
        }
        TasksCommand::Delete { id } => {
            if !panel.tasks().iter().any(|task| task.id == id) {
                bail!("task {id} not found");
            }
            panel.delete(table, &id).await;
        }
    }

    check(&panel)?;
    info!(count = panel.tasks().len(), "task command finished");
    Ok(panel)
}

pub fn run_books(command: BooksCommand) -> anyhow::Result<Vec<BookDto>> {
    let mut panel = BookPanel::new();

    if let BooksCommand::Edit {
        id,
        title,
        author,
        year,
    } = command
    {
        panel.begin_edit(id);
        if panel.editing_id() != Some(id) {
            return Err(anyhow!("book {id} not found"));
        }
        if let Some(title) = title {
            panel.change_field(BookField::Title, &title);
        }
        if let Some(author) = author {
            panel.change_field(BookField::Author, &author);
        }
        if let Some(year) = year {
            panel.change_field(BookField::Year, &year);
        }
        panel.submit();
    }

    Ok(panel.books().to_vec())
}

fn check(panel: &TaskPanel) -> anyhow::Result<()> {
    match panel.error() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}
