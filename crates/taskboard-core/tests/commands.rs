use taskboard_core::cli::{BooksCommand, TasksCommand};
use taskboard_core::commands::{run_books, run_tasks};
use taskboard_core::memory::MemoryTable;
use taskboard_core::task_panel::FlightPolicy;
use taskboard_shared::{TaskId, TaskPriority};

#[tokio::test]
async fn add_then_edit_then_delete_through_commands() {
    let table = MemoryTable::new();

    let panel = run_tasks(
        &table,
        FlightPolicy::Unguarded,
        TasksCommand::Add {
            title: "Buy milk".to_string(),
            description: String::new(),
            priority: TaskPriority::Low,
        },
    )
    .await
    .expect("add succeeds");
    assert_eq!(panel.tasks().len(), 1);
    let id = panel.tasks()[0].id.clone();

    let panel = run_tasks(
        &table,
        FlightPolicy::Unguarded,
        TasksCommand::Edit {
            id: id.clone(),
            title: None,
            description: Some("two litres".to_string()),
            priority: Some(TaskPriority::High),
        },
    )
    .await
    .expect("edit succeeds");
    assert_eq!(panel.tasks()[0].title, "Buy milk");
    assert_eq!(panel.tasks()[0].description, "two litres");
    assert_eq!(panel.tasks()[0].priority, TaskPriority::High);

    let panel = run_tasks(&table, FlightPolicy::Unguarded, TasksCommand::Delete { id })
        .await
        .expect("delete succeeds");
    assert!(panel.tasks().is_empty());
    assert!(table.rows().is_empty());
}

#[tokio::test]
async fn remote_failure_surfaces_fixed_message() {
    let table = MemoryTable::new();
    table.fail_all(true);

    let err = run_tasks(&table, FlightPolicy::Unguarded, TasksCommand::List)
        .await
        .expect_err("list fails");
    assert_eq!(err.to_string(), "Failed to fetch tasks");
}

#[tokio::test]
async fn unknown_task_id_is_reported() {
    let table = MemoryTable::new();
    let err = run_tasks(
        &table,
        FlightPolicy::Unguarded,
        TasksCommand::Delete {
            id: TaskId::from(404_i64),
        },
    )
    .await
    .expect_err("nothing to delete");
    assert!(err.to_string().contains("not found"));
    assert_eq!(table.calls().delete, 0);
}

#[test]
fn book_edit_applies_to_session_seed() {
    let books = run_books(BooksCommand::Edit {
        id: 2,
        title: None,
        author: None,
        year: Some("abc".to_string()),
    })
    .expect("edit succeeds");

    assert_eq!(books[1].year, None);
    assert_eq!(books[1].title, "1984");
    assert!(run_books(BooksCommand::Edit {
        id: 9,
        title: None,
        author: None,
        year: None,
    })
    .is_err());
}
