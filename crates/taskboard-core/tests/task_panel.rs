use taskboard_core::error::PanelError;
use taskboard_core::memory::MemoryTable;
use taskboard_core::table::TaskTable;
use taskboard_core::task_panel::{FlightPolicy, TaskField, TaskPanel};
use taskboard_shared::{TaskDto, TaskPriority};

async fn mounted(table: &MemoryTable) -> TaskPanel {
    let mut panel = TaskPanel::new();
    panel.load(table).await;
    panel
}

async fn add(panel: &mut TaskPanel, table: &MemoryTable, title: &str, priority: &str) {
    panel.change_new_task(TaskField::Title, title);
    panel.change_new_task(TaskField::Priority, priority);
    panel.create(table).await;
}

fn titles(tasks: &[TaskDto]) -> Vec<&str> {
    tasks.iter().map(|task| task.title.as_str()).collect()
}

#[tokio::test]
async fn creates_are_listed_newest_first() {
    let table = MemoryTable::new();
    let mut panel = mounted(&table).await;
    assert!(panel.tasks().is_empty());
    assert!(!panel.is_loading());

    add(&mut panel, &table, "Buy milk", "low").await;
    assert_eq!(panel.tasks().len(), 1);
    assert_eq!(panel.tasks()[0].title, "Buy milk");
    assert_eq!(panel.tasks()[0].priority, TaskPriority::Low);

    add(&mut panel, &table, "Call dentist", "high").await;
    assert_eq!(titles(panel.tasks()), vec!["Call dentist", "Buy milk"]);
    assert_eq!(panel.tasks()[0].priority, TaskPriority::High);

    for n in 0..5 {
        let title = format!("chore {n}");
        add(&mut panel, &table, &title, "medium").await;
        assert_eq!(panel.tasks()[0].title, title);
    }
    assert_eq!(panel.tasks().len(), 7);
    assert!(panel.error().is_none());
}

#[tokio::test]
async fn successful_create_resets_draft() {
    let table = MemoryTable::new();
    let mut panel = mounted(&table).await;
    panel.change_new_task(TaskField::Title, "Pay rent");
    panel.change_new_task(TaskField::Description, "before the 1st");
    panel.change_new_task(TaskField::Priority, "high");
    panel.create(&table).await;

    assert_eq!(panel.new_task().title, "");
    assert_eq!(panel.new_task().description, "");
    assert_eq!(panel.new_task().priority, TaskPriority::Medium);
    assert_eq!(panel.tasks()[0].description, "before the 1st");
}

#[tokio::test]
async fn blank_titles_issue_no_calls() {
    let table = MemoryTable::new();
    let mut panel = mounted(&table).await;
    add(&mut panel, &table, "Existing", "medium").await;
    let before = panel.tasks().to_vec();
    let calls = table.calls();

    panel.change_new_task(TaskField::Title, "   ");
    panel.create(&table).await;

    let id = before[0].id.clone();
    assert!(panel.begin_edit_by_id(&id));
    panel.change_editing_task(TaskField::Title, "\t\n");
    panel.save_edit(&table).await;

    assert_eq!(table.calls(), calls);
    assert_eq!(panel.tasks(), before.as_slice());
    assert_eq!(panel.new_task().title, "   ");
    assert!(panel.is_editing());
}

#[tokio::test]
async fn delete_removes_only_that_task() {
    let table = MemoryTable::new();
    let mut panel = mounted(&table).await;
    for title in ["a", "b", "c", "d"] {
        add(&mut panel, &table, title, "medium").await;
    }
    let doomed = panel.tasks()[1].id.clone();

    panel.delete(&table, &doomed).await;

    assert!(panel.tasks().iter().all(|task| task.id != doomed));
    assert_eq!(titles(panel.tasks()), vec!["d", "b", "a"]);
    assert_eq!(table.rows().len(), 3);
}

#[tokio::test]
async fn save_edit_rewrites_only_the_edited_task() {
    let table = MemoryTable::new();
    let mut panel = mounted(&table).await;
    for title in ["first", "second", "third"] {
        add(&mut panel, &table, title, "low").await;
    }
    let before = panel.tasks().to_vec();
    let target = before[1].clone();

    panel.begin_edit(&target);
    panel.change_editing_task(TaskField::Title, "A");
    panel.change_editing_task(TaskField::Description, "B");
    panel.change_editing_task(TaskField::Priority, "high");
    panel.save_edit(&table).await;

    assert!(!panel.is_editing());
    assert!(panel.editing_task().is_none());
    assert!(panel.error().is_none());

    let after = panel.tasks();
    assert_eq!(after.len(), before.len());
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2]);

    let edited = &after[1];
    assert_eq!(edited.id, target.id);
    assert_eq!(edited.title, "A");
    assert_eq!(edited.description, "B");
    assert_eq!(edited.priority, TaskPriority::High);
    assert_eq!(edited.created_at, target.created_at);
    assert!(edited.updated_at.is_some());

    let stored = table
        .rows()
        .into_iter()
        .find(|row| row.id == target.id)
        .expect("row still stored");
    assert_eq!(stored.title, "A");
    assert!(stored.updated_at.is_some());
}

#[tokio::test]
async fn cancel_edit_never_calls_the_table() {
    let table = MemoryTable::new();
    let mut panel = mounted(&table).await;
    add(&mut panel, &table, "Walk dog", "medium").await;
    let calls = table.calls();
    let listed = panel.tasks()[0].clone();

    panel.begin_edit(&listed);
    panel.change_editing_task(TaskField::Title, "Walk cat");
    panel.cancel_edit();

    assert_eq!(table.calls(), calls);
    assert!(!panel.is_editing());
    assert!(panel.editing_task().is_none());
    assert_eq!(panel.tasks()[0], listed);
}

#[tokio::test]
async fn failed_fetch_keeps_list_and_sets_message() {
    let table = MemoryTable::new();
    table.fail_next(1);
    let panel = mounted(&table).await;

    assert!(panel.tasks().is_empty());
    assert_eq!(panel.error(), Some(PanelError::Fetch));
    assert_eq!(
        panel.error().map(|err| err.to_string()).as_deref(),
        Some("Failed to fetch tasks")
    );
    assert!(!panel.is_loading());
}

#[tokio::test]
async fn null_list_payload_reads_as_empty() {
    let table = MemoryTable::new();
    let mut panel = mounted(&table).await;
    add(&mut panel, &table, "Stale", "medium").await;

    table.answer_null_list(true);
    panel.load(&table).await;

    assert!(panel.tasks().is_empty());
    assert!(panel.error().is_none());
}

#[tokio::test]
async fn failed_calls_leave_state_and_clear_loading() {
    let table = MemoryTable::new();
    let mut panel = mounted(&table).await;
    add(&mut panel, &table, "Keep me", "medium").await;
    let before = panel.tasks().to_vec();

    table.fail_all(true);

    panel.change_new_task(TaskField::Title, "Lost call");
    panel.create(&table).await;
    assert_eq!(panel.error(), Some(PanelError::Create));
    assert_eq!(panel.new_task().title, "Lost call");
    assert_eq!(panel.tasks(), before.as_slice());
    assert!(!panel.is_loading());

    panel.begin_edit(&before[0]);
    panel.change_editing_task(TaskField::Title, "Renamed");
    panel.save_edit(&table).await;
    assert_eq!(panel.error(), Some(PanelError::Update));
    assert!(panel.is_editing());
    assert_eq!(panel.tasks(), before.as_slice());
    assert!(!panel.is_loading());

    panel.delete(&table, &before[0].id).await;
    assert_eq!(panel.error(), Some(PanelError::Delete));
    assert_eq!(panel.tasks(), before.as_slice());
    assert!(!panel.is_loading());

    table.fail_all(false);
    panel.create(&table).await;
    assert_eq!(panel.tasks()[0].title, "Lost call");
    assert_eq!(
        panel.error(),
        Some(PanelError::Delete),
        "the slot holds the last error until another one replaces it"
    );
}

#[tokio::test]
async fn loading_is_raised_while_a_call_is_out() {
    let table = MemoryTable::new();
    let mut panel = mounted(&table).await;
    assert!(!panel.is_loading());

    panel.change_new_task(TaskField::Title, "Slow insert");
    let call = panel.begin_create().expect("call issued");
    assert!(panel.is_loading());

    let result = table.insert_one(call.row().clone()).await;
    panel.finish_create(call, result);
    assert!(!panel.is_loading());
}

#[tokio::test]
async fn overlapping_creates_are_last_write_wins() {
    let table = MemoryTable::new();
    let mut panel = mounted(&table).await;

    panel.change_new_task(TaskField::Title, "first click");
    let first = panel.begin_create().expect("first call issued");
    panel.change_new_task(TaskField::Title, "second click");
    let second = panel.begin_create().expect("second call issued");

    let second_row = table.insert_one(second.row().clone()).await;
    let first_row = table.insert_one(first.row().clone()).await;

    panel.finish_create(second, second_row);
    panel.finish_create(first, first_row);

    assert_eq!(table.rows().len(), 2, "both rows reached the store");
    assert_eq!(
        titles(panel.tasks()),
        vec!["first click"],
        "the later response overwrote the earlier one"
    );

    panel.load(&table).await;
    assert_eq!(panel.tasks().len(), 2);
}

#[tokio::test]
async fn single_flight_rejects_duplicates_and_keeps_both_changes() {
    let table = MemoryTable::new();
    let mut panel = TaskPanel::with_policy(FlightPolicy::SingleFlight);
    panel.load(&table).await;
    for title in ["one", "two", "three"] {
        add(&mut panel, &table, title, "medium").await;
    }

    panel.change_new_task(TaskField::Title, "double click");
    let create = panel.begin_create().expect("first create issued");
    assert!(panel.begin_create().is_none(), "second create rejected");
    let row = table.insert_one(create.row().clone()).await;

    let edit_target = panel.tasks()[0].clone();
    let delete_target = panel.tasks()[2].id.clone();

    panel.begin_edit(&edit_target);
    panel.change_editing_task(TaskField::Title, "three, edited");
    let update = panel.begin_save_edit().expect("update issued");
    let delete = panel.begin_delete(&delete_target).expect("delete issued");
    assert!(panel.begin_delete(&delete_target).is_none());

    let update_result = table.update_one(update.id(), update.patch().clone()).await;
    let delete_result = table.delete_one(delete.id()).await;

    panel.finish_delete(delete, delete_result);
    panel.finish_save_edit(update, update_result);
    panel.finish_create(create, row);

    assert_eq!(
        titles(panel.tasks()),
        vec!["double click", "three, edited", "two"]
    );
    assert_eq!(table.rows().len(), 3, "three seeded, one added, one deleted");
    assert!(!panel.is_loading());
}
