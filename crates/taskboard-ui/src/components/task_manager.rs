use std::cell::RefCell;
use std::rc::Rc;

use chrono::{
  DateTime,
  Local,
  Utc
};
use taskboard_core::rest::RestTable;
use taskboard_core::table::TaskTable;
use taskboard_core::task_panel::{
  TaskField,
  TaskPanel
};
use taskboard_shared::{
  TaskDto,
  TaskId,
  TaskPriority
};
use wasm_bindgen_futures::spawn_local;
use web_sys::{
  HtmlInputElement,
  HtmlSelectElement,
  HtmlTextAreaElement
};
use yew::functional::UseForceUpdateHandle;
use yew::{
  Callback,
  Event,
  Html,
  InputEvent,
  MouseEvent,
  TargetCast,
  function_component,
  html,
  use_effect_with,
  use_force_update,
  use_memo,
  use_mut_ref
};

use crate::api::remote_table;

const EMPTY_TASKS: &str =
  "No tasks yet. Add a task to get \
   started!";

#[derive(Clone, Copy)]
enum Draft {
  New,
  Editing
}

/// Handle shared by every event
/// callback of the panel. Borrows of
/// the state never outlive a single
/// callback, so an awaited call can
/// finish while the user keeps
/// clicking.
#[derive(Clone)]
struct Panel {
  state:   Rc<RefCell<TaskPanel>>,
  refresh: UseForceUpdateHandle,
  table:   Rc<Result<RestTable, String>>
}

impl Panel {
  fn update(
    &self,
    change: impl FnOnce(&mut TaskPanel)
  ) {
    change(&mut *self.state.borrow_mut());
    self.refresh.force_update();
  }

  fn table(&self) -> Option<RestTable> {
    self.table.as_ref().as_ref().ok().cloned()
  }

  fn fetch(&self) {
    let Some(table) = self.table() else {
      return;
    };
    let call =
      self.state.borrow_mut().begin_fetch();
    let Some(call) = call else {
      return;
    };
    self.refresh.force_update();

    let this = self.clone();
    spawn_local(async move {
      let result = table.list_all().await;
      this.update(|panel| {
        panel.finish_fetch(call, result)
      });
    });
  }

  fn create(&self) {
    let Some(table) = self.table() else {
      return;
    };
    let call =
      self.state.borrow_mut().begin_create();
    let Some(call) = call else {
      return;
    };
    self.refresh.force_update();

    let this = self.clone();
    spawn_local(async move {
      let result = table
        .insert_one(call.row().clone())
        .await;
      this.update(|panel| {
        panel.finish_create(call, result)
      });
    });
  }

  fn save_edit(&self) {
    let Some(table) = self.table() else {
      return;
    };
    let call = self
      .state
      .borrow_mut()
      .begin_save_edit();
    let Some(call) = call else {
      return;
    };
    self.refresh.force_update();

    let this = self.clone();
    spawn_local(async move {
      let result = table
        .update_one(
          call.id(),
          call.patch().clone()
        )
        .await;
      this.update(|panel| {
        panel.finish_save_edit(call, result)
      });
    });
  }

  fn delete(&self, id: TaskId) {
    let Some(table) = self.table() else {
      return;
    };
    let call =
      self.state.borrow_mut().begin_delete(&id);
    let Some(call) = call else {
      return;
    };
    self.refresh.force_update();

    let this = self.clone();
    spawn_local(async move {
      let result =
        table.delete_one(&id).await;
      this.update(|panel| {
        panel.finish_delete(call, result)
      });
    });
  }

  fn change(
    &self,
    draft: Draft,
    field: TaskField,
    value: String
  ) {
    self.update(|panel| match draft {
      | Draft::New => {
        panel.change_new_task(field, &value)
      }
      | Draft::Editing => {
        panel.change_editing_task(
          field, &value
        )
      }
    });
  }

  fn on_title(
    &self,
    draft: Draft
  ) -> Callback<InputEvent> {
    let this = self.clone();
    Callback::from(move |e: InputEvent| {
      let value = e
        .target_unchecked_into::<HtmlInputElement>()
        .value();
      this.change(
        draft,
        TaskField::Title,
        value
      );
    })
  }

  fn on_description(
    &self,
    draft: Draft
  ) -> Callback<InputEvent> {
    let this = self.clone();
    Callback::from(move |e: InputEvent| {
      let value = e
        .target_unchecked_into::<HtmlTextAreaElement>()
        .value();
      this.change(
        draft,
        TaskField::Description,
        value
      );
    })
  }

  fn on_priority(
    &self,
    draft: Draft
  ) -> Callback<Event> {
    let this = self.clone();
    Callback::from(move |e: Event| {
      let value = e
        .target_unchecked_into::<HtmlSelectElement>()
        .value();
      this.change(
        draft,
        TaskField::Priority,
        value
      );
    })
  }
}

#[function_component(TaskManager)]
pub fn task_manager() -> Html {
  let state = use_mut_ref(TaskPanel::new);
  let refresh = use_force_update();
  let table =
    use_memo((), |_| remote_table());
  let panel = Panel {
    state,
    refresh,
    table
  };

  {
    let panel = panel.clone();
    use_effect_with((), move |_| {
      tracing::info!(
        "task manager mounted"
      );
      panel.fetch();
      || ()
    });
  }

  let config_error = panel
    .table
    .as_ref()
    .as_ref()
    .err()
    .cloned();
  let view = panel.state.borrow();
  let loading = view.is_loading()
    && config_error.is_none();
  let error = view
    .error()
    .map(|err| err.to_string());

  let on_add = {
    let panel = panel.clone();
    Callback::from(move |_: MouseEvent| {
      panel.create()
    })
  };
  let on_save = {
    let panel = panel.clone();
    Callback::from(move |_: MouseEvent| {
      panel.save_edit()
    })
  };
  let on_cancel = {
    let panel = panel.clone();
    Callback::from(move |_: MouseEvent| {
      panel.update(TaskPanel::cancel_edit)
    })
  };

  let edit_form = match view
    .editing_task()
    .filter(|_| view.is_editing())
  {
    | Some(task) => html! {
        <div class="edit-form">
            <h2>{ "Edit Task" }</h2>
            <input
                type="text"
                name="title"
                placeholder="Task Title"
                value={task.title.clone()}
                oninput={panel.on_title(Draft::Editing)}
            />
            <textarea
                name="description"
                placeholder="Task Description"
                value={task.description.clone()}
                oninput={panel.on_description(Draft::Editing)}
            />
            { priority_select(&panel, Draft::Editing, task.priority) }
            <div class="edit-buttons">
                <button onclick={on_save} disabled={loading}>
                    { if loading { "Saving..." } else { "Save Changes" } }
                </button>
                <button onclick={on_cancel}>{ "Cancel" }</button>
            </div>
        </div>
    },
    | None => html! {}
  };

  let list = if !loading
    && view.tasks().is_empty()
  {
    html! { <p>{ EMPTY_TASKS }</p> }
  } else {
    html! {
        <>
            {
                for view.tasks().iter().map(|task| {
                    task_card(&panel, task, loading)
                })
            }
        </>
    }
  };

  html! {
      <div class="task-manager">
          <h1>{ "Task Manager" }</h1>
          {
              for config_error.iter().chain(error.iter()).map(|message| html! {
                  <div class="error-message">{ message.clone() }</div>
              })
          }
          {
              if loading {
                  html! { <div class="loading-indicator">{ "Loading task manager..." }</div> }
              } else {
                  html! {}
              }
          }

          <div class="task-form">
              <h2>{ "Add New Task" }</h2>
              <input
                  type="text"
                  name="title"
                  placeholder="Task Title"
                  value={view.new_task().title.clone()}
                  oninput={panel.on_title(Draft::New)}
              />
              <textarea
                  name="description"
                  placeholder="Task Description"
                  value={view.new_task().description.clone()}
                  oninput={panel.on_description(Draft::New)}
              />
              { priority_select(&panel, Draft::New, view.new_task().priority) }
              <button onclick={on_add} disabled={loading}>
                  { if loading { "Adding..." } else { "Add Task" } }
              </button>
          </div>

          { edit_form }

          <div class="task-list">
              <h2>{ "Your Tasks" }</h2>
              {
                  if loading && !view.is_editing() {
                      html! { <p>{ "Loading tasks..." }</p> }
                  } else {
                      html! {}
                  }
              }
              { list }
          </div>
      </div>
  }
}

fn priority_select(
  panel: &Panel,
  draft: Draft,
  current: TaskPriority
) -> Html {
  html! {
      <select name="priority" onchange={panel.on_priority(draft)}>
          {
              for TaskPriority::ALL.iter().map(|priority| html! {
                  <option
                      value={priority.as_str()}
                      selected={*priority == current}
                  >
                      { priority.label() }
                  </option>
              })
          }
      </select>
  }
}

fn task_card(
  panel: &Panel,
  task: &TaskDto,
  loading: bool
) -> Html {
  let on_edit = {
    let panel = panel.clone();
    let task = task.clone();
    Callback::from(move |_: MouseEvent| {
      panel.update(|state| {
        state.begin_edit(&task)
      })
    })
  };
  let on_delete = {
    let panel = panel.clone();
    let id = task.id.clone();
    Callback::from(move |_: MouseEvent| {
      panel.delete(id.clone())
    })
  };

  html! {
      <div
          key={task.id.to_string()}
          class={format!("task-card priority-{}", task.priority)}
      >
          <h3>{ &task.title }</h3>
          <p>{ &task.description }</p>
          <div class="task-meta">
              <span class="priority">{ format!("Priority: {}", task.priority) }</span>
              <span class="date">{ format!("Created: {}", local_date(task.created_at)) }</span>
              {
                  match task.updated_at {
                      Some(updated) => html! {
                          <span class="date">{ format!("Updated: {}", local_date(updated)) }</span>
                      },
                      None => html! {}
                  }
              }
          </div>
          <div class="task-actions">
              <button onclick={on_edit}>{ "Edit" }</button>
              <button onclick={on_delete} disabled={loading}>
                  { if loading { "Deleting..." } else { "Delete" } }
              </button>
          </div>
      </div>
  }
}

fn local_date(
  at: DateTime<Utc>
) -> String {
  at.with_timezone(&Local)
    .format("%Y-%m-%d")
    .to_string()
}
