use std::cell::RefCell;
use std::rc::Rc;

use taskboard_core::book_panel::{
  BookField,
  BookPanel
};
use taskboard_shared::BookDto;
use web_sys::HtmlInputElement;
use yew::functional::UseForceUpdateHandle;
use yew::{
  Callback,
  Html,
  InputEvent,
  MouseEvent,
  SubmitEvent,
  TargetCast,
  function_component,
  html,
  use_force_update,
  use_mut_ref
};

#[derive(Clone)]
struct Shelf {
  state:   Rc<RefCell<BookPanel>>,
  refresh: UseForceUpdateHandle
}

impl Shelf {
  fn update(
    &self,
    change: impl FnOnce(&mut BookPanel)
  ) {
    change(&mut *self.state.borrow_mut());
    self.refresh.force_update();
  }

  fn on_field(
    &self,
    field: BookField
  ) -> Callback<InputEvent> {
    let this = self.clone();
    Callback::from(move |e: InputEvent| {
      let value = e
        .target_unchecked_into::<HtmlInputElement>()
        .value();
      this.update(|panel| {
        panel.change_field(field, &value)
      });
    })
  }
}

#[function_component(BookList)]
pub fn book_list() -> Html {
  let state = use_mut_ref(BookPanel::new);
  let refresh = use_force_update();
  let shelf = Shelf {
    state,
    refresh
  };
  let view = shelf.state.borrow();

  html! {
      <div class="book-list">
          <h1>{ "Book Collection" }</h1>
          <ul>
              {
                  for view.books().iter().map(|book| {
                      if view.editing_id() == Some(book.id) {
                          edit_row(&shelf, book, &view)
                      } else {
                          read_row(&shelf, book)
                      }
                  })
              }
          </ul>
      </div>
  }
}

fn read_row(
  shelf: &Shelf,
  book: &BookDto
) -> Html {
  let on_edit = {
    let shelf = shelf.clone();
    let id = book.id;
    Callback::from(move |_: MouseEvent| {
      shelf.update(|panel| {
        panel.begin_edit(id)
      })
    })
  };

  html! {
      <li key={book.id.to_string()} class="book-item">
          <h3>{ &book.title }</h3>
          <p>{ format!("Author: {}", book.author) }</p>
          <p>{ format!("Year: {}", book.year_text()) }</p>
          <button onclick={on_edit} class="edit-button">{ "Edit" }</button>
      </li>
  }
}

fn edit_row(
  shelf: &Shelf,
  book: &BookDto,
  view: &BookPanel
) -> Html {
  let draft = view.draft();
  let on_submit = {
    let shelf = shelf.clone();
    Callback::from(move |e: SubmitEvent| {
      e.prevent_default();
      shelf.update(BookPanel::submit);
    })
  };
  let on_cancel = {
    let shelf = shelf.clone();
    Callback::from(move |_: MouseEvent| {
      shelf.update(BookPanel::cancel)
    })
  };
  let year = draft
    .year
    .map(|year| year.to_string())
    .unwrap_or_default();

  html! {
      <li key={book.id.to_string()} class="book-item">
          <form onsubmit={on_submit} class="edit-form">
              <div class="form-group">
                  <label>{ "Title:" }</label>
                  <input
                      type="text"
                      name="title"
                      value={draft.title.clone()}
                      oninput={shelf.on_field(BookField::Title)}
                      required=true
                  />
              </div>
              <div class="form-group">
                  <label>{ "Author:" }</label>
                  <input
                      type="text"
                      name="author"
                      value={draft.author.clone()}
                      oninput={shelf.on_field(BookField::Author)}
                      required=true
                  />
              </div>
              <div class="form-group">
                  <label>{ "Year:" }</label>
                  <input
                      type="number"
                      name="year"
                      value={year}
                      oninput={shelf.on_field(BookField::Year)}
                      required=true
                  />
              </div>
              <div class="button-group">
                  <button type="submit" class="save-button">{ "Save" }</button>
                  <button type="button" onclick={on_cancel} class="cancel-button">
                      { "Cancel" }
                  </button>
              </div>
          </form>
      </li>
  }
}
