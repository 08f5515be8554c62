use yew::{
  Html,
  function_component,
  html
};

use crate::components::{
  BookList,
  TaskManager
};

#[function_component(App)]
pub fn app() -> Html {
  html! {
      <main class="app">
          <TaskManager />
          <BookList />
      </main>
  }
}
