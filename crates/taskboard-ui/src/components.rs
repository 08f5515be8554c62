mod book_list;
mod task_manager;

pub use book_list::BookList;
pub use task_manager::TaskManager;
