use std::io::{self, IsTerminal, Write};

use chrono::{DateTime, Local, Utc};
use taskboard_shared::{BookDto, TaskDto, TaskPriority};
use unicode_width::UnicodeWidthStr;

use crate::config::Config;

pub const EMPTY_TASKS: &str = "No tasks yet. Add a task to get started!";

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            color: cfg.color() && io::stdout().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip_all, fields(count = tasks.len()))]
    pub fn print_tasks(&self, tasks: &[TaskDto]) -> anyhow::Result<()> {
        self.write_tasks(io::stdout().lock(), tasks)
    }

    pub fn write_tasks<W: Write>(&self, mut out: W, tasks: &[TaskDto]) -> anyhow::Result<()> {
        if tasks.is_empty() {
            writeln!(out, "{EMPTY_TASKS}")?;
            return Ok(());
        }

        let headers = ["ID", "Priority", "Title", "Description", "Created", "Updated"]
            .map(str::to_string)
            .to_vec();

        let rows = tasks
            .iter()
            .map(|task| {
                vec![
                    task.id.to_string(),
                    self.paint_priority(task.priority),
                    task.title.clone(),
                    task.description.clone(),
                    local_date(task.created_at),
                    task.updated_at.map(local_date).unwrap_or_default(),
                ]
            })
            .collect();

        write_table(&mut out, headers, rows)
    }

    #[tracing::instrument(skip_all, fields(count = books.len()))]
    pub fn print_books(&self, books: &[BookDto]) -> anyhow::Result<()> {
        self.write_books(io::stdout().lock(), books)
    }

    pub fn write_books<W: Write>(&self, mut out: W, books: &[BookDto]) -> anyhow::Result<()> {
        let headers = ["ID", "Title", "Author", "Year"]
            .map(str::to_string)
            .to_vec();

        let rows = books
            .iter()
            .map(|book| {
                vec![
                    book.id.to_string(),
                    book.title.clone(),
                    book.author.clone(),
                    book.year_text(),
                ]
            })
            .collect();

        write_table(&mut out, headers, rows)
    }

    fn paint_priority(&self, priority: TaskPriority) -> String {
        let code = match priority {
            TaskPriority::Low => "32",
            TaskPriority::Medium => "33",
            TaskPriority::High => "31",
        };
        self.paint(priority.as_str(), code)
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn local_date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

fn write_table<W: Write>(
    mut writer: W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let mut widths: Vec<usize> = headers
        .iter()
        .map(|header| UnicodeWidthStr::width(header.as_str()))
        .collect();

    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for (header, &width) in headers.iter().zip(&widths) {
        write!(writer, "{header:width$} ")?;
    }
    writeln!(writer)?;

    for &width in &widths {
        write!(writer, "{:-<width$} ", "")?;
    }
    writeln!(writer)?;

    for row in rows {
        for (cell, width) in row.iter().zip(&widths) {
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = width.saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book_panel::seed_books;

    #[test]
    fn empty_task_list_prints_hint() {
        let mut out = Vec::new();
        Renderer::plain()
            .write_tasks(&mut out, &[])
            .expect("write");
        assert_eq!(String::from_utf8_lossy(&out).trim_end(), EMPTY_TASKS);
    }

    #[test]
    fn book_table_aligns_columns() {
        let mut books = seed_books();
        books[1].year = None;

        let mut out = Vec::new();
        Renderer::plain()
            .write_books(&mut out, &books)
            .expect("write");
        let text = String::from_utf8_lossy(&out);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 2 + books.len());
        assert!(lines[0].starts_with("ID Title"));
        assert!(lines[3].contains("1984"));
        assert!(lines[3].trim_end().ends_with("George Orwell"));
    }

    #[test]
    fn ansi_codes_do_not_count_toward_width() {
        assert_eq!(strip_ansi("\x1b[31mhigh\x1b[0m"), "high");
    }
}
