use taskboard_shared::BookDto;
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Title,
    Author,
    Year,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
}

/// The local book collection. Nothing leaves process memory; a fresh panel
/// always starts from [`seed_books`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPanel {
    books: Vec<BookDto>,
    editing_id: Option<u32>,
    draft: BookDraft,
}

impl Default for BookPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl BookPanel {
    pub fn new() -> Self {
        Self {
            books: seed_books(),
            editing_id: None,
            draft: BookDraft::default(),
        }
    }

    pub fn books(&self) -> &[BookDto] {
        &self.books
    }

    pub fn editing_id(&self) -> Option<u32> {
        self.editing_id
    }

    pub fn draft(&self) -> &BookDraft {
        &self.draft
    }

    #[instrument(skip(self))]
    pub fn begin_edit(&mut self, id: u32) {
        let Some(book) = self.books.iter().find(|book| book.id == id) else {
            warn!(id, "book not listed; cannot edit");
            return;
        };
        self.draft = BookDraft {
            title: book.title.clone(),
            author: book.author.clone(),
            year: book.year,
        };
        self.editing_id = Some(id);
    }

    pub fn change_field(&mut self, field: BookField, value: &str) {
        match field {
            BookField::Title => self.draft.title = value.to_string(),
            BookField::Author => self.draft.author = value.to_string(),
            BookField::Year => {
                self.draft.year = parse_year(value);
                if self.draft.year.is_none() {
                    debug!(input = value, "year did not parse; left empty");
                }
            }
        }
    }

    /// Writes the draft onto the book being edited. The draft is taken as is.
    #[instrument(skip(self))]
    pub fn submit(&mut self) {
        let Some(id) = self.editing_id.take() else {
            debug!("no book is being edited; submit ignored");
            return;
        };
        let draft = std::mem::take(&mut self.draft);
        if let Some(book) = self.books.iter_mut().find(|book| book.id == id) {
            book.title = draft.title;
            book.author = draft.author;
            book.year = draft.year;
        }
    }

    pub fn cancel(&mut self) {
        self.editing_id = None;
        self.draft = BookDraft::default();
    }
}

pub fn seed_books() -> Vec<BookDto> {
    [
        (1, "To Kill a Mockingbird", "Harper Lee", 1960),
        (2, "1984", "George Orwell", 1949),
        (3, "The Great Gatsby", "F. Scott Fitzgerald", 1925),
        (4, "Pride and Prejudice", "Jane Austen", 1813),
        (5, "The Catcher in the Rye", "J.D. Salinger", 1951),
    ]
    .into_iter()
    .map(|(id, title, author, year)| BookDto {
        id,
        title: title.to_string(),
        author: author.to_string(),
        year: Some(year),
    })
    .collect()
}

/// Reads the leading integer of `input`: leading whitespace and one sign are
/// allowed, trailing junk is dropped. No digits, overflow, and zero all give
/// the empty year.
///
/// Years are `i32`, so a value a browser number field would still accept
/// past `i32::MAX` (or below `i32::MIN`) is dropped rather than kept.
pub fn parse_year(input: &str) -> Option<i32> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits_end = rest
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];
    if digits.is_empty() {
        return None;
    }

    let magnitude: i64 = digits.parse().ok()?;
    let value = if negative { -magnitude } else { magnitude };
    match i32::try_from(value) {
        Ok(0) | Err(_) => None,
        Ok(year) => Some(year),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_integer_semantics() {
        assert_eq!(parse_year("1984"), Some(1984));
        assert_eq!(parse_year("  1851 "), Some(1851));
        assert_eq!(parse_year("1999abc"), Some(1999));
        assert_eq!(parse_year("-44"), Some(-44));
        assert_eq!(parse_year("+12"), Some(12));
        assert_eq!(parse_year("abc"), None);
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("-"), None);
        assert_eq!(parse_year("12.5"), Some(12));
        assert_eq!(parse_year("99999999999999999999"), None);
        assert_eq!(parse_year("2147483647"), Some(i32::MAX));
        assert_eq!(parse_year("2147483648"), None);
    }

    #[test]
    fn zero_year_is_empty() {
        assert_eq!(parse_year("0"), None);
        assert_eq!(parse_year("000"), None);
    }

    #[test]
    fn seed_has_five_books_in_order() {
        let ids: Vec<u32> = seed_books().iter().map(|book| book.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn unknown_id_does_not_enter_edit_mode() {
        let mut panel = BookPanel::new();
        panel.begin_edit(42);
        assert_eq!(panel.editing_id(), None);
    }

    #[test]
    fn submit_without_edit_changes_nothing() {
        let mut panel = BookPanel::new();
        panel.submit();
        assert_eq!(panel.books(), seed_books().as_slice());
    }
}
