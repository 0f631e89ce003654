//! In-memory book catalog.

use rand::Rng;
use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use super::models::{Book, BookPayload, BookQuery, BookSummary};

/// Length of generated book ids
pub const ID_LENGTH: usize = 16;

/// URL-safe symbols book ids are drawn from
const ID_ALPHABET: &[u8] = b"useandom-26T198340PX75pxJACKVERYMINDBUSHWOLF_GQZbfghjklqvwyzrict";

/// Write operation whose payload failed validation; selects the wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Add,
    Update,
}

impl Mutation {
    fn failure_prefix(self) -> &'static str {
        match self {
            Mutation::Add => "Gagal menambahkan buku",
            Mutation::Update => "Gagal memperbarui buku",
        }
    }
}

/// Operation that looked up an id and did not find it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Get,
    Update,
    Delete,
}

impl Lookup {
    fn not_found_message(self) -> &'static str {
        match self {
            Lookup::Get => "Buku tidak ditemukan",
            Lookup::Update => "Gagal memperbarui buku. Id tidak ditemukan",
            Lookup::Delete => "Buku gagal dihapus. Id tidak ditemukan",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("{}. Mohon isi nama buku", .0.failure_prefix())]
    MissingName(Mutation),

    #[error("{}. readPage tidak boleh lebih besar dari pageCount", .0.failure_prefix())]
    ReadPageExceedsPageCount(Mutation),

    #[error("{}", .0.not_found_message())]
    NotFound(Lookup),

    /// The appended record could not be located afterwards
    #[error("Buku gagal ditambahkan")]
    NotStored,
}

/// Payload fields that passed validation.
struct ValidBook {
    name: String,
    payload: BookPayload,
}

impl BookPayload {
    /// Apply the catalog's two business rules, in order.
    fn validate(self, mutation: Mutation) -> Result<ValidBook, CatalogError> {
        let name = match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(CatalogError::MissingName(mutation)),
        };
        if self.read_page > self.page_count {
            return Err(CatalogError::ReadPageExceedsPageCount(mutation));
        }
        Ok(ValidBook {
            name,
            payload: self,
        })
    }
}

/// Generate a random book id.
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Current UTC time truncated to milliseconds, the precision books carry.
fn now_millis() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(now.millisecond() as u32 * 1_000_000)
        .unwrap_or(now)
}

/// Ordered in-memory collection of books.
///
/// Lookups and changes happen under one lock acquisition, so readers never
/// observe a partially applied mutation.
#[derive(Debug, Default)]
pub struct BookStore {
    books: RwLock<Vec<Book>>,
}

impl BookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.books.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.books.read().await.is_empty()
    }

    /// Validate and append a new book, returning its id.
    pub async fn add_book(&self, payload: BookPayload) -> Result<String, CatalogError> {
        let ValidBook { name, payload } = payload.validate(Mutation::Add)?;

        let id = generate_id();
        let now = now_millis();
        let book = Book {
            id: id.clone(),
            name,
            year: payload.year,
            author: payload.author,
            summary: payload.summary,
            publisher: payload.publisher,
            page_count: payload.page_count,
            read_page: payload.read_page,
            reading: payload.reading,
            finished: payload.page_count == payload.read_page,
            inserted_at: now,
            updated_at: now,
        };

        let mut books = self.books.write().await;
        books.push(book);

        if !books.iter().any(|book| book.id == id) {
            return Err(CatalogError::NotStored);
        }

        tracing::debug!(book_id = %id, total = books.len(), "book added");
        Ok(id)
    }

    /// List books matching `query`, projected to summaries.
    ///
    /// Filters run in the order name, reading, finished. Each one is applied
    /// to the whole collection and replaces the previous result, so only the
    /// last supplied filter decides the outcome.
    pub async fn list_books(&self, query: &BookQuery) -> Vec<BookSummary> {
        let books = self.books.read().await;
        let mut selected: Vec<&Book> = books.iter().collect();

        if let Some(needle) = query.name_filter() {
            selected = books
                .iter()
                .filter(|book| book.name.to_lowercase().contains(&needle))
                .collect();
        }

        if let Some(reading) = query.reading_filter() {
            selected = books.iter().filter(|book| book.reading == reading).collect();
        }

        if let Some(finished) = query.finished_filter() {
            selected = books
                .iter()
                .filter(|book| book.finished == finished)
                .collect();
        }

        selected.into_iter().map(BookSummary::from).collect()
    }

    pub async fn get_book(&self, id: &str) -> Result<Book, CatalogError> {
        self.books
            .read()
            .await
            .iter()
            .find(|book| book.id == id)
            .cloned()
            .ok_or(CatalogError::NotFound(Lookup::Get))
    }

    /// Replace every editable field of a book.
    ///
    /// The payload is validated before the lookup, so a bad payload is
    /// reported even for an unknown id. `finished` is left as it was.
    pub async fn update_book(&self, id: &str, payload: BookPayload) -> Result<(), CatalogError> {
        let ValidBook { name, payload } = payload.validate(Mutation::Update)?;

        let mut books = self.books.write().await;
        let book = books
            .iter_mut()
            .find(|book| book.id == id)
            .ok_or(CatalogError::NotFound(Lookup::Update))?;

        book.name = name;
        book.year = payload.year;
        book.author = payload.author;
        book.summary = payload.summary;
        book.publisher = payload.publisher;
        book.page_count = payload.page_count;
        book.read_page = payload.read_page;
        book.reading = payload.reading;
        book.updated_at = now_millis();

        tracing::debug!(book_id = %id, "book updated");
        Ok(())
    }

    pub async fn delete_book(&self, id: &str) -> Result<(), CatalogError> {
        let mut books = self.books.write().await;
        let index = books
            .iter()
            .position(|book| book.id == id)
            .ok_or(CatalogError::NotFound(Lookup::Delete))?;

        books.remove(index);

        tracing::debug!(book_id = %id, total = books.len(), "book deleted");
        Ok(())
    }
}
