use std::num::NonZeroU8;

use serde::{Deserialize, Serialize};
use time::format_description::well_known::{iso8601, Iso8601};
use time::OffsetDateTime;

const TIMESTAMP_CONFIG: iso8601::EncodedConfig = iso8601::Config::DEFAULT
    .set_time_precision(iso8601::TimePrecision::Second {
        decimal_digits: NonZeroU8::new(3),
    })
    .encode();
const TIMESTAMP_FORMAT: Iso8601<TIMESTAMP_CONFIG> = Iso8601::<TIMESTAMP_CONFIG>;

// UTC timestamps with exactly three fractional digits: `2021-03-04T09:11:44.598Z`
time::serde::format_description!(timestamp, OffsetDateTime, TIMESTAMP_FORMAT);

/// A book record held by the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Opaque 16-character identifier, fixed at creation
    pub id: String,
    pub name: String,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    pub page_count: u32,
    pub read_page: u32,
    pub reading: bool,
    /// `read_page == page_count` as of creation; updates leave it alone
    pub finished: bool,
    #[serde(with = "timestamp")]
    pub inserted_at: OffsetDateTime,
    #[serde(with = "timestamp")]
    pub updated_at: OffsetDateTime,
}

/// Request body for creating or replacing a book.
///
/// `name` stays optional on the wire so a missing name surfaces as a
/// validation failure instead of a deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BookPayload {
    pub name: Option<String>,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    pub page_count: u32,
    pub read_page: u32,
    pub reading: bool,
}

/// List projection of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    pub publisher: String,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            name: book.name.clone(),
            publisher: book.publisher.clone(),
        }
    }
}

/// Query-string filters accepted by the list endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookQuery {
    pub name: Option<String>,
    /// `"1"` selects books being read, any other value the rest
    pub reading: Option<String>,
    /// `"1"` selects finished books, any other value the rest
    pub finished: Option<String>,
}

impl BookQuery {
    /// Case-folded name needle; an empty `name` counts as absent.
    pub fn name_filter(&self) -> Option<String> {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(str::to_lowercase)
    }

    pub fn reading_filter(&self) -> Option<bool> {
        self.reading.as_deref().map(flag_is_set)
    }

    pub fn finished_filter(&self) -> Option<bool> {
        self.finished.as_deref().map(flag_is_set)
    }
}

fn flag_is_set(value: &str) -> bool {
    value == "1"
}

/// `data` of a successful create
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBook {
    pub book_id: String,
}

/// `data` of a successful list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookList {
    pub books: Vec<BookSummary>,
}

/// `data` of a successful fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDetail {
    pub book: Book,
}
