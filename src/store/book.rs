//! Book list state.
//!
//! Owns the ordered list of book records plus the currently viewed record.
//! Every fetch replaces the whole list with the server's contents, newest
//! first, and derives a display timestamp per record. Mutations patch the
//! local list by id after the remote call succeeds.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::supabase::{ApiError, SupabaseClient};

const BOOKS_TABLE: &str = "books";
/// Table receiving an audit copy of every saved book.
const LOGS_TABLE: &str = "logs";

/// A stored book record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// Derived display form of `created_at`; never sent to the server.
    #[serde(skip)]
    pub formatted_created_at: String,
}

impl Book {
    fn with_formatted(mut self) -> Self {
        self.formatted_created_at = format_created_at(&self.created_at);
        self
    }
}

/// A book to be inserted. The id and creation time are assigned remotely.
#[derive(Debug, Clone, Serialize)]
pub struct NewBook {
    pub title: String,
    pub text: String,
}

/// Update payload carrying the only two mutable fields.
#[derive(Debug, Serialize)]
struct BookPatch<'a> {
    title: &'a str,
    text: &'a str,
}

/// `YYYY.MM.DD.HH:MM`, in UTC.
fn format_created_at(ts: &DateTime<Utc>) -> String {
    ts.format("%Y.%m.%d.%H:%M").to_string()
}

struct BookStateInner {
    books: Vec<Book>,
    current: Option<Book>,
    loading: bool,
    last_error: Option<String>,
}

/// Book list container.
#[derive(Clone)]
pub struct BookStore {
    client: SupabaseClient,
    inner: Arc<RwLock<BookStateInner>>,
}

impl BookStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self {
            client,
            inner: Arc::new(RwLock::new(BookStateInner {
                books: Vec::new(),
                current: None,
                loading: false,
                last_error: None,
            })),
        }
    }

    /// Snapshot of the book list, newest first.
    pub fn books(&self) -> Vec<Book> {
        self.inner.read().books.clone()
    }

    /// Snapshot of the currently viewed book.
    pub fn current_book(&self) -> Option<Book> {
        self.inner.read().current.clone()
    }

    /// Whether an operation is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.read().loading
    }

    /// Message of the last failed operation, if the most recent one failed.
    pub fn last_error(&self) -> Option<String> {
        self.inner.read().last_error.clone()
    }

    /// Replace the local list with the server's current table contents,
    /// ordered newest first.
    pub async fn fetch_books(&self) -> Result<(), ApiError> {
        self.begin();

        let result: Result<Vec<Book>, ApiError> = self
            .client
            .from(BOOKS_TABLE)
            .select("*")
            .order("created_at", true)
            .fetch()
            .await;

        match result {
            Ok(rows) => {
                let mut state = self.inner.write();
                state.books = rows.into_iter().map(Book::with_formatted).collect();
                state.loading = false;
                Ok(())
            }
            Err(e) => Err(self.fail("Error fetching books", e)),
        }
    }

    /// Fetch exactly one book by id and make it the current selection.
    ///
    /// Zero or multiple matching rows is a backend error.
    pub async fn fetch_book_by_id(&self, id: i64) -> Result<Book, ApiError> {
        self.begin();

        let result: Result<Book, ApiError> = self
            .client
            .from(BOOKS_TABLE)
            .select("*")
            .eq("id", id)
            .single()
            .fetch()
            .await;

        match result {
            Ok(row) => {
                let book = row.with_formatted();
                let mut state = self.inner.write();
                state.current = Some(book.clone());
                state.loading = false;
                Ok(book)
            }
            Err(e) => Err(self.fail("Error fetching book", e)),
        }
    }

    /// Insert a new book and prepend the stored row locally.
    ///
    /// The local list is not re-fetched, so its order may diverge from the
    /// server's if creation timestamps tie. An audit copy goes to the logs
    /// table, best-effort.
    pub async fn save_book(&self, new_book: NewBook) -> Result<Book, ApiError> {
        self.begin();

        let result: Result<Vec<Book>, ApiError> =
            self.client.from(BOOKS_TABLE).insert(&new_book).await;

        if let Err(e) = self.client.from(LOGS_TABLE).insert_only(&new_book).await {
            tracing::warn!(error = %e, "Failed to write book audit log");
        }

        match result {
            Ok(rows) => match rows.into_iter().next() {
                Some(row) => {
                    let book = row.with_formatted();
                    let mut state = self.inner.write();
                    state.books.insert(0, book.clone());
                    state.loading = false;
                    Ok(book)
                }
                None => {
                    let e = ApiError::Decode("insert returned no rows".to_string());
                    Err(self.fail("Error saving book", e))
                }
            },
            Err(e) => Err(self.fail("Error saving book", e)),
        }
    }

    /// Patch the title and text of one book, remotely then locally.
    ///
    /// If the id is not in the local list the local patch is a no-op.
    pub async fn update_book(&self, id: i64, title: &str, text: &str) -> Result<(), ApiError> {
        self.begin();

        let result: Result<Vec<Book>, ApiError> = self
            .client
            .from(BOOKS_TABLE)
            .eq("id", id)
            .update(&BookPatch { title, text })
            .await;

        match result {
            Ok(rows) => {
                let mut state = self.inner.write();
                if let Some(row) = rows.into_iter().next() {
                    if let Some(entry) = state.books.iter_mut().find(|b| b.id == id) {
                        *entry = row.with_formatted();
                    }
                }
                state.loading = false;
                Ok(())
            }
            Err(e) => Err(self.fail("Error updating book", e)),
        }
    }

    /// Delete one book remotely, then drop it from the local list.
    pub async fn delete_book(&self, id: i64) -> Result<(), ApiError> {
        self.begin();

        match self.client.from(BOOKS_TABLE).eq("id", id).delete().await {
            Ok(()) => {
                let mut state = self.inner.write();
                state.books.retain(|b| b.id != id);
                state.loading = false;
                Ok(())
            }
            Err(e) => Err(self.fail("Error deleting book", e)),
        }
    }

    fn begin(&self) {
        let mut state = self.inner.write();
        state.loading = true;
        state.last_error = None;
    }

    fn fail(&self, context: &str, error: ApiError) -> ApiError {
        tracing::error!(error = %error, "{context}");
        let mut state = self.inner.write();
        state.last_error = Some(error.to_string());
        state.loading = false;
        error
    }
}
