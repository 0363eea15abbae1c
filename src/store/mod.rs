//! In-memory state containers.
//!
//! Each store wraps the remote client and owns one slice of application
//! state: identity (`AuthStore`), the book list (`BookStore`) and the daily
//! visit record (`VisitorStore`). Stores are explicit injected instances,
//! not singletons; clones share state. A failed remote call never disturbs
//! the last-known-good state beyond the loading/error flags.

mod auth;
mod book;
mod visitor;

pub use auth::{AuthStore, UserProfile};
pub use book::{Book, BookStore, NewBook};
pub use visitor::{Visit, VisitorStore};
