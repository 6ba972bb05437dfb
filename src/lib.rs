//! # Addressbook - contacts store with change notifications
//!
//! Addressbook provides:
//! - A single-table SQLite storage engine for contacts
//! - Resource locators (`content://addressbook/contacts[/<id>]`) naming either
//!   the whole collection or one contact
//! - A locator-addressed provider translating query/insert/update/delete
//!   into storage operations
//! - Change notifications so open result sets know when to re-query
//! - An `AddressBook` facade and a background loader for presentation code

pub mod contact;
pub mod locator;
pub mod storage;
pub mod observer;
pub mod cursor;
pub mod provider;
pub mod book;
pub mod loader;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use contact::{Column, Contact, ContactFields};
pub use locator::{Locator, ResourceKind};
pub use storage::ContactStore;
pub use observer::{ChangeEvent, ChangeKind, ObserverRegistry, Subscription};
pub use cursor::ContactCursor;
pub use provider::ContactProvider;
pub use book::AddressBook;

/// Result type alias for Addressbook operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Addressbook operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    #[error("Insert failed: {0}")]
    InsertFailed(String),

    #[error("Write error: {0}")]
    Write(#[source] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Background task failed: {0}")]
    Task(String),
}
