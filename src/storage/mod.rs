//! Storage Layer - SQLite-backed persistence
//!
//! System of record is one SQLite file with a single table:
//! - contacts(id, name, phone, email, street, city, state, zip)

pub mod schema;
pub mod sqlite;

pub use sqlite::ContactStore;
