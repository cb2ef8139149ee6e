//! Helpdesk Store: keyed order-status lookup on SQLite.

pub mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::SqliteOrderStore;
pub use types::*;
