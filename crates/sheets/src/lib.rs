//! Spreadsheet store adapter.
//!
//! One worksheet of a Google spreadsheet acts as the book table: row 1 is the
//! header, every further row is one record. [`Connection`] authenticates once per
//! process and hands out the [`BookStore`] used for every read and write.

pub mod auth;
pub mod connection;
pub mod credentials;
pub mod error;
pub mod google;
pub mod memory;
pub mod module;
pub mod row;
pub mod store;

pub use connection::Connection;
pub use error::StoreError;
pub use memory::MemoryStore;
pub use module::SheetsModule;
pub use row::Row;
pub use store::{BookStore, COLUMNS, STATUS_COLUMN, TITLE_COLUMN};
