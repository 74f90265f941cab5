//! Book club shelf application library
//!
//! Wires the books module onto the store connection and exposes both for the binary.

pub mod modules;
pub mod utils;

pub use modules::register_all;
