//! Advanced search query-builder for the inventory database.
//!
//! A search is a list of cards ANDed together; each card is a list of rows
//! ANDed together; each row matches any of its selected fields against one
//! lookup and value, optionally negated. Searches are validated, then
//! flattened into `f`/`l`/`q`/`n` request parameters for the server.

pub mod catalog;
pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod query;
pub mod submit;

pub use error::{QueryError, Result};
