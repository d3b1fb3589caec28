//! Memfog - personal command-line memory recall
//!
//! Stores short titled notes in a local SQLite database and finds them again
//! by fuzzy keyword matching. The recall path is:
//!
//! keywords → [`memory::normalize`] → [`memory::Matcher::rank`] →
//! [`selector::Selector::select`] → display / edit / delete.

pub mod config;
pub mod editor;
pub mod error;
pub mod memory;
pub mod selector;
pub mod session;
pub mod store;
pub mod terminal;
pub mod transfer;

pub use config::Config;
pub use error::{MemfogError, Result};
pub use session::Memfog;
