//! Runtally - shared running and walking log for a group.
//!
//! Activities are kept in a JSON record file that is replaced atomically
//! on every registration. Statistics are pure functions over a snapshot of
//! the records and are measured against yearly distance goals.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod store;

pub use error::{Result, TallyError};
