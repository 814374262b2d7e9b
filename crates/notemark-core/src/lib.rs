//! notemark-core
//!
//! Pure domain types for uploaded notes and their grammar issues.
//! No database or HTTP dependency; the shared vocabulary of the other crates.

pub mod error;
pub mod models;
