//! notemark-server
//!
//! HTTP front end: upload, list, view, and delete notes, with graceful
//! shutdown of the listener and its collaborators.

pub mod config;
pub mod error;
pub mod middleware;
pub mod pipeline;
pub mod routes;
pub mod shutdown;
pub mod state;
