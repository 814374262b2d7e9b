//! notemark-grammar
//!
//! Grammar checking via a LanguageTool HTTP server, either spawned and
//! supervised locally or reached at a configured URL.

pub mod client;
pub mod error;
pub mod process;
pub mod service;
pub mod wire;

use async_trait::async_trait;
use notemark_core::models::GrammarIssue;

use crate::error::GrammarError;

pub use client::LanguageToolClient;
pub use service::{GrammarConfig, GrammarService, GrammarState};

/// A grammar checker usable from concurrent request handlers.
#[async_trait]
pub trait GrammarCheck: Send + Sync {
    /// Check `text`. `None` selects the checker's default language.
    async fn check_text(
        &self,
        text: &str,
        language: Option<&str>,
    ) -> Result<Vec<GrammarIssue>, GrammarError>;

    /// Lifecycle state, for health reporting.
    fn state(&self) -> GrammarState;
}
