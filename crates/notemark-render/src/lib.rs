//! notemark-render
//!
//! Markdown → HTML conversion and the tera views served to the browser.

pub mod error;
pub mod markdown;
pub mod views;

pub use markdown::to_display_markup;
pub use views::Views;
