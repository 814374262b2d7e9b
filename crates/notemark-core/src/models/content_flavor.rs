use serde::{Deserialize, Serialize};

/// Which representation of a note a detail request asks for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFlavor {
    /// The uploaded text, verbatim.
    Markdown,
    /// The stored display markup, verbatim.
    Html,
    /// A rendered detail fragment.
    #[default]
    Details,
}

impl ContentFlavor {
    /// Map the `type` query value. Absent or unrecognized values select `Details`.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some("markdown") => Self::Markdown,
            Some("html") => Self::Html,
            _ => Self::Details,
        }
    }
}
