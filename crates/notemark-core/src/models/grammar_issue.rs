use serde::{Deserialize, Serialize};

/// One problem span reported by the grammar checker.
///
/// `offset` and `length` are character positions within the checked text.
/// Suggestions keep the order the checker reported them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarIssue {
    pub message: String,
    pub context: String,
    pub offset: usize,
    pub length: usize,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl GrammarIssue {
    /// An issue standing in for a failed check, carrying only the failure text.
    pub fn synthetic(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: String::new(),
            offset: 0,
            length: 0,
            suggestions: Vec::new(),
        }
    }
}
