//! LanguageTool `/v2/check` response schema.
//!
//! Every field defaults, so responses from older or trimmed-down servers
//! still decode as long as the shapes that are present match.

use serde::Deserialize;

use notemark_core::models::GrammarIssue;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckResponse {
    pub software: Software,
    pub warnings: Warnings,
    pub language: Language,
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Software {
    pub name: String,
    pub version: String,
    pub build_date: String,
    pub api_version: u32,
    pub premium: bool,
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Warnings {
    pub incomplete_results: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Language {
    pub name: String,
    pub code: String,
    pub detected_language: DetectedLanguage,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DetectedLanguage {
    pub name: String,
    pub code: String,
    pub confidence: f64,
    pub source: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Match {
    pub message: String,
    pub short_message: String,
    pub replacements: Vec<Replacement>,
    pub offset: usize,
    pub length: usize,
    pub context: MatchContext,
    pub sentence: String,
    #[serde(rename = "type")]
    pub kind: MatchType,
    pub rule: Rule,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Replacement {
    pub value: String,
}

/// Snippet around the match. `offset`/`length` locate the match inside `text`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MatchContext {
    pub text: String,
    pub offset: usize,
    pub length: usize,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchType {
    pub type_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub description: String,
    pub issue_type: String,
    pub category: Category,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Category {
    pub id: String,
    pub name: String,
}

impl Match {
    /// Replacement values in reported order, optionally capped at `limit`.
    pub fn suggestions(&self, limit: Option<usize>) -> Vec<String> {
        self.replacements
            .iter()
            .take(limit.unwrap_or(usize::MAX))
            .map(|r| r.value.clone())
            .collect()
    }

    pub fn to_issue(&self, suggestion_limit: Option<usize>) -> GrammarIssue {
        GrammarIssue {
            message: self.message.clone(),
            context: self.context.text.clone(),
            offset: self.offset,
            length: self.length,
            suggestions: self.suggestions(suggestion_limit),
        }
    }
}

impl CheckResponse {
    /// Map every match, in reported order, keeping all suggestions.
    pub fn into_issues(self) -> Vec<GrammarIssue> {
        self.matches.iter().map(|m| m.to_issue(None)).collect()
    }
}
