use std::time::Duration;

use tracing::debug;

use crate::error::GrammarError;
use crate::wire::CheckResponse;

/// HTTP client for a LanguageTool server's `/v2/check` endpoint.
#[derive(Debug, Clone)]
pub struct LanguageToolClient {
    http: reqwest::Client,
    endpoint: String,
    default_language: String,
}

impl LanguageToolClient {
    /// `base_url` is the server root, e.g. `http://localhost:8081`.
    pub fn new(
        base_url: &str,
        default_language: &str,
        timeout: Duration,
    ) -> Result<Self, GrammarError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: format!("{}/v2/check", base_url.trim_end_matches('/')),
            default_language: default_language.to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST `text` and `language` as a form and decode the JSON reply.
    pub async fn check(
        &self,
        text: &str,
        language: Option<&str>,
    ) -> Result<CheckResponse, GrammarError> {
        let language = language
            .filter(|l| !l.is_empty())
            .unwrap_or(self.default_language.as_str());

        let resp = self
            .http
            .post(&self.endpoint)
            .form(&[("text", text), ("language", language)])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(GrammarError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: CheckResponse = serde_json::from_str(&body)?;
        debug!(
            language,
            matches = parsed.matches.len(),
            incomplete = parsed.warnings.incomplete_results,
            "grammar check complete"
        );
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_is_built_from_base_url() {
        let client =
            LanguageToolClient::new("http://localhost:8081/", "en-US", Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:8081/v2/check");
    }
}
