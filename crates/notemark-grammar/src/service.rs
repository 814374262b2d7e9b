use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{info, warn};

use notemark_core::models::GrammarIssue;

use crate::GrammarCheck;
use crate::client::LanguageToolClient;
use crate::error::GrammarError;
use crate::process::LanguageToolProcess;

/// Lifecycle of the grammar service.
///
/// `Uninitialized → Starting → Ready → (Stopped | Degraded)`; a failed start
/// goes straight to `Degraded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrammarState {
    Uninitialized,
    Starting,
    Ready,
    Stopped,
    Degraded,
}

#[derive(Debug, Clone)]
pub struct GrammarConfig {
    /// Java launcher used to run the server jar.
    pub java: String,
    pub jar_path: PathBuf,
    /// Local port the spawned server binds.
    pub port: u16,
    /// Use an already-running server instead of spawning one.
    pub server_url: Option<String>,
    /// Language sent when a check does not name one.
    pub default_language: String,
    /// Wait after spawning before the server is treated as usable.
    pub settle: Duration,
    pub request_timeout: Duration,
    /// Start directly in `Degraded`.
    pub disabled: bool,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self {
            java: "java".to_string(),
            jar_path: PathBuf::from("external/LanguageTool-6.6/languagetool-server.jar"),
            port: 8081,
            server_url: None,
            default_language: "en-US".to_string(),
            settle: Duration::from_secs(5),
            request_timeout: Duration::from_secs(30),
            disabled: false,
        }
    }
}

/// Supervised LanguageTool checker.
///
/// Construction never fails: when the server cannot be started the service
/// logs a warning and stays `Degraded`, and every check returns
/// [`GrammarError::NotInitialized`].
pub struct GrammarService {
    client: Option<LanguageToolClient>,
    process: AsyncMutex<Option<LanguageToolProcess>>,
    state: Mutex<GrammarState>,
}

impl GrammarService {
    /// A service that never checks anything.
    pub fn degraded() -> Self {
        Self {
            client: None,
            process: AsyncMutex::new(None),
            state: Mutex::new(GrammarState::Degraded),
        }
    }

    /// Start the service according to `config`, degrading on any failure.
    pub async fn start(config: &GrammarConfig) -> Self {
        if config.disabled {
            info!("grammar checking disabled by configuration");
            return Self::degraded();
        }

        match Self::try_start(config).await {
            Ok(service) => service,
            Err(e) => {
                warn!(error = %e, "grammar checker initialization failed, continuing without it");
                Self::degraded()
            }
        }
    }

    async fn try_start(config: &GrammarConfig) -> Result<Self, GrammarError> {
        if let Some(url) = &config.server_url {
            let client =
                LanguageToolClient::new(url, &config.default_language, config.request_timeout)?;
            info!(endpoint = client.endpoint(), "using external LanguageTool server");
            return Ok(Self {
                client: Some(client),
                process: AsyncMutex::new(None),
                state: Mutex::new(GrammarState::Ready),
            });
        }

        let base_url = format!("http://localhost:{}", config.port);
        let client =
            LanguageToolClient::new(&base_url, &config.default_language, config.request_timeout)?;
        let mut process = LanguageToolProcess::launch(&config.java, &config.jar_path, config.port)?;

        let service = Self {
            client: Some(client),
            process: AsyncMutex::new(None),
            state: Mutex::new(GrammarState::Starting),
        };

        // No readiness probe: give the JVM a fixed settle period, then make
        // sure it did not die while binding.
        tokio::time::sleep(config.settle).await;
        if let Some(status) = process.exit_status() {
            warn!(%status, "LanguageTool server exited during startup");
            service.set_state(GrammarState::Degraded);
            return Ok(service);
        }

        *service.process.lock().await = Some(process);
        service.set_state(GrammarState::Ready);
        Ok(service)
    }

    fn set_state(&self, state: GrammarState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Terminate the spawned server, if any. Safe to call more than once.
    pub async fn stop(&self) {
        if let Some(mut process) = self.process.lock().await.take() {
            match process.kill().await {
                Ok(()) => info!("LanguageTool server stopped"),
                Err(e) => warn!(error = %e, "failed to stop LanguageTool server"),
            }
        }
        if self.state() == GrammarState::Ready {
            self.set_state(GrammarState::Stopped);
        }
    }
}

#[async_trait]
impl GrammarCheck for GrammarService {
    async fn check_text(
        &self,
        text: &str,
        language: Option<&str>,
    ) -> Result<Vec<GrammarIssue>, GrammarError> {
        let client = match (&self.client, self.state()) {
            (Some(client), GrammarState::Ready) => client,
            _ => return Err(GrammarError::NotInitialized),
        };
        let response = client.check(text, language).await?;
        Ok(response.into_issues())
    }

    fn state(&self) -> GrammarState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
