use std::path::Path;
use std::process::{ExitStatus, Stdio};

use tokio::process::{Child, Command};
use tracing::{info, warn};

use crate::error::GrammarError;

const SERVER_MAIN_CLASS: &str = "org.languagetool.server.HTTPServer";

/// A locally spawned LanguageTool server. Killed on drop.
#[derive(Debug)]
pub struct LanguageToolProcess {
    child: Child,
}

impl LanguageToolProcess {
    /// Launch `java -cp <jar> org.languagetool.server.HTTPServer --port <port>`.
    pub fn launch(java: &str, jar: &Path, port: u16) -> Result<Self, GrammarError> {
        let mut command = Command::new(java);
        command
            .arg("-cp")
            .arg(jar)
            .arg(SERVER_MAIN_CLASS)
            .arg("--port")
            .arg(port.to_string());

        let process = Self::spawn(command)?;
        info!(port, jar = %jar.display(), pid = ?process.id(), "LanguageTool server started");
        Ok(process)
    }

    /// Spawn an arbitrary command as the supervised server process.
    pub fn spawn(mut command: Command) -> Result<Self, GrammarError> {
        let child = command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(GrammarError::Spawn)?;
        Ok(Self { child })
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// `Some(status)` once the process has exited, without blocking.
    pub fn exit_status(&mut self) -> Option<ExitStatus> {
        match self.child.try_wait() {
            Ok(status) => status,
            Err(e) => {
                warn!(error = %e, "failed to poll LanguageTool server process");
                None
            }
        }
    }

    /// Kill and reap the process. Calling it again after exit is a no-op.
    pub async fn kill(&mut self) -> std::io::Result<()> {
        if self.exit_status().is_some() {
            return Ok(());
        }
        self.child.kill().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spawned_process_runs_until_killed() {
        let mut command = Command::new("sleep");
        command.arg("30");
        let mut process = LanguageToolProcess::spawn(command).unwrap();

        assert!(process.id().is_some());
        assert!(process.exit_status().is_none());

        process.kill().await.unwrap();
        assert!(process.exit_status().is_some());
        process.kill().await.unwrap();
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let err = LanguageToolProcess::launch(
            "/nonexistent/notemark-java",
            Path::new("languagetool-server.jar"),
            18081,
        )
        .unwrap_err();
        assert!(matches!(err, GrammarError::Spawn(_)));
    }
}
