use std::future::Future;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// How long in-flight requests get to finish once shutdown starts.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(15);

/// How [`serve_until`] ended.
#[derive(Debug, PartialEq, Eq)]
pub enum ServeOutcome {
    /// Shutdown was requested and every connection drained in time.
    Drained,
    /// Shutdown was requested but connections were still open at the deadline.
    TimedOut,
    /// The listener failed before shutdown was requested.
    Failed(String),
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("received ctrl-c"),
        () = terminate => info!("received SIGTERM"),
    }
}

/// Serve `app` until `shutdown` resolves or the server fails on its own.
///
/// After `shutdown` resolves the listener stops accepting and open requests
/// get `grace` to finish; whatever is still running then is dropped.
pub async fn serve_until<F>(
    listener: TcpListener,
    app: Router,
    shutdown: F,
    grace: Duration,
) -> ServeOutcome
where
    F: Future<Output = ()> + Send,
{
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = stop_rx.await;
            })
            .await
    });

    tokio::select! {
        () = shutdown => info!("shutting down server"),
        joined = &mut server => {
            return match joined {
                Ok(Ok(())) => ServeOutcome::Drained,
                Ok(Err(e)) => {
                    error!(error = %e, "server failed");
                    ServeOutcome::Failed(e.to_string())
                }
                Err(e) => {
                    error!(error = %e, "server task failed");
                    ServeOutcome::Failed(e.to_string())
                }
            };
        }
    }

    let _ = stop_tx.send(());
    match tokio::time::timeout(grace, &mut server).await {
        Ok(Ok(Ok(()))) => {
            info!("server drained");
            ServeOutcome::Drained
        }
        Ok(Ok(Err(e))) => {
            error!(error = %e, "server failed during shutdown");
            ServeOutcome::Failed(e.to_string())
        }
        Ok(Err(e)) => {
            error!(error = %e, "server task failed during shutdown");
            ServeOutcome::Failed(e.to_string())
        }
        Err(_) => {
            warn!(
                grace_secs = grace.as_secs(),
                "graceful shutdown timed out, dropping open connections"
            );
            server.abort();
            ServeOutcome::TimedOut
        }
    }
}
