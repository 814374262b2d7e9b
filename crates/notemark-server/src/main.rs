use std::sync::Arc;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use notemark_grammar::GrammarService;
use notemark_render::Views;
use notemark_server::config::{Config, LogFormat};
use notemark_server::shutdown::{self, SHUTDOWN_GRACE, ServeOutcome};
use notemark_server::state::AppState;
use notemark_server::routes;
use notemark_storage::MongoNoteStore;

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    let dotenv = dotenvy::dotenv();
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    match dotenv {
        Ok(path) => tracing::info!(path = %path.display(), "loaded environment file"),
        Err(e) => tracing::debug!(error = %e, "no environment file loaded"),
    }

    let views = Views::load(config.templates_dir.as_deref())?;
    let store = MongoNoteStore::connect(&config.store).await?;
    let grammar = Arc::new(GrammarService::start(&config.grammar).await);

    let state = AppState::new(Arc::new(store.clone()), grammar.clone(), Arc::new(views));
    let app = routes::router(state, &config.static_dir);

    let listener = TcpListener::bind(("0.0.0.0", config.port)).await?;
    tracing::info!(port = config.port, "server listening");

    let outcome = shutdown::serve_until(listener, app, shutdown::signal(), SHUTDOWN_GRACE).await;

    grammar.stop().await;
    store.disconnect().await;
    tracing::info!("shutdown complete");

    match outcome {
        ServeOutcome::Drained | ServeOutcome::TimedOut => Ok(()),
        ServeOutcome::Failed(reason) => Err(eyre::eyre!("server failed: {reason}")),
    }
}
