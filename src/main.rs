// Event assistant entry point.
//
// Startup sequence:
// 1. Initialize tracing
// 2. Load config
// 3. Build the LLM client and retriever from config
// 4. Ensure the Qdrant collection exists (when retrieval is enabled)
// 5. Create the chat channel and application state
// 6. Spawn the WebSocket chat server task
// 7. Run the application loop until ctrl-c

use event_assistant::app;
use event_assistant::config;
use event_assistant::llm;
use event_assistant::rag;
use event_assistant::server;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize tracing
    init_tracing()?;
    info!("Event assistant starting up");

    // 2. Load config
    let config = config::load_config().context("failed to load configuration")?;
    info!(
        "Config loaded: port={}, model={}, retrieval {}",
        config.server.port,
        config.llm.model,
        if config.retrieval.enabled {
            "enabled"
        } else {
            "disabled"
        }
    );

    // 3. Build the LLM client and retriever
    let llm_client = llm::client::LlmClient::from_config(&config);
    if llm_client.is_active() {
        info!("LLM client initialized (API key configured)");
    } else {
        info!("LLM client disabled (no API key); extraction will be a no-op");
    }

    let retriever = rag::Retriever::from_config(&config);

    // 4. Ensure the Qdrant collection exists. Retrieval degrades to empty
    // context on failure, so a missing Qdrant is not fatal.
    match retriever.ensure_collection().await {
        Ok(true) => info!("Created Qdrant collection {}", config.retrieval.collection),
        Ok(false) => {}
        Err(e) => warn!("Could not verify Qdrant collection: {e:#}"),
    }

    // 5. Create the chat channel and application state
    let (chat_tx, chat_rx) = mpsc::channel(64);
    let app_state = app::AppState::new(config.clone(), llm_client, retriever);

    // 6. Spawn the WebSocket chat server task
    let port = config.server.port;
    let listener = TcpListener::bind(format!("127.0.0.1:{port}"))
        .await
        .with_context(|| format!("failed to bind chat server on port {port}"))?;

    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::run(listener, chat_tx).await {
            error!("Chat server error: {e}");
        }
    });

    let app_handle = tokio::spawn(async move {
        if let Err(e) = app::run(chat_rx, app_state).await {
            error!("Application loop error: {e}");
        }
    });

    info!("Application ready. Chat server listening on 127.0.0.1:{port}");

    // 7. Run until ctrl-c
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    info!("Shutdown signal received");

    // Stop accepting connections; the app loop drains and exits once the
    // server task (holding the last chat sender) is gone.
    server_handle.abort();
    let _ = tokio::time::timeout(std::time::Duration::from_secs(5), app_handle).await;

    info!("Event assistant shut down cleanly");
    Ok(())
}

/// Initialize tracing to stderr, honoring `RUST_LOG` when set.
fn init_tracing() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let subscriber = fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("event_assistant=info,warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    Ok(())
}
