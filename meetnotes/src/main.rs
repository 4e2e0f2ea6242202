use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use meetnotes::api::{create_router, AppState};
use meetnotes::config::Config;
use meetnotes::llm::LlmProvider;
use meetnotes::mail::MailProvider;

#[derive(Parser)]
#[command(name = "meetnotes")]
#[command(about = "Summarize meeting transcripts with an LLM and email the result")]
struct Args {
    /// Bind address, overrides HOST
    #[arg(long)]
    host: Option<String>,

    /// Listen port, overrides PORT
    #[arg(long)]
    port: Option<u16>,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "meetnotes=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();
    init_tracing();

    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    tracing::info!("Initializing LLM provider: {}...", config.llm.model);
    let llm = LlmProvider::new(&config.llm);
    if llm.is_available() {
        tracing::info!(
            provider = llm.backend().name(),
            base_url = llm.base_url().unwrap_or_default(),
            "LLM provider ready"
        );
    } else {
        tracing::warn!(
            "LLM unavailable ({:?}) - /api/summarize will fail until LLM_API_KEY is set",
            llm.backend()
        );
    }

    let mail = MailProvider::new(config.mail.as_ref());
    if !mail.is_available() {
        tracing::warn!("SMTP unavailable - /api/send-email will fail until SMTP_HOST is set");
    }

    if config.server.cors_origins.is_empty() {
        tracing::info!("CORS: any origin allowed");
    } else {
        tracing::info!("CORS: allowing {}", config.server.cors_origins.join(", "));
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(config, Arc::new(llm), Arc::new(mail));

    let cancel_token = CancellationToken::new();

    tracing::info!("Starting rate limit sweeper...");
    let limiter = state.limiter.clone();
    let token = cancel_token.child_token();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("Rate limit sweeper shutting down...");
                    break;
                }
                _ = tokio::time::sleep(limiter.window()) => {
                    let removed = limiter.sweep_expired();
                    if removed > 0 {
                        tracing::debug!(removed, "Evicted expired rate limit windows");
                    }
                }
            }
        }
    });

    let app = create_router(state);

    tracing::info!("Meetnotes starting on http://{}", addr);
    tracing::info!("  Health check: http://{}/api/health", addr);
    tracing::info!("  API docs:     http://{}/api/docs", addr);
    tracing::info!("  OpenAPI spec: http://{}/api/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(cancel_token))
    .await?;

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling background tasks...");
    cancel_token.cancel();
}
