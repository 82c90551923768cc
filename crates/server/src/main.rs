//! Nereus coastal risk API server.

use nereus_core::AccessGate;
use nereus_server::enricher::{EnricherConfig, NarrativeEnricher};
use nereus_server::predictor::{EngineConfig, SubprocessPredictor};
use nereus_server::store::MemoryStore;
use nereus_server::{build_router, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nereus_server=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();

    let port: u16 = args
        .iter()
        .position(|a| a == "--port" || a == "-p")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .or_else(|| {
            std::env::var("NEREUS_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
        })
        .unwrap_or(4000);

    let secret =
        std::env::var("JWT_SECRET").unwrap_or_else(|_| "dev_secret_change_me".to_string());
    if secret == "dev_secret_change_me" {
        tracing::warn!("JWT_SECRET not set; using the development default");
    }

    let engine = EngineConfig::from_env();
    tracing::info!(
        "🔮 Inference engine: {} {:?} (timeout {}ms)",
        engine.program,
        engine.args,
        engine.timeout.as_millis()
    );

    let enricher_config = EnricherConfig::from_env();
    match &enricher_config {
        Some(c) => tracing::info!("📝 Narrative service configured: model {}", c.model_id),
        None => tracing::info!("📝 Narrative service not configured; reports stay unenriched"),
    }

    let state = Arc::new(AppState::new(
        AccessGate::new(secret),
        Arc::new(MemoryStore::new()),
        Arc::new(SubprocessPredictor::new(engine)),
        NarrativeEnricher::new(enricher_config),
    ));

    let app = build_router(state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("🌊 Nereus API listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("bind server port");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server run");
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for ctrl+c");
    tracing::info!("Shutting down...");
}
