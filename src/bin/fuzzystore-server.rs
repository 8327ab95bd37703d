//! fuzzystore HTTP server.
//!
//! Serves the fuzzy dictionary contract: exact and distance-bounded
//! lookups, inserts, bulk word-list loading, store clearing, and the
//! accuracy/latency benchmark endpoint.
//!
//! # Example
//!
//! ```bash
//! fuzzystore-server \
//!   --listen 0.0.0.0:8080 \
//!   --wordlist demo/data/english.dat
//! ```

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use fuzzystore::engine::{EngineConfig, QueryEngine};
use fuzzystore::server::{router, AppState};
use fuzzystore::store::StoreRegistry;

/// Fuzzy dictionary HTTP server
#[derive(Parser, Debug)]
#[command(name = "fuzzystore-server")]
#[command(about = "HTTP server for the fuzzystore dictionary service")]
struct Args {
    /// Listen address
    #[arg(long, default_value = "0.0.0.0:8080", env = "FUZZYSTORE_LISTEN")]
    listen: SocketAddr,

    /// Tab-separated reference word list served by /loadenglish
    #[arg(long, env = "FUZZYSTORE_WORDLIST")]
    wordlist: Option<PathBuf>,

    /// Store /loadenglish targets when no store parameter is given
    #[arg(long, default_value = "demostore", env = "FUZZYSTORE_DEFAULT_STORE")]
    default_store: String,

    /// Per-query time budget in milliseconds
    #[arg(long, default_value = "30000", env = "FUZZYSTORE_QUERY_TIMEOUT_MS")]
    query_timeout_ms: u64,

    /// Largest accepted distance budget
    #[arg(long, default_value = "64", env = "FUZZYSTORE_MAX_DISTANCE")]
    max_distance: usize,

    /// Ceiling on per-query result limits
    #[arg(long, default_value = "1000", env = "FUZZYSTORE_MAX_RESULTS")]
    max_results: usize,

    /// Fail with 404 instead of creating stores on first reference
    #[arg(long, env = "FUZZYSTORE_NO_AUTO_CREATE")]
    no_auto_create: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("fuzzystore=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    let args = Args::parse();

    info!(
        listen = %args.listen,
        wordlist = ?args.wordlist,
        default_store = %args.default_store,
        "starting fuzzystore server"
    );

    let config = EngineConfig {
        query_timeout: Duration::from_millis(args.query_timeout_ms),
        create_missing_stores: !args.no_auto_create,
        max_distance: args.max_distance,
        max_results: args.max_results,
    };
    let registry = Arc::new(StoreRegistry::new());
    let engine = QueryEngine::new(registry, config);

    let state = Arc::new(AppState {
        engine,
        wordlist: args.wordlist,
        default_store: args.default_store,
    });

    let app = router(state);

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;

    info!(address = %args.listen, "server listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
