//! Roster Gateway server binary

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use roster_gateway::cache::{MemoryCache, RedisCache};
use roster_gateway::collections::{Collection, CollectionRegistry};
use roster_gateway::records::{CacheAsideRetriever, RecordService};
use roster_gateway::store::{MemoryStore, NotionStore, RecordStore};
use roster_gateway::{create_router, spawn_cleanup_task, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Roster Gateway");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, cache_ttl={}s, privileged_access={}",
        config.server_port,
        config.cache_ttl,
        config.api_key.is_some()
    );
    if config.api_key.is_none() {
        warn!("API_KEY is not set; every caller reads public fields only and writes are refused");
    }

    let mut collections = CollectionRegistry::from_config(&config);
    let store = build_store(&config, &mut collections).await?;
    info!("Serving collections: {}", collections.names().join(", "));

    let (retriever, cleanup_handle) = build_retriever(&config)?;
    let state = AppState::new(
        RecordService::new(store, retriever),
        collections,
        config.api_key.clone(),
    );
    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Page database client when a token is configured, in-memory store otherwise.
async fn build_store(
    config: &Config,
    collections: &mut CollectionRegistry,
) -> anyhow::Result<Arc<dyn RecordStore>> {
    if let Some(token) = &config.store_api_token {
        if collections.is_empty() {
            anyhow::bail!("STORE_API_TOKEN is set but no *_DATABASE_ID is configured");
        }
        let store = NotionStore::new(
            &config.store_base_url,
            token,
            &config.store_api_version,
            config.store_timeout(),
        )
        .context("failed to build record store client")?;
        info!("Using record store at {}", config.store_base_url);
        return Ok(Arc::new(store));
    }

    warn!("STORE_API_TOKEN is not set; using an in-memory record store");
    if collections.is_empty() {
        collections.register(Collection::members("members"));
        collections.register(Collection::students("students"));
        collections.register(Collection::projects("projects"));
    }

    let store = MemoryStore::new();
    for collection in collections.iter() {
        store
            .add_collection(collection, Some(id_prefix(&collection.name).as_str()))
            .await;
    }
    Ok(Arc::new(store))
}

/// `members` -> `MEM`
fn id_prefix(name: &str) -> String {
    name.chars().take(3).collect::<String>().to_uppercase()
}

/// Redis cache when a URL is configured, swept in-process cache otherwise.
fn build_retriever(
    config: &Config,
) -> anyhow::Result<(CacheAsideRetriever, Option<JoinHandle<()>>)> {
    if let Some(url) = &config.redis_url {
        let cache = RedisCache::new(url).context("invalid REDIS_URL")?;
        info!("Using Redis listing cache");
        let retriever =
            CacheAsideRetriever::new(Arc::new(cache), config.cache_ttl(), config.cache_timeout());
        return Ok((retriever, None));
    }

    let cache = Arc::new(MemoryCache::new(config.cache_max_entries));
    let handle = spawn_cleanup_task(cache.clone(), config.cleanup_interval);
    info!("Using in-process listing cache");
    let retriever = CacheAsideRetriever::new(cache, config.cache_ttl(), config.cache_timeout());
    Ok((retriever, Some(handle)))
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal(cleanup_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = cleanup_handle {
        handle.abort();
        warn!("Cache sweep task aborted");
    }
}
