use anyhow::Context;
use blog_tonic_server::server::{
    config::{CliArgs, ServerConfig, StoreKind},
    run_server_with_incoming,
    service::BlogHandler,
    store::{BlogStore, MemoryBlogStore, MongoBlogStore},
    telemetry::init_telemetry,
};
use clap::Parser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;

// mimalloc behaves better than the musl allocator under contention.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = ServerConfig::try_from(args)?;

    let providers = init_telemetry()?;

    let store = build_store(&config).await?;
    let handler = BlogHandler::new(store, &config);

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    let res = if config.uds {
        #[cfg(unix)]
        {
            use tokio::net::UnixListener;
            use tokio_stream::wrappers::UnixListenerStream;
            let uds_path = config.server_addr.clone();
            let uds = UnixListener::bind(&uds_path)?;
            let incoming = UnixListenerStream::new(uds);
            log_startup_info(&uds_path, &config);
            let res =
                run_server_with_incoming(handler.clone(), &config, incoming, shutdown).await;
            // A panic may still leave the socket file behind.
            let _ = std::fs::remove_file(&uds_path);
            res
        }
        #[cfg(not(unix))]
        {
            anyhow::bail!("Unix domain sockets are not supported on this platform");
        }
    } else {
        let tcp_path = config.server_addr.clone();
        let tcp = TcpListener::bind(&tcp_path)
            .await
            .with_context(|| format!("failed to bind {tcp_path}"))?;
        let incoming = TcpListenerStream::new(tcp);
        log_startup_info(&tcp_path, &config);
        run_server_with_incoming(handler.clone(), &config, incoming, shutdown).await
    };

    // The listener is closed by now; release the store before flushing
    // telemetry so its shutdown is still logged.
    if let Err(_e) = handler.shutdown().await {
        #[cfg(feature = "tracing")]
        tracing::error!("Error closing store: {:?}", _e);
    }

    #[cfg(feature = "tracing")]
    tracing::info!("Service shut down successfully");

    providers.shutdown();
    res
}

async fn build_store(config: &ServerConfig) -> anyhow::Result<Arc<dyn BlogStore>> {
    match config.store {
        StoreKind::Mongo => {
            let store =
                MongoBlogStore::connect(&config.mongodb_uri, &config.database, &config.collection)
                    .await
                    .with_context(|| {
                        format!(
                            "failed to connect to MongoDB at {}",
                            config.redacted_mongodb_uri()
                        )
                    })?;
            Ok(Arc::new(store))
        }
        StoreKind::Memory => Ok(Arc::new(MemoryBlogStore::new())),
    }
}

fn log_startup_info(_addr: &str, _config: &ServerConfig) {
    #[cfg(feature = "tracing")]
    {
        let backend = match _config.store {
            StoreKind::Mongo => format!(
                "{} ({}.{})",
                _config.redacted_mongodb_uri(),
                _config.database,
                _config.collection
            ),
            StoreKind::Memory => "in-memory store".to_string(),
        };
        tracing::info!("Starting blog service on {} backed by {}", _addr, backend);
    }
}

async fn watch_signals(shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    tokio::select! {
        () = ctrl_c => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received SIGTERM signal");
        },
    }

    #[cfg(feature = "tracing")]
    tracing::info!("Shutdown signal received, terminating gracefully...");

    shutdown.cancel();
}
