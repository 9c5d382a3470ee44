mod cli;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use pinhole_allocator::{AllocatorSettings, RandomKeyGenerator};
use pinhole_core::Shortener;
use pinhole_gateway::{App, AppState, GatewaySettings};
use pinhole_shortener::{ShortenerService, ShortenerSettings};
use pinhole_storage::{InMemoryKv, KeyValueStore, KvLayout, KvMappingStore, RedisKv};
use pinhole_telemetry::LogFormat;
use tokio::net::TcpListener;
use tracing::info;

use crate::cli::{StorageBackendArg, CLI};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = CLI::try_parse()?;

    let log_format: LogFormat = config.log_format.into();
    pinhole_telemetry::init(log_format, pinhole_telemetry::DEFAULT_DIRECTIVES)?;

    let settings = ShortenerSettings::builder()
        .write_mode(config.write_mode.into())
        .allocator(
            AllocatorSettings::builder()
                .key_length(usize::from(config.key_length))
                .max_attempts(config.max_attempts)
                .max_extra_length(config.max_extra_length)
                .build(),
        )
        .build();
    let layout = KvLayout::builder()
        .page_size(config.list_page_size)
        .build();

    info!(
        listen_addr = %config.listen_addr,
        public_base_url = %config.public_base_url,
        storage_backend = %config.storage,
        write_mode = %settings.write_mode,
        key_length = config.key_length,
        log_format = %log_format,
        "starting pinhole gateway"
    );

    let shortener = match config.storage {
        StorageBackendArg::InMemory => build_shortener(InMemoryKv::new(), layout, settings),
        StorageBackendArg::Redis => {
            let redis_url = config
                .redis_url
                .as_deref()
                .context("redis url is required when storage backend is redis")?;
            let kv = RedisKv::connect(redis_url)
                .await
                .context("failed to connect to redis")?;
            build_shortener(kv, layout, settings)
        }
    };

    let state = AppState::new(
        shortener,
        GatewaySettings::builder()
            .public_base_url(config.public_base_url)
            .create_timeout(Duration::from_millis(config.create_timeout_ms))
            .max_custom_key_length(config.max_custom_key_length)
            .build(),
    );

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, App::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("gateway stopped");
    Ok(())
}

fn build_shortener<B: KeyValueStore>(
    backend: B,
    layout: KvLayout,
    settings: ShortenerSettings,
) -> Arc<dyn Shortener> {
    let store = KvMappingStore::with_layout(backend, layout);
    Arc::new(ShortenerService::with_settings(
        store,
        RandomKeyGenerator::new(),
        settings,
    ))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
    }
}
