use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use wardrobe_store::Closet;

mod config;
mod dbus_interface;
mod engine;

use config::{BusKind, Config};
use dbus_interface::{WardrobeService, BUS_NAME, OBJECT_PATH};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("wardrobed starting");

    let config = Config::from_env();
    tracing::info!(
        db = %config.db_path.display(),
        uploads = %config.upload_dir.display(),
        bus = ?config.bus,
        "configuration loaded"
    );

    let closet = Closet::open(&config.db_path, &config.upload_dir)
        .with_context(|| format!("failed to open closet at {}", config.db_path.display()))?;
    let engine = engine::spawn_engine(closet)?;

    let builder = match config.bus {
        BusKind::Session => zbus::connection::Builder::session()?,
        BusKind::System => zbus::connection::Builder::system()?,
    };
    let _conn = builder
        .name(BUS_NAME)?
        .serve_at(OBJECT_PATH, WardrobeService::new(engine))?
        .build()
        .await
        .context("failed to register on D-Bus")?;

    tracing::info!(name = BUS_NAME, path = OBJECT_PATH, "wardrobed ready");

    // Keep running until signaled
    tokio::signal::ctrl_c().await?;
    tracing::info!("wardrobed shutting down");

    Ok(())
}
