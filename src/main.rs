//! Leave Entitlement Engine server.
//!
//! Loads configuration and the data snapshot, then serves the balance API.

use std::error::Error;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leave_engine::api::{AppState, create_router};
use leave_engine::config::ConfigLoader;
use leave_engine::store::{CachedLeaveTypeCatalog, InMemoryLeaveStore, LeaveStores};

const CONFIG_DIR_ENV: &str = "LEAVE_ENGINE_CONFIG";
const DEFAULT_CONFIG_DIR: &str = "./config";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "leave_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_dir = std::env::var(CONFIG_DIR_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_DIR.into());
    let config = ConfigLoader::load(&config_dir)?;
    info!(
        config_dir = %config_dir,
        leave_types = config.leave_types().len(),
        "Configuration loaded"
    );

    let snapshot_path = config.snapshot_path();
    let store = Arc::new(InMemoryLeaveStore::load(&snapshot_path)?);
    info!(
        snapshot = %snapshot_path.display(),
        entitlements = store.snapshot().entitlements.len(),
        deferrals = store.snapshot().deferrals.len(),
        requests = store.snapshot().requests.len(),
        "Data snapshot loaded"
    );

    let catalog =
        CachedLeaveTypeCatalog::with_ttl(Arc::new(config.clone()), config.settings().cache.ttl_secs);
    let stores = LeaveStores::from_shared(store).with_catalog(Arc::new(catalog));

    let app = create_router(AppState::new(stores));

    let addr = config.settings().server.bind_address.clone();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
