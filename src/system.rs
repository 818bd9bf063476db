use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::config::Config;
use crate::services::{
    AdminService, AuthService, BulkOrderService, CatalogService, CheckoutService, TrackingService,
};
use crate::session::SessionStore;
use crate::store::{StoreActor, StoreClient};

/// Wires the whole shop together: spawns the store actor, hands its client
/// to every service, and tears everything down in order on shutdown.
pub struct ShopSystem {
    pub store: StoreClient,
    pub auth: AuthService,
    pub catalog: CatalogService,
    pub checkout: CheckoutService,
    pub tracking: TrackingService,
    pub bulk: BulkOrderService,
    pub admin: AdminService,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl ShopSystem {
    #[instrument(name = "shop_system", skip(config))]
    pub fn new(config: &Config) -> Self {
        info!("Starting shop system");

        let counter = Arc::new(AtomicU64::new(1));
        let next_id = move || {
            let id = counter.fetch_add(1, Ordering::SeqCst);
            format!("order_{id}")
        };

        let (actor, store) = StoreActor::new(config.channel_capacity, next_id);
        let handle = tokio::spawn(actor.run());

        let sessions = SessionStore::new(config.session_file.clone());

        let system = Self {
            auth: AuthService::new(store.clone(), sessions),
            catalog: CatalogService::new(store.clone()),
            checkout: CheckoutService::new(store.clone(), config.pricing),
            tracking: TrackingService::new(store.clone()),
            bulk: BulkOrderService::new(store.clone()),
            admin: AdminService::new(store.clone()),
            store,
            handles: vec![handle],
        };

        info!("Shop system started");
        system
    }

    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down shop system");

        let _ = self.store.shutdown().await;
        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Store task failed");
                return Err(format!("store task failed: {e:?}"));
            }
        }

        info!("Shop system shutdown complete");
        Ok(())
    }
}

/// Configure tracing once at startup; every actor and service span uses it.
/// Verbosity comes from `RUST_LOG`, defaulting to info.
pub fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .init();
}
