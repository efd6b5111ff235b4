//! Shared application state: one wired instance of every engine component.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use watchtower_core::Config;
use watchtower_registry::{RegistryClient, ServiceTokenProvider};
use watchtower_repo::{CheckoutCache, CheckoutSweeper, KeyedLocks, Materializer};
use watchtower_results::{MemoryResultStore, PgResultStore, ResultSink, ResultStore};
use watchtower_runner::ModuleRunner;
use watchtower_scheduler::{HttpTrigger, ModuleScheduler};

pub struct AppState {
    pub config: Config,
    pub runner: Arc<ModuleRunner>,
    pub scheduler: Arc<ModuleScheduler>,
    pub sink: Arc<ResultSink>,
    pub sweeper: Arc<CheckoutSweeper>,
}

impl AppState {
    /// Wire every component from config. The checkout cache and keyed locks
    /// are constructed here once and injected into everything that needs
    /// them; nothing in the engine holds global state.
    pub async fn from_config(config: Config) -> anyhow::Result<Arc<Self>> {
        let http = reqwest::Client::new();

        let tokens = ServiceTokenProvider::new(config.auth.clone(), http.clone());
        let registry = Arc::new(RegistryClient::new(
            config.registry.clone(),
            http.clone(),
            tokens,
        ));

        let cache = Arc::new(CheckoutCache::new());
        let materializer = Arc::new(Materializer::new(
            config.workspace.work_dir.clone(),
            cache.clone(),
            KeyedLocks::new(),
        ));

        let store: Arc<dyn ResultStore> = match config.database.url.as_deref() {
            Some(url) => {
                info!("using PostgreSQL result store");
                Arc::new(PgResultStore::connect(url, config.database.max_connections).await?)
            }
            None => {
                info!("DATABASE_URL not set; keeping results in memory");
                Arc::new(MemoryResultStore::new())
            }
        };
        let sink = Arc::new(ResultSink::new(store));

        let runner = Arc::new(ModuleRunner::new(
            registry,
            materializer,
            cache.clone(),
            sink.clone(),
        ));

        let trigger = Arc::new(HttpTrigger::new(config.server.public_url.clone(), http));
        let scheduler = ModuleScheduler::new(trigger);

        let retention = Duration::from_secs(u64::from(config.workspace.retention_days) * 86_400);
        let sweeper = Arc::new(CheckoutSweeper::new(
            config.workspace.work_dir.clone(),
            cache,
            retention,
        ));

        Ok(Arc::new(Self {
            config,
            runner,
            scheduler,
            sink,
            sweeper,
        }))
    }
}
