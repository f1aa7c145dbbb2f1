use std::sync::Arc;

use crate::{
    auth::{jwt::TokenService, password::CredentialHasher, repo::UserRepo},
    clock::{Clock, SystemClock},
    config::AppConfig,
    db,
    deals::repo::DealRepo,
    investors::repo::InvestorRepo,
    memory::MemoryStore,
    properties::repo::PropertyRepo,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepo>,
    pub properties: Arc<dyn PropertyRepo>,
    pub investors: Arc<dyn InvestorRepo>,
    pub deals: Arc<dyn DealRepo>,
    pub tokens: TokenService,
    pub hasher: CredentialHasher,
}

impl AppState {
    /// Builds state from the environment: PostgreSQL when `DATABASE_URL` is
    /// set (migrations applied), the memory store otherwise.
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;

        match config.database_url.clone() {
            Some(url) => {
                let pool = db::connect(&config, &url).await?;
                db::migrate(&pool).await?;
                tracing::info!("using postgres store");
                let pool = Arc::new(pool);
                Self::from_parts(
                    config,
                    pool.clone(),
                    pool.clone(),
                    pool.clone(),
                    pool,
                    Arc::new(SystemClock),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL not set; records are kept in memory only");
                Self::in_memory(config, Arc::new(SystemClock))
            }
        }
    }

    pub fn in_memory(config: AppConfig, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let store = Arc::new(MemoryStore::new());
        Self::from_parts(config, store.clone(), store.clone(), store.clone(), store, clock)
    }

    pub fn from_parts(
        config: AppConfig,
        users: Arc<dyn UserRepo>,
        properties: Arc<dyn PropertyRepo>,
        investors: Arc<dyn InvestorRepo>,
        deals: Arc<dyn DealRepo>,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let tokens = TokenService::new(&config.jwt, clock);
        let hasher = CredentialHasher::new(config.hash)?;
        Ok(Self {
            config: Arc::new(config),
            users,
            properties,
            investors,
            deals,
            tokens,
            hasher,
        })
    }

    /// Memory-backed state with cheap hashing and the system clock.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::in_memory(AppConfig::for_tests(), Arc::new(SystemClock)).expect("test state")
    }
}
