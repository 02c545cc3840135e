use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::services::activity_log::{ActivityLogService, SqlActivitySink};
use crate::services::identity::{IdentityStore, SqlIdentityStore};
use crate::services::rate_limit::{FixedWindowLimiter, RateLimiter};
use crate::utils::cookies::CookieOptions;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    /// Fallback lookup for tokens without a usable role claim.
    pub identity_store: Arc<dyn IdentityStore>,
    /// Fire-and-forget audit writer.
    pub activity_log: ActivityLogService,
    /// Injected so a shared store can replace the in-memory map later.
    pub rate_limiter: Arc<dyn RateLimiter>,
}

impl AppState {
    /// Production wiring: SQL-backed capabilities over the shared pool.
    pub fn new(pool: PgPool, config: Config) -> Self {
        let identity_store = Arc::new(SqlIdentityStore::new(pool.clone()));
        let activity_log = ActivityLogService::new(Arc::new(SqlActivitySink::new(pool.clone())));
        let rate_limiter = Arc::new(FixedWindowLimiter::new());
        Self::with_capabilities(pool, config, identity_store, activity_log, rate_limiter)
    }

    /// Explicit wiring; tests swap in stub capabilities here.
    pub fn with_capabilities(
        pool: PgPool,
        config: Config,
        identity_store: Arc<dyn IdentityStore>,
        activity_log: ActivityLogService,
        rate_limiter: Arc<dyn RateLimiter>,
    ) -> Self {
        Self {
            pool,
            config,
            identity_store,
            activity_log,
            rate_limiter,
        }
    }

    pub fn cookie_options(&self) -> CookieOptions {
        CookieOptions {
            secure: self.config.cookie_secure,
            same_site: self.config.cookie_same_site,
        }
    }
}
