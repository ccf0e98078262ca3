//! API module
//!
//! HTTP surface: shared state, routes, middleware.

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use crate::cache::RouteCache;
use crate::config::Config;
use crate::domain::ShareableIdCodec;
use crate::providers::{AggregationProvider, IdentityProvider, PaymentsProvider};
use crate::store::Documents;

/// Shared application state: configuration, the three provider clients,
/// and the route cache. Handlers are constructed from this per request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub identity: Arc<dyn IdentityProvider>,
    pub aggregation: Arc<dyn AggregationProvider>,
    pub payments: Arc<dyn PaymentsProvider>,
    pub codec: ShareableIdCodec,
    pub cache: RouteCache,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        identity: Arc<dyn IdentityProvider>,
        aggregation: Arc<dyn AggregationProvider>,
        payments: Arc<dyn PaymentsProvider>,
    ) -> Self {
        let codec = ShareableIdCodec::new(&config.shareable_id_secret);
        let cache = RouteCache::new(config.route_cache_ttl);
        Self {
            config,
            identity,
            aggregation,
            payments,
            codec,
            cache,
        }
    }

    pub fn documents(&self) -> Documents {
        Documents::new(self.identity.clone(), &self.config)
    }
}
