use std::sync::Arc;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fipe_core::{
    CacheStore, CascadeConfig, CascadeEvent, CascadeEventSink, FileCacheStore, SelectionCascade,
    SessionYearCache,
};
use fipe_data::{
    FipeProvider, HttpTransport, ParallelumV1, ParallelumV2, ProviderRegistry, ReqwestTransport,
};

use crate::config::Config;

pub fn init_tracing() {
    let log_format = std::env::var("FIPE_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}

/// Forwards cascade events to the log.
pub struct TracingEventSink;

impl CascadeEventSink for TracingEventSink {
    fn emit(&self, event: CascadeEvent) {
        match event {
            CascadeEvent::LoadingChanged { loading } => tracing::debug!(loading, "Loading changed"),
            CascadeEvent::Advisory(advisory) => tracing::warn!("{}", advisory.message()),
            CascadeEvent::Failed(error) => tracing::error!(code = %error.code, "{}", error.message),
            CascadeEvent::ResultReady(result) => {
                tracing::info!(fipe_code = %result.fipe_code, "Price loaded: {}", result.price)
            }
        }
    }
}

pub struct AppState {
    pub cache: Arc<dyn CacheStore>,
    pub cascade: SelectionCascade,
}

pub fn build_state(config: &Config) -> AppState {
    tracing::info!("Cache path in use: {}", config.cache_path.display());
    let cache: Arc<dyn CacheStore> = Arc::new(FileCacheStore::new(&config.cache_path));

    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new());
    let registry = ProviderRegistry::new(
        vec![
            Arc::new(ParallelumV1::with_base_url(&config.v1_base_url)) as Arc<dyn FipeProvider>,
            Arc::new(ParallelumV2::with_base_url(&config.v2_base_url)),
        ],
        transport,
        config.policies.clone(),
    );
    let ids: Vec<_> = registry.providers().iter().map(|p| p.id()).collect();
    tracing::info!("Providers in failover order: {}", ids.join(", "));

    let cascade = SelectionCascade::new(
        Arc::new(registry),
        cache.clone(),
        Arc::new(SessionYearCache::new()),
        Arc::new(TracingEventSink),
        CascadeConfig::default(),
    );

    AppState { cache, cascade }
}
