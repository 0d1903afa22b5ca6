use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;

use fipe_data::models::has_fuel_code;
use fipe_data::{
    fallback_brands, fallback_models, FetchError, ModelCode, ProviderRegistry, Resolved,
    ResourceKind, VehicleType,
};

use super::events::{Advisory, CascadeError, CascadeEvent, CascadeEventSink, Level};
use super::session::SessionYearCache;
use super::state::{CascadeSnapshot, CascadeState};
use super::years::{match_pending_year, YearWindow};
use crate::cache::{read_cache, write_cache, CacheKey, CacheStore};

/// Tunables of the cascade.
#[derive(Debug, Clone, Copy, Default)]
pub struct CascadeConfig {
    pub year_window: YearWindow,
}

/// Drives the vehicle type → brand → model → year selection.
///
/// Each `select_*` call updates the selection synchronously and spawns the
/// fetch it implies on the current tokio runtime. Results are applied when
/// they arrive, unless a newer request for the same level superseded them.
/// Observers either subscribe through the [`CascadeEventSink`] or poll
/// [`snapshot`](Self::snapshot).
///
/// The `select_*` methods must be called from within a tokio runtime.
#[derive(Clone)]
pub struct SelectionCascade {
    inner: Arc<Inner>,
}

struct Inner {
    registry: Arc<ProviderRegistry>,
    cache: Arc<dyn CacheStore>,
    session: Arc<SessionYearCache>,
    sink: Arc<dyn CascadeEventSink>,
    config: CascadeConfig,
    state: Mutex<CascadeState>,
    loading: watch::Sender<usize>,
}

/// Data adopted by a level, and the advisory to show if it came from a
/// degraded source.
struct Loaded<T> {
    data: T,
    advisory: Option<Advisory>,
}

impl SelectionCascade {
    pub fn new(
        registry: Arc<ProviderRegistry>,
        cache: Arc<dyn CacheStore>,
        session: Arc<SessionYearCache>,
        sink: Arc<dyn CascadeEventSink>,
        config: CascadeConfig,
    ) -> Self {
        let (loading, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                registry,
                cache,
                session,
                sink,
                config,
                state: Mutex::new(CascadeState::default()),
                loading,
            }),
        }
    }

    /// Resets every level and fetches the brands for `vehicle_type`.
    pub fn select_vehicle_type(&self, vehicle_type: VehicleType) {
        let mut events = Vec::new();
        {
            let mut state = self.inner.lock();
            state.reset_all(vehicle_type);
            state.cancel_levels(&[Level::Models, Level::Years, Level::Result]);

            let key = CacheKey::brands(vehicle_type);
            self.inner.launch(
                &mut state,
                &mut events,
                Level::Brands,
                key.to_string(),
                move |inner, seq| inner.run_brands(seq, vehicle_type, key),
            );
        }
        self.inner.emit_all(events);
    }

    /// Selects a brand, resetting model and year. `None` clears the brand.
    pub fn select_brand(&self, brand: Option<&str>) {
        let mut events = Vec::new();
        {
            let mut state = self.inner.lock();
            state.reset_brand();
            state.error = None;
            state.cancel_levels(&[Level::Years, Level::Result]);

            let Some(brand) = brand.filter(|b| !b.is_empty()) else {
                state.cancel_levels(&[Level::Models]);
                return;
            };

            state.selected_brand = Some(brand.to_string());
            state.candidate_years = self.inner.config.year_window.candidates();

            let vehicle_type = state.vehicle_type;
            let brand = brand.to_string();
            let key = CacheKey::models(vehicle_type, &brand);
            self.inner.launch(
                &mut state,
                &mut events,
                Level::Models,
                key.to_string(),
                move |inner, seq| inner.run_models(seq, vehicle_type, brand, key),
            );
        }
        self.inner.emit_all(events);
    }

    /// Selects a model and loads its years. `None` clears the model.
    ///
    /// A year list memoized for this session is applied immediately.
    pub fn select_model(&self, model: Option<ModelCode>) {
        let mut events = Vec::new();
        {
            let mut state = self.inner.lock();
            state.reset_model();
            state.error = None;
            state.cancel_levels(&[Level::Result]);

            let (Some(model), Some(brand)) = (model, state.selected_brand.clone()) else {
                state.cancel_levels(&[Level::Years]);
                return;
            };
            state.selected_model = Some(model);

            let vehicle_type = state.vehicle_type;
            if let Some(years) = self.inner.session.get(vehicle_type, &brand, model) {
                debug!("Using session years for {}/{}/{}", vehicle_type, brand, model);
                state.cancel_levels(&[Level::Years]);
                state.model_years = years;
                self.inner.after_years(&mut state, &mut events);
            } else {
                let key = CacheKey::model_years(vehicle_type, &brand, model);
                self.inner.launch(
                    &mut state,
                    &mut events,
                    Level::Years,
                    key.to_string(),
                    move |inner, seq| inner.run_years(seq, vehicle_type, brand, model, key),
                );
            }
        }
        self.inner.emit_all(events);
    }

    /// Selects a year code or a bare year.
    ///
    /// Before a model is chosen the year is held as pending and reconciled
    /// against the model's years once they load. `None` clears the year.
    pub fn select_year(&self, year: Option<&str>) {
        let mut events = Vec::new();
        {
            let mut state = self.inner.lock();
            state.reset_year();
            state.pending_year = None;
            state.cancel_levels(&[Level::Result]);

            let Some(year) = year.filter(|y| !y.is_empty()) else {
                return;
            };

            state.selected_year = Some(year.to_string());
            if state.selected_model.is_none() {
                state.pending_year = Some(year.to_string());
                return;
            }
            self.inner.maybe_fetch_result(&mut state, &mut events);
        }
        self.inner.emit_all(events);
    }

    pub fn snapshot(&self) -> CascadeSnapshot {
        let loading = self.is_loading();
        self.inner.lock().snapshot(loading)
    }

    pub fn is_loading(&self) -> bool {
        self.inner.is_loading()
    }

    /// Resolves once no fetch is in flight.
    pub async fn wait_idle(&self) {
        let mut loading = self.inner.loading.subscribe();
        // The sender lives in `inner`, so the channel cannot close under us.
        let _ = loading.wait_for(|n| *n == 0).await;
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, CascadeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sends events to the sink. Must be called with no lock held, since
    /// sinks may read the snapshot.
    fn emit_all(&self, events: Vec<CascadeEvent>) {
        for event in events {
            self.emit(event);
        }
    }

    fn emit(&self, event: CascadeEvent) {
        if let CascadeEvent::LoadingChanged { loading } = event {
            // Deferred transitions can be overtaken by a later one.
            if loading != self.is_loading() {
                return;
            }
        }
        self.sink.emit(event);
    }

    fn is_loading(&self) -> bool {
        *self.loading.borrow() > 0
    }

    /// Starts a request for `level` unless the same key is already in flight.
    ///
    /// A loading transition is queued on `events` for the caller to emit once
    /// the state lock is released.
    fn launch<F, Fut>(
        self: &Arc<Self>,
        state: &mut CascadeState,
        events: &mut Vec<CascadeEvent>,
        level: Level,
        key: String,
        task: F,
    ) where
        F: FnOnce(Arc<Inner>, u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let Some(seq) = state.slot_mut(level).begin(key) else {
            debug!("Joining in-flight {} request", level);
            return;
        };

        if self.loading_started() {
            events.push(CascadeEvent::LoadingChanged { loading: true });
        }
        let guard = LoadingGuard {
            inner: Arc::clone(self),
        };
        let fut = task(Arc::clone(self), seq);
        let handle = tokio::spawn(async move {
            let _guard = guard;
            fut.await;
        });
        state.slot_mut(level).attach(handle.abort_handle());
    }

    /// Returns the applied state if `seq` is still current for `level`.
    fn lock_current(&self, level: Level, seq: u64) -> Option<MutexGuard<'_, CascadeState>> {
        let mut state = self.lock();
        if !state.slot(level).is_current(seq) {
            debug!("Dropping {} response: {}", level, FetchError::StaleDiscarded);
            return None;
        }
        state.slot_mut(level).finish();
        Some(state)
    }

    async fn run_brands(self: Arc<Self>, seq: u64, vehicle_type: VehicleType, key: CacheKey) {
        let outcome = self
            .degrade(Level::Brands, &key, self.registry.brands(vehicle_type), || {
                Some(fallback_brands(vehicle_type)).filter(|b| !b.is_empty())
            })
            .await;

        let mut events = Vec::new();
        {
            let Some(mut state) = self.lock_current(Level::Brands, seq) else {
                return;
            };
            match outcome {
                Ok(loaded) => {
                    state.brands = loaded.data;
                    events.extend(loaded.advisory.map(CascadeEvent::Advisory));
                }
                Err(error) => fail(&mut state, &mut events, error),
            }
        }
        self.emit_all(events);
    }

    async fn run_models(
        self: Arc<Self>,
        seq: u64,
        vehicle_type: VehicleType,
        brand: String,
        key: CacheKey,
    ) {
        let outcome = self
            .degrade(Level::Models, &key, self.registry.models(vehicle_type, &brand), || {
                fallback_models(vehicle_type, &brand)
            })
            .await;

        let mut events = Vec::new();
        {
            let Some(mut state) = self.lock_current(Level::Models, seq) else {
                return;
            };
            match outcome {
                Ok(loaded) => {
                    state.models = loaded.data;
                    events.extend(loaded.advisory.map(CascadeEvent::Advisory));
                }
                Err(error) => fail(&mut state, &mut events, error),
            }
        }
        self.emit_all(events);
    }

    async fn run_years(
        self: Arc<Self>,
        seq: u64,
        vehicle_type: VehicleType,
        brand: String,
        model: ModelCode,
        key: CacheKey,
    ) {
        let window = self.config.year_window;
        let fetch = async {
            let resolved = self.registry.years(vehicle_type, &brand, model).await?;
            let data = window.filter(resolved.data);
            if data.is_empty() {
                return Err(FetchError::NoData(ResourceKind::ModelYears));
            }
            Ok::<_, FetchError>(Resolved {
                data,
                provider_used: resolved.provider_used,
            })
        };
        let outcome = self.degrade(Level::Years, &key, fetch, || None).await;

        if let Ok(Loaded {
            data,
            advisory: None,
        }) = &outcome
        {
            self.session.insert(vehicle_type, &brand, model, data.clone());
        }

        let mut events = Vec::new();
        {
            let Some(mut state) = self.lock_current(Level::Years, seq) else {
                return;
            };
            match outcome {
                Ok(loaded) => {
                    state.model_years = loaded.data;
                    events.extend(loaded.advisory.map(CascadeEvent::Advisory));
                    self.after_years(&mut state, &mut events);
                }
                Err(error) => {
                    state.pending_year = None;
                    fail(&mut state, &mut events, error);
                }
            }
        }
        self.emit_all(events);
    }

    async fn run_result(
        self: Arc<Self>,
        seq: u64,
        vehicle_type: VehicleType,
        brand: String,
        model: ModelCode,
        year: String,
        key: CacheKey,
    ) {
        let fetch = self.registry.price(vehicle_type, &brand, model, &year);
        let outcome = self.degrade(Level::Result, &key, fetch, || None).await;

        let mut events = Vec::new();
        {
            let Some(mut state) = self.lock_current(Level::Result, seq) else {
                return;
            };
            match outcome {
                Ok(loaded) => {
                    events.extend(loaded.advisory.map(CascadeEvent::Advisory));
                    events.push(CascadeEvent::ResultReady(loaded.data.clone()));
                    state.result = Some(loaded.data);
                }
                Err(error) => fail(&mut state, &mut events, error),
            }
        }
        self.emit_all(events);
    }

    /// Providers, then the cache entry for `key`, then bundled data.
    async fn degrade<T, Fut, F>(
        &self,
        level: Level,
        key: &CacheKey,
        fetch: Fut,
        fallback: F,
    ) -> Result<Loaded<T>, CascadeError>
    where
        T: Serialize + DeserializeOwned,
        Fut: Future<Output = Result<Resolved<T>, FetchError>>,
        F: FnOnce() -> Option<T>,
    {
        let error = match fetch.await {
            Ok(resolved) => {
                info!("Loaded {} from {}", level, resolved.provider_used);
                write_cache(self.cache.as_ref(), key.as_str(), &resolved.data);
                return Ok(Loaded {
                    data: resolved.data,
                    advisory: None,
                });
            }
            Err(error) => error,
        };

        if let Some(data) = read_cache::<T>(self.cache.as_ref(), key.as_str()) {
            warn!("Providers failed for {} ({}), using cached {}", key, error.code(), level);
            return Ok(Loaded {
                data,
                advisory: Some(Advisory::CachedData {
                    level,
                    code: error.code(),
                }),
            });
        }

        if let Some(data) = fallback() {
            warn!(
                "Providers and cache missed for {} ({}), using offline {}",
                key,
                error.code(),
                level
            );
            return Ok(Loaded {
                data,
                advisory: Some(Advisory::FallbackData { level }),
            });
        }

        warn!("Failed to load {}: {}", key, error);
        Err(CascadeError::new(level, error.code()))
    }

    /// Reconciles the pending year against freshly applied model years, then
    /// fetches the price if the selection is complete.
    fn after_years(self: &Arc<Self>, state: &mut CascadeState, events: &mut Vec<CascadeEvent>) {
        if let Some(pending) = state.pending_year.take() {
            match match_pending_year(&state.model_years, &pending) {
                Some(matched) => {
                    debug!("Pending year {} resolved to {}", pending, matched.code);
                    state.selected_year = Some(matched.code.clone());
                }
                None => {
                    state.selected_year = None;
                    events.push(CascadeEvent::Advisory(Advisory::YearUnavailable {
                        year: pending,
                    }));
                }
            }
        }
        self.maybe_fetch_result(state, events);
    }

    fn maybe_fetch_result(
        self: &Arc<Self>,
        state: &mut CascadeState,
        events: &mut Vec<CascadeEvent>,
    ) {
        let (Some(brand), Some(model), Some(year)) = (
            state.selected_brand.clone(),
            state.selected_model,
            state.selected_year.clone(),
        ) else {
            return;
        };

        let confirmed = state.model_years.iter().any(|y| y.code == year);
        if !confirmed || !has_fuel_code(&year) {
            debug!("Year {} not confirmed for model {}, skipping price", year, model);
            return;
        }

        let vehicle_type = state.vehicle_type;
        let key = CacheKey::result(vehicle_type, &brand, model, &year);
        self.launch(state, events, Level::Result, key.to_string(), move |inner, seq| {
            inner.run_result(seq, vehicle_type, brand, model, year, key)
        });
    }

    /// Counts a fetch in. Returns true on the idle → loading transition.
    fn loading_started(&self) -> bool {
        let mut started = false;
        self.loading.send_modify(|count| {
            *count += 1;
            started = *count == 1;
        });
        started
    }

    /// Counts a fetch out. Returns true on the loading → idle transition.
    fn loading_finished(&self) -> bool {
        let mut finished = false;
        self.loading.send_modify(|count| {
            *count = count.saturating_sub(1);
            finished = *count == 0;
        });
        finished
    }
}

fn fail(state: &mut CascadeState, events: &mut Vec<CascadeEvent>, error: CascadeError) {
    state.error = Some(error.clone());
    events.push(CascadeEvent::Failed(error));
}

/// Releases one unit of the loading counter when a fetch task ends,
/// including when the task is aborted.
struct LoadingGuard {
    inner: Arc<Inner>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if self.inner.loading_finished() {
            self.inner.emit(CascadeEvent::LoadingChanged { loading: false });
        }
    }
}
