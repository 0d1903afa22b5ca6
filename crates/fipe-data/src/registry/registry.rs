//! Provider registry for orchestrating FIPE providers.
//!
//! The registry manages the ordered providers and, for each resource,
//! builds the attempt list handed to [`fetch_from_providers`].

use std::sync::Arc;
use std::time::Duration;

use crate::errors::FetchError;
use crate::http::{HttpTransport, RetryPolicy};
use crate::models::{Brand, Model, ModelCode, PriceResult, Query, ResourceKind, VehicleType, YearOption};
use crate::provider::{FipeProvider, ParallelumV1, ParallelumV2};

use super::failover::{fetch_from_providers, ProviderAttempt, Resolved};

/// Retry policy per resource kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchPolicies {
    pub brands: RetryPolicy,
    pub models: RetryPolicy,
    pub years: RetryPolicy,
    pub price: RetryPolicy,
}

impl FetchPolicies {
    /// The same policy everywhere.
    pub fn uniform(policy: RetryPolicy) -> Self {
        Self {
            brands: policy.clone(),
            models: policy.clone(),
            years: policy.clone(),
            price: policy,
        }
    }

    pub fn for_kind(&self, kind: ResourceKind) -> &RetryPolicy {
        match kind {
            ResourceKind::Brands => &self.brands,
            ResourceKind::Models => &self.models,
            ResourceKind::ModelYears => &self.years,
            ResourceKind::Result => &self.price,
        }
    }
}

impl Default for FetchPolicies {
    fn default() -> Self {
        Self {
            brands: RetryPolicy::new(3, Duration::from_millis(350), Duration::from_secs(10)),
            models: RetryPolicy::new(3, Duration::from_millis(500), Duration::from_secs(12)),
            years: RetryPolicy::new(3, Duration::from_millis(350), Duration::from_secs(12)),
            price: RetryPolicy::new(3, Duration::from_millis(350), Duration::from_secs(12)),
        }
    }
}

/// Provider registry for orchestrating FIPE fetching.
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn FipeProvider>>,
    transport: Arc<dyn HttpTransport>,
    policies: FetchPolicies,
}

impl ProviderRegistry {
    /// Create a registry; providers are ordered by priority.
    pub fn new(
        mut providers: Vec<Arc<dyn FipeProvider>>,
        transport: Arc<dyn HttpTransport>,
        policies: FetchPolicies,
    ) -> Self {
        providers.sort_by_key(|p| p.priority());
        Self {
            providers,
            transport,
            policies,
        }
    }

    /// Parallelum v1 first, v2 second, default policies.
    pub fn with_default_providers(transport: Arc<dyn HttpTransport>) -> Self {
        Self::new(
            vec![
                Arc::new(ParallelumV1::new()) as Arc<dyn FipeProvider>,
                Arc::new(ParallelumV2::new()),
            ],
            transport,
            FetchPolicies::default(),
        )
    }

    pub async fn brands(
        &self,
        vehicle_type: VehicleType,
    ) -> Result<Resolved<Vec<Brand>>, FetchError> {
        let query = Query::Brands { vehicle_type };
        self.resolve(&query, |p, raw| p.parse_brands(raw)).await
    }

    pub async fn models(
        &self,
        vehicle_type: VehicleType,
        brand: &str,
    ) -> Result<Resolved<Vec<Model>>, FetchError> {
        let query = Query::Models {
            vehicle_type,
            brand: brand.to_string(),
        };
        self.resolve(&query, |p, raw| p.parse_models(raw)).await
    }

    pub async fn years(
        &self,
        vehicle_type: VehicleType,
        brand: &str,
        model: ModelCode,
    ) -> Result<Resolved<Vec<YearOption>>, FetchError> {
        let query = Query::Years {
            vehicle_type,
            brand: brand.to_string(),
            model,
        };
        self.resolve(&query, |p, raw| p.parse_years(raw)).await
    }

    pub async fn price(
        &self,
        vehicle_type: VehicleType,
        brand: &str,
        model: ModelCode,
        year: &str,
    ) -> Result<Resolved<PriceResult>, FetchError> {
        let query = Query::Price {
            vehicle_type,
            brand: brand.to_string(),
            model,
            year: year.to_string(),
        };
        self.resolve(&query, |p, raw| p.parse_price(raw)).await
    }

    /// Build one attempt per provider, in order, and run failover.
    async fn resolve<T, F>(&self, query: &Query, parse: F) -> Result<Resolved<T>, FetchError>
    where
        F: Fn(&dyn FipeProvider, serde_json::Value) -> Result<T, FetchError>
            + Clone
            + Send
            + Sync
            + 'static,
    {
        let attempts = self
            .providers
            .iter()
            .map(|provider| {
                let owned = Arc::clone(provider);
                let parse = parse.clone();
                ProviderAttempt::new(provider.id(), provider.url(query), move |raw| {
                    parse(owned.as_ref(), raw)
                })
            })
            .collect();

        let policy = self.policies.for_kind(query.resource_kind());
        fetch_from_providers(self.transport.as_ref(), attempts, policy).await
    }

    /// Get the list of registered providers, in attempt order.
    pub fn providers(&self) -> &[Arc<dyn FipeProvider>] {
        &self.providers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{MockReply, MockTransport};
    use serde_json::json;

    const V1: &str = "https://fipe.test/v1";
    const V2: &str = "https://fipe.test/v2";

    fn registry(transport: &MockTransport) -> ProviderRegistry {
        ProviderRegistry::new(
            vec![
                Arc::new(ParallelumV2::with_base_url(V2)) as Arc<dyn FipeProvider>,
                Arc::new(ParallelumV1::with_base_url(V1)),
            ],
            Arc::new(transport.clone()),
            FetchPolicies::uniform(RetryPolicy::from_millis(2, 10, 1_000)),
        )
    }

    #[test]
    fn test_providers_sorted_by_priority() {
        let transport = MockTransport::new();
        let registry = registry(&transport);
        let ids: Vec<_> = registry.providers().iter().map(|p| p.id()).collect();
        assert_eq!(ids, vec!["PARALLELUM_V1", "PARALLELUM_V2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_models_fall_over_to_v2_schema() {
        let transport = MockTransport::new();
        transport.on(
            format!("{}/carros/marcas/59/modelos", V1),
            MockReply::status(503),
        );
        transport.on(
            format!("{}/cars/brands/59/models", V2),
            MockReply::ok(json!([{"code": "5940", "name": "Gol 1.0"}])),
        );

        let resolved = registry(&transport)
            .models(VehicleType::Car, "59")
            .await
            .unwrap();

        assert_eq!(resolved.provider_used, "PARALLELUM_V2");
        assert_eq!(resolved.data, vec![Model::new(5940, "Gol 1.0")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_v1_list_falls_over() {
        let transport = MockTransport::new();
        transport.on(format!("{}/motos/marcas", V1), MockReply::ok(json!([])));
        transport.on(
            format!("{}/motorcycles/brands", V2),
            MockReply::ok(json!([{"code": "80", "name": "HONDA"}])),
        );

        let resolved = registry(&transport)
            .brands(VehicleType::Motorcycle)
            .await
            .unwrap();

        assert_eq!(resolved.data, vec![Brand::new("80", "HONDA")]);
    }

    #[test]
    fn test_default_policies_follow_call_sites() {
        let policies = FetchPolicies::default();
        assert_eq!(policies.models.base_delay, Duration::from_millis(500));
        assert_eq!(policies.brands.timeout, Duration::from_secs(10));
        assert_eq!(policies.for_kind(ResourceKind::Result).timeout, Duration::from_secs(12));
    }
}
