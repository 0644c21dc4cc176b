//! Public entry point: one method per backend operation.
//!
//! Each method tries the live backend once. Connectivity failures (and, for the two
//! analytics endpoints, 404s) are answered locally and flip the client's offline flag;
//! every other failure reaches the caller untouched.

use anyhow::Result as AnyResult;
use serde::Serialize;
use serde_json::json;
use std::future::{ready, Future};
use std::sync::Arc;

use crate::analytics;
use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::ApiError;
use crate::fallback;
use crate::logging::{
    log, log_fallback, log_fallback_failed, obj, payload_hash, v_str, Domain, Level,
};
use crate::models::{
    BatchPredictionResponse, CategoryPerformanceRecord, ClusterRecord, CountryMetricRecord,
    DriftCheckRequest, DriftCheckResponse, FeatureImportanceResponse, HealthStatus,
    ImportanceTarget, PredictionPayload, PredictionResult, ProcessedChannelSample,
    RawChannelSample, Readiness, RecommendationResponse, Records, SimulationRequest,
    SimulationResponse, UploadGrowthBucketRecord, MAX_BATCH_ITEMS,
};
use crate::offline::{OfflineFlag, OfflineSnapshot};
use crate::single_flight::SingleFlight;
use crate::transport::{ReqwestTransport, Transport};

pub const PROCESSED_SAMPLE_MAX_LIMIT: usize = 50;
pub const RAW_SAMPLE_MAX_LIMIT: usize = 200;
pub const CATEGORY_MIN_TOP_N: usize = 3;
pub const CATEGORY_MAX_TOP_N: usize = 30;

type Dataset = Result<Arc<Vec<ProcessedChannelSample>>, ApiError>;
type Eligible = fn(&ApiError) -> bool;

struct Inner {
    config: Config,
    dispatcher: Dispatcher,
    offline: OfflineFlag,
    dataset: SingleFlight<Dataset>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostics {
    pub api_base: String,
    pub dispatched_requests: u64,
    pub dataset_fetch_in_flight: bool,
    #[serde(flatten)]
    pub offline: OfflineSnapshot,
}

/// Cheap to clone; clones share the offline flag and the dataset slot.
#[derive(Clone)]
pub struct GrowthClient {
    inner: Arc<Inner>,
}

impl GrowthClient {
    pub fn new(config: Config) -> AnyResult<Self> {
        let transport = ReqwestTransport::new(config.connect_timeout_ms)?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: Config, transport: Arc<dyn Transport>) -> AnyResult<Self> {
        let base = config.base_url()?;
        log(
            Level::Info,
            Domain::System,
            "client_ready",
            obj(&[("api_base", v_str(base.as_str()))]),
        );
        Ok(Self {
            inner: Arc::new(Inner {
                dispatcher: Dispatcher::new(base, transport),
                offline: OfflineFlag::new(),
                dataset: SingleFlight::new("processed_sample"),
                config,
            }),
        })
    }

    fn http(&self) -> &Dispatcher {
        &self.inner.dispatcher
    }

    /// True once any call on this client has been answered with local data.
    pub fn is_offline(&self) -> bool {
        self.inner.offline.is_set()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            api_base: self.http().base().to_string(),
            dispatched_requests: self.http().dispatched(),
            dataset_fetch_in_flight: self.inner.dataset.in_flight(),
            offline: self.inner.offline.snapshot(),
        }
    }

    async fn resilient<T, L, F, Fut>(
        &self,
        operation: &'static str,
        fingerprint: Option<String>,
        live: L,
        eligible: Eligible,
        fallback: F,
    ) -> Result<T, ApiError>
    where
        L: Future<Output = Result<T, ApiError>>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        match live.await {
            Ok(value) => Ok(value),
            Err(err) if eligible(&err) => {
                let answer = fallback().await;
                match &answer {
                    Ok(_) => {
                        self.inner.offline.mark(operation);
                        log_fallback(
                            operation,
                            err.kind().as_str(),
                            &err.to_string(),
                            fingerprint.as_deref(),
                        );
                    }
                    Err(fallback_err) => log_fallback_failed(operation, &err, fallback_err),
                }
                answer
            }
            Err(err) => Err(err),
        }
    }

    // =========================================================================
    // Predictions
    // =========================================================================

    pub async fn predict(&self, payload: &PredictionPayload) -> Result<PredictionResult, ApiError> {
        let payload = payload.normalized()?;
        self.resilient(
            "predict",
            Some(payload_hash(&payload)),
            self.http().post("/predict", &payload),
            ApiError::is_connectivity,
            || ready(Ok(fallback::predict(&payload))),
        )
        .await
    }

    pub async fn predict_batch(
        &self,
        items: &[PredictionPayload],
    ) -> Result<BatchPredictionResponse, ApiError> {
        let items = normalize_items(items)?;
        let body = json!({ "items": items });
        self.resilient(
            "predict_batch",
            Some(payload_hash(&body)),
            self.http().post("/predict/batch", &body),
            ApiError::is_connectivity,
            || ready(Ok(fallback::predict_batch(&items))),
        )
        .await
    }

    pub async fn simulate(
        &self,
        request: &SimulationRequest,
    ) -> Result<SimulationResponse, ApiError> {
        let request = request.normalized()?;
        self.resilient(
            "simulate",
            Some(payload_hash(&request)),
            self.http().post("/predict/simulate", &request),
            ApiError::is_connectivity,
            || ready(Ok(fallback::simulate(&request))),
        )
        .await
    }

    pub async fn recommend(
        &self,
        payload: &PredictionPayload,
    ) -> Result<RecommendationResponse, ApiError> {
        let payload = payload.normalized()?;
        self.resilient(
            "recommend",
            Some(payload_hash(&payload)),
            self.http().post("/predict/recommendation", &payload),
            ApiError::is_connectivity,
            || ready(Ok(fallback::recommend(&payload))),
        )
        .await
    }

    pub async fn feature_importance(
        &self,
        target: ImportanceTarget,
        top_n: usize,
    ) -> Result<FeatureImportanceResponse, ApiError> {
        let top_n = top_n.clamp(1, fallback::MAX_FEATURE_IMPORTANCE);
        let query = [("target", target.as_str().to_string()), ("top_n", top_n.to_string())];
        self.resilient(
            "feature_importance",
            None,
            self.http().get("/predict/feature-importance", &query),
            ApiError::is_connectivity,
            || ready(Ok(fallback::feature_importance(target, top_n))),
        )
        .await
    }

    pub async fn drift_check(
        &self,
        items: &[PredictionPayload],
    ) -> Result<DriftCheckResponse, ApiError> {
        let request = DriftCheckRequest {
            items: normalize_items(items)?,
            z_threshold: self.inner.config.drift_z_threshold,
            min_category_frequency: self.inner.config.drift_min_category_frequency,
        };
        self.resilient(
            "drift_check",
            Some(payload_hash(&request)),
            self.http().post("/mlops/drift-check", &request),
            ApiError::is_connectivity,
            || ready(Ok(fallback::drift_check(&request.items))),
        )
        .await
    }

    // =========================================================================
    // Reference data and samples
    // =========================================================================

    pub async fn cluster_summary(&self) -> Result<Vec<ClusterRecord>, ApiError> {
        self.resilient(
            "cluster_summary",
            None,
            self.records("/clusters/summary", &[]),
            ApiError::is_connectivity,
            || ready(Ok(fallback::cluster_summary())),
        )
        .await
    }

    pub async fn country_metrics(&self) -> Result<Vec<CountryMetricRecord>, ApiError> {
        self.resilient(
            "country_metrics",
            None,
            self.records("/maps/country-metrics", &[]),
            ApiError::is_connectivity,
            || ready(Ok(fallback::country_metrics())),
        )
        .await
    }

    pub async fn raw_sample(&self, limit: usize) -> Result<Vec<RawChannelSample>, ApiError> {
        let limit = limit.clamp(1, RAW_SAMPLE_MAX_LIMIT);
        let query = [("limit", limit.to_string())];
        self.resilient(
            "raw_sample",
            None,
            self.records("/data/raw-sample", &query),
            ApiError::is_connectivity,
            || ready(Ok(fallback::raw_sample(limit))),
        )
        .await
    }

    pub async fn processed_sample(
        &self,
        limit: usize,
    ) -> Result<Vec<ProcessedChannelSample>, ApiError> {
        let limit = limit.clamp(1, PROCESSED_SAMPLE_MAX_LIMIT);
        let query = [("limit", limit.to_string())];
        self.resilient(
            "processed_sample",
            None,
            self.records("/data/processed-sample", &query),
            ApiError::is_connectivity,
            || ready(Ok(fallback::processed_sample(limit))),
        )
        .await
    }

    // =========================================================================
    // Analytics
    // =========================================================================

    /// `top_n` is clamped to the backend's accepted range of 3 to 30.
    pub async fn category_performance(
        &self,
        top_n: usize,
    ) -> Result<Vec<CategoryPerformanceRecord>, ApiError> {
        let top_n = top_n.clamp(CATEGORY_MIN_TOP_N, CATEGORY_MAX_TOP_N);
        let query = [("top_n", top_n.to_string())];
        self.resilient(
            "category_performance",
            None,
            self.records("/analytics/category-performance", &query),
            ApiError::is_connectivity_or_not_found,
            || async move {
                let rows = self.analytics_dataset().await?;
                Ok::<_, ApiError>(analytics::category_performance(&rows, top_n))
            },
        )
        .await
    }

    pub async fn upload_growth_buckets(&self) -> Result<Vec<UploadGrowthBucketRecord>, ApiError> {
        self.resilient(
            "upload_growth_buckets",
            None,
            self.records("/analytics/upload-growth-buckets", &[]),
            ApiError::is_connectivity_or_not_found,
            || async move {
                let rows = self.analytics_dataset().await?;
                Ok::<_, ApiError>(analytics::upload_growth_buckets(&rows))
            },
        )
        .await
    }

    /// Processed sample at the maximum limit, fetched at most once at a time.
    async fn analytics_dataset(&self) -> Dataset {
        let client = self.clone();
        self.inner
            .dataset
            .run(move || async move {
                client
                    .processed_sample(PROCESSED_SAMPLE_MAX_LIMIT)
                    .await
                    .map(Arc::new)
            })
            .await
    }

    // =========================================================================
    // Probes
    // =========================================================================

    /// Liveness probe. Never falls back.
    pub async fn health(&self) -> Result<HealthStatus, ApiError> {
        self.http().get("/health", &[]).await
    }

    /// Readiness probe. A 503 is a normal "not ready" answer, not an error.
    pub async fn readiness(&self) -> Result<Readiness, ApiError> {
        let (status, body) = self.http().get_text("/ready").await?;
        match status {
            200..=299 => Ok(Readiness::Ready),
            503 => Ok(Readiness::from_body(&body)),
            _ => Err(ApiError::from_status(status, body)),
        }
    }

    async fn records<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, ApiError> {
        let envelope: Records<T> = self.http().get(path, query).await?;
        Ok(envelope.records)
    }
}

fn normalize_items(items: &[PredictionPayload]) -> Result<Vec<PredictionPayload>, ApiError> {
    if items.is_empty() || items.len() > MAX_BATCH_ITEMS {
        return Err(ApiError::InvalidInput(format!(
            "expected 1 to {} items, got {}",
            MAX_BATCH_ITEMS,
            items.len()
        )));
    }
    items.iter().map(PredictionPayload::normalized).collect()
}
