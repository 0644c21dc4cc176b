//! Wire types exchanged with the analytics backend.
//!
//! Field names match the backend's JSON exactly; every list endpoint wraps its
//! payload in [`Records`].

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

pub const MAX_UPLOADS: u64 = 2_000_000;
pub const MAX_AGE: u32 = 100;
pub const MAX_TEXT_LEN: usize = 100;
pub const MAX_BATCH_ITEMS: usize = 500;
pub const MAX_SIMULATION_STEP: u64 = 200_000;

/// `{ "records": [...] }` envelope used by list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Records<T> {
    pub records: Vec<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawChannelSample {
    pub youtuber: String,
    pub uploads: i64,
    pub category: Option<String>,
    pub country: Option<String>,
    pub subscribers: f64,
    pub highest_yearly_earnings: f64,
    pub subscribers_for_last_30_days: Option<f64>,
    pub created_year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedChannelSample {
    pub youtuber: String,
    pub uploads: i64,
    pub category: String,
    pub country: String,
    pub age: f64,
    pub subscribers: f64,
    pub highest_yearly_earnings: f64,
    pub growth_target: f64,
}

// =============================================================================
// Prediction
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionPayload {
    pub uploads: u64,
    pub category: String,
    pub country: String,
    pub age: u32,
}

impl PredictionPayload {
    pub fn new(uploads: u64, category: &str, country: &str, age: u32) -> Self {
        Self {
            uploads,
            category: category.to_string(),
            country: country.to_string(),
            age,
        }
    }

    /// Trimmed copy, checked against the backend's request bounds.
    pub fn normalized(&self) -> Result<Self, ApiError> {
        let out = Self {
            uploads: self.uploads,
            category: self.category.trim().to_string(),
            country: self.country.trim().to_string(),
            age: self.age,
        };
        check_uploads("uploads", out.uploads)?;
        check_text("category", &out.category)?;
        check_text("country", &out.country)?;
        check_age(out.age)?;
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub predicted_subscribers: f64,
    pub predicted_earnings: f64,
    pub predicted_growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub count: usize,
    pub avg_predicted_subscribers: f64,
    pub avg_predicted_earnings: f64,
    pub avg_predicted_growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchPredictionResponse {
    pub records: Vec<PredictionResult>,
    pub summary: BatchSummary,
}

// =============================================================================
// Simulation
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationRequest {
    pub category: String,
    pub country: String,
    pub age: u32,
    pub start_uploads: u64,
    pub end_uploads: u64,
    pub step: u64,
}

impl SimulationRequest {
    pub fn normalized(&self) -> Result<Self, ApiError> {
        let out = Self {
            category: self.category.trim().to_string(),
            country: self.country.trim().to_string(),
            ..self.clone()
        };
        check_text("category", &out.category)?;
        check_text("country", &out.country)?;
        check_age(out.age)?;
        check_uploads("start_uploads", out.start_uploads)?;
        check_uploads("end_uploads", out.end_uploads)?;
        if out.end_uploads < out.start_uploads {
            return Err(ApiError::InvalidInput(
                "end_uploads must be >= start_uploads".to_string(),
            ));
        }
        if out.step == 0 || out.step > MAX_SIMULATION_STEP {
            return Err(ApiError::InvalidInput(format!(
                "step must be in [1, {}], got {}",
                MAX_SIMULATION_STEP, out.step
            )));
        }
        Ok(out)
    }

    pub fn payload_at(&self, uploads: u64) -> PredictionPayload {
        PredictionPayload {
            uploads,
            category: self.category.clone(),
            country: self.country.clone(),
            age: self.age,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationPoint {
    pub uploads: u64,
    #[serde(flatten)]
    pub prediction: PredictionResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResponse {
    pub input: SimulationRequest,
    pub points: Vec<SimulationPoint>,
    pub best_uploads_by_growth: u64,
    pub best_uploads_by_earnings: u64,
}

// =============================================================================
// Recommendation
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationCluster {
    pub cluster_id: i64,
    pub archetype: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub prediction: PredictionResult,
    pub cluster: RecommendationCluster,
    pub risk_level: RiskLevel,
    pub recommendations: Vec<String>,
}

// =============================================================================
// Model introspection
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportanceTarget {
    Subscribers,
    Earnings,
    Growth,
}

impl ImportanceTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportanceTarget::Subscribers => "subscribers",
            ImportanceTarget::Earnings => "earnings",
            ImportanceTarget::Growth => "growth",
        }
    }
}

impl std::str::FromStr for ImportanceTarget {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "subscribers" => Ok(ImportanceTarget::Subscribers),
            "earnings" => Ok(ImportanceTarget::Earnings),
            "growth" => Ok(ImportanceTarget::Growth),
            other => Err(ApiError::InvalidInput(format!("unknown importance target '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportanceRecord {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportanceResponse {
    pub target: ImportanceTarget,
    pub records: Vec<FeatureImportanceRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftCheckRequest {
    pub items: Vec<PredictionPayload>,
    pub z_threshold: f64,
    pub min_category_frequency: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftRecord {
    pub index: usize,
    pub warnings: Vec<String>,
    pub severity: DriftSeverity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftSummary {
    pub total_records: usize,
    pub high_severity_records: usize,
    pub is_drift_risk: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriftCheckResponse {
    pub summary: DriftSummary,
    pub records: Vec<DriftRecord>,
}

// =============================================================================
// Reference tables and analytics
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterRecord {
    pub cluster_id: i64,
    pub archetype: String,
    pub size: u64,
    pub avg_uploads: f64,
    pub avg_subscribers: f64,
    pub avg_earnings: f64,
    pub avg_growth: f64,
    pub dominant_category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryMetricRecord {
    pub country: String,
    pub abbreviation: String,
    pub total_subscribers: f64,
    pub total_earnings: f64,
    pub dominant_category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPerformanceRecord {
    pub category: String,
    pub channel_count: u64,
    pub avg_subscribers: f64,
    pub avg_earnings: f64,
    pub avg_growth: f64,
    pub total_subscribers: f64,
    pub total_earnings: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadGrowthBucketRecord {
    pub upload_bucket: String,
    pub channel_count: u64,
    pub avg_growth: f64,
    pub avg_earnings: f64,
    pub avg_subscribers: f64,
}

// =============================================================================
// Probes
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    NotReady { missing: Vec<String> },
}

/// JSON form of the `/ready` body: `{"status": "not_ready", "missing": [...]}`.
#[derive(Deserialize)]
struct ReadinessBody {
    status: String,
    #[serde(default)]
    missing: Vec<String>,
}

impl Readiness {
    /// Parse the body of `/ready`, either JSON `{status, missing}` or plain text
    /// (`ready` or `not_ready missing=a,b`).
    pub fn from_body(body: &str) -> Self {
        let body = body.trim();
        if let Ok(parsed) = serde_json::from_str::<ReadinessBody>(body) {
            return if parsed.status == "ready" {
                Readiness::Ready
            } else {
                Readiness::NotReady { missing: parsed.missing }
            };
        }
        if body == "ready" {
            return Readiness::Ready;
        }
        let missing = body
            .split_once("missing=")
            .map(|(_, list)| {
                list.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Readiness::NotReady { missing }
    }
}

fn check_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.is_empty() {
        return Err(ApiError::InvalidInput(format!("{} must not be empty", field)));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(ApiError::InvalidInput(format!(
            "{} must be at most {} characters",
            field, MAX_TEXT_LEN
        )));
    }
    Ok(())
}

fn check_uploads(field: &str, value: u64) -> Result<(), ApiError> {
    if value > MAX_UPLOADS {
        return Err(ApiError::InvalidInput(format!(
            "{} must be at most {}, got {}",
            field, MAX_UPLOADS, value
        )));
    }
    Ok(())
}

fn check_age(age: u32) -> Result<(), ApiError> {
    if age > MAX_AGE {
        return Err(ApiError::InvalidInput(format!("age must be in [0, {}], got {}", MAX_AGE, age)));
    }
    Ok(())
}
