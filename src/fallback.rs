//! Deterministic stand-ins for backend responses.
//!
//! Every function here is pure and shaped exactly like the live endpoint it replaces,
//! so callers cannot tell synthetic data from real data by structure.

use crate::models::{
    BatchPredictionResponse, BatchSummary, ClusterRecord, CountryMetricRecord, DriftCheckResponse,
    DriftRecord, DriftSeverity, DriftSummary, FeatureImportanceRecord, FeatureImportanceResponse,
    ImportanceTarget, PredictionPayload, PredictionResult, ProcessedChannelSample, RawChannelSample,
    RecommendationCluster, RecommendationResponse, RiskLevel, SimulationPoint, SimulationRequest,
    SimulationResponse,
};

pub const MAX_FEATURE_IMPORTANCE: usize = 50;

/// Year the seed channel ages are measured from.
const SEED_REFERENCE_YEAR: i32 = 2023;

const CATEGORY_FACTORS: &[(&str, f64)] = &[
    ("Music", 1.35),
    ("Entertainment", 1.25),
    ("Gaming", 1.15),
    ("Film & Animation", 1.1),
    ("Comedy", 1.08),
    ("Education", 1.05),
    ("People & Blogs", 1.0),
    ("Shows", 0.98),
    ("Howto & Style", 0.95),
    ("Science & Technology", 0.92),
    ("Sports", 0.9),
    ("Pets & Animals", 0.88),
    ("News & Politics", 0.85),
    ("Autos & Vehicles", 0.82),
    ("Nonprofits & Activism", 0.8),
    ("Travel & Events", 0.78),
];

const COUNTRY_FACTORS: &[(&str, f64)] = &[
    ("India", 1.3),
    ("United States", 1.2),
    ("Brazil", 1.05),
    ("United Kingdom", 1.0),
    ("Indonesia", 0.98),
    ("South Korea", 0.97),
    ("Canada", 0.96),
    ("Mexico", 0.95),
    ("Japan", 0.92),
    ("Philippines", 0.9),
    ("Russia", 0.9),
    ("Thailand", 0.88),
    ("Spain", 0.87),
    ("Argentina", 0.86),
    ("Pakistan", 0.84),
];

struct SeedChannel {
    youtuber: &'static str,
    uploads: i64,
    category: &'static str,
    country: &'static str,
    age: u32,
    subscribers: f64,
    earnings: f64,
    growth: f64,
}

static SEED_CHANNELS: [SeedChannel; 12] = [
    SeedChannel {
        youtuber: "T-Series",
        uploads: 20082,
        category: "Music",
        country: "India",
        age: 17,
        subscribers: 245_000_000.0,
        earnings: 108_400_000.0,
        growth: 2_000_000.0,
    },
    SeedChannel {
        youtuber: "MrBeast",
        uploads: 741,
        category: "Entertainment",
        country: "United States",
        age: 11,
        subscribers: 166_000_000.0,
        earnings: 64_700_000.0,
        growth: 8_000_000.0,
    },
    SeedChannel {
        youtuber: "Cocomelon - Nursery Rhymes",
        uploads: 966,
        category: "Education",
        country: "United States",
        age: 17,
        subscribers: 162_000_000.0,
        earnings: 94_800_000.0,
        growth: 1_000_000.0,
    },
    SeedChannel {
        youtuber: "SET India",
        uploads: 116_536,
        category: "Shows",
        country: "India",
        age: 18,
        subscribers: 159_000_000.0,
        earnings: 87_700_000.0,
        growth: 1_500_000.0,
    },
    SeedChannel {
        youtuber: "Kids Diana Show",
        uploads: 1111,
        category: "People & Blogs",
        country: "United States",
        age: 8,
        subscribers: 112_000_000.0,
        earnings: 22_900_000.0,
        growth: 400_000.0,
    },
    SeedChannel {
        youtuber: "PewDiePie",
        uploads: 4716,
        category: "Gaming",
        country: "Japan",
        age: 13,
        subscribers: 111_000_000.0,
        earnings: 2_400_000.0,
        growth: 50_000.0,
    },
    SeedChannel {
        youtuber: "Like Nastya",
        uploads: 493,
        category: "People & Blogs",
        country: "Russia",
        age: 7,
        subscribers: 106_000_000.0,
        earnings: 16_500_000.0,
        growth: 100_000.0,
    },
    SeedChannel {
        youtuber: "Vlad and Niki",
        uploads: 574,
        category: "Entertainment",
        country: "United States",
        age: 5,
        subscribers: 98_900_000.0,
        earnings: 26_000_000.0,
        growth: 600_000.0,
    },
    SeedChannel {
        youtuber: "Zee Music Company",
        uploads: 8548,
        category: "Music",
        country: "India",
        age: 9,
        subscribers: 96_700_000.0,
        earnings: 15_300_000.0,
        growth: 1_100_000.0,
    },
    SeedChannel {
        youtuber: "WWE",
        uploads: 70_127,
        category: "Sports",
        country: "United States",
        age: 16,
        subscribers: 96_000_000.0,
        earnings: 49_000_000.0,
        growth: 600_000.0,
    },
    SeedChannel {
        youtuber: "BLACKPINK",
        uploads: 543,
        category: "People & Blogs",
        country: "South Korea",
        age: 7,
        subscribers: 89_800_000.0,
        earnings: 15_400_000.0,
        growth: 200_000.0,
    },
    SeedChannel {
        youtuber: "Goldmines",
        uploads: 3201,
        category: "Film & Animation",
        country: "India",
        age: 11,
        subscribers: 86_900_000.0,
        earnings: 30_900_000.0,
        growth: 400_000.0,
    },
];

fn factor(table: &[(&str, f64)], key: &str) -> f64 {
    table
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, f)| *f)
        .unwrap_or(1.0)
}

// =============================================================================
// Prediction family
// =============================================================================

pub fn predict(payload: &PredictionPayload) -> PredictionResult {
    let uploads = payload.uploads as f64;
    let age = payload.age as f64;
    let category_factor = factor(CATEGORY_FACTORS, &payload.category);
    let country_factor = factor(COUNTRY_FACTORS, &payload.country);

    let base_subscribers = uploads * 4200.0 + age * 185_000.0 + 1_250_000.0;
    let predicted_subscribers = (base_subscribers * category_factor * country_factor)
        .max(50_000.0)
        .round();
    let predicted_earnings = (predicted_subscribers * 0.085 + uploads * 140.0).max(500.0).round();
    let predicted_growth = (predicted_subscribers * 0.0022 + uploads * 1.8).max(200.0).round();

    PredictionResult {
        predicted_subscribers,
        predicted_earnings,
        predicted_growth,
    }
}

pub fn predict_batch(items: &[PredictionPayload]) -> BatchPredictionResponse {
    let records: Vec<PredictionResult> = items.iter().map(predict).collect();
    let n = records.len().max(1) as f64;
    let sum = |f: fn(&PredictionResult) -> f64| records.iter().map(f).sum::<f64>();

    let summary = BatchSummary {
        count: records.len(),
        avg_predicted_subscribers: sum(|r| r.predicted_subscribers) / n,
        avg_predicted_earnings: sum(|r| r.predicted_earnings) / n,
        avg_predicted_growth: sum(|r| r.predicted_growth) / n,
    };
    BatchPredictionResponse { records, summary }
}

pub fn simulate(request: &SimulationRequest) -> SimulationResponse {
    let step = request.step.max(1);
    let mut points = Vec::new();
    let mut uploads = request.start_uploads;
    while uploads <= request.end_uploads {
        points.push(SimulationPoint {
            uploads,
            prediction: predict(&request.payload_at(uploads)),
        });
        match uploads.checked_add(step) {
            Some(next) => uploads = next,
            None => break,
        }
    }

    let best_by = |metric: fn(&PredictionResult) -> f64| {
        let mut best: Option<&SimulationPoint> = None;
        for point in &points {
            if best.map_or(true, |b| metric(&point.prediction) > metric(&b.prediction)) {
                best = Some(point);
            }
        }
        best.map(|p| p.uploads).unwrap_or(request.start_uploads)
    };
    let best_uploads_by_growth = best_by(|r| r.predicted_growth);
    let best_uploads_by_earnings = best_by(|r| r.predicted_earnings);

    SimulationResponse {
        input: request.clone(),
        points,
        best_uploads_by_growth,
        best_uploads_by_earnings,
    }
}

pub fn risk_level(payload: &PredictionPayload) -> RiskLevel {
    if payload.age >= 12 || payload.uploads < 80 {
        RiskLevel::High
    } else if payload.uploads < 250 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

fn advice(payload: &PredictionPayload, prediction: &PredictionResult) -> Vec<String> {
    let mut out = Vec::new();
    if payload.uploads < 200 {
        out.push("Increase publishing cadence with a consistent weekly release plan.".to_string());
    }
    if prediction.predicted_growth < 50_000.0 {
        out.push(
            "Prioritize retention-focused video formats and stronger first-minute hooks.".to_string(),
        );
    }
    if prediction.predicted_earnings < 1_000_000.0 {
        out.push(
            "Expand monetization mix with sponsorship tiers and affiliate bundles.".to_string(),
        );
    }
    if payload.age < 2 {
        out.push(
            "Use collaboration and shorts strategy to accelerate early channel discovery.".to_string(),
        );
    }
    if out.is_empty() {
        out.push(
            "Maintain current content velocity and optimize around top-performing content pillars.".to_string(),
        );
    }
    out
}

pub fn recommend(payload: &PredictionPayload) -> RecommendationResponse {
    let prediction = predict(payload);
    let clusters = cluster_summary();
    let cluster = clusters
        .iter()
        .find(|c| c.dominant_category == payload.category)
        .unwrap_or(&clusters[0]);

    RecommendationResponse {
        prediction,
        cluster: RecommendationCluster {
            cluster_id: cluster.cluster_id,
            archetype: cluster.archetype.clone(),
        },
        risk_level: risk_level(payload),
        recommendations: advice(payload, &prediction),
    }
}

// =============================================================================
// Model introspection
// =============================================================================

fn importance_table(target: ImportanceTarget) -> &'static [(&'static str, f64)] {
    match target {
        ImportanceTarget::Subscribers => &[
            ("age", 0.312),
            ("uploads", 0.221),
            ("category_Music", 0.094),
            ("country_India", 0.081),
            ("category_Entertainment", 0.067),
            ("country_United States", 0.058),
            ("category_Gaming", 0.041),
            ("category_Education", 0.034),
            ("category_People & Blogs", 0.029),
            ("country_Brazil", 0.022),
            ("category_Film & Animation", 0.018),
            ("country_United Kingdom", 0.012),
        ],
        ImportanceTarget::Earnings => &[
            ("uploads", 0.284),
            ("age", 0.246),
            ("country_United States", 0.103),
            ("category_Entertainment", 0.078),
            ("category_Music", 0.071),
            ("category_Education", 0.052),
            ("country_India", 0.047),
            ("category_Shows", 0.031),
            ("category_Gaming", 0.026),
            ("country_United Kingdom", 0.019),
            ("category_Sports", 0.015),
            ("country_Brazil", 0.011),
        ],
        ImportanceTarget::Growth => &[
            ("uploads", 0.297),
            ("age", 0.188),
            ("category_Entertainment", 0.112),
            ("country_India", 0.086),
            ("category_Music", 0.073),
            ("country_United States", 0.061),
            ("category_Gaming", 0.044),
            ("category_People & Blogs", 0.037),
            ("category_Education", 0.028),
            ("country_Brazil", 0.021),
            ("category_Comedy", 0.016),
            ("country_Indonesia", 0.013),
        ],
    }
}

pub fn feature_importance(target: ImportanceTarget, top_n: usize) -> FeatureImportanceResponse {
    let records = importance_table(target)
        .iter()
        .take(top_n.clamp(1, MAX_FEATURE_IMPORTANCE))
        .map(|(feature, importance)| FeatureImportanceRecord {
            feature: feature.to_string(),
            importance: *importance,
        })
        .collect();
    FeatureImportanceResponse { target, records }
}

/// All-clear drift report: one low-severity record per item.
pub fn drift_check(items: &[PredictionPayload]) -> DriftCheckResponse {
    let records = (0..items.len())
        .map(|index| DriftRecord {
            index,
            warnings: Vec::new(),
            severity: DriftSeverity::Low,
        })
        .collect();
    DriftCheckResponse {
        summary: DriftSummary {
            total_records: items.len(),
            high_severity_records: 0,
            is_drift_risk: false,
        },
        records,
    }
}

// =============================================================================
// Reference tables
// =============================================================================

pub fn cluster_summary() -> Vec<ClusterRecord> {
    let row = |cluster_id,
               archetype: &str,
               size,
               avg_uploads,
               avg_subscribers,
               avg_earnings,
               avg_growth,
               dominant: &str| {
        ClusterRecord {
            cluster_id,
            archetype: archetype.to_string(),
            size,
            avg_uploads,
            avg_subscribers,
            avg_earnings,
            avg_growth,
            dominant_category: dominant.to_string(),
        }
    };
    vec![
        row(
            0,
            "Viral entertainers",
            212,
            1850.0,
            38_500_000.0,
            9_800_000.0,
            820_000.0,
            "Entertainment",
        ),
        row(
            1,
            "High earning low upload",
            164,
            420.0,
            24_100_000.0,
            12_600_000.0,
            310_000.0,
            "Music",
        ),
        row(
            2,
            "High upload low growth",
            301,
            14_800.0,
            17_900_000.0,
            2_900_000.0,
            95_000.0,
            "People & Blogs",
        ),
        row(
            3,
            "Consistent educators",
            318,
            960.0,
            15_200_000.0,
            3_400_000.0,
            160_000.0,
            "Education",
        ),
    ]
}

pub fn country_metrics() -> Vec<CountryMetricRecord> {
    let row = |country: &str,
               abbreviation: &str,
               total_subscribers,
               total_earnings,
               dominant: &str| {
        CountryMetricRecord {
            country: country.to_string(),
            abbreviation: abbreviation.to_string(),
            total_subscribers,
            total_earnings,
            dominant_category: dominant.to_string(),
        }
    };
    vec![
        row("United States", "US", 9_150_000_000.0, 2_430_000_000.0, "Entertainment"),
        row("India", "IN", 4_980_000_000.0, 1_610_000_000.0, "Music"),
        row("Brazil", "BR", 1_190_000_000.0, 262_000_000.0, "Music"),
        row("United Kingdom", "GB", 918_000_000.0, 241_000_000.0, "Entertainment"),
        row("Mexico", "MX", 705_000_000.0, 149_000_000.0, "Entertainment"),
        row("Indonesia", "ID", 653_000_000.0, 118_000_000.0, "Gaming"),
    ]
}

// =============================================================================
// Samples
// =============================================================================

/// Seed row `i` of an endless repetition; repeats get a ` #k` suffix.
fn seed_at(i: usize) -> (&'static SeedChannel, String) {
    let seed = &SEED_CHANNELS[i % SEED_CHANNELS.len()];
    let round = i / SEED_CHANNELS.len();
    let name = if round == 0 {
        seed.youtuber.to_string()
    } else {
        format!("{} #{}", seed.youtuber, round + 1)
    };
    (seed, name)
}

pub fn processed_sample(limit: usize) -> Vec<ProcessedChannelSample> {
    (0..limit)
        .map(|i| {
            let (seed, youtuber) = seed_at(i);
            ProcessedChannelSample {
                youtuber,
                uploads: seed.uploads,
                category: seed.category.to_string(),
                country: seed.country.to_string(),
                age: seed.age as f64,
                subscribers: seed.subscribers,
                highest_yearly_earnings: seed.earnings,
                growth_target: seed.growth,
            }
        })
        .collect()
}

pub fn raw_sample(limit: usize) -> Vec<RawChannelSample> {
    (0..limit)
        .map(|i| {
            let (seed, youtuber) = seed_at(i);
            RawChannelSample {
                youtuber,
                uploads: seed.uploads,
                category: Some(seed.category.to_string()),
                country: Some(seed.country.to_string()),
                subscribers: seed.subscribers,
                highest_yearly_earnings: seed.earnings,
                subscribers_for_last_30_days: Some(seed.growth),
                created_year: Some(SEED_REFERENCE_YEAR - seed.age as i32),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn payload(uploads: u64, category: &str, country: &str, age: u32) -> PredictionPayload {
        PredictionPayload::new(uploads, category, country, age)
    }

    #[test]
    fn test_predict_formula() {
        let r = predict(&payload(100, "Education", "United States", 5));
        let subs = ((100.0 * 4200.0 + 5.0 * 185_000.0 + 1_250_000.0) * 1.05 * 1.2_f64).round();
        assert_eq!(r.predicted_subscribers, subs);
        assert_eq!(r.predicted_earnings, (subs * 0.085 + 100.0 * 140.0).round());
        assert_eq!(r.predicted_growth, (subs * 0.0022 + 100.0 * 1.8).round());
    }

    #[test]
    fn test_predict_unknown_lookup_defaults_to_one() {
        let r = predict(&payload(0, "Cooking", "Atlantis", 0));
        assert_eq!(r.predicted_subscribers, 1_250_000.0);
        assert_eq!(r.predicted_earnings, (1_250_000.0_f64 * 0.085).round());
        assert_eq!(r.predicted_growth, 2750.0);
    }

    #[test]
    fn test_batch_summary_is_mean() {
        let items = vec![
            payload(10, "Music", "India", 2),
            payload(900, "Gaming", "Japan", 9),
            payload(5000, "Sports", "Brazil", 20),
        ];
        let out = predict_batch(&items);
        assert_eq!(out.summary.count, 3);
        let mean = out.records.iter().map(|r| r.predicted_subscribers).sum::<f64>() / 3.0;
        assert_eq!(out.summary.avg_predicted_subscribers, mean);

        let empty = predict_batch(&[]);
        assert_eq!(empty.summary.count, 0);
        assert_eq!(empty.summary.avg_predicted_growth, 0.0);
    }

    #[test]
    fn test_simulation_points() {
        let req = SimulationRequest {
            category: "Education".into(),
            country: "United States".into(),
            age: 5,
            start_uploads: 100,
            end_uploads: 1000,
            step: 100,
        };
        let out = simulate(&req);
        let uploads: Vec<u64> = out.points.iter().map(|p| p.uploads).collect();
        assert_eq!(uploads, (1..=10).map(|i| i * 100).collect::<Vec<_>>());
        for point in &out.points {
            assert_eq!(point.prediction, predict(&req.payload_at(point.uploads)));
        }
        // Monotone in uploads, so the last point wins both.
        assert_eq!(out.best_uploads_by_growth, 1000);
        assert_eq!(out.best_uploads_by_earnings, 1000);
        assert_eq!(out.input, req);
    }

    #[test]
    fn test_simulation_single_point_range() {
        let req = SimulationRequest {
            category: "x".into(),
            country: "y".into(),
            age: 0,
            start_uploads: 3,
            end_uploads: 3,
            step: 5,
        };
        let out = simulate(&req);
        assert_eq!(out.points.len(), 1);
        assert_eq!(out.best_uploads_by_growth, 3);
        assert_eq!(out.best_uploads_by_earnings, 3);
    }

    #[test]
    fn test_risk_levels() {
        assert_eq!(risk_level(&payload(500, "Music", "India", 12)), RiskLevel::High);
        assert_eq!(risk_level(&payload(79, "Music", "India", 3)), RiskLevel::High);
        assert_eq!(risk_level(&payload(80, "Music", "India", 3)), RiskLevel::Medium);
        assert_eq!(risk_level(&payload(249, "Music", "India", 11)), RiskLevel::Medium);
        assert_eq!(risk_level(&payload(250, "Music", "India", 11)), RiskLevel::Low);
    }

    #[test]
    fn test_recommend_maps_cluster_by_category() {
        let r = recommend(&payload(300, "Education", "India", 4));
        assert_eq!(r.cluster.cluster_id, 3);
        assert_eq!(r.cluster.archetype, "Consistent educators");
        assert_eq!(r.prediction, predict(&payload(300, "Education", "India", 4)));
        assert!(!r.recommendations.is_empty());

        let r = recommend(&payload(300, "Cooking", "India", 1));
        assert_eq!(r.cluster.cluster_id, 0);
        assert!(r.recommendations.iter().any(|s| s.contains("early channel discovery")));
    }

    #[test]
    fn test_feature_importance_truncates() {
        let out = feature_importance(ImportanceTarget::Growth, 3);
        assert_eq!(out.target, ImportanceTarget::Growth);
        assert_eq!(out.records.len(), 3);
        assert_eq!(out.records[0].feature, "uploads");
        assert_eq!(feature_importance(ImportanceTarget::Earnings, 0).records.len(), 1);
        for target in [ImportanceTarget::Subscribers, ImportanceTarget::Earnings, ImportanceTarget::Growth] {
            let recs = feature_importance(target, 50).records;
            assert!(recs.windows(2).all(|w| w[0].importance >= w[1].importance));
        }
    }

    #[test]
    fn test_drift_all_clear() {
        let items = vec![payload(1, "Music", "India", 1); 4];
        let out = drift_check(&items);
        assert_eq!(out.summary.total_records, 4);
        assert!(!out.summary.is_drift_risk);
        assert!(out.records.iter().all(|r| r.severity == DriftSeverity::Low && r.warnings.is_empty()));
        assert_eq!(out.records[3].index, 3);
    }

    #[test]
    fn test_cluster_table_is_fixed() {
        let clusters = cluster_summary();
        assert_eq!(clusters.len(), 4);
        let ids: Vec<i64> = clusters.iter().map(|c| c.cluster_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(country_metrics().len(), 6);
    }

    #[test]
    fn test_processed_sample_first_round_unsuffixed() {
        let rows = processed_sample(12);
        assert_eq!(rows.len(), 12);
        let names: HashSet<&str> = rows.iter().map(|r| r.youtuber.as_str()).collect();
        assert_eq!(names.len(), 12);
        assert!(rows.iter().all(|r| !r.youtuber.contains(" #")));
    }

    #[test]
    fn test_processed_sample_repeats_with_suffix() {
        let rows = processed_sample(30);
        assert_eq!(rows.len(), 30);
        assert_eq!(rows[12].youtuber, "T-Series #2");
        assert_eq!(rows[24].youtuber, "T-Series #3");
        assert_eq!(rows[13].uploads, rows[1].uploads);
        let names: HashSet<&str> = rows.iter().map(|r| r.youtuber.as_str()).collect();
        assert_eq!(names.len(), 30);
        assert!(processed_sample(0).is_empty());
    }

    #[test]
    fn test_raw_sample_mirrors_seed() {
        let rows = raw_sample(3);
        assert_eq!(rows[0].youtuber, "T-Series");
        assert_eq!(rows[0].created_year, Some(2006));
        assert_eq!(rows[1].category.as_deref(), Some("Entertainment"));
    }
}
