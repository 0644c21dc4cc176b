//! Client-side aggregation over processed channel samples.
//!
//! Used when the backend has no analytics endpoints (older deployments) or cannot be
//! reached. Output order never depends on input order.

use std::collections::BTreeMap;

use crate::logging::log_aggregate;
use crate::models::{CategoryPerformanceRecord, ProcessedChannelSample, UploadGrowthBucketRecord};

pub const UPLOAD_BUCKET_ORDER: [&str; 5] = ["0-100", "101-500", "501-2k", "2k-10k", "10k+"];

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    count: u64,
    subscribers: f64,
    earnings: f64,
    growth: f64,
}

impl Accumulator {
    fn add(&mut self, row: &ProcessedChannelSample) {
        self.count += 1;
        self.subscribers += row.subscribers;
        self.earnings += row.highest_yearly_earnings;
        self.growth += row.growth_target;
    }

    fn avg(&self, sum: f64) -> f64 {
        sum / self.count.max(1) as f64
    }
}

/// Blank categories are reported as "Unknown".
pub fn normalize_category(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        "Unknown".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Index into [`UPLOAD_BUCKET_ORDER`]. Upper bounds are inclusive; negatives count as zero.
pub fn upload_bucket_index(uploads: i64) -> usize {
    match uploads.max(0) {
        0..=100 => 0,
        101..=500 => 1,
        501..=2000 => 2,
        2001..=10000 => 3,
        _ => 4,
    }
}

pub fn upload_bucket(uploads: i64) -> &'static str {
    UPLOAD_BUCKET_ORDER[upload_bucket_index(uploads)]
}

/// Per-category totals and averages, largest total subscribers first, cut to `top_n`.
pub fn category_performance(
    rows: &[ProcessedChannelSample],
    top_n: usize,
) -> Vec<CategoryPerformanceRecord> {
    let mut grouped: BTreeMap<String, Accumulator> = BTreeMap::new();
    for row in rows {
        grouped.entry(normalize_category(&row.category)).or_default().add(row);
    }

    let mut out: Vec<CategoryPerformanceRecord> = grouped
        .into_iter()
        .map(|(category, acc)| CategoryPerformanceRecord {
            category,
            channel_count: acc.count,
            avg_subscribers: acc.avg(acc.subscribers),
            avg_earnings: acc.avg(acc.earnings),
            avg_growth: acc.avg(acc.growth),
            total_subscribers: acc.subscribers,
            total_earnings: acc.earnings,
        })
        .collect();

    // Stable sort over name-ordered groups: ties stay alphabetical.
    out.sort_by(|a, b| b.total_subscribers.total_cmp(&a.total_subscribers));
    out.truncate(top_n);

    log_aggregate("category_performance", rows.len(), out.len());
    out
}

/// Per-bucket averages in fixed bucket order. Empty buckets are omitted.
pub fn upload_growth_buckets(rows: &[ProcessedChannelSample]) -> Vec<UploadGrowthBucketRecord> {
    let mut buckets = [Accumulator::default(); 5];
    for row in rows {
        buckets[upload_bucket_index(row.uploads)].add(row);
    }

    let out: Vec<UploadGrowthBucketRecord> = buckets
        .iter()
        .zip(UPLOAD_BUCKET_ORDER)
        .filter(|(acc, _)| acc.count > 0)
        .map(|(acc, label)| UploadGrowthBucketRecord {
            upload_bucket: label.to_string(),
            channel_count: acc.count,
            avg_growth: acc.avg(acc.growth),
            avg_earnings: acc.avg(acc.earnings),
            avg_subscribers: acc.avg(acc.subscribers),
        })
        .collect();

    log_aggregate("upload_growth_buckets", rows.len(), out.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        name: &str,
        category: &str,
        uploads: i64,
        subs: f64,
        earn: f64,
        growth: f64,
    ) -> ProcessedChannelSample {
        ProcessedChannelSample {
            youtuber: name.to_string(),
            uploads,
            category: category.to_string(),
            country: "India".to_string(),
            age: 5.0,
            subscribers: subs,
            highest_yearly_earnings: earn,
            growth_target: growth,
        }
    }

    fn fixture() -> Vec<ProcessedChannelSample> {
        vec![
            row("a", "Music", 50, 100.0, 10.0, 1.0),
            row("b", "Gaming", 600, 300.0, 30.0, 3.0),
            row("c", "Music", 12000, 200.0, 20.0, 5.0),
            row("d", "  ", 101, 40.0, 4.0, 2.0),
            row("e", "Gaming", 2000, 10.0, 1.0, 9.0),
            row("f", "Education", -5, 60.0, 6.0, 4.0),
        ]
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(upload_bucket(0), "0-100");
        assert_eq!(upload_bucket(-7), "0-100");
        assert_eq!(upload_bucket(100), "0-100");
        assert_eq!(upload_bucket(101), "101-500");
        assert_eq!(upload_bucket(500), "101-500");
        assert_eq!(upload_bucket(501), "501-2k");
        assert_eq!(upload_bucket(2000), "501-2k");
        assert_eq!(upload_bucket(2001), "2k-10k");
        assert_eq!(upload_bucket(10000), "2k-10k");
        assert_eq!(upload_bucket(10001), "10k+");
    }

    #[test]
    fn test_category_totals_and_averages() {
        let out = category_performance(&fixture(), 10);
        let names: Vec<&str> = out.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(names, vec!["Gaming", "Music", "Education", "Unknown"]);

        let music = out.iter().find(|r| r.category == "Music").unwrap();
        assert_eq!(music.channel_count, 2);
        assert_eq!(music.total_subscribers, 300.0);
        assert_eq!(music.total_earnings, 30.0);
        assert_eq!(music.avg_subscribers, 150.0);
        assert_eq!(music.avg_growth, 3.0);

        for rec in &out {
            assert_eq!(rec.avg_subscribers, rec.total_subscribers / rec.channel_count as f64);
            assert_eq!(rec.avg_earnings, rec.total_earnings / rec.channel_count as f64);
        }
    }

    #[test]
    fn test_category_top_n_truncates() {
        let out = category_performance(&fixture(), 2);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].category, "Gaming");
        assert!(category_performance(&[], 5).is_empty());
    }

    #[test]
    fn test_category_ties_do_not_depend_on_input_order() {
        let mut rows = vec![
            row("a", "Sports", 1, 50.0, 1.0, 1.0),
            row("b", "Comedy", 1, 50.0, 1.0, 1.0),
        ];
        let first = category_performance(&rows, 5);
        rows.reverse();
        assert_eq!(first, category_performance(&rows, 5));
        assert_eq!(first[0].category, "Comedy");
    }

    #[test]
    fn test_buckets_follow_fixed_order() {
        let mut rows = fixture();
        let forward = upload_growth_buckets(&rows);
        rows.reverse();
        let backward = upload_growth_buckets(&rows);
        assert_eq!(forward, backward);

        let labels: Vec<&str> = forward.iter().map(|r| r.upload_bucket.as_str()).collect();
        assert_eq!(labels, vec!["0-100", "101-500", "501-2k", "10k+"]);

        let low = &forward[0];
        assert_eq!(low.channel_count, 2);
        assert_eq!(low.avg_subscribers, 80.0);
        assert_eq!(low.avg_growth, 2.5);

        let mid = &forward[2];
        assert_eq!(mid.channel_count, 2);
        assert_eq!(mid.avg_growth, 6.0);
    }
}
