//! Demographic segmentation with k-means.
//!
//! ZIP codes are clustered on median age, median income and college degree
//! share. Features are z-score standardized so that income does not
//! dominate the distance. Seeding uses k-means++ from a fixed seed, so the
//! same input always yields the same segments.

use std::collections::BTreeSet;

use linfa::Dataset;
use linfa::prelude::*;
use linfa_clustering::{KMeans, KMeansInit};
use linfa_nn::distance::L2Dist;
use linfa_preprocessing::linear_scaling::LinearScaler;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use zip_market_analytics_models::{ClusterAssignment, ClusterSummary, Segmentation};

use crate::AnalyticsError;
use crate::concentration::mean_present;
use crate::filter::MatchedZip;

const SEED: u64 = 42;
const RESTARTS: usize = 10;
const MAX_ITERATIONS: u64 = 300;
const TOLERANCE: f64 = 1e-4;
const MIN_CLUSTERS: usize = 2;
const MAX_CLUSTERS: usize = 5;
const SAMPLE_SIZE: usize = 5;

const NUM_FEATURES: usize = 3;
type Point = [f64; NUM_FEATURES];

/// `[median_age, median_income, college_degree_pct]`, when all are known.
fn features(matched: &MatchedZip<'_>) -> Option<Point> {
    let record = matched.record;
    Some([
        record.median_age?,
        record.median_income?,
        record.college_degree_pct?,
    ])
}

/// Number of clusters for `n` records: one per ten, between 2 and 5.
#[must_use]
pub const fn cluster_count(n: usize) -> usize {
    let k = n / 10;
    if k < MIN_CLUSTERS {
        MIN_CLUSTERS
    } else if k > MAX_CLUSTERS {
        MAX_CLUSTERS
    } else {
        k
    }
}

fn clustering_error(e: impl std::fmt::Display) -> AnalyticsError {
    AnalyticsError::Clustering {
        message: e.to_string(),
    }
}

/// Number of distinct feature rows. k-means++ cannot seed more centroids
/// than this.
fn distinct_points(points: &[Point]) -> usize {
    points
        .iter()
        .map(|p| p.map(f64::to_bits))
        .collect::<BTreeSet<_>>()
        .len()
}

/// Z-scores each column. Columns without variance become 0.
fn standardize(features: Array2<f64>) -> Result<Array2<f64>, AnalyticsError> {
    let dataset = Dataset::new(features.clone(), Array1::<usize>::zeros(features.nrows()));
    let scaler = LinearScaler::<f64>::standard()
        .fit(&dataset)
        .map_err(clustering_error)?;
    let scaled: Array2<f64> = scaler.transform(features);
    Ok(scaled.mapv(|v| if v.is_finite() { v } else { 0.0 }))
}

/// Best of several k-means++ seeded runs, by inertia.
fn kmeans(features: &Array2<f64>, k: usize) -> Result<Vec<usize>, AnalyticsError> {
    let dataset = Dataset::new(features.clone(), Array1::<usize>::zeros(features.nrows()));
    let model = KMeans::params_with(k, StdRng::seed_from_u64(SEED), L2Dist)
        .n_runs(RESTARTS)
        .max_n_iterations(MAX_ITERATIONS)
        .tolerance(TOLERANCE)
        .init_method(KMeansInit::KMeansPlusPlus)
        .fit(&dataset)
        .map_err(clustering_error)?;
    let labels: Array1<usize> = model.predict(features);
    Ok(labels.to_vec())
}

/// Clusters matched ZIP codes into demographic segments.
///
/// Records missing median age, median income or college share are left
/// out. Summaries report mean population, age (years), income (dollars)
/// and college share (percent), plus up to five member ZIP codes in input
/// order. Clusters that end up without members are omitted from
/// `clusters` but still counted in `total_clusters`.
///
/// # Errors
///
/// * [`AnalyticsError::InsufficientData`] if fewer than two records can be
///   clustered
/// * [`AnalyticsError::Clustering`] if scaling or fitting fails
#[allow(clippy::cast_precision_loss)]
pub fn segment(records: &[MatchedZip<'_>]) -> Result<Segmentation, AnalyticsError> {
    let (members, points): (Vec<&MatchedZip<'_>>, Vec<Point>) = records
        .iter()
        .filter_map(|m| features(m).map(|p| (m, p)))
        .unzip();

    if members.len() < 2 {
        return Err(AnalyticsError::InsufficientData {
            found: members.len(),
        });
    }

    let k = cluster_count(members.len());
    let fitted = k.min(distinct_points(&points));
    let labels = if fitted < MIN_CLUSTERS {
        vec![0; members.len()]
    } else {
        kmeans(&standardize(Array2::from(points))?, fitted)?
    };

    log::debug!(
        "Clustered {} of {} ZIP codes into {k} segments",
        members.len(),
        records.len()
    );

    let clusters = (0..k)
        .filter_map(|cluster_id| {
            let in_cluster: Vec<&MatchedZip<'_>> = members
                .iter()
                .zip(&labels)
                .filter(|(_, label)| **label == cluster_id)
                .map(|(m, _)| *m)
                .collect();

            if in_cluster.is_empty() {
                return None;
            }

            let mean = |value: fn(&MatchedZip<'_>) -> Option<f64>| {
                mean_present(in_cluster.iter().map(|m| value(m))).unwrap_or_default()
            };

            Some(ClusterSummary {
                cluster_id,
                zip_codes_count: in_cluster.len(),
                avg_population: mean(|m| Some(m.record.population as f64)),
                avg_median_age: mean(|m| m.record.median_age),
                avg_median_income: mean(|m| m.record.median_income),
                avg_college_degree_pct: mean(|m| m.record.college_degree_pct) * 100.0,
                sample_zip_codes: in_cluster
                    .iter()
                    .take(SAMPLE_SIZE)
                    .map(|m| m.record.zip_code.clone())
                    .collect(),
            })
        })
        .collect();

    let assignments: ClusterAssignment = members
        .iter()
        .zip(&labels)
        .map(|(m, label)| (m.record.zip_code.clone(), *label))
        .collect();

    Ok(Segmentation {
        total_clusters: k,
        clusters,
        total_zip_codes: members.len(),
        assignments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::record;
    use zip_market_demographics_models::ZipRecord;

    fn profile(zip: &str, age: f64, income: f64, college: f64) -> ZipRecord {
        let mut r = record(zip, 1000);
        r.median_age = Some(age);
        r.median_income = Some(income);
        r.college_degree_pct = Some(college);
        r
    }

    fn two_groups() -> Vec<ZipRecord> {
        (0..20_u32)
            .map(|i| {
                let jitter = f64::from(i % 10);
                if i < 10 {
                    profile(&format!("1{i:04}"), 25.0 + jitter * 0.1, 30_000.0 + jitter * 100.0, 0.1)
                } else {
                    profile(&format!("2{i:04}"), 60.0 + jitter * 0.1, 150_000.0 + jitter * 100.0, 0.7)
                }
            })
            .collect()
    }

    #[test]
    fn cluster_count_is_bounded() {
        assert_eq!(cluster_count(2), 2);
        assert_eq!(cluster_count(19), 2);
        assert_eq!(cluster_count(35), 3);
        assert_eq!(cluster_count(50), 5);
        assert_eq!(cluster_count(5000), 5);
    }

    #[test]
    fn separates_distinct_groups() {
        let records = two_groups();
        let matched: Vec<_> = records.iter().map(MatchedZip::whole).collect();
        let result = segment(&matched).unwrap();

        assert_eq!(result.total_clusters, 2);
        assert_eq!(result.total_zip_codes, 20);
        assert_eq!(result.clusters.len(), 2);

        let young = result.assignments["10000"];
        let old = result.assignments["20010"];
        assert_ne!(young, old);
        for (zip, cluster) in &result.assignments {
            let expected = if zip.starts_with('1') { young } else { old };
            assert_eq!(*cluster, expected, "{zip}");
        }

        for cluster in &result.clusters {
            assert_eq!(cluster.zip_codes_count, 10);
            assert_eq!(cluster.sample_zip_codes.len(), 5);
        }
    }

    #[test]
    fn reports_college_share_as_percent() {
        let records = two_groups();
        let matched: Vec<_> = records.iter().map(MatchedZip::whole).collect();
        let result = segment(&matched).unwrap();
        let mut shares: Vec<_> = result
            .clusters
            .iter()
            .map(|c| c.avg_college_degree_pct)
            .collect();
        shares.sort_by(f64::total_cmp);
        assert!((shares[0] - 10.0).abs() < 1e-9);
        assert!((shares[1] - 70.0).abs() < 1e-9);
    }

    #[test]
    fn is_reproducible() {
        let records: Vec<_> = (0..40_u32)
            .map(|i| {
                let x = f64::from(i * 7 % 13);
                profile(&format!("{i:05}"), 20.0 + x * 3.0, 20_000.0 + x * 9_000.0, x / 13.0)
            })
            .collect();
        let matched: Vec<_> = records.iter().map(MatchedZip::whole).collect();
        assert_eq!(segment(&matched).unwrap(), segment(&matched).unwrap());
    }

    #[test]
    fn skips_records_missing_features() {
        let mut records = two_groups();
        records.push(record("99999", 5000));
        let matched: Vec<_> = records.iter().map(MatchedZip::whole).collect();
        let result = segment(&matched).unwrap();
        assert_eq!(result.total_zip_codes, 20);
        assert!(!result.assignments.contains_key("99999"));
    }

    #[test]
    fn needs_two_clusterable_records() {
        let records = vec![profile("00001", 30.0, 50_000.0, 0.3), record("00002", 10)];
        let matched: Vec<_> = records.iter().map(MatchedZip::whole).collect();
        assert!(matches!(
            segment(&matched),
            Err(AnalyticsError::InsufficientData { found: 1 })
        ));
    }

    #[test]
    fn fewer_profiles_than_clusters() {
        let records: Vec<_> = (0..50_u32)
            .map(|i| {
                let x = f64::from(i % 3);
                profile(&format!("{i:05}"), 30.0 + x * 10.0, 40_000.0 + x * 20_000.0, 0.2)
            })
            .collect();
        let matched: Vec<_> = records.iter().map(MatchedZip::whole).collect();
        let result = segment(&matched).unwrap();
        assert_eq!(result.total_clusters, 5);
        assert_eq!(result.clusters.len(), 3);
        assert_eq!(result.assignments["00000"], result.assignments["00003"]);
        assert_ne!(result.assignments["00000"], result.assignments["00001"]);
    }

    #[test]
    fn constant_features_do_not_fail() {
        let records: Vec<_> = (0..4)
            .map(|i| profile(&format!("{i:05}"), 40.0, 60_000.0, 0.3))
            .collect();
        let matched: Vec<_> = records.iter().map(MatchedZip::whole).collect();
        let result = segment(&matched).unwrap();
        assert_eq!(result.total_zip_codes, 4);
        assert_eq!(result.assignments.len(), 4);
        assert_eq!(result.clusters.len(), 1);
        assert_eq!(result.clusters[0].zip_codes_count, 4);
    }
}
