//! Pareto-style population concentration.
//!
//! Ranks matched ZIP codes by population and finds the smallest leading
//! group that still stays within a share of the total. The cut keeps only
//! ZIP codes whose running total is `<=` the threshold, so the prefix can
//! fall short of the requested share by up to one ZIP code's population.

use zip_market_analytics_models::{
    Concentration, DemographicSummary, InvalidFilterValue, ZipRow,
};

use crate::AnalyticsError;
use crate::filter::MatchedZip;

/// Which population figure to rank by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PopulationField {
    /// Total residents.
    #[default]
    Population,
    /// Estimated matching residents from weighted filtering.
    TargetPopulation,
}

impl PopulationField {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value(self, matched: &MatchedZip<'_>) -> f64 {
        match self {
            Self::Population => matched.record.population as f64,
            Self::TargetPopulation => matched.target_population,
        }
    }
}

/// Mean of the present values, or `None` if none is present.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean_present(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0_usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Mean median age, median income and college fraction.
#[must_use]
pub fn summarize(records: &[MatchedZip<'_>]) -> DemographicSummary {
    DemographicSummary {
        avg_median_age: mean_present(records.iter().map(|m| m.record.median_age)),
        avg_median_income: mean_present(records.iter().map(|m| m.record.median_income)),
        avg_college_degree_pct: mean_present(
            records.iter().map(|m| m.record.college_degree_pct),
        ),
    }
}

fn row(matched: &MatchedZip<'_>) -> ZipRow {
    let record = matched.record;
    ZipRow {
        zip_code: record.zip_code.clone(),
        population: record.population,
        target_population: matched.target_population,
        median_age: record.median_age,
        median_income: record.median_income,
        college_degree_pct: record.college_degree_pct,
        state: record.state.clone(),
    }
}

/// Ranks records by `field` (descending, ties in input order) and takes
/// the longest prefix whose cumulative total stays within
/// `total * share`.
///
/// # Errors
///
/// * [`AnalyticsError::InvalidFilter`] if `share` is not in `(0, 1]`
/// * [`AnalyticsError::EmptyResult`] if there are no records or their
///   total is zero
#[allow(clippy::cast_precision_loss)]
pub fn concentration(
    records: &[MatchedZip<'_>],
    field: PopulationField,
    share: f64,
) -> Result<Concentration, AnalyticsError> {
    if !(share > 0.0 && share <= 1.0) {
        return Err(InvalidFilterValue::new(
            "share",
            format!("must be greater than 0 and at most 1 (got {share})"),
        )
        .into());
    }

    let total: f64 = records.iter().map(|m| field.value(m)).sum();
    if records.is_empty() || total <= 0.0 {
        return Err(AnalyticsError::EmptyResult);
    }

    let mut ranked: Vec<&MatchedZip<'_>> = records.iter().collect();
    ranked.sort_by(|a, b| field.value(b).total_cmp(&field.value(a)));

    let threshold = total * share;
    let mut cumulative = 0.0;
    let prefix_count = ranked
        .iter()
        .take_while(|m| {
            cumulative += field.value(m);
            cumulative <= threshold
        })
        .count();

    let mut rows: Vec<ZipRow> = ranked.iter().map(|m| row(m)).collect();
    let rest = rows.split_off(prefix_count);

    log::debug!(
        "{prefix_count}/{} ZIP codes hold {:.0}% of {total:.0} residents",
        records.len(),
        share * 100.0
    );

    Ok(Concentration {
        share,
        prefix: rows,
        prefix_count,
        total_population: total,
        total_zip_codes: records.len(),
        zip_code_share_pct: prefix_count as f64 / records.len() as f64 * 100.0,
        summary: summarize(records),
        rest,
    })
}
