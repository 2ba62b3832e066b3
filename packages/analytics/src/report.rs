//! Presentation shaping: rounding, coordinate joins, and top-N tables.

use zip_market_analytics_models::{
    Concentration, ConcentrationReport, DemographicSummary, EthnicityBreakdown, Export, ExportRow,
    MapZip, MarketMap, PrefixReport, ReportZip, Segmentation, ZipProfile, ZipRow,
};
use zip_market_demographics::{CoordinateIndex, DemographicDataset};
use zip_market_demographics_models::{Race, ZipRecord};

use crate::AnalyticsError;
use crate::concentration::{PopulationField, concentration};
use crate::filter::MatchedZip;

/// Number of rows in the top ZIP code table.
pub const TOP_TABLE_SIZE: usize = 20;

/// Default number of map markers.
pub const DEFAULT_MAP_LIMIT: usize = 1000;

/// Rounds half away from zero to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Truncates a population estimate to whole people.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_people(value: f64) -> u64 {
    value as u64
}

fn percent(value: Option<f64>) -> Option<f64> {
    value.map(|pct| round_to(pct, 1))
}

fn fraction_as_percent(value: Option<f64>) -> Option<f64> {
    value.map(|fraction| round_to(fraction * 100.0, 1))
}

/// Exports every matched record as a flat, rounded row.
#[must_use]
pub fn export_rows(records: &[MatchedZip<'_>]) -> Export {
    let data: Vec<ExportRow> = records
        .iter()
        .map(|m| {
            let record = m.record;
            ExportRow {
                zip_code: record.zip_code.clone(),
                population: record.population,
                state: record.state.clone(),
                latitude: record.latitude,
                longitude: record.longitude,
                median_age: record.median_age.map(|age| round_to(age, 1)),
                median_income: record.median_income.map(|income| round_to(income, 0)),
                white_pct: percent(record.race(Race::White)),
                black_pct: percent(record.race(Race::Black)),
                hispanic_pct: percent(record.hispanic_pct),
                asian_pct: percent(record.race(Race::Asian)),
                college_degree_pct: fraction_as_percent(record.college_degree_pct),
            }
        })
        .collect();

    log::info!("Exported {} ZIP codes", data.len());

    Export {
        total_records: data.len(),
        data,
    }
}

fn profile(record: &ZipRecord) -> ZipProfile {
    ZipProfile {
        zip_code: record.zip_code.clone(),
        population: record.population,
        state: record.state.clone(),
        median_age: record.median_age.map(|age| round_to(age, 1)),
        median_income: record.median_income.map(f64::trunc),
        ethnicity: EthnicityBreakdown {
            white: percent(record.race(Race::White)),
            black: percent(record.race(Race::Black)),
            hispanic: percent(record.hispanic_pct),
            asian: percent(record.race(Race::Asian)),
        },
        college_degree_pct: fraction_as_percent(record.college_degree_pct),
    }
}

/// Demographics of a single ZIP code.
///
/// # Errors
///
/// Returns [`AnalyticsError::ZipNotFound`] if the ZIP code is not in the
/// dataset.
pub fn zip_profile(
    dataset: &DemographicDataset,
    zip_code: &str,
) -> Result<ZipProfile, AnalyticsError> {
    dataset
        .get(zip_code.trim())
        .map(profile)
        .ok_or_else(|| AnalyticsError::ZipNotFound {
            zip_code: zip_code.to_string(),
        })
}

fn report_zip(row: &ZipRow, coordinates: &CoordinateIndex) -> ReportZip {
    let coords = coordinates.get(&row.zip_code);
    ReportZip {
        zip_code: row.zip_code.clone(),
        population: row.population,
        median_age: row.median_age,
        median_income: row.median_income,
        latitude: coords.map(|c| c.0),
        longitude: coords.map(|c| c.1),
    }
}

fn rounded_summary(summary: &DemographicSummary) -> DemographicSummary {
    DemographicSummary {
        avg_median_age: summary.avg_median_age.map(|age| round_to(age, 1)),
        avg_median_income: summary.avg_median_income.map(f64::trunc),
        avg_college_degree_pct: fraction_as_percent(summary.avg_college_degree_pct),
    }
}

fn shape(result: &Concentration, coordinates: &CoordinateIndex) -> ConcentrationReport {
    ConcentrationReport {
        total_market_size: whole_people(result.total_population),
        total_zip_codes: result.total_zip_codes,
        share_pct: round_to(result.share * 100.0, 1),
        concentrated: PrefixReport {
            zip_codes_count: result.prefix_count,
            population_percentage: round_to(result.zip_code_share_pct, 1),
            zip_codes: result
                .prefix
                .iter()
                .map(|row| report_zip(row, coordinates))
                .collect(),
        },
        top_zip_codes: result
            .top(TOP_TABLE_SIZE)
            .map(|row| report_zip(row, coordinates))
            .collect(),
        demographic_summary: rounded_summary(&result.summary),
    }
}

/// Population concentration at `share`, with coordinates and a top-20
/// table.
///
/// # Errors
///
/// See [`concentration`].
pub fn concentration_report(
    records: &[MatchedZip<'_>],
    coordinates: &CoordinateIndex,
    share: f64,
) -> Result<ConcentrationReport, AnalyticsError> {
    let result = concentration(records, PopulationField::Population, share)?;
    Ok(shape(&result, coordinates))
}

/// ZIP codes holding half of the matched population.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyResult`] if nothing matched.
pub fn top_half_report(
    records: &[MatchedZip<'_>],
    coordinates: &CoordinateIndex,
) -> Result<ConcentrationReport, AnalyticsError> {
    concentration_report(records, coordinates, 0.5)
}

/// ZIP codes holding 80% of the matched population.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyResult`] if nothing matched.
pub fn eighty_twenty_report(
    records: &[MatchedZip<'_>],
    coordinates: &CoordinateIndex,
) -> Result<ConcentrationReport, AnalyticsError> {
    concentration_report(records, coordinates, 0.8)
}

/// Weighted target-population map.
///
/// Ranks `records` by target population and emits a marker for each of
/// the top `limit` ZIP codes that have coordinates, along with the number
/// of ZIP codes needed to reach 50% and 80% of the target population.
///
/// # Errors
///
/// Returns [`AnalyticsError::EmptyResult`] if nothing matched.
pub fn market_map(
    records: &[MatchedZip<'_>],
    coordinates: &CoordinateIndex,
    limit: usize,
) -> Result<MarketMap, AnalyticsError> {
    let half = concentration(records, PopulationField::TargetPopulation, 0.5)?;
    let eighty = concentration(records, PopulationField::TargetPopulation, 0.8)?;

    let zip_codes: Vec<MapZip> = half
        .top(limit)
        .filter_map(|row| {
            let (latitude, longitude) = coordinates.get(&row.zip_code)?;
            Some(MapZip {
                zip_code: row.zip_code.clone(),
                latitude,
                longitude,
                population: whole_people(row.target_population),
                state: row.state.clone(),
            })
        })
        .collect();

    log::info!(
        "Market map: {} markers, {}/{} ZIP codes hold half of {:.0} target residents",
        zip_codes.len(),
        half.prefix_count,
        records.len(),
        half.total_population
    );

    Ok(MarketMap {
        total_zip_codes: zip_codes.len(),
        zip_codes,
        total_population: whole_people(half.total_population),
        fifty_percent_population: whole_people(half.total_population * 0.5),
        top_50_percent_zip_count: half.prefix_count,
        top_80_percent_zip_count: eighty.prefix_count,
        top_zip_count: half.top(limit).count(),
        total_matching_zip_codes: records.len(),
    })
}

/// Rounds cluster summaries for presentation: population and income to
/// whole units, age and college share to one decimal.
#[must_use]
pub fn rounded_segmentation(segmentation: &Segmentation) -> Segmentation {
    let mut rounded = segmentation.clone();
    for cluster in &mut rounded.clusters {
        cluster.avg_population = cluster.avg_population.trunc();
        cluster.avg_median_age = round_to(cluster.avg_median_age, 1);
        cluster.avg_median_income = cluster.avg_median_income.trunc();
        cluster.avg_college_degree_pct = round_to(cluster.avg_college_degree_pct, 1);
    }
    rounded
}
