#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Market sizing over ACS ZIP code demographics.
//!
//! ```text
//! zip_market zip 10001
//! zip_market top-half --age 30-39 --ethnicity asian,hispanic
//! zip_market concentration --share 0.8 --min-income 75000
//! zip_market clusters --min-age 30 --max-age 45
//! zip_market export --filters filters.json
//! zip_market map --age 60+ --income over-200k --limit 500
//! zip_market status
//! ```
//!
//! Every command prints JSON to stdout. Results that simply found nothing
//! (no matching ZIP codes, too few to cluster, invalid filters, unknown ZIP
//! code) print `{"error": ...}` and exit with status 2. A missing data
//! source is a hard failure.

mod args;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;
use zip_market_analytics::report::{
    DEFAULT_MAP_LIMIT, concentration_report, export_rows, market_map, rounded_segmentation,
    top_half_report, zip_profile,
};
use zip_market_analytics::{AnalyticsError, filter_predicate, filter_weighted, segment};
use zip_market_analytics_models::{
    ConcentrationReport, Export, FilterCriteria, FilterParams, MarketMap, Segmentation, ZipProfile,
};
use zip_market_demographics::loader::{
    CACHE_PATH_ENV, DEFAULT_CACHE_PATH, DEFAULT_RAW_PATH, RAW_PATH_ENV,
};
use zip_market_demographics::{
    CoordinateIndex, DataError, DatasetHandle, DatasetPaths, DemographicDataset,
};
use zip_market_demographics_models::DatasetStatus;

use crate::args::FilterArgs;

/// Exit status for analyses that ran but produced no usable result.
const EXPECTED_FAILURE_EXIT_CODE: i32 = 2;

#[derive(Parser)]
#[command(
    name = "zip_market",
    about = "Size demographic markets across U.S. ZIP codes"
)]
struct Cli {
    /// Raw ACS ZIP demographic CSV export
    #[arg(long, global = true, env = RAW_PATH_ENV, default_value = DEFAULT_RAW_PATH)]
    raw: PathBuf,

    /// Normalized cache written next to the raw export
    #[arg(long, global = true, env = CACHE_PATH_ENV, default_value = DEFAULT_CACHE_PATH)]
    cache: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show demographics for a single ZIP code
    Zip {
        /// Five-digit ZIP code
        zip_code: String,
    },
    /// ZIP codes holding half of the matching population
    TopHalf {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// ZIP codes holding a share of the matching population
    Concentration {
        #[command(flatten)]
        filters: FilterArgs,
        /// Share of the population to cover (0-1]
        #[arg(long, default_value_t = 0.8)]
        share: f64,
    },
    /// Group matching ZIP codes into demographic segments
    Clusters {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Export matching ZIP codes as flat rows
    Export {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Estimate target population per ZIP code for map display
    Map {
        #[command(flatten)]
        filters: FilterArgs,
        /// Maximum number of map markers
        #[arg(long, default_value_t = DEFAULT_MAP_LIMIT)]
        limit: usize,
    },
    /// Load the dataset and report what was loaded
    Status,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Output {
    Profile(ZipProfile),
    Concentration(ConcentrationReport),
    Segmentation(Segmentation),
    Export(Export),
    Map(MarketMap),
    Status(DatasetStatus),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

fn criteria(params: &FilterParams) -> Result<FilterCriteria, AnalyticsError> {
    Ok(FilterCriteria::from_params(params)?)
}

fn run(
    dataset: &DemographicDataset,
    command: Commands,
    params: Option<FilterParams>,
) -> Result<Output, AnalyticsError> {
    let params = params.unwrap_or_default();

    Ok(match command {
        Commands::Zip { zip_code } => Output::Profile(zip_profile(dataset, &zip_code)?),
        Commands::TopHalf { .. } => {
            let matched = filter_predicate(dataset, &criteria(&params)?);
            Output::Concentration(top_half_report(&matched, &CoordinateIndex::build(dataset))?)
        }
        Commands::Concentration { share, .. } => {
            let matched = filter_predicate(dataset, &criteria(&params)?);
            Output::Concentration(concentration_report(
                &matched,
                &CoordinateIndex::build(dataset),
                share,
            )?)
        }
        Commands::Clusters { .. } => {
            let matched = filter_predicate(dataset, &criteria(&params)?);
            Output::Segmentation(rounded_segmentation(&segment(&matched)?))
        }
        Commands::Export { .. } => {
            let matched = filter_predicate(dataset, &criteria(&params)?);
            if matched.is_empty() {
                return Err(AnalyticsError::EmptyResult);
            }
            Output::Export(export_rows(&matched))
        }
        Commands::Map { limit, .. } => {
            let matched = filter_weighted(dataset, &criteria(&params)?);
            Output::Map(market_map(
                &matched,
                &CoordinateIndex::build(dataset),
                limit,
            )?)
        }
        Commands::Status => Output::Status(dataset.status()),
    })
}

fn print_json(value: &impl Serialize) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let handle = DatasetHandle::new(DatasetPaths::new(cli.raw, cli.cache));

    let params = match &cli.command {
        Commands::TopHalf { filters }
        | Commands::Concentration { filters, .. }
        | Commands::Clusters { filters }
        | Commands::Export { filters }
        | Commands::Map { filters, .. } => Some(filters.to_params()?),
        Commands::Zip { .. } | Commands::Status => None,
    };

    let dataset = match handle.get() {
        Ok(dataset) => dataset,
        Err(DataError::Unavailable { path }) if matches!(cli.command, Commands::Status) => {
            log::warn!("No demographic data at {}", path.display());
            print_json(&handle.status())?;
            return Ok(());
        }
        Err(e) => {
            log::error!("Failed to load demographic data: {e}");
            return Err(e.into());
        }
    };

    match run(&dataset, cli.command, params) {
        Ok(output) => print_json(&output)?,
        Err(e) => {
            log::warn!("{e}");
            print_json(&ErrorBody {
                error: e.to_string(),
            })?;
            std::process::exit(EXPECTED_FAILURE_EXIT_CODE);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;
    use zip_market_demographics::normalize::normalize;
    use zip_market_demographics::table::RawTable;

    fn dataset() -> DemographicDataset {
        let csv = "zcta,population,lat,lng,age_30s,race_asian\n\
                   10001,5000,40.75,-73.99,30,20\n\
                   10002,3000,40.71,-73.98,10,40\n\
                   10003,1000,,,50,0\n";
        let table = RawTable::from_reader(csv.as_bytes()).unwrap();
        DemographicDataset::from_records(normalize(&table).unwrap())
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_filter_flags() {
        let cli = Cli::try_parse_from([
            "zip_market",
            "map",
            "--age",
            "30-39,40-49",
            "--min-income",
            "50000",
            "--limit",
            "10",
        ])
        .unwrap();
        let Commands::Map { filters, limit } = cli.command else {
            panic!("expected map command");
        };
        assert_eq!(filters.age, vec!["30-39", "40-49"]);
        assert_eq!(filters.min_income, Some(50_000.0));
        assert_eq!(limit, 10);
    }

    #[test]
    fn zip_profile_output() {
        let output = run(
            &dataset(),
            Commands::Zip {
                zip_code: "10002".to_string(),
            },
            None,
        )
        .unwrap();
        let Output::Profile(profile) = output else {
            panic!("expected profile");
        };
        assert_eq!(profile.population, 3000);
        assert_eq!(profile.ethnicity.asian, Some(40.0));
    }

    #[test]
    fn invalid_filter_is_expected_failure() {
        let params = FilterParams {
            age: vec!["teens".to_string()],
            ..FilterParams::default()
        };
        let result = run(
            &dataset(),
            Commands::TopHalf {
                filters: FilterArgs::default(),
            },
            Some(params),
        );
        assert!(matches!(result, Err(AnalyticsError::InvalidFilter(_))));
    }

    #[test]
    fn map_weights_by_selected_brackets() {
        let params = FilterParams {
            ethnicity: vec!["asian".to_string()],
            ..FilterParams::default()
        };
        let output = run(
            &dataset(),
            Commands::Map {
                filters: FilterArgs::default(),
                limit: DEFAULT_MAP_LIMIT,
            },
            Some(params),
        )
        .unwrap();
        let Output::Map(map) = output else {
            panic!("expected map");
        };
        assert_eq!(map.total_matching_zip_codes, 2);
        assert_eq!(map.total_population, 2200);
        assert_eq!(map.zip_codes[0].zip_code, "10002");
    }

    #[test]
    fn status_reports_loaded_dataset() {
        let output = run(&dataset(), Commands::Status, None).unwrap();
        let Output::Status(status) = output else {
            panic!("expected status");
        };
        assert!(status.loaded);
        assert_eq!(status.zip_codes, 3);
        assert_eq!(status.zip_codes_with_coordinates, 2);
    }

    #[test]
    fn error_body_serializes() {
        let body = ErrorBody {
            error: AnalyticsError::EmptyResult.to_string(),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"error":"No data matches the selected filters"}"#
        );
    }
}
