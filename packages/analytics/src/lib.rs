#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Market-sizing analyses over the ZIP demographic dataset.
//!
//! Every analysis starts from the full in-memory dataset, narrows it with
//! the [`filter`] engine, and then either ranks the matches by population
//! ([`concentration`]) or groups them into demographic segments
//! ([`segment`]). [`report`] shapes the results for presentation.

pub mod concentration;
pub mod filter;
pub mod report;
pub mod segment;

use thiserror::Error;
use zip_market_analytics_models::InvalidFilterValue;

pub use concentration::{PopulationField, concentration};
pub use filter::{MatchedZip, filter_predicate, filter_weighted};
pub use segment::segment;

/// Errors that can occur during an analysis.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// No record matched, or the matches have no population.
    #[error("No data matches the selected filters")]
    EmptyResult,

    /// Too few records to cluster.
    #[error("Insufficient data: found {found} clusterable ZIP codes, need at least 2")]
    InsufficientData {
        /// Number of usable records.
        found: usize,
    },

    /// Feature scaling or k-means fitting failed.
    #[error("Clustering failed: {message}")]
    Clustering {
        /// Description of what went wrong.
        message: String,
    },

    /// A filter tag or bound failed validation.
    #[error(transparent)]
    InvalidFilter(#[from] InvalidFilterValue),

    /// The requested ZIP code is not in the dataset.
    #[error("ZIP code {zip_code} not found")]
    ZipNotFound {
        /// The ZIP code that was requested.
        zip_code: String,
    },
}
