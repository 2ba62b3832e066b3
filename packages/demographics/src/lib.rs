#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! ACS ZIP demographic data loading and normalization.
//!
//! Reads the wide-format ZIP Code Tabulation Area export, normalizes it into
//! [`zip_market_demographics_models::ZipRecord`] values, and caches the
//! normalized table next to the source so later runs skip the
//! recomputation. The resulting [`dataset::DemographicDataset`] is shared
//! read-only through a [`loader::DatasetHandle`].

pub mod dataset;
pub mod loader;
pub mod normalize;
pub mod table;

use std::path::PathBuf;

use thiserror::Error;

pub use dataset::{CoordinateIndex, DemographicDataset};
pub use loader::{DatasetHandle, DatasetPaths, load_dataset};
pub use normalize::NormalizeError;

/// Errors that can occur while loading the demographic dataset.
#[derive(Debug, Error)]
pub enum DataError {
    /// The raw source file does not exist.
    #[error("Demographic data not available at {}", path.display())]
    Unavailable {
        /// Path that was expected to hold the raw export.
        path: PathBuf,
    },

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The table could not be normalized.
    #[error("Normalization error: {0}")]
    Normalize(#[from] NormalizeError),
}
