//! Cached loading of the demographic dataset.
//!
//! The raw export is normalized on first use and the canonical table is
//! written to a cache file. Later loads read the cache when it is newer
//! than the raw source.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::SystemTime;

use zip_market_demographics_models::DatasetStatus;

use crate::DataError;
use crate::dataset::DemographicDataset;
use crate::normalize::{normalize, to_canonical_table};
use crate::table::RawTable;

/// Environment variable overriding the raw export path.
pub const RAW_PATH_ENV: &str = "ZIP_MARKET_RAW_PATH";

/// Environment variable overriding the normalized cache path.
pub const CACHE_PATH_ENV: &str = "ZIP_MARKET_CACHE_PATH";

/// Default raw export location, relative to the working directory.
pub const DEFAULT_RAW_PATH: &str = "ACSData/demographic_data.csv";

/// Default cache location, relative to the working directory.
pub const DEFAULT_CACHE_PATH: &str = "ACSData/demographic_data.normalized.csv";

/// Where the raw export and its normalized cache live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    /// Raw wide-format CSV export.
    pub raw: PathBuf,
    /// Normalized canonical CSV cache.
    pub cache: PathBuf,
}

impl DatasetPaths {
    #[must_use]
    pub fn new(raw: impl Into<PathBuf>, cache: impl Into<PathBuf>) -> Self {
        Self {
            raw: raw.into(),
            cache: cache.into(),
        }
    }
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Whether the cache exists and was written after the raw source changed.
fn cache_is_fresh(paths: &DatasetPaths) -> bool {
    match (modified(&paths.cache), modified(&paths.raw)) {
        (Some(cache), Some(raw)) => cache > raw,
        _ => false,
    }
}

fn read_cache(path: &Path) -> Result<DemographicDataset, DataError> {
    let table = RawTable::read_csv(path)?;
    Ok(DemographicDataset::from_records(normalize(&table)?))
}

fn write_cache(path: &Path, dataset: &DemographicDataset) -> Result<(), DataError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    to_canonical_table(dataset.records()).write_csv(path)
}

/// Loads the dataset, preferring a fresh cache over the raw export.
///
/// A cache that cannot be read or normalized is ignored and rebuilt. A
/// cache that cannot be written is logged and skipped.
///
/// # Errors
///
/// * [`DataError::Unavailable`] if the raw export does not exist, even when
///   a cache file is present
/// * [`DataError::Io`] or [`DataError::Csv`] if the raw export cannot be read
/// * [`DataError::Normalize`] if the raw export lacks a required column
pub fn load_dataset(paths: &DatasetPaths) -> Result<DemographicDataset, DataError> {
    if !paths.raw.exists() {
        return Err(DataError::Unavailable {
            path: paths.raw.clone(),
        });
    }

    if cache_is_fresh(paths) {
        match read_cache(&paths.cache) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} ZIP codes from cache {}",
                    dataset.len(),
                    paths.cache.display()
                );
                return Ok(dataset);
            }
            Err(e) => {
                log::warn!(
                    "Ignoring unreadable cache {}: {e}",
                    paths.cache.display()
                );
            }
        }
    }

    log::info!("Normalizing raw data from {}", paths.raw.display());
    let table = RawTable::read_csv(&paths.raw)?;
    let dataset = DemographicDataset::from_records(normalize(&table)?);

    match write_cache(&paths.cache, &dataset) {
        Ok(()) => log::info!("Wrote cache {}", paths.cache.display()),
        Err(e) => log::warn!("Failed to write cache {}: {e}", paths.cache.display()),
    }

    Ok(dataset)
}

/// Lazily loaded, process-wide dataset.
///
/// The first [`DatasetHandle::get`] loads under the lock; concurrent first
/// callers wait and then share the same [`Arc`]. Failed loads are not
/// remembered, so a later call retries.
#[derive(Debug)]
pub struct DatasetHandle {
    paths: DatasetPaths,
    dataset: Mutex<Option<Arc<DemographicDataset>>>,
}

impl DatasetHandle {
    #[must_use]
    pub const fn new(paths: DatasetPaths) -> Self {
        Self {
            paths,
            dataset: Mutex::new(None),
        }
    }

    /// Returns the shared dataset, loading it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`DataError`] if loading fails. The failure is not cached.
    pub fn get(&self) -> Result<Arc<DemographicDataset>, DataError> {
        let mut guard = self.dataset.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(dataset) = guard.as_ref() {
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(load_dataset(&self.paths)?);
        *guard = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Whether a dataset is currently held.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.dataset
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Status of the held dataset without triggering a load.
    #[must_use]
    pub fn status(&self) -> DatasetStatus {
        self.dataset
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or_else(
                || DatasetStatus {
                    loaded: false,
                    zip_codes: 0,
                    zip_codes_with_coordinates: 0,
                    total_population: 0,
                    sample: Vec::new(),
                },
                |dataset| dataset.status(),
            )
    }
}
