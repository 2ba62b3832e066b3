//! In-memory ZIP dataset and coordinate lookup.

use std::collections::BTreeMap;

use zip_market_demographics_models::{DatasetStatus, ZipRecord, ZipSample};

/// Number of records included in [`DemographicDataset::status`] samples.
const STATUS_SAMPLE_SIZE: usize = 5;

/// Normalized records in source order, keyed by ZIP code.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DemographicDataset {
    records: Vec<ZipRecord>,
    by_zip: BTreeMap<String, usize>,
}

impl DemographicDataset {
    /// Builds a dataset, keeping the first record for any repeated ZIP
    /// code.
    #[must_use]
    pub fn from_records(records: Vec<ZipRecord>) -> Self {
        let mut by_zip = BTreeMap::new();
        let mut kept = Vec::with_capacity(records.len());

        for record in records {
            if by_zip.contains_key(&record.zip_code) {
                continue;
            }
            by_zip.insert(record.zip_code.clone(), kept.len());
            kept.push(record);
        }

        Self {
            records: kept,
            by_zip,
        }
    }

    /// All records in source order.
    #[must_use]
    pub fn records(&self) -> &[ZipRecord] {
        &self.records
    }

    /// Looks up a record by ZIP code.
    #[must_use]
    pub fn get(&self, zip_code: &str) -> Option<&ZipRecord> {
        self.by_zip.get(zip_code).map(|&idx| &self.records[idx])
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of every record's population.
    #[must_use]
    pub fn total_population(&self) -> u64 {
        self.records.iter().map(|r| r.population).sum()
    }

    /// Diagnostic snapshot: counts plus the first few records.
    #[must_use]
    pub fn status(&self) -> DatasetStatus {
        DatasetStatus {
            loaded: true,
            zip_codes: self.len(),
            zip_codes_with_coordinates: self
                .records
                .iter()
                .filter(|r| r.coordinates().is_some())
                .count(),
            total_population: self.total_population(),
            sample: self
                .records
                .iter()
                .take(STATUS_SAMPLE_SIZE)
                .map(ZipSample::from)
                .collect(),
        }
    }
}

/// ZIP code to `(latitude, longitude)` for records with both coordinates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateIndex {
    coordinates: BTreeMap<String, (f64, f64)>,
}

impl CoordinateIndex {
    /// Projects coordinates out of the dataset.
    #[must_use]
    pub fn build(dataset: &DemographicDataset) -> Self {
        let coordinates: BTreeMap<_, _> = dataset
            .records()
            .iter()
            .filter_map(|r| r.coordinates().map(|c| (r.zip_code.clone(), c)))
            .collect();

        log::debug!(
            "Indexed coordinates for {}/{} ZIP codes",
            coordinates.len(),
            dataset.len()
        );

        Self { coordinates }
    }

    #[must_use]
    pub fn get(&self, zip_code: &str) -> Option<(f64, f64)> {
        self.coordinates.get(zip_code).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }
}
