#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! ZIP code demographic record types and bracket definitions.
//!
//! These types describe one normalized ZIP Code Tabulation Area (ZCTA) from
//! the ACS demographic export. Bracket enums carry the source column name
//! they are read from and the midpoint used when deriving weighted medians.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Age bucket midpoints (years), in [`AgeBracket::ALL`] order.
pub const AGE_MIDPOINTS: [f64; 9] = [5.0, 15.0, 25.0, 35.0, 45.0, 55.0, 65.0, 75.0, 85.0];

/// Household income bucket midpoints (dollars), in [`IncomeBracket::ALL`]
/// order.
pub const INCOME_MIDPOINTS: [f64; 16] = [
    5_000.0, 12_500.0, 17_500.0, 22_500.0, 27_500.0, 32_500.0, 37_500.0, 42_500.0, 47_500.0,
    55_000.0, 67_500.0, 87_500.0, 112_500.0, 137_500.0, 175_000.0, 250_000.0,
];

/// Age decade bucket, reported as a percentage of a ZIP's population.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum AgeBracket {
    /// Ages 0-9.
    #[serde(rename = "under_10")]
    #[strum(serialize = "under_10")]
    Under10,
    /// Ages 10-19.
    #[serde(rename = "10_to_19")]
    #[strum(serialize = "10_to_19")]
    From10To19,
    /// Ages 20-29.
    #[serde(rename = "20s")]
    #[strum(serialize = "20s")]
    Twenties,
    /// Ages 30-39.
    #[serde(rename = "30s")]
    #[strum(serialize = "30s")]
    Thirties,
    /// Ages 40-49.
    #[serde(rename = "40s")]
    #[strum(serialize = "40s")]
    Forties,
    /// Ages 50-59.
    #[serde(rename = "50s")]
    #[strum(serialize = "50s")]
    Fifties,
    /// Ages 60-69.
    #[serde(rename = "60s")]
    #[strum(serialize = "60s")]
    Sixties,
    /// Ages 70-79.
    #[serde(rename = "70s")]
    #[strum(serialize = "70s")]
    Seventies,
    /// Ages 80 and over.
    #[serde(rename = "over_80")]
    #[strum(serialize = "over_80")]
    Over80,
}

impl AgeBracket {
    /// Every age bracket, youngest first.
    pub const ALL: [Self; 9] = [
        Self::Under10,
        Self::From10To19,
        Self::Twenties,
        Self::Thirties,
        Self::Forties,
        Self::Fifties,
        Self::Sixties,
        Self::Seventies,
        Self::Over80,
    ];

    /// Canonical source column holding this bracket's percentage.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Under10 => "age_under_10",
            Self::From10To19 => "age_10_to_19",
            Self::Twenties => "age_20s",
            Self::Thirties => "age_30s",
            Self::Forties => "age_40s",
            Self::Fifties => "age_50s",
            Self::Sixties => "age_60s",
            Self::Seventies => "age_70s",
            Self::Over80 => "age_over_80",
        }
    }

    /// Representative age for the bracket when deriving a weighted median.
    #[must_use]
    pub const fn midpoint(self) -> f64 {
        AGE_MIDPOINTS[self as usize]
    }
}

/// Household income bucket, reported as a percentage of households.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum IncomeBracket {
    /// Under $10k.
    #[serde(rename = "under_10k")]
    #[strum(serialize = "under_10k")]
    Under10k,
    /// $10k-$15k.
    #[serde(rename = "10k_to_15k")]
    #[strum(serialize = "10k_to_15k")]
    From10kTo15k,
    /// $15k-$20k.
    #[serde(rename = "15k_to_20k")]
    #[strum(serialize = "15k_to_20k")]
    From15kTo20k,
    /// $20k-$25k.
    #[serde(rename = "20k_to_25k")]
    #[strum(serialize = "20k_to_25k")]
    From20kTo25k,
    /// $25k-$30k.
    #[serde(rename = "25k_to_30k")]
    #[strum(serialize = "25k_to_30k")]
    From25kTo30k,
    /// $30k-$35k.
    #[serde(rename = "30k_to_35k")]
    #[strum(serialize = "30k_to_35k")]
    From30kTo35k,
    /// $35k-$40k.
    #[serde(rename = "35k_to_40k")]
    #[strum(serialize = "35k_to_40k")]
    From35kTo40k,
    /// $40k-$45k.
    #[serde(rename = "40k_to_45k")]
    #[strum(serialize = "40k_to_45k")]
    From40kTo45k,
    /// $45k-$50k.
    #[serde(rename = "45k_to_50k")]
    #[strum(serialize = "45k_to_50k")]
    From45kTo50k,
    /// $50k-$60k.
    #[serde(rename = "50k_to_60k")]
    #[strum(serialize = "50k_to_60k")]
    From50kTo60k,
    /// $60k-$75k.
    #[serde(rename = "60k_to_75k")]
    #[strum(serialize = "60k_to_75k")]
    From60kTo75k,
    /// $75k-$100k.
    #[serde(rename = "75k_to_100k")]
    #[strum(serialize = "75k_to_100k")]
    From75kTo100k,
    /// $100k-$125k.
    #[serde(rename = "100k_to_125k")]
    #[strum(serialize = "100k_to_125k")]
    From100kTo125k,
    /// $125k-$150k.
    #[serde(rename = "125k_to_150k")]
    #[strum(serialize = "125k_to_150k")]
    From125kTo150k,
    /// $150k-$200k.
    #[serde(rename = "150k_to_200k")]
    #[strum(serialize = "150k_to_200k")]
    From150kTo200k,
    /// $200k and over.
    #[serde(rename = "over_200k")]
    #[strum(serialize = "over_200k")]
    Over200k,
}

impl IncomeBracket {
    /// Every income bracket, lowest first.
    pub const ALL: [Self; 16] = [
        Self::Under10k,
        Self::From10kTo15k,
        Self::From15kTo20k,
        Self::From20kTo25k,
        Self::From25kTo30k,
        Self::From30kTo35k,
        Self::From35kTo40k,
        Self::From40kTo45k,
        Self::From45kTo50k,
        Self::From50kTo60k,
        Self::From60kTo75k,
        Self::From75kTo100k,
        Self::From100kTo125k,
        Self::From125kTo150k,
        Self::From150kTo200k,
        Self::Over200k,
    ];

    /// The nine brackets below $50k.
    pub const UNDER_50K: [Self; 9] = [
        Self::Under10k,
        Self::From10kTo15k,
        Self::From15kTo20k,
        Self::From20kTo25k,
        Self::From25kTo30k,
        Self::From30kTo35k,
        Self::From35kTo40k,
        Self::From40kTo45k,
        Self::From45kTo50k,
    ];

    /// Canonical source column holding this bracket's percentage.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Under10k => "income_household_under_10k",
            Self::From10kTo15k => "income_household_10k_to_15k",
            Self::From15kTo20k => "income_household_15k_to_20k",
            Self::From20kTo25k => "income_household_20k_to_25k",
            Self::From25kTo30k => "income_household_25k_to_30k",
            Self::From30kTo35k => "income_household_30k_to_35k",
            Self::From35kTo40k => "income_household_35k_to_40k",
            Self::From40kTo45k => "income_household_40k_to_45k",
            Self::From45kTo50k => "income_household_45k_to_50k",
            Self::From50kTo60k => "income_household_50k_to_60k",
            Self::From60kTo75k => "income_household_60k_to_75k",
            Self::From75kTo100k => "income_household_75k_to_100k",
            Self::From100kTo125k => "income_household_100k_to_125k",
            Self::From125kTo150k => "income_household_125k_to_150k",
            Self::From150kTo200k => "income_household_150k_to_200k",
            Self::Over200k => "income_household_over_200k",
        }
    }

    /// Representative income for the bracket when deriving a weighted
    /// median.
    #[must_use]
    pub const fn midpoint(self) -> f64 {
        INCOME_MIDPOINTS[self as usize]
    }
}

/// Census race category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Race {
    /// White alone.
    White,
    /// Black or African American alone.
    Black,
    /// Asian alone.
    Asian,
    /// American Indian and Alaska Native alone.
    Native,
    /// Native Hawaiian and Other Pacific Islander alone.
    Pacific,
}

impl Race {
    /// Every race category.
    pub const ALL: [Self; 5] = [
        Self::White,
        Self::Black,
        Self::Asian,
        Self::Native,
        Self::Pacific,
    ];

    /// Canonical source column holding this category's percentage.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::White => "race_white",
            Self::Black => "race_black",
            Self::Asian => "race_asian",
            Self::Native => "race_native",
            Self::Pacific => "race_pacific",
        }
    }
}

/// Canonical source column holding the Hispanic/Latino percentage.
pub const HISPANIC_COLUMN: &str = "hispanic";

/// Educational attainment category.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EducationLevel {
    /// High school graduate.
    #[serde(rename = "highschool")]
    #[strum(serialize = "highschool")]
    HighSchool,
    /// Some college, no degree.
    SomeCollege,
    /// Bachelor's degree.
    Bachelors,
    /// Graduate or professional degree.
    Graduate,
    /// Any college degree or above.
    CollegeOrAbove,
}

impl EducationLevel {
    /// Every attainment category.
    pub const ALL: [Self; 5] = [
        Self::HighSchool,
        Self::SomeCollege,
        Self::Bachelors,
        Self::Graduate,
        Self::CollegeOrAbove,
    ];

    /// Canonical source column holding this category's percentage.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::HighSchool => "education_highschool",
            Self::SomeCollege => "education_some_college",
            Self::Bachelors => "education_bachelors",
            Self::Graduate => "education_graduate",
            Self::CollegeOrAbove => "education_college_or_above",
        }
    }
}

/// One normalized ZIP code.
///
/// Bracket and category maps hold percentages (0-100) exactly as reported
/// by the source; a missing key means the source had no usable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipRecord {
    /// Five-digit, zero-padded ZIP code.
    pub zip_code: String,
    /// Total residents.
    pub population: u64,
    /// Centroid latitude.
    pub latitude: Option<f64>,
    /// Centroid longitude.
    pub longitude: Option<f64>,
    /// Share of residents per age bracket (percent).
    pub age_brackets: BTreeMap<AgeBracket, f64>,
    /// Share of households per income bracket (percent).
    pub income_brackets: BTreeMap<IncomeBracket, f64>,
    /// Share of residents per race category (percent).
    pub race_pct: BTreeMap<Race, f64>,
    /// Share of Hispanic/Latino residents (percent).
    pub hispanic_pct: Option<f64>,
    /// Share of adults per attainment category (percent).
    pub education_pct: BTreeMap<EducationLevel, f64>,
    /// Population-weighted mean of the age bracket midpoints.
    pub median_age: Option<f64>,
    /// Population-weighted mean of the income bracket midpoints.
    pub median_income: Option<f64>,
    /// Fraction (0-1) of adults holding a college degree or above.
    pub college_degree_pct: Option<f64>,
    /// State display name.
    pub state: Option<String>,
}

impl ZipRecord {
    /// Percentage of residents in the given age bracket.
    #[must_use]
    pub fn age_pct(&self, bracket: AgeBracket) -> Option<f64> {
        self.age_brackets.get(&bracket).copied()
    }

    /// Percentage of households in the given income bracket.
    #[must_use]
    pub fn income_pct(&self, bracket: IncomeBracket) -> Option<f64> {
        self.income_brackets.get(&bracket).copied()
    }

    /// Percentage of residents in the given race category.
    #[must_use]
    pub fn race(&self, race: Race) -> Option<f64> {
        self.race_pct.get(&race).copied()
    }

    /// Race share as a fraction (0-1).
    #[must_use]
    pub fn race_fraction(&self, race: Race) -> Option<f64> {
        self.race(race).map(|pct| pct / 100.0)
    }

    /// Hispanic/Latino share as a fraction (0-1).
    #[must_use]
    pub fn hispanic_fraction(&self) -> Option<f64> {
        self.hispanic_pct.map(|pct| pct / 100.0)
    }

    /// Percentage of adults in the given attainment category.
    #[must_use]
    pub fn education(&self, level: EducationLevel) -> Option<f64> {
        self.education_pct.get(&level).copied()
    }

    /// `(latitude, longitude)` when both are known.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// Key fields of a single record, used by the data-status report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipSample {
    /// ZIP code.
    pub zip_code: String,
    /// Total residents.
    pub population: u64,
    /// Centroid latitude.
    pub latitude: Option<f64>,
    /// Centroid longitude.
    pub longitude: Option<f64>,
    /// State display name.
    pub state: Option<String>,
}

impl From<&ZipRecord> for ZipSample {
    fn from(record: &ZipRecord) -> Self {
        Self {
            zip_code: record.zip_code.clone(),
            population: record.population,
            latitude: record.latitude,
            longitude: record.longitude,
            state: record.state.clone(),
        }
    }
}

/// Diagnostic snapshot of the shared dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetStatus {
    /// Whether the dataset has been loaded into memory.
    pub loaded: bool,
    /// Number of ZIP records.
    pub zip_codes: usize,
    /// Number of ZIP records with both coordinates.
    pub zip_codes_with_coordinates: usize,
    /// Sum of all populations.
    pub total_population: u64,
    /// The first few records.
    pub sample: Vec<ZipSample>,
}
