#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Filter criteria and result types for ZIP market-sizing analyses.
//!
//! [`FilterParams`] is the loose request shape (tag strings and optional
//! bounds). [`FilterCriteria::from_params`] validates it into typed tag
//! sets, which the filter engine consumes. The remaining types are the
//! serializable outputs of the concentration, segmentation and reporting
//! operations.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;
use zip_market_demographics_models::{AgeBracket, EducationLevel, IncomeBracket, Race};

/// A filter tag or numeric bound failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid value for '{field}': {message}")]
pub struct InvalidFilterValue {
    /// Name of the offending request field.
    pub field: String,
    /// Description of what went wrong.
    pub message: String,
}

impl InvalidFilterValue {
    /// Builds an error for `field`.
    #[must_use]
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Age range selectable in a filter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum AgeRange {
    /// Under 20.
    #[strum(to_string = "under-20", serialize = "under20")]
    Under20,
    /// 20-29.
    #[strum(to_string = "20-29")]
    Twenties,
    /// 30-39.
    #[strum(to_string = "30-39")]
    Thirties,
    /// 40-49.
    #[strum(to_string = "40-49")]
    Forties,
    /// 50-59.
    #[strum(to_string = "50-59")]
    Fifties,
    /// 60 and over.
    #[strum(to_string = "60+", serialize = "60plus")]
    SixtyPlus,
}

impl AgeRange {
    /// Source brackets that make up the range.
    #[must_use]
    pub const fn brackets(self) -> &'static [AgeBracket] {
        match self {
            Self::Under20 => &[AgeBracket::Under10, AgeBracket::From10To19],
            Self::Twenties => &[AgeBracket::Twenties],
            Self::Thirties => &[AgeBracket::Thirties],
            Self::Forties => &[AgeBracket::Forties],
            Self::Fifties => &[AgeBracket::Fifties],
            Self::SixtyPlus => &[
                AgeBracket::Sixties,
                AgeBracket::Seventies,
                AgeBracket::Over80,
            ],
        }
    }
}

/// Household income range selectable in a filter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum IncomeRange {
    /// Under $50k.
    #[strum(to_string = "under-50k", serialize = "under50k")]
    Under50k,
    /// $50k-$75k.
    #[strum(to_string = "50k-75k")]
    From50kTo75k,
    /// $75k-$100k.
    #[strum(to_string = "75k-100k")]
    From75kTo100k,
    /// $100k-$125k.
    #[strum(to_string = "100k-125k")]
    From100kTo125k,
    /// $125k-$150k.
    #[strum(to_string = "125k-150k")]
    From125kTo150k,
    /// $100k-$150k.
    #[strum(to_string = "100k-150k")]
    From100kTo150k,
    /// $150k-$200k.
    #[strum(to_string = "150k-200k")]
    From150kTo200k,
    /// $200k and over.
    #[strum(to_string = "over-200k", serialize = "over200k")]
    Over200k,
}

impl IncomeRange {
    /// Source brackets that make up the range.
    #[must_use]
    pub const fn brackets(self) -> &'static [IncomeBracket] {
        match self {
            Self::Under50k => &IncomeBracket::UNDER_50K,
            Self::From50kTo75k => &[IncomeBracket::From50kTo60k, IncomeBracket::From60kTo75k],
            Self::From75kTo100k => &[IncomeBracket::From75kTo100k],
            Self::From100kTo125k => &[IncomeBracket::From100kTo125k],
            Self::From125kTo150k => &[IncomeBracket::From125kTo150k],
            Self::From100kTo150k => &[
                IncomeBracket::From100kTo125k,
                IncomeBracket::From125kTo150k,
            ],
            Self::From150kTo200k => &[IncomeBracket::From150kTo200k],
            Self::Over200k => &[IncomeBracket::Over200k],
        }
    }
}

/// Ethnicity selectable in a filter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum EthnicityTag {
    /// White alone.
    #[strum(to_string = "white", serialize = "white-caucasian")]
    White,
    /// Black or African American alone.
    #[strum(to_string = "black", serialize = "black-african-american")]
    Black,
    /// Hispanic or Latino of any race.
    #[strum(to_string = "hispanic")]
    Hispanic,
    /// Asian alone.
    #[strum(to_string = "asian")]
    Asian,
    /// American Indian and Alaska Native alone.
    #[strum(to_string = "native")]
    Native,
    /// Native Hawaiian and Other Pacific Islander alone.
    #[strum(to_string = "pacific")]
    Pacific,
}

impl EthnicityTag {
    /// Race category backing the tag. `None` for [`Self::Hispanic`], which
    /// is reported separately from race.
    #[must_use]
    pub const fn race(self) -> Option<Race> {
        match self {
            Self::White => Some(Race::White),
            Self::Black => Some(Race::Black),
            Self::Asian => Some(Race::Asian),
            Self::Native => Some(Race::Native),
            Self::Pacific => Some(Race::Pacific),
            Self::Hispanic => None,
        }
    }

    /// Minimum population share (fraction) for a ZIP to count as
    /// concentrated in this ethnicity.
    #[must_use]
    pub const fn majority_threshold(self) -> Option<f64> {
        match self {
            Self::White => Some(0.5),
            Self::Black | Self::Hispanic => Some(0.3),
            Self::Asian => Some(0.15),
            Self::Native | Self::Pacific => None,
        }
    }
}

/// Educational attainment selectable in a filter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum EducationTag {
    /// High school graduate.
    #[strum(to_string = "highschool")]
    HighSchool,
    /// Some college.
    #[strum(to_string = "college")]
    College,
    /// Bachelor's degree.
    #[strum(to_string = "bachelors")]
    Bachelors,
    /// Graduate degree.
    #[strum(to_string = "graduate")]
    Graduate,
}

impl EducationTag {
    #[must_use]
    pub const fn level(self) -> EducationLevel {
        match self {
            Self::HighSchool => EducationLevel::HighSchool,
            Self::College => EducationLevel::SomeCollege,
            Self::Bachelors => EducationLevel::Bachelors,
            Self::Graduate => EducationLevel::Graduate,
        }
    }

    /// Minimum share (percent) a ZIP needs to match the tag in predicate
    /// mode.
    #[must_use]
    pub const fn threshold_pct(self) -> f64 {
        match self {
            Self::HighSchool | Self::College | Self::Bachelors => 20.0,
            Self::Graduate => 10.0,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

/// Accepts either a single tag string or a list of tags.
fn one_or_many<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(tag)) => vec![tag],
        Some(OneOrMany::Many(tags)) => tags,
    })
}

/// Unvalidated filter request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    /// Age range tags.
    #[serde(default, deserialize_with = "one_or_many")]
    pub age: Vec<String>,
    /// Income range tags.
    #[serde(default, deserialize_with = "one_or_many")]
    pub income: Vec<String>,
    /// Ethnicity tags.
    #[serde(default, deserialize_with = "one_or_many")]
    pub ethnicity: Vec<String>,
    /// Education tags.
    #[serde(default, deserialize_with = "one_or_many")]
    pub education: Vec<String>,
    /// Ethnicity whose share must reach its concentration threshold.
    pub majority_ethnicity: Option<String>,
    /// Minimum median age (years).
    pub min_age: Option<f64>,
    /// Maximum median age (years).
    pub max_age: Option<f64>,
    /// Minimum median household income (dollars).
    pub min_income: Option<f64>,
    /// Maximum median household income (dollars).
    pub max_income: Option<f64>,
    /// Minimum college degree share (percent).
    pub min_college_pct: Option<f64>,
    /// Minimum total population.
    pub min_population: Option<f64>,
}

/// Validated filter criteria.
///
/// Tags within one category are alternatives; categories, bounds and the
/// majority-ethnicity share all have to hold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub age: BTreeSet<AgeRange>,
    pub income: BTreeSet<IncomeRange>,
    pub ethnicity: BTreeSet<EthnicityTag>,
    pub education: BTreeSet<EducationTag>,
    pub majority_ethnicity: Option<EthnicityTag>,
    pub min_age: Option<f64>,
    pub max_age: Option<f64>,
    pub min_income: Option<f64>,
    pub max_income: Option<f64>,
    /// Percent, 0-100.
    pub min_college_pct: Option<f64>,
    pub min_population: Option<f64>,
}

fn is_no_selection(tag: &str) -> bool {
    tag.is_empty() || tag.eq_ignore_ascii_case("all")
}

fn parse_tags<T: FromStr + Ord>(
    field: &str,
    tags: &[String],
) -> Result<BTreeSet<T>, InvalidFilterValue> {
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !is_no_selection(tag))
        .map(|tag| {
            T::from_str(tag)
                .map_err(|_| InvalidFilterValue::new(field, format!("unknown tag '{tag}'")))
        })
        .collect()
}

fn check_bound(field: &str, value: Option<f64>) -> Result<Option<f64>, InvalidFilterValue> {
    match value {
        Some(v) if !v.is_finite() => Err(InvalidFilterValue::new(field, "must be a finite number")),
        Some(v) if v < 0.0 => Err(InvalidFilterValue::new(
            field,
            format!("must not be negative (got {v})"),
        )),
        other => Ok(other),
    }
}

fn check_range(field: &str, min: Option<f64>, max: Option<f64>) -> Result<(), InvalidFilterValue> {
    if let (Some(min), Some(max)) = (min, max)
        && min > max
    {
        return Err(InvalidFilterValue::new(
            field,
            format!("minimum {min} exceeds maximum {max}"),
        ));
    }
    Ok(())
}

impl FilterCriteria {
    /// Validates raw request parameters.
    ///
    /// `"all"` and empty tags mean "no selection" and are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidFilterValue`] for an unknown tag, a negative or
    /// non-finite bound, a minimum above its maximum, a college share above
    /// 100, or a majority ethnicity without a defined share threshold.
    pub fn from_params(params: &FilterParams) -> Result<Self, InvalidFilterValue> {
        let majority_ethnicity = match params.majority_ethnicity.as_deref().map(str::trim) {
            None => None,
            Some(tag) if is_no_selection(tag) => None,
            Some(tag) => {
                let parsed = EthnicityTag::from_str(tag).map_err(|_| {
                    InvalidFilterValue::new("majorityEthnicity", format!("unknown tag '{tag}'"))
                })?;
                if parsed.majority_threshold().is_none() {
                    return Err(InvalidFilterValue::new(
                        "majorityEthnicity",
                        format!("no share threshold defined for '{parsed}'"),
                    ));
                }
                Some(parsed)
            }
        };

        let criteria = Self {
            age: parse_tags("age", &params.age)?,
            income: parse_tags("income", &params.income)?,
            ethnicity: parse_tags("ethnicity", &params.ethnicity)?,
            education: parse_tags("education", &params.education)?,
            majority_ethnicity,
            min_age: check_bound("minAge", params.min_age)?,
            max_age: check_bound("maxAge", params.max_age)?,
            min_income: check_bound("minIncome", params.min_income)?,
            max_income: check_bound("maxIncome", params.max_income)?,
            min_college_pct: check_bound("minCollegePct", params.min_college_pct)?,
            min_population: check_bound("minPopulation", params.min_population)?,
        };

        check_range("age", criteria.min_age, criteria.max_age)?;
        check_range("income", criteria.min_income, criteria.max_income)?;

        if let Some(pct) = criteria.min_college_pct
            && pct > 100.0
        {
            return Err(InvalidFilterValue::new(
                "minCollegePct",
                format!("must be at most 100 (got {pct})"),
            ));
        }

        Ok(criteria)
    }

    /// Whether no tag is selected in any category.
    #[must_use]
    pub fn has_no_tags(&self) -> bool {
        self.age.is_empty()
            && self.income.is_empty()
            && self.ethnicity.is_empty()
            && self.education.is_empty()
    }

    /// Whether the criteria select every record.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.has_no_tags()
            && self.majority_ethnicity.is_none()
            && self.min_age.is_none()
            && self.max_age.is_none()
            && self.min_income.is_none()
            && self.max_income.is_none()
            && self.min_college_pct.is_none()
            && self.min_population.is_none()
    }
}

/// One ZIP code in a ranked concentration result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipRow {
    pub zip_code: String,
    pub population: u64,
    /// Estimated matching residents. Equals `population` for predicate
    /// filtering.
    pub target_population: f64,
    pub median_age: Option<f64>,
    pub median_income: Option<f64>,
    /// Fraction, 0-1.
    pub college_degree_pct: Option<f64>,
    pub state: Option<String>,
}

/// Means over a filtered record set. Records missing a value are skipped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemographicSummary {
    pub avg_median_age: Option<f64>,
    pub avg_median_income: Option<f64>,
    /// Fraction in concentration results, percent in reports.
    pub avg_college_degree_pct: Option<f64>,
}

/// Highest-population ZIP codes covering a share of the total.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Concentration {
    /// Requested share, 0-1.
    pub share: f64,
    /// Leading ZIP codes whose cumulative population stays within
    /// `total_population * share`.
    pub prefix: Vec<ZipRow>,
    pub prefix_count: usize,
    pub total_population: f64,
    pub total_zip_codes: usize,
    /// `prefix_count` as a percentage of `total_zip_codes`.
    pub zip_code_share_pct: f64,
    pub summary: DemographicSummary,
    /// Ranked rows after the prefix.
    #[serde(skip)]
    pub rest: Vec<ZipRow>,
}

impl Concentration {
    /// The `n` highest-ranked rows, prefix first.
    pub fn top(&self, n: usize) -> impl Iterator<Item = &ZipRow> {
        self.prefix.iter().chain(&self.rest).take(n)
    }
}

/// Mean demographics of one k-means cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSummary {
    pub cluster_id: usize,
    pub zip_codes_count: usize,
    pub avg_population: f64,
    /// Years.
    pub avg_median_age: f64,
    /// Dollars.
    pub avg_median_income: f64,
    /// Percent, 0-100.
    pub avg_college_degree_pct: f64,
    /// Up to five member ZIP codes, in input order.
    pub sample_zip_codes: Vec<String>,
}

/// ZIP code to cluster id.
pub type ClusterAssignment = BTreeMap<String, usize>;

/// Result of clustering a filtered record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segmentation {
    pub total_clusters: usize,
    pub clusters: Vec<ClusterSummary>,
    /// Number of clustered ZIP codes.
    pub total_zip_codes: usize,
    pub assignments: ClusterAssignment,
}

/// ZIP code row in a presentation report, with coordinates joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportZip {
    pub zip_code: String,
    pub population: u64,
    pub median_age: Option<f64>,
    pub median_income: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// The concentrated prefix of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrefixReport {
    pub zip_codes_count: usize,
    /// Share of matching ZIP codes in the prefix (percent, 1 decimal).
    pub population_percentage: f64,
    pub zip_codes: Vec<ReportZip>,
}

/// Concentration analysis shaped for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConcentrationReport {
    pub total_market_size: u64,
    pub total_zip_codes: usize,
    /// Requested share (percent).
    pub share_pct: f64,
    pub concentrated: PrefixReport,
    /// Highest-population ZIP codes, up to 20.
    pub top_zip_codes: Vec<ReportZip>,
    pub demographic_summary: DemographicSummary,
}

/// Flat per-ZIP export row. Percentages are 0-100, rounded to 1 decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub zip_code: String,
    pub population: u64,
    pub state: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub median_age: Option<f64>,
    pub median_income: Option<f64>,
    pub white_pct: Option<f64>,
    pub black_pct: Option<f64>,
    pub hispanic_pct: Option<f64>,
    pub asian_pct: Option<f64>,
    pub college_degree_pct: Option<f64>,
}

/// Export of every matching ZIP code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Export {
    pub total_records: usize,
    pub data: Vec<ExportRow>,
}

/// Ethnicity shares (percent, 1 decimal).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EthnicityBreakdown {
    pub white: Option<f64>,
    pub black: Option<f64>,
    pub hispanic: Option<f64>,
    pub asian: Option<f64>,
}

/// Demographics of a single ZIP code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZipProfile {
    pub zip_code: String,
    pub population: u64,
    pub state: Option<String>,
    /// Years, 1 decimal.
    pub median_age: Option<f64>,
    /// Whole dollars.
    pub median_income: Option<f64>,
    pub ethnicity: EthnicityBreakdown,
    /// Percent, 1 decimal.
    pub college_degree_pct: Option<f64>,
}

/// One map marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapZip {
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Estimated matching residents, truncated to whole people.
    pub population: u64,
    pub state: Option<String>,
}

/// Weighted target-population view for the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketMap {
    /// Markers for the highest-ranked ZIP codes that have coordinates.
    pub zip_codes: Vec<MapZip>,
    /// Number of markers.
    pub total_zip_codes: usize,
    pub total_population: u64,
    pub fifty_percent_population: u64,
    pub top_50_percent_zip_count: usize,
    pub top_80_percent_zip_count: usize,
    /// Ranked ZIP codes considered for markers, before dropping those
    /// without coordinates.
    pub top_zip_count: usize,
    pub total_matching_zip_codes: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tag_aliases() {
        assert_eq!(AgeRange::from_str("under20").unwrap(), AgeRange::Under20);
        assert_eq!(AgeRange::from_str("60+").unwrap(), AgeRange::SixtyPlus);
        assert_eq!(AgeRange::from_str("60plus").unwrap(), AgeRange::SixtyPlus);
        assert_eq!(
            IncomeRange::from_str("over200k").unwrap(),
            IncomeRange::Over200k
        );
        assert_eq!(
            EthnicityTag::from_str("black-african-american").unwrap(),
            EthnicityTag::Black
        );
        assert_eq!(EthnicityTag::from_str("Asian").unwrap(), EthnicityTag::Asian);
        assert_eq!(AgeRange::Under20.to_string(), "under-20");
    }

    #[test]
    fn all_and_empty_mean_no_selection() {
        let params = FilterParams {
            age: vec!["all".to_string(), String::new()],
            ..FilterParams::default()
        };
        let criteria = FilterCriteria::from_params(&params).unwrap();
        assert!(criteria.is_empty());
    }

    #[test]
    fn rejects_unknown_tag() {
        let params = FilterParams {
            income: vec!["lots".to_string()],
            ..FilterParams::default()
        };
        let err = FilterCriteria::from_params(&params).unwrap_err();
        assert_eq!(err.field, "income");
    }

    #[test]
    fn rejects_negative_and_non_finite_bounds() {
        let negative = FilterParams {
            min_age: Some(-1.0),
            ..FilterParams::default()
        };
        assert_eq!(
            FilterCriteria::from_params(&negative).unwrap_err().field,
            "minAge"
        );

        let nan = FilterParams {
            max_income: Some(f64::NAN),
            ..FilterParams::default()
        };
        assert_eq!(
            FilterCriteria::from_params(&nan).unwrap_err().field,
            "maxIncome"
        );
    }

    #[test]
    fn rejects_inverted_range() {
        let params = FilterParams {
            min_income: Some(100_000.0),
            max_income: Some(50_000.0),
            ..FilterParams::default()
        };
        assert_eq!(
            FilterCriteria::from_params(&params).unwrap_err().field,
            "income"
        );
    }

    #[test]
    fn rejects_college_share_above_100() {
        let params = FilterParams {
            min_college_pct: Some(101.0),
            ..FilterParams::default()
        };
        assert!(FilterCriteria::from_params(&params).is_err());
    }

    #[test]
    fn rejects_majority_without_threshold() {
        let params = FilterParams {
            majority_ethnicity: Some("pacific".to_string()),
            ..FilterParams::default()
        };
        assert!(FilterCriteria::from_params(&params).is_err());

        let params = FilterParams {
            majority_ethnicity: Some("White".to_string()),
            ..FilterParams::default()
        };
        assert_eq!(
            FilterCriteria::from_params(&params)
                .unwrap()
                .majority_ethnicity,
            Some(EthnicityTag::White)
        );
    }

    #[test]
    fn deserializes_single_tag_or_list() {
        let params: FilterParams =
            serde_json::from_str(r#"{"age":"30-39","ethnicity":["asian","hispanic"],"minAge":25}"#)
                .unwrap();
        assert_eq!(params.age, vec!["30-39"]);
        assert_eq!(params.ethnicity.len(), 2);
        assert!(params.income.is_empty());
        assert_eq!(params.min_age, Some(25.0));
    }

    #[test]
    fn range_brackets() {
        assert_eq!(IncomeRange::Under50k.brackets().len(), 9);
        assert_eq!(
            IncomeRange::From100kTo150k.brackets(),
            &[IncomeBracket::From100kTo125k, IncomeBracket::From125kTo150k]
        );
        assert_eq!(AgeRange::SixtyPlus.brackets().len(), 3);
    }
}
