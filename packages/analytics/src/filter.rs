//! Demographic filtering.
//!
//! Two modes share the same criteria:
//!
//! * **Predicate** ([`filter_predicate`]) keeps or drops whole ZIP codes.
//!   Tags within a category are alternatives, categories must all hold.
//! * **Weighted** ([`filter_weighted`]) estimates how many residents of each
//!   ZIP code match. Every selected category contributes the fraction of
//!   the population in its selected brackets, and the fractions are
//!   multiplied. This treats age, income, ethnicity and education as
//!   statistically independent, which real populations are not, so the
//!   target population is an approximation.
//!
//! Numeric bounds and the majority-ethnicity share apply in both modes.

use std::collections::BTreeSet;

use serde::Serialize;
use zip_market_analytics_models::{
    AgeRange, EducationTag, EthnicityTag, FilterCriteria, IncomeRange,
};
use zip_market_demographics::DemographicDataset;
use zip_market_demographics_models::{IncomeBracket, ZipRecord};

/// A dataset record that passed the filters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedZip<'a> {
    pub record: &'a ZipRecord,
    /// Estimated matching residents. Equals the population in predicate
    /// mode.
    pub target_population: f64,
}

impl<'a> MatchedZip<'a> {
    /// Wraps a record with its full population as the target.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn whole(record: &'a ZipRecord) -> Self {
        Self {
            record,
            target_population: record.population as f64,
        }
    }
}

/// Percentage of residents with the given ethnicity.
#[must_use]
pub fn ethnicity_pct(record: &ZipRecord, tag: EthnicityTag) -> Option<f64> {
    tag.race()
        .map_or(record.hispanic_pct, |race| record.race(race))
}

/// Sum of the present values, or `None` if none is present.
fn sum_present(values: impl IntoIterator<Item = Option<f64>>) -> Option<f64> {
    values
        .into_iter()
        .flatten()
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

fn age_matches(record: &ZipRecord, range: AgeRange) -> Option<bool> {
    let mut present = range
        .brackets()
        .iter()
        .filter_map(|b| record.age_pct(*b))
        .peekable();
    present.peek()?;
    Some(present.any(|pct| pct > 0.0))
}

fn income_matches(record: &ZipRecord, range: IncomeRange) -> Option<bool> {
    let values = range.brackets().iter().map(|b| record.income_pct(*b));
    if range == IncomeRange::Under50k {
        return sum_present(values).map(|total| total > 0.0);
    }
    let mut present = values.flatten().peekable();
    present.peek()?;
    Some(present.any(|pct| pct > 0.0))
}

fn ethnicity_matches(record: &ZipRecord, tag: EthnicityTag) -> Option<bool> {
    ethnicity_pct(record, tag).map(|pct| pct > 0.0)
}

fn education_matches(record: &ZipRecord, tag: EducationTag) -> Option<bool> {
    record
        .education(tag.level())
        .map(|pct| pct >= tag.threshold_pct())
}

/// OR over the selected tags. Tags without data on the record are ignored;
/// if every selected tag lacks data the category passes.
fn category_matches<T: Copy>(
    selected: &BTreeSet<T>,
    matches: impl Fn(T) -> Option<bool>,
) -> bool {
    let mut decided = selected.iter().filter_map(|tag| matches(*tag)).peekable();
    if decided.peek().is_none() {
        return true;
    }
    decided.any(|m| m)
}

fn at_least(value: Option<f64>, min: Option<f64>) -> bool {
    min.is_none_or(|min| value.is_some_and(|v| v >= min))
}

fn at_most(value: Option<f64>, max: Option<f64>) -> bool {
    max.is_none_or(|max| value.is_some_and(|v| v <= max))
}

/// Inclusive numeric bounds plus the majority-ethnicity share. A record
/// missing a bounded field fails that bound. Zero is a real bound, so
/// `min_age = 0` still drops records without a median age.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn within_bounds(record: &ZipRecord, criteria: &FilterCriteria) -> bool {
    let majority = criteria.majority_ethnicity.is_none_or(|tag| {
        tag.majority_threshold().is_some_and(|threshold| {
            ethnicity_pct(record, tag).is_some_and(|pct| pct / 100.0 >= threshold)
        })
    });

    majority
        && at_least(record.median_age, criteria.min_age)
        && at_most(record.median_age, criteria.max_age)
        && at_least(record.median_income, criteria.min_income)
        && at_most(record.median_income, criteria.max_income)
        && at_least(
            record.college_degree_pct,
            criteria.min_college_pct.map(|pct| pct / 100.0),
        )
        && at_least(Some(record.population as f64), criteria.min_population)
}

/// Whether a record passes every selected category and bound.
#[must_use]
pub fn matches_predicate(record: &ZipRecord, criteria: &FilterCriteria) -> bool {
    category_matches(&criteria.age, |r| age_matches(record, r))
        && category_matches(&criteria.income, |r| income_matches(record, r))
        && category_matches(&criteria.ethnicity, |t| ethnicity_matches(record, t))
        && category_matches(&criteria.education, |t| education_matches(record, t))
        && within_bounds(record, criteria)
}

/// Keeps the records that pass every selected category and bound, in
/// dataset order. Empty criteria keep every record.
#[must_use]
pub fn filter_predicate<'a>(
    dataset: &'a DemographicDataset,
    criteria: &FilterCriteria,
) -> Vec<MatchedZip<'a>> {
    if criteria.is_empty() {
        return dataset.records().iter().map(MatchedZip::whole).collect();
    }

    let matched: Vec<_> = dataset
        .records()
        .iter()
        .filter(|record| matches_predicate(record, criteria))
        .map(MatchedZip::whole)
        .collect();

    log::debug!(
        "Predicate filter kept {}/{} ZIP codes",
        matched.len(),
        dataset.len()
    );

    matched
}

/// Fraction of the population in the selected brackets, clamped to
/// `[0, 1]`. Absent brackets contribute nothing; no selection yields 1.
fn multiplier(selected_pcts: impl IntoIterator<Item = Option<f64>>, selected: bool) -> f64 {
    if !selected {
        return 1.0;
    }
    (sum_present(selected_pcts).unwrap_or(0.0) / 100.0).clamp(0.0, 1.0)
}

/// Product of the per-category multipliers for one record.
#[must_use]
pub fn target_fraction(record: &ZipRecord, criteria: &FilterCriteria) -> f64 {
    let ages: BTreeSet<_> = criteria
        .age
        .iter()
        .flat_map(|r| r.brackets().iter().copied())
        .collect();
    let incomes: BTreeSet<IncomeBracket> = criteria
        .income
        .iter()
        .flat_map(|r| r.brackets().iter().copied())
        .collect();

    let age = multiplier(
        ages.iter().map(|b| record.age_pct(*b)),
        !criteria.age.is_empty(),
    );
    let income = multiplier(
        incomes.iter().map(|b| record.income_pct(*b)),
        !criteria.income.is_empty(),
    );
    let ethnicity = multiplier(
        criteria
            .ethnicity
            .iter()
            .map(|t| ethnicity_pct(record, *t)),
        !criteria.ethnicity.is_empty(),
    );
    let education = multiplier(
        criteria
            .education
            .iter()
            .map(|t| record.education(t.level())),
        !criteria.education.is_empty(),
    );

    age * income * ethnicity * education
}

/// Estimates the matching population of every record that passes the
/// bounds. Records whose estimate is not positive are dropped. Order
/// follows the dataset.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn filter_weighted<'a>(
    dataset: &'a DemographicDataset,
    criteria: &FilterCriteria,
) -> Vec<MatchedZip<'a>> {
    let matched: Vec<_> = dataset
        .records()
        .iter()
        .filter(|record| within_bounds(record, criteria))
        .filter_map(|record| {
            let target_population = record.population as f64 * target_fraction(record, criteria);
            (target_population > 0.0).then_some(MatchedZip {
                record,
                target_population,
            })
        })
        .collect();

    log::debug!(
        "Weighted filter kept {}/{} ZIP codes",
        matched.len(),
        dataset.len()
    );

    matched
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use zip_market_analytics_models::FilterParams;
    use zip_market_demographics_models::{AgeBracket, EducationLevel, Race};

    pub(crate) fn record(zip: &str, population: u64) -> ZipRecord {
        ZipRecord {
            zip_code: zip.to_string(),
            population,
            latitude: None,
            longitude: None,
            age_brackets: BTreeMap::new(),
            income_brackets: BTreeMap::new(),
            race_pct: BTreeMap::new(),
            hispanic_pct: None,
            education_pct: BTreeMap::new(),
            median_age: None,
            median_income: None,
            college_degree_pct: None,
            state: None,
        }
    }

    fn criteria(json: &str) -> FilterCriteria {
        let params: FilterParams = serde_json::from_str(json).unwrap();
        FilterCriteria::from_params(&params).unwrap()
    }

    fn zips(matched: &[MatchedZip<'_>]) -> Vec<String> {
        matched.iter().map(|m| m.record.zip_code.clone()).collect()
    }

    fn sample() -> DemographicDataset {
        let mut a = record("00001", 1000);
        a.age_brackets.insert(AgeBracket::Thirties, 40.0);
        a.age_brackets.insert(AgeBracket::Twenties, 0.0);
        a.race_pct.insert(Race::Asian, 25.0);
        a.race_pct.insert(Race::White, 60.0);
        a.hispanic_pct = Some(10.0);
        a.education_pct.insert(EducationLevel::Graduate, 12.0);
        a.median_age = Some(34.0);
        a.median_income = Some(80_000.0);
        a.college_degree_pct = Some(0.45);

        let mut b = record("00002", 500);
        b.age_brackets.insert(AgeBracket::Thirties, 0.0);
        b.age_brackets.insert(AgeBracket::Twenties, 30.0);
        b.race_pct.insert(Race::Asian, 0.0);
        b.race_pct.insert(Race::White, 20.0);
        b.hispanic_pct = Some(50.0);
        b.education_pct.insert(EducationLevel::Graduate, 5.0);
        b.median_age = Some(28.0);
        b.median_income = Some(40_000.0);
        b.college_degree_pct = Some(0.15);

        let c = record("00003", 200);

        DemographicDataset::from_records(vec![a, b, c])
    }

    #[test]
    fn empty_criteria_is_identity() {
        let dataset = sample();
        let criteria = FilterCriteria::default();
        assert_eq!(
            zips(&filter_predicate(&dataset, &criteria)),
            ["00001", "00002", "00003"]
        );
        let weighted = filter_weighted(&dataset, &criteria);
        assert_eq!(weighted.len(), 3);
        assert!(
            weighted
                .iter()
                .all(|m| (m.target_population - m.record.population as f64).abs() < 1e-9)
        );
    }

    #[test]
    fn predicate_or_within_category() {
        let dataset = sample();
        let thirties = criteria(r#"{"age":["30-39"]}"#);
        assert_eq!(
            zips(&filter_predicate(&dataset, &thirties)),
            ["00001", "00003"]
        );

        let both = criteria(r#"{"age":["30-39","20-29"]}"#);
        assert_eq!(
            zips(&filter_predicate(&dataset, &both)),
            ["00001", "00002", "00003"]
        );
    }

    #[test]
    fn adding_a_tag_never_shrinks_the_match() {
        let dataset = sample();
        for (narrow, wide) in [
            (r#"{"age":["20-29"]}"#, r#"{"age":["20-29","30-39"]}"#),
            (r#"{"ethnicity":["asian"]}"#, r#"{"ethnicity":["asian","hispanic"]}"#),
            (r#"{"education":["graduate"]}"#, r#"{"education":["graduate","bachelors"]}"#),
        ] {
            let narrow = zips(&filter_predicate(&dataset, &criteria(narrow)));
            let wide = zips(&filter_predicate(&dataset, &criteria(wide)));
            assert!(narrow.iter().all(|zip| wide.contains(zip)), "{narrow:?} vs {wide:?}");
        }
    }

    #[test]
    fn predicate_and_across_categories() {
        let dataset = sample();
        let c = criteria(r#"{"age":["20-29"],"ethnicity":["asian"]}"#);
        // 00002 matches age but has no Asian residents; 00003 has no data.
        assert_eq!(zips(&filter_predicate(&dataset, &c)), ["00003"]);
    }

    #[test]
    fn education_thresholds() {
        let dataset = sample();
        let c = criteria(r#"{"education":["graduate"]}"#);
        assert_eq!(zips(&filter_predicate(&dataset, &c)), ["00001", "00003"]);
    }

    #[test]
    fn bounds_exclude_missing_fields() {
        let dataset = sample();
        let c = criteria(r#"{"minAge":30}"#);
        assert_eq!(zips(&filter_predicate(&dataset, &c)), ["00001"]);

        let c = criteria(r#"{"minCollegePct":15,"maxIncome":40000}"#);
        assert_eq!(zips(&filter_predicate(&dataset, &c)), ["00002"]);

        let c = criteria(r#"{"minPopulation":500}"#);
        assert_eq!(zips(&filter_predicate(&dataset, &c)), ["00001", "00002"]);
    }

    #[test]
    fn zero_bound_still_requires_the_field() {
        let dataset = sample();
        let c = criteria(r#"{"minAge":0}"#);
        assert_eq!(zips(&filter_predicate(&dataset, &c)), ["00001", "00002"]);
    }

    #[test]
    fn majority_ethnicity_share() {
        let dataset = sample();
        let c = criteria(r#"{"majorityEthnicity":"white"}"#);
        assert_eq!(zips(&filter_predicate(&dataset, &c)), ["00001"]);

        let c = criteria(r#"{"majorityEthnicity":"hispanic"}"#);
        assert_eq!(zips(&filter_predicate(&dataset, &c)), ["00002"]);
    }

    #[test]
    fn weighted_multiplies_categories() {
        let dataset = sample();
        let c = criteria(r#"{"age":"30-39","ethnicity":"asian"}"#);
        let matched = filter_weighted(&dataset, &c);
        assert_eq!(zips(&matched), ["00001"]);
        assert!((matched[0].target_population - 1000.0 * 0.4 * 0.25).abs() < 1e-9);
    }

    #[test]
    fn weighted_absent_brackets_contribute_zero() {
        let dataset = sample();
        let c = criteria(r#"{"income":"over200k"}"#);
        assert!(filter_weighted(&dataset, &c).is_empty());
    }

    #[test]
    fn weighted_overlapping_ranges_count_once() {
        let mut r = record("00009", 100);
        r.income_brackets
            .insert(IncomeBracket::From100kTo125k, 30.0);
        r.income_brackets
            .insert(IncomeBracket::From125kTo150k, 20.0);
        let dataset = DemographicDataset::from_records(vec![r]);
        let c = criteria(r#"{"income":["100k-125k","100k-150k"]}"#);
        let matched = filter_weighted(&dataset, &c);
        assert!((matched[0].target_population - 50.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_multiplier_is_clamped() {
        let mut r = record("00010", 100);
        r.race_pct.insert(Race::White, 80.0);
        r.hispanic_pct = Some(70.0);
        let dataset = DemographicDataset::from_records(vec![r]);
        let c = criteria(r#"{"ethnicity":["white","hispanic"]}"#);
        let matched = filter_weighted(&dataset, &c);
        assert!((matched[0].target_population - 100.0).abs() < 1e-9);
    }

    #[test]
    fn weighted_never_exceeds_population() {
        let dataset = sample();
        for json in [
            r#"{"age":["20-29","30-39","60+"]}"#,
            r#"{"ethnicity":["white","asian","hispanic"],"education":["graduate"]}"#,
        ] {
            for m in filter_weighted(&dataset, &criteria(json)) {
                assert!(m.target_population <= m.record.population as f64);
            }
        }
    }

    #[test]
    fn filtered_population_never_exceeds_total() {
        let dataset = sample();
        let c = criteria(r#"{"ethnicity":["white"]}"#);
        let total: u64 = filter_predicate(&dataset, &c)
            .iter()
            .map(|m| m.record.population)
            .sum();
        assert!(total <= dataset.total_population());
    }
}
