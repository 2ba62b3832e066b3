//! Normalizes the wide ACS export into [`ZipRecord`] values.
//!
//! Source headers are resolved once into a typed [`ColumnMap`]; every row is
//! then read through that map. The canonical table produced by
//! [`to_canonical_table`] normalizes back to the same records, so the cache
//! and the raw export share a single code path.

use std::collections::{BTreeMap, BTreeSet};

use zip_market_demographics_models::{
    AgeBracket, EducationLevel, HISPANIC_COLUMN, IncomeBracket, Race, ZipRecord,
};

use crate::table::RawTable;

/// Errors that make a whole table unusable.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// A required column is absent.
    #[error("Required column '{column}' not found")]
    MissingColumn {
        /// Canonical name of the missing column.
        column: &'static str,
    },
}

/// Canonicalizes a header: trim, lowercase, spaces to underscores.
#[must_use]
pub fn canonical_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Positions of every known column within a table's header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ColumnMap {
    zcta: Option<usize>,
    population: Option<usize>,
    lat: Option<usize>,
    lng: Option<usize>,
    latitude: Option<usize>,
    longitude: Option<usize>,
    state_name: Option<usize>,
    age: [Option<usize>; 9],
    income: [Option<usize>; 16],
    race: [Option<usize>; 5],
    hispanic: Option<usize>,
    education: [Option<usize>; 5],
}

impl ColumnMap {
    /// Resolves headers. Duplicate raw headers keep their first occurrence,
    /// as do headers that only collide after canonicalization.
    fn resolve(headers: &[String]) -> Self {
        let mut seen = BTreeSet::new();
        let mut by_name: BTreeMap<String, usize> = BTreeMap::new();

        for (idx, raw) in headers.iter().enumerate() {
            if !seen.insert(raw.as_str()) {
                continue;
            }
            by_name.entry(canonical_column_name(raw)).or_insert(idx);
        }

        let find = |name: &str| by_name.get(name).copied();

        Self {
            zcta: find("zcta"),
            population: find("population"),
            lat: find("lat"),
            lng: find("lng"),
            latitude: find("latitude"),
            longitude: find("longitude"),
            state_name: find("state_name"),
            age: AgeBracket::ALL.map(|b| find(b.column())),
            income: IncomeBracket::ALL.map(|b| find(b.column())),
            race: Race::ALL.map(|r| find(r.column())),
            hispanic: find(HISPANIC_COLUMN),
            education: EducationLevel::ALL.map(|e| find(e.column())),
        }
    }

    /// Columns holding coordinates: the canonical pair when the table was
    /// already normalized, otherwise the raw `lat`/`lng` pair.
    const fn coordinate_columns(&self) -> Option<(usize, usize)> {
        match (self.latitude, self.longitude, self.lat, self.lng) {
            (Some(lat), Some(lon), _, _) | (_, _, Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Coerces a cell to a finite number. Empty, non-numeric, `NaN` and
/// infinite cells become `None`.
#[must_use]
pub fn coerce_number(cell: Option<&str>) -> Option<f64> {
    let trimmed = cell?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Converts a ZCTA cell to a five-character, zero-padded ZIP code.
///
/// Spreadsheet exports often store ZCTAs as numbers (`601` or `601.0`),
/// so integral numeric values are reduced to their integer text before
/// padding. Non-numeric text is padded as-is.
#[must_use]
pub fn zero_pad_zip(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }

    let digits = match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 && value.fract() == 0.0 => {
            format!("{value:.0}")
        }
        Ok(_) => return None,
        Err(_) => trimmed.to_string(),
    };

    Some(format!("{digits:0>5}"))
}

/// Population-weighted mean of bracket midpoints.
///
/// Each bracket contributes `pct * population / 100 * midpoint`; the sum is
/// divided by `population`. Any missing bracket value makes the whole
/// result `None`.
fn weighted_mean(
    values: impl IntoIterator<Item = Option<f64>>,
    midpoints: &[f64],
    population: f64,
) -> Option<f64> {
    let mut total = 0.0;
    for (value, midpoint) in values.into_iter().zip(midpoints) {
        total += value? * population / 100.0 * midpoint;
    }
    let mean = total / population;
    mean.is_finite().then_some(mean)
}

/// Normalizes a raw (or previously normalized) table.
///
/// Rows without a usable ZIP code or with a missing, non-numeric or
/// non-positive population are dropped. Duplicate ZIP codes keep their
/// first row.
///
/// # Errors
///
/// Returns [`NormalizeError::MissingColumn`] if the `zcta` or `population`
/// column is absent.
pub fn normalize(table: &RawTable) -> Result<Vec<ZipRecord>, NormalizeError> {
    let columns = ColumnMap::resolve(&table.headers);

    let Some(zcta) = columns.zcta else {
        return Err(NormalizeError::MissingColumn { column: "zcta" });
    };
    let Some(population_col) = columns.population else {
        return Err(NormalizeError::MissingColumn {
            column: "population",
        });
    };

    let has_all_age = columns.age.iter().all(Option::is_some);
    let has_all_income = columns.income.iter().all(Option::is_some);
    let coordinates = columns.coordinate_columns();

    let mut seen_zips = BTreeSet::new();
    let mut records = Vec::with_capacity(table.rows.len());
    let mut dropped = 0_usize;

    for row in 0..table.rows.len() {
        let cell = |col: Option<usize>| col.and_then(|c| table.cell(row, c));
        let number = |col: Option<usize>| coerce_number(cell(col));

        let Some(zip_code) = cell(Some(zcta)).and_then(zero_pad_zip) else {
            dropped += 1;
            continue;
        };

        let Some(population) = number(Some(population_col))
            .map(f64::round)
            .filter(|p| *p > 0.0)
        else {
            dropped += 1;
            continue;
        };

        if !seen_zips.insert(zip_code.clone()) {
            log::debug!("Skipping duplicate row for ZIP {zip_code}");
            dropped += 1;
            continue;
        }

        let (latitude, longitude) =
            coordinates.map_or((None, None), |(lat, lon)| (number(Some(lat)), number(Some(lon))));

        let median_age = if has_all_age {
            weighted_mean(
                columns.age.iter().map(|c| number(*c)),
                &AgeBracket::ALL.map(AgeBracket::midpoint),
                population,
            )
        } else {
            None
        };

        let median_income = if has_all_income {
            weighted_mean(
                columns.income.iter().map(|c| number(*c)),
                &IncomeBracket::ALL.map(IncomeBracket::midpoint),
                population,
            )
        } else {
            None
        };

        let age_brackets = collect_present(&AgeBracket::ALL, &columns.age, number);
        let income_brackets = collect_present(&IncomeBracket::ALL, &columns.income, number);
        let race_pct = collect_present(&Race::ALL, &columns.race, number);
        let education_pct = collect_present(&EducationLevel::ALL, &columns.education, number);

        let college_degree_pct = education_pct
            .get(&EducationLevel::CollegeOrAbove)
            .map(|pct| pct / 100.0);

        let state = cell(columns.state_name)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let population = population as u64;

        records.push(ZipRecord {
            zip_code,
            population,
            latitude,
            longitude,
            age_brackets,
            income_brackets,
            race_pct,
            hispanic_pct: number(columns.hispanic),
            education_pct,
            median_age,
            median_income,
            college_degree_pct,
            state,
        });
    }

    log::info!(
        "Normalized {} ZIP codes ({dropped} rows dropped)",
        records.len()
    );

    Ok(records)
}

/// Reads every key whose column exists and holds a number.
fn collect_present<K: Ord + Copy, const N: usize>(
    keys: &[K; N],
    columns: &[Option<usize>; N],
    number: impl Fn(Option<usize>) -> Option<f64>,
) -> BTreeMap<K, f64> {
    keys.iter()
        .zip(columns)
        .filter_map(|(key, col)| number(*col).map(|v| (*key, v)))
        .collect()
}

/// Canonical header row written by [`to_canonical_table`].
#[must_use]
pub fn canonical_headers() -> Vec<String> {
    let mut headers: Vec<String> = [
        "zcta",
        "zip_code",
        "population",
        "latitude",
        "longitude",
        "state_name",
    ]
    .iter()
    .map(ToString::to_string)
    .collect();

    headers.extend(AgeBracket::ALL.iter().map(|b| b.column().to_string()));
    headers.extend(IncomeBracket::ALL.iter().map(|b| b.column().to_string()));
    headers.extend(Race::ALL.iter().map(|r| r.column().to_string()));
    headers.push(HISPANIC_COLUMN.to_string());
    headers.extend(EducationLevel::ALL.iter().map(|e| e.column().to_string()));
    headers.extend(
        ["median_age", "median_income", "college_degree_pct"]
            .iter()
            .map(ToString::to_string),
    );

    headers
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(String::new, |v| v.to_string())
}

/// Writes records back out as a canonical wide table.
///
/// Floats use Rust's shortest round-trip formatting, so normalizing the
/// result reproduces the input records bit-for-bit.
#[must_use]
pub fn to_canonical_table(records: &[ZipRecord]) -> RawTable {
    let rows = records
        .iter()
        .map(|record| {
            let mut row = vec![
                record.zip_code.clone(),
                record.zip_code.clone(),
                record.population.to_string(),
                format_optional(record.latitude),
                format_optional(record.longitude),
                record.state.clone().unwrap_or_default(),
            ];
            row.extend(
                AgeBracket::ALL
                    .iter()
                    .map(|b| format_optional(record.age_pct(*b))),
            );
            row.extend(
                IncomeBracket::ALL
                    .iter()
                    .map(|b| format_optional(record.income_pct(*b))),
            );
            row.extend(Race::ALL.iter().map(|r| format_optional(record.race(*r))));
            row.push(format_optional(record.hispanic_pct));
            row.extend(
                EducationLevel::ALL
                    .iter()
                    .map(|e| format_optional(record.education(*e))),
            );
            row.push(format_optional(record.median_age));
            row.push(format_optional(record.median_income));
            row.push(format_optional(record.college_degree_pct));
            row
        })
        .collect();

    RawTable::new(canonical_headers(), rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(headers: &[&str], rows: &[&[&str]]) -> RawTable {
        RawTable::new(
            headers.iter().map(ToString::to_string).collect(),
            rows.iter()
                .map(|r| r.iter().map(ToString::to_string).collect())
                .collect(),
        )
    }

    fn full_headers() -> Vec<String> {
        let mut headers = vec![
            "ZCTA".to_string(),
            "Population".to_string(),
            "lat".to_string(),
            "lng".to_string(),
            "State Name".to_string(),
        ];
        headers.extend(AgeBracket::ALL.iter().map(|b| b.column().to_string()));
        headers.extend(IncomeBracket::ALL.iter().map(|b| b.column().to_string()));
        headers.extend(Race::ALL.iter().map(|r| r.column().to_string()));
        headers.push("hispanic".to_string());
        headers.extend(EducationLevel::ALL.iter().map(|e| e.column().to_string()));
        headers
    }

    fn full_row(zcta: &str, population: &str, age: [&str; 9]) -> Vec<String> {
        let mut row = vec![
            zcta.to_string(),
            population.to_string(),
            "40.7128".to_string(),
            "-74.0060".to_string(),
            "New York".to_string(),
        ];
        row.extend(age.iter().map(ToString::to_string));
        // All households in the $50k-$60k bracket.
        row.extend((0..16).map(|i| if i == 9 { "100" } else { "0" }.to_string()));
        row.extend(["60.5", "20.1", "10", "0.3", "0.1"].map(String::from));
        row.push("18.2".to_string());
        row.extend(["25", "20", "22.4", "11.6", "34"].map(String::from));
        row
    }

    const ALL_THIRTIES: [&str; 9] = ["0", "0", "0", "100", "0", "0", "0", "0", "0"];

    #[test]
    fn canonicalizes_column_names() {
        assert_eq!(canonical_column_name("  State Name "), "state_name");
        assert_eq!(canonical_column_name("ZCTA"), "zcta");
    }

    #[test]
    fn zero_pads_zip_codes() {
        assert_eq!(zero_pad_zip("601").as_deref(), Some("00601"));
        assert_eq!(zero_pad_zip("601.0").as_deref(), Some("00601"));
        assert_eq!(zero_pad_zip("10001").as_deref(), Some("10001"));
        assert_eq!(zero_pad_zip("A1").as_deref(), Some("000A1"));
        assert_eq!(zero_pad_zip("  "), None);
        assert_eq!(zero_pad_zip("601.5"), None);
    }

    #[test]
    fn coerces_numbers() {
        assert_eq!(coerce_number(Some(" 12.5 ")), Some(12.5));
        assert_eq!(coerce_number(Some("abc")), None);
        assert_eq!(coerce_number(Some("NaN")), None);
        assert_eq!(coerce_number(Some("")), None);
        assert_eq!(coerce_number(None), None);
    }

    #[test]
    fn fails_without_zcta_column() {
        let t = table(&["zip", "population"], &[&["00601", "100"]]);
        assert!(matches!(
            normalize(&t),
            Err(NormalizeError::MissingColumn { column: "zcta" })
        ));
    }

    #[test]
    fn fails_without_population_column() {
        let t = table(&["zcta", "pop"], &[&["00601", "100"]]);
        assert!(matches!(
            normalize(&t),
            Err(NormalizeError::MissingColumn {
                column: "population"
            })
        ));
    }

    #[test]
    fn derives_median_age_from_single_bracket() {
        let t = RawTable::new(full_headers(), vec![full_row("10001", "1000", ALL_THIRTIES)]);
        let records = normalize(&t).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].median_age, Some(35.0));
        assert_eq!(records[0].median_income, Some(55_000.0));
    }

    #[test]
    fn derives_weighted_median_age() {
        let age = ["50", "0", "0", "0", "0", "0", "0", "0", "50"];
        let t = RawTable::new(full_headers(), vec![full_row("10001", "200", age)]);
        let records = normalize(&t).unwrap();
        assert!((records[0].median_age.unwrap() - 45.0).abs() < 1e-9);
    }

    #[test]
    fn skips_median_when_a_bracket_column_is_missing() {
        let t = table(
            &["zcta", "population", "age_30s"],
            &[&["10001", "1000", "100"]],
        );
        let records = normalize(&t).unwrap();
        assert_eq!(records[0].median_age, None);
        assert_eq!(records[0].age_pct(AgeBracket::Thirties), Some(100.0));
    }

    #[test]
    fn non_numeric_bracket_leaves_median_absent() {
        let mut age = ALL_THIRTIES;
        age[0] = "n/a";
        let t = RawTable::new(full_headers(), vec![full_row("10001", "1000", age)]);
        let records = normalize(&t).unwrap();
        assert_eq!(records[0].median_age, None);
        assert_eq!(records[0].age_pct(AgeBracket::Under10), None);
    }

    #[test]
    fn drops_zero_negative_and_invalid_populations() {
        let t = table(
            &["zcta", "population"],
            &[
                &["00601", "0"],
                &["00602", "-5"],
                &["00603", "abc"],
                &["00604", ""],
                &["00605", "42"],
            ],
        );
        let records = normalize(&t).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].zip_code, "00605");
        assert_eq!(records[0].population, 42);
    }

    #[test]
    fn drops_rows_without_zip() {
        let t = table(&["zcta", "population"], &[&["", "10"], &["7", "10"]]);
        let records = normalize(&t).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].zip_code, "00007");
    }

    #[test]
    fn duplicate_columns_keep_first_occurrence() {
        let t = table(
            &["zcta", "population", "population"],
            &[&["00601", "100", "999"]],
        );
        let records = normalize(&t).unwrap();
        assert_eq!(records[0].population, 100);
    }

    #[test]
    fn duplicate_zip_rows_keep_first_occurrence() {
        let t = table(
            &["zcta", "population"],
            &[&["00601", "100"], &["601", "200"]],
        );
        let records = normalize(&t).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].population, 100);
    }

    #[test]
    fn invalid_coordinates_become_absent() {
        let t = table(
            &["zcta", "population", "lat", "lng"],
            &[&["00601", "100", "north", "-66.7"]],
        );
        let records = normalize(&t).unwrap();
        assert_eq!(records[0].latitude, None);
        assert_eq!(records[0].longitude, Some(-66.7));
    }

    #[test]
    fn prefers_canonical_coordinate_columns() {
        let t = table(
            &["zcta", "population", "lat", "lng", "latitude", "longitude"],
            &[&["00601", "100", "1", "2", "18.18", "-66.75"]],
        );
        let records = normalize(&t).unwrap();
        assert_eq!(records[0].coordinates(), Some((18.18, -66.75)));
    }

    #[test]
    fn converts_college_share_to_fraction() {
        let t = RawTable::new(full_headers(), vec![full_row("10001", "1000", ALL_THIRTIES)]);
        let record = &normalize(&t).unwrap()[0];
        assert_eq!(record.college_degree_pct, Some(0.34));
        assert_eq!(record.race(Race::White), Some(60.5));
        assert_eq!(record.hispanic_pct, Some(18.2));
        assert_eq!(record.state.as_deref(), Some("New York"));
    }

    #[test]
    fn normalizing_twice_is_identical() {
        let age = ["12.3", "11.1", "14.7", "13.2", "12.9", "12.4", "10.1", "8.2", "5.1"];
        let t = RawTable::new(
            full_headers(),
            vec![
                full_row("601", "17126", age),
                full_row("10001", "1000", ALL_THIRTIES),
            ],
        );
        let first = normalize(&t).unwrap();
        let second = normalize(&to_canonical_table(&first)).unwrap();
        assert_eq!(first, second);
    }
}
