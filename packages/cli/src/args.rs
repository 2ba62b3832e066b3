//! Filter flags shared by the analysis subcommands.

use std::path::PathBuf;

use clap::Args;
use zip_market_analytics_models::FilterParams;

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// JSON file with filter parameters (camelCase keys). Flags given on the
    /// command line are applied on top.
    #[arg(long)]
    pub filters: Option<PathBuf>,

    /// Age ranges, e.g. `30-39,40-49`
    #[arg(long, value_delimiter = ',')]
    pub age: Vec<String>,

    /// Income ranges, e.g. `under-50k,over-200k`
    #[arg(long, value_delimiter = ',')]
    pub income: Vec<String>,

    /// Ethnicities, e.g. `asian,hispanic`
    #[arg(long, value_delimiter = ',')]
    pub ethnicity: Vec<String>,

    /// Education levels, e.g. `bachelors,graduate`
    #[arg(long, value_delimiter = ',')]
    pub education: Vec<String>,

    /// Require this ethnicity's share to reach its concentration threshold
    #[arg(long)]
    pub majority_ethnicity: Option<String>,

    /// Minimum median age
    #[arg(long)]
    pub min_age: Option<f64>,

    /// Maximum median age
    #[arg(long)]
    pub max_age: Option<f64>,

    /// Minimum median household income
    #[arg(long)]
    pub min_income: Option<f64>,

    /// Maximum median household income
    #[arg(long)]
    pub max_income: Option<f64>,

    /// Minimum share of adults with a college degree (percent)
    #[arg(long)]
    pub min_college_pct: Option<f64>,

    /// Minimum ZIP code population
    #[arg(long)]
    pub min_population: Option<f64>,
}

impl FilterArgs {
    /// Builds filter parameters from the optional JSON file and the flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the filters file cannot be read or parsed.
    pub fn to_params(&self) -> Result<FilterParams, Box<dyn std::error::Error>> {
        let mut params = match &self.filters {
            Some(path) => {
                log::debug!("Reading filters from {}", path.display());
                serde_json::from_str(&std::fs::read_to_string(path)?)?
            }
            None => FilterParams::default(),
        };

        self.apply(&mut params);
        Ok(params)
    }

    fn apply(&self, params: &mut FilterParams) {
        let tags = [
            (&self.age, &mut params.age),
            (&self.income, &mut params.income),
            (&self.ethnicity, &mut params.ethnicity),
            (&self.education, &mut params.education),
        ];
        for (flag, target) in tags {
            if !flag.is_empty() {
                target.clone_from(flag);
            }
        }

        let bounds = [
            (self.min_age, &mut params.min_age),
            (self.max_age, &mut params.max_age),
            (self.min_income, &mut params.min_income),
            (self.max_income, &mut params.max_income),
            (self.min_college_pct, &mut params.min_college_pct),
            (self.min_population, &mut params.min_population),
        ];
        for (flag, target) in bounds {
            if flag.is_some() {
                *target = flag;
            }
        }

        if self.majority_ethnicity.is_some() {
            params.majority_ethnicity.clone_from(&self.majority_ethnicity);
        }
    }
}
