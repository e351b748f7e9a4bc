use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::EvalError;

/// Default for [`EvaluateOptions::date_cutoff`].
pub const DEFAULT_DATE_CUTOFF: NaiveDate = match NaiveDate::from_ymd_opt(1930, 1, 1) {
    Some(date) => date,
    None => panic!("1930-01-01 is a valid calendar date"),
};

/// Policy values for constraint evaluation.
///
/// Every field falls back to its default when omitted, so a TOML file only
/// needs the values it overrides:
///
/// ```toml
/// extreme_price_threshold = 250.0
/// date_cutoff = "1945-12-31"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluateOptions {
    /// Prices strictly above this are reported as extreme outliers.
    pub extreme_price_threshold: f64,
    /// Cleaned prices strictly above this are reported as uncapped.
    pub cleaned_price_threshold: f64,
    /// Menu dates strictly after this are reported as anachronistic.
    pub date_cutoff: NaiveDate,
    /// Number of offending rows shown per constraint in reports.
    pub max_examples: usize,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        Self {
            extreme_price_threshold: 100.0,
            cleaned_price_threshold: 60.0,
            date_cutoff: DEFAULT_DATE_CUTOFF,
            max_examples: 5,
        }
    }
}

impl EvaluateOptions {
    /// Parse and validate options from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, EvalError> {
        let options: EvaluateOptions = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Load options from a TOML file.
    pub fn load(path: &Path) -> Result<Self, EvalError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), EvalError> {
        for (name, value) in [
            ("extreme_price_threshold", self.extreme_price_threshold),
            ("cleaned_price_threshold", self.cleaned_price_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(EvalError::InvalidOptions(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }
        if self.max_examples == 0 {
            return Err(EvalError::InvalidOptions(
                "max_examples must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
