use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Constraints enforced per component by the validation engine.
///
/// Every field is optional; an unset field imposes nothing beyond the
/// defaults implied by the component kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    /// Regular expression the whole value must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_selections: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_selections: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_files: Option<usize>,
    /// Per-file size limit in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<u64>,
    /// Glob patterns such as `image/*`, `application/pdf` or `*.csv`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed_file_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_date: Option<NaiveDate>,
    /// Replaces the built-in message of every non-required failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ValidationRules {
    pub fn length(min: Option<usize>, max: Option<usize>) -> Self {
        Self {
            min_length: min,
            max_length: max,
            ..Self::default()
        }
    }

    pub fn range(min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            min,
            max,
            ..Self::default()
        }
    }

    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            pattern: Some(pattern.into()),
            ..Self::default()
        }
    }

    /// Names of bound pairs whose lower end exceeds the upper end.
    pub(crate) fn inverted_ranges(&self) -> Vec<&'static str> {
        let mut inverted = Vec::new();
        if let (Some(min), Some(max)) = (self.min_length, self.max_length)
            && min > max
        {
            inverted.push("minLength/maxLength");
        }
        if let (Some(min), Some(max)) = (self.min, self.max)
            && min > max
        {
            inverted.push("min/max");
        }
        if let (Some(min), Some(max)) = (self.min_rating, self.max_rating)
            && min > max
        {
            inverted.push("minRating/maxRating");
        }
        if let (Some(min), Some(max)) = (self.min_selections, self.max_selections)
            && min > max
        {
            inverted.push("minSelections/maxSelections");
        }
        if let (Some(min), Some(max)) = (self.min_date, self.max_date)
            && min > max
        {
            inverted.push("minDate/maxDate");
        }
        inverted
    }
}
