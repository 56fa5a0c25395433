use std::fmt;
use std::sync::LazyLock;

use chrono::NaiveDate;
use globset::{GlobBuilder, GlobSetBuilder};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::logic::evaluate_conditional_logic;
use crate::response::{FileDescriptor, ResponseMap, ResponseValue};
use crate::spec::component::{Component, ComponentKind};
use crate::spec::form::FormDefinition;
use crate::spec::rules::ValidationRules;

static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").ok());
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Machine-readable reason of a failed check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Required,
    TypeMismatch,
    MinLength,
    MaxLength,
    PatternMismatch,
    NotANumber,
    NotAnInteger,
    BelowMinimum,
    AboveMaximum,
    InvalidEmail,
    InvalidOption,
    TooFewSelections,
    TooManySelections,
    RatingOutOfRange,
    TooManyFiles,
    FileTooLarge,
    FileTypeNotAllowed,
    InvalidDate,
    DateTooEarly,
    DateTooLate,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::Required => "required",
            ErrorCode::TypeMismatch => "type_mismatch",
            ErrorCode::MinLength => "min_length",
            ErrorCode::MaxLength => "max_length",
            ErrorCode::PatternMismatch => "pattern_mismatch",
            ErrorCode::NotANumber => "not_a_number",
            ErrorCode::NotAnInteger => "not_an_integer",
            ErrorCode::BelowMinimum => "below_minimum",
            ErrorCode::AboveMaximum => "above_maximum",
            ErrorCode::InvalidEmail => "invalid_email",
            ErrorCode::InvalidOption => "invalid_option",
            ErrorCode::TooFewSelections => "too_few_selections",
            ErrorCode::TooManySelections => "too_many_selections",
            ErrorCode::RatingOutOfRange => "rating_out_of_range",
            ErrorCode::TooManyFiles => "too_many_files",
            ErrorCode::FileTooLarge => "file_too_large",
            ErrorCode::FileTypeNotAllowed => "file_type_not_allowed",
            ErrorCode::InvalidDate => "invalid_date",
            ErrorCode::DateTooEarly => "date_too_early",
            ErrorCode::DateTooLate => "date_too_late",
        }
    }
}

/// Validation failure scoped to a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field_id: String,
    pub code: ErrorCode,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field_id, self.message)
    }
}

/// Outcome of a full-form validation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_fields: Vec<String>,
}

/// Checks `value` against the constraints of `component`.
///
/// `required` is the currently effective requirement (static flag or
/// conditional override). Checks run in a fixed order and the first failure
/// is returned. Structural components never fail.
///
/// Only an absent value, `""` or an empty array counts as missing here.
/// Whitespace-only text is an answer and goes through the remaining checks;
/// use `minLength` or `pattern` to reject it. The `is_empty` rule operator
/// trims instead, see [`ResponseValue::is_empty_answer`].
pub fn validate(
    component: &Component,
    value: Option<&ResponseValue>,
    required: bool,
) -> Option<FieldError> {
    if component.is_structural() {
        return None;
    }
    if required && value.is_none_or(ResponseValue::is_blank) {
        return Some(FieldError {
            field_id: component.id.clone(),
            code: ErrorCode::Required,
            message: format!("{} is required", component.display_label()),
        });
    }
    let value = value.filter(|value| !value.is_blank())?;

    let default_rules = ValidationRules::default();
    let rules = component
        .validation_rules
        .as_ref()
        .unwrap_or(&default_rules);
    let check = Check { component, rules };

    check
        .length(value)
        .or_else(|| check.pattern(value))
        .or_else(|| check.range(value))
        .or_else(|| check.kind(value))
}

/// Validates a component after resolving its conditional logic.
///
/// Invisible components are exempt, even when marked required.
pub fn validate_field(component: &Component, responses: &ResponseMap) -> Option<FieldError> {
    let state = evaluate_conditional_logic(component, responses);
    if !state.visible {
        return None;
    }
    validate(component, responses.get(&component.id), state.required)
}

/// Validates every visible component in `components`.
pub fn validate_components<'a>(
    components: impl IntoIterator<Item = &'a Component>,
    responses: &ResponseMap,
) -> Vec<FieldError> {
    components
        .into_iter()
        .filter_map(|component| validate_field(component, responses))
        .collect()
}

/// Full-form pass; answers for ids the form does not declare are reported as unknown.
pub fn validate_form(definition: &FormDefinition, responses: &ResponseMap) -> ValidationReport {
    let errors = validate_components(definition.components(), responses);
    let unknown_fields = responses
        .keys()
        .filter(|key| {
            definition
                .component(key)
                .is_none_or(Component::is_structural)
        })
        .map(str::to_string)
        .collect::<Vec<_>>();
    ValidationReport {
        valid: errors.is_empty() && unknown_fields.is_empty(),
        errors,
        unknown_fields,
    }
}

struct Check<'a> {
    component: &'a Component,
    rules: &'a ValidationRules,
}

impl Check<'_> {
    fn fail(&self, code: ErrorCode, message: impl Into<String>) -> Option<FieldError> {
        Some(FieldError {
            field_id: self.component.id.clone(),
            code,
            message: self.rules.message.clone().unwrap_or_else(|| message.into()),
        })
    }

    fn length(&self, value: &ResponseValue) -> Option<FieldError> {
        let text = value.as_text()?;
        let length = text.chars().count();
        if let Some(min) = self.rules.min_length
            && length < min
        {
            return self.fail(
                ErrorCode::MinLength,
                format!("must be at least {min} characters"),
            );
        }
        if let Some(max) = self.rules.max_length
            && length > max
        {
            return self.fail(
                ErrorCode::MaxLength,
                format!("must be at most {max} characters"),
            );
        }
        None
    }

    fn pattern(&self, value: &ResponseValue) -> Option<FieldError> {
        let pattern = self.rules.pattern.as_deref()?;
        let text = value.as_text()?;
        let matched = Regex::new(&format!("^(?:{pattern})$"))
            .map(|regex| regex.is_match(text))
            .unwrap_or(false);
        if matched {
            None
        } else {
            self.fail(ErrorCode::PatternMismatch, "does not match the expected format")
        }
    }

    fn range(&self, value: &ResponseValue) -> Option<FieldError> {
        if self.rules.min.is_none() && self.rules.max.is_none() {
            return None;
        }
        let Some(number) = value.as_number() else {
            return self.fail(ErrorCode::NotANumber, "must be a number");
        };
        if let Some(min) = self.rules.min
            && number < min
        {
            return self.fail(
                ErrorCode::BelowMinimum,
                format!("must be at least {}", ResponseValue::Number(min)),
            );
        }
        if let Some(max) = self.rules.max
            && number > max
        {
            return self.fail(
                ErrorCode::AboveMaximum,
                format!("must be at most {}", ResponseValue::Number(max)),
            );
        }
        None
    }

    fn kind(&self, value: &ResponseValue) -> Option<FieldError> {
        match &self.component.kind {
            ComponentKind::Text(_) | ComponentKind::Textarea(_) => self.expect_text(value).err(),
            ComponentKind::Email(_) => {
                let text = match self.expect_text(value) {
                    Ok(text) => text,
                    Err(error) => return Some(error),
                };
                let valid = EMAIL.as_ref().is_some_and(|regex| regex.is_match(text));
                if valid {
                    None
                } else {
                    self.fail(ErrorCode::InvalidEmail, "must be a valid email address")
                }
            }
            ComponentKind::Number(config) => {
                let Some(number) = value.as_number() else {
                    return self.fail(ErrorCode::NotANumber, "must be a number");
                };
                if config.integer && number.fract() != 0.0 {
                    return self.fail(ErrorCode::NotAnInteger, "must be a whole number");
                }
                None
            }
            ComponentKind::Dropdown(config) | ComponentKind::SingleChoice(config) => {
                let text = match self.expect_text(value) {
                    Ok(text) => text,
                    Err(error) => return Some(error),
                };
                if config.contains(text) {
                    None
                } else {
                    self.fail(ErrorCode::InvalidOption, format!("'{text}' is not an option"))
                }
            }
            ComponentKind::MultiChoice(config) => {
                let ResponseValue::List(items) = value else {
                    return self.fail(ErrorCode::TypeMismatch, "expected a list of options");
                };
                if let Some(unknown) = items.iter().find(|item| !config.contains(item)) {
                    return self.fail(
                        ErrorCode::InvalidOption,
                        format!("'{unknown}' is not an option"),
                    );
                }
                self.selections(items.len())
            }
            ComponentKind::Checkbox => match value {
                ResponseValue::Bool(_) => None,
                _ => self.fail(ErrorCode::TypeMismatch, "expected true or false"),
            },
            ComponentKind::File(config) => {
                let ResponseValue::Files(files) = value else {
                    return self.fail(ErrorCode::TypeMismatch, "expected uploaded files");
                };
                let limit = self
                    .rules
                    .max_files
                    .or(if config.multiple { None } else { Some(1) });
                self.files(files, limit)
            }
            ComponentKind::RatingStars(_)
            | ComponentKind::RatingScale(_)
            | ComponentKind::RatingNps => self.rating(value),
            ComponentKind::Date => self.date(value),
            ComponentKind::PageBreak | ComponentKind::SectionHeader(_) => None,
        }
    }

    fn expect_text<'v>(&self, value: &'v ResponseValue) -> Result<&'v str, FieldError> {
        match value.as_text() {
            Some(text) => Ok(text),
            None => Err(FieldError {
                field_id: self.component.id.clone(),
                code: ErrorCode::TypeMismatch,
                message: self
                    .rules
                    .message
                    .clone()
                    .unwrap_or_else(|| "expected text".into()),
            }),
        }
    }

    fn selections(&self, count: usize) -> Option<FieldError> {
        if let Some(min) = self.rules.min_selections
            && count < min
        {
            return self.fail(
                ErrorCode::TooFewSelections,
                format!("select at least {min} options"),
            );
        }
        if let Some(max) = self.rules.max_selections
            && count > max
        {
            return self.fail(
                ErrorCode::TooManySelections,
                format!("select at most {max} options"),
            );
        }
        None
    }

    fn rating(&self, value: &ResponseValue) -> Option<FieldError> {
        let Some(rating) = value.as_number() else {
            return self.fail(ErrorCode::NotANumber, "rating must be a number");
        };
        let (config_min, config_max) = self.component.kind.rating_bounds()?;
        let min = self.rules.min_rating.unwrap_or(config_min);
        let max = self.rules.max_rating.unwrap_or(config_max);
        if rating < min || rating > max {
            return self.fail(
                ErrorCode::RatingOutOfRange,
                format!(
                    "rating must be between {} and {}",
                    ResponseValue::Number(min),
                    ResponseValue::Number(max)
                ),
            );
        }
        None
    }

    fn files(&self, files: &[FileDescriptor], limit: Option<usize>) -> Option<FieldError> {
        if let Some(limit) = limit
            && files.len() > limit
        {
            return self.fail(
                ErrorCode::TooManyFiles,
                format!("at most {limit} file(s) may be uploaded"),
            );
        }
        if let Some(max_size) = self.rules.max_file_size
            && let Some(file) = files.iter().find(|file| file.size > max_size)
        {
            return self.fail(
                ErrorCode::FileTooLarge,
                format!("'{}' exceeds the {max_size} byte limit", file.name),
            );
        }
        if self.rules.allowed_file_types.is_empty() {
            return None;
        }
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.rules.allowed_file_types {
            let pattern = if pattern.starts_with('.') {
                format!("*{pattern}")
            } else {
                pattern.clone()
            };
            if let Ok(glob) = GlobBuilder::new(&pattern).case_insensitive(true).build() {
                builder.add(glob);
            }
        }
        let allowed = match builder.build() {
            Ok(set) => set,
            Err(_) => {
                return self.fail(ErrorCode::FileTypeNotAllowed, "file types cannot be checked");
            }
        };
        if let Some(file) = files
            .iter()
            .find(|file| !allowed.is_match(&file.mime_type) && !allowed.is_match(&file.name))
        {
            return self.fail(
                ErrorCode::FileTypeNotAllowed,
                format!("'{}' has a file type that is not allowed", file.name),
            );
        }
        None
    }

    fn date(&self, value: &ResponseValue) -> Option<FieldError> {
        let parsed = value
            .as_text()
            .and_then(|text| NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok());
        let Some(date) = parsed else {
            return self.fail(ErrorCode::InvalidDate, "must be a date (YYYY-MM-DD)");
        };
        if let Some(min) = self.rules.min_date
            && date < min
        {
            return self.fail(ErrorCode::DateTooEarly, format!("must be on or after {min}"));
        }
        if let Some(max) = self.rules.max_date
            && date > max
        {
            return self.fail(ErrorCode::DateTooLate, format!("must be on or before {max}"));
        }
        None
    }
}
