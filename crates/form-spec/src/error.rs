use thiserror::Error;

use crate::spec::logic::RuleOperator;

/// Structural flaw in a form definition, detected when the form is loaded.
#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error("failed to parse form definition: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("component at orderIndex {0} has an empty id")]
    EmptyId(i64),
    #[error("component id '{0}' is declared more than once")]
    DuplicateId(String),
    #[error("orderIndex {order_index} is shared by '{first}' and '{second}'")]
    DuplicateOrderIndex {
        order_index: i64,
        first: String,
        second: String,
    },
    #[error("rule '{rule}' on '{component}' references unknown field '{field}'")]
    DanglingReference {
        component: String,
        rule: String,
        field: String,
    },
    #[error("rule '{rule}' on '{component}' uses {} and must not carry a value", .operator.as_str())]
    UnexpectedRuleValue {
        component: String,
        rule: String,
        operator: RuleOperator,
    },
    #[error("rule '{rule}' on '{component}' uses {} and needs a value", .operator.as_str())]
    MissingRuleValue {
        component: String,
        rule: String,
        operator: RuleOperator,
    },
    #[error("pattern on '{component}' is not a valid regular expression: {source}")]
    InvalidPattern {
        component: String,
        #[source]
        source: regex::Error,
    },
    #[error("allowed file type '{pattern}' on '{component}' is not a valid glob: {source}")]
    InvalidFileType {
        component: String,
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("'{component}' declares inverted bounds {bounds}")]
    InvertedRange {
        component: String,
        bounds: &'static str,
    },
    #[error("'{component}' is a {kind} component without options")]
    MissingOptions {
        component: String,
        kind: &'static str,
    },
}

/// Misuse of a submission session by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("submission '{0}' was already submitted")]
    AlreadySubmitted(String),
    #[error("already on the first page")]
    AtFirstPage,
    #[error("this form does not allow returning to previous pages")]
    PreviousDisabled,
    #[error("autosave is disabled for form '{0}'")]
    AutosaveDisabled(String),
    #[error("component '{0}' does not exist in this form")]
    UnknownComponent(String),
    #[error("component '{0}' is structural and cannot hold an answer")]
    StructuralComponent(String),
    #[error("snapshot belongs to form '{found}', expected '{expected}'")]
    FormMismatch { expected: String, found: String },
}
