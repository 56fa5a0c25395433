#![allow(missing_docs)]

pub mod error;
pub mod logic;
pub mod pages;
pub mod render;
pub mod response;
pub mod session;
pub mod spec;
pub mod validate;

pub use error::{DefinitionError, SessionError};
pub use logic::{FieldState, FieldStateMap, evaluate_conditional_logic, evaluate_rule, resolve_states};
pub use pages::{Page, segment};
pub use render::{PageView, RenderField, build_page_view, render_json_ui, render_text};
pub use response::{FileDescriptor, ResponseMap, ResponseValue, Submission, SubmissionStatus};
pub use session::{SessionState, SubmissionSession, Transition};
pub use spec::{
    Component, ComponentKind, ConditionalLogic, ConditionalRule, DefinitionWarning,
    FormDefinition, FormDocument, FormSettings, LogicOperator, RuleAction, RuleOperator,
    ValidationRules,
};
pub use validate::{
    ErrorCode, FieldError, ValidationReport, validate, validate_components, validate_field,
    validate_form,
};
