use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::response::ResponseValue;

/// Comparison applied by a rule against another field's answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RuleOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
}

impl RuleOperator {
    /// Emptiness checks compare against nothing and must not carry a value.
    pub fn is_unary(self) -> bool {
        matches!(self, RuleOperator::IsEmpty | RuleOperator::IsNotEmpty)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuleOperator::Equals => "equals",
            RuleOperator::NotEquals => "not_equals",
            RuleOperator::Contains => "contains",
            RuleOperator::NotContains => "not_contains",
            RuleOperator::GreaterThan => "greater_than",
            RuleOperator::LessThan => "less_than",
            RuleOperator::IsEmpty => "is_empty",
            RuleOperator::IsNotEmpty => "is_not_empty",
        }
    }
}

/// Effect a triggered rule set has on its owning component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RuleAction {
    Show,
    Hide,
    Require,
    Optional,
    Enable,
    Disable,
}

impl RuleAction {
    /// The action cancelling this one on the same flag.
    pub fn opposite(self) -> RuleAction {
        match self {
            RuleAction::Show => RuleAction::Hide,
            RuleAction::Hide => RuleAction::Show,
            RuleAction::Require => RuleAction::Optional,
            RuleAction::Optional => RuleAction::Require,
            RuleAction::Enable => RuleAction::Disable,
            RuleAction::Disable => RuleAction::Enable,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RuleAction::Show => "show",
            RuleAction::Hide => "hide",
            RuleAction::Require => "require",
            RuleAction::Optional => "optional",
            RuleAction::Enable => "enable",
            RuleAction::Disable => "disable",
        }
    }
}

/// How rule results inside one set are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub enum LogicOperator {
    #[default]
    #[serde(rename = "AND", alias = "and")]
    And,
    #[serde(rename = "OR", alias = "or")]
    Or,
}

/// A single condition on another component's answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConditionalRule {
    pub id: String,
    pub field_id: String,
    pub operator: RuleOperator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ResponseValue>,
    pub action: RuleAction,
}

impl ConditionalRule {
    pub fn new(
        id: impl Into<String>,
        field_id: impl Into<String>,
        operator: RuleOperator,
        value: Option<ResponseValue>,
        action: RuleAction,
    ) -> Self {
        Self {
            id: id.into(),
            field_id: field_id.into(),
            operator,
            value,
            action,
        }
    }
}

/// Rule set owned by exactly one target component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
pub struct ConditionalLogic {
    #[serde(default)]
    pub rules: Vec<ConditionalRule>,
    #[serde(default)]
    pub operator: LogicOperator,
}

impl ConditionalLogic {
    pub fn all(rules: Vec<ConditionalRule>) -> Self {
        Self {
            rules,
            operator: LogicOperator::And,
        }
    }

    pub fn any(rules: Vec<ConditionalRule>) -> Self {
        Self {
            rules,
            operator: LogicOperator::Or,
        }
    }

    /// True when the set carries both an action and its opposite.
    pub fn has_conflicting_actions(&self) -> bool {
        self.rules.iter().any(|rule| {
            let opposite = rule.action.opposite();
            self.rules.iter().any(|other| other.action == opposite)
        })
    }
}
