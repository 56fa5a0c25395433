use std::collections::BTreeMap;

use serde::Serialize;

use crate::response::{ResponseMap, ResponseValue};
use crate::spec::component::Component;
use crate::spec::form::FormDefinition;
use crate::spec::logic::{ConditionalRule, LogicOperator, RuleAction, RuleOperator};

/// Resolved presentation flags of a component for the current answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldState {
    pub visible: bool,
    pub required: bool,
    pub enabled: bool,
}

impl FieldState {
    /// Flags taken from the component definition alone.
    pub fn from_static(component: &Component) -> Self {
        Self {
            visible: component.is_visible,
            required: component.is_required,
            enabled: true,
        }
    }
}

pub type FieldStateMap = BTreeMap<String, FieldState>;

/// Computes visibility, requirement and enablement of `component`.
///
/// A triggered rule set overrides the static flag touched by each of its
/// actions; an untriggered set leaves the static flags alone. When a set
/// carries opposite actions for the same flag, the restrictive one wins:
/// hide over show, require over optional, disable over enable.
pub fn evaluate_conditional_logic(component: &Component, responses: &ResponseMap) -> FieldState {
    let mut state = FieldState::from_static(component);
    let Some(logic) = &component.conditional_logic else {
        return state;
    };

    let mut results = logic.rules.iter().map(|rule| evaluate_rule(rule, responses));
    let triggered = match logic.operator {
        LogicOperator::And => results.all(|passed| passed),
        LogicOperator::Or => logic.rules.is_empty() || results.any(|passed| passed),
    };
    tracing::trace!(component = %component.id, triggered, "evaluated conditional logic");
    if !triggered {
        return state;
    }

    let has = |action: RuleAction| logic.rules.iter().any(|rule| rule.action == action);
    if has(RuleAction::Hide) {
        state.visible = false;
    } else if has(RuleAction::Show) {
        state.visible = true;
    }
    if has(RuleAction::Require) {
        state.required = true;
    } else if has(RuleAction::Optional) {
        state.required = false;
    }
    if has(RuleAction::Disable) {
        state.enabled = false;
    } else if has(RuleAction::Enable) {
        state.enabled = true;
    }
    state
}

/// Resolves every component of the form against the current answers.
pub fn resolve_states(definition: &FormDefinition, responses: &ResponseMap) -> FieldStateMap {
    definition
        .components()
        .iter()
        .map(|component| {
            (
                component.id.clone(),
                evaluate_conditional_logic(component, responses),
            )
        })
        .collect()
}

/// Evaluates one rule against the answer of the field it references.
///
/// Values that cannot be compared make the rule false instead of failing.
pub fn evaluate_rule(rule: &ConditionalRule, responses: &ResponseMap) -> bool {
    let actual = responses.get(&rule.field_id);
    let expected = rule.value.as_ref();
    match rule.operator {
        RuleOperator::Equals => matches!((actual, expected), (Some(a), Some(e)) if a == e),
        RuleOperator::NotEquals => !matches!((actual, expected), (Some(a), Some(e)) if a == e),
        RuleOperator::Contains => contains(actual, expected),
        RuleOperator::NotContains => !contains(actual, expected),
        RuleOperator::GreaterThan => compare(rule, actual, expected, |a, e| a > e),
        RuleOperator::LessThan => compare(rule, actual, expected, |a, e| a < e),
        RuleOperator::IsEmpty => is_empty(actual),
        RuleOperator::IsNotEmpty => !is_empty(actual),
    }
}

fn is_empty(value: Option<&ResponseValue>) -> bool {
    value.is_none_or(ResponseValue::is_empty_answer)
}

// Array answers test membership of the needle; scalars test substrings of
// their string form.
fn contains(actual: Option<&ResponseValue>, expected: Option<&ResponseValue>) -> bool {
    let (Some(actual), Some(expected)) = (actual, expected) else {
        return false;
    };
    let needle = expected.to_string();
    match actual.items() {
        Some(items) => items.iter().any(|item| *item == needle),
        None => actual.to_string().contains(&needle),
    }
}

fn compare(
    rule: &ConditionalRule,
    actual: Option<&ResponseValue>,
    expected: Option<&ResponseValue>,
    op: impl Fn(f64, f64) -> bool,
) -> bool {
    let Some(actual) = actual else {
        return false;
    };
    match (actual.as_number(), expected.and_then(ResponseValue::as_number)) {
        (Some(a), Some(e)) => op(a, e),
        _ => {
            tracing::debug!(
                rule = %rule.id,
                field = %rule.field_id,
                "numeric comparison on non-numeric value evaluates false"
            );
            false
        }
    }
}
