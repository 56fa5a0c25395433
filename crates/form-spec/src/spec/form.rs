use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use globset::GlobBuilder;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DefinitionError;
use crate::spec::component::Component;
use crate::spec::logic::RuleAction;

/// Session behavior shared by every respondent of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSettings {
    /// Whether partial snapshots may be produced.
    #[serde(default = "default_true")]
    pub autosave: bool,
    /// Whether respondents may navigate back to earlier pages.
    #[serde(default = "default_true")]
    pub allow_previous: bool,
}

impl Default for FormSettings {
    fn default() -> Self {
        Self {
            autosave: true,
            allow_previous: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Unchecked form definition as supplied by a definition source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormDocument {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub settings: FormSettings,
    pub components: Vec<Component>,
}

fn default_version() -> String {
    "1".into()
}

/// A structurally valid form definition.
///
/// Components are kept sorted by `order_index`. The only way to obtain one
/// is through [`FormDefinition::new`] (or deserialization, which calls it),
/// so every other module may assume ids and order indices are unique and
/// every rule points at an existing component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FormDocument", into = "FormDocument")]
pub struct FormDefinition {
    document: FormDocument,
}

impl From<FormDefinition> for FormDocument {
    fn from(definition: FormDefinition) -> Self {
        definition.document
    }
}

impl TryFrom<FormDocument> for FormDefinition {
    type Error = DefinitionError;

    fn try_from(document: FormDocument) -> Result<Self, Self::Error> {
        FormDefinition::new(document)
    }
}

impl FormDefinition {
    pub fn new(mut document: FormDocument) -> Result<Self, DefinitionError> {
        check_identity(&document.components)?;
        let ids: BTreeSet<&str> = document
            .components
            .iter()
            .map(|component| component.id.as_str())
            .collect();
        for component in &document.components {
            check_logic(component, &ids)?;
            check_rules(component)?;
            check_rating_bounds(component)?;
            if let Some(choices) = component.kind.choices()
                && choices.options.is_empty()
            {
                return Err(DefinitionError::MissingOptions {
                    component: component.id.clone(),
                    kind: component.kind.as_str(),
                });
            }
        }
        document.components.sort_by_key(|component| component.order_index);
        tracing::debug!(
            form_id = %document.id,
            components = document.components.len(),
            "loaded form definition"
        );
        Ok(Self { document })
    }

    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        let document: FormDocument = serde_json::from_str(json)?;
        Self::new(document)
    }

    pub fn from_value(value: Value) -> Result<Self, DefinitionError> {
        let document: FormDocument = serde_json::from_value(value)?;
        Self::new(document)
    }

    pub fn id(&self) -> &str {
        &self.document.id
    }

    pub fn title(&self) -> &str {
        &self.document.title
    }

    pub fn version(&self) -> &str {
        &self.document.version
    }

    pub fn description(&self) -> Option<&str> {
        self.document.description.as_deref()
    }

    pub fn settings(&self) -> FormSettings {
        self.document.settings
    }

    /// Components in document order.
    pub fn components(&self) -> &[Component] {
        &self.document.components
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.document
            .components
            .iter()
            .find(|component| component.id == id)
    }

    /// Components that can hold an answer.
    pub fn data_components(&self) -> impl Iterator<Item = &Component> {
        self.document
            .components
            .iter()
            .filter(|component| !component.is_structural())
    }

    pub fn into_document(self) -> FormDocument {
        self.document
    }

    /// Design-time findings that are legal but probably unintended.
    pub fn lint(&self) -> Vec<DefinitionWarning> {
        let mut warnings = Vec::new();
        for component in &self.document.components {
            let Some(logic) = &component.conditional_logic else {
                continue;
            };
            if logic.rules.is_empty() {
                warnings.push(DefinitionWarning::EmptyRuleSet {
                    component: component.id.clone(),
                });
            }
            if logic.has_conflicting_actions() {
                let mut actions = Vec::new();
                for rule in &logic.rules {
                    let opposed = logic
                        .rules
                        .iter()
                        .any(|other| other.action == rule.action.opposite());
                    if opposed && !actions.contains(&rule.action) {
                        actions.push(rule.action);
                    }
                }
                warnings.push(DefinitionWarning::ConflictingActions {
                    component: component.id.clone(),
                    actions,
                });
            }
            for rule in &logic.rules {
                if rule.field_id == component.id {
                    warnings.push(DefinitionWarning::SelfReference {
                        component: component.id.clone(),
                        rule: rule.id.clone(),
                    });
                } else if self
                    .component(&rule.field_id)
                    .is_some_and(Component::is_structural)
                {
                    warnings.push(DefinitionWarning::StructuralReference {
                        component: component.id.clone(),
                        rule: rule.id.clone(),
                        field: rule.field_id.clone(),
                    });
                }
            }
        }
        warnings
    }
}

/// Legal but suspicious constructs reported to form authors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "warning", rename_all = "snake_case")]
pub enum DefinitionWarning {
    /// An empty rule set always passes and changes nothing.
    EmptyRuleSet { component: String },
    ConflictingActions {
        component: String,
        actions: Vec<RuleAction>,
    },
    SelfReference { component: String, rule: String },
    /// Structural components never hold answers, so the rule only sees emptiness.
    StructuralReference {
        component: String,
        rule: String,
        field: String,
    },
}

impl fmt::Display for DefinitionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefinitionWarning::EmptyRuleSet { component } => write!(
                f,
                "'{component}' has an empty rule set; it always passes and its actions never apply"
            ),
            DefinitionWarning::ConflictingActions { component, actions } => {
                let names = actions
                    .iter()
                    .map(|action| action.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "'{component}' mixes opposite actions ({names}); the most restrictive one wins"
                )
            }
            DefinitionWarning::SelfReference { component, rule } => {
                write!(f, "rule '{rule}' on '{component}' depends on its own answer")
            }
            DefinitionWarning::StructuralReference {
                component,
                rule,
                field,
            } => write!(
                f,
                "rule '{rule}' on '{component}' references structural component '{field}'"
            ),
        }
    }
}

fn check_identity(components: &[Component]) -> Result<(), DefinitionError> {
    let mut ids = BTreeSet::new();
    let mut indices: BTreeMap<i64, &str> = BTreeMap::new();
    for component in components {
        if component.id.trim().is_empty() {
            return Err(DefinitionError::EmptyId(component.order_index));
        }
        if !ids.insert(component.id.as_str()) {
            return Err(DefinitionError::DuplicateId(component.id.clone()));
        }
        if let Some(first) = indices.insert(component.order_index, &component.id) {
            return Err(DefinitionError::DuplicateOrderIndex {
                order_index: component.order_index,
                first: first.to_string(),
                second: component.id.clone(),
            });
        }
    }
    Ok(())
}

fn check_logic(component: &Component, ids: &BTreeSet<&str>) -> Result<(), DefinitionError> {
    let Some(logic) = &component.conditional_logic else {
        return Ok(());
    };
    for rule in &logic.rules {
        if !ids.contains(rule.field_id.as_str()) {
            return Err(DefinitionError::DanglingReference {
                component: component.id.clone(),
                rule: rule.id.clone(),
                field: rule.field_id.clone(),
            });
        }
        match (rule.operator.is_unary(), rule.value.is_some()) {
            (true, true) => {
                return Err(DefinitionError::UnexpectedRuleValue {
                    component: component.id.clone(),
                    rule: rule.id.clone(),
                    operator: rule.operator,
                });
            }
            (false, false) => {
                return Err(DefinitionError::MissingRuleValue {
                    component: component.id.clone(),
                    rule: rule.id.clone(),
                    operator: rule.operator,
                });
            }
            _ => {}
        }
    }
    Ok(())
}

fn check_rules(component: &Component) -> Result<(), DefinitionError> {
    let Some(rules) = &component.validation_rules else {
        return Ok(());
    };
    if let Some(pattern) = &rules.pattern {
        Regex::new(pattern).map_err(|source| DefinitionError::InvalidPattern {
            component: component.id.clone(),
            source,
        })?;
    }
    for pattern in &rules.allowed_file_types {
        GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|source| DefinitionError::InvalidFileType {
                component: component.id.clone(),
                pattern: pattern.clone(),
                source,
            })?;
    }
    if let Some(bounds) = rules.inverted_ranges().into_iter().next() {
        return Err(DefinitionError::InvertedRange {
            component: component.id.clone(),
            bounds,
        });
    }
    Ok(())
}

// Kind config and rule overrides together must leave at least one valid rating.
fn check_rating_bounds(component: &Component) -> Result<(), DefinitionError> {
    let Some((config_min, config_max)) = component.kind.rating_bounds() else {
        return Ok(());
    };
    let rules = component.validation_rules.as_ref();
    let min = rules.and_then(|rules| rules.min_rating).unwrap_or(config_min);
    let max = rules.and_then(|rules| rules.max_rating).unwrap_or(config_max);
    let bounds = if config_min > config_max {
        "config minRating/maxRating"
    } else if min > max {
        "effective minRating/maxRating"
    } else {
        return Ok(());
    };
    Err(DefinitionError::InvertedRange {
        component: component.id.clone(),
        bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn components_are_sorted_by_order_index() {
        let form = FormDefinition::from_value(json!({
            "id": "sorted",
            "components": [
                { "id": "b", "kind": "text", "config": {}, "orderIndex": 5 },
                { "id": "a", "kind": "text", "config": {}, "orderIndex": 1 }
            ]
        }))
        .expect("valid form");
        let ids = form
            .components()
            .iter()
            .map(|component| component.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn unknown_operator_is_a_parse_error() {
        let err = FormDefinition::from_value(json!({
            "id": "bad",
            "components": [
                { "id": "a", "kind": "text", "config": {}, "orderIndex": 0 },
                {
                    "id": "b", "kind": "text", "config": {}, "orderIndex": 1,
                    "conditionalLogic": {
                        "operator": "AND",
                        "rules": [
                            { "id": "r", "fieldId": "a", "operator": "roughly", "value": "x", "action": "show" }
                        ]
                    }
                }
            ]
        }))
        .unwrap_err();
        assert!(matches!(err, DefinitionError::Parse(_)));
    }
}
