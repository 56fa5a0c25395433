use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::spec::logic::ConditionalLogic;
use crate::spec::rules::ValidationRules;

/// A selectable option for choice-based components.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChoiceOption {
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl ChoiceOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: None,
        }
    }

    /// Display text, falling back to the stored value.
    pub fn display(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct NumberConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Only whole numbers are accepted.
    #[serde(default)]
    pub integer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceConfig {
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
}

impl ChoiceConfig {
    pub fn contains(&self, value: &str) -> bool {
        self.options.iter().any(|option| option.value == value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    /// When false the component accepts a single file.
    #[serde(default)]
    pub multiple: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StarsConfig {
    #[serde(default = "default_star_count")]
    pub max_rating: u32,
}

impl Default for StarsConfig {
    fn default() -> Self {
        Self {
            max_rating: default_star_count(),
        }
    }
}

fn default_star_count() -> u32 {
    5
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScaleConfig {
    #[serde(default = "default_scale_min")]
    pub min_rating: u32,
    #[serde(default = "default_scale_max")]
    pub max_rating: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_label: Option<String>,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            min_rating: default_scale_min(),
            max_rating: default_scale_max(),
            min_label: None,
            max_label: None,
        }
    }
}

fn default_scale_min() -> u32 {
    1
}

fn default_scale_max() -> u32 {
    10
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct SectionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
}

/// Closed set of component kinds, each carrying its own typed configuration.
///
/// Serialized as `{"kind": "rating-scale", "config": {...}}`; kinds without
/// settings omit `config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", content = "config", rename_all = "kebab-case")]
pub enum ComponentKind {
    Text(TextConfig),
    Textarea(TextConfig),
    Email(TextConfig),
    Number(NumberConfig),
    Dropdown(ChoiceConfig),
    SingleChoice(ChoiceConfig),
    MultiChoice(ChoiceConfig),
    Checkbox,
    File(FileConfig),
    RatingStars(StarsConfig),
    RatingScale(ScaleConfig),
    RatingNps,
    Date,
    PageBreak,
    SectionHeader(SectionConfig),
}

impl ComponentKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Text(_) => "text",
            ComponentKind::Textarea(_) => "textarea",
            ComponentKind::Email(_) => "email",
            ComponentKind::Number(_) => "number",
            ComponentKind::Dropdown(_) => "dropdown",
            ComponentKind::SingleChoice(_) => "single-choice",
            ComponentKind::MultiChoice(_) => "multi-choice",
            ComponentKind::Checkbox => "checkbox",
            ComponentKind::File(_) => "file",
            ComponentKind::RatingStars(_) => "rating-stars",
            ComponentKind::RatingScale(_) => "rating-scale",
            ComponentKind::RatingNps => "rating-nps",
            ComponentKind::Date => "date",
            ComponentKind::PageBreak => "page-break",
            ComponentKind::SectionHeader(_) => "section-header",
        }
    }

    /// Structural kinds shape the layout and never carry an answer.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            ComponentKind::PageBreak | ComponentKind::SectionHeader(_)
        )
    }

    pub fn is_page_break(&self) -> bool {
        matches!(self, ComponentKind::PageBreak)
    }

    pub fn choices(&self) -> Option<&ChoiceConfig> {
        match self {
            ComponentKind::Dropdown(config)
            | ComponentKind::SingleChoice(config)
            | ComponentKind::MultiChoice(config) => Some(config),
            _ => None,
        }
    }

    /// Inclusive rating bounds implied by the kind configuration.
    pub fn rating_bounds(&self) -> Option<(f64, f64)> {
        match self {
            ComponentKind::RatingStars(config) => Some((1.0, f64::from(config.max_rating))),
            ComponentKind::RatingScale(config) => Some((
                f64::from(config.min_rating),
                f64::from(config.max_rating),
            )),
            ComponentKind::RatingNps => Some((0.0, 10.0)),
            _ => None,
        }
    }
}

/// One field or structural marker inside a form definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: String,
    #[serde(flatten)]
    pub kind: ComponentKind,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_rules: Option<ValidationRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_logic: Option<ConditionalLogic>,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    #[serde(default)]
    pub is_required: bool,
    pub order_index: i64,
}

fn default_true() -> bool {
    true
}

impl Component {
    /// Creates a visible, optional component with no rules attached.
    pub fn new(id: impl Into<String>, kind: ComponentKind, order_index: i64) -> Self {
        Self {
            id: id.into(),
            kind,
            label: String::new(),
            description: None,
            validation_rules: None,
            conditional_logic: None,
            is_visible: true,
            is_required: false,
            order_index,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.is_visible = false;
        self
    }

    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.validation_rules = Some(rules);
        self
    }

    pub fn with_logic(mut self, logic: ConditionalLogic) -> Self {
        self.conditional_logic = Some(logic);
        self
    }

    pub fn is_structural(&self) -> bool {
        self.kind.is_structural()
    }

    /// Label used in messages, falling back to the id.
    pub fn display_label(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}
