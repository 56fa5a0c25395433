pub mod component;
pub mod form;
pub mod logic;
pub mod rules;

pub use component::{
    ChoiceConfig, ChoiceOption, Component, ComponentKind, FileConfig, NumberConfig, ScaleConfig,
    SectionConfig, StarsConfig, TextConfig,
};
pub use form::{DefinitionWarning, FormDefinition, FormDocument, FormSettings};
pub use logic::{ConditionalLogic, ConditionalRule, LogicOperator, RuleAction, RuleOperator};
pub use rules::ValidationRules;
