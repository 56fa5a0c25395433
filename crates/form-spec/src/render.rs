use serde_json::{Map, Value, json};

use crate::response::ResponseValue;
use crate::session::{SessionState, SubmissionSession};
use crate::spec::component::ComponentKind;
use crate::validate::FieldError;

/// Describes a single component of the current page for renderers.
#[derive(Debug, Clone)]
pub struct RenderField {
    pub id: String,
    pub kind: &'static str,
    pub label: String,
    pub description: Option<String>,
    pub visible: bool,
    pub required: bool,
    pub enabled: bool,
    pub structural: bool,
    pub options: Vec<String>,
    pub current_value: Option<ResponseValue>,
    pub error: Option<FieldError>,
}

/// Collected view of the page a respondent is looking at.
#[derive(Debug, Clone)]
pub struct PageView {
    pub form_id: String,
    pub form_title: String,
    pub page_index: usize,
    pub page_count: usize,
    pub submitted: bool,
    pub fields: Vec<RenderField>,
}

impl PageView {
    pub fn visible_fields(&self) -> impl Iterator<Item = &RenderField> {
        self.fields.iter().filter(|field| field.visible)
    }
}

/// Build the view of the session's current page.
pub fn build_page_view(session: &SubmissionSession) -> PageView {
    let fields = session
        .field_states()
        .into_iter()
        .map(|(component, state)| RenderField {
            id: component.id.clone(),
            kind: component.kind.as_str(),
            label: component.display_label().to_string(),
            description: match &component.kind {
                ComponentKind::SectionHeader(config) => config
                    .subtitle
                    .clone()
                    .or_else(|| component.description.clone()),
                _ => component.description.clone(),
            },
            visible: state.visible,
            required: state.required,
            enabled: state.enabled,
            structural: component.is_structural(),
            options: component
                .kind
                .choices()
                .map(|choices| {
                    choices
                        .options
                        .iter()
                        .map(|option| option.value.clone())
                        .collect()
                })
                .unwrap_or_default(),
            current_value: session.responses().get(&component.id).cloned(),
            error: session.error_for(&component.id).cloned(),
        })
        .collect();

    PageView {
        form_id: session.definition().id().to_string(),
        form_title: session.definition().title().to_string(),
        page_index: session.page_index(),
        page_count: session.pages().len(),
        submitted: session.state() == SessionState::Submitted,
        fields,
    }
}

/// Render the view as a structured JSON value; only visible fields are listed.
pub fn render_json_ui(view: &PageView) -> Value {
    let fields = view
        .visible_fields()
        .map(|field| {
            let mut map = Map::new();
            map.insert("id".into(), Value::String(field.id.clone()));
            map.insert("kind".into(), Value::String(field.kind.to_string()));
            map.insert("label".into(), Value::String(field.label.clone()));
            if let Some(description) = &field.description {
                map.insert("description".into(), Value::String(description.clone()));
            }
            map.insert("required".into(), Value::Bool(field.required));
            map.insert("enabled".into(), Value::Bool(field.enabled));
            if !field.options.is_empty() {
                map.insert(
                    "options".into(),
                    Value::Array(field.options.iter().cloned().map(Value::String).collect()),
                );
            }
            if let Some(value) = &field.current_value {
                map.insert(
                    "value".into(),
                    serde_json::to_value(value).unwrap_or(Value::Null),
                );
            }
            if let Some(error) = &field.error {
                map.insert(
                    "error".into(),
                    json!({ "code": error.code.as_str(), "message": error.message }),
                );
            }
            Value::Object(map)
        })
        .collect::<Vec<_>>();

    json!({
        "form_id": view.form_id,
        "form_title": view.form_title,
        "status": if view.submitted { "submitted" } else { "filling" },
        "page": {
            "index": view.page_index,
            "count": view.page_count,
        },
        "fields": fields,
    })
}

/// Render the view as human-friendly text.
pub fn render_text(view: &PageView) -> String {
    let mut lines = Vec::new();
    lines.push(format!("Form: {} ({})", view.form_title, view.form_id));
    if view.submitted {
        lines.push("Status: submitted".to_string());
        return lines.join("\n");
    }
    lines.push(format!("Page {}/{}", view.page_index + 1, view.page_count));

    for field in view.visible_fields() {
        if field.structural {
            lines.push(format!("== {} ==", field.label));
            if let Some(description) = &field.description {
                lines.push(format!("   {}", description));
            }
            continue;
        }
        let mut entry = format!(" - {} ({})", field.label, field.id);
        if field.required {
            entry.push_str(" [required]");
        }
        if !field.enabled {
            entry.push_str(" [disabled]");
        }
        if let Some(value) = &field.current_value {
            entry.push_str(&format!(" = {}", value));
        }
        lines.push(entry);
        if let Some(error) = &field.error {
            lines.push(format!("   ! {}", error.message));
        }
    }

    lines.join("\n")
}
