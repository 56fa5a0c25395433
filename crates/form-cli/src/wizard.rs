use form_spec::spec::component::ChoiceConfig;
use form_spec::{
    Component, ComponentKind, FieldError, FileDescriptor, PageView, ResponseValue, Submission,
    render_json_ui, render_text,
};

/// How pages are printed while filling a form.
#[derive(Copy, Clone, Debug, Eq, PartialEq, clap::ValueEnum)]
pub enum RenderMode {
    Text,
    Json,
}

/// Prints pages, prompts and outcomes of a fill session.
pub struct WizardPresenter {
    mode: RenderMode,
    header_printed: bool,
}

impl WizardPresenter {
    pub fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            header_printed: false,
        }
    }

    pub fn show_header(&mut self, title: &str, description: Option<&str>) {
        if self.header_printed {
            return;
        }
        println!("Form: {}", title);
        if let Some(description) = description {
            println!("{}", description);
        }
        println!("Enter an empty line to keep the current answer, '-' to clear it, ':back' for the previous page, ':quit' to stop.");
        self.header_printed = true;
    }

    pub fn show_page(&self, view: &PageView) {
        match self.mode {
            RenderMode::Text => {
                println!();
                println!("{}", render_text(view));
            }
            RenderMode::Json => println!("{}", render_json_ui(view)),
        }
    }

    pub fn show_prompt(&self, component: &Component, required: bool, current: Option<&ResponseValue>) {
        let mut line = component.display_label().to_string();
        if required {
            line.push_str(" *");
        }
        if let Some(hint) = hint(&component.kind) {
            line.push(' ');
            line.push_str(&hint);
        }
        if let Some(current) = current {
            line.push_str(&format!(" [{}]", current));
        }
        println!("{}", line);
        if let Some(description) = &component.description {
            println!("  {}", description);
        }
    }

    /// Disabled fields are not prompted but still validated.
    pub fn show_disabled(
        &self,
        component: &Component,
        required: bool,
        current: Option<&ResponseValue>,
    ) {
        let label = component.display_label();
        match current {
            Some(current) if !current.is_blank() => {
                println!("{} is disabled [{}]", label, current)
            }
            _ if required => println!(
                "{} is disabled but required; change an earlier answer to enable it before continuing",
                label
            ),
            _ => println!("{} is disabled", label),
        }
    }

    pub fn show_parse_error(&self, error: &AnswerParseError) {
        eprintln!("Invalid answer: {}", error.user_message);
    }

    pub fn show_errors(&self, errors: &[FieldError]) {
        println!("Please fix the following:");
        for error in errors {
            println!("  {} - {}", error.field_id, error.message);
        }
    }

    pub fn show_completion(&self, submission: &Submission) {
        println!("Submitted ✅ ({})", submission.id);
    }
}

fn hint(kind: &ComponentKind) -> Option<String> {
    match kind {
        ComponentKind::Number(config) if config.integer => Some("(whole number)".to_string()),
        ComponentKind::Number(_) => Some("(number)".to_string()),
        ComponentKind::Email(_) => Some("(email)".to_string()),
        ComponentKind::Date => Some("(YYYY-MM-DD)".to_string()),
        ComponentKind::Checkbox => Some("(yes/no)".to_string()),
        ComponentKind::Dropdown(config) | ComponentKind::SingleChoice(config) => {
            Some(format!("({})", option_list(config)))
        }
        ComponentKind::MultiChoice(config) => {
            Some(format!("(comma separated: {})", option_list(config)))
        }
        ComponentKind::File(_) => Some("(JSON array of {name, size, mimeType})".to_string()),
        _ => kind
            .rating_bounds()
            .map(|(min, max)| format!("({}-{})", min as i64, max as i64)),
    }
}

fn option_list(config: &ChoiceConfig) -> String {
    config
        .options
        .iter()
        .enumerate()
        .map(|(index, option)| format!("{}={}", index + 1, option.display()))
        .collect::<Vec<_>>()
        .join("/")
}

/// Error produced when parsing answers typed by the respondent.
#[derive(Debug)]
pub struct AnswerParseError {
    pub user_message: String,
}

impl AnswerParseError {
    pub fn new(user_message: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
        }
    }
}

/// Converts a typed line into the answer shape the component expects.
///
/// Only the shape is checked here; constraints are left to the engine.
pub fn parse_answer(kind: &ComponentKind, raw: &str) -> Result<ResponseValue, AnswerParseError> {
    let input = raw.trim();
    match kind {
        ComponentKind::Number(_)
        | ComponentKind::RatingStars(_)
        | ComponentKind::RatingScale(_)
        | ComponentKind::RatingNps => input
            .parse::<f64>()
            .map(ResponseValue::Number)
            .map_err(|_| AnswerParseError::new(format!("'{}' is not a number", input))),
        ComponentKind::Checkbox => match input.to_ascii_lowercase().as_str() {
            "y" | "yes" | "true" | "1" => Ok(ResponseValue::Bool(true)),
            "n" | "no" | "false" | "0" => Ok(ResponseValue::Bool(false)),
            _ => Err(AnswerParseError::new("answer yes or no")),
        },
        ComponentKind::Dropdown(config) | ComponentKind::SingleChoice(config) => {
            resolve_choice(config, input).map(ResponseValue::Text)
        }
        ComponentKind::MultiChoice(config) => input
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(|item| resolve_choice(config, item))
            .collect::<Result<Vec<_>, _>>()
            .map(ResponseValue::List),
        ComponentKind::File(_) => serde_json::from_str::<Vec<FileDescriptor>>(input)
            .map(ResponseValue::Files)
            .map_err(|err| AnswerParseError::new(format!("invalid file list: {}", err))),
        ComponentKind::PageBreak | ComponentKind::SectionHeader(_) => Err(AnswerParseError::new(
            "structural components do not take answers",
        )),
        ComponentKind::Text(_)
        | ComponentKind::Textarea(_)
        | ComponentKind::Email(_)
        | ComponentKind::Date => Ok(ResponseValue::text(input)),
    }
}

// Accepts the option value or its 1-based position.
fn resolve_choice(config: &ChoiceConfig, input: &str) -> Result<String, AnswerParseError> {
    if config.contains(input) {
        return Ok(input.to_string());
    }
    if let Ok(position) = input.parse::<usize>()
        && let Some(option) = position
            .checked_sub(1)
            .and_then(|index| config.options.get(index))
    {
        return Ok(option.value.clone());
    }
    Err(AnswerParseError::new(format!(
        "'{}' is not one of {}",
        input,
        option_list(config)
    )))
}
