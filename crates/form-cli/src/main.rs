mod wizard;

use clap::{Parser, Subcommand, ValueEnum};
use form_spec::{
    FormDefinition, FormDocument, ResponseMap, SessionError, Submission, SubmissionSession,
    Transition, ValidationReport, build_page_view, resolve_states, segment, validate_form,
};
use schemars::schema_for;
use std::env;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wizard::{RenderMode, WizardPresenter, parse_answer};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

const AUTOSAVE_ENV: &str = "FORM_WIZARD_AUTOSAVE";

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Multi-page form wizard CLI",
    long_about = "Checks form definitions, shows their pages and conditional state, validates answers and fills forms interactively"
)]
struct Cli {
    /// Log engine decisions (overrides RUST_LOG).
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum SchemaTarget {
    Form,
    Submission,
}

#[derive(Subcommand)]
enum Command {
    /// Load a form definition and report definition errors and warnings.
    Check {
        /// Path to the form definition JSON.
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
    },
    /// Print the pages of a form definition.
    Pages {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
    },
    /// Print the resolved visible/required/enabled flags for a set of answers.
    State {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// JSON object of answers keyed by component id.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Validate answers against every visible component of a form.
    Validate {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
    },
    /// Fill a form page by page in the terminal.
    Fill {
        #[arg(long, value_name = "FORM")]
        form: PathBuf,
        /// Partial submission to continue from.
        #[arg(long, value_name = "SNAPSHOT")]
        resume: Option<PathBuf>,
        /// File receiving partial snapshots (defaults to FORM_WIZARD_AUTOSAVE).
        #[arg(long, value_name = "FILE")]
        autosave: Option<PathBuf>,
        /// File receiving the completed submission (printed when omitted).
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
        /// Page rendering format.
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Print the JSON Schema of form definitions or submissions.
    Schema {
        #[arg(value_enum, default_value_t = SchemaTarget::Form)]
        target: SchemaTarget,
    },
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Command::Check { form } => run_check(&form),
        Command::Pages { form } => run_pages(&form),
        Command::State { form, answers } => run_state(&form, &answers),
        Command::Validate { form, answers } => run_validate(&form, &answers),
        Command::Fill {
            form,
            resume,
            autosave,
            out,
            format,
        } => run_fill(&form, resume, autosave, out, format),
        Command::Schema { target } => run_schema(target),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn load_form(path: &Path) -> CliResult<FormDefinition> {
    let json = fs::read_to_string(path)?;
    let form = FormDefinition::from_json(&json)
        .map_err(|err| format!("invalid form definition {}: {}", path.display(), err))?;
    Ok(form)
}

fn load_answers(path: &Path) -> CliResult<ResponseMap> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn run_check(path: &Path) -> CliResult<()> {
    let form = load_form(path)?;
    let pages = segment(form.components());
    println!(
        "Form: {} ({}) v{}",
        form.title(),
        form.id(),
        form.version()
    );
    println!(
        "Components: {} ({} data fields) on {} page(s)",
        form.components().len(),
        form.data_components().count(),
        pages.len()
    );
    let warnings = form.lint();
    if warnings.is_empty() {
        println!("No warnings.");
    } else {
        println!("Warnings:");
        for warning in &warnings {
            println!("  {}", warning);
        }
    }
    Ok(())
}

fn run_pages(path: &Path) -> CliResult<()> {
    let form = load_form(path)?;
    for (index, page) in segment(form.components()).iter().enumerate() {
        println!("Page {}: {}", index + 1, page.component_ids().join(", "));
    }
    Ok(())
}

fn run_state(form_path: &Path, answers_path: &Path) -> CliResult<()> {
    let form = load_form(form_path)?;
    let answers = load_answers(answers_path)?;
    let states = resolve_states(&form, &answers);
    println!("{}", serde_json::to_string_pretty(&states)?);
    Ok(())
}

fn run_validate(form_path: &Path, answers_path: &Path) -> CliResult<()> {
    let form = load_form(form_path)?;
    let answers = load_answers(answers_path)?;

    let report = validate_form(&form, &answers);
    println!(
        "Validation result: {}",
        if report.valid { "valid" } else { "invalid" }
    );
    describe_validation(&report);

    if report.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(report: &ValidationReport) {
    if !report.errors.is_empty() {
        println!("Errors:");
        for error in &report.errors {
            println!(
                "  {} - {} ({})",
                error.field_id,
                error.message,
                error.code.as_str()
            );
        }
    }
    if !report.unknown_fields.is_empty() {
        println!(
            "Unknown answer fields: {}",
            report.unknown_fields.join(", ")
        );
    }
}

fn run_schema(target: SchemaTarget) -> CliResult<()> {
    let schema = match target {
        SchemaTarget::Form => serde_json::to_value(schema_for!(FormDocument))?,
        SchemaTarget::Submission => serde_json::to_value(schema_for!(Submission))?,
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

/// What the respondent asked for while answering a page.
enum PageInput {
    Done,
    Back,
    Quit,
}

fn run_fill(
    form_path: &Path,
    resume: Option<PathBuf>,
    autosave: Option<PathBuf>,
    out: Option<PathBuf>,
    format: RenderMode,
) -> CliResult<()> {
    let form = Arc::new(load_form(form_path)?);
    let mut session = match resume {
        Some(path) => {
            let snapshot: Submission = serde_json::from_str(&fs::read_to_string(path)?)?;
            SubmissionSession::resume(form.clone(), snapshot)?
        }
        None => SubmissionSession::new(form.clone()),
    };
    let autosave = autosave.or_else(|| env::var_os(AUTOSAVE_ENV).map(PathBuf::from));

    let mut presenter = WizardPresenter::new(format);
    presenter.show_header(form.title(), form.description());
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        presenter.show_page(&build_page_view(&session));
        let input = fill_page(&mut session, &presenter, &mut lines)?;
        let transition = match input {
            PageInput::Quit => {
                save_snapshot(&mut session, autosave.as_deref())?;
                println!("Stopped before submitting.");
                return Ok(());
            }
            PageInput::Back => match session.previous() {
                Ok(transition) => transition,
                Err(err @ (SessionError::AtFirstPage | SessionError::PreviousDisabled)) => {
                    println!("{}", err);
                    continue;
                }
                Err(err) => return Err(err.into()),
            },
            PageInput::Done => session.next()?,
        };

        match transition {
            Transition::Advanced { .. } | Transition::Retreated { .. } => {
                save_snapshot(&mut session, autosave.as_deref())?;
            }
            Transition::Blocked { errors, .. } | Transition::SubmitFailed { errors, .. } => {
                presenter.show_errors(&errors);
            }
            Transition::Submitted(submission) => {
                presenter.show_completion(&submission);
                let encoded = submission.to_json_pretty()?;
                match out {
                    Some(path) => fs::write(path, encoded)?,
                    None => println!("{}", encoded),
                }
                return Ok(());
            }
        }
    }
}

fn fill_page(
    session: &mut SubmissionSession,
    presenter: &WizardPresenter,
    lines: &mut impl Iterator<Item = io::Result<String>>,
) -> CliResult<PageInput> {
    let ids = session
        .current_page()
        .components
        .iter()
        .filter(|component| !component.is_structural())
        .map(|component| component.id.clone())
        .collect::<Vec<_>>();

    for id in ids {
        loop {
            // Answers given earlier on the page may have changed this field's state.
            let Some((component, state)) = session
                .field_states()
                .into_iter()
                .find(|(component, _)| component.id == id)
                .map(|(component, state)| (component.clone(), state))
            else {
                break;
            };
            if !state.visible {
                break;
            }
            if !state.enabled {
                presenter.show_disabled(&component, state.required, session.responses().get(&id));
                break;
            }
            presenter.show_prompt(&component, state.required, session.responses().get(&id));
            print!("> ");
            io::stdout().flush()?;
            let Some(line) = lines.next().transpose()? else {
                return Ok(PageInput::Quit);
            };
            match line.trim() {
                "" => break,
                ":back" => return Ok(PageInput::Back),
                ":quit" => return Ok(PageInput::Quit),
                "-" => {
                    session.clear_answer(&id)?;
                    break;
                }
                raw => match parse_answer(&component.kind, raw) {
                    Ok(value) => {
                        session.set_answer(&id, value)?;
                        break;
                    }
                    Err(err) => presenter.show_parse_error(&err),
                },
            }
        }
    }
    Ok(PageInput::Done)
}

fn save_snapshot(session: &mut SubmissionSession, path: Option<&Path>) -> CliResult<()> {
    let Some(path) = path else {
        return Ok(());
    };
    match session.autosave_if_dirty() {
        Ok(Some(snapshot)) => {
            fs::write(path, snapshot.to_json_pretty()?)?;
            tracing::debug!(path = %path.display(), "wrote autosave snapshot");
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(SessionError::AutosaveDisabled(form_id)) => {
            tracing::warn!(form_id = %form_id, "autosave requested but disabled by the form");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::wizard::parse_answer;
    use form_spec::spec::component::{ChoiceConfig, ChoiceOption, FileConfig, NumberConfig};
    use form_spec::{ComponentKind, FileDescriptor, ResponseValue};

    fn colors() -> ChoiceConfig {
        ChoiceConfig {
            options: vec![ChoiceOption::new("red"), ChoiceOption::new("blue")],
        }
    }

    #[test]
    fn parse_answer_checkbox_accepts_yes() {
        assert_eq!(
            parse_answer(&ComponentKind::Checkbox, "Yes").unwrap(),
            ResponseValue::Bool(true)
        );
        assert!(parse_answer(&ComponentKind::Checkbox, "maybe").is_err());
    }

    #[test]
    fn parse_answer_number_handles_numbers() {
        assert_eq!(
            parse_answer(&ComponentKind::Number(NumberConfig::default()), " 42 ").unwrap(),
            ResponseValue::Number(42.0)
        );
        assert!(parse_answer(&ComponentKind::RatingNps, "ten").is_err());
    }

    #[test]
    fn parse_answer_choice_accepts_value_or_position() {
        let kind = ComponentKind::Dropdown(colors());
        assert_eq!(
            parse_answer(&kind, "blue").unwrap(),
            ResponseValue::text("blue")
        );
        assert_eq!(parse_answer(&kind, "1").unwrap(), ResponseValue::text("red"));
        assert!(parse_answer(&kind, "3").is_err());
    }

    #[test]
    fn parse_answer_multi_choice_splits_on_commas() {
        let kind = ComponentKind::MultiChoice(colors());
        assert_eq!(
            parse_answer(&kind, "red, 2").unwrap(),
            ResponseValue::list(["red", "blue"])
        );
    }

    #[test]
    fn parse_answer_files_reads_descriptors() {
        let kind = ComponentKind::File(FileConfig::default());
        assert_eq!(
            parse_answer(
                &kind,
                r#"[{"name":"a.pdf","size":10,"mimeType":"application/pdf"}]"#
            )
            .unwrap(),
            ResponseValue::Files(vec![FileDescriptor::new("a.pdf", 10, "application/pdf")])
        );
    }
}
