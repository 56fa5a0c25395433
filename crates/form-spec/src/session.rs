use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::SessionError;
use crate::logic::{FieldState, evaluate_conditional_logic};
use crate::pages::{Page, segment};
use crate::response::{ResponseMap, ResponseValue, Submission, SubmissionStatus};
use crate::spec::component::Component;
use crate::spec::form::FormDefinition;
use crate::validate::{FieldError, validate_components};

/// Observable state of a submission session.
///
/// Validation and submission happen inside [`SubmissionSession::next`] and
/// [`SubmissionSession::submit`]; afterwards the session is either back in
/// `Filling` or `Submitted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Filling { page_index: usize },
    Submitted,
}

/// Result of a navigation or submission attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    Advanced { page_index: usize },
    Retreated { page_index: usize },
    /// The current page has errors; the session stays where it is.
    Blocked {
        page_index: usize,
        errors: Vec<FieldError>,
    },
    /// The full-form pass failed; the session moved to the first failing page.
    SubmitFailed {
        page_index: usize,
        errors: Vec<FieldError>,
    },
    Submitted(Submission),
}

/// Drives one respondent through a multi-page form.
///
/// Sessions are not shared between threads; the form definition is.
#[derive(Debug, Clone)]
pub struct SubmissionSession {
    definition: Arc<FormDefinition>,
    pages: Vec<Page>,
    state: SessionState,
    responses: ResponseMap,
    errors: Vec<FieldError>,
    submission_id: String,
    dirty: bool,
}

impl SubmissionSession {
    pub fn new(definition: Arc<FormDefinition>) -> Self {
        Self::with_id(definition, Uuid::new_v4().to_string())
    }

    /// Starts a session whose submission records carry `submission_id`.
    pub fn with_id(definition: Arc<FormDefinition>, submission_id: impl Into<String>) -> Self {
        let pages = segment(definition.components());
        let submission_id = submission_id.into();
        tracing::debug!(
            form_id = %definition.id(),
            submission_id = %submission_id,
            pages = pages.len(),
            "starting submission session"
        );
        Self {
            definition,
            pages,
            state: SessionState::Filling { page_index: 0 },
            responses: ResponseMap::new(),
            errors: Vec::new(),
            submission_id,
            dirty: false,
        }
    }

    /// Continues from an autosave snapshot, keeping its submission id.
    ///
    /// Every answer in the snapshot must target a data component of `definition`.
    pub fn resume(
        definition: Arc<FormDefinition>,
        snapshot: Submission,
    ) -> Result<Self, SessionError> {
        if snapshot.form_id != definition.id() {
            return Err(SessionError::FormMismatch {
                expected: definition.id().to_string(),
                found: snapshot.form_id,
            });
        }
        if snapshot.is_completed() {
            return Err(SessionError::AlreadySubmitted(snapshot.id));
        }
        let mut session = Self::with_id(definition, snapshot.id);
        for id in snapshot.response_data.keys() {
            session.ensure_answerable(id)?;
        }
        session.responses = snapshot.response_data;
        Ok(session)
    }

    pub fn definition(&self) -> &FormDefinition {
        &self.definition
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn submission_id(&self) -> &str {
        &self.submission_id
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Index of the page being filled, or of the last page once submitted.
    pub fn page_index(&self) -> usize {
        match self.state {
            SessionState::Filling { page_index } => page_index,
            SessionState::Submitted => self.pages.len() - 1,
        }
    }

    pub fn current_page(&self) -> &Page {
        &self.pages[self.page_index()]
    }

    pub fn is_last_page(&self) -> bool {
        self.page_index() + 1 == self.pages.len()
    }

    pub fn responses(&self) -> &ResponseMap {
        &self.responses
    }

    /// Errors surfaced by the latest navigation attempt, minus fields edited since.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    pub fn error_for(&self, id: &str) -> Option<&FieldError> {
        self.errors.iter().find(|error| error.field_id == id)
    }

    /// True when answers changed since the last autosave.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Resolved states of the components on the current page.
    pub fn field_states(&self) -> Vec<(&Component, FieldState)> {
        self.current_page()
            .components
            .iter()
            .map(|component| {
                (
                    component,
                    evaluate_conditional_logic(component, &self.responses),
                )
            })
            .collect()
    }

    pub fn set_answer(
        &mut self,
        id: &str,
        value: impl Into<ResponseValue>,
    ) -> Result<(), SessionError> {
        self.ensure_answerable(id)?;
        self.responses.set(id, value);
        self.touch(id);
        Ok(())
    }

    pub fn clear_answer(&mut self, id: &str) -> Result<(), SessionError> {
        self.ensure_answerable(id)?;
        if self.responses.remove(id).is_some() {
            self.touch(id);
        }
        Ok(())
    }

    /// Validates the current page and moves forward when it is clean.
    ///
    /// On the last page a clean result continues into [`Self::submit`].
    pub fn next(&mut self) -> Result<Transition, SessionError> {
        let page_index = self.filling_page()?;
        tracing::debug!(page_index, "validating page");
        let errors = validate_components(&self.pages[page_index].components, &self.responses);
        if !errors.is_empty() {
            tracing::debug!(page_index, errors = errors.len(), "page has errors");
            self.errors = errors.clone();
            return Ok(Transition::Blocked { page_index, errors });
        }
        self.errors.clear();
        if page_index + 1 == self.pages.len() {
            return self.submit();
        }
        let page_index = page_index + 1;
        self.state = SessionState::Filling { page_index };
        tracing::debug!(page_index, "advanced");
        Ok(Transition::Advanced { page_index })
    }

    /// Moves back one page without validating.
    pub fn previous(&mut self) -> Result<Transition, SessionError> {
        let page_index = self.filling_page()?;
        if !self.definition.settings().allow_previous {
            return Err(SessionError::PreviousDisabled);
        }
        if page_index == 0 {
            return Err(SessionError::AtFirstPage);
        }
        let page_index = page_index - 1;
        self.state = SessionState::Filling { page_index };
        tracing::debug!(page_index, "retreated");
        Ok(Transition::Retreated { page_index })
    }

    /// Validates every visible component of every page and finalizes the submission.
    ///
    /// Conditional requirements may have changed on pages already passed, so
    /// the whole form is checked regardless of the current page.
    pub fn submit(&mut self) -> Result<Transition, SessionError> {
        self.filling_page()?;
        tracing::debug!(submission_id = %self.submission_id, "submitting");
        let errors = validate_components(self.definition.components(), &self.responses);
        if !errors.is_empty() {
            let page_index = errors
                .iter()
                .filter_map(|error| {
                    self.pages
                        .iter()
                        .position(|page| page.contains(&error.field_id))
                })
                .min()
                .unwrap_or(0);
            tracing::debug!(page_index, errors = errors.len(), "submission failed");
            self.state = SessionState::Filling { page_index };
            self.errors = errors.clone();
            return Ok(Transition::SubmitFailed { page_index, errors });
        }

        let submission = self.snapshot(SubmissionStatus::Completed);
        self.state = SessionState::Submitted;
        self.errors.clear();
        self.dirty = false;
        tracing::info!(
            form_id = %submission.form_id,
            submission_id = %submission.id,
            "submission completed"
        );
        Ok(Transition::Submitted(submission))
    }

    /// Produces a partial snapshot of the current answers without validating.
    pub fn autosave(&mut self) -> Result<Submission, SessionError> {
        self.filling_page()?;
        if !self.definition.settings().autosave {
            return Err(SessionError::AutosaveDisabled(
                self.definition.id().to_string(),
            ));
        }
        self.dirty = false;
        tracing::debug!(submission_id = %self.submission_id, "autosaved");
        Ok(self.snapshot(SubmissionStatus::Partial))
    }

    /// Like [`Self::autosave`], but only when answers changed since the last one.
    pub fn autosave_if_dirty(&mut self) -> Result<Option<Submission>, SessionError> {
        if !self.dirty {
            return Ok(None);
        }
        self.autosave().map(Some)
    }

    fn snapshot(&self, status: SubmissionStatus) -> Submission {
        Submission {
            id: self.submission_id.clone(),
            form_id: self.definition.id().to_string(),
            response_data: self.responses.clone(),
            submitted_at: Utc::now(),
            status,
        }
    }

    fn filling_page(&self) -> Result<usize, SessionError> {
        match self.state {
            SessionState::Filling { page_index } => Ok(page_index),
            SessionState::Submitted => {
                Err(SessionError::AlreadySubmitted(self.submission_id.clone()))
            }
        }
    }

    fn ensure_answerable(&self, id: &str) -> Result<(), SessionError> {
        self.filling_page()?;
        match self.definition.component(id) {
            None => Err(SessionError::UnknownComponent(id.to_string())),
            Some(component) if component.is_structural() => {
                Err(SessionError::StructuralComponent(id.to_string()))
            }
            Some(_) => Ok(()),
        }
    }

    fn touch(&mut self, id: &str) {
        self.dirty = true;
        self.errors.retain(|error| error.field_id != id);
    }
}
