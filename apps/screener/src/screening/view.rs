//! Render descriptions returned after every action.
//!
//! A `View` is everything a client needs to draw the current step: which step it
//! is, the progress bar, the intake fields with their current values, transient
//! notices from the last action, and an inline error when one was recovered.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::screening::flow::FlowError;
use crate::screening::models::{Field, SessionState, Step};
use crate::screening::prompts::{CLOSING_MESSAGE, QUESTIONS_HEADING};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Submit,
    EndConversation,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldView {
    pub field: Field,
    pub label: &'static str,
    pub placeholder: &'static str,
    pub multiline: bool,
    pub value: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionsView {
    pub heading: &'static str,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorView {
    pub code: &'static str,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<Field>,
}

impl From<&FlowError> for ErrorView {
    fn from(error: &FlowError) -> Self {
        let (code, severity, missing_fields) = match error {
            FlowError::Validation { missing } => {
                ("VALIDATION_ERROR", Severity::Error, missing.clone())
            }
            FlowError::Generation(failure) => {
                ("GENERATION_ERROR", failure.severity(), Vec::new())
            }
        };
        Self {
            code,
            severity,
            message: error.to_string(),
            missing_fields,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct View {
    pub session_id: Uuid,
    pub step: Step,
    pub title: &'static str,
    pub progress: u8,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questions: Option<QuestionsView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub notices: Vec<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorView>,
    pub actions: Vec<ActionKind>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl View {
    pub fn render(state: &SessionState, notices: &[Notice], error: Option<&FlowError>) -> Self {
        let fields = match state.step {
            Step::Intake => Field::ALL
                .into_iter()
                .map(|field| FieldView {
                    field,
                    label: field.label(),
                    placeholder: field.placeholder(),
                    multiline: field.multiline(),
                    value: state.profile.value(field).to_string(),
                })
                .collect(),
            _ => Vec::new(),
        };

        let (message, actions) = match state.step {
            Step::Intake => (None, vec![ActionKind::Submit]),
            Step::Generating => (None, Vec::new()),
            Step::Closing => (Some(CLOSING_MESSAGE), vec![ActionKind::EndConversation]),
        };

        Self {
            session_id: state.id,
            step: state.step,
            title: state.step.title(),
            progress: state.step.progress(),
            fields,
            questions: state.questions.as_ref().map(|text| QuestionsView {
                heading: QUESTIONS_HEADING,
                text: text.clone(),
            }),
            message,
            notices: notices.to_vec(),
            error: error.map(ErrorView::from),
            actions,
            started_at: state.started_at,
            updated_at: state.updated_at,
        }
    }
}
