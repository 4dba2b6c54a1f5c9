//! Screening Flow Controller — the `Intake → Generating → Closing` step machine.
//!
//! Each transition takes the session by value and hands back the next session plus
//! whatever the client should show for it. Validation and generation failures are
//! recovered here and ride along in the `Transition`; only actions that make no
//! sense for the current step are returned as errors.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::screening::anonymize::AnonymizedIdentity;
use crate::screening::backend::CompletionBackend;
use crate::screening::models::{CandidateProfile, Field, SessionState, Step};
use crate::screening::prompts::{
    profile_entries, question_instruction, thank_you_message, ANALYZING_MESSAGE,
    FAREWELL_MESSAGE, SENTINEL_PHRASES,
};
use crate::screening::view::{Notice, Severity, View};

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Why a question generation attempt produced nothing usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    /// The completion carried one of the sentinel phrases.
    Rejected,
    /// The completion was missing or blank.
    Empty,
    /// Transport or API failure talking to the model.
    Unavailable(String),
}

impl GenerationFailure {
    pub fn severity(&self) -> Severity {
        match self {
            GenerationFailure::Rejected => Severity::Warning,
            GenerationFailure::Empty | GenerationFailure::Unavailable(_) => Severity::Error,
        }
    }
}

/// User-visible flow errors. Both are recovered inside the flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FlowError {
    #[error("Please fill in all the fields before submitting!")]
    Validation { missing: Vec<Field> },

    #[error("{}", generation_message(.0))]
    Generation(GenerationFailure),
}

fn generation_message(failure: &GenerationFailure) -> &'static str {
    match failure {
        GenerationFailure::Rejected => {
            "The chatbot could not generate questions based on the input. \
             Please refine the details and try again."
        }
        GenerationFailure::Empty | GenerationFailure::Unavailable(_) => {
            "Failed to generate questions. Please try again."
        }
    }
}

/// An action that is not available in the session's current step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} while the session is in the {step:?} step")]
pub struct ActionRejected {
    pub action: &'static str,
    pub step: Step,
}

impl From<ActionRejected> for AppError {
    fn from(err: ActionRejected) -> Self {
        AppError::Conflict(err.to_string())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transitions
// ────────────────────────────────────────────────────────────────────────────

/// The session after an action, plus what the client should show for it.
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: SessionState,
    pub notices: Vec<Notice>,
    pub error: Option<FlowError>,
}

impl Transition {
    fn new(mut state: SessionState) -> Self {
        state.touch();
        Self {
            state,
            notices: Vec::new(),
            error: None,
        }
    }

    /// Chains a later transition onto this one: the later state and error win, and
    /// the notices of both are shown in order.
    pub fn followed_by(self, next: Transition) -> Transition {
        let mut notices = self.notices;
        notices.extend(next.notices);
        Transition {
            state: next.state,
            notices,
            error: next.error,
        }
    }

    pub fn view(&self) -> View {
        View::render(&self.state, &self.notices, self.error.as_ref())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Controller
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct ScreeningFlow {
    backend: Arc<dyn CompletionBackend>,
}

impl ScreeningFlow {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self { backend }
    }

    /// `Generating` step: asks the backend for questions using the stored transcript
    /// and profile. Success moves to `Closing`; any failure resets to `Intake`.
    pub async fn generate(&self, state: SessionState) -> Result<Transition, ActionRejected> {
        if state.step != Step::Generating {
            return Err(ActionRejected {
                action: "generate questions",
                step: state.step,
            });
        }

        let mut request = state.transcript.entries().to_vec();
        request.push(question_instruction(&state.profile));

        let outcome = classify_completion(self.backend.generate(&request).await);
        let mut transition = Transition::new(state);

        match outcome {
            Ok(questions) => {
                info!(
                    session_id = %transition.state.id,
                    transcript_len = transition.state.transcript.len(),
                    "Questions generated"
                );
                transition.state.step = Step::Closing;
                transition.state.questions = Some(questions);
            }
            Err(failure) => {
                warn!(
                    session_id = %transition.state.id,
                    failure = ?failure,
                    "Question generation failed, returning to intake"
                );
                transition.state.reset_to_intake(true);
                transition.error = Some(FlowError::Generation(failure));
            }
        }

        Ok(transition)
    }
}

/// `Intake` step: validates all seven fields, records the anonymized profile in the
/// transcript and moves to `Generating`. Empty fields keep the session in `Intake`.
pub fn submit(state: SessionState, profile: CandidateProfile) -> Result<Transition, ActionRejected> {
    if state.step != Step::Intake {
        return Err(ActionRejected {
            action: "submit the form",
            step: state.step,
        });
    }

    let profile = profile.trimmed();
    let mut transition = Transition::new(state);

    let missing = profile.missing_fields();
    transition.state.profile = profile;
    if !missing.is_empty() {
        info!(
            session_id = %transition.state.id,
            missing = missing.len(),
            "Submission rejected: empty fields"
        );
        transition.error = Some(FlowError::Validation { missing });
        return Ok(transition);
    }

    let identity = AnonymizedIdentity::from_profile(&transition.state.profile);
    for entry in profile_entries(&identity, &transition.state.profile) {
        transition.state.transcript.append(entry);
    }
    transition.state.step = Step::Generating;
    transition
        .notices
        .push(Notice::success(thank_you_message(&identity)));
    transition.notices.push(Notice::info(ANALYZING_MESSAGE));

    info!(
        session_id = %transition.state.id,
        candidate = %identity.name,
        "Profile accepted"
    );

    Ok(transition)
}

/// `Closing` step: ends the conversation and starts over at `Intake`.
pub fn end_conversation(state: SessionState) -> Result<Transition, ActionRejected> {
    if state.step != Step::Closing {
        return Err(ActionRejected {
            action: "end the conversation",
            step: state.step,
        });
    }

    let mut transition = Transition::new(state);
    transition.state.reset_to_intake(false);
    transition.notices.push(Notice::info(FAREWELL_MESSAGE));
    info!(session_id = %transition.state.id, "Conversation ended");
    Ok(transition)
}

/// Folds every way a completion can go wrong into a `GenerationFailure`.
fn classify_completion(result: Result<String, LlmError>) -> Result<String, GenerationFailure> {
    let text = match result {
        Ok(text) => text,
        Err(LlmError::EmptyContent) => return Err(GenerationFailure::Empty),
        Err(e) => return Err(GenerationFailure::Unavailable(e.to_string())),
    };

    if text.trim().is_empty() {
        return Err(GenerationFailure::Empty);
    }
    if SENTINEL_PHRASES.iter().any(|phrase| text.contains(phrase)) {
        return Err(GenerationFailure::Rejected);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screening::backend::testing::ScriptedBackend;

    fn profile() -> CandidateProfile {
        CandidateProfile {
            name: "Ada Lovelace".into(),
            email: "ada@example.org".into(),
            phone: "+1 415 555 0123".into(),
            experience: "3".into(),
            position: "Data Scientist".into(),
            location: "San Francisco".into(),
            tech_stack: "Python, TensorFlow, AWS".into(),
        }
    }

    fn flow_with(backend: &Arc<ScriptedBackend>) -> ScreeningFlow {
        ScreeningFlow::new(backend.clone())
    }

    /// Submit, then generate when the submission was accepted.
    async fn submit_and_generate(
        flow: &ScreeningFlow,
        state: SessionState,
        input: CandidateProfile,
    ) -> Transition {
        let submitted = submit(state, input).unwrap();
        if submitted.state.step != Step::Generating {
            return submitted;
        }
        let generated = flow.generate(submitted.state.clone()).await.unwrap();
        submitted.followed_by(generated)
    }

    #[test]
    fn test_submit_complete_profile_moves_to_generating() {
        let transition = submit(SessionState::new(), profile()).unwrap();

        assert_eq!(transition.state.step, Step::Generating);
        assert_eq!(transition.state.transcript.len(), 6);
        assert!(transition.error.is_none());
        assert_eq!(transition.view().progress, 50);
    }

    #[test]
    fn test_submit_each_empty_field_stays_in_intake() {
        for field in Field::ALL {
            let mut input = profile();
            match field {
                Field::Name => input.name.clear(),
                Field::Email => input.email.clear(),
                Field::Phone => input.phone = "   ".into(),
                Field::Experience => input.experience.clear(),
                Field::Position => input.position.clear(),
                Field::Location => input.location.clear(),
                Field::TechStack => input.tech_stack = "\n".into(),
            }

            let transition = submit(SessionState::new(), input).unwrap();
            assert_eq!(transition.state.step, Step::Intake, "field {field:?}");
            assert!(transition.state.transcript.is_empty());
            assert_eq!(
                transition.error,
                Some(FlowError::Validation {
                    missing: vec![field]
                })
            );
        }
    }

    #[test]
    fn test_submit_keeps_partial_input_as_prefill() {
        let mut input = profile();
        input.email.clear();
        let transition = submit(SessionState::new(), input).unwrap();
        assert_eq!(transition.state.profile.name, "Ada Lovelace");
    }

    #[test]
    fn test_submit_transcript_hides_identifiers() {
        let transition = submit(SessionState::new(), profile()).unwrap();
        let entries = transition.state.transcript.entries();

        assert!(entries[0].content.starts_with("My name is Candidate-"));
        assert!(entries[1].content.contains("+XXXXXXX-0123"));
        for entry in entries {
            assert!(!entry.content.contains("Ada"));
            assert!(!entry.content.contains("ada@example.org"));
            assert!(!entry.content.contains("415"));
        }
    }

    #[test]
    fn test_submit_outside_intake_is_rejected() {
        let mut state = SessionState::new();
        state.step = Step::Closing;
        let err = submit(state, profile()).unwrap_err();
        assert_eq!(err.step, Step::Closing);
    }

    #[tokio::test]
    async fn test_generate_success_moves_to_closing_verbatim() {
        let reply = "1. What is a Python generator?\n2. How does TensorFlow build graphs?";
        let backend = Arc::new(ScriptedBackend::replying(vec![Ok(reply.to_string())]));
        let submitted = submit(SessionState::new(), profile()).unwrap();

        let transition = flow_with(&backend).generate(submitted.state).await.unwrap();

        assert_eq!(transition.state.step, Step::Closing);
        assert_eq!(transition.state.questions.as_deref(), Some(reply));
        assert!(transition.error.is_none());
        assert_eq!(transition.view().progress, 100);
    }

    #[tokio::test]
    async fn test_generate_sends_transcript_plus_instruction() {
        let backend = Arc::new(ScriptedBackend::replying(vec![Ok("1. Q".to_string())]));
        let submitted = submit(SessionState::new(), profile()).unwrap();

        let transition = flow_with(&backend).generate(submitted.state).await.unwrap();

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 7);
        assert_eq!(
            calls[0][6].content,
            "Generate 3-5 technical questions for Python, TensorFlow, AWS, focusing on 3 years of experience"
        );
        // The instruction is not recorded in the transcript.
        assert_eq!(transition.state.transcript.len(), 6);
    }

    #[tokio::test]
    async fn test_generate_sentinel_resets_to_intake() {
        for reply in [
            "Unexpected error occurred while contacting the model",
            "Sorry, there was an issue processing your request.",
        ] {
            let backend = Arc::new(ScriptedBackend::replying(vec![Ok(reply.to_string())]));
            let submitted = submit(SessionState::new(), profile()).unwrap();

            let transition = flow_with(&backend).generate(submitted.state).await.unwrap();

            assert_eq!(transition.state.step, Step::Intake);
            assert_eq!(
                transition.error,
                Some(FlowError::Generation(GenerationFailure::Rejected))
            );
            assert!(transition.state.questions.is_none());
            assert_eq!(transition.view().progress, 0);
        }
    }

    #[tokio::test]
    async fn test_generate_empty_or_failed_call_resets_to_intake() {
        let replies = [
            Ok("   ".to_string()),
            Err(LlmError::EmptyContent),
            Err(LlmError::Api {
                status: 503,
                message: "overloaded".into(),
            }),
        ];
        for reply in replies {
            let backend = Arc::new(ScriptedBackend::replying(vec![reply]));
            let submitted = submit(SessionState::new(), profile()).unwrap();

            let transition = flow_with(&backend).generate(submitted.state).await.unwrap();

            assert_eq!(transition.state.step, Step::Intake);
            assert!(matches!(
                transition.error,
                Some(FlowError::Generation(
                    GenerationFailure::Empty | GenerationFailure::Unavailable(_)
                ))
            ));
            // The profile stays as prefill, the transcript starts over.
            assert_eq!(transition.state.profile, profile());
            assert!(transition.state.transcript.is_empty());
        }
    }

    #[tokio::test]
    async fn test_generate_outside_generating_is_rejected() {
        let backend = Arc::new(ScriptedBackend::replying(vec![]));
        let err = flow_with(&backend)
            .generate(SessionState::new())
            .await
            .unwrap_err();
        assert_eq!(err.step, Step::Intake);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_submit_then_generate_keeps_notices_in_order() {
        let backend = Arc::new(ScriptedBackend::replying(vec![Ok("1. Q".to_string())]));

        let transition =
            submit_and_generate(&flow_with(&backend), SessionState::new(), profile()).await;

        assert_eq!(transition.state.step, Step::Closing);
        assert_eq!(transition.notices.len(), 2);
        assert!(transition.notices[0].text.starts_with("Thank you for sharing your details, Candidate-"));
    }

    #[tokio::test]
    async fn test_invalid_submit_skips_backend() {
        let backend = Arc::new(ScriptedBackend::replying(vec![]));

        let transition = submit_and_generate(
            &flow_with(&backend),
            SessionState::new(),
            CandidateProfile::default(),
        )
        .await;

        assert_eq!(transition.state.step, Step::Intake);
        assert!(matches!(transition.error, Some(FlowError::Validation { .. })));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_end_conversation_from_closing_resets() {
        let backend = Arc::new(ScriptedBackend::replying(vec![Ok("1. Q".to_string())]));
        let flow = flow_with(&backend);
        let closed = submit_and_generate(&flow, SessionState::new(), profile()).await;

        let ended = end_conversation(closed.state).unwrap();

        assert_eq!(ended.state.step, Step::Intake);
        assert_eq!(ended.view().progress, 0);
        assert_eq!(ended.state.profile, CandidateProfile::default());
        assert_eq!(ended.notices[0].text, FAREWELL_MESSAGE);
    }

    #[test]
    fn test_followed_by_takes_later_state_and_error() {
        let submitted = submit(SessionState::new(), profile()).unwrap();
        let mut later = submitted.clone();
        later.state.reset_to_intake(true);
        later.notices = vec![Notice::info("later")];
        later.error = Some(FlowError::Generation(GenerationFailure::Empty));

        let chained = submitted.followed_by(later);
        assert_eq!(chained.state.step, Step::Intake);
        assert_eq!(chained.notices.len(), 3);
        assert_eq!(chained.notices[2].text, "later");
        assert!(chained.error.is_some());
    }

    #[test]
    fn test_end_conversation_outside_closing_is_rejected() {
        let err = end_conversation(SessionState::new()).unwrap_err();
        assert_eq!(err.step, Step::Intake);
    }

    #[tokio::test]
    async fn test_resubmit_after_failure_appends_six_fresh_entries() {
        let backend = Arc::new(ScriptedBackend::replying(vec![
            Err(LlmError::EmptyContent),
            Ok("1. Q".to_string()),
        ]));
        let flow = flow_with(&backend);

        let failed = submit_and_generate(&flow, SessionState::new(), profile()).await;
        assert_eq!(failed.state.step, Step::Intake);

        let retried = submit_and_generate(&flow, failed.state, profile()).await;
        assert_eq!(retried.state.step, Step::Closing);
        assert_eq!(retried.state.transcript.len(), 6);
        assert_eq!(backend.calls()[1].len(), 7);
    }
}
