use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::llm_client::ChatMessage;

// ────────────────────────────────────────────────────────────────────────────
// Steps
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Intake,
    Generating,
    Closing,
}

impl Step {
    /// Progress indicator shown alongside the step (0 / 50 / 100).
    pub fn progress(&self) -> u8 {
        match self {
            Step::Intake => 0,
            Step::Generating => 50,
            Step::Closing => 100,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::Intake => "Candidate Details",
            Step::Generating => "Generating Questions",
            Step::Closing => "Final Steps",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Candidate profile
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Phone,
    Experience,
    Position,
    Location,
    TechStack,
}

impl Field {
    /// Intake order.
    pub const ALL: [Field; 7] = [
        Field::Name,
        Field::Email,
        Field::Phone,
        Field::Experience,
        Field::Position,
        Field::Location,
        Field::TechStack,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Field::Name => "Full Name",
            Field::Email => "Email Address",
            Field::Phone => "Phone Number",
            Field::Experience => "Years of Experience",
            Field::Position => "Desired Position(s)",
            Field::Location => "Current Location",
            Field::TechStack => "Tech Stack (programming languages, frameworks, tools)",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            Field::Name => "Enter your full name",
            Field::Email => "Enter your email",
            Field::Phone => "Enter your phone number",
            Field::Experience => "E.g., 3 years",
            Field::Position => "E.g., Data Scientist",
            Field::Location => "E.g., San Francisco",
            Field::TechStack => "E.g., Python, TensorFlow, AWS",
        }
    }

    /// The tech stack is collected in a text area; everything else is a single line.
    pub fn multiline(&self) -> bool {
        matches!(self, Field::TechStack)
    }
}

/// Raw form values for one candidate. Missing keys in a submission deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandidateProfile {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub experience: String,
    pub position: String,
    pub location: String,
    pub tech_stack: String,
}

impl CandidateProfile {
    pub fn value(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
            Field::Experience => &self.experience,
            Field::Position => &self.position,
            Field::Location => &self.location,
            Field::TechStack => &self.tech_stack,
        }
    }

    /// Returns a copy with surrounding whitespace removed from every field.
    pub fn trimmed(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            experience: self.experience.trim().to_string(),
            position: self.position.trim().to_string(),
            location: self.location.trim().to_string(),
            tech_stack: self.tech_stack.trim().to_string(),
        }
    }

    /// Fields that are empty after trimming, in intake order.
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|field| self.value(*field).trim().is_empty())
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Transcript
// ────────────────────────────────────────────────────────────────────────────

/// Ordered record of what has been said to the remote model. Append-only: the
/// entries can be read but never edited, removed or reordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Transcript {
    entries: Vec<ChatMessage>,
}

impl Transcript {
    pub fn append(&mut self, entry: ChatMessage) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Session
// ────────────────────────────────────────────────────────────────────────────

/// Everything one candidate's session holds between interactions.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: Uuid,
    pub step: Step,
    pub profile: CandidateProfile,
    pub transcript: Transcript,
    /// Questions returned by the model, kept while the session is in `Closing`.
    pub questions: Option<String>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SessionState {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            step: Step::Intake,
            profile: CandidateProfile::default(),
            transcript: Transcript::default(),
            questions: None,
            started_at: now,
            updated_at: now,
        }
    }

    /// Returns the session to `Intake` with a fresh transcript. The profile is kept
    /// as form prefill only when `keep_profile` is set.
    pub fn reset_to_intake(&mut self, keep_profile: bool) {
        self.step = Step::Intake;
        self.transcript = Transcript::default();
        self.questions = None;
        if !keep_profile {
            self.profile = CandidateProfile::default();
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_profile() -> CandidateProfile {
        CandidateProfile {
            name: "Ada Lovelace".into(),
            email: "ada@example.org".into(),
            phone: "+44 20 7946 0958".into(),
            experience: "5".into(),
            position: "Backend Engineer".into(),
            location: "London".into(),
            tech_stack: "Rust, Postgres".into(),
        }
    }

    #[test]
    fn test_progress_per_step() {
        assert_eq!(Step::Intake.progress(), 0);
        assert_eq!(Step::Generating.progress(), 50);
        assert_eq!(Step::Closing.progress(), 100);
    }

    #[test]
    fn test_missing_fields_treats_whitespace_as_empty() {
        let mut profile = full_profile();
        profile.email = "   ".into();
        profile.tech_stack = String::new();
        assert_eq!(
            profile.missing_fields(),
            vec![Field::Email, Field::TechStack]
        );
    }

    #[test]
    fn test_complete_profile_has_no_missing_fields() {
        assert!(full_profile().missing_fields().is_empty());
    }

    #[test]
    fn test_profile_deserializes_missing_keys_as_empty() {
        let profile: CandidateProfile =
            serde_json::from_str(r#"{"name": "Ada", "tech_stack": "Rust"}"#).unwrap();
        assert_eq!(profile.name, "Ada");
        assert_eq!(profile.email, "");
        assert_eq!(profile.missing_fields().len(), 5);
    }

    #[test]
    fn test_trimmed_strips_every_field() {
        let mut profile = full_profile();
        profile.location = "  London \n".into();
        assert_eq!(profile.trimmed().location, "London");
    }

    #[test]
    fn test_reset_to_intake_keeps_or_clears_profile() {
        let mut session = SessionState::new();
        session.profile = full_profile();
        session.step = Step::Closing;
        session.transcript.append(ChatMessage::user("My name is Candidate-1"));
        session.questions = Some("1. Q".into());

        session.reset_to_intake(true);
        assert_eq!(session.step, Step::Intake);
        assert!(session.transcript.is_empty());
        assert!(session.questions.is_none());
        assert_eq!(session.profile, full_profile());

        session.reset_to_intake(false);
        assert_eq!(session.profile, CandidateProfile::default());
    }
}
