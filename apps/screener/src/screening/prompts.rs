// Prompt text and user-facing copy for the screening flow.

use crate::llm_client::ChatMessage;
use crate::screening::anonymize::AnonymizedIdentity;
use crate::screening::models::CandidateProfile;

/// Substrings a completion uses to say it could not answer.
pub const SENTINEL_PHRASES: &[&str] = &["Unexpected error occurred", "issue processing your request"];

pub const WELCOME_MESSAGE: &str = "Welcome to the Hiring Assistant! I'm here to guide you \
    through the screening process with a few simple steps. Let's get started!";
pub const ANALYZING_MESSAGE: &str = "Analyzing your expertise and generating questions...";
pub const QUESTIONS_HEADING: &str = "Personalized Technical Questions";
pub const CLOSING_MESSAGE: &str = "Thank you for providing all the required details! \
    We'll review your profile and get back to you soon.";
pub const FAREWELL_MESSAGE: &str = "Conversation ended. Have a great day!";

pub fn thank_you_message(identity: &AnonymizedIdentity) -> String {
    format!("Thank you for sharing your details, {}!", identity.name)
}

/// The six transcript entries recorded for a validated profile. Identifying fields
/// appear only in anonymized form.
pub fn profile_entries(identity: &AnonymizedIdentity, profile: &CandidateProfile) -> [ChatMessage; 6] {
    [
        ChatMessage::user(format!("My name is {}", identity.name)),
        ChatMessage::user(format!(
            "My anonymized email is {}, my anonymized phone is {}",
            identity.email, identity.phone
        )),
        ChatMessage::user(format!("I have {} years of experience.", profile.experience)),
        ChatMessage::user(format!(
            "I am applying for the position(s): {}.",
            profile.position
        )),
        ChatMessage::user(format!("My current location is {}.", profile.location)),
        ChatMessage::user(format!("My tech stack includes {}.", profile.tech_stack)),
    ]
}

/// Instruction appended to the request (never to the transcript) when asking for questions.
pub fn question_instruction(profile: &CandidateProfile) -> ChatMessage {
    ChatMessage::user(format!(
        "Generate 3-5 technical questions for {}, focusing on {} years of experience",
        profile.tech_stack, profile.experience
    ))
}
