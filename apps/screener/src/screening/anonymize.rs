//! Pseudonymization of the identifying intake fields.
//!
//! Name and email go through a one-way SHA-256 digest; the phone number is masked
//! by pattern and keeps its last four characters.

use sha2::{Digest, Sha256};

use crate::screening::models::CandidateProfile;

/// Hex characters of the SHA-256 digest kept in a pseudonym (48 bits).
const DIGEST_LEN: usize = 12;
const PHONE_MASK: &str = "+XXXXXXX-";
const PHONE_VISIBLE_CHARS: usize = 4;

/// Identifiers that may appear in the transcript in place of the raw values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnonymizedIdentity {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl AnonymizedIdentity {
    pub fn from_profile(profile: &CandidateProfile) -> Self {
        Self {
            name: anonymize_name(&profile.name),
            email: anonymize_email(&profile.email),
            phone: mask_phone(&profile.phone),
        }
    }
}

/// Short, stable, lowercase hex digest of `value`.
pub fn digest(value: &str) -> String {
    let hash = Sha256::digest(value.as_bytes());
    let mut encoded = hex::encode(hash);
    encoded.truncate(DIGEST_LEN);
    encoded
}

pub fn anonymize_name(name: &str) -> String {
    format!("Candidate-{}", digest(name))
}

pub fn anonymize_email(email: &str) -> String {
    format!("anon-{}@example.com", digest(email))
}

/// `+XXXXXXX-` followed by the last four characters of `phone` (or all of it when shorter).
pub fn mask_phone(phone: &str) -> String {
    let tail = phone
        .char_indices()
        .rev()
        .nth(PHONE_VISIBLE_CHARS - 1)
        .map(|(idx, _)| &phone[idx..])
        .unwrap_or(phone);
    format!("{PHONE_MASK}{tail}")
}
