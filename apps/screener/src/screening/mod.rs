// Candidate screening: intake form, anonymization, question generation, closing.
// All model calls go through `backend::CompletionBackend`; no HTTP client code here.

pub mod anonymize;
pub mod backend;
pub mod flow;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod store;
pub mod view;
