use async_trait::async_trait;

use crate::llm_client::prompts::SCREENING_SYSTEM;
use crate::llm_client::{ChatMessage, LlmClient, LlmError};

/// Where the flow sends the transcript to get interview questions back.
///
/// Carried by `ScreeningFlow` as `Arc<dyn CompletionBackend>`; production uses
/// `LlmClient`, tests use a scripted backend.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError>;
}

#[async_trait]
impl CompletionBackend for LlmClient {
    async fn generate(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.complete(messages, SCREENING_SYSTEM).await
    }
}
