use crate::screening::flow::ScreeningFlow;
use crate::screening::store::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Step machine, wired to the completion backend chosen at startup.
    pub flow: ScreeningFlow,
    pub sessions: SessionStore,
}
