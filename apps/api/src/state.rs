use std::sync::Arc;

use crate::config::Config;
use crate::interview::repository::InterviewRepository;
use crate::interview::session_store::SessionStore;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Durable interview records. Default: Postgres.
    pub interviews: Arc<dyn InterviewRepository>,
    /// Live workflows for in-flight interviews, keyed by interview id.
    pub sessions: SessionStore,
    pub llm: Arc<dyn TextGenerator>,
    pub config: Config,
}
