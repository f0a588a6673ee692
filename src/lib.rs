pub mod analysis;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod prompt;
pub mod schema;
pub mod session;
pub mod transport;

use std::sync::Arc;

use crate::analysis::GeminiAnalyzer;
use crate::config::Config;
use crate::error::Result;
use crate::session::{SessionState, StudySession, SubmitOutcome};
use crate::transport::{GeminiTransport, Transport};

pub use crate::error::{ErrorKind, StudyError};
pub use crate::models::StudyRecord;
pub use crate::session::{IgnoredReason, Phase};

/// One study session wired to the hosted model according to `Config`.
pub struct StudyService {
    session: StudySession,
}

impl StudyService {
    pub fn new(cfg: &Config) -> Result<Self> {
        let transport = Arc::new(GeminiTransport::new(
            cfg.gemini.base_url.clone(),
            cfg.gemini.timeout(),
        )?);
        Ok(Self::with_transport(cfg, transport))
    }

    /// Builds the service over any transport, e.g. a fake in tests.
    pub fn with_transport(cfg: &Config, transport: Arc<dyn Transport>) -> Self {
        if !cfg.gemini.has_api_key() {
            tracing::warn!("No API key configured; analyses will fail until one is set");
        }
        let analyzer = GeminiAnalyzer::from_config(transport, &cfg.gemini);
        Self {
            session: StudySession::new(Arc::new(analyzer)),
        }
    }

    pub async fn submit(&self, passage: &str) -> SubmitOutcome {
        self.session.submit(passage).await
    }

    pub fn reset(&self) -> bool {
        self.session.reset()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn session(&self) -> &StudySession {
        &self.session
    }
}
