//! Lifecycle of one study session: Idle → Loading → Success | Error → Idle.
//!
//! Loading doubles as the single-flight guard. Every entry into Loading and
//! every reset bumps a generation counter, and a finished analysis is applied
//! only if its generation is still current, so a response that arrives after
//! a reset is dropped instead of resurrecting an old result.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::analysis::Analyzer;
use crate::error::ErrorKind;
use crate::models::StudyRecord;

/// The only failure text ever shown to the end user.
pub const ERROR_MESSAGE: &str = "We encountered an issue analyzing this passage. Please check your connection or try a shorter verse.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Loading,
    Success(StudyRecord),
    /// `kind` is for diagnostics only; display `message`.
    Error { message: String, kind: ErrorKind },
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        match self {
            SessionState::Idle => Phase::Idle,
            SessionState::Loading => Phase::Loading,
            SessionState::Success(_) => Phase::Success,
            SessionState::Error { .. } => Phase::Error,
        }
    }

    pub fn record(&self) -> Option<&StudyRecord> {
        match self {
            SessionState::Success(record) => Some(record),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SessionState::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            SessionState::Error { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Why a submit did not run or did not land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    EmptyPassage,
    /// An analysis is already running for this session.
    InFlight,
    /// A result is showing; reset first.
    NotReady,
    /// A reset happened while the analysis was running; its result was dropped.
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Completed(Phase),
    Ignored(IgnoredReason),
}

struct Inner {
    state: SessionState,
    generation: u64,
}

pub struct StudySession {
    analyzer: Arc<dyn Analyzer>,
    inner: Mutex<Inner>,
}

impl StudySession {
    pub fn new(analyzer: Arc<dyn Analyzer>) -> Self {
        Self {
            analyzer,
            inner: Mutex::new(Inner {
                state: SessionState::Idle,
                generation: 0,
            }),
        }
    }

    // State is replaced wholesale under the lock, so a poisoned guard still holds a consistent value.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> SessionState {
        self.lock().state.clone()
    }

    pub fn phase(&self) -> Phase {
        self.lock().state.phase()
    }

    /// Runs one analysis for `passage` and applies its outcome.
    ///
    /// Blank input, a submit while Loading, and a submit while a result is
    /// showing leave the state untouched and never reach the analyzer.
    pub async fn submit(&self, passage: &str) -> SubmitOutcome {
        let generation = {
            let mut inner = self.lock();
            if passage.trim().is_empty() {
                tracing::debug!("Ignoring submit with empty passage");
                return SubmitOutcome::Ignored(IgnoredReason::EmptyPassage);
            }
            match inner.state {
                SessionState::Loading => {
                    tracing::debug!("Ignoring submit while an analysis is in flight");
                    return SubmitOutcome::Ignored(IgnoredReason::InFlight);
                }
                SessionState::Success(_) => {
                    tracing::debug!("Ignoring submit while a result is displayed");
                    return SubmitOutcome::Ignored(IgnoredReason::NotReady);
                }
                SessionState::Idle | SessionState::Error { .. } => {}
            }
            inner.generation += 1;
            inner.state = SessionState::Loading;
            tracing::info!(generation = inner.generation, "Session entered Loading");
            inner.generation
        };

        let result = self.analyzer.analyze(passage).await;

        let mut inner = self.lock();
        if inner.generation != generation || inner.state.phase() != Phase::Loading {
            tracing::warn!(
                generation,
                current = inner.generation,
                "Discarding analysis result superseded by reset"
            );
            return SubmitOutcome::Ignored(IgnoredReason::Superseded);
        }

        inner.state = match result {
            Ok(record) => {
                tracing::info!(generation, reference = %record.reference, "Session entered Success");
                SessionState::Success(record)
            }
            Err(e) => {
                let kind = e.kind();
                tracing::warn!(generation, %kind, "Study analysis failed: {e}");
                SessionState::Error {
                    message: ERROR_MESSAGE.to_string(),
                    kind,
                }
            }
        };
        SubmitOutcome::Completed(inner.state.phase())
    }

    /// Returns to Idle, discarding any record or error. Returns `false` when already Idle.
    ///
    /// A reset during Loading does not abort the running call; its result is dropped on arrival.
    pub fn reset(&self) -> bool {
        let mut inner = self.lock();
        match inner.state.phase() {
            Phase::Idle => return false,
            Phase::Loading => {
                tracing::info!(
                    generation = inner.generation,
                    "Reset while Loading; in-flight result will be discarded"
                )
            }
            Phase::Success | Phase::Error => {}
        }
        inner.state = SessionState::Idle;
        inner.generation += 1;
        tracing::info!("Session reset to Idle");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::MockAnalyzer;
    use crate::error::{Result, StudyError};
    use crate::models::{KeyTerm, Language, TermDefinition, VerseInsight};
    use async_trait::async_trait;
    use tokio::sync::{Mutex as AsyncMutex, oneshot};

    fn record(reference: &str) -> StudyRecord {
        StudyRecord {
            reference: reference.to_string(),
            scripture_text: "Blessed is the man who walks not in the counsel of the wicked".to_string(),
            verse_analysis: vec![VerseInsight {
                segment: "Blessed is the man".to_string(),
                insight: "Wisdom psalm opening.".to_string(),
            }],
            key_terms: vec![KeyTerm {
                word: "blessed".to_string(),
                original_word: "ashrei".to_string(),
                language: Language::Hebrew,
                definition: "happy, fortunate".to_string(),
                significance: "A state, not a wish.".to_string(),
            }],
            misconceptions: String::new(),
            cultural_context: "Temple worship.".to_string(),
            original_meaning: "Two ways to live.".to_string(),
            theological_truth: "God knows the way of the righteous.".to_string(),
            cross_references: vec![],
            complex_terms: vec![TermDefinition {
                term: "Torah".to_string(),
                definition: "Instruction, law.".to_string(),
            }],
            application: "Delight in Scripture.".to_string(),
            prayer_point: "Plant me by streams of water.".to_string(),
        }
    }

    fn session_with(mock: MockAnalyzer) -> StudySession {
        StudySession::new(Arc::new(mock))
    }

    /// Analyzer that blocks until the test releases it.
    struct GatedAnalyzer {
        gate: AsyncMutex<Option<oneshot::Receiver<Result<StudyRecord>>>>,
    }

    #[async_trait]
    impl Analyzer for GatedAnalyzer {
        async fn analyze(&self, _passage: &str) -> Result<StudyRecord> {
            let rx = self
                .gate
                .lock()
                .await
                .take()
                .expect("gated analyzer called once");
            rx.await.expect("test sends a result")
        }
    }

    fn gated() -> (Arc<StudySession>, oneshot::Sender<Result<StudyRecord>>) {
        let (tx, rx) = oneshot::channel();
        let analyzer = GatedAnalyzer {
            gate: AsyncMutex::new(Some(rx)),
        };
        (Arc::new(StudySession::new(Arc::new(analyzer))), tx)
    }

    async fn wait_for_loading(session: &StudySession) {
        while session.phase() != Phase::Loading {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_starts_idle() {
        let session = session_with(MockAnalyzer::new());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.state().record().is_none());
        assert!(session.state().error_message().is_none());
    }

    #[tokio::test]
    async fn test_submit_success() {
        let mut mock = MockAnalyzer::new();
        mock.expect_analyze()
            .withf(|p| p.trim() == "Psalm 1")
            .times(1)
            .returning(|_| Ok(record("Psalm 1")));
        let session = session_with(mock);

        let outcome = session.submit("Psalm 1").await;
        assert_eq!(outcome, SubmitOutcome::Completed(Phase::Success));
        let state = session.state();
        assert_eq!(state.record().map(|r| r.reference.as_str()), Some("Psalm 1"));
        assert!(state.error_message().is_none());
    }

    #[tokio::test]
    async fn test_blank_passage_never_calls_analyzer() {
        let mut mock = MockAnalyzer::new();
        mock.expect_analyze().times(0);
        let session = session_with(mock);

        for blank in ["", "   ", "\n\t"] {
            assert_eq!(
                session.submit(blank).await,
                SubmitOutcome::Ignored(IgnoredReason::EmptyPassage)
            );
            assert_eq!(session.phase(), Phase::Idle);
        }
    }

    #[tokio::test]
    async fn test_failure_collapses_to_fixed_message() {
        let mut mock = MockAnalyzer::new();
        mock.expect_analyze()
            .times(1)
            .returning(|_| Err(StudyError::MalformedResponse("expected value at line 1".into())));
        let session = session_with(mock);

        assert_eq!(
            session.submit("Psalm 1").await,
            SubmitOutcome::Completed(Phase::Error)
        );
        let state = session.state();
        assert_eq!(state.error_message(), Some(ERROR_MESSAGE));
        assert_eq!(state.error_kind(), Some(ErrorKind::MalformedResponse));
        assert!(state.record().is_none());
        assert!(!ERROR_MESSAGE.contains("line 1"));
    }

    #[tokio::test]
    async fn test_resubmit_from_error() {
        let mut mock = MockAnalyzer::new();
        let mut seq = mockall::Sequence::new();
        mock.expect_analyze()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(StudyError::Transport("offline".into())));
        mock.expect_analyze()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(record("Psalm 2")));
        let session = session_with(mock);

        session.submit("Psalm 2").await;
        assert_eq!(session.phase(), Phase::Error);
        assert_eq!(
            session.submit("Psalm 2").await,
            SubmitOutcome::Completed(Phase::Success)
        );
    }

    #[tokio::test]
    async fn test_submit_while_success_is_ignored() {
        let mut mock = MockAnalyzer::new();
        mock.expect_analyze()
            .times(1)
            .returning(|_| Ok(record("Psalm 1")));
        let session = session_with(mock);

        session.submit("Psalm 1").await;
        assert_eq!(
            session.submit("Psalm 2").await,
            SubmitOutcome::Ignored(IgnoredReason::NotReady)
        );
        assert_eq!(
            session.state().record().map(|r| r.reference.clone()),
            Some("Psalm 1".to_string())
        );
    }

    #[tokio::test]
    async fn test_reset_semantics() {
        let mut mock = MockAnalyzer::new();
        mock.expect_analyze()
            .times(1)
            .returning(|_| Ok(record("Psalm 1")));
        let session = session_with(mock);

        assert!(!session.reset(), "reset from Idle is a no-op");
        session.submit("Psalm 1").await;
        assert!(session.reset());
        assert_eq!(session.state(), SessionState::Idle);
        assert!(!session.reset());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[tokio::test]
    async fn test_submit_while_loading_is_ignored() {
        let (session, release) = gated();

        let running = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.submit("Psalm 1").await }
        });
        wait_for_loading(&session).await;

        assert_eq!(
            session.submit("Psalm 2").await,
            SubmitOutcome::Ignored(IgnoredReason::InFlight)
        );

        release.send(Ok(record("Psalm 1"))).expect("receiver alive");
        assert_eq!(
            running.await.expect("task joins"),
            SubmitOutcome::Completed(Phase::Success)
        );
    }

    #[tokio::test]
    async fn test_late_result_after_reset_is_dropped() {
        let (session, release) = gated();

        let running = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.submit("Psalm 1").await }
        });
        wait_for_loading(&session).await;

        assert!(session.reset());
        assert_eq!(session.phase(), Phase::Idle);

        release.send(Ok(record("Psalm 1"))).expect("receiver alive");
        assert_eq!(
            running.await.expect("task joins"),
            SubmitOutcome::Ignored(IgnoredReason::Superseded)
        );
        assert_eq!(session.state(), SessionState::Idle);
    }
}
