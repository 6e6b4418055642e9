use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::warn;

use super::catalog::AssessmentCatalog;
use super::domain::{
    AnswerValue, EngineError, Question, QuestionId, Recommendation, SessionId, Stage,
};
use super::engagement::EngagementSnapshot;
use super::policy::{AdaptivePolicy, PolicyConfig};
use super::repository::SessionStore;
use super::results::SessionResult;
use super::scoring::ResponseScorer;
use super::session::AssessmentEngine;

/// Composes the per-session engines with the persistence collaborator.
/// One engine per respondent, injected where needed; nothing global.
pub struct AssessmentService<S> {
    catalog: Arc<AssessmentCatalog>,
    store: Arc<S>,
    policy_config: PolicyConfig,
    sessions: Mutex<BTreeMap<SessionId, AssessmentEngine>>,
}

/// Error raised by the session service. Persistence failures are not here:
/// they degrade to `persisted: false` on the returned views.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("no active session {0}")]
    SessionNotFound(SessionId),
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Sanitized session snapshot for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: SessionId,
    pub stage: Stage,
    pub stage_label: &'static str,
    pub cursor: usize,
    pub answered: usize,
    pub total_questions: usize,
    pub engagement: EngagementSnapshot,
    pub persisted: bool,
}

/// What one answer submission produced, for API responses.
#[derive(Debug, Clone, Serialize)]
pub struct SubmitView {
    pub session_id: SessionId,
    pub recorded: bool,
    pub stage: Stage,
    pub stage_label: &'static str,
    pub break_inserted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    pub engagement: EngagementSnapshot,
    pub persisted: bool,
}

impl<S> AssessmentService<S>
where
    S: SessionStore + 'static,
{
    pub fn new(catalog: Arc<AssessmentCatalog>, store: Arc<S>) -> Self {
        Self::with_policy(catalog, store, PolicyConfig::default())
    }

    pub fn with_policy(
        catalog: Arc<AssessmentCatalog>,
        store: Arc<S>,
        policy_config: PolicyConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            policy_config,
            sessions: Mutex::new(BTreeMap::new()),
        }
    }

    /// Start a session, resuming from the store when a saved state exists.
    /// A failed load degrades to a fresh session with a warning.
    pub fn start(&self, session_id: SessionId) -> Result<SessionView, ServiceError> {
        let engine = match self.store.load(&session_id) {
            Ok(Some(state)) => AssessmentEngine::restore(
                self.catalog.clone(),
                ResponseScorer::default(),
                AdaptivePolicy::new(self.policy_config.clone()),
                state,
            ),
            Ok(None) => self.fresh_engine(),
            Err(err) => {
                warn!(%session_id, error = %err, "session load failed, starting fresh");
                self.fresh_engine()
            }
        };

        let mut sessions = self.lock_sessions();
        let persisted = self.persist(&session_id, &engine);
        let view = self.view(&session_id, &engine, persisted);
        sessions.insert(session_id, engine);
        Ok(view)
    }

    pub fn submit_answer(
        &self,
        session_id: &SessionId,
        question_id: QuestionId,
        value: AnswerValue,
        time_spent_ms: u64,
    ) -> Result<SubmitView, ServiceError> {
        let mut sessions = self.lock_sessions();
        let engine = sessions
            .get_mut(session_id)
            .ok_or_else(|| ServiceError::SessionNotFound(session_id.clone()))?;

        let outcome = engine.submit_answer(question_id, value, time_spent_ms)?;
        let persisted = self.persist(session_id, engine);

        Ok(SubmitView {
            session_id: session_id.clone(),
            recorded: outcome.recorded,
            stage: outcome.stage,
            stage_label: outcome.stage.label(),
            break_inserted: outcome.break_inserted,
            recommendation: outcome.recommendation,
            engagement: outcome.engagement,
            persisted,
        })
    }

    pub fn next(&self, session_id: &SessionId) -> Result<SessionView, ServiceError> {
        self.with_engine(session_id, |engine| {
            engine.next()?;
            Ok(())
        })
    }

    pub fn previous(&self, session_id: &SessionId) -> Result<SessionView, ServiceError> {
        self.with_engine(session_id, |engine| {
            engine.previous()?;
            Ok(())
        })
    }

    pub fn reset(&self, session_id: &SessionId) -> Result<SessionView, ServiceError> {
        self.with_engine(session_id, |engine| {
            engine.reset();
            Ok(())
        })
    }

    pub fn current_question(&self, session_id: &SessionId) -> Result<Option<Question>, ServiceError> {
        let sessions = self.lock_sessions();
        let engine = sessions
            .get(session_id)
            .ok_or_else(|| ServiceError::SessionNotFound(session_id.clone()))?;
        Ok(engine.current_question().cloned())
    }

    pub fn stage(&self, session_id: &SessionId) -> Result<Stage, ServiceError> {
        let sessions = self.lock_sessions();
        let engine = sessions
            .get(session_id)
            .ok_or_else(|| ServiceError::SessionNotFound(session_id.clone()))?;
        Ok(engine.stage())
    }

    pub fn result(&self, session_id: &SessionId) -> Result<SessionResult, ServiceError> {
        let sessions = self.lock_sessions();
        let engine = sessions
            .get(session_id)
            .ok_or_else(|| ServiceError::SessionNotFound(session_id.clone()))?;
        Ok(engine.result()?.clone())
    }

    fn with_engine<F>(&self, session_id: &SessionId, apply: F) -> Result<SessionView, ServiceError>
    where
        F: FnOnce(&mut AssessmentEngine) -> Result<(), EngineError>,
    {
        let mut sessions = self.lock_sessions();
        let engine = sessions
            .get_mut(session_id)
            .ok_or_else(|| ServiceError::SessionNotFound(session_id.clone()))?;

        apply(engine)?;
        let persisted = self.persist(session_id, engine);
        Ok(self.view(session_id, engine, persisted))
    }

    fn fresh_engine(&self) -> AssessmentEngine {
        AssessmentEngine::with_parts(
            self.catalog.clone(),
            ResponseScorer::default(),
            AdaptivePolicy::new(self.policy_config.clone()),
        )
    }

    fn lock_sessions(
        &self,
    ) -> std::sync::MutexGuard<'_, BTreeMap<SessionId, AssessmentEngine>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // Persistence is eventually consistent: a failed save keeps the
    // in-memory session authoritative and surfaces as persisted=false.
    fn persist(&self, session_id: &SessionId, engine: &AssessmentEngine) -> bool {
        match self.store.save(session_id, &engine.state()) {
            Ok(()) => true,
            Err(err) => {
                warn!(%session_id, error = %err, "session save failed, continuing in memory");
                false
            }
        }
    }

    fn view(&self, session_id: &SessionId, engine: &AssessmentEngine, persisted: bool) -> SessionView {
        SessionView {
            session_id: session_id.clone(),
            stage: engine.stage(),
            stage_label: engine.stage().label(),
            cursor: engine.cursor(),
            answered: engine.answered(),
            total_questions: engine.total_questions(),
            engagement: engine.engagement().clone(),
            persisted,
        }
    }
}
