use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::aggregate;
use super::catalog::AssessmentCatalog;
use super::domain::{Answer, AnswerValue, EngineError, Question, QuestionId, Recommendation, Stage};
use super::engagement::{EngagementSnapshot, EngagementTracker};
use super::policy::AdaptivePolicy;
use super::results::{self, SessionResult};
use super::scoring::ResponseScorer;

/// Everything needed to resume a session: the durable slice of the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub stage: Stage,
    pub cursor: usize,
    pub answers: BTreeMap<QuestionId, Answer>,
    pub engagement: EngagementTracker,
    pub last_break_index: Option<usize>,
}

/// What one answer submission did to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    /// False when the answer referenced an unknown question and was dropped.
    pub recorded: bool,
    pub stage: Stage,
    pub break_inserted: bool,
    pub recommendation: Option<Recommendation>,
    pub engagement: EngagementSnapshot,
}

/// One respondent's session: an explicit state machine over the catalog,
/// fed by submit/next/previous/reset events. All mutation is synchronous;
/// there is no shared state between sessions.
pub struct AssessmentEngine {
    catalog: Arc<AssessmentCatalog>,
    scorer: ResponseScorer,
    policy: AdaptivePolicy,
    stage: Stage,
    cursor: usize,
    answers: BTreeMap<QuestionId, Answer>,
    tracker: EngagementTracker,
    last_break_index: Option<usize>,
    result: Option<SessionResult>,
}

impl AssessmentEngine {
    pub fn new(catalog: Arc<AssessmentCatalog>) -> Self {
        Self::with_parts(catalog, ResponseScorer::default(), AdaptivePolicy::default())
    }

    pub fn with_parts(
        catalog: Arc<AssessmentCatalog>,
        scorer: ResponseScorer,
        policy: AdaptivePolicy,
    ) -> Self {
        Self {
            catalog,
            scorer,
            policy,
            stage: Stage::Intro,
            cursor: 0,
            answers: BTreeMap::new(),
            tracker: EngagementTracker::default(),
            last_break_index: None,
            result: None,
        }
    }

    /// Rebuild an engine from persisted state. Answers for questions that
    /// no longer exist in the catalog are dropped with a warning; a session
    /// restored into `Processing` or `Results` gets its result recomputed.
    pub fn restore(
        catalog: Arc<AssessmentCatalog>,
        scorer: ResponseScorer,
        policy: AdaptivePolicy,
        state: SessionState,
    ) -> Self {
        let SessionState {
            stage,
            cursor,
            answers,
            engagement,
            last_break_index,
        } = state;

        let mut kept = BTreeMap::new();
        for (question_id, answer) in answers {
            if catalog.position(&question_id).is_some() {
                kept.insert(question_id, answer);
            } else {
                warn!(%question_id, "dropping persisted answer for unknown question");
            }
        }

        let mut engine = Self {
            catalog,
            scorer,
            policy,
            stage,
            cursor,
            answers: kept,
            tracker: engagement,
            last_break_index,
            result: None,
        };

        if matches!(engine.stage, Stage::Processing | Stage::Results) {
            engine.result = Some(engine.synthesize());
        }

        engine
    }

    pub fn state(&self) -> SessionState {
        SessionState {
            stage: self.stage,
            cursor: self.cursor,
            answers: self.answers.clone(),
            engagement: self.tracker.clone(),
            last_break_index: self.last_break_index,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn answered(&self) -> usize {
        self.answers.len()
    }

    pub fn total_questions(&self) -> usize {
        self.catalog.len()
    }

    pub fn engagement(&self) -> &EngagementSnapshot {
        self.tracker.snapshot()
    }

    /// The question at the cursor. `None` once the catalog is exhausted.
    pub fn current_question(&self) -> Option<&Question> {
        self.catalog.question(self.cursor)
    }

    /// Record an answer, update engagement, and let the adaptive policy
    /// steer the next transition. Submitting the current question advances
    /// the cursor; re-submitting an earlier question overwrites its answer
    /// in place. An unknown question id is logged and dropped without
    /// touching session state.
    pub fn submit_answer(
        &mut self,
        question_id: QuestionId,
        value: AnswerValue,
        time_spent_ms: u64,
    ) -> Result<SubmitOutcome, EngineError> {
        if self.stage != Stage::Assessment {
            return Err(EngineError::InvalidTransition {
                action: "submit an answer",
                stage: self.stage,
            });
        }

        let Some(position) = self.catalog.position(&question_id) else {
            warn!(%question_id, "answer for unknown question id dropped");
            return Ok(SubmitOutcome {
                recorded: false,
                stage: self.stage,
                break_inserted: false,
                recommendation: None,
                engagement: self.tracker.snapshot().clone(),
            });
        };

        self.answers.insert(
            question_id.clone(),
            Answer {
                question_id,
                value,
                submitted_at: Utc::now(),
                time_spent_ms,
            },
        );

        self.tracker.record(time_spent_ms, self.answers.len());
        let completion = self.answers.len() as f64 / self.catalog.len().max(1) as f64;
        let decision = self.policy.evaluate(self.tracker.snapshot(), completion);

        if position == self.cursor {
            self.advance_cursor();
        }

        // The break decision is authoritative, but reaching the end of the
        // catalog still wins: results beat rest.
        let mut break_inserted = false;
        if decision.insert_break && !matches!(self.stage, Stage::Processing | Stage::Results) {
            self.stage = Stage::EnergyBreak;
            self.last_break_index = Some(position);
            self.tracker.reset_break_counter();
            break_inserted = true;
            debug!(position, "energy break inserted");
        }

        Ok(SubmitOutcome {
            recorded: true,
            stage: self.stage,
            break_inserted,
            recommendation: decision.recommendation,
            engagement: self.tracker.snapshot().clone(),
        })
    }

    /// Advance the flow. Drives every forward transition that is not an
    /// answer submission; in `Assessment` it skips a non-required question.
    pub fn next(&mut self) -> Result<Stage, EngineError> {
        match self.stage {
            Stage::Intro => self.stage = Stage::SectionIntro,
            Stage::SectionIntro => self.stage = Stage::Assessment,
            Stage::EnergyBreak => self.stage = Stage::SectionIntro,
            Stage::Assessment => {
                if let Some(question) = self.catalog.question(self.cursor) {
                    if question.required && !self.answers.contains_key(&question.id) {
                        return Err(EngineError::RequiredUnanswered(question.id.clone()));
                    }
                }
                self.advance_cursor();
            }
            Stage::Processing => self.stage = Stage::Results,
            Stage::Results => {
                return Err(EngineError::InvalidTransition {
                    action: "advance",
                    stage: self.stage,
                });
            }
        }
        Ok(self.stage)
    }

    /// Step back one question without re-scoring the stored answer.
    pub fn previous(&mut self) -> Result<usize, EngineError> {
        if self.stage != Stage::Assessment {
            return Err(EngineError::InvalidTransition {
                action: "navigate backwards",
                stage: self.stage,
            });
        }
        if self.cursor == 0 {
            return Err(EngineError::AtFirstQuestion);
        }
        self.cursor -= 1;
        Ok(self.cursor)
    }

    /// Valid only once the session has reached `Results`.
    pub fn result(&self) -> Result<&SessionResult, EngineError> {
        if self.stage != Stage::Results {
            return Err(EngineError::InvalidTransition {
                action: "read the result",
                stage: self.stage,
            });
        }
        self.result.as_ref().ok_or(EngineError::InvalidTransition {
            action: "read the result",
            stage: self.stage,
        })
    }

    /// Back to `Intro`, clearing answers, engagement, and any result.
    pub fn reset(&mut self) {
        self.stage = Stage::Intro;
        self.cursor = 0;
        self.answers.clear();
        self.tracker = EngagementTracker::default();
        self.policy.reset();
        self.last_break_index = None;
        self.result = None;
    }

    fn advance_cursor(&mut self) {
        self.cursor += 1;
        if self.cursor >= self.catalog.len() {
            self.enter_processing();
        } else if self.cursor % self.catalog.section_size() == 0 {
            self.stage = Stage::SectionIntro;
        } else {
            self.stage = Stage::Assessment;
        }
    }

    // The settling delay in the original flow is presentation-only, so the
    // result is computed synchronously on entry.
    fn enter_processing(&mut self) {
        self.stage = Stage::Processing;
        self.result = Some(self.synthesize());
    }

    fn synthesize(&self) -> SessionResult {
        let mut sub_scores = BTreeMap::new();
        for (question_id, answer) in &self.answers {
            if let Some(position) = self.catalog.position(question_id) {
                if let Some(question) = self.catalog.question(position) {
                    sub_scores.insert(question_id.clone(), self.scorer.score(question, answer));
                }
            }
        }

        let scores = aggregate::aggregate(&self.catalog, &sub_scores);
        results::synthesize(
            &self.catalog,
            &scores,
            self.tracker.snapshot(),
            self.answers.len(),
        )
    }
}
