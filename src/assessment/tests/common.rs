use std::sync::{Arc, Mutex};

use axum::response::Response;
use serde_json::Value;

use crate::assessment::catalog::AssessmentCatalog;
use crate::assessment::domain::{
    AnswerValue, Dimension, DimensionId, InteractionType, Question, QuestionId, ScoringRule,
    SessionId, Stage,
};
use crate::assessment::policy::{AdaptivePolicy, PolicyConfig};
use crate::assessment::repository::{InMemorySessionStore, SessionStore, StoreError};
use crate::assessment::router::assessment_router;
use crate::assessment::scoring::ResponseScorer;
use crate::assessment::service::AssessmentService;
use crate::assessment::session::{AssessmentEngine, SessionState};

pub(super) fn dimension(id: &str, weight: f64) -> Dimension {
    Dimension {
        id: DimensionId(id.to_string()),
        weight,
        name: format!("Dimension {id}"),
        icon: "star".to_string(),
        color: "#123456".to_string(),
    }
}

pub(super) fn direct_question(id: &str, dim: &str, max_points: f64) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        dimension: DimensionId(dim.to_string()),
        interaction: InteractionType::Slider,
        rule: ScoringRule::Direct { max_points },
        required: true,
    }
}

pub(super) fn percentage_question(id: &str, dim: &str) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        dimension: DimensionId(dim.to_string()),
        interaction: InteractionType::ScenarioChoice,
        rule: ScoringRule::Percentage,
        required: true,
    }
}

/// Five direct questions in one fully weighted dimension.
pub(super) fn single_dimension_catalog() -> AssessmentCatalog {
    let questions = (0..5)
        .map(|index| direct_question(&format!("q{index}"), "focus", 10.0))
        .collect();
    AssessmentCatalog::new(vec![dimension("focus", 1.0)], questions, 5)
        .expect("test catalog is valid")
}

/// Two dimensions weighted 0.6/0.4, two percentage questions each.
pub(super) fn two_dimension_catalog() -> AssessmentCatalog {
    let questions = vec![
        percentage_question("a1", "alpha"),
        percentage_question("a2", "alpha"),
        percentage_question("b1", "beta"),
        percentage_question("b2", "beta"),
    ];
    AssessmentCatalog::new(
        vec![dimension("alpha", 0.6), dimension("beta", 0.4)],
        questions,
        2,
    )
    .expect("test catalog is valid")
}

/// Sixteen direct questions, sections of eight; used for break pacing.
pub(super) fn long_catalog() -> AssessmentCatalog {
    let questions = (0..16)
        .map(|index| direct_question(&format!("q{index:02}"), "focus", 10.0))
        .collect();
    AssessmentCatalog::new(vec![dimension("focus", 1.0)], questions, 8)
        .expect("test catalog is valid")
}

/// Policy that fires a break purely on spacing, so the fatigue path is
/// reachable inside a short catalog.
pub(super) fn eager_break_policy() -> AdaptivePolicy {
    AdaptivePolicy::new(PolicyConfig {
        break_energy_threshold: 100.0,
        min_questions_between_breaks: 7,
        encouragement_completion_ceiling: 0.7,
    })
}

/// Walk Intro -> SectionIntro -> Assessment.
pub(super) fn enter_assessment(engine: &mut AssessmentEngine) {
    engine.next().expect("intro advances");
    engine.next().expect("section intro advances");
    assert_eq!(engine.stage(), Stage::Assessment);
}

/// Answer every question at a fixed pace, pushing through interstitials,
/// and return how many submissions each inserted break followed.
pub(super) fn run_to_completion(engine: &mut AssessmentEngine, pace_ms: u64) -> Vec<usize> {
    let mut breaks = Vec::new();
    let mut submissions = 0usize;

    while engine.stage() != Stage::Results {
        match engine.stage() {
            Stage::Assessment => {
                let question = engine
                    .current_question()
                    .expect("assessment stage has a current question")
                    .clone();
                let outcome = engine
                    .submit_answer(question.id, AnswerValue::Scalar(8.0), pace_ms)
                    .expect("submission succeeds");
                submissions += 1;
                if outcome.break_inserted {
                    breaks.push(submissions);
                }
            }
            _ => {
                engine.next().expect("interstitial advances");
            }
        }
    }

    breaks
}

pub(super) fn build_service() -> (
    Arc<AssessmentService<InMemorySessionStore>>,
    Arc<InMemorySessionStore>,
) {
    let store = Arc::new(InMemorySessionStore::default());
    let service = Arc::new(AssessmentService::new(
        Arc::new(single_dimension_catalog()),
        store.clone(),
    ));
    (service, store)
}

pub(super) fn session_id(suffix: &str) -> SessionId {
    SessionId(format!("respondent-{suffix}"))
}

pub(super) fn scorer() -> ResponseScorer {
    ResponseScorer::default()
}

/// Store whose saves always fail; loads still work.
#[derive(Default)]
pub(super) struct ReadOnlyStore {
    saved: Mutex<Vec<SessionId>>,
}

impl ReadOnlyStore {
    pub(super) fn save_attempts(&self) -> Vec<SessionId> {
        self.saved.lock().expect("store mutex poisoned").clone()
    }
}

impl SessionStore for ReadOnlyStore {
    fn load(&self, _id: &SessionId) -> Result<Option<SessionState>, StoreError> {
        Ok(None)
    }

    fn save(&self, id: &SessionId, _state: &SessionState) -> Result<(), StoreError> {
        self.saved
            .lock()
            .expect("store mutex poisoned")
            .push(id.clone());
        Err(StoreError::Unavailable("volume detached".to_string()))
    }
}

/// Store that cannot even load.
pub(super) struct OfflineStore;

impl SessionStore for OfflineStore {
    fn load(&self, _id: &SessionId) -> Result<Option<SessionState>, StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }

    fn save(&self, _id: &SessionId, _state: &SessionState) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("store offline".to_string()))
    }
}

pub(super) fn router_with_service(
    service: Arc<AssessmentService<InMemorySessionStore>>,
) -> axum::Router {
    assessment_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
