//! Adaptive potential assessment engine: a multi-stage questionnaire
//! session that scores heterogeneous question types into weighted dimension
//! scores, tracks respondent engagement in real time, and adaptively
//! inserts breaks or recommendations based on that signal.

pub mod aggregate;
pub mod catalog;
pub mod domain;
pub mod engagement;
pub mod policy;
pub mod repository;
pub mod results;
pub mod router;
pub mod scoring;
pub mod service;
pub mod session;

#[cfg(test)]
mod tests;

pub use catalog::{AssessmentCatalog, CatalogError};
pub use domain::{
    Answer, AnswerValue, Dimension, DimensionId, EngineError, InteractionType, Priority, Question,
    QuestionId, Recommendation, RecommendationKind, ScoringRule, SessionId, Stage,
};
pub use engagement::{EnergyTrend, EngagementSnapshot, EngagementTracker};
pub use policy::{AdaptivePolicy, PolicyConfig, PolicyDecision};
pub use repository::{InMemorySessionStore, SessionStore, StoreError};
pub use results::{Achievement, GrowthAction, PotentialLevel, SessionResult};
pub use router::assessment_router;
pub use scoring::{KeywordClassifier, ResponseScorer, TextClassifier};
pub use service::{AssessmentService, ServiceError, SessionView, SubmitView};
pub use session::{AssessmentEngine, SessionState, SubmitOutcome};
