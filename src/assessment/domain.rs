use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestionId(pub String);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DimensionId(pub String);

impl fmt::Display for DimensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How the respondent interacts with a question. Determines the expected
/// answer shape, not the scoring rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    Slider,
    MultipleChoice,
    ScenarioChoice,
    Ranking,
    StoryCompletion,
}

impl InteractionType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Slider => "Slider",
            Self::MultipleChoice => "Multiple Choice",
            Self::ScenarioChoice => "Scenario Choice",
            Self::Ranking => "Ranking",
            Self::StoryCompletion => "Story Completion",
        }
    }
}

/// Scoring rule attached to a question. Unknown tags fail serde
/// deserialization, surfacing as a catalog load error rather than a
/// scoring-time failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "kebab-case")]
pub enum ScoringRule {
    Direct { max_points: f64 },
    Weighted { weights: Vec<f64> },
    Percentage,
    RankPenalty { item: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: QuestionId,
    pub dimension: DimensionId,
    pub interaction: InteractionType,
    #[serde(flatten)]
    pub rule: ScoringRule,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

/// Named facet of the assessment with a fixed contribution weight.
/// Name, icon, and color feed the display layer only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub id: DimensionId,
    pub weight: f64,
    pub name: String,
    pub icon: String,
    pub color: String,
}

/// Raw answer payload. Shape depends on the interaction type: scalar values
/// for sliders and choices, an ordered list or rank map for rankings, and
/// free text for story completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Scalar(f64),
    Ranking(Vec<String>),
    RankMap(BTreeMap<String, u32>),
    Text(String),
}

impl AnswerValue {
    /// 0-based rank the respondent assigned to `item`, if any.
    pub fn rank_of(&self, item: &str) -> Option<u32> {
        match self {
            AnswerValue::Ranking(items) => {
                items.iter().position(|entry| entry == item).map(|p| p as u32)
            }
            AnswerValue::RankMap(map) => map.get(item).copied(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub question_id: QuestionId,
    pub value: AnswerValue,
    pub submitted_at: DateTime<Utc>,
    pub time_spent_ms: u64,
}

/// Stages of an assessment session, in flow order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Intro,
    SectionIntro,
    Assessment,
    EnergyBreak,
    Processing,
    Results,
}

impl Stage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Intro => "Intro",
            Self::SectionIntro => "Section Intro",
            Self::Assessment => "Assessment",
            Self::EnergyBreak => "Energy Break",
            Self::Processing => "Processing",
            Self::Results => "Results",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Encouragement,
    Pacing,
    ContentFocus,
}

impl RecommendationKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Encouragement => "Encouragement",
            Self::Pacing => "Pacing",
            Self::ContentFocus => "Content Focus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Advisory hint produced by the adaptive policy after an answer.
/// Consumed by the caller and discarded each cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub message: String,
}

/// Errors raised by the session engine. None of these mutate state.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("cannot {} during the {} stage", .action, .stage.label())]
    InvalidTransition { action: &'static str, stage: Stage },
    #[error("question {0} is required and has no answer")]
    RequiredUnanswered(QuestionId),
    #[error("already at the first question")]
    AtFirstQuestion,
}
