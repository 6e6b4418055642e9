use serde::Deserialize;

use super::domain::{Dimension, DimensionId, InteractionType, Question, QuestionId, ScoringRule};

/// Tolerance for the dimension-weight sum check.
pub const WEIGHT_EPSILON: f64 = 1e-6;

/// Read-only ordered question catalog, partitioned into fixed-size sections
/// per dimension. Built once at session start and never mutated.
#[derive(Debug, Clone)]
pub struct AssessmentCatalog {
    dimensions: Vec<Dimension>,
    questions: Vec<Question>,
    section_size: usize,
}

/// Malformed-catalog errors. All of these are fatal at load time; nothing
/// here is recoverable mid-session.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("dimension weights sum to {0:.6}, expected 1.0 +/- {WEIGHT_EPSILON}")]
    WeightSum(f64),
    #[error("dimension {dimension} has weight {weight}, outside [0, 1]")]
    WeightRange { dimension: DimensionId, weight: f64 },
    #[error("duplicate question id {0}")]
    DuplicateQuestion(QuestionId),
    #[error("question {question} references unknown dimension {dimension}")]
    UnknownDimension {
        question: QuestionId,
        dimension: DimensionId,
    },
    #[error("weighted rule on {0} has an empty weight table")]
    EmptyWeightTable(QuestionId),
    #[error("weighted rule on {question} contains weight {weight}, outside [0, 1]")]
    TableWeightRange { question: QuestionId, weight: f64 },
    #[error("section size must be at least 1")]
    ZeroSectionSize,
    #[error("catalog is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[allow(dead_code)]
    version: u32,
    section_size: usize,
    dimensions: Vec<Dimension>,
    questions: Vec<Question>,
}

impl AssessmentCatalog {
    /// Validating constructor used by the JSON loader and tests.
    pub fn new(
        dimensions: Vec<Dimension>,
        questions: Vec<Question>,
        section_size: usize,
    ) -> Result<Self, CatalogError> {
        if section_size == 0 {
            return Err(CatalogError::ZeroSectionSize);
        }

        for dimension in &dimensions {
            if !(0.0..=1.0).contains(&dimension.weight) {
                return Err(CatalogError::WeightRange {
                    dimension: dimension.id.clone(),
                    weight: dimension.weight,
                });
            }
        }

        let weight_sum: f64 = dimensions.iter().map(|d| d.weight).sum();
        if (weight_sum - 1.0).abs() > WEIGHT_EPSILON {
            return Err(CatalogError::WeightSum(weight_sum));
        }

        let mut seen = std::collections::BTreeSet::new();
        for question in &questions {
            if !seen.insert(question.id.clone()) {
                return Err(CatalogError::DuplicateQuestion(question.id.clone()));
            }
            if !dimensions.iter().any(|d| d.id == question.dimension) {
                return Err(CatalogError::UnknownDimension {
                    question: question.id.clone(),
                    dimension: question.dimension.clone(),
                });
            }
            if let ScoringRule::Weighted { weights } = &question.rule {
                if weights.is_empty() {
                    return Err(CatalogError::EmptyWeightTable(question.id.clone()));
                }
                if let Some(bad) = weights.iter().find(|w| !(0.0..=1.0).contains(*w)) {
                    return Err(CatalogError::TableWeightRange {
                        question: question.id.clone(),
                        weight: *bad,
                    });
                }
            }
        }

        Ok(Self {
            dimensions,
            questions,
            section_size,
        })
    }

    /// Load a versioned catalog file. Schema violations, including unknown
    /// scoring-rule tags, are fatal here rather than at scoring time.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        Self::new(file.dimensions, file.questions, file.section_size)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn section_size(&self) -> usize {
        self.section_size
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn dimension_at(&self, index: usize) -> Option<&DimensionId> {
        self.questions.get(index).map(|q| &q.dimension)
    }

    pub fn dimension(&self, id: &DimensionId) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| &d.id == id)
    }

    pub fn position(&self, id: &QuestionId) -> Option<usize> {
        self.questions.iter().position(|q| &q.id == id)
    }

    /// Standard 25-question potential assessment: five dimensions, five
    /// consecutive questions each. Compiled constant, so no failure modes.
    pub fn standard() -> Self {
        let dimensions = vec![
            dim("vision", 0.25, "Vision & Clarity", "compass", "#6C5CE7"),
            dim("resilience", 0.20, "Resilience", "shield", "#00B894"),
            dim("learning", 0.20, "Learning Agility", "book", "#0984E3"),
            dim("execution", 0.20, "Execution Discipline", "target", "#E17055"),
            dim("influence", 0.15, "Influence", "megaphone", "#FDCB6E"),
        ];

        let choice_weights = vec![0.2, 0.45, 0.7, 0.9, 1.0];

        let questions = vec![
            slider("vision_horizon", "vision", 10.0),
            choice("vision_tradeoffs", "vision", choice_weights.clone()),
            percentage("vision_clarity_pct", "vision"),
            ranking("vision_priorities", "vision", "long_term_direction"),
            story("vision_story", "vision"),
            slider("resilience_recovery", "resilience", 10.0),
            choice("resilience_setback", "resilience", choice_weights.clone()),
            percentage("resilience_stress_pct", "resilience"),
            ranking("resilience_supports", "resilience", "steady_routines"),
            story("resilience_story", "resilience"),
            slider("learning_curiosity", "learning", 10.0),
            choice("learning_feedback", "learning", choice_weights.clone()),
            percentage("learning_retention_pct", "learning"),
            ranking("learning_sources", "learning", "deliberate_practice"),
            story("learning_story", "learning"),
            slider("execution_followthrough", "execution", 10.0),
            choice("execution_planning", "execution", choice_weights.clone()),
            percentage("execution_completion_pct", "execution"),
            ranking("execution_habits", "execution", "weekly_review"),
            story("execution_story", "execution"),
            slider("influence_reach", "influence", 10.0),
            choice("influence_persuasion", "influence", choice_weights),
            percentage("influence_trust_pct", "influence"),
            ranking("influence_channels", "influence", "direct_conversations"),
            story("influence_story", "influence"),
        ];

        Self {
            dimensions,
            questions,
            section_size: 5,
        }
    }
}

fn dim(id: &str, weight: f64, name: &str, icon: &str, color: &str) -> Dimension {
    Dimension {
        id: DimensionId(id.to_string()),
        weight,
        name: name.to_string(),
        icon: icon.to_string(),
        color: color.to_string(),
    }
}

fn question(id: &str, dimension: &str, interaction: InteractionType, rule: ScoringRule) -> Question {
    Question {
        id: QuestionId(id.to_string()),
        dimension: DimensionId(dimension.to_string()),
        interaction,
        rule,
        required: true,
    }
}

fn slider(id: &str, dimension: &str, max_points: f64) -> Question {
    question(
        id,
        dimension,
        InteractionType::Slider,
        ScoringRule::Direct { max_points },
    )
}

fn choice(id: &str, dimension: &str, weights: Vec<f64>) -> Question {
    question(
        id,
        dimension,
        InteractionType::MultipleChoice,
        ScoringRule::Weighted { weights },
    )
}

fn percentage(id: &str, dimension: &str) -> Question {
    question(
        id,
        dimension,
        InteractionType::ScenarioChoice,
        ScoringRule::Percentage,
    )
}

fn ranking(id: &str, dimension: &str, item: &str) -> Question {
    question(
        id,
        dimension,
        InteractionType::Ranking,
        ScoringRule::RankPenalty {
            item: item.to_string(),
        },
    )
}

fn story(id: &str, dimension: &str) -> Question {
    let mut q = question(
        id,
        dimension,
        InteractionType::StoryCompletion,
        ScoringRule::Percentage,
    );
    // story prompts can be skipped without blocking the flow
    q.required = false;
    q
}
