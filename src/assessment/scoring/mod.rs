mod rules;
mod text;

pub use text::{KeywordClassifier, TextClassifier};

use tracing::warn;

use super::domain::{Answer, AnswerValue, Question, ScoringRule};

/// Converts one raw answer plus its question's scoring rule into a
/// normalized 0-100 sub-score. Holds the pluggable text classifier for
/// story-completion answers.
pub struct ResponseScorer {
    classifier: Box<dyn TextClassifier>,
}

impl ResponseScorer {
    pub fn new(classifier: Box<dyn TextClassifier>) -> Self {
        Self { classifier }
    }

    pub fn score(&self, question: &Question, answer: &Answer) -> f64 {
        // Free text is first classified to a 0-100 value, then flows
        // through the question's rule like any scalar.
        let scalar = match &answer.value {
            AnswerValue::Scalar(value) => Some(*value),
            AnswerValue::Text(text) => Some(self.classifier.classify(text)),
            AnswerValue::Ranking(_) | AnswerValue::RankMap(_) => None,
        };

        match &question.rule {
            ScoringRule::Direct { max_points } => match scalar {
                Some(value) => rules::direct(value, *max_points, &question.id),
                None => shape_mismatch(question),
            },
            ScoringRule::Weighted { weights } => match scalar {
                Some(value) => rules::weighted(value, weights, &question.id),
                None => shape_mismatch(question),
            },
            ScoringRule::Percentage => match scalar {
                Some(value) => rules::percentage(value),
                None => shape_mismatch(question),
            },
            ScoringRule::RankPenalty { item } => match answer.value.rank_of(item) {
                Some(rank) => rules::rank_penalty(rank),
                None => {
                    warn!(
                        question = %question.id,
                        item,
                        "ranking answer does not rank the scored item, scoring 0"
                    );
                    0.0
                }
            },
        }
    }
}

impl Default for ResponseScorer {
    fn default() -> Self {
        Self::new(Box::new(KeywordClassifier::growth_vocabulary()))
    }
}

fn shape_mismatch(question: &Question) -> f64 {
    warn!(
        question = %question.id,
        interaction = question.interaction.label(),
        "answer shape does not fit the scoring rule, scoring 0"
    );
    0.0
}
