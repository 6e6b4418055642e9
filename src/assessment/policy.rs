use serde::{Deserialize, Serialize};

use super::domain::{Priority, Recommendation, RecommendationKind};
use super::engagement::{EnergyTrend, EngagementSnapshot};

/// Tunable thresholds for the adaptive policy. Defaults are the production
/// flow's constants; tests raise the break threshold to reach the fatigue
/// path inside a short catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub break_energy_threshold: f64,
    pub min_questions_between_breaks: u32,
    pub encouragement_completion_ceiling: f64,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            break_energy_threshold: 60.0,
            min_questions_between_breaks: 7,
            encouragement_completion_ceiling: 0.7,
        }
    }
}

/// What the policy wants after one answer. The break decision is
/// authoritative for the state machine; the recommendation is advisory and
/// may be surfaced or suppressed by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyDecision {
    pub insert_break: bool,
    pub recommendation: Option<Recommendation>,
}

/// Consumes the engagement snapshot after every answer and decides whether
/// to pause the sequence or nudge the respondent. Deterministic rules, no
/// model calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdaptivePolicy {
    config: PolicyConfig,
    consecutive_decreasing: u32,
}

impl AdaptivePolicy {
    pub fn new(config: PolicyConfig) -> Self {
        Self {
            config,
            consecutive_decreasing: 0,
        }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// `completion` is the answered fraction of the catalog in [0, 1].
    pub fn evaluate(&mut self, snapshot: &EngagementSnapshot, completion: f64) -> PolicyDecision {
        self.consecutive_decreasing = match snapshot.trend {
            EnergyTrend::Decreasing => self.consecutive_decreasing + 1,
            _ => 0,
        };

        let insert_break = snapshot.energy_level <= self.config.break_energy_threshold
            && snapshot.questions_since_break >= self.config.min_questions_between_breaks;

        PolicyDecision {
            insert_break,
            recommendation: self.recommend(snapshot, completion),
        }
    }

    fn recommend(&self, snapshot: &EngagementSnapshot, completion: f64) -> Option<Recommendation> {
        if self.consecutive_decreasing >= 2
            && completion < self.config.encouragement_completion_ceiling
        {
            return Some(Recommendation {
                kind: RecommendationKind::Encouragement,
                priority: Priority::High,
                message: "You're building real momentum. Every answer sharpens your profile, \
                          and the strongest sections are still ahead."
                    .to_string(),
            });
        }

        if snapshot.avg_response_ms < 8_000.0 {
            return Some(Recommendation {
                kind: RecommendationKind::Pacing,
                priority: Priority::Medium,
                message: "There's no timer here. Sitting with each question for a moment \
                          gives a truer read on your potential."
                    .to_string(),
            });
        }

        if snapshot.avg_quality >= 90.0 {
            return Some(Recommendation {
                kind: RecommendationKind::ContentFocus,
                priority: Priority::Low,
                message: "Strong focus so far. The upcoming questions dig into how you turn \
                          ideas into action."
                    .to_string(),
            });
        }

        None
    }

    pub fn reset(&mut self) {
        self.consecutive_decreasing = 0;
    }
}
