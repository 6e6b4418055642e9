use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Quality samples considered for the trend classification.
const TREND_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnergyTrend {
    Increasing,
    Decreasing,
    Stable,
}

impl EnergyTrend {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Increasing => "Increasing",
            Self::Decreasing => "Decreasing",
            Self::Stable => "Stable",
        }
    }
}

/// Derived, continuously updated summary of how attentively the respondent
/// is answering. One instance per session; recomputed after every answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngagementSnapshot {
    pub energy_level: f64,
    pub avg_response_ms: f64,
    pub avg_quality: f64,
    pub trend: EnergyTrend,
    pub questions_since_break: u32,
}

impl Default for EngagementSnapshot {
    fn default() -> Self {
        Self {
            energy_level: 100.0,
            avg_response_ms: 0.0,
            avg_quality: 0.0,
            trend: EnergyTrend::Stable,
            questions_since_break: 0,
        }
    }
}

/// Running statistics over submitted answers. Never rejects input; it only
/// derives numbers for the adaptive policy to act on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngagementTracker {
    snapshot: EngagementSnapshot,
    quality_window: VecDeque<f64>,
    total_response_ms: f64,
    total_quality: f64,
    samples: u32,
}

impl EngagementTracker {
    /// Interaction-quality heuristic from time spent on a question.
    /// Under 5s reads as low effort, over 2 minutes as distraction, the
    /// 10-60s band as optimal.
    pub fn interaction_quality(time_spent_ms: u64) -> f64 {
        if time_spent_ms < 5_000 {
            60.0
        } else if time_spent_ms > 120_000 {
            70.0
        } else if (10_000..=60_000).contains(&time_spent_ms) {
            100.0
        } else {
            85.0
        }
    }

    /// Fold one answer into the running statistics. `questions_answered` is
    /// the number of distinct answered questions after this answer.
    pub fn record(&mut self, time_spent_ms: u64, questions_answered: usize) -> f64 {
        let quality = Self::interaction_quality(time_spent_ms);

        self.samples += 1;
        self.total_response_ms += time_spent_ms as f64;
        self.total_quality += quality;

        self.quality_window.push_back(quality);
        while self.quality_window.len() > TREND_WINDOW {
            self.quality_window.pop_front();
        }

        // Energy decays with fatigue, floors at 50, and partially recovers
        // while quality stays high.
        let energy = 100.0 - questions_answered as f64 * 1.2 + (quality - 50.0) * 0.5;
        self.snapshot.energy_level = energy.clamp(50.0, 100.0);
        self.snapshot.avg_response_ms = self.total_response_ms / f64::from(self.samples);
        self.snapshot.avg_quality = self.total_quality / f64::from(self.samples);
        self.snapshot.trend = self.trend();
        self.snapshot.questions_since_break += 1;

        quality
    }

    fn trend(&self) -> EnergyTrend {
        if self.quality_window.len() < TREND_WINDOW {
            return EnergyTrend::Stable;
        }

        let samples: Vec<f64> = self.quality_window.iter().copied().collect();
        let non_decreasing = samples.windows(2).all(|pair| pair[0] <= pair[1]);
        let non_increasing = samples.windows(2).all(|pair| pair[0] >= pair[1]);

        if non_decreasing {
            EnergyTrend::Increasing
        } else if non_increasing {
            EnergyTrend::Decreasing
        } else {
            EnergyTrend::Stable
        }
    }

    pub fn snapshot(&self) -> &EngagementSnapshot {
        &self.snapshot
    }

    pub fn reset_break_counter(&mut self) {
        self.snapshot.questions_since_break = 0;
    }
}
