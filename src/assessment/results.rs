use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::aggregate::DimensionScores;
use super::catalog::AssessmentCatalog;
use super::domain::{Dimension, DimensionId};
use super::engagement::EngagementSnapshot;

/// Score floor at which the overall result reads as a clear strength.
const STRENGTH_THRESHOLD: u32 = 85;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
    DimensionMastery,
    DeepEngagement,
    FullCompletion,
    HighPotential,
}

impl Achievement {
    pub const fn label(self) -> &'static str {
        match self {
            Self::DimensionMastery => "Dimension Mastery",
            Self::DeepEngagement => "Deep Engagement",
            Self::FullCompletion => "Full Completion",
            Self::HighPotential => "High Potential",
        }
    }
}

/// Named range bucket an overall score falls into for display purposes.
/// First matching band wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PotentialLevel {
    Exceptional,
    High,
    Developing,
    Emerging,
}

const LEVEL_BANDS: [(u32, PotentialLevel); 4] = [
    (90, PotentialLevel::Exceptional),
    (75, PotentialLevel::High),
    (60, PotentialLevel::Developing),
    (0, PotentialLevel::Emerging),
];

impl PotentialLevel {
    pub fn for_score(overall: u32) -> Self {
        LEVEL_BANDS
            .iter()
            .find(|(floor, _)| overall >= *floor)
            .map(|(_, level)| *level)
            .unwrap_or(PotentialLevel::Emerging)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Exceptional => "Exceptional",
            Self::High => "High",
            Self::Developing => "Developing",
            Self::Emerging => "Emerging",
        }
    }
}

/// Priority follow-up for the weakest dimension, with three generic action
/// bullets the results page renders verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthAction {
    pub dimension: DimensionId,
    pub headline: String,
    pub actions: Vec<String>,
}

/// Final output of a completed session. Immutable once produced; owned by
/// the caller for persistence or display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResult {
    pub overall: u32,
    pub dimension_scores: BTreeMap<DimensionId, u32>,
    pub insights: Vec<String>,
    pub growth_plan: Vec<GrowthAction>,
    /// Deterministic proxy (overall * 0.9 clamped to 1..=99), not a real
    /// population percentile.
    pub percentile: u32,
    pub level: PotentialLevel,
    pub achievements: BTreeSet<Achievement>,
}

pub(crate) fn synthesize(
    catalog: &AssessmentCatalog,
    scores: &DimensionScores,
    engagement: &EngagementSnapshot,
    answered: usize,
) -> SessionResult {
    let mut insights = Vec::new();

    if scores.overall >= STRENGTH_THRESHOLD {
        insights.push(format!(
            "An overall score of {} places you firmly in strength territory across the board.",
            scores.overall
        ));
    }

    // Ties resolve to the earliest catalog dimension so the narrative stays
    // stable run to run.
    let score_of = |id: &DimensionId| scores.by_dimension.get(id).copied().unwrap_or(0);
    let mut top = None;
    for dimension in catalog.dimensions() {
        if top.map_or(true, |best: &Dimension| {
            score_of(&dimension.id) > score_of(&best.id)
        }) {
            top = Some(dimension);
        }
    }
    if let Some(dimension) = top {
        let score = scores.by_dimension.get(&dimension.id).copied().unwrap_or(0);
        insights.push(format!(
            "{} is your standout dimension at {}.",
            dimension.name, score
        ));
    }

    let mut growth_plan = Vec::new();
    let mut lowest = None;
    for dimension in catalog.dimensions() {
        if lowest.map_or(true, |best: &Dimension| {
            score_of(&dimension.id) < score_of(&best.id)
        }) {
            lowest = Some(dimension);
        }
    }
    if let Some(dimension) = lowest {
        growth_plan.push(GrowthAction {
            dimension: dimension.id.clone(),
            headline: format!("Prioritize {} this quarter", dimension.name),
            actions: vec![
                format!("Block one hour a week to work deliberately on {}.", dimension.name),
                format!(
                    "Find one person who is strong in {} and ask how they built it.",
                    dimension.name
                ),
                format!(
                    "Pick a single small project where {} is the deciding factor and finish it.",
                    dimension.name
                ),
            ],
        });
    }

    let mut achievements = BTreeSet::new();
    if scores.by_dimension.values().any(|score| *score >= 80) {
        achievements.insert(Achievement::DimensionMastery);
    }
    if engagement.avg_quality > 80.0 {
        achievements.insert(Achievement::DeepEngagement);
    }
    if answered == catalog.len() {
        achievements.insert(Achievement::FullCompletion);
    }
    if scores.overall >= STRENGTH_THRESHOLD {
        achievements.insert(Achievement::HighPotential);
    }

    let percentile = ((f64::from(scores.overall) * 0.9).round() as u32).clamp(1, 99);

    SessionResult {
        overall: scores.overall,
        dimension_scores: scores.by_dimension.clone(),
        insights,
        growth_plan,
        percentile,
        level: PotentialLevel::for_score(scores.overall),
        achievements,
    }
}
