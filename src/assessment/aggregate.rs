use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::catalog::AssessmentCatalog;
use super::domain::{DimensionId, QuestionId};

/// Per-dimension means plus the weighted overall score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub overall: u32,
    pub by_dimension: BTreeMap<DimensionId, u32>,
}

/// Arithmetic mean of sub-scores per dimension, rounded to the nearest
/// integer. A dimension with no answered questions scores 0 and its weight
/// is NOT renormalized away: the flow assumes every question gets answered,
/// so a skipped dimension simply contributes nothing to the overall score.
pub fn aggregate(
    catalog: &AssessmentCatalog,
    sub_scores: &BTreeMap<QuestionId, f64>,
) -> DimensionScores {
    let mut sums: BTreeMap<&DimensionId, (f64, u32)> = BTreeMap::new();
    for question in catalog.questions() {
        if let Some(score) = sub_scores.get(&question.id) {
            let entry = sums.entry(&question.dimension).or_insert((0.0, 0));
            entry.0 += score;
            entry.1 += 1;
        }
    }

    let mut by_dimension = BTreeMap::new();
    let mut weighted_sum = 0.0;
    for dimension in catalog.dimensions() {
        let score = match sums.get(&dimension.id) {
            Some((sum, count)) if *count > 0 => (sum / f64::from(*count)).round() as u32,
            _ => 0,
        };
        weighted_sum += f64::from(score) * dimension.weight;
        by_dimension.insert(dimension.id.clone(), score);
    }

    DimensionScores {
        overall: weighted_sum.round() as u32,
        by_dimension,
    }
}
