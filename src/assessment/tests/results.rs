use std::collections::BTreeMap;

use super::common::*;
use crate::assessment::aggregate::{aggregate, DimensionScores};
use crate::assessment::domain::{DimensionId, QuestionId};
use crate::assessment::engagement::EngagementSnapshot;
use crate::assessment::results::{synthesize, Achievement, PotentialLevel};

fn scores(overall: u32, pairs: &[(&str, u32)]) -> DimensionScores {
    DimensionScores {
        overall,
        by_dimension: pairs
            .iter()
            .map(|(id, score)| (DimensionId(id.to_string()), *score))
            .collect(),
    }
}

fn engaged_snapshot(avg_quality: f64) -> EngagementSnapshot {
    EngagementSnapshot {
        avg_quality,
        ..EngagementSnapshot::default()
    }
}

#[test]
fn level_bands_match_in_order() {
    assert_eq!(PotentialLevel::for_score(100), PotentialLevel::Exceptional);
    assert_eq!(PotentialLevel::for_score(90), PotentialLevel::Exceptional);
    assert_eq!(PotentialLevel::for_score(89), PotentialLevel::High);
    assert_eq!(PotentialLevel::for_score(75), PotentialLevel::High);
    assert_eq!(PotentialLevel::for_score(74), PotentialLevel::Developing);
    assert_eq!(PotentialLevel::for_score(60), PotentialLevel::Developing);
    assert_eq!(PotentialLevel::for_score(59), PotentialLevel::Emerging);
    assert_eq!(PotentialLevel::for_score(0), PotentialLevel::Emerging);
}

#[test]
fn weighted_overall_combines_dimension_means() {
    let catalog = two_dimension_catalog();
    let sub_scores: BTreeMap<QuestionId, f64> = [
        (QuestionId("a1".into()), 80.0),
        (QuestionId("a2".into()), 80.0),
        (QuestionId("b1".into()), 50.0),
        (QuestionId("b2".into()), 50.0),
    ]
    .into_iter()
    .collect();

    let scores = aggregate(&catalog, &sub_scores);
    assert_eq!(scores.by_dimension[&DimensionId("alpha".into())], 80);
    assert_eq!(scores.by_dimension[&DimensionId("beta".into())], 50);
    // 80 * 0.6 + 50 * 0.4
    assert_eq!(scores.overall, 68);
}

#[test]
fn an_unanswered_dimension_scores_zero_without_renormalizing() {
    let catalog = two_dimension_catalog();
    let sub_scores: BTreeMap<QuestionId, f64> = [
        (QuestionId("a1".into()), 100.0),
        (QuestionId("a2".into()), 100.0),
    ]
    .into_iter()
    .collect();

    let scores = aggregate(&catalog, &sub_scores);
    assert_eq!(scores.by_dimension[&DimensionId("beta".into())], 0);
    // alpha's 0.6 weight stands alone; beta drags the overall down
    assert_eq!(scores.overall, 60);
}

#[test]
fn dimension_means_round_to_nearest() {
    let catalog = two_dimension_catalog();
    let sub_scores: BTreeMap<QuestionId, f64> = [
        (QuestionId("a1".into()), 70.0),
        (QuestionId("a2".into()), 71.0),
        (QuestionId("b1".into()), 0.0),
        (QuestionId("b2".into()), 1.0),
    ]
    .into_iter()
    .collect();

    let scores = aggregate(&catalog, &sub_scores);
    assert_eq!(scores.by_dimension[&DimensionId("alpha".into())], 71);
    assert_eq!(scores.by_dimension[&DimensionId("beta".into())], 1);
}

#[test]
fn percentile_is_a_clamped_proxy_of_the_overall() {
    let catalog = single_dimension_catalog();
    let snapshot = engaged_snapshot(85.0);

    let low = synthesize(&catalog, &scores(0, &[("focus", 0)]), &snapshot, 5);
    assert_eq!(low.percentile, 1);

    let mid = synthesize(&catalog, &scores(68, &[("focus", 68)]), &snapshot, 5);
    assert_eq!(mid.percentile, 61);

    let high = synthesize(&catalog, &scores(100, &[("focus", 100)]), &snapshot, 5);
    assert_eq!(high.percentile, 90);
}

#[test]
fn strength_scores_unlock_high_potential() {
    let catalog = single_dimension_catalog();
    let result = synthesize(
        &catalog,
        &scores(92, &[("focus", 92)]),
        &engaged_snapshot(85.0),
        5,
    );

    assert_eq!(result.level, PotentialLevel::Exceptional);
    assert!(result.achievements.contains(&Achievement::HighPotential));
    assert!(result.achievements.contains(&Achievement::DimensionMastery));
    assert!(result.achievements.contains(&Achievement::DeepEngagement));
    assert!(result.achievements.contains(&Achievement::FullCompletion));
    assert!(result
        .insights
        .iter()
        .any(|insight| insight.contains("strength territory")));
}

#[test]
fn partial_sessions_forfeit_full_completion() {
    let catalog = single_dimension_catalog();
    let result = synthesize(
        &catalog,
        &scores(70, &[("focus", 70)]),
        &engaged_snapshot(60.0),
        3,
    );

    assert!(!result.achievements.contains(&Achievement::FullCompletion));
    assert!(!result.achievements.contains(&Achievement::DeepEngagement));
    assert!(!result.achievements.contains(&Achievement::HighPotential));
}

#[test]
fn growth_plan_targets_the_weakest_dimension() {
    let catalog = two_dimension_catalog();
    let result = synthesize(
        &catalog,
        &scores(68, &[("alpha", 80), ("beta", 50)]),
        &engaged_snapshot(85.0),
        4,
    );

    assert_eq!(result.growth_plan.len(), 1);
    assert_eq!(result.growth_plan[0].dimension, DimensionId("beta".into()));
    assert_eq!(result.growth_plan[0].actions.len(), 3);
    assert!(result
        .insights
        .iter()
        .any(|insight| insight.contains("Dimension alpha")));
}

#[test]
fn ties_resolve_to_the_earliest_catalog_dimension() {
    let catalog = two_dimension_catalog();
    let result = synthesize(
        &catalog,
        &scores(70, &[("alpha", 70), ("beta", 70)]),
        &engaged_snapshot(85.0),
        4,
    );

    // alpha is declared first, so it wins both the standout insight and
    // the growth plan slot
    assert!(result
        .insights
        .iter()
        .any(|insight| insight.contains("Dimension alpha is your standout")));
    assert_eq!(result.growth_plan[0].dimension, DimensionId("alpha".into()));
}
