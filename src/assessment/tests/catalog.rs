use super::common::*;
use crate::assessment::catalog::{AssessmentCatalog, CatalogError};
use crate::assessment::domain::{DimensionId, QuestionId};

#[test]
fn standard_catalog_passes_validation() {
    let standard = AssessmentCatalog::standard();
    let revalidated = AssessmentCatalog::new(
        standard.dimensions().to_vec(),
        standard.questions().to_vec(),
        standard.section_size(),
    );
    assert!(revalidated.is_ok(), "compiled catalog must satisfy the loader checks");
}

#[test]
fn standard_catalog_is_sectioned_per_dimension() {
    let catalog = AssessmentCatalog::standard();
    assert_eq!(catalog.len(), 25);
    assert_eq!(catalog.section_size(), 5);

    // each block of five consecutive questions shares one dimension
    for section in 0..catalog.len() / catalog.section_size() {
        let start = section * catalog.section_size();
        let first = catalog.dimension_at(start).expect("dimension present");
        for offset in 1..catalog.section_size() {
            assert_eq!(catalog.dimension_at(start + offset), Some(first));
        }
    }
}

#[test]
fn rejects_weights_not_summing_to_one() {
    let result = AssessmentCatalog::new(
        vec![dimension("a", 0.5), dimension("b", 0.4)],
        vec![direct_question("q1", "a", 10.0)],
        1,
    );
    assert!(matches!(result, Err(CatalogError::WeightSum(_))));
}

#[test]
fn accepts_weights_within_epsilon() {
    let result = AssessmentCatalog::new(
        vec![dimension("a", 0.6), dimension("b", 0.4 + 5e-7)],
        vec![direct_question("q1", "a", 10.0)],
        1,
    );
    assert!(result.is_ok());
}

#[test]
fn rejects_duplicate_question_ids() {
    let result = AssessmentCatalog::new(
        vec![dimension("a", 1.0)],
        vec![
            direct_question("q1", "a", 10.0),
            direct_question("q1", "a", 5.0),
        ],
        2,
    );
    assert!(matches!(
        result,
        Err(CatalogError::DuplicateQuestion(QuestionId(id))) if id == "q1"
    ));
}

#[test]
fn rejects_questions_with_unknown_dimension() {
    let result = AssessmentCatalog::new(
        vec![dimension("a", 1.0)],
        vec![direct_question("q1", "ghost", 10.0)],
        1,
    );
    assert!(matches!(
        result,
        Err(CatalogError::UnknownDimension { dimension: DimensionId(d), .. }) if d == "ghost"
    ));
}

#[test]
fn loads_catalog_from_json() {
    let raw = r##"{
        "version": 3,
        "section_size": 1,
        "dimensions": [
            {"id": "a", "weight": 1.0, "name": "Alpha", "icon": "star", "color": "#fff"}
        ],
        "questions": [
            {"id": "q1", "dimension": "a", "interaction": "slider", "rule": "direct", "max_points": 10.0},
            {"id": "q2", "dimension": "a", "interaction": "multiple_choice", "rule": "weighted", "weights": [0.5, 1.0]}
        ]
    }"##;

    let catalog = AssessmentCatalog::from_json(raw).expect("catalog loads");
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog.position(&QuestionId("q2".to_string())), Some(1));
}

#[test]
fn unknown_scoring_rule_tag_fails_at_load() {
    let raw = r##"{
        "version": 3,
        "section_size": 1,
        "dimensions": [
            {"id": "a", "weight": 1.0, "name": "Alpha", "icon": "star", "color": "#fff"}
        ],
        "questions": [
            {"id": "q1", "dimension": "a", "interaction": "slider", "rule": "sentiment"}
        ]
    }"##;

    assert!(matches!(
        AssessmentCatalog::from_json(raw),
        Err(CatalogError::Malformed(_))
    ));
}

#[test]
fn rejects_empty_weight_tables() {
    let mut question = direct_question("q1", "a", 10.0);
    question.rule = crate::assessment::domain::ScoringRule::Weighted {
        weights: Vec::new(),
    };
    let result = AssessmentCatalog::new(vec![dimension("a", 1.0)], vec![question], 1);
    assert!(matches!(result, Err(CatalogError::EmptyWeightTable(_))));
}
