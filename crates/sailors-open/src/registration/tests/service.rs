use std::collections::BTreeSet;
use std::sync::Arc;

use super::common::*;
use crate::registration::assessment::{assess, validate_answers, AnswerViolation};
use crate::registration::catalog::{Category, SkillLevel};
use crate::registration::domain::RegistrationId;
use crate::registration::draft::DraftViolation;
use crate::registration::flow::{RegistrationBackend, SubmissionError};
use crate::registration::quiz::{QuizAnswer, QuizAnswerSet};
use crate::registration::repository::{RegistrationRepository, RepositoryError};
use crate::registration::roster::roster_csv;
use crate::registration::{RegistrationService, RegistrationServiceError};

fn answers_at(positions: [usize; 4]) -> QuizAnswerSet {
    let catalog = standard_catalog();
    let mut answers = QuizAnswerSet::new();
    for (index, position) in positions.into_iter().enumerate() {
        let question = catalog.get(index).expect("question exists");
        answers.insert(
            index,
            QuizAnswer::Single(question.options[position].id.clone()),
        );
    }
    answers
}

#[test]
fn submit_stores_record_and_sends_confirmation() {
    let (service, repository, notices) = build_service();

    let record = service.submit(submission()).expect("submission succeeds");

    assert!(record.registration_id.0.starts_with("reg-"));
    let stored = repository
        .fetch(&record.registration_id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.draft, doubles_draft());

    let events = notices.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].template, "registration_confirmed");
    assert_eq!(events[0].registration_id, record.registration_id);
    assert_eq!(
        events[0].details.get("categories").map(String::as_str),
        Some("Women's Singles, Mixed Doubles")
    );
    assert_eq!(
        events[0].details.get("partner_email").map(String::as_str),
        Some("wei.chen@sea.com")
    );
}

#[test]
fn submit_attaches_suggested_level() {
    let (service, _, _) = build_service();

    let record = service.submit(submission()).expect("submission succeeds");

    assert_eq!(
        record.assessment.suggested_level,
        Some(SkillLevel::Intermediate)
    );
    assert_eq!(record.assessment.components.len(), 4);
    assert_eq!(record.receipt().suggested_level, Some(SkillLevel::Intermediate));
}

#[test]
fn assessment_spans_all_three_levels() {
    let catalog = standard_catalog();

    let beginner = assess(&catalog, &answers_at([0, 0, 0, 0]));
    assert_eq!(beginner.suggested_level, Some(SkillLevel::Beginner));
    assert_eq!(beginner.mean_weight, Some(0.0));

    let advanced = assess(&catalog, &answers_at([3, 2, 2, 2]));
    assert_eq!(advanced.suggested_level, Some(SkillLevel::Advanced));
    assert_eq!(advanced.mean_weight, Some(1.0));

    let middle = assess(&catalog, &answers_at([1, 1, 1, 1]));
    assert_eq!(middle.suggested_level, Some(SkillLevel::Intermediate));
}

#[test]
fn assessment_without_single_select_answers_has_no_suggestion() {
    let catalog = standard_catalog();
    let mut answers = QuizAnswerSet::new();
    answers.insert(
        4,
        QuizAnswer::Multiple(BTreeSet::from(["q5-o3".to_string()])),
    );

    let outcome = assess(&catalog, &answers);

    assert_eq!(outcome.suggested_level, None);
    assert!(outcome.components.is_empty());
}

#[test]
fn answer_validation_catches_catalog_mismatches() {
    let catalog = standard_catalog();

    let mut unknown_index = QuizAnswerSet::new();
    unknown_index.insert(9, QuizAnswer::Single("q1-o1".to_string()));
    assert_eq!(
        validate_answers(&catalog, &unknown_index),
        Err(AnswerViolation::UnknownQuestion(9))
    );

    let mut wrong_option = QuizAnswerSet::new();
    wrong_option.insert(1, QuizAnswer::Single("q1-o1".to_string()));
    assert_eq!(
        validate_answers(&catalog, &wrong_option),
        Err(AnswerViolation::UnknownOption {
            question_id: 2,
            option_id: "q1-o1".to_string(),
        })
    );

    let mut wrong_shape = QuizAnswerSet::new();
    wrong_shape.insert(4, QuizAnswer::Single("q5-o1".to_string()));
    assert!(matches!(
        validate_answers(&catalog, &wrong_shape),
        Err(AnswerViolation::ShapeMismatch { question_id: 5, .. })
    ));

    assert_eq!(validate_answers(&catalog, &standard_answers()), Ok(()));
}

#[test]
fn submit_rejects_invalid_draft() {
    let (service, repository, notices) = build_service();
    let mut bad = submission();
    bad.draft.partner_name.clear();

    match service.submit(bad) {
        Err(RegistrationServiceError::Draft(DraftViolation::MissingPartnerDetails)) => {}
        other => panic!("expected draft violation, got {other:?}"),
    }
    assert!(repository.list(10).expect("list").is_empty());
    assert!(notices.events().is_empty());
}

#[test]
fn submit_rejects_answers_outside_catalog() {
    let (service, _, _) = build_service();
    let mut bad = submission();
    bad.answers
        .insert(0, QuizAnswer::Single("q9-o9".to_string()));

    assert!(matches!(
        service.submit(bad),
        Err(RegistrationServiceError::Answers(
            AnswerViolation::UnknownOption { .. }
        ))
    ));
}

#[test]
fn confirmation_failure_does_not_lose_registration() {
    let repository = Arc::new(MemoryRepository::default());
    let service = RegistrationService::new(
        standard_catalog(),
        repository.clone(),
        Arc::new(OfflineNotices),
    );

    let record = service.submit(submission()).expect("stored despite notice failure");

    assert!(repository
        .fetch(&record.registration_id)
        .expect("fetch")
        .is_some());
}

#[test]
fn get_propagates_not_found() {
    let (service, _, _) = build_service();

    match service.get(&RegistrationId("missing".to_string())) {
        Err(RegistrationServiceError::Repository(RepositoryError::NotFound)) => {}
        other => panic!("expected not found error, got {other:?}"),
    }
}

#[test]
fn backend_maps_storage_outage_to_retryable_error() {
    let service = RegistrationService::new(
        standard_catalog(),
        Arc::new(UnavailableRepository),
        Arc::new(MemoryNotices::default()),
    );

    let err = service
        .submit_registration(&doubles_draft(), &standard_answers())
        .expect_err("storage offline");

    assert!(err.is_retryable());
    assert!(err.to_string().contains("database offline"));
}

#[test]
fn backend_maps_validation_to_rejection() {
    let (service, _, _) = build_service();
    let mut draft = doubles_draft();
    draft.email = "not-an-email".to_string();

    let err = service
        .submit_registration(&draft, &standard_answers())
        .expect_err("invalid email");

    assert!(matches!(err, SubmissionError::Rejected(_)));
    assert!(!err.is_retryable());
}

#[test]
fn backend_receipt_echoes_categories() {
    let (service, _, _) = build_service();

    let receipt = service
        .submit_registration(&doubles_draft(), &standard_answers())
        .expect("accepted");

    assert_eq!(
        receipt.categories,
        vec![Category::WomensSingles, Category::MixedDoubles]
    );
}

#[test]
fn roster_lists_each_registration() {
    let (service, _, _) = build_service();
    let first = service.submit(submission()).expect("first");
    let mut singles = submission();
    singles.draft = singles_draft();
    let second = service.submit(singles).expect("second");

    let records = service.roster(100).expect("roster");
    let csv = String::from_utf8(roster_csv(&records).expect("csv")).expect("utf8");
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Registration ID,Full Name,Email"));
    assert!(csv.contains(&first.registration_id.0));
    assert!(csv.contains(&second.registration_id.0));
    assert!(csv.contains("Women's Singles; Mixed Doubles"));
    assert!(csv.contains("Wei Chen"));
    assert!(csv.contains("Intermediate"));
}

#[test]
fn empty_roster_still_has_header() {
    let csv = String::from_utf8(roster_csv(&[]).expect("csv")).expect("utf8");

    assert_eq!(csv.lines().count(), 1);
    assert!(csv.ends_with("Submitted At\n"));
}

#[test]
fn submit_rejects_mens_and_womens_categories_together() {
    let (service, repository, notices) = build_service();
    let mut bad = submission();
    bad.draft.categories.insert(Category::MensSingles);

    match service.submit(bad) {
        Err(RegistrationServiceError::Draft(DraftViolation::MixedCategoryFamilies)) => {}
        other => panic!("expected mixed family violation, got {other:?}"),
    }
    assert!(repository.list(10).expect("list").is_empty());
    assert!(notices.events().is_empty());
}

#[test]
fn backend_rejects_mixed_families() {
    let (service, _, _) = build_service();
    let mut draft = doubles_draft();
    draft.categories.insert(Category::MensDoubles);

    let err = service
        .submit_registration(&draft, &standard_answers())
        .expect_err("mixed families");

    assert!(matches!(err, SubmissionError::Rejected(_)));
}

#[test]
fn singles_submission_drops_partner_details() {
    let (service, _, notices) = build_service();
    let mut singles = submission();
    singles.draft = singles_draft();
    singles.draft.partner_name = "Wei Chen".to_string();
    singles.draft.partner_email = "wei.chen@sea.com".to_string();

    let record = service.submit(singles).expect("singles accepted");

    assert!(record.draft.partner_name.is_empty());
    assert!(record.draft.partner_email.is_empty());
    let csv = String::from_utf8(roster_csv(&[record]).expect("csv")).expect("utf8");
    assert!(!csv.contains("wei.chen@sea.com"));
    assert!(notices.events()[0].details.get("partner_email").is_none());
}

#[test]
fn backend_treats_duplicate_id_as_rejection() {
    let service = RegistrationService::new(
        standard_catalog(),
        Arc::new(ConflictRepository),
        Arc::new(MemoryNotices::default()),
    );

    let err = service
        .submit_registration(&doubles_draft(), &standard_answers())
        .expect_err("conflict");

    assert!(matches!(err, SubmissionError::Rejected(_)));
    assert!(!err.is_retryable());
}
