use std::collections::HashMap;
use std::sync::Arc;

use academy_core::model::{
    ChecklistDraft, ChecklistItemDraft, ChecklistItemId, ChecklistItemKind, CodeChallenge,
    CourseDraft, CourseId, LessonDraft, LessonId, QuizQuestion, StepDraft, StepId,
};
use academy_core::time::fixed_clock;
use academy_core::{Advance, CodeValidationTable};
use services::{AppServices, InMemoryContent, LessonAccess, RefreshOutcome};

fn setup_lesson(title: &str) -> LessonDraft {
    let mut code = StepDraft::content_only("03", "Create the client");
    code.code_challenge = Some(CodeChallenge::new(
        "import { passport } from '@imtbl/sdk';",
        "export const client = new passport.Passport(imtblConfig);",
    ));

    let mut quiz = StepDraft::content_only("05", "Quiz");
    quiz.quiz = Some(vec![
        QuizQuestion {
            id: "q1".into(),
            prompt: "Where does login return to?".into(),
            options: vec!["audience".into(), "redirectUri".into()],
            correct_answer: "redirectUri".into(),
            explanation: None,
        },
        QuizQuestion {
            id: "q2".into(),
            prompt: "Which scope signs transactions?".into(),
            options: vec!["email".into(), "transact".into()],
            correct_answer: "transact".into(),
            explanation: None,
        },
    ]);

    let mut register = StepDraft::content_only("06", "Register");
    register.checklist = Some(ChecklistDraft {
        items: vec![ChecklistItemDraft {
            id: ChecklistItemId::new(ChecklistItemId::CLIENT_ID),
            text: "Paste your client id".into(),
            kind: ChecklistItemKind::Input,
            placeholder: None,
            validation_pattern: None,
        }],
    });

    LessonDraft {
        id: LessonId::new("passport-01"),
        title: title.to_owned(),
        description: String::new(),
        difficulty: None,
        time_to_complete: None,
        coming_soon: false,
        steps: vec![
            StepDraft::content_only("01", "Intro"),
            code,
            quiz,
            register,
        ],
    }
}

fn content() -> InMemoryContent {
    InMemoryContent::from_drafts(vec![CourseDraft {
        id: CourseId::new("passport"),
        title: "Passport".into(),
        description: String::new(),
        image: None,
        difficulty: None,
        lessons: vec![
            setup_lesson("Set up Passport"),
            LessonDraft {
                id: LessonId::new("passport-02"),
                title: "Callback".into(),
                description: String::new(),
                difficulty: None,
                time_to_complete: None,
                coming_soon: false,
                steps: vec![StepDraft::content_only("redirect-page", "Redirect")],
            },
        ],
        prerequisites: Vec::new(),
        resources: Vec::new(),
    }])
    .expect("valid content")
}

#[tokio::test]
async fn lesson_flow_through_sqlite() {
    let db_url = "sqlite:file:memdb_lesson_flow?mode=memory&cache=shared";
    let services = AppServices::new_sqlite(
        db_url,
        Arc::new(content()),
        CodeValidationTable::passport_defaults(),
        fixed_clock(),
    )
    .await
    .expect("services");
    let first = LessonId::new("passport-01");
    let second = LessonId::new("passport-02");

    let mut user = services.user_progress().await;
    assert_eq!(
        services.catalog().lesson_access(&second, user.progress()),
        Some(LessonAccess::Locked)
    );

    let mut tracker = services
        .open_lesson(&first, &mut user)
        .await
        .expect("open lesson");
    assert_eq!(user.current_lesson_id(), Some(&first));
    assert_eq!(tracker.advance(&mut user).await.unwrap(), Advance::Moved(1));

    let code_step = StepId::new("03");
    assert_eq!(tracker.advance(&mut user).await.unwrap(), Advance::Blocked);
    assert!(
        tracker
            .record_code_change(&code_step, "new passport.Passport(imtblConfig)")
            .await
            .unwrap()
    );
    assert_eq!(tracker.advance(&mut user).await.unwrap(), Advance::Moved(2));

    let answers: HashMap<String, String> = [("q1", "redirectUri"), ("q2", "email")]
        .into_iter()
        .map(|(q, a)| (q.to_owned(), a.to_owned()))
        .collect();
    let score = tracker
        .submit_quiz_answers(&StepId::new("05"), &answers)
        .await
        .unwrap();
    assert!(!score.passed());
    assert_eq!(tracker.advance(&mut user).await.unwrap(), Advance::Moved(3));

    let register = StepId::new("06");
    let client_id = ChecklistItemId::new(ChecklistItemId::CLIENT_ID);
    assert!(
        !tracker
            .set_checklist_input_value(&register, &client_id, "12345678")
            .await
            .unwrap()
    );
    assert_eq!(tracker.advance(&mut user).await.unwrap(), Advance::Blocked);
    assert!(
        tracker
            .set_checklist_input_value(&register, &client_id, "123456789")
            .await
            .unwrap()
    );
    assert_eq!(
        tracker.advance(&mut user).await.unwrap(),
        Advance::LessonComplete
    );

    let reloaded = services.user_progress().await;
    assert!(reloaded.is_lesson_completed(&first));
    assert!(reloaded.progress().is_step_completed(&first, &code_step));
    assert!(!reloaded.progress().is_step_completed(&first, &StepId::new("05")));
    assert_eq!(
        services.catalog().lesson_access(&second, reloaded.progress()),
        Some(LessonAccess::Available)
    );

    let mut user = reloaded;
    let reopened = services.open_lesson(&first, &mut user).await.unwrap();
    assert_eq!(reopened.state().current_index(), 3);
    assert_eq!(
        reopened.state().input_value(&register, &client_id),
        Some("123456789")
    );
    assert!(reopened.state().is_step_completed(&code_step));
}

#[tokio::test]
async fn refresh_replaces_catalog_lesson() {
    let source = content();
    let mut services = AppServices::new(
        storage::Storage::in_memory(),
        Arc::new(source.clone()),
        CodeValidationTable::passport_defaults(),
        fixed_clock(),
    )
    .await
    .unwrap();
    let id = LessonId::new("passport-01");

    source
        .publish_lesson(setup_lesson("Set up Passport (revised)"))
        .unwrap();
    assert_eq!(
        services.catalog().lesson(&id).unwrap().title(),
        "Set up Passport"
    );

    let outcome = services.refresh_lesson(&id).await.unwrap();
    assert_eq!(
        outcome,
        RefreshOutcome::Applied {
            fetched_at: fixed_clock().now()
        }
    );
    assert_eq!(
        services.catalog().lesson(&id).unwrap().title(),
        "Set up Passport (revised)"
    );

    let missing = services.refresh_lesson(&LessonId::new("nope")).await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn unknown_lesson_cannot_be_opened() {
    let services = AppServices::new(
        storage::Storage::in_memory(),
        Arc::new(content()),
        CodeValidationTable::new(),
        fixed_clock(),
    )
    .await
    .unwrap();
    let mut user = services.user_progress().await;

    let err = services
        .open_lesson(&LessonId::new("missing"), &mut user)
        .await
        .err()
        .expect("missing lesson");
    assert!(matches!(err, services::AppServicesError::Catalog(_)));
    assert!(user.current_lesson_id().is_none());
}
