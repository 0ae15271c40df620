use academy_core::model::CourseDraft;
use services::InMemoryContent;

const COURSES_JSON: &str = include_str!("../content/courses.json");

/// Parse and validate the course content shipped with the binary.
pub fn bundled_content() -> Result<InMemoryContent, Box<dyn std::error::Error>> {
    let drafts: Vec<CourseDraft> = serde_json::from_str(COURSES_JSON)?;
    Ok(InMemoryContent::from_drafts(drafts)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use academy_core::model::{ChecklistItemId, LessonId, LessonProgress, StepId};
    use academy_core::{LessonState, TrackerError};
    use services::ContentSource;

    #[tokio::test]
    async fn bundled_courses_validate() {
        let content = bundled_content().expect("bundled content");
        let courses = content.list_courses().await.expect("list");
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].image(), "/images/courses/passport.jpg");

        let setup = content
            .fetch_lesson(&LessonId::new("passport-01"))
            .await
            .expect("setup lesson");
        let register = setup.step(&StepId::new("06")).expect("checklist step");
        assert!(
            register
                .checklist_item(&ChecklistItemId::new(ChecklistItemId::CLIENT_ID))
                .is_some()
        );
        assert!(setup.step(&StepId::new("01")).unwrap().is_content_only());

        let soon = content
            .fetch_lesson(&LessonId::new("passport-03"))
            .await
            .expect("coming soon lesson");
        assert!(soon.is_coming_soon());
        assert!(soon.steps().is_empty());
    }

    #[tokio::test]
    async fn bundled_redirect_uri_follows_its_pattern() {
        let content = bundled_content().expect("bundled content");
        let lesson = content
            .fetch_lesson(&LessonId::new("passport-01"))
            .await
            .expect("setup lesson");
        let mut state = LessonState::new(lesson, LessonProgress::default()).expect("state");
        let step = StepId::new("06");
        let redirect = ChecklistItemId::new("redirect-uri");

        state
            .set_checklist_input_value(&step, &redirect, "ftp://x")
            .expect("input");
        assert!(!state.is_item_completed(&step, &redirect));

        state
            .set_checklist_input_value(&step, &redirect, "http://localhost:3000/redirect")
            .expect("input");
        assert!(state.is_item_completed(&step, &redirect));

        let client_id = ChecklistItemId::new(ChecklistItemId::CLIENT_ID);
        assert!(matches!(
            state.toggle_checklist_item(&step, &client_id, true),
            Err(TrackerError::ValidatedInput { .. })
        ));
        assert!(!state.is_item_completed(&step, &client_id));
    }
}
