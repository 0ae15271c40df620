use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::ids::{ChecklistItemId, LessonId, StepId};

/// Composite key for a checklist item's completion flag: `<step>-<item>`.
#[must_use]
pub fn checklist_key(step: &StepId, item: &ChecklistItemId) -> String {
    format!("{step}-{item}")
}

/// Composite key for a checklist item's free-text value: `<step>-<item>-value`.
#[must_use]
pub fn input_value_key(step: &StepId, item: &ChecklistItemId) -> String {
    format!("{step}-{item}-value")
}

/// Composite key for a step in the global progress record: `<lesson>-<step>`.
#[must_use]
pub fn lesson_step_key(lesson: &LessonId, step: &StepId) -> String {
    format!("{lesson}-{step}")
}

/// Persisted per-lesson progress.
///
/// Each field is stored as its own record, so a partial or corrupt store
/// still yields usable defaults for the remaining fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub step_index: usize,
    pub code_by_step: BTreeMap<StepId, String>,
    pub step_completed: BTreeMap<StepId, bool>,
    pub checklist_items: BTreeMap<String, bool>,
    pub input_values: BTreeMap<String, String>,
}

impl LessonProgress {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Global progress across lessons.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    #[serde(default)]
    pub completed_lessons: BTreeMap<LessonId, bool>,
    #[serde(default)]
    pub completed_steps: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_lesson_id: Option<LessonId>,
}

impl UserProgress {
    pub fn mark_step_completed(&mut self, lesson: &LessonId, step: &StepId) {
        self.completed_steps
            .insert(lesson_step_key(lesson, step), true);
    }

    pub fn mark_lesson_completed(&mut self, lesson: &LessonId) {
        self.completed_lessons.insert(lesson.clone(), true);
    }

    pub fn set_current_lesson(&mut self, lesson: &LessonId) {
        self.current_lesson_id = Some(lesson.clone());
    }

    #[must_use]
    pub fn is_lesson_completed(&self, lesson: &LessonId) -> bool {
        self.completed_lessons.get(lesson).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn is_step_completed(&self, lesson: &LessonId, step: &StepId) -> bool {
        self.completed_steps
            .get(&lesson_step_key(lesson, step))
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_keys() {
        let step = StepId::new("01");
        let item = ChecklistItemId::new("client-id");
        assert_eq!(checklist_key(&step, &item), "01-client-id");
        assert_eq!(input_value_key(&step, &item), "01-client-id-value");
        assert_eq!(lesson_step_key(&LessonId::new("passport-01"), &step), "passport-01-01");
    }

    #[test]
    fn user_progress_marks() {
        let mut progress = UserProgress::default();
        let lesson = LessonId::new("passport-01");
        progress.mark_step_completed(&lesson, &StepId::new("02"));
        progress.mark_lesson_completed(&lesson);
        progress.set_current_lesson(&lesson);

        assert!(progress.is_lesson_completed(&lesson));
        assert!(progress.is_step_completed(&lesson, &StepId::new("02")));
        assert!(!progress.is_step_completed(&lesson, &StepId::new("03")));
        assert_eq!(progress.current_lesson_id, Some(lesson));
    }

    #[test]
    fn user_progress_json_shape() {
        let mut progress = UserProgress::default();
        progress.mark_lesson_completed(&LessonId::new("l1"));
        let json = serde_json::to_string(&progress).unwrap();
        assert_eq!(json, r#"{"completedLessons":{"l1":true},"completedSteps":{}}"#);

        let back: UserProgress = serde_json::from_str("{}").unwrap();
        assert_eq!(back, UserProgress::default());
    }
}
