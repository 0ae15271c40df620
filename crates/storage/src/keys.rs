use academy_core::model::LessonId;

/// Key of the global progress record.
pub const USER_PROGRESS_KEY: &str = "lesson-storage";

/// The five per-lesson record keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonKeys {
    pub step_index: String,
    pub code: String,
    pub completed: String,
    pub checklists: String,
    pub input_values: String,
}

impl LessonKeys {
    #[must_use]
    pub fn new(lesson: &LessonId) -> Self {
        Self {
            step_index: format!("lesson-{lesson}-step-index"),
            code: format!("lesson-{lesson}-code"),
            completed: format!("lesson-{lesson}-completed"),
            checklists: format!("lesson-{lesson}-checklists"),
            input_values: format!("lesson-{lesson}-input-values"),
        }
    }

    #[must_use]
    pub fn all(&self) -> [String; 5] {
        [
            self.step_index.clone(),
            self.code.clone(),
            self.completed.clone(),
            self.checklists.clone(),
            self.input_values.clone(),
        ]
    }
}
