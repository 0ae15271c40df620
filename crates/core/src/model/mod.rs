mod course;
mod ids;
mod lesson;
pub mod progress;
mod step;

pub use course::{Course, CourseDraft, CourseError, Prerequisite, Resource, ResourceDraft};
pub use ids::{ChecklistItemId, CourseId, LessonId, ParseIdError, StepId};
pub use lesson::{Lesson, LessonDraft, LessonError};
pub use progress::{LessonProgress, UserProgress};
pub use step::{
    ChecklistDraft, ChecklistItem, ChecklistItemDraft, ChecklistItemKind, CodeChallenge,
    Interaction, InteractionKind, QuizQuestion, Step, StepDraft, StepError, score_quiz,
};
