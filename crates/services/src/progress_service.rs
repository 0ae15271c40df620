use academy_core::model::{LessonId, StepId, UserProgress};
use storage::ProgressRepository;

use crate::error::ProgressServiceError;

/// Global learner progress, loaded once and written through on every change.
///
/// Passed explicitly to the operations that need it instead of living in a
/// process-wide store.
#[derive(Clone)]
pub struct UserProgressService {
    records: ProgressRepository,
    progress: UserProgress,
}

impl UserProgressService {
    /// Load persisted progress; a missing or corrupt record yields empty progress.
    pub async fn load(records: ProgressRepository) -> Self {
        let progress = records.load_user_progress().await;
        Self { records, progress }
    }

    #[must_use]
    pub fn progress(&self) -> &UserProgress {
        &self.progress
    }

    #[must_use]
    pub fn is_lesson_completed(&self, lesson: &LessonId) -> bool {
        self.progress.is_lesson_completed(lesson)
    }

    #[must_use]
    pub fn current_lesson_id(&self) -> Option<&LessonId> {
        self.progress.current_lesson_id.as_ref()
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the record cannot be written.
    pub async fn mark_step_completed(
        &mut self,
        lesson: &LessonId,
        step: &StepId,
    ) -> Result<(), ProgressServiceError> {
        if self.progress.is_step_completed(lesson, step) {
            return Ok(());
        }
        self.progress.mark_step_completed(lesson, step);
        self.persist().await
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the record cannot be written.
    pub async fn mark_lesson_completed(
        &mut self,
        lesson: &LessonId,
    ) -> Result<(), ProgressServiceError> {
        self.progress.mark_lesson_completed(lesson);
        tracing::info!(lesson = %lesson, "lesson completed");
        self.persist().await
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the record cannot be written.
    pub async fn set_current_lesson(&mut self, lesson: &LessonId) -> Result<(), ProgressServiceError> {
        self.progress.set_current_lesson(lesson);
        self.persist().await
    }

    async fn persist(&self) -> Result<(), ProgressServiceError> {
        self.records.save_user_progress(&self.progress).await?;
        Ok(())
    }
}
