use std::collections::HashMap;
use std::sync::Arc;

use academy_core::model::{ChecklistItemId, Lesson, StepId};
use academy_core::{Advance, CodeValidationTable, LessonState, QuizScore};
use storage::ProgressRepository;

use crate::error::{AppServicesError, LessonTrackerError};
use crate::progress_service::UserProgressService;

/// Drives a [`LessonState`] and writes each changed record back to storage.
///
/// Every mutation awaits its writes in order before returning, so one tracker
/// never races itself. Records are independent; a failed write leaves earlier
/// writes of the same operation in place.
pub struct LessonTracker {
    state: LessonState,
    records: ProgressRepository,
    validators: Arc<CodeValidationTable>,
}

impl LessonTracker {
    /// Load persisted progress for `lesson` and run the initialization pass.
    ///
    /// # Errors
    ///
    /// Returns `LessonTrackerError::Tracker` for lessons without steps, or
    /// `LessonTrackerError::Storage` if seeding completions cannot be written.
    pub async fn open(
        lesson: Lesson,
        records: ProgressRepository,
        validators: Arc<CodeValidationTable>,
    ) -> Result<Self, LessonTrackerError> {
        let progress = records.load_lesson(lesson.id()).await;
        let state = LessonState::new(lesson, progress)?;
        let mut tracker = Self {
            state,
            records,
            validators,
        };
        tracker.initialize().await?;
        Ok(tracker)
    }

    #[must_use]
    pub fn state(&self) -> &LessonState {
        &self.state
    }

    /// Seed content-only steps as complete. Safe to call repeatedly.
    ///
    /// # Errors
    ///
    /// Returns `LessonTrackerError::Storage` if the completion record cannot be written.
    pub async fn initialize(&mut self) -> Result<bool, LessonTrackerError> {
        let changed = self.state.initialize();
        if changed {
            self.records
                .save_completed(self.state.lesson_id(), self.state.progress())
                .await?;
        }
        Ok(changed)
    }

    /// # Errors
    ///
    /// Returns `LessonTrackerError::Storage` if the step index cannot be written.
    pub async fn set_current_step(&mut self, index: usize) -> Result<bool, LessonTrackerError> {
        let changed = self.state.set_current_step(index);
        if changed {
            self.save_step_index().await?;
        }
        Ok(changed)
    }

    /// # Errors
    ///
    /// Returns `LessonTrackerError::Storage` if the step index cannot be written.
    pub async fn previous(&mut self) -> Result<bool, LessonTrackerError> {
        let changed = self.state.previous();
        if changed {
            self.save_step_index().await?;
        }
        Ok(changed)
    }

    /// Move past the current step.
    ///
    /// Satisfied steps are mirrored into the learner's global progress; on the
    /// final step the lesson itself is marked completed there.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the step index or global progress cannot be written.
    pub async fn advance(
        &mut self,
        user: &mut UserProgressService,
    ) -> Result<Advance, AppServicesError> {
        let leaving = self.state.current_step().id().clone();
        let satisfied = self.state.is_current_completed();

        let outcome = self.state.advance();
        match outcome {
            Advance::Blocked => {
                tracing::debug!(lesson = %self.state.lesson_id(), step = %leaving, "advance blocked");
            }
            Advance::Moved(index) => {
                self.save_step_index().await?;
                if satisfied {
                    user.mark_step_completed(self.state.lesson_id(), &leaving)
                        .await?;
                }
                tracing::debug!(lesson = %self.state.lesson_id(), index, "advanced");
            }
            Advance::LessonComplete => {
                if satisfied {
                    user.mark_step_completed(self.state.lesson_id(), &leaving)
                        .await?;
                }
                user.mark_lesson_completed(self.state.lesson_id()).await?;
            }
        }
        Ok(outcome)
    }

    /// # Errors
    ///
    /// Returns `LessonTrackerError` if the step is not a code step or a write fails.
    pub async fn record_code_change(
        &mut self,
        step_id: &StepId,
        code: impl Into<String>,
    ) -> Result<bool, LessonTrackerError> {
        let valid = self
            .state
            .record_code_change(step_id, code, &self.validators)?;
        self.save_code_and_completion().await?;
        Ok(valid)
    }

    /// # Errors
    ///
    /// Returns `LessonTrackerError` if the step is not a code step or a write fails.
    pub async fn reset_step(&mut self, step_id: &StepId) -> Result<(), LessonTrackerError> {
        self.state.reset_step(step_id)?;
        self.save_code_and_completion().await
    }

    /// # Errors
    ///
    /// Returns `LessonTrackerError` if the step is not a quiz or a write fails.
    pub async fn record_quiz_result(
        &mut self,
        step_id: &StepId,
        correct: u32,
        total: u32,
    ) -> Result<bool, LessonTrackerError> {
        let passed = self.state.record_quiz_result(step_id, correct, total)?;
        self.save_completion().await?;
        Ok(passed)
    }

    /// # Errors
    ///
    /// Returns `LessonTrackerError` if the step is not a quiz or a write fails.
    pub async fn submit_quiz_answers(
        &mut self,
        step_id: &StepId,
        answers: &HashMap<String, String>,
    ) -> Result<QuizScore, LessonTrackerError> {
        let score = self.state.submit_quiz_answers(step_id, answers)?;
        self.save_completion().await?;
        Ok(score)
    }

    /// # Errors
    ///
    /// Returns `LessonTrackerError` if the step or item is missing or a write fails.
    pub async fn toggle_checklist_item(
        &mut self,
        step_id: &StepId,
        item_id: &ChecklistItemId,
        completed: bool,
    ) -> Result<bool, LessonTrackerError> {
        let done = self
            .state
            .toggle_checklist_item(step_id, item_id, completed)?;
        self.records
            .save_checklists(self.state.lesson_id(), self.state.progress())
            .await?;
        self.save_completion().await?;
        Ok(done)
    }

    /// # Errors
    ///
    /// Returns `LessonTrackerError` if the step or item is missing or a write fails.
    pub async fn set_checklist_input_value(
        &mut self,
        step_id: &StepId,
        item_id: &ChecklistItemId,
        value: impl Into<String>,
    ) -> Result<bool, LessonTrackerError> {
        let done = self
            .state
            .set_checklist_input_value(step_id, item_id, value)?;
        let lesson = self.state.lesson_id();
        let progress = self.state.progress();
        self.records.save_input_values(lesson, progress).await?;
        self.records.save_checklists(lesson, progress).await?;
        self.save_completion().await?;
        Ok(done)
    }

    /// Remove the lesson's five records and forget in-memory progress.
    ///
    /// Call [`LessonTracker::initialize`] afterwards to reseed content-only steps.
    ///
    /// # Errors
    ///
    /// Returns `LessonTrackerError::Storage` if a record cannot be removed.
    pub async fn reset_lesson(&mut self) -> Result<(), LessonTrackerError> {
        self.records.clear_lesson(self.state.lesson_id()).await?;
        self.state.reset();
        tracing::info!(lesson = %self.state.lesson_id(), "lesson reset");
        Ok(())
    }

    async fn save_step_index(&self) -> Result<(), LessonTrackerError> {
        self.records
            .save_step_index(self.state.lesson_id(), self.state.progress())
            .await?;
        Ok(())
    }

    async fn save_completion(&self) -> Result<(), LessonTrackerError> {
        self.records
            .save_completed(self.state.lesson_id(), self.state.progress())
            .await?;
        Ok(())
    }

    async fn save_code_and_completion(&self) -> Result<(), LessonTrackerError> {
        self.records
            .save_code(self.state.lesson_id(), self.state.progress())
            .await?;
        self.save_completion().await
    }
}
