//! Per-lesson progress state machine.
//!
//! `LessonState` is pure: it mutates in-memory [`LessonProgress`] and leaves
//! persistence to the caller. Validation failures never surface as errors;
//! they only withhold or revoke completion.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::progress::{checklist_key, input_value_key};
use crate::model::{
    ChecklistItemId, ChecklistItemKind, InteractionKind, Lesson, LessonId, LessonProgress, Step,
    StepId, score_quiz,
};
use crate::validation::{CodeValidationTable, InputRule, QuizScore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TrackerError {
    #[error("lesson {0} has no steps to track")]
    NoSteps(LessonId),

    #[error("step {0} not found")]
    StepNotFound(StepId),

    #[error("checklist item {item} not found in step {step}")]
    ItemNotFound { step: StepId, item: ChecklistItemId },

    #[error("step {step} has no {expected}")]
    WrongInteraction {
        step: StepId,
        expected: InteractionKind,
    },

    #[error("checklist item {item} in step {step} is completed by its input value")]
    ValidatedInput { step: StepId, item: ChecklistItemId },
}

/// Result of asking to move past the current step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Moved to the step at this index.
    Moved(usize),
    /// The current step gates advancing and is not complete yet.
    Blocked,
    /// The final step was passed; the lesson is complete.
    LessonComplete,
}

#[derive(Debug, Clone)]
pub struct LessonState {
    lesson: Lesson,
    progress: LessonProgress,
    initialized: bool,
    editor_revision: u32,
}

impl LessonState {
    /// Wrap a lesson and its persisted progress.
    ///
    /// An out-of-range persisted step index is treated as malformed and reset to 0.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::NoSteps` for lessons without steps (coming soon).
    pub fn new(lesson: Lesson, mut progress: LessonProgress) -> Result<Self, TrackerError> {
        if lesson.steps().is_empty() {
            return Err(TrackerError::NoSteps(lesson.id().clone()));
        }
        if progress.step_index >= lesson.steps().len() {
            progress.step_index = 0;
        }
        Ok(Self {
            lesson,
            progress,
            initialized: false,
            editor_revision: 0,
        })
    }

    /// Seed completion for content-only steps. Explicit completions are kept.
    ///
    /// Returns true if any step was newly marked complete.
    pub fn initialize(&mut self) -> bool {
        if self.initialized {
            return false;
        }
        self.initialized = true;

        let mut changed = false;
        for step in self.lesson.steps() {
            if step.is_content_only() && !self.is_step_completed(step.id()) {
                self.progress.step_completed.insert(step.id().clone(), true);
                changed = true;
            }
        }
        changed
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    #[must_use]
    pub fn lesson(&self) -> &Lesson {
        &self.lesson
    }

    #[must_use]
    pub fn lesson_id(&self) -> &LessonId {
        self.lesson.id()
    }

    #[must_use]
    pub fn progress(&self) -> &LessonProgress {
        &self.progress
    }

    #[must_use]
    pub fn step_count(&self) -> usize {
        self.lesson.steps().len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.progress.step_index
    }

    #[must_use]
    pub fn current_step(&self) -> &Step {
        &self.lesson.steps()[self.progress.step_index]
    }

    #[must_use]
    pub fn is_final_step(&self) -> bool {
        self.progress.step_index + 1 == self.step_count()
    }

    /// Bumped on every step reset so hosts can remount their editor.
    #[must_use]
    pub fn editor_revision(&self) -> u32 {
        self.editor_revision
    }

    /// Look up a step of this lesson.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::StepNotFound` if the lesson has no such step.
    pub fn step(&self, step_id: &StepId) -> Result<&Step, TrackerError> {
        self.lesson
            .step(step_id)
            .ok_or_else(|| TrackerError::StepNotFound(step_id.clone()))
    }

    /// Recorded completion only.
    #[must_use]
    pub fn is_step_completed(&self, step_id: &StepId) -> bool {
        self.progress
            .step_completed
            .get(step_id)
            .copied()
            .unwrap_or(false)
    }

    /// Recorded completion, or a step that needs nothing from the learner,
    /// or a checklist whose items are all done.
    #[must_use]
    pub fn is_step_satisfied(&self, step: &Step) -> bool {
        if self.is_step_completed(step.id()) {
            return true;
        }
        match step.checklist() {
            Some(_) => self.all_items_completed(step),
            None => step.presents_as_content_only(),
        }
    }

    #[must_use]
    pub fn is_current_completed(&self) -> bool {
        self.is_step_satisfied(self.current_step())
    }

    #[must_use]
    pub fn is_item_completed(&self, step_id: &StepId, item_id: &ChecklistItemId) -> bool {
        self.progress
            .checklist_items
            .get(&checklist_key(step_id, item_id))
            .copied()
            .unwrap_or(false)
    }

    #[must_use]
    pub fn input_value(&self, step_id: &StepId, item_id: &ChecklistItemId) -> Option<&str> {
        self.progress
            .input_values
            .get(&input_value_key(step_id, item_id))
            .map(String::as_str)
    }

    /// The learner's code for a step, falling back to the starter text.
    #[must_use]
    pub fn code_for(&self, step_id: &StepId) -> Option<&str> {
        if let Some(code) = self.progress.code_by_step.get(step_id) {
            return Some(code);
        }
        self.lesson
            .step(step_id)?
            .code_challenge()
            .map(|challenge| challenge.default_code.as_str())
    }

    /// Incomplete checklists and incomplete real code challenges block advancing.
    /// Quizzes never do.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        let step = self.current_step();
        if step.checklist().is_some() && !self.all_items_completed(step) {
            return false;
        }
        !(step.has_real_code_challenge() && !self.is_step_completed(step.id()))
    }

    #[must_use]
    pub fn completed_step_count(&self) -> usize {
        self.lesson
            .steps()
            .iter()
            .filter(|step| self.is_step_satisfied(step))
            .count()
    }

    /// Position-based progress: steps behind the cursor plus the current one if done.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        let done = self.progress.step_index + usize::from(self.is_current_completed());
        let percent = done * 100 / self.step_count();
        u8::try_from(percent.min(100)).unwrap_or(100)
    }

    //
    // ─── NAVIGATION ────────────────────────────────────────────────────────────
    //

    /// Jump to a step. Out-of-range indices are ignored.
    ///
    /// Returns true if the index changed.
    pub fn set_current_step(&mut self, index: usize) -> bool {
        if index >= self.step_count() || index == self.progress.step_index {
            return false;
        }
        self.progress.step_index = index;
        true
    }

    /// Step back once. Returns true if the index changed.
    pub fn previous(&mut self) -> bool {
        match self.progress.step_index.checked_sub(1) {
            Some(index) => self.set_current_step(index),
            None => false,
        }
    }

    pub fn advance(&mut self) -> Advance {
        if !self.can_advance() {
            return Advance::Blocked;
        }
        if self.is_final_step() {
            return Advance::LessonComplete;
        }
        self.progress.step_index += 1;
        Advance::Moved(self.progress.step_index)
    }

    //
    // ─── CODE CHALLENGES ───────────────────────────────────────────────────────
    //

    /// Store the latest code and re-evaluate. Completion is revoked on failure.
    ///
    /// Returns the step's completion after evaluation.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` if the step is missing or has no code challenge.
    pub fn record_code_change(
        &mut self,
        step_id: &StepId,
        code: impl Into<String>,
        validators: &CodeValidationTable,
    ) -> Result<bool, TrackerError> {
        let code = code.into();
        let step = self.step(step_id)?;
        let challenge = step
            .code_challenge()
            .ok_or_else(|| TrackerError::WrongInteraction {
                step: step_id.clone(),
                expected: InteractionKind::Code,
            })?;

        let valid = validators.validate(step_id, &code, &challenge.solution);
        self.progress.code_by_step.insert(step_id.clone(), code);
        self.set_step_completion(step_id, valid);
        Ok(valid)
    }

    /// Discard stored code and completion for a code step.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` if the step is missing or has no code challenge.
    pub fn reset_step(&mut self, step_id: &StepId) -> Result<(), TrackerError> {
        let step = self.step(step_id)?;
        if step.code_challenge().is_none() {
            return Err(TrackerError::WrongInteraction {
                step: step_id.clone(),
                expected: InteractionKind::Code,
            });
        }
        self.progress.code_by_step.remove(step_id);
        self.progress.step_completed.remove(step_id);
        self.editor_revision = self.editor_revision.wrapping_add(1);
        Ok(())
    }

    //
    // ─── QUIZZES ───────────────────────────────────────────────────────────────
    //

    /// One-shot quiz evaluation. A failed attempt records the step as not completed.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` if the step is missing or has no quiz.
    pub fn record_quiz_result(
        &mut self,
        step_id: &StepId,
        correct: u32,
        total: u32,
    ) -> Result<bool, TrackerError> {
        self.quiz_step(step_id)?;
        let passed = QuizScore::new(correct, total).passed();
        self.progress
            .step_completed
            .insert(step_id.clone(), passed);
        Ok(passed)
    }

    /// Score an answer sheet keyed by question id and record the result.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` if the step is missing or has no quiz.
    pub fn submit_quiz_answers(
        &mut self,
        step_id: &StepId,
        answers: &HashMap<String, String>,
    ) -> Result<QuizScore, TrackerError> {
        let score = score_quiz(self.quiz_step(step_id)?, answers);
        self.record_quiz_result(step_id, score.correct, score.total)?;
        Ok(score)
    }

    fn quiz_step(&self, step_id: &StepId) -> Result<&[crate::model::QuizQuestion], TrackerError> {
        self.step(step_id)?
            .quiz()
            .ok_or_else(|| TrackerError::WrongInteraction {
                step: step_id.clone(),
                expected: InteractionKind::Quiz,
            })
    }

    //
    // ─── CHECKLISTS ────────────────────────────────────────────────────────────
    //

    /// Set or clear an item flag, then derive step completion from all items.
    ///
    /// Input items with a rule only complete through
    /// [`LessonState::set_checklist_input_value`].
    ///
    /// Returns the step's completion afterwards.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` if the step or item is missing, or
    /// `TrackerError::ValidatedInput` for an input item governed by a rule.
    pub fn toggle_checklist_item(
        &mut self,
        step_id: &StepId,
        item_id: &ChecklistItemId,
        completed: bool,
    ) -> Result<bool, TrackerError> {
        let item = self.checklist_item(step_id, item_id)?;
        if item.kind() == ChecklistItemKind::Input && !matches!(item.rule(), InputRule::Unchecked) {
            return Err(TrackerError::ValidatedInput {
                step: step_id.clone(),
                item: item_id.clone(),
            });
        }
        self.set_item_completion(step_id, item_id, completed);
        Ok(self.sync_checklist_completion(step_id))
    }

    /// Store free text for an item and re-check it against the item's rule.
    ///
    /// Items without a rule only store the value.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError` if the step or item is missing.
    pub fn set_checklist_input_value(
        &mut self,
        step_id: &StepId,
        item_id: &ChecklistItemId,
        value: impl Into<String>,
    ) -> Result<bool, TrackerError> {
        let value = value.into();
        let verdict = self.checklist_item(step_id, item_id)?.rule().evaluate(&value);
        self.progress
            .input_values
            .insert(input_value_key(step_id, item_id), value);
        if let Some(valid) = verdict {
            self.set_item_completion(step_id, item_id, valid);
        }
        Ok(self.sync_checklist_completion(step_id))
    }

    fn checklist_item(
        &self,
        step_id: &StepId,
        item_id: &ChecklistItemId,
    ) -> Result<&crate::model::ChecklistItem, TrackerError> {
        let step = self.step(step_id)?;
        if step.checklist().is_none() {
            return Err(TrackerError::WrongInteraction {
                step: step_id.clone(),
                expected: InteractionKind::Checklist,
            });
        }
        step.checklist_item(item_id)
            .ok_or_else(|| TrackerError::ItemNotFound {
                step: step_id.clone(),
                item: item_id.clone(),
            })
    }

    fn set_item_completion(&mut self, step_id: &StepId, item_id: &ChecklistItemId, done: bool) {
        let key = checklist_key(step_id, item_id);
        if done {
            self.progress.checklist_items.insert(key, true);
        } else {
            self.progress.checklist_items.remove(&key);
        }
    }

    fn all_items_completed(&self, step: &Step) -> bool {
        step.checklist().is_some_and(|items| {
            items
                .iter()
                .all(|item| self.is_item_completed(step.id(), item.id()))
        })
    }

    fn sync_checklist_completion(&mut self, step_id: &StepId) -> bool {
        let done = self
            .lesson
            .step(step_id)
            .is_some_and(|step| self.all_items_completed(step));
        self.set_step_completion(step_id, done);
        done
    }

    fn set_step_completion(&mut self, step_id: &StepId, done: bool) {
        if done {
            self.progress.step_completed.insert(step_id.clone(), true);
        } else {
            self.progress.step_completed.remove(step_id);
        }
    }

    //
    // ─── RESET ─────────────────────────────────────────────────────────────────
    //

    /// Forget everything about this lesson. The next `initialize` reseeds
    /// content-only steps.
    pub fn reset(&mut self) {
        self.progress = LessonProgress::default();
        self.initialized = false;
        self.editor_revision = 0;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        ChecklistDraft, ChecklistItemDraft, ChecklistItemKind, CodeChallenge, LessonDraft,
        QuizQuestion, StepDraft,
    };

    fn quiz(n: usize) -> Vec<QuizQuestion> {
        (1..=n)
            .map(|i| QuizQuestion {
                id: format!("q{i}"),
                prompt: format!("Question {i}"),
                options: vec!["a".into(), "b".into()],
                correct_answer: "a".into(),
                explanation: None,
            })
            .collect()
    }

    fn lesson() -> Lesson {
        let intro = StepDraft::content_only("01", "Intro");

        let mut setup = StepDraft::content_only("setup", "Setup");
        setup.checklist = Some(ChecklistDraft {
            items: vec![
                ChecklistItemDraft {
                    id: ChecklistItemId::new("account"),
                    text: "Create a Hub account".into(),
                    kind: ChecklistItemKind::Checkbox,
                    placeholder: None,
                    validation_pattern: None,
                },
                ChecklistItemDraft {
                    id: ChecklistItemId::new("client-id"),
                    text: "Paste your client id".into(),
                    kind: ChecklistItemKind::Input,
                    placeholder: None,
                    validation_pattern: None,
                },
            ],
        });

        let mut config = StepDraft::content_only("02", "Configure");
        config.code_challenge = Some(CodeChallenge::new(
            "const cfg = {};",
            "const cfg = { environment, clientId, redirectUri, audience, scope };",
        ));

        let mut check = StepDraft::content_only("quiz", "Check");
        check.quiz = Some(quiz(10));

        let outro = StepDraft::content_only("99", "Wrap up");

        LessonDraft {
            id: LessonId::new("passport-01"),
            title: "Passport setup".into(),
            description: String::new(),
            difficulty: None,
            time_to_complete: None,
            coming_soon: false,
            steps: vec![intro, setup, config, check, outro],
        }
        .validate()
        .unwrap()
    }

    fn fresh() -> LessonState {
        let mut state = LessonState::new(lesson(), LessonProgress::default()).unwrap();
        state.initialize();
        state
    }

    fn id(s: &str) -> StepId {
        StepId::new(s)
    }

    fn item(s: &str) -> ChecklistItemId {
        ChecklistItemId::new(s)
    }

    #[test]
    fn content_only_steps_complete_on_initialize() {
        let state = fresh();
        assert!(state.is_step_completed(&id("01")));
        assert!(state.is_step_completed(&id("99")));
        assert!(!state.is_step_completed(&id("setup")));
        assert!(!state.is_step_completed(&id("02")));
        assert!(!state.is_step_completed(&id("quiz")));
    }

    #[test]
    fn initialize_keeps_explicit_completions() {
        let mut progress = LessonProgress::default();
        progress.step_completed.insert(id("02"), true);
        let mut state = LessonState::new(lesson(), progress).unwrap();
        assert!(state.initialize());
        assert!(!state.initialize());
        assert!(state.is_step_completed(&id("02")));
        assert!(state.is_step_completed(&id("01")));
    }

    #[test]
    fn out_of_range_index_resets_to_start() {
        let progress = LessonProgress {
            step_index: 42,
            ..LessonProgress::default()
        };
        let state = LessonState::new(lesson(), progress).unwrap();
        assert_eq!(state.current_index(), 0);
    }

    #[test]
    fn set_current_step_ignores_out_of_range() {
        let mut state = fresh();
        assert!(state.set_current_step(4));
        assert!(!state.set_current_step(5));
        assert_eq!(state.current_index(), 4);
        assert!(state.previous());
        assert_eq!(state.current_index(), 3);
    }

    #[test]
    fn checklist_completion_is_conjunction() {
        let mut state = fresh();
        let step = id("setup");
        assert!(!state.toggle_checklist_item(&step, &item("account"), true).unwrap());
        assert!(state.set_checklist_input_value(&step, &item("client-id"), "123456789").unwrap());
        assert!(state.is_step_completed(&step));

        assert!(!state.toggle_checklist_item(&step, &item("account"), false).unwrap());
        assert!(!state.is_step_completed(&step));
    }

    #[test]
    fn client_id_input_boundary() {
        let mut state = fresh();
        let step = id("setup");
        state.set_checklist_input_value(&step, &item("client-id"), "12345678").unwrap();
        assert!(!state.is_item_completed(&step, &item("client-id")));
        assert_eq!(state.input_value(&step, &item("client-id")), Some("12345678"));

        state.set_checklist_input_value(&step, &item("client-id"), "123456789").unwrap();
        assert!(state.is_item_completed(&step, &item("client-id")));

        state.set_checklist_input_value(&step, &item("client-id"), "short").unwrap();
        assert!(!state.is_item_completed(&step, &item("client-id")));
    }

    #[test]
    fn code_completion_is_not_sticky() {
        let mut state = fresh();
        let table = CodeValidationTable::passport_defaults();
        let step = id("02");
        let full = "environment clientId redirectUri audience scope";
        assert!(state.record_code_change(&step, full, &table).unwrap());
        assert!(state.is_step_completed(&step));

        let missing_scope = "environment clientId redirectUri audience";
        assert!(!state.record_code_change(&step, missing_scope, &table).unwrap());
        assert!(!state.is_step_completed(&step));
        assert_eq!(state.code_for(&step), Some(missing_scope));
    }

    #[test]
    fn reset_step_restores_starter() {
        let mut state = fresh();
        let table = CodeValidationTable::passport_defaults();
        let step = id("02");
        state
            .record_code_change(&step, "environment clientId redirectUri audience scope", &table)
            .unwrap();
        state.reset_step(&step).unwrap();
        assert!(!state.is_step_completed(&step));
        assert_eq!(state.code_for(&step), Some("const cfg = {};"));
        assert_eq!(state.editor_revision(), 1);
    }

    #[test]
    fn quiz_threshold() {
        let mut state = fresh();
        let step = id("quiz");
        assert!(state.record_quiz_result(&step, 7, 10).unwrap());
        assert!(state.is_step_completed(&step));
        assert!(!state.record_quiz_result(&step, 6, 10).unwrap());
        assert!(!state.is_step_completed(&step));
    }

    #[test]
    fn quiz_answer_sheet_is_scored() {
        let mut state = fresh();
        let answers: HashMap<String, String> = (1..=8)
            .map(|i| (format!("q{i}"), "a".to_owned()))
            .collect();
        let score = state.submit_quiz_answers(&id("quiz"), &answers).unwrap();
        assert_eq!(score, QuizScore::new(8, 10));
        assert!(state.is_step_completed(&id("quiz")));
    }

    #[test]
    fn wrong_interaction_and_missing_lookups() {
        let mut state = fresh();
        let table = CodeValidationTable::new();
        assert!(matches!(
            state.record_code_change(&id("quiz"), "x", &table),
            Err(TrackerError::WrongInteraction { .. })
        ));
        assert!(matches!(
            state.record_quiz_result(&id("nope"), 1, 1),
            Err(TrackerError::StepNotFound(_))
        ));
        assert!(matches!(
            state.toggle_checklist_item(&id("setup"), &item("nope"), true),
            Err(TrackerError::ItemNotFound { .. })
        ));
    }

    #[test]
    fn advance_is_gated_and_signals_completion() {
        let mut state = fresh();
        assert_eq!(state.advance(), Advance::Moved(1));

        assert_eq!(state.advance(), Advance::Blocked);
        state.toggle_checklist_item(&id("setup"), &item("account"), true).unwrap();
        state.set_checklist_input_value(&id("setup"), &item("client-id"), "abcdefghij").unwrap();
        assert_eq!(state.advance(), Advance::Moved(2));

        assert_eq!(state.advance(), Advance::Blocked);
        state
            .record_code_change(
                &id("02"),
                "environment clientId redirectUri audience scope",
                &CodeValidationTable::passport_defaults(),
            )
            .unwrap();
        assert_eq!(state.advance(), Advance::Moved(3));

        // quizzes never gate
        assert_eq!(state.advance(), Advance::Moved(4));
        assert!(state.is_final_step());
        assert_eq!(state.advance(), Advance::LessonComplete);
        assert_eq!(state.current_index(), 4);
    }

    #[test]
    fn progress_percent_counts_current_step() {
        let mut state = fresh();
        // 0 behind + intro completed
        assert_eq!(state.progress_percent(), 20);
        state.set_current_step(1);
        assert_eq!(state.progress_percent(), 20);
        state.set_current_step(4);
        assert_eq!(state.progress_percent(), 100);
    }

    #[test]
    fn reset_then_initialize_matches_fresh_lesson() {
        let mut state = fresh();
        let table = CodeValidationTable::passport_defaults();
        state.set_current_step(2);
        state
            .record_code_change(&id("02"), "environment clientId", &table)
            .unwrap();
        state.toggle_checklist_item(&id("setup"), &item("account"), true).unwrap();
        state.set_checklist_input_value(&id("setup"), &item("client-id"), "abc").unwrap();
        state.record_quiz_result(&id("quiz"), 9, 10).unwrap();

        state.reset();
        state.initialize();

        let never_visited = fresh();
        assert_eq!(state.progress(), never_visited.progress());
        assert_eq!(state.current_index(), 0);
    }

    fn registration() -> LessonState {
        let input = |id: &str, pattern: Option<&str>| ChecklistItemDraft {
            id: ChecklistItemId::new(id),
            text: id.to_owned(),
            kind: ChecklistItemKind::Input,
            placeholder: None,
            validation_pattern: pattern.map(str::to_owned),
        };
        let mut register = StepDraft::content_only("register", "Register");
        register.checklist = Some(ChecklistDraft {
            items: vec![
                input("client-id", None),
                input("redirect-uri", Some("^https?://")),
                input("notes", None),
            ],
        });
        let lesson = LessonDraft {
            id: LessonId::new("passport-02"),
            title: "Register".into(),
            description: String::new(),
            difficulty: None,
            time_to_complete: None,
            coming_soon: false,
            steps: vec![register],
        }
        .validate()
        .unwrap();
        let mut state = LessonState::new(lesson, LessonProgress::default()).unwrap();
        state.initialize();
        state
    }

    #[test]
    fn toggling_a_validated_input_is_rejected() {
        let mut state = registration();
        let step = id("register");
        state.set_checklist_input_value(&step, &item("client-id"), "123").unwrap();
        state.set_checklist_input_value(&step, &item("redirect-uri"), "ftp://x").unwrap();

        for rule_item in ["client-id", "redirect-uri"] {
            assert_eq!(
                state.toggle_checklist_item(&step, &item(rule_item), true),
                Err(TrackerError::ValidatedInput {
                    step: step.clone(),
                    item: item(rule_item),
                })
            );
            assert!(!state.is_item_completed(&step, &item(rule_item)));
        }
        assert!(!state.is_step_completed(&step));
        assert!(!state.can_advance());
    }

    #[test]
    fn declared_pattern_drives_and_revokes_completion() {
        let mut state = registration();
        let step = id("register");
        state.set_checklist_input_value(&step, &item("client-id"), "123456789").unwrap();
        state.toggle_checklist_item(&step, &item("notes"), true).unwrap();

        assert!(!state.set_checklist_input_value(&step, &item("redirect-uri"), "localhost").unwrap());
        assert!(!state.is_item_completed(&step, &item("redirect-uri")));

        assert!(state
            .set_checklist_input_value(&step, &item("redirect-uri"), "http://localhost:3000")
            .unwrap());
        assert!(state.is_item_completed(&step, &item("redirect-uri")));
        assert!(state.is_step_completed(&step));
        assert!(state.can_advance());

        assert!(!state
            .set_checklist_input_value(&step, &item("redirect-uri"), "ftp://localhost")
            .unwrap());
        assert!(!state.is_item_completed(&step, &item("redirect-uri")));
        assert!(!state.is_step_completed(&step));
    }

    #[test]
    fn unchecked_input_only_stores_its_value() {
        let mut state = registration();
        let step = id("register");

        state.set_checklist_input_value(&step, &item("notes"), "anything").unwrap();
        assert!(!state.is_item_completed(&step, &item("notes")));
        assert_eq!(state.input_value(&step, &item("notes")), Some("anything"));

        state.toggle_checklist_item(&step, &item("notes"), true).unwrap();
        state.set_checklist_input_value(&step, &item("notes"), "").unwrap();
        assert!(state.is_item_completed(&step, &item("notes")));
        assert_eq!(state.input_value(&step, &item("notes")), Some(""));
    }
}
