use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{LessonId, StepId};
use crate::model::step::{Step, StepDraft, StepError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson id cannot be blank")]
    BlankId,

    #[error("lesson {lesson} has no steps")]
    NoSteps { lesson: LessonId },

    #[error("lesson {lesson} lists step {step} twice")]
    DuplicateStep { lesson: LessonId, step: StepId },

    #[error("lesson {lesson}: {source}")]
    Step {
        lesson: LessonId,
        #[source]
        source: StepError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDraft {
    pub id: LessonId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_to_complete: Option<String>,
    #[serde(default)]
    pub coming_soon: bool,
    #[serde(default)]
    pub steps: Vec<StepDraft>,
}

impl LessonDraft {
    /// Validate the draft and its steps.
    ///
    /// Coming-soon lessons keep no steps; every other lesson needs at least one.
    ///
    /// # Errors
    ///
    /// Returns `LessonError` for blank ids, empty lessons, repeated step ids,
    /// or any step that fails validation.
    pub fn validate(self) -> Result<Lesson, LessonError> {
        if self.id.as_str().trim().is_empty() {
            return Err(LessonError::BlankId);
        }

        let steps = if self.coming_soon {
            Vec::new()
        } else {
            if self.steps.is_empty() {
                return Err(LessonError::NoSteps { lesson: self.id });
            }
            let mut seen = HashSet::new();
            let mut steps = Vec::with_capacity(self.steps.len());
            for draft in self.steps {
                if !seen.insert(draft.id.clone()) {
                    return Err(LessonError::DuplicateStep {
                        lesson: self.id,
                        step: draft.id,
                    });
                }
                let step = draft.validate().map_err(|source| LessonError::Step {
                    lesson: self.id.clone(),
                    source,
                })?;
                steps.push(step);
            }
            steps
        };

        Ok(Lesson {
            id: self.id,
            title: self.title,
            description: self.description,
            difficulty: self.difficulty,
            time_to_complete: self.time_to_complete,
            coming_soon: self.coming_soon,
            completed: false,
            steps,
        })
    }
}

/// A validated lesson. `completed` is injected from user progress, never authored.
#[derive(Debug, Clone)]
pub struct Lesson {
    id: LessonId,
    title: String,
    description: String,
    difficulty: Option<String>,
    time_to_complete: Option<String>,
    coming_soon: bool,
    completed: bool,
    steps: Vec<Step>,
}

impl Lesson {
    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn difficulty(&self) -> Option<&str> {
        self.difficulty.as_deref()
    }

    #[must_use]
    pub fn time_to_complete(&self) -> Option<&str> {
        self.time_to_complete.as_deref()
    }

    #[must_use]
    pub fn is_coming_soon(&self) -> bool {
        self.coming_soon
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub fn step(&self, id: &StepId) -> Option<&Step> {
        self.steps.iter().find(|step| step.id() == id)
    }

    #[must_use]
    pub fn step_index(&self, id: &StepId) -> Option<usize> {
        self.steps.iter().position(|step| step.id() == id)
    }
}
