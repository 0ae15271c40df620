use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ChecklistItemId, StepId};
use crate::validation::{InputRule, QuizScore};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepError {
    #[error("step id cannot be blank")]
    BlankId,

    #[error("step {step} declares more than one interactive mode")]
    MultipleInteractions { step: StepId },

    #[error("step {step} has a quiz without questions")]
    EmptyQuiz { step: StepId },

    #[error("step {step} has a checklist without items")]
    EmptyChecklist { step: StepId },

    #[error("step {step} lists checklist item {item} twice")]
    DuplicateItem { step: StepId, item: ChecklistItemId },

    #[error("step {step}: invalid validation pattern for {item}: {message}")]
    InvalidPattern {
        step: StepId,
        item: ChecklistItemId,
        message: String,
    },
}

//
// ─── CODE CHALLENGE ────────────────────────────────────────────────────────────
//

const PROGRAM_MARKERS: [&str; 6] = ["import", "function", "class", "const", "let", "var"];

fn default_language() -> String {
    "typescript".to_owned()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeChallenge {
    pub default_code: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default)]
    pub solution: String,
}

impl CodeChallenge {
    #[must_use]
    pub fn new(default_code: impl Into<String>, solution: impl Into<String>) -> Self {
        Self {
            default_code: default_code.into(),
            language: default_language(),
            solution: solution.into(),
        }
    }

    /// A starter that is only a comment, with no program text in it.
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        self.default_code.trim().starts_with("//")
            && !PROGRAM_MARKERS
                .iter()
                .any(|marker| self.default_code.contains(marker))
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl QuizQuestion {
    #[must_use]
    pub fn is_correct(&self, answer: &str) -> bool {
        self.correct_answer == answer
    }
}

/// Score a full answer sheet keyed by question id. Unanswered questions count as wrong.
#[must_use]
pub fn score_quiz(questions: &[QuizQuestion], answers: &HashMap<String, String>) -> QuizScore {
    let correct = questions
        .iter()
        .filter(|q| answers.get(&q.id).is_some_and(|a| q.is_correct(a)))
        .count();
    QuizScore::new(
        u32::try_from(correct).unwrap_or(u32::MAX),
        u32::try_from(questions.len()).unwrap_or(u32::MAX),
    )
}

//
// ─── CHECKLIST ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecklistItemKind {
    #[default]
    #[serde(alias = "toggle")]
    Checkbox,
    Input,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItemDraft {
    pub id: ChecklistItemId,
    pub text: String,
    #[serde(default, rename = "type")]
    pub kind: ChecklistItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_pattern: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChecklistItem {
    id: ChecklistItemId,
    label: String,
    kind: ChecklistItemKind,
    placeholder: Option<String>,
    rule: InputRule,
}

impl ChecklistItem {
    #[must_use]
    pub fn id(&self) -> &ChecklistItemId {
        &self.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn kind(&self) -> ChecklistItemKind {
        self.kind
    }

    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    #[must_use]
    pub fn rule(&self) -> &InputRule {
        &self.rule
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChecklistDraft {
    pub items: Vec<ChecklistItemDraft>,
}

//
// ─── STEP ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Code,
    Quiz,
    Checklist,
}

impl std::fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            InteractionKind::Code => "code challenge",
            InteractionKind::Quiz => "quiz",
            InteractionKind::Checklist => "checklist",
        };
        f.write_str(name)
    }
}

/// The single interactive mode of a step.
#[derive(Debug, Clone)]
pub enum Interaction {
    ContentOnly,
    Code(CodeChallenge),
    Quiz(Vec<QuizQuestion>),
    Checklist(Vec<ChecklistItem>),
}

impl Interaction {
    #[must_use]
    pub fn kind(&self) -> Option<InteractionKind> {
        match self {
            Interaction::ContentOnly => None,
            Interaction::Code(_) => Some(InteractionKind::Code),
            Interaction::Quiz(_) => Some(InteractionKind::Quiz),
            Interaction::Checklist(_) => Some(InteractionKind::Checklist),
        }
    }
}

/// Step as it appears in lesson content, with every mode optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDraft {
    pub id: StepId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_challenge: Option<CodeChallenge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz: Option<Vec<QuizQuestion>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checklist: Option<ChecklistDraft>,
}

impl StepDraft {
    #[must_use]
    pub fn content_only(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: StepId::new(id),
            title: title.into(),
            content: String::new(),
            code_challenge: None,
            quiz: None,
            checklist: None,
        }
    }

    /// Validate the draft into a `Step` with exactly one interaction mode.
    ///
    /// # Errors
    ///
    /// Returns `StepError` if the id is blank, more than one mode is populated,
    /// a quiz or checklist is empty, item ids repeat, or a pattern does not compile.
    pub fn validate(self) -> Result<Step, StepError> {
        if self.id.as_str().trim().is_empty() {
            return Err(StepError::BlankId);
        }

        let populated = usize::from(self.code_challenge.is_some())
            + usize::from(self.quiz.is_some())
            + usize::from(self.checklist.is_some());
        if populated > 1 {
            return Err(StepError::MultipleInteractions { step: self.id });
        }

        let interaction = if let Some(challenge) = self.code_challenge {
            Interaction::Code(challenge)
        } else if let Some(questions) = self.quiz {
            if questions.is_empty() {
                return Err(StepError::EmptyQuiz { step: self.id });
            }
            Interaction::Quiz(questions)
        } else if let Some(checklist) = self.checklist {
            Interaction::Checklist(build_items(&self.id, checklist)?)
        } else {
            Interaction::ContentOnly
        };

        Ok(Step {
            id: self.id,
            title: self.title,
            content: self.content,
            interaction,
        })
    }
}

fn build_items(step: &StepId, draft: ChecklistDraft) -> Result<Vec<ChecklistItem>, StepError> {
    if draft.items.is_empty() {
        return Err(StepError::EmptyChecklist { step: step.clone() });
    }

    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(draft.items.len());
    for item in draft.items {
        if !seen.insert(item.id.clone()) {
            return Err(StepError::DuplicateItem {
                step: step.clone(),
                item: item.id,
            });
        }
        let rule = InputRule::for_item(&item.id, item.validation_pattern.as_deref()).map_err(
            |err| StepError::InvalidPattern {
                step: step.clone(),
                item: item.id.clone(),
                message: err.to_string(),
            },
        )?;
        items.push(ChecklistItem {
            id: item.id,
            label: item.text,
            kind: item.kind,
            placeholder: item.placeholder,
            rule,
        });
    }
    Ok(items)
}

#[derive(Debug, Clone)]
pub struct Step {
    id: StepId,
    title: String,
    content: String,
    interaction: Interaction,
}

impl Step {
    #[must_use]
    pub fn id(&self) -> &StepId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    /// No code challenge, quiz or checklist at all.
    #[must_use]
    pub fn is_content_only(&self) -> bool {
        matches!(self.interaction, Interaction::ContentOnly)
    }

    #[must_use]
    pub fn code_challenge(&self) -> Option<&CodeChallenge> {
        match &self.interaction {
            Interaction::Code(challenge) => Some(challenge),
            _ => None,
        }
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&[QuizQuestion]> {
        match &self.interaction {
            Interaction::Quiz(questions) => Some(questions),
            _ => None,
        }
    }

    #[must_use]
    pub fn checklist(&self) -> Option<&[ChecklistItem]> {
        match &self.interaction {
            Interaction::Checklist(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn checklist_item(&self, item_id: &ChecklistItemId) -> Option<&ChecklistItem> {
        self.checklist()?.iter().find(|item| item.id() == item_id)
    }

    /// A code challenge whose starter is more than a comment.
    #[must_use]
    pub fn has_real_code_challenge(&self) -> bool {
        self.code_challenge().is_some_and(|c| !c.is_placeholder())
    }

    /// Content-only for display and gating: placeholder challenges do not count.
    #[must_use]
    pub fn presents_as_content_only(&self) -> bool {
        match &self.interaction {
            Interaction::ContentOnly => true,
            Interaction::Code(challenge) => challenge.is_placeholder(),
            Interaction::Quiz(_) | Interaction::Checklist(_) => false,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
