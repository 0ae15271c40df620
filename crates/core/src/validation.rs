//! Completion predicates for interactive steps.
//!
//! Code challenges are matched textually against the reference solution;
//! nothing is compiled or executed. Checklist inputs are checked per
//! keystroke by an [`InputRule`]. Quizzes pass at a fixed 70% threshold.

use std::collections::HashMap;

use regex::Regex;

use crate::model::{ChecklistItemId, StepId};

//
// ─── CODE CHALLENGES ───────────────────────────────────────────────────────────
//

/// How a step's submitted code is compared with its reference solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeCheck {
    /// Every token must appear somewhere in the submission.
    RequiredTokens(Vec<String>),
    /// Submission and solution must be equal once whitespace runs are collapsed.
    NormalizedMatch,
}

impl CodeCheck {
    #[must_use]
    pub fn required_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::RequiredTokens(tokens.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn accepts(&self, code: &str, solution: &str) -> bool {
        match self {
            CodeCheck::RequiredTokens(tokens) => tokens.iter().all(|t| code.contains(t.as_str())),
            CodeCheck::NormalizedMatch => {
                normalize_whitespace(code) == normalize_whitespace(solution)
            }
        }
    }
}

static FALLBACK_CHECK: CodeCheck = CodeCheck::NormalizedMatch;

/// Step-specific code checks, keyed by step id.
///
/// Steps without an entry fall back to [`CodeCheck::NormalizedMatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodeValidationTable {
    rules: HashMap<StepId, CodeCheck>,
}

impl CodeValidationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules used by the bundled Passport course.
    #[must_use]
    pub fn passport_defaults() -> Self {
        Self::new()
            .with_rule(
                StepId::new("02"),
                CodeCheck::required_tokens([
                    "environment",
                    "clientId",
                    "redirectUri",
                    "audience",
                    "scope",
                ]),
            )
            .with_rule(
                StepId::new("03"),
                CodeCheck::required_tokens(["passport.Passport", "imtblConfig"]),
            )
            .with_rule(
                StepId::new("04"),
                CodeCheck::required_tokens([
                    "connectEvm",
                    "BrowserProvider",
                    "Contract",
                    "safeTransferFrom",
                ]),
            )
    }

    #[must_use]
    pub fn with_rule(mut self, step_id: StepId, check: CodeCheck) -> Self {
        self.rules.insert(step_id, check);
        self
    }

    #[must_use]
    pub fn check_for(&self, step_id: &StepId) -> &CodeCheck {
        self.rules.get(step_id).unwrap_or(&FALLBACK_CHECK)
    }

    /// Returns true if `code` satisfies the check registered for `step_id`.
    ///
    /// An empty reference solution never validates, whatever the check.
    #[must_use]
    pub fn validate(&self, step_id: &StepId, code: &str, solution: &str) -> bool {
        if solution.is_empty() {
            return false;
        }
        self.check_for(step_id).accepts(code, solution)
    }
}

fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

//
// ─── CHECKLIST INPUTS ──────────────────────────────────────────────────────────
//

/// Validity rule for a free-text checklist item.
#[derive(Debug, Clone)]
pub enum InputRule {
    /// No validation; the value is only stored.
    Unchecked,
    /// Valid when the trimmed value has strictly more characters than this.
    LongerThan(usize),
    /// Valid when the pattern matches anywhere in the value.
    Pattern(Regex),
}

impl InputRule {
    /// Minimum exclusive length for the well-known `client-id` item.
    pub const CLIENT_ID_MIN_EXCLUSIVE: usize = 8;

    /// Select the rule for an item. The `client-id` length rule takes precedence
    /// over any declared pattern.
    ///
    /// # Errors
    ///
    /// Returns `regex::Error` if `pattern` does not compile.
    pub fn for_item(id: &ChecklistItemId, pattern: Option<&str>) -> Result<Self, regex::Error> {
        if id.is_client_id() {
            return Ok(Self::LongerThan(Self::CLIENT_ID_MIN_EXCLUSIVE));
        }
        match pattern {
            Some(p) => Regex::new(p).map(Self::Pattern),
            None => Ok(Self::Unchecked),
        }
    }

    /// Evaluate a value. `None` means the rule does not decide completion.
    #[must_use]
    pub fn evaluate(&self, value: &str) -> Option<bool> {
        match self {
            InputRule::Unchecked => None,
            InputRule::LongerThan(min) => Some(value.trim().chars().count() > *min),
            InputRule::Pattern(re) => Some(re.is_match(value)),
        }
    }

    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        match self {
            InputRule::Pattern(re) => Some(re.as_str()),
            _ => None,
        }
    }
}

//
// ─── QUIZZES ───────────────────────────────────────────────────────────────────
//

/// Outcome of a quiz submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizScore {
    pub correct: u32,
    pub total: u32,
}

impl QuizScore {
    #[must_use]
    pub fn new(correct: u32, total: u32) -> Self {
        Self { correct, total }
    }

    /// 70% of answers correct, boundary inclusive. An empty quiz never passes.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.total > 0 && u64::from(self.correct) * 10 >= u64::from(self.total) * 7
    }
}
