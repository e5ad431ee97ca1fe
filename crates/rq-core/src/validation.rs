//! # Content Validation
//!
//! Screens question and answer text before it is persisted.
//!
//! Rules run in order and the first failing one decides the message:
//! empty input, length bounds on the trimmed text, then a pattern scan.
//!
//! The pattern scan is an advisory filter against obviously SQL-looking
//! input, not an injection defense. Storage plugins bind every value as a
//! query parameter regardless of what this module says.

use log::debug;
use serde::{Deserialize, Serialize};

pub const QUESTION_MIN_LEN: usize = 5;
pub const QUESTION_MAX_LEN: usize = 150;
pub const ANSWER_MIN_LEN: usize = 1;
pub const ANSWER_MAX_LEN: usize = 500;

/// Lower-case substrings that reject a text outright. Plain containment,
/// so "I will update the post" is rejected too.
pub const FORBIDDEN_PATTERNS: &[&str] = &[
    "drop table",
    "delete from",
    "insert into",
    "update ",
    "select ",
    ";",
    "--",
    "/*",
    "*/",
    "exec ",
    "execute ",
    "xp_",
    "sp_",
];

/// Outcome of a single validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    valid: bool,
    message: String,
}

impl ValidationResult {
    fn accept(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: message.into(),
        }
    }

    fn reject(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Which kind of text is being checked, with its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContentKind {
    Question,
    Answer,
}

impl ContentKind {
    fn label(self) -> &'static str {
        match self {
            ContentKind::Question => "Question",
            ContentKind::Answer => "Answer",
        }
    }

    fn bounds(self) -> (usize, usize) {
        match self {
            ContentKind::Question => (QUESTION_MIN_LEN, QUESTION_MAX_LEN),
            ContentKind::Answer => (ANSWER_MIN_LEN, ANSWER_MAX_LEN),
        }
    }
}

pub fn validate_question(text: &str) -> ValidationResult {
    validate(ContentKind::Question, Some(text))
}

pub fn validate_answer(text: &str) -> ValidationResult {
    validate(ContentKind::Answer, Some(text))
}

/// Same as [`validate_question`], for callers holding a value that may be absent.
pub fn validate_question_opt(text: Option<&str>) -> ValidationResult {
    validate(ContentKind::Question, text)
}

/// Same as [`validate_answer`], for callers holding a value that may be absent.
pub fn validate_answer_opt(text: Option<&str>) -> ValidationResult {
    validate(ContentKind::Answer, text)
}

/// Returns the first forbidden pattern contained in `text`, if any.
pub fn find_forbidden_pattern(text: &str) -> Option<&'static str> {
    let lowered = text.trim().to_lowercase();
    FORBIDDEN_PATTERNS
        .iter()
        .copied()
        .find(|pattern| lowered.contains(pattern))
}

fn validate(kind: ContentKind, text: Option<&str>) -> ValidationResult {
    let label = kind.label();
    let trimmed = text.map(str::trim).unwrap_or_default();

    if trimmed.is_empty() {
        debug!("{label} rejected: empty");
        return ValidationResult::reject(format!("{label} cannot be empty"));
    }

    let (min, max) = kind.bounds();
    let len = trimmed.chars().count();
    if len < min {
        debug!("{label} rejected: {len} chars, minimum {min}");
        return ValidationResult::reject(format!(
            "{label} must be at least {min} characters long"
        ));
    }
    if len > max {
        debug!("{label} rejected: {len} chars, maximum {max}");
        return ValidationResult::reject(format!(
            "{label} cannot exceed {max} characters"
        ));
    }

    if let Some(pattern) = find_forbidden_pattern(trimmed) {
        debug!("{label} rejected: contains {pattern:?}");
        return ValidationResult::reject(format!(
            "{label} contains forbidden content"
        ));
    }

    ValidationResult::accept(format!("{label} is valid"))
}
