//! # Domain Models
//!
//! These structs represent the core entities of Rusty-QA.
//! Identifiers are opaque positive integers handed out by the persistence plugin.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle of a persisted question. Two questions with the same body are
/// still different questions; only the handle identifies one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionId(pub i64);

/// Handle of a persisted answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AnswerId(pub i64);

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AnswerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A question posted to the board, together with its answers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub body: String,
    pub asked_by: String,
    /// Answers in the order they were posted
    pub answers: Vec<Answer>,
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn new(body: impl Into<String>, asked_by: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            asked_by: asked_by.into(),
            answers: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn add_answer(&mut self, answer: Answer) {
        self.answers.push(answer);
    }

    /// Answers in display order, see [`crate::ranking`].
    pub fn ranked_answers(&self) -> Vec<&Answer> {
        crate::ranking::ranked(&self.answers)
    }
}

/// An answer to a question.
///
/// The vote counters only ever grow and the correctness flag only ever
/// flips to `true`, so the fields are private and mutated through the
/// tracker methods below. Mutation needs `&mut self`; callers sharing an
/// answer between threads put it behind a lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    id: Option<AnswerId>,
    text: String,
    answered_by: String,
    upvotes: u32,
    downvotes: u32,
    is_correct: bool,
    created_at: DateTime<Utc>,
}

impl Answer {
    pub fn new(text: impl Into<String>, answered_by: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            answered_by: answered_by.into(),
            upvotes: 0,
            downvotes: 0,
            is_correct: false,
            created_at: Utc::now(),
        }
    }

    /// Rebuilds an answer from stored state. Only persistence plugins
    /// should need this.
    pub fn restore(
        id: AnswerId,
        text: String,
        answered_by: String,
        upvotes: u32,
        downvotes: u32,
        is_correct: bool,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Some(id),
            text,
            answered_by,
            upvotes,
            downvotes,
            is_correct,
            created_at,
        }
    }

    pub fn with_id(mut self, id: AnswerId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn id(&self) -> Option<AnswerId> {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn answered_by(&self) -> &str {
        &self.answered_by
    }

    pub fn upvotes(&self) -> u32 {
        self.upvotes
    }

    pub fn downvotes(&self) -> u32 {
        self.downvotes
    }

    pub fn is_correct(&self) -> bool {
        self.is_correct
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    // Vote/correctness tracking

    pub fn upvote(&mut self) {
        self.upvotes += 1;
    }

    pub fn downvote(&mut self) {
        self.downvotes += 1;
    }

    /// One-way flag; calling it again is a no-op.
    pub fn mark_as_correct(&mut self) {
        self.is_correct = true;
    }

    /// Net score, negative when downvotes outnumber upvotes.
    pub fn score(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }
}
