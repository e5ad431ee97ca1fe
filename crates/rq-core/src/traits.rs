//! # Core Traits (Ports)
//!
//! Any persistence plugin must implement these traits to be used by the binary.
//! The core never issues SQL or holds connections; that belongs to the plugin.

use async_trait::async_trait;

use crate::models::{Answer, AnswerId, Question, QuestionId};

/// Data persistence contract for questions and their answers.
///
/// Infrastructure failures come back as `Err`. A missing target is not an
/// error: `false` / `None` tells the caller nothing was written.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait QuestionRepo: Send + Sync {
    /// Stores the question (without its answers) and returns its new handle.
    async fn save_question(&self, question: &Question) -> anyhow::Result<QuestionId>;

    /// Removes the question and, with it, all of its answers.
    async fn delete_question(&self, id: QuestionId) -> anyhow::Result<bool>;

    /// Appends an answer to an existing question.
    /// Returns `None` when the question does not exist.
    async fn save_answer(
        &self,
        question_id: QuestionId,
        answer: &Answer,
    ) -> anyhow::Result<Option<AnswerId>>;

    async fn update_question(&self, id: QuestionId, body: &str) -> anyhow::Result<bool>;

    /// Adds one upvote to the stored answer. Counters are incremented in
    /// storage, never overwritten from a caller's copy.
    async fn record_upvote(&self, id: AnswerId) -> anyhow::Result<bool>;

    async fn record_downvote(&self, id: AnswerId) -> anyhow::Result<bool>;

    /// Sets the stored correctness flag. There is no way to clear it.
    async fn mark_correct(&self, id: AnswerId) -> anyhow::Result<bool>;

    /// Every stored question with its answers, oldest first.
    async fn load_all(&self) -> anyhow::Result<Vec<(QuestionId, Question)>>;
}
