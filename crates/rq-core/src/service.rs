//! # QaService
//!
//! Coordinates the flow between callers (CLI runner, a future web layer)
//! and the persistence port: raw text is validated, turned into a model,
//! handed to the repo, and answers are ranked on the way out.
//!
//! Accepted text is persisted trimmed, so stored bodies always satisfy the
//! length bounds they were checked against.

use log::debug;

use crate::error::{AppError, Result};
use crate::models::{Answer, AnswerId, Question, QuestionId};
use crate::ranking::rank_answers;
use crate::traits::QuestionRepo;
use crate::validation::{validate_answer, validate_question, ValidationResult};

pub struct QaService {
    repo: Box<dyn QuestionRepo>,
}

impl QaService {
    pub fn new(repo: Box<dyn QuestionRepo>) -> Self {
        Self { repo }
    }

    pub async fn ask(&self, asked_by: &str, body: &str) -> Result<QuestionId> {
        ensure_valid(validate_question(body))?;
        let question = Question::new(body.trim(), asked_by);
        let id = self.repo.save_question(&question).await?;
        debug!("question {id} saved for {asked_by}");
        Ok(id)
    }

    pub async fn answer(
        &self,
        question_id: QuestionId,
        answered_by: &str,
        text: &str,
    ) -> Result<AnswerId> {
        ensure_valid(validate_answer(text))?;
        let answer = Answer::new(text.trim(), answered_by);
        match self.repo.save_answer(question_id, &answer).await? {
            Some(id) => {
                debug!("answer {id} saved on question {question_id}");
                Ok(id)
            }
            None => Err(AppError::not_found("Question", question_id)),
        }
    }

    pub async fn edit_question(&self, id: QuestionId, body: &str) -> Result<()> {
        ensure_valid(validate_question(body))?;
        if self.repo.update_question(id, body.trim()).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Question", id))
        }
    }

    pub async fn remove_question(&self, id: QuestionId) -> Result<()> {
        if self.repo.delete_question(id).await? {
            Ok(())
        } else {
            Err(AppError::not_found("Question", id))
        }
    }

    /// Vote and correctness changes are recorded in storage first and only
    /// then applied to `answer`, so a failed write leaves the caller's copy
    /// untouched and a retry never counts twice.
    pub async fn upvote(&self, answer: &mut Answer) -> Result<()> {
        let id = saved_id(answer)?;
        found(self.repo.record_upvote(id).await?, id)?;
        answer.upvote();
        Ok(())
    }

    pub async fn downvote(&self, answer: &mut Answer) -> Result<()> {
        let id = saved_id(answer)?;
        found(self.repo.record_downvote(id).await?, id)?;
        answer.downvote();
        Ok(())
    }

    pub async fn mark_correct(&self, answer: &mut Answer) -> Result<()> {
        let id = saved_id(answer)?;
        found(self.repo.mark_correct(id).await?, id)?;
        answer.mark_as_correct();
        Ok(())
    }

    /// All questions, oldest first, each with its answers in display order.
    pub async fn board(&self) -> Result<Vec<(QuestionId, Question)>> {
        let mut questions = self.repo.load_all().await?;
        for (_, question) in questions.iter_mut() {
            rank_answers(&mut question.answers);
        }
        Ok(questions)
    }
}

fn saved_id(answer: &Answer) -> Result<AnswerId> {
    answer
        .id()
        .ok_or_else(|| AppError::Internal("answer has not been saved yet".into()))
}

fn found(written: bool, id: AnswerId) -> Result<()> {
    if written {
        Ok(())
    } else {
        Err(AppError::not_found("Answer", id))
    }
}

fn ensure_valid(result: ValidationResult) -> Result<()> {
    if result.is_valid() {
        Ok(())
    } else {
        Err(AppError::ValidationError(result.message().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockQuestionRepo;

    #[tokio::test]
    async fn ask_persists_trimmed_body() {
        let mut repo = MockQuestionRepo::new();
        repo.expect_save_question()
            .withf(|q: &Question| q.body == "What is borrowing?" && q.asked_by == "alice")
            .times(1)
            .returning(|_| Ok(QuestionId(1)));

        let service = QaService::new(Box::new(repo));
        let id = service.ask("alice", "   What is borrowing?  ").await.unwrap();
        assert_eq!(id, QuestionId(1));
    }

    #[tokio::test]
    async fn rejected_question_never_reaches_the_repo() {
        let mut repo = MockQuestionRepo::new();
        repo.expect_save_question().never();

        let service = QaService::new(Box::new(repo));
        let err = service.ask("alice", "..").await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(m) if m.contains("at least 5")));
    }

    #[tokio::test]
    async fn repo_failure_is_surfaced_unchanged() {
        let mut repo = MockQuestionRepo::new();
        repo.expect_save_question()
            .returning(|_| Err(anyhow::anyhow!("disk full")));

        let service = QaService::new(Box::new(repo));
        let err = service.ask("alice", "Why is the sky blue?").await.unwrap_err();
        assert!(matches!(err, AppError::Persistence(m) if m == "disk full"));
    }

    #[tokio::test]
    async fn answer_on_missing_question_is_not_found() {
        let mut repo = MockQuestionRepo::new();
        repo.expect_save_answer().returning(|_, _| Ok(None));

        let service = QaService::new(Box::new(repo));
        let err = service.answer(QuestionId(9), "bob", "42").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(kind, id) if kind == "Question" && id == "9"));
    }

    #[tokio::test]
    async fn answer_with_forbidden_pattern_is_rejected() {
        let mut repo = MockQuestionRepo::new();
        repo.expect_save_answer().never();

        let service = QaService::new(Box::new(repo));
        let err = service
            .answer(QuestionId(1), "mallory", "x'; DROP TABLE answers --")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }

    #[tokio::test]
    async fn edit_validates_before_updating() {
        let mut repo = MockQuestionRepo::new();
        repo.expect_update_question()
            .withf(|id, body| *id == QuestionId(3) && body == "A better question")
            .times(1)
            .returning(|_, _| Ok(true));

        let service = QaService::new(Box::new(repo));
        service
            .edit_question(QuestionId(3), " A better question ")
            .await
            .unwrap();
        assert!(service.edit_question(QuestionId(3), "").await.is_err());
    }

    #[tokio::test]
    async fn remove_missing_question_is_not_found() {
        let mut repo = MockQuestionRepo::new();
        repo.expect_delete_question().returning(|_| Ok(false));

        let service = QaService::new(Box::new(repo));
        assert!(matches!(
            service.remove_question(QuestionId(5)).await,
            Err(AppError::NotFound(..))
        ));
    }

    #[tokio::test]
    async fn votes_are_recorded_then_applied() {
        let mut repo = MockQuestionRepo::new();
        repo.expect_record_upvote()
            .withf(|id| *id == AnswerId(4))
            .times(1)
            .returning(|_| Ok(true));
        repo.expect_mark_correct()
            .withf(|id| *id == AnswerId(4))
            .times(1)
            .returning(|_| Ok(true));

        let service = QaService::new(Box::new(repo));
        let mut answer = Answer::new("Use Rc", "bob").with_id(AnswerId(4));
        service.upvote(&mut answer).await.unwrap();
        service.mark_correct(&mut answer).await.unwrap();
        assert_eq!(answer.score(), 1);
        assert!(answer.is_correct());
    }

    #[tokio::test]
    async fn failed_vote_leaves_answer_unchanged() {
        let mut repo = MockQuestionRepo::new();
        repo.expect_record_upvote()
            .returning(|_| Err(anyhow::anyhow!("db down")));
        repo.expect_record_downvote().returning(|_| Ok(false));
        repo.expect_mark_correct()
            .returning(|_| Err(anyhow::anyhow!("db down")));

        let service = QaService::new(Box::new(repo));
        let mut answer = Answer::new("Use Rc", "bob").with_id(AnswerId(4));

        assert!(matches!(
            service.upvote(&mut answer).await,
            Err(AppError::Persistence(m)) if m == "db down"
        ));
        assert!(matches!(
            service.downvote(&mut answer).await,
            Err(AppError::NotFound(..))
        ));
        assert!(service.mark_correct(&mut answer).await.is_err());

        assert_eq!(answer.upvotes(), 0);
        assert_eq!(answer.downvotes(), 0);
        assert!(!answer.is_correct());
    }

    #[tokio::test]
    async fn voting_on_unsaved_answer_fails() {
        let repo = MockQuestionRepo::new();
        let service = QaService::new(Box::new(repo));
        let mut answer = Answer::new("draft", "bob");
        assert!(matches!(
            service.downvote(&mut answer).await,
            Err(AppError::Internal(_))
        ));
    }

    #[tokio::test]
    async fn board_ranks_answers() {
        let mut repo = MockQuestionRepo::new();
        repo.expect_load_all().returning(|| {
            let mut question = Question::new("Which collection?", "alice");
            let mut popular = Answer::new("Vec", "bob").with_id(AnswerId(1));
            popular.upvote();
            popular.upvote();
            let mut accepted = Answer::new("VecDeque", "carol").with_id(AnswerId(2));
            accepted.mark_as_correct();
            question.add_answer(popular);
            question.add_answer(accepted);
            Ok(vec![(QuestionId(1), question)])
        });

        let service = QaService::new(Box::new(repo));
        let board = service.board().await.unwrap();
        let texts: Vec<_> = board[0].1.answers.iter().map(Answer::text).collect();
        assert_eq!(texts, ["VecDeque", "Vec"]);
    }
}
