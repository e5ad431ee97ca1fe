//! End-to-end scenarios registered with the harness: validation rules plus a
//! round trip through the configured persistence plugin.

use std::rc::Rc;

use rq_core::harness::{assert_equals, assert_false, assert_true, TestHarness, TestResult};
use rq_core::models::{Answer, QuestionId};
use rq_core::validation::{validate_answer, validate_question};
use rq_core::{AppError, QaService};
use tokio::runtime::Runtime;

/// Shared by every scenario. Scenarios run one after another on the
/// calling thread, so `Rc` is enough.
#[derive(Clone)]
pub struct Env {
    pub runtime: Rc<Runtime>,
    pub service: Rc<QaService>,
}

pub fn register_all(harness: &mut TestHarness, env: &Env) {
    register_validation(harness);
    register_persistence(harness, env);
}

fn register_validation(harness: &mut TestHarness) {
    harness.add_test("question_too_short", || {
        let result = validate_question("..");
        if result.is_valid() {
            return TestResult::fail("question_too_short", "'..' was accepted");
        }
        assert_true(
            "question_too_short",
            result.message().contains("at least 5"),
            result.message(),
        )
    });

    harness.add_test("question_at_max_length", || {
        assert_true(
            "question_at_max_length",
            validate_question(&".".repeat(150)).is_valid(),
            "150 characters is accepted",
        )
    });

    harness.add_test("question_over_max_length", || {
        let result = validate_question(&".".repeat(151));
        if result.is_valid() {
            return TestResult::fail("question_over_max_length", "151 characters was accepted");
        }
        assert_true(
            "question_over_max_length",
            result.message().contains("150"),
            result.message(),
        )
    });

    harness.add_test("drop_table_any_case", || {
        assert_false(
            "drop_table_any_case",
            validate_question("Can I DrOp TaBlE students?").is_valid(),
            "mixed-case DROP TABLE is rejected",
        )
    });

    harness.add_test("empty_answer", || {
        assert_equals(
            "empty_answer",
            Some("Answer cannot be empty"),
            Some(validate_answer("   ").message()),
            "whitespace-only answer is rejected",
        )
    });

    harness.add_test("equals_on_absent_values", || {
        assert_equals::<&str>(
            "equals_on_absent_values",
            None,
            None,
            "two absent values compare equal",
        )
    });
}

fn register_persistence(harness: &mut TestHarness, env: &Env) {
    let e = env.clone();
    harness.add_test("save_valid_question", move || {
        match e.runtime.block_on(e.service.ask("student-1", "What does `?` do?")) {
            Ok(id) => assert_true("save_valid_question", id.0 > 0, "saved with a positive id"),
            Err(err) => TestResult::fail("save_valid_question", err.to_string()),
        }
    });

    let e = env.clone();
    harness.add_test("reject_invalid_before_save", move || reject_invalid_before_save(&e));

    let e = env.clone();
    harness.add_test("answers_ranked_on_reload", move || {
        match e.runtime.block_on(ranked_round_trip(&e.service)) {
            Ok(order) => assert_equals(
                "answers_ranked_on_reload",
                Some(vec!["accepted", "popular", "plain"]),
                Some(order.iter().map(String::as_str).collect()),
                "correct first, then by score",
            ),
            Err(err) => TestResult::fail("answers_ranked_on_reload", err.to_string()),
        }
    });

    let e = env.clone();
    harness.add_test("update_question", move || {
        let result = e.runtime.block_on(async {
            let id = e.service.ask("student-2", "Original wording here").await?;
            e.service.edit_question(id, "  Clearer wording here ").await?;
            let board = e.service.board().await?;
            Ok::<_, AppError>(
                board
                    .into_iter()
                    .find(|(qid, _)| *qid == id)
                    .map(|(_, q)| q.body),
            )
        });
        match result {
            Ok(body) => assert_equals(
                "update_question",
                Some("Clearer wording here".to_string()),
                body,
                "body is replaced with the trimmed text",
            ),
            Err(err) => TestResult::fail("update_question", err.to_string()),
        }
    });

    let e = env.clone();
    harness.add_test("delete_question", move || {
        let result = e.runtime.block_on(async {
            let id = e.service.ask("student-3", "Soon to be removed").await?;
            e.service.answer(id, "student-4", "Goes with it").await?;
            e.service.remove_question(id).await?;
            let board = e.service.board().await?;
            Ok::<_, AppError>(board.iter().any(|(qid, _)| *qid == id))
        });
        match result {
            Ok(still_there) => assert_false(
                "delete_question",
                still_there,
                "deleted question is gone from the board",
            ),
            Err(err) => TestResult::fail("delete_question", err.to_string()),
        }
    });

    let e = env.clone();
    harness.add_test("answer_missing_question", move || {
        let outcome = e
            .runtime
            .block_on(e.service.answer(QuestionId(i64::MAX), "student-5", "Nobody asked"));
        assert_true(
            "answer_missing_question",
            matches!(outcome, Err(AppError::NotFound(..))),
            "answering an unknown question reports not found",
        )
    });
}

fn reject_invalid_before_save(e: &Env) -> TestResult {
    const NAME: &str = "reject_invalid_before_save";
    let before = match board_len(e) {
        Ok(len) => len,
        Err(err) => return TestResult::fail(NAME, err.to_string()),
    };
    let outcome = e.runtime.block_on(e.service.ask("student-1", "hi"));
    let rejected = matches!(outcome, Err(AppError::ValidationError(_)));
    match board_len(e) {
        Ok(after) => assert_true(
            NAME,
            rejected && after == before,
            "short question is rejected and nothing is stored",
        ),
        Err(err) => TestResult::fail(NAME, err.to_string()),
    }
}

fn board_len(env: &Env) -> rq_core::Result<usize> {
    env.runtime
        .block_on(env.service.board())
        .map(|b| b.len())
}

/// Posts three answers, votes on them, reloads and returns the answer texts
/// in display order.
async fn ranked_round_trip(service: &QaService) -> rq_core::Result<Vec<String>> {
    let qid = service.ask("student-6", "Which answer wins?").await?;
    for text in ["plain", "popular", "accepted"] {
        service.answer(qid, "peer", text).await?;
    }

    let mut answers = answers_of(service, qid).await?;
    for answer in answers.iter_mut() {
        let text = answer.text().to_string();
        match text.as_str() {
            "popular" => {
                service.upvote(answer).await?;
                service.upvote(answer).await?;
            }
            "accepted" => {
                service.downvote(answer).await?;
                service.mark_correct(answer).await?;
            }
            _ => {}
        }
    }

    Ok(answers_of(service, qid)
        .await?
        .iter()
        .map(|a| a.text().to_string())
        .collect())
}

async fn answers_of(service: &QaService, qid: QuestionId) -> rq_core::Result<Vec<Answer>> {
    service
        .board()
        .await?
        .into_iter()
        .find(|(id, _)| *id == qid)
        .map(|(_, q)| q.answers)
        .ok_or_else(|| AppError::not_found("Question", qid))
}
