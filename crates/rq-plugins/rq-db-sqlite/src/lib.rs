//! # rq-db-sqlite Implementation
//!
//! This module implements the data mapping between the SQLite relational model
//! and the `rq-core` domain models. Every value is bound as a query parameter;
//! the core's pattern filter is advisory and never relied upon here.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use rq_core::models::{Answer, AnswerId, Question, QuestionId};
use rq_core::traits::QuestionRepo;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS questions (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        body        TEXT NOT NULL,
        asked_by    TEXT NOT NULL,
        created_at  TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS answers (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        question_id INTEGER NOT NULL REFERENCES questions(id) ON DELETE CASCADE,
        text        TEXT NOT NULL,
        answered_by TEXT NOT NULL,
        upvotes     INTEGER NOT NULL DEFAULT 0 CHECK (upvotes >= 0),
        downvotes   INTEGER NOT NULL DEFAULT 0 CHECK (downvotes >= 0),
        is_correct  BOOLEAN NOT NULL DEFAULT 0,
        created_at  TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS answers_by_question ON answers (question_id)",
];

pub struct SqliteQuestionRepo {
    pool: SqlitePool,
}

impl SqliteQuestionRepo {
    /// Connects to `url` (e.g. `sqlite:rusty_qa.db` or `sqlite::memory:`)
    /// and creates the tables if they are missing.
    ///
    /// An in-memory database lives only as long as its connection, so the
    /// pool is pinned to a single connection that never expires.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("invalid database url {url}"))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool_options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options.connect_with(options).await?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }
        debug!("sqlite repo ready at {url}");
        Ok(Self { pool })
    }
}

impl SqliteQuestionRepo {
    /// Runs a single-answer update. Vote and correctness statements only
    /// ever increment or set, so a stale caller can never roll state back.
    async fn touch_answer(&self, statement: &str, id: AnswerId) -> anyhow::Result<bool> {
        let updated = sqlx::query(statement)
            .bind(id.0)
            .execute(&self.pool)
            .await?
            .rows_affected();
        debug!("answer {id}: {updated} row(s) updated");
        Ok(updated > 0)
    }
}

fn row_to_answer(row: &SqliteRow) -> anyhow::Result<Answer> {
    let upvotes: i64 = row.try_get("upvotes")?;
    let downvotes: i64 = row.try_get("downvotes")?;
    Ok(Answer::restore(
        AnswerId(row.try_get("id")?),
        row.try_get("text")?,
        row.try_get("answered_by")?,
        u32::try_from(upvotes).context("upvotes out of range")?,
        u32::try_from(downvotes).context("downvotes out of range")?,
        row.try_get("is_correct")?,
        row.try_get::<DateTime<Utc>, _>("created_at")?,
    ))
}

#[async_trait]
impl QuestionRepo for SqliteQuestionRepo {
    async fn save_question(&self, question: &Question) -> anyhow::Result<QuestionId> {
        let result =
            sqlx::query("INSERT INTO questions (body, asked_by, created_at) VALUES (?, ?, ?)")
                .bind(&question.body)
                .bind(&question.asked_by)
                .bind(question.created_at)
                .execute(&self.pool)
                .await?;
        Ok(QuestionId(result.last_insert_rowid()))
    }

    /// Answers are removed in the same transaction so a failed delete never
    /// leaves orphans behind, even on a connection without foreign keys.
    async fn delete_question(&self, id: QuestionId) -> anyhow::Result<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM answers WHERE question_id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(id.0)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn save_answer(
        &self,
        question_id: QuestionId,
        answer: &Answer,
    ) -> anyhow::Result<Option<AnswerId>> {
        let result = sqlx::query(
            "INSERT INTO answers (question_id, text, answered_by, upvotes, downvotes, is_correct, created_at)
             SELECT ?, ?, ?, ?, ?, ?, ? WHERE EXISTS (SELECT 1 FROM questions WHERE id = ?)",
        )
        .bind(question_id.0)
        .bind(answer.text())
        .bind(answer.answered_by())
        .bind(i64::from(answer.upvotes()))
        .bind(i64::from(answer.downvotes()))
        .bind(answer.is_correct())
        .bind(answer.created_at())
        .bind(question_id.0)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(AnswerId(result.last_insert_rowid())))
    }

    async fn update_question(&self, id: QuestionId, body: &str) -> anyhow::Result<bool> {
        let updated = sqlx::query("UPDATE questions SET body = ? WHERE id = ?")
            .bind(body)
            .bind(id.0)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(updated > 0)
    }

    async fn record_upvote(&self, id: AnswerId) -> anyhow::Result<bool> {
        self.touch_answer("UPDATE answers SET upvotes = upvotes + 1 WHERE id = ?", id)
            .await
    }

    async fn record_downvote(&self, id: AnswerId) -> anyhow::Result<bool> {
        self.touch_answer("UPDATE answers SET downvotes = downvotes + 1 WHERE id = ?", id)
            .await
    }

    async fn mark_correct(&self, id: AnswerId) -> anyhow::Result<bool> {
        self.touch_answer("UPDATE answers SET is_correct = 1 WHERE id = ?", id)
            .await
    }

    async fn load_all(&self) -> anyhow::Result<Vec<(QuestionId, Question)>> {
        let question_rows =
            sqlx::query("SELECT id, body, asked_by, created_at FROM questions ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await?;

        let mut questions = Vec::with_capacity(question_rows.len());
        let mut position = HashMap::with_capacity(question_rows.len());
        for row in question_rows {
            let id = QuestionId(row.try_get("id")?);
            position.insert(id, questions.len());
            questions.push((
                id,
                Question {
                    body: row.try_get("body")?,
                    asked_by: row.try_get("asked_by")?,
                    answers: Vec::new(),
                    created_at: row.try_get("created_at")?,
                },
            ));
        }

        let answer_rows = sqlx::query(
            "SELECT id, question_id, text, answered_by, upvotes, downvotes, is_correct, created_at
             FROM answers ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        for row in answer_rows {
            let parent = QuestionId(row.try_get("question_id")?);
            if let Some(&idx) = position.get(&parent) {
                questions[idx].1.add_answer(row_to_answer(&row)?);
            }
        }

        Ok(questions)
    }
}
