// src/poll.rs
//! Poll repository: the only code that touches the `polls` and `options`
//! tables.
//!
//! - create: one transaction for the poll row and all option rows
//! - get/list: a single JOIN query, no per-poll option lookups
//! - vote: conditional `votes = votes + 1`, checked by rows affected
//! - delete: one statement, options go with it through the FK cascade

use chrono::{DateTime, Utc};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::models::{Poll, PollOption, ValidationError, MIN_OPTIONS};

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("poll {0} not found")]
    NotFound(i64),

    #[error("option {option_id} is not part of poll {poll_id}")]
    InvalidVote { poll_id: i64, option_id: i64 },

    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// One option row joined with its poll.
#[derive(Debug, FromRow)]
struct PollRow {
    poll_id: i64,
    question: String,
    created_at: DateTime<Utc>,
    option_id: i64,
    text: String,
    votes: i64,
}

const SELECT_POLLS: &str = r#"
    SELECT p.id AS poll_id, p.question, p.created_at,
           o.id AS option_id, o.text, o.votes
    FROM polls p
    JOIN options o ON o.poll_id = p.id
"#;

#[derive(Clone)]
pub struct PollRepo {
    pool: SqlitePool,
}

impl PollRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a poll together with its options, all starting at zero votes.
    ///
    /// Options are expected to be trimmed by the caller; only their count
    /// and non-emptiness are checked here.
    pub async fn create_poll(&self, question: &str, options: &[String]) -> Result<i64, PollError> {
        if question.trim().is_empty() {
            return Err(ValidationError::Empty { field: "question" }.into());
        }
        if options.len() < MIN_OPTIONS {
            return Err(ValidationError::TooFewOptions {
                min: MIN_OPTIONS,
                got: options.len(),
            }
            .into());
        }
        if options.iter().any(|o| o.is_empty()) {
            return Err(ValidationError::Empty { field: "option text" }.into());
        }

        // Dropping `tx` on any early return rolls everything back.
        let mut tx = self.pool.begin().await?;

        let poll_id = sqlx::query("INSERT INTO polls (question, created_at) VALUES (?, ?)")
            .bind(question)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        for text in options {
            sqlx::query("INSERT INTO options (poll_id, text, votes) VALUES (?, ?, 0)")
                .bind(poll_id)
                .bind(text)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        info!(poll_id, options = options.len(), "poll created");

        Ok(poll_id)
    }

    pub async fn get_poll(&self, id: i64) -> Result<Poll, PollError> {
        fetch_poll(&self.pool, id).await
    }

    /// All polls, newest first, each with its options in insertion order.
    pub async fn list_polls(&self) -> Result<Vec<Poll>, PollError> {
        let query = format!("{SELECT_POLLS} ORDER BY p.created_at DESC, p.id DESC, o.id ASC");
        let rows: Vec<PollRow> = sqlx::query_as(&query).fetch_all(&self.pool).await?;
        Ok(assemble(rows))
    }

    /// Record one vote and return the poll as it stands after the vote.
    ///
    /// The increment happens in SQL, so concurrent votes on the same option
    /// are serialised by the database and none are lost.
    pub async fn vote(&self, poll_id: i64, option_id: i64) -> Result<Poll, PollError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE options SET votes = votes + 1 WHERE id = ? AND poll_id = ?")
            .bind(option_id)
            .bind(poll_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if updated != 1 {
            debug!(poll_id, option_id, updated, "vote rejected");
            return Err(PollError::InvalidVote { poll_id, option_id });
        }

        let poll = fetch_poll(&mut *tx, poll_id).await?;
        tx.commit().await?;
        debug!(poll_id, option_id, "vote recorded");

        Ok(poll)
    }

    pub async fn delete_poll(&self, id: i64) -> Result<(), PollError> {
        let deleted = sqlx::query("DELETE FROM polls WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(PollError::NotFound(id));
        }

        info!(poll_id = id, "poll deleted");
        Ok(())
    }
}

async fn fetch_poll<'e, E>(executor: E, id: i64) -> Result<Poll, PollError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let query = format!("{SELECT_POLLS} WHERE p.id = ? ORDER BY o.id ASC");
    let rows: Vec<PollRow> = sqlx::query_as(&query).bind(id).fetch_all(executor).await?;
    assemble(rows).pop().ok_or(PollError::NotFound(id))
}

/// Fold joined rows into polls. Rows must arrive grouped by poll.
fn assemble(rows: Vec<PollRow>) -> Vec<Poll> {
    let mut polls: Vec<Poll> = Vec::new();

    for row in rows {
        let option = PollOption {
            id: row.option_id,
            text: row.text,
            votes: row.votes,
        };

        match polls.last_mut() {
            Some(poll) if poll.id == row.poll_id => poll.options.push(option),
            _ => polls.push(Poll {
                id: row.poll_id,
                question: row.question,
                created_at: row.created_at,
                options: vec![option],
            }),
        }
    }

    polls
}
