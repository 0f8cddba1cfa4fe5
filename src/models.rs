// models.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Every poll is created with at least this many options.
pub const MIN_OPTIONS: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollOption {
    pub id: i64,
    pub text: String,
    pub votes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Poll {
    pub id: i64,
    pub question: String,
    pub created_at: DateTime<Utc>,
    pub options: Vec<PollOption>,
}

impl Poll {
    pub fn total_votes(&self) -> i64 {
        self.options.iter().map(|o| o.votes).sum()
    }

    /// Tally the poll into per-option percentages, rounded to the nearest
    /// whole percent. A poll without votes reports 0% everywhere.
    pub fn results(&self) -> PollResults {
        let total = self.total_votes();
        let options = self
            .options
            .iter()
            .map(|o| OptionResult {
                id: o.id,
                text: o.text.clone(),
                votes: o.votes,
                percent: percent_of(o.votes, total),
            })
            .collect();

        PollResults {
            poll_id: self.id,
            question: self.question.clone(),
            total_votes: total,
            options,
        }
    }
}

fn percent_of(votes: i64, total: i64) -> u32 {
    if total <= 0 {
        return 0;
    }
    ((votes as f64 / total as f64) * 100.0).round() as u32
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionResult {
    pub id: i64,
    pub text: String,
    pub votes: i64,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PollResults {
    pub poll_id: i64,
    pub question: String,
    pub total_votes: i64,
    pub options: Vec<OptionResult>,
}

/// Input rejected before any storage access.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("a poll needs at least {min} options, got {got}")]
    TooFewOptions { min: usize, got: usize },

    #[error("{field}: {reason}")]
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Deserialize)]
pub struct CreatePollRequest {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl CreatePollRequest {
    /// Trim the question and options, dropping blank options.
    pub fn normalize(self) -> Result<(String, Vec<String>), ValidationError> {
        let question = self
            .question
            .ok_or(ValidationError::Missing { field: "question" })?
            .trim()
            .to_string();
        if question.is_empty() {
            return Err(ValidationError::Empty { field: "question" });
        }

        let options: Vec<String> = self
            .options
            .ok_or(ValidationError::Missing { field: "options" })?
            .iter()
            .map(|o| o.trim())
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
        if options.len() < MIN_OPTIONS {
            return Err(ValidationError::TooFewOptions {
                min: MIN_OPTIONS,
                got: options.len(),
            });
        }

        Ok((question, options))
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedPoll {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    #[serde(rename = "optionId", default)]
    pub option_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}
