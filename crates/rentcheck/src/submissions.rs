//! Persisted rent inputs and the scores computed from them.

use crate::identity::{uuid_v4, AnonymousUserId};
use crate::persona::Persona;
use crate::scoring::{self, RawScoreInput, ScoreInput, ScoreInputError, ScoreResult, Verdict};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn generate() -> Self {
        Self(uuid_v4())
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored copy of what the user entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentInputRecord {
    pub id: RecordId,
    pub rent: f64,
    pub income: f64,
    pub market_rent: f64,
    pub unit_quality: i64,
    pub zip_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<AnonymousUserId>,
    pub created_at: DateTime<Utc>,
}

/// Stored score, linked to the input it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: RecordId,
    pub rent_input_id: RecordId,
    pub score: u8,
    pub verdict: Verdict,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persona: Option<Persona>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<AnonymousUserId>,
    pub created_at: DateTime<Utc>,
}

impl ScoreRecord {
    pub fn result(&self) -> ScoreResult {
        ScoreResult {
            score: self.score,
            verdict: self.verdict,
        }
    }
}

/// Request to score and store one rent input.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Submission {
    #[serde(flatten)]
    pub input: RawScoreInput,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub persona: Option<String>,
    #[serde(default)]
    pub user_id: Option<AnonymousUserId>,
}

impl Submission {
    /// Decode a request body; an empty body is an empty submission.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, ScoreInputError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(body).map_err(|err| ScoreInputError::Malformed(err.to_string()))
    }
}

/// Both records written for a submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReceipt {
    pub input: RentInputRecord,
    pub score: ScoreRecord,
}

pub trait SubmissionRepository: Send + Sync {
    fn insert_input(&self, record: RentInputRecord) -> Result<RentInputRecord, RepositoryError>;
    fn insert_score(&self, record: ScoreRecord) -> Result<ScoreRecord, RepositoryError>;
    fn fetch_score(&self, id: &RecordId) -> Result<Option<ScoreRecord>, RepositoryError>;
    fn fetch_input(&self, id: &RecordId) -> Result<Option<RentInputRecord>, RepositoryError>;
    fn scores_for_user(&self, user_id: &AnonymousUserId)
        -> Result<Vec<ScoreRecord>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("rent input {0} does not exist")]
    DanglingInput(RecordId),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Invalid(#[from] ScoreInputError),
    #[error("zip code is required")]
    MissingZipCode,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Scores submissions and records both the input and the result.
pub struct SubmissionService<R> {
    repository: Arc<R>,
}

impl<R> SubmissionService<R>
where
    R: SubmissionRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn submit(&self, submission: Submission) -> Result<SubmissionReceipt, SubmissionError> {
        let Submission {
            input,
            zip_code,
            persona,
            user_id,
        } = submission;

        let input = ScoreInput::try_from(input)?;
        let zip_code = zip_code
            .map(|zip| zip.trim().to_string())
            .filter(|zip| !zip.is_empty())
            .ok_or(SubmissionError::MissingZipCode)?;
        let persona = persona.as_deref().and_then(Persona::from_key);

        let result = scoring::compute(&input);
        let now = Utc::now();

        let stored_input = self.repository.insert_input(RentInputRecord {
            id: RecordId::generate(),
            rent: input.rent,
            income: input.income,
            market_rent: input.market_rent,
            unit_quality: input.unit_quality,
            zip_code,
            user_id: user_id.clone(),
            created_at: now,
        })?;

        let stored_score = self.repository.insert_score(ScoreRecord {
            id: RecordId::generate(),
            rent_input_id: stored_input.id.clone(),
            score: result.score,
            verdict: result.verdict,
            persona,
            user_id,
            created_at: now,
        })?;

        info!(
            score_id = %stored_score.id,
            score = stored_score.score,
            verdict = %stored_score.verdict,
            "submission recorded"
        );

        Ok(SubmissionReceipt {
            input: stored_input,
            score: stored_score,
        })
    }

    pub fn get(&self, score_id: &RecordId) -> Result<SubmissionReceipt, SubmissionError> {
        let score = self
            .repository
            .fetch_score(score_id)?
            .ok_or(RepositoryError::NotFound)?;
        let input = self
            .repository
            .fetch_input(&score.rent_input_id)?
            .ok_or_else(|| RepositoryError::DanglingInput(score.rent_input_id.clone()))?;
        Ok(SubmissionReceipt { input, score })
    }

    pub fn history(&self, user_id: &AnonymousUserId) -> Result<Vec<ScoreRecord>, SubmissionError> {
        let mut scores = self.repository.scores_for_user(user_id)?;
        scores.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(scores)
    }
}
