//! Rent affordability scoring.
//!
//! Every caller (the HTTP endpoint, the CLI, and the remote/local fallback client)
//! funnels through [`compute`], so a given [`ScoreInput`] maps to exactly one
//! [`ScoreResult`] regardless of where it was evaluated.

pub mod batch;
mod breakdown;
pub mod provider;
mod rules;

pub use breakdown::{compute_breakdown, BreakdownTerm, ScoreBreakdown};
pub use provider::{
    FallbackScorer, HttpScorer, LocalScorer, ProviderError, ScoreProvider, ScoreSource,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Validated scoring input. Monetary fields are monthly amounts.
///
/// Range checks on `unit_quality` (0-10) and on monetary signs belong to the
/// input-collection layer; the engine scores whatever it is handed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreInput {
    pub rent: f64,
    pub income: f64,
    pub market_rent: f64,
    pub unit_quality: i64,
}

/// Scoring input as decoded from a request body, before required-field checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawScoreInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market_rent: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_quality: Option<i64>,
}

impl RawScoreInput {
    /// Decode a JSON request body. An empty body decodes to an input with every
    /// field missing; anything that is not a well-typed object is rejected.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, ScoreInputError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        serde_json::from_slice(body).map_err(|err| ScoreInputError::Malformed(err.to_string()))
    }

    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.rent.is_none() {
            missing.push("rent");
        }
        if self.income.is_none() {
            missing.push("income");
        }
        if self.market_rent.is_none() {
            missing.push("market_rent");
        }
        if self.unit_quality.is_none() {
            missing.push("unit_quality");
        }
        missing
    }
}

impl From<ScoreInput> for RawScoreInput {
    fn from(input: ScoreInput) -> Self {
        Self {
            rent: Some(input.rent),
            income: Some(input.income),
            market_rent: Some(input.market_rent),
            unit_quality: Some(input.unit_quality),
        }
    }
}

impl TryFrom<RawScoreInput> for ScoreInput {
    type Error = ScoreInputError;

    fn try_from(raw: RawScoreInput) -> Result<Self, Self::Error> {
        match (raw.rent, raw.income, raw.market_rent, raw.unit_quality) {
            (Some(rent), Some(income), Some(market_rent), Some(unit_quality)) => {
                let non_finite: Vec<&'static str> =
                    [("rent", rent), ("income", income), ("market_rent", market_rent)]
                        .into_iter()
                        .filter(|(_, value)| !value.is_finite())
                        .map(|(name, _)| name)
                        .collect();
                if !non_finite.is_empty() {
                    return Err(ScoreInputError::NonFinite(non_finite));
                }

                Ok(Self {
                    rent,
                    income,
                    market_rent,
                    unit_quality,
                })
            }
            _ => Err(ScoreInputError::MissingFields(raw.missing_fields())),
        }
    }
}

/// Reasons a scoring request is refused before any arithmetic happens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScoreInputError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    /// JSON cannot carry inf or NaN, so they are refused before any path scores them.
    #[error("non-finite values for: {}", .0.join(", "))]
    NonFinite(Vec<&'static str>),
    #[error("malformed score input: {0}")]
    Malformed(String),
    #[error("score input rejected: {0}")]
    Rejected(String),
}

/// Four-tier affordability verdict, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Verdict {
    Fair,
    Borderline,
    Overpriced,
    Predatory,
}

impl Verdict {
    pub const ALL: [Verdict; 4] = [
        Verdict::Fair,
        Verdict::Borderline,
        Verdict::Overpriced,
        Verdict::Predatory,
    ];

    /// Total mapping from a clamped score to its band:
    /// (75,100] Fair, (50,75] Borderline, (25,50] Overpriced, [0,25] Predatory.
    pub fn from_score(score: u8) -> Self {
        if score > 75 {
            Verdict::Fair
        } else if score > 50 {
            Verdict::Borderline
        } else if score > 25 {
            Verdict::Overpriced
        } else {
            Verdict::Predatory
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Verdict::Fair => "Fair",
            Verdict::Borderline => "Borderline",
            Verdict::Overpriced => "Overpriced",
            Verdict::Predatory => "Predatory",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Verdict::Fair => 0,
            Verdict::Borderline => 1,
            Verdict::Overpriced => 2,
            Verdict::Predatory => 3,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Clamped score with the verdict derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u8,
    pub verdict: Verdict,
}

impl ScoreResult {
    pub(crate) fn from_total(total: i64) -> Self {
        let score = rules::clamp_score(total);
        Self {
            score,
            verdict: Verdict::from_score(score),
        }
    }
}

/// Score a validated input: three additive terms, clamped to [0, 100].
pub fn compute(input: &ScoreInput) -> ScoreResult {
    ScoreResult::from_total(rules::score_terms(input).total())
}

/// Validate a decoded request and score it.
pub fn evaluate(raw: &RawScoreInput) -> Result<ScoreResult, ScoreInputError> {
    let input = ScoreInput::try_from(*raw)?;
    Ok(compute(&input))
}
