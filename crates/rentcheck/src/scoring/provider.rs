//! Remote-first scoring with a local fallback.
//!
//! The remote endpoint and [`LocalScorer`] share [`super::compute`], so callers may
//! switch between them without the end user noticing which path produced a result.

use super::{evaluate, RawScoreInput, ScoreInput, ScoreInputError, ScoreResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Path that produced a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreSource {
    Remote,
    Local,
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Invalid(#[from] ScoreInputError),
    #[error("remote scorer unavailable: {0}")]
    Unavailable(String),
}

/// Anything able to turn a decoded request into a score.
#[async_trait]
pub trait ScoreProvider: Send + Sync {
    async fn score(&self, input: &RawScoreInput) -> Result<ScoreResult, ProviderError>;
}

/// In-process scorer backed directly by the engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalScorer;

#[async_trait]
impl ScoreProvider for LocalScorer {
    async fn score(&self, input: &RawScoreInput) -> Result<ScoreResult, ProviderError> {
        Ok(evaluate(input)?)
    }
}

/// Client for the `POST /api/v1/score` endpoint.
#[derive(Debug, Clone)]
pub struct HttpScorer {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpScorer {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ProviderError::Unavailable(err.to_string()))?;

        Ok(Self {
            client,
            endpoint: format!("{}/api/v1/score", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ScoreProvider for HttpScorer {
    async fn score(&self, input: &RawScoreInput) -> Result<ScoreResult, ProviderError> {
        // Refuse locally what the wire cannot express, with the same error the engine gives.
        let input = ScoreInput::try_from(*input)?;
        let response = self
            .client
            .post(&self.endpoint)
            .json(&input)
            .send()
            .await
            .map_err(|err| ProviderError::Unavailable(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<ScoreResult>()
                .await
                .map_err(|err| ProviderError::Unavailable(err.to_string()));
        }

        if status.is_client_error() {
            let body = response
                .json::<ErrorBody>()
                .await
                .map_err(|err| ProviderError::Unavailable(err.to_string()))?;
            return Err(ScoreInputError::Rejected(body.error).into());
        }

        Err(ProviderError::Unavailable(format!(
            "remote scorer returned {status}"
        )))
    }
}

/// Tries `remote` first and substitutes `local` when the remote path is down.
///
/// Validation failures are returned as-is: the local engine would refuse the
/// same input.
#[derive(Debug, Clone)]
pub struct FallbackScorer<R, L = LocalScorer> {
    remote: R,
    local: L,
}

impl<R, L> FallbackScorer<R, L>
where
    R: ScoreProvider,
    L: ScoreProvider,
{
    pub fn new(remote: R, local: L) -> Self {
        Self { remote, local }
    }

    pub async fn score_with_source(
        &self,
        input: &RawScoreInput,
    ) -> Result<(ScoreResult, ScoreSource), ProviderError> {
        match self.remote.score(input).await {
            Ok(result) => {
                debug!(score = result.score, "remote scorer answered");
                Ok((result, ScoreSource::Remote))
            }
            Err(ProviderError::Unavailable(reason)) => {
                warn!(%reason, "remote scorer unavailable, scoring locally");
                let result = self.local.score(input).await?;
                Ok((result, ScoreSource::Local))
            }
            Err(err) => Err(err),
        }
    }
}

#[async_trait]
impl<R, L> ScoreProvider for FallbackScorer<R, L>
where
    R: ScoreProvider,
    L: ScoreProvider,
{
    async fn score(&self, input: &RawScoreInput) -> Result<ScoreResult, ProviderError> {
        self.score_with_source(input)
            .await
            .map(|(result, _)| result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::Verdict;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct DownRemote {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ScoreProvider for DownRemote {
        async fn score(&self, _input: &RawScoreInput) -> Result<ScoreResult, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::Unavailable("connection refused".to_string()))
        }
    }

    struct RejectingRemote;

    #[async_trait]
    impl ScoreProvider for RejectingRemote {
        async fn score(&self, _input: &RawScoreInput) -> Result<ScoreResult, ProviderError> {
            Err(ScoreInputError::Rejected("missing required fields: rent".to_string()).into())
        }
    }

    fn sample() -> RawScoreInput {
        ScoreInput {
            rent: 1800.0,
            income: 6000.0,
            market_rent: 1900.0,
            unit_quality: 6,
        }
        .into()
    }

    #[tokio::test]
    async fn falls_back_to_local_when_remote_is_down() {
        let scorer = FallbackScorer::new(
            DownRemote {
                calls: AtomicUsize::new(0),
            },
            LocalScorer,
        );

        let (result, source) = scorer
            .score_with_source(&sample())
            .await
            .expect("local fallback scores");

        assert_eq!(source, ScoreSource::Local);
        assert_eq!(result.score, 80);
        assert_eq!(result.verdict, Verdict::Fair);
        assert_eq!(scorer.remote.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn validation_errors_are_not_retried_locally() {
        let scorer = FallbackScorer::new(RejectingRemote, LocalScorer);

        let err = scorer.score(&sample()).await.expect_err("rejection surfaces");
        assert!(matches!(
            err,
            ProviderError::Invalid(ScoreInputError::Rejected(_))
        ));
    }

    #[tokio::test]
    async fn local_scorer_refuses_missing_fields() {
        let err = LocalScorer
            .score(&RawScoreInput::default())
            .await
            .expect_err("missing fields");
        assert!(matches!(
            err,
            ProviderError::Invalid(ScoreInputError::MissingFields(ref fields)) if fields.len() == 4
        ));
    }

    #[test]
    fn endpoint_normalizes_trailing_slash() {
        let scorer =
            HttpScorer::new("http://127.0.0.1:3000/", Duration::from_secs(1)).expect("client");
        assert_eq!(scorer.endpoint(), "http://127.0.0.1:3000/api/v1/score");
    }

    #[tokio::test]
    async fn http_scorer_refuses_non_finite_input_before_sending() {
        // Nothing listens on port 9; a request would surface as Unavailable.
        let scorer = FallbackScorer::new(
            HttpScorer::new("http://127.0.0.1:9", Duration::from_secs(1)).expect("client"),
            LocalScorer,
        );
        let raw: RawScoreInput = ScoreInput {
            rent: 1500.0,
            income: f64::INFINITY,
            market_rent: 1600.0,
            unit_quality: 8,
        }
        .into();

        let remote = scorer.score_with_source(&raw).await.expect_err("refused");
        let local = LocalScorer.score(&raw).await.expect_err("refused");
        assert!(matches!(
            remote,
            ProviderError::Invalid(ScoreInputError::NonFinite(ref fields)) if fields == &vec!["income"]
        ));
        assert_eq!(remote.to_string(), local.to_string());
    }
}
