use crate::config::ConfigError;
use crate::identity::IdentityError;
use crate::market::MarketRentError;
use crate::scoring::{ProviderError, ScoreInputError};
use crate::submissions::{RepositoryError, SubmissionError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Scoring(ScoreInputError),
    Provider(ProviderError),
    Market(MarketRentError),
    Submission(SubmissionError),
    Identity(IdentityError),
    Batch(csv::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Scoring(_) | AppError::Batch(_) => StatusCode::BAD_REQUEST,
            AppError::Identity(IdentityError::Malformed(_)) => StatusCode::BAD_REQUEST,
            AppError::Provider(ProviderError::Invalid(_)) => StatusCode::BAD_REQUEST,
            AppError::Provider(ProviderError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
            AppError::Market(MarketRentError::EmptyZipCode) => StatusCode::BAD_REQUEST,
            AppError::Market(MarketRentError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Market(MarketRentError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Submission(SubmissionError::Invalid(_))
            | AppError::Submission(SubmissionError::MissingZipCode) => StatusCode::BAD_REQUEST,
            AppError::Submission(SubmissionError::Repository(RepositoryError::NotFound)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Submission(SubmissionError::Repository(RepositoryError::Conflict)) => {
                StatusCode::CONFLICT
            }
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Market(_)
            | AppError::Submission(_)
            | AppError::Identity(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Scoring(err) => write!(f, "{}", err),
            AppError::Provider(err) => write!(f, "{}", err),
            AppError::Market(err) => write!(f, "{}", err),
            AppError::Submission(err) => write!(f, "{}", err),
            AppError::Identity(err) => write!(f, "{}", err),
            AppError::Batch(err) => write!(f, "batch input error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Scoring(err) => Some(err),
            AppError::Provider(err) => Some(err),
            AppError::Market(err) => Some(err),
            AppError::Submission(err) => Some(err),
            AppError::Identity(err) => Some(err),
            AppError::Batch(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<ScoreInputError> for AppError {
    fn from(value: ScoreInputError) -> Self {
        Self::Scoring(value)
    }
}

impl From<ProviderError> for AppError {
    fn from(value: ProviderError) -> Self {
        Self::Provider(value)
    }
}

impl From<MarketRentError> for AppError {
    fn from(value: MarketRentError) -> Self {
        Self::Market(value)
    }
}

impl From<SubmissionError> for AppError {
    fn from(value: SubmissionError) -> Self {
        Self::Submission(value)
    }
}

impl From<IdentityError> for AppError {
    fn from(value: IdentityError) -> Self {
        Self::Identity(value)
    }
}

impl From<csv::Error> for AppError {
    fn from(value: csv::Error) -> Self {
        Self::Batch(value)
    }
}
