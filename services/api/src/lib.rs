mod cli;
mod demo;
mod infra;
mod routes;
mod server;

pub use infra::{AppState, CsvMarketLookup, InMemorySubmissionRepository};
pub use routes::router;

use rentcheck::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
