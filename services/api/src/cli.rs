use crate::demo::{run_batch, run_demo, run_score, BatchArgs, DemoArgs, ScoreArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use rentcheck::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "TruthBeTold",
    about = "Score how fair a monthly rent is and serve the scoring API",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a single rent from the command line
    Score(ScoreArgs),
    /// Score every row of a CSV file
    Batch(BatchArgs),
    /// Walk through the preset scenarios with persona copy
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args).await,
        Command::Batch(args) => run_batch(args),
        Command::Demo(args) => run_demo(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["truthbetold"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn score_requires_rent_income_and_quality() {
        assert!(Cli::try_parse_from(["truthbetold", "score", "--rent", "1500"]).is_err());

        let cli = Cli::try_parse_from([
            "truthbetold",
            "score",
            "--rent",
            "1500",
            "--income",
            "5000",
            "--market-rent",
            "1600",
            "--unit-quality",
            "8",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Score(args)) => {
                assert_eq!(args.market_rent, Some(1600.0));
                assert_eq!(args.unit_quality, 8);
                assert!(!args.breakdown);
            }
            other => panic!("expected score command, got {other:?}"),
        }
    }

    #[test]
    fn market_rent_and_zip_code_are_exclusive() {
        let result = Cli::try_parse_from([
            "truthbetold",
            "score",
            "--rent",
            "1500",
            "--income",
            "5000",
            "--market-rent",
            "1600",
            "--zip-code",
            "90210",
            "--unit-quality",
            "8",
        ]);
        assert!(result.is_err());
    }
}
