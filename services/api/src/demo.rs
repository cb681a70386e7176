use crate::infra::{load_market_lookup, InMemorySubmissionRepository};
use clap::Args;
use rentcheck::config::{AppConfig, MarketConfig};
use rentcheck::error::AppError;
use rentcheck::identity::{clear_user_id, resolve_user_id, AnonymousUserId, InMemoryUserIdStore};
use rentcheck::market::MarketRentError;
use rentcheck::persona::Persona;
use rentcheck::presentation::{format_score, presentation, ShareCard};
use rentcheck::scoring::batch::{score_csv, BatchRow};
use rentcheck::scoring::{
    compute_breakdown, FallbackScorer, HttpScorer, LocalScorer, ProviderError, RawScoreInput,
    ScoreInput, ScoreProvider, ScoreResult, ScoreSource,
};
use rentcheck::submissions::{Submission, SubmissionService};
use rentcheck::telemetry;
use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Monthly rent
    #[arg(long)]
    pub(crate) rent: f64,
    /// Monthly income
    #[arg(long)]
    pub(crate) income: f64,
    /// Typical monthly rent for comparable units
    #[arg(long, conflicts_with = "zip_code")]
    pub(crate) market_rent: Option<f64>,
    /// Look the market rent up by zip code instead of passing it directly
    #[arg(long)]
    pub(crate) zip_code: Option<String>,
    /// Market rent CSV (zip_code,region_code,market_rent). Defaults to APP_MARKET_RENT_CSV.
    #[arg(long)]
    pub(crate) market_csv: Option<PathBuf>,
    /// Unit quality rating, 0-10
    #[arg(long, allow_negative_numbers = true)]
    pub(crate) unit_quality: i64,
    /// Persona voice for the verdict copy. Defaults to APP_DEFAULT_PERSONA.
    #[arg(long)]
    pub(crate) persona: Option<String>,
    /// Remote scoring service base URL. Defaults to APP_SCORE_ENDPOINT.
    #[arg(long)]
    pub(crate) remote: Option<String>,
    /// Print how each term contributed to the score
    #[arg(long)]
    pub(crate) breakdown: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BatchArgs {
    /// CSV with rent,income,market_rent,unit_quality and an optional zip_code column
    #[arg(long)]
    pub(crate) csv: PathBuf,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Persona voice for the verdict copy
    #[arg(long)]
    pub(crate) persona: Option<String>,
    /// Forget the anonymous id once the walkthrough finishes
    #[arg(long)]
    pub(crate) forget: bool,
}

/// Quick-fill scenarios offered to testers, all in the same zip code.
#[derive(Debug, Clone, Copy)]
pub(crate) struct DemoPreset {
    pub(crate) name: &'static str,
    pub(crate) rent: f64,
    pub(crate) income: f64,
    pub(crate) market_rent: f64,
    pub(crate) unit_quality: i64,
    pub(crate) zip_code: &'static str,
}

pub(crate) const DEMO_PRESETS: [DemoPreset; 4] = [
    DemoPreset {
        name: "fair",
        rent: 1800.0,
        income: 6000.0,
        market_rent: 1900.0,
        unit_quality: 8,
        zip_code: "90210",
    },
    DemoPreset {
        name: "borderline",
        rent: 2200.0,
        income: 6000.0,
        market_rent: 2000.0,
        unit_quality: 6,
        zip_code: "90210",
    },
    DemoPreset {
        name: "overpriced",
        rent: 2800.0,
        income: 6000.0,
        market_rent: 2000.0,
        unit_quality: 5,
        zip_code: "90210",
    },
    DemoPreset {
        name: "predatory",
        rent: 3500.0,
        income: 6000.0,
        market_rent: 2000.0,
        unit_quality: 3,
        zip_code: "90210",
    },
];

impl DemoPreset {
    fn submission(&self, persona: Persona, user_id: AnonymousUserId) -> Submission {
        Submission {
            input: RawScoreInput::from(ScoreInput {
                rent: self.rent,
                income: self.income,
                market_rent: self.market_rent,
                unit_quality: self.unit_quality,
            }),
            zip_code: Some(self.zip_code.to_string()),
            persona: Some(persona.key().to_string()),
            user_id: Some(user_id),
        }
    }
}

fn resolve_persona(requested: Option<&str>, fallback: &str) -> Persona {
    Persona::from_key(requested.unwrap_or(fallback)).unwrap_or_default()
}

/// Remote-first when an endpoint is given, otherwise the in-process engine.
pub(crate) async fn score_once(
    raw: &RawScoreInput,
    endpoint: Option<&str>,
    timeout: Duration,
) -> Result<(ScoreResult, ScoreSource), ProviderError> {
    match endpoint {
        Some(url) => {
            let remote = HttpScorer::new(url, timeout)?;
            debug!(endpoint = remote.endpoint(), "scoring remotely first");
            let scorer = FallbackScorer::new(remote, LocalScorer);
            scorer.score_with_source(raw).await
        }
        None => Ok((LocalScorer.score(raw).await?, ScoreSource::Local)),
    }
}

pub(crate) async fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let ScoreArgs {
        rent,
        income,
        market_rent,
        zip_code,
        market_csv,
        unit_quality,
        persona,
        remote,
        breakdown,
    } = args;

    let market_rent = match (market_rent, zip_code) {
        (Some(value), _) => Some(value),
        (None, Some(zip_code)) => {
            let market = MarketConfig {
                rent_csv: market_csv.or(config.market.rent_csv.clone()),
            };
            let lookup = load_market_lookup(&market)?.ok_or(MarketRentError::NotConfigured)?;
            let estimate = lookup.market_rent_for(&zip_code)?;
            println!(
                "Market rent for {} ({}): ${:.0}",
                estimate.zip_code, estimate.region_code, estimate.market_rent
            );
            Some(estimate.market_rent)
        }
        (None, None) => None,
    };

    let raw = RawScoreInput {
        rent: Some(rent),
        income: Some(income),
        market_rent,
        unit_quality: Some(unit_quality),
    };
    let persona = resolve_persona(persona.as_deref(), &config.presentation.default_persona);
    let endpoint = remote.or(config.scoring.remote_endpoint.clone());

    let (result, source) = score_once(&raw, endpoint.as_deref(), config.scoring.timeout).await?;
    debug!(?source, score = result.score, "scored from command line");

    render_result(result, persona);

    if breakdown {
        let input = ScoreInput::try_from(raw)?;
        let breakdown = compute_breakdown(&input);
        println!("\nScore breakdown");
        for term in [
            &breakdown.income_ratio,
            &breakdown.market_comparison,
            &breakdown.quality,
        ] {
            let mark = if term.passed { "+" } else { "-" };
            println!("  [{}] {} ({})", mark, term.label, term.sublabel);
        }
        println!("  Raw total {} -> {}", breakdown.total, format_score(breakdown.result.score));
    }

    println!("\n{}", ShareCard::new(result, rent, income, persona).render_text());
    Ok(())
}

fn render_result(result: ScoreResult, persona: Persona) {
    let meta = presentation(result.verdict);
    let copy = persona.copy(result.verdict);
    println!("{} {} {}", meta.emoji, format_score(result.score), copy.label);
    println!("{}", meta.headline);
    println!("{}", copy.moment_of_truth);
    println!("{}", copy.support_line);
}

#[derive(Debug, Default, PartialEq, Eq)]
pub(crate) struct BatchSummary {
    pub(crate) scored: usize,
    pub(crate) rejected: usize,
}

pub(crate) fn summarize_batch(rows: &[BatchRow]) -> BatchSummary {
    rows.iter().fold(BatchSummary::default(), |mut summary, row| {
        if row.outcome.is_ok() {
            summary.scored += 1;
        } else {
            summary.rejected += 1;
        }
        summary
    })
}

pub(crate) fn run_batch(args: BatchArgs) -> Result<(), AppError> {
    let file = File::open(&args.csv)?;
    let rows = score_csv(file)?;

    println!("Scoring {}", args.csv.display());
    for row in &rows {
        let zip = row.zip_code.as_deref().unwrap_or("-");
        match &row.outcome {
            Ok(result) => println!(
                "  line {:>3} [{}] {} {}",
                row.line,
                zip,
                format_score(result.score),
                result.verdict
            ),
            Err(err) => println!("  line {:>3} [{}] rejected: {}", row.line, zip, err),
        }
    }

    let summary = summarize_batch(&rows);
    println!("{} scored | {} rejected", summary.scored, summary.rejected);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let persona = resolve_persona(args.persona.as_deref(), Persona::default().key());
    let profile = persona.profile();

    let store = InMemoryUserIdStore::default();
    let user_id = resolve_user_id(&store);
    let repository = Arc::new(InMemorySubmissionRepository::default());
    let service = SubmissionService::new(repository);

    println!("TruthBeTold demo");
    println!("Persona: {} {} ({})", profile.emoji, profile.name, profile.tagline);
    println!("Anonymous id: {}", user_id);

    for preset in &DEMO_PRESETS {
        let receipt = match service.submit(preset.submission(persona, user_id.clone())) {
            Ok(receipt) => receipt,
            Err(err) => {
                println!("\n[{}] submission rejected: {}", preset.name, err);
                continue;
            }
        };
        let result = receipt.score.result();
        println!(
            "\n[{}] rent ${:.0} | income ${:.0} | market ${:.0} | quality {}/10",
            preset.name, preset.rent, preset.income, preset.market_rent, preset.unit_quality
        );
        render_result(result, persona);
        println!("  Share: {}", persona.copy(result.verdict).share_text);
    }

    let history = service.history(&resolve_user_id(&store))?;
    println!("\n{} submissions recorded for this device", history.len());

    if args.forget {
        clear_user_id(&store)?;
        println!("Anonymous id cleared");
    }

    Ok(())
}
