use super::rules::{self, RENT_TO_INCOME_LIMIT};
use super::{ScoreInput, ScoreResult};
use serde::{Deserialize, Serialize};

/// One scoring term with the copy shown next to it on the verdict screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownTerm {
    /// Percentage (or raw rating for the quality term); `None` when the
    /// denominator is not positive.
    pub value: Option<f64>,
    pub points: i64,
    pub label: String,
    pub sublabel: String,
    pub passed: bool,
}

/// Per-term explanation of a score, built from the same rules as [`super::compute`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub income_ratio: BreakdownTerm,
    pub market_comparison: BreakdownTerm,
    pub quality: BreakdownTerm,
    /// Sum of the three terms before clamping.
    pub total: i64,
    pub result: ScoreResult,
}

pub fn compute_breakdown(input: &ScoreInput) -> ScoreBreakdown {
    let terms = rules::score_terms(input);

    let rent_to_income_pct = percentage(input.rent, input.income, |rent, income| {
        rent / income * 100.0
    });
    let market_delta_pct = percentage(input.rent, input.market_rent, |rent, market| {
        (rent / market - 1.0) * 100.0
    });

    let income_ratio = BreakdownTerm {
        value: rent_to_income_pct,
        points: terms.income_ratio,
        label: format!(
            "Rent is {}% of income (should be < {:.0}%)",
            display_pct(rent_to_income_pct),
            RENT_TO_INCOME_LIMIT * 100.0
        ),
        sublabel: if terms.income_ratio > 0 {
            "Good! Under 35% threshold".to_string()
        } else {
            "Too high! Over 35% threshold".to_string()
        },
        passed: terms.income_ratio > 0,
    };

    let market_label = match market_delta_pct {
        Some(pct) if pct >= 0.0 => format!("Rent is {pct:.1}% above market rate"),
        Some(pct) => format!("Rent is {:.1}% below market rate", pct.abs()),
        None => "Rent vs market rate: N/A".to_string(),
    };
    let market_comparison = BreakdownTerm {
        value: market_delta_pct,
        points: terms.market_comparison,
        label: market_label,
        sublabel: if terms.market_comparison > 0 {
            "Fair pricing".to_string()
        } else {
            "Overpriced vs market".to_string()
        },
        passed: terms.market_comparison > 0,
    };

    let quality = BreakdownTerm {
        value: Some(input.unit_quality as f64),
        points: terms.quality,
        label: format!("Unit quality: {}/10", input.unit_quality),
        sublabel: format!("{:+} points", terms.quality),
        passed: true,
    };

    let total = terms.total();

    ScoreBreakdown {
        income_ratio,
        market_comparison,
        quality,
        total,
        result: ScoreResult::from_total(total),
    }
}

fn percentage(numerator: f64, denominator: f64, ratio: impl Fn(f64, f64) -> f64) -> Option<f64> {
    if denominator > 0.0 {
        Some(round_one_decimal(ratio(numerator, denominator)))
    } else {
        None
    }
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn display_pct(value: Option<f64>) -> String {
    match value {
        Some(pct) => format!("{pct:.1}"),
        None => "N/A".to_string(),
    }
}
