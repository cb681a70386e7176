use super::ScoreInput;

/// Rent above this share of monthly income fails the income-ratio term.
pub(crate) const RENT_TO_INCOME_LIMIT: f64 = 0.35;
/// Rent above market rent times this multiplier fails the market term.
pub(crate) const MARKET_PREMIUM_LIMIT: f64 = 1.1;

pub(crate) const INCOME_RATIO_POINTS: i64 = 20;
pub(crate) const MARKET_COMPARISON_POINTS: i64 = 30;
pub(crate) const QUALITY_POINTS_PER_STEP: i64 = 5;

pub(crate) const MIN_SCORE: i64 = 0;
pub(crate) const MAX_SCORE: i64 = 100;

/// Raw contribution of each scoring term before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct TermPoints {
    pub income_ratio: i64,
    pub market_comparison: i64,
    pub quality: i64,
}

impl TermPoints {
    pub(crate) fn total(&self) -> i64 {
        self.income_ratio
            .saturating_add(self.market_comparison)
            .saturating_add(self.quality)
    }
}

pub(crate) fn score_terms(input: &ScoreInput) -> TermPoints {
    TermPoints {
        income_ratio: income_ratio_points(input.rent, input.income),
        market_comparison: market_comparison_points(input.rent, input.market_rent),
        quality: quality_points(input.unit_quality),
    }
}

// A non-positive income skips the ratio check and earns the passing points.
pub(crate) fn income_ratio_points(rent: f64, income: f64) -> i64 {
    if income > 0.0 && rent / income > RENT_TO_INCOME_LIMIT {
        -INCOME_RATIO_POINTS
    } else {
        INCOME_RATIO_POINTS
    }
}

// Same convention as the income term for a non-positive market rent.
pub(crate) fn market_comparison_points(rent: f64, market_rent: f64) -> i64 {
    if market_rent > 0.0 && rent > market_rent * MARKET_PREMIUM_LIMIT {
        -MARKET_COMPARISON_POINTS
    } else {
        MARKET_COMPARISON_POINTS
    }
}

pub(crate) fn quality_points(unit_quality: i64) -> i64 {
    unit_quality.saturating_mul(QUALITY_POINTS_PER_STEP)
}

pub(crate) fn clamp_score(total: i64) -> u8 {
    // Bounded to [0, 100] so the narrowing cast is lossless.
    total.clamp(MIN_SCORE, MAX_SCORE) as u8
}
