use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CalcError;
use crate::interpret::{Interpretation, BETA_VOLATILITY, CORRELATION_STRENGTH};
use crate::math::{mean, sample_covariance, sample_variance, sqrt_decimal};
use crate::types::*;
use crate::CalcResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationInput {
    pub x: Vec<Decimal>,
    pub y: Vec<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Positive,
    Negative,
    Uncorrelated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationOutput {
    /// Pearson correlation coefficient, in [-1, 1]
    pub correlation: Ratio,
    pub r_squared: Ratio,
    pub covariance: Decimal,
    pub mean_x: Decimal,
    pub mean_y: Decimal,
    pub std_dev_x: Decimal,
    pub std_dev_y: Decimal,
    pub observations: usize,
    pub direction: Direction,
    pub strength: Interpretation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetaInput {
    pub asset_returns: Vec<Rate>,
    pub market_returns: Vec<Rate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BetaOutput {
    /// cov(asset, market) / var(market)
    pub beta: Ratio,
    /// Regression intercept: mean(asset) - beta * mean(market)
    pub alpha: Rate,
    pub correlation: Ratio,
    pub r_squared: Ratio,
    pub asset_volatility: Rate,
    pub market_volatility: Rate,
    pub observations: usize,
    pub volatility: Interpretation,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_pair(left: &str, x: &[Decimal], right: &str, y: &[Decimal]) -> CalcResult<()> {
    if x.len() != y.len() {
        return Err(CalcError::MismatchedSeries {
            left: left.into(),
            left_len: x.len(),
            right: right.into(),
            right_len: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(CalcError::InsufficientData(format!(
            "{left} and {right} need at least 2 paired observations"
        )));
    }
    Ok(())
}

/// Pearson correlation of two validated series. Zero variance in either
/// series leaves the coefficient undefined.
fn pearson(x: &[Decimal], y: &[Decimal]) -> CalcResult<Ratio> {
    let var_x = sample_variance(x)?;
    let var_y = sample_variance(y)?;
    if var_x.is_zero() || var_y.is_zero() {
        return Err(CalcError::DivisionByZero {
            context: "correlation: a series has zero variance".into(),
        });
    }
    let denominator = sqrt_decimal(var_x)
        .checked_mul(sqrt_decimal(var_y))
        .ok_or_else(|| CalcError::overflow("series", "product of standard deviations"))?;
    let r = sample_covariance(x, y)?
        .checked_div(denominator)
        .ok_or_else(|| CalcError::overflow("series", "correlation"))?;
    // Rounding in the square root can push |r| a hair past 1.
    Ok(r.max(-Decimal::ONE).min(Decimal::ONE))
}

// ---------------------------------------------------------------------------
// Calculators
// ---------------------------------------------------------------------------

/// Pearson correlation coefficient between two paired series.
pub fn calculate_correlation(
    input: &CorrelationInput,
) -> CalcResult<ComputationOutput<CorrelationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_pair("x", &input.x, "y", &input.y)?;
    if input.x.len() < 5 {
        warnings.push(format!(
            "Only {} observations; correlation estimates from small samples are unstable",
            input.x.len()
        ));
    }

    let correlation = pearson(&input.x, &input.y)?;
    let direction = if correlation > Decimal::ZERO {
        Direction::Positive
    } else if correlation < Decimal::ZERO {
        Direction::Negative
    } else {
        Direction::Uncorrelated
    };

    let output = CorrelationOutput {
        correlation,
        r_squared: correlation * correlation,
        covariance: sample_covariance(&input.x, &input.y)?,
        mean_x: mean(&input.x)?,
        mean_y: mean(&input.y)?,
        std_dev_x: sqrt_decimal(sample_variance(&input.x)?),
        std_dev_y: sqrt_decimal(sample_variance(&input.y)?),
        observations: input.x.len(),
        direction,
        strength: CORRELATION_STRENGTH.interpret(correlation.abs())?,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Pearson product-moment correlation (sample statistics)",
        &serde_json::json!({ "observations": input.x.len() }),
        warnings,
        elapsed,
        output,
    ))
}

/// Beta of an asset against a market return series.
pub fn calculate_beta(input: &BetaInput) -> CalcResult<ComputationOutput<BetaOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_pair(
        "asset_returns",
        &input.asset_returns,
        "market_returns",
        &input.market_returns,
    )?;

    let market_variance = sample_variance(&input.market_returns)?;
    let asset_variance = sample_variance(&input.asset_returns)?;
    if market_variance.is_zero() {
        return Err(CalcError::DivisionByZero {
            context: "beta: market returns have zero variance".into(),
        });
    }

    let covariance = sample_covariance(&input.asset_returns, &input.market_returns)?;
    let beta = covariance
        .checked_div(market_variance)
        .ok_or_else(|| CalcError::overflow("asset_returns", "beta"))?;
    let mean_asset = mean(&input.asset_returns)?;
    let mean_market = mean(&input.market_returns)?;
    let alpha = beta
        .checked_mul(mean_market)
        .and_then(|explained| mean_asset.checked_sub(explained))
        .ok_or_else(|| CalcError::overflow("asset_returns", "alpha"))?;

    // A flat asset series has beta 0 and no defined correlation.
    let correlation = if asset_variance.is_zero() {
        warnings.push("Asset returns have zero variance; correlation reported as 0".into());
        Decimal::ZERO
    } else {
        pearson(&input.asset_returns, &input.market_returns)?
    };

    let output = BetaOutput {
        beta,
        alpha,
        correlation,
        r_squared: correlation * correlation,
        asset_volatility: sqrt_decimal(asset_variance),
        market_volatility: sqrt_decimal(market_variance),
        observations: input.asset_returns.len(),
        volatility: BETA_VOLATILITY.interpret(beta)?,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Beta by ordinary least squares (covariance / market variance)",
        &serde_json::json!({ "observations": input.asset_returns.len() }),
        warnings,
        elapsed,
        output,
    ))
}
