use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CalcError;
use crate::interpret::{Interpretation, OPTION_LIKELIHOOD};
use crate::math::{ln_decimal, norm_cdf, sqrt_decimal};
use crate::types::*;
use crate::CalcResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionType {
    #[default]
    Call,
    Put,
}

/// Input for the probability of an option finishing in the money
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionProbabilityInput {
    pub spot_price: Money,
    pub strike_price: Money,
    /// Years until expiry; zero means the option is expiring now
    pub time_to_expiry: Years,
    /// Annualised volatility (0.25 = 25%)
    pub volatility: Rate,
    #[serde(default)]
    pub risk_free_rate: Rate,
    #[serde(default)]
    pub dividend_yield: Rate,
    #[serde(default)]
    pub option_type: OptionType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionProbabilityOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d2: Option<Decimal>,
    /// P(S_T > K) under the risk-neutral lognormal model
    pub prob_above_strike: Rate,
    pub prob_below_strike: Rate,
    /// Probability the option finishes in the money
    pub prob_in_the_money: Rate,
    /// Reflection-principle estimate of touching the strike before expiry
    pub prob_touch: Rate,
    /// One standard deviation move in price: S * sigma * sqrt(T)
    pub expected_move: Money,
    pub expected_range_low: Money,
    pub expected_range_high: Money,
    pub likelihood: Interpretation,
}

pub fn calculate_option_probability(
    input: &OptionProbabilityInput,
) -> CalcResult<ComputationOutput<OptionProbabilityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.spot_price <= Decimal::ZERO {
        return Err(CalcError::invalid("spot_price", "must be positive"));
    }
    if input.strike_price <= Decimal::ZERO {
        return Err(CalcError::invalid("strike_price", "must be positive"));
    }
    if input.time_to_expiry < Decimal::ZERO {
        return Err(CalcError::invalid("time_to_expiry", "cannot be negative"));
    }
    if input.volatility < Decimal::ZERO {
        return Err(CalcError::invalid("volatility", "cannot be negative"));
    }
    if input.time_to_expiry > Decimal::ZERO && input.volatility.is_zero() {
        return Err(CalcError::invalid(
            "volatility",
            "must be positive when time remains to expiry",
        ));
    }

    let s = input.spot_price;
    let k = input.strike_price;
    let t = input.time_to_expiry;
    let sigma = input.volatility;

    let (d2, prob_above) = if t.is_zero() {
        warnings.push(
            "Option expires now; outcome is determined by spot versus strike".into(),
        );
        let above = match s.cmp(&k) {
            std::cmp::Ordering::Greater => Decimal::ONE,
            std::cmp::Ordering::Less => Decimal::ZERO,
            // Limit of N(d2) as T -> 0 with S = K
            std::cmp::Ordering::Equal => dec!(0.5),
        };
        (None, above)
    } else {
        let overflow = || CalcError::overflow("volatility", "d2");
        let sigma_sqrt_t = sigma.checked_mul(sqrt_decimal(t)).ok_or_else(overflow)?;
        let variance_drag = sigma.checked_mul(sigma).ok_or_else(overflow)? / dec!(2);
        let drift = (input.risk_free_rate - input.dividend_yield - variance_drag)
            .checked_mul(t)
            .ok_or_else(overflow)?;
        let moneyness = s
            .checked_div(k)
            .ok_or_else(|| CalcError::overflow("spot_price", "spot / strike"))?;
        let d2 = (ln_decimal(moneyness)? + drift)
            .checked_div(sigma_sqrt_t)
            .ok_or_else(overflow)?;
        debug!("option probability: d2={d2}");
        (Some(d2), norm_cdf(d2))
    };
    let prob_below = Decimal::ONE - prob_above;

    let prob_in_the_money = match input.option_type {
        OptionType::Call => prob_above,
        OptionType::Put => prob_below,
    };

    // Touching needs the price to cross from spot to strike at some point.
    let beyond = if k >= s { prob_above } else { prob_below };
    let prob_touch = (beyond * dec!(2)).min(Decimal::ONE);

    let expected_move = s
        .checked_mul(sigma)
        .and_then(|v| v.checked_mul(sqrt_decimal(t)))
        .ok_or_else(|| CalcError::overflow("spot_price", "expected move"))?;

    let output = OptionProbabilityOutput {
        d2,
        prob_above_strike: prob_above,
        prob_below_strike: prob_below,
        prob_in_the_money,
        prob_touch,
        expected_move,
        expected_range_low: (s - expected_move).max(Decimal::ZERO),
        expected_range_high: s
            .checked_add(expected_move)
            .ok_or_else(|| CalcError::overflow("spot_price", "expected range"))?,
        likelihood: OPTION_LIKELIHOOD.interpret(prob_in_the_money)?,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Risk-neutral lognormal probability of expiring beyond strike, N(d2)",
        input,
        warnings,
        elapsed,
        output,
    ))
}
