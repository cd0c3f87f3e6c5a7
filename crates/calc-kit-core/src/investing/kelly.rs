use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CalcError;
use crate::interpret::{Interpretation, KELLY_RISK};
use crate::math::ln_decimal;
use crate::types::*;
use crate::CalcResult;

/// Input for Kelly Criterion bet sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KellyInput {
    /// Probability of a winning outcome (0 to 1, exclusive)
    pub win_probability: Rate,
    /// Average amount won on a winning outcome
    pub average_win: Money,
    /// Average amount lost on a losing outcome (positive)
    pub average_loss: Money,
    /// Fraction of full Kelly to stake (defaults to 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kelly_fraction: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bankroll: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KellyOutput {
    /// b = average win / average loss
    pub win_loss_ratio: Decimal,
    pub loss_probability: Rate,
    /// f* = (p*b - q) / b, clamped to [0, 1]
    pub full_kelly: Rate,
    /// Unclamped f*; negative when the bet has no edge
    pub raw_kelly: Rate,
    pub half_kelly: Rate,
    pub quarter_kelly: Rate,
    pub kelly_fraction_used: Rate,
    pub fractional_kelly: Rate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommended_stake: Option<Money>,
    /// Expected profit per unit staked: p*b - q
    pub edge: Decimal,
    /// Expected log growth per bet at the fractional stake
    pub growth_rate: Decimal,
    pub risk_level: Interpretation,
}

pub fn calculate_kelly(input: &KellyInput) -> CalcResult<ComputationOutput<KellyOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.win_probability <= Decimal::ZERO || input.win_probability >= Decimal::ONE {
        return Err(CalcError::invalid(
            "win_probability",
            "Must be between 0 and 1 (exclusive)",
        ));
    }
    if input.average_win <= Decimal::ZERO {
        return Err(CalcError::invalid("average_win", "Must be positive"));
    }
    if input.average_loss <= Decimal::ZERO {
        return Err(CalcError::invalid("average_loss", "Must be positive"));
    }
    let fraction = input.kelly_fraction.unwrap_or(Decimal::ONE);
    if fraction <= Decimal::ZERO || fraction > Decimal::ONE {
        return Err(CalcError::invalid(
            "kelly_fraction",
            "Must be between 0 (exclusive) and 1 (inclusive)",
        ));
    }
    if input.bankroll.is_some_and(|b| b < Decimal::ZERO) {
        return Err(CalcError::invalid("bankroll", "Cannot be negative"));
    }

    let p = input.win_probability;
    let q = Decimal::ONE - p;
    let b = input
        .average_win
        .checked_div(input.average_loss)
        .ok_or_else(|| CalcError::overflow("average_win", "win/loss ratio"))?;

    let edge = p
        .checked_mul(b)
        .ok_or_else(|| CalcError::overflow("average_win", "expected edge"))?
        - q;
    let raw_kelly = edge / b;
    if raw_kelly <= Decimal::ZERO {
        warnings.push("Negative or zero edge: Kelly recommends no position".into());
    }

    let full_kelly = raw_kelly.max(Decimal::ZERO).min(Decimal::ONE);
    let fractional_kelly = full_kelly * fraction;

    // g(f) = p * ln(1 + f*b) + q * ln(1 - f)
    let growth_rate = if fractional_kelly > Decimal::ZERO && fractional_kelly < Decimal::ONE {
        let upside = (fractional_kelly * b)
            .checked_add(Decimal::ONE)
            .ok_or_else(|| CalcError::overflow("average_win", "growth rate"))?;
        p * ln_decimal(upside)? + q * ln_decimal(Decimal::ONE - fractional_kelly)?
    } else {
        Decimal::ZERO
    };

    debug!("kelly: p={p} b={b} f*={full_kelly} fraction={fraction}");

    let output = KellyOutput {
        win_loss_ratio: b,
        loss_probability: q,
        full_kelly,
        raw_kelly,
        half_kelly: full_kelly / dec!(2),
        quarter_kelly: full_kelly / dec!(4),
        kelly_fraction_used: fraction,
        fractional_kelly,
        recommended_stake: input.bankroll.map(|bankroll| bankroll * fractional_kelly),
        edge,
        growth_rate,
        risk_level: KELLY_RISK.interpret(full_kelly)?,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Kelly Criterion bet sizing",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sixty_percent() -> KellyInput {
        KellyInput {
            win_probability: dec!(0.6),
            average_win: dec!(100),
            average_loss: dec!(50),
            kelly_fraction: None,
            bankroll: None,
        }
    }

    #[test]
    fn test_sixty_percent_two_to_one() {
        let out = calculate_kelly(&sixty_percent()).unwrap().result;
        assert_eq!(out.win_loss_ratio, dec!(2));
        assert_eq!(out.loss_probability, dec!(0.4));
        assert_eq!(out.full_kelly, dec!(0.4));
        assert_eq!(out.half_kelly, dec!(0.2));
        assert_eq!(out.quarter_kelly, dec!(0.1));
        assert_eq!(out.edge, dec!(0.8));
        assert_eq!(out.risk_level.label, "Very Aggressive");
    }

    #[test]
    fn test_fractional_stake() {
        let mut input = sixty_percent();
        input.kelly_fraction = Some(dec!(0.5));
        input.bankroll = Some(dec!(10000));
        let out = calculate_kelly(&input).unwrap().result;
        assert_eq!(out.fractional_kelly, dec!(0.2));
        assert_eq!(out.recommended_stake, Some(dec!(2000)));
        assert!(out.growth_rate > Decimal::ZERO);
    }

    #[test]
    fn test_negative_edge_clamped_to_zero() {
        let input = KellyInput {
            win_probability: dec!(0.3),
            average_win: dec!(50),
            average_loss: dec!(50),
            kelly_fraction: None,
            bankroll: Some(dec!(1000)),
        };
        let out = calculate_kelly(&input).unwrap();
        assert_eq!(out.result.full_kelly, Decimal::ZERO);
        assert!(out.result.raw_kelly < Decimal::ZERO);
        assert_eq!(out.result.recommended_stake, Some(Decimal::ZERO));
        assert_eq!(out.result.risk_level.label, "No Edge");
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_large_payoff_ratio() {
        // p=0.99, b=10000 => f* = (9900 - 0.01) / 10000
        let input = KellyInput {
            win_probability: dec!(0.99),
            average_win: dec!(10000),
            average_loss: dec!(1),
            kelly_fraction: None,
            bankroll: None,
        };
        let out = calculate_kelly(&input).unwrap().result;
        assert_eq!(out.full_kelly, dec!(0.989999));
        assert!(out.growth_rate > Decimal::ZERO);
    }

    #[test]
    fn test_unrepresentable_payoff_ratio_is_error() {
        let input = KellyInput {
            win_probability: dec!(0.6),
            average_win: dec!(100000000000000000000),
            average_loss: dec!(0.0000000001),
            kelly_fraction: None,
            bankroll: None,
        };
        assert!(matches!(
            calculate_kelly(&input),
            Err(CalcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_invalid_inputs() {
        let mut input = sixty_percent();
        input.win_probability = dec!(1);
        assert!(calculate_kelly(&input).is_err());

        let mut input = sixty_percent();
        input.average_loss = Decimal::ZERO;
        assert!(calculate_kelly(&input).is_err());

        let mut input = sixty_percent();
        input.kelly_fraction = Some(dec!(1.5));
        assert!(calculate_kelly(&input).is_err());
    }
}
