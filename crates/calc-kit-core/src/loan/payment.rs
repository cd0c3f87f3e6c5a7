use log::debug;
use rust_decimal::{Decimal, MathematicalOps};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CalcError;
use crate::types::*;
use crate::CalcResult;

/// How often scheduled payments fall due.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Weekly,
    #[serde(alias = "bi_weekly", alias = "fortnightly")]
    Biweekly,
    #[serde(alias = "semi_monthly")]
    Semimonthly,
    #[default]
    Monthly,
    Quarterly,
    #[serde(alias = "semi_annual")]
    Semiannual,
    #[serde(alias = "yearly")]
    Annual,
}

impl PaymentFrequency {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Self::Weekly => 52,
            Self::Biweekly => 26,
            Self::Semimonthly => 24,
            Self::Monthly => 12,
            Self::Quarterly => 4,
            Self::Semiannual => 2,
            Self::Annual => 1,
        }
    }
}

impl std::fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Semimonthly => "semimonthly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Semiannual => "semiannual",
            Self::Annual => "annual",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for PaymentFrequency {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" | "fortnightly" => Ok(Self::Biweekly),
            "semimonthly" => Ok(Self::Semimonthly),
            "monthly" => Ok(Self::Monthly),
            "quarterly" => Ok(Self::Quarterly),
            "semiannual" => Ok(Self::Semiannual),
            "annual" | "annually" | "yearly" => Ok(Self::Annual),
            other => Err(CalcError::invalid(
                "frequency",
                format!(
                    "unknown frequency '{other}'. Use: weekly, biweekly, semimonthly, monthly, quarterly, semiannual, annual"
                ),
            )),
        }
    }
}

/// Longest term any loan calculator accepts.
pub const MAX_TERM_YEARS: u32 = 100;

/// Warning for annual rates above 100%, which are accepted but are more
/// often a percentage typed where a fraction was expected.
pub fn high_rate_warning(annual_rate: Rate) -> Option<String> {
    (annual_rate > Decimal::ONE).then(|| {
        format!(
            "Annual rate {annual_rate} is above 100%; rates are decimal fractions (0.06 = 6%)"
        )
    })
}

/// Per-period rate for an annual nominal rate.
pub fn periodic_rate(annual_rate: Rate, frequency: PaymentFrequency) -> Rate {
    annual_rate / Decimal::from(frequency.periods_per_year())
}

/// (1 + r)^n by exact integer exponentiation.
fn growth_factor(periodic_rate: Rate, periods: u32) -> CalcResult<Decimal> {
    (Decimal::ONE + periodic_rate)
        .checked_powi(i64::from(periods))
        .ok_or_else(|| {
            CalcError::invalid(
                "periodic_rate",
                format!("(1 + {periodic_rate})^{periods} overflows decimal range"),
            )
        })
}

/// Constant periodic payment that fully amortizes `principal` over `periods`.
///
/// payment = P * r * (1+r)^n / ((1+r)^n - 1), or P / n when r = 0.
pub fn fixed_payment(principal: Money, periodic_rate: Rate, periods: u32) -> CalcResult<Money> {
    if principal <= Decimal::ZERO {
        return Err(CalcError::invalid("principal", "Principal must be positive"));
    }
    if periodic_rate < Decimal::ZERO {
        return Err(CalcError::invalid("periodic_rate", "Rate cannot be negative"));
    }
    if periods == 0 {
        return Err(CalcError::invalid("periods", "Number of periods must be > 0"));
    }

    if periodic_rate.is_zero() {
        return Ok(principal / Decimal::from(periods));
    }

    let factor = growth_factor(periodic_rate, periods)?;
    let denominator = factor - Decimal::ONE;
    if denominator.is_zero() {
        return Err(CalcError::DivisionByZero {
            context: "fixed payment annuity factor".into(),
        });
    }

    principal
        .checked_mul(periodic_rate)
        .and_then(|v| v.checked_mul(factor))
        .and_then(|v| v.checked_div(denominator))
        .ok_or_else(|| CalcError::overflow("principal", "level payment"))
}

/// Outstanding balance after `payments_made` level payments of `payment`.
///
/// B_k = P(1+r)^k - payment * ((1+r)^k - 1) / r, floored at zero.
pub fn remaining_balance(
    principal: Money,
    periodic_rate: Rate,
    payment: Money,
    payments_made: u32,
) -> CalcResult<Money> {
    let overflow = || CalcError::overflow("principal", "remaining balance");
    let balance = if periodic_rate.is_zero() {
        let paid = payment
            .checked_mul(Decimal::from(payments_made))
            .ok_or_else(overflow)?;
        principal - paid
    } else {
        let factor = growth_factor(periodic_rate, payments_made)?;
        let grown = principal.checked_mul(factor).ok_or_else(overflow)?;
        let paid = payment
            .checked_mul(factor - Decimal::ONE)
            .and_then(|v| v.checked_div(periodic_rate))
            .ok_or_else(overflow)?;
        grown - paid
    };
    Ok(balance.max(Decimal::ZERO))
}

/// Input for the standalone payment calculator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub principal: Money,
    /// Nominal annual rate (0.06 = 6%)
    pub annual_rate: Rate,
    pub term_years: u32,
    #[serde(default)]
    pub frequency: PaymentFrequency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentOutput {
    pub fixed_payment: Money,
    pub periodic_rate: Rate,
    pub periods: u32,
    pub total_paid: Money,
    pub total_interest: Money,
}

/// Level payment for a fully amortizing loan, with lifetime totals.
pub fn calculate_payment(input: &PaymentInput) -> CalcResult<ComputationOutput<PaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.term_years == 0 || input.term_years > MAX_TERM_YEARS {
        return Err(CalcError::invalid(
            "term_years",
            format!("Term must be between 1 and {MAX_TERM_YEARS} years"),
        ));
    }
    if let Some(warning) = high_rate_warning(input.annual_rate) {
        warnings.push(warning);
    }
    if input.annual_rate.is_zero() {
        warnings.push("Zero interest rate: payment is principal divided by periods".into());
    }

    let rate = periodic_rate(input.annual_rate, input.frequency);
    let periods = input.term_years * input.frequency.periods_per_year();
    let payment = fixed_payment(input.principal, rate, periods)?;
    let total_paid = payment
        .checked_mul(Decimal::from(periods))
        .ok_or_else(|| CalcError::overflow("principal", "total paid"))?;
    debug!("fixed payment {payment} over {periods} {} periods", input.frequency);

    let output = PaymentOutput {
        fixed_payment: payment,
        periodic_rate: rate,
        periods,
        total_paid,
        total_interest: total_paid - input.principal,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level annuity payment: P * r * (1+r)^n / ((1+r)^n - 1)",
        input,
        warnings,
        elapsed,
        output,
    ))
}
