use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CalcError;
use crate::loan::amortization::{self, PaymentScheduleEntry};
use crate::loan::payment::{self, PaymentFrequency};
use crate::types::*;
use crate::CalcResult;

/// Input for a balloon loan: payments sized on a long amortization, with the
/// outstanding balance due in one lump after a shorter period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalloonInput {
    pub principal: Money,
    pub annual_rate: Rate,
    pub amortization_years: u32,
    pub balloon_after_years: u32,
    #[serde(default)]
    pub frequency: PaymentFrequency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalloonOutput {
    pub regular_payment: Money,
    pub regular_payment_count: u32,
    pub balloon_payment: Money,
    /// Balloon as a fraction of the original principal
    pub balloon_pct_of_principal: Rate,
    pub total_regular_payments: Money,
    pub total_interest: Money,
    pub total_paid: Money,
    pub schedule: Vec<PaymentScheduleEntry>,
}

pub fn calculate_balloon(input: &BalloonInput) -> CalcResult<ComputationOutput<BalloonOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.principal <= Decimal::ZERO {
        return Err(CalcError::invalid("principal", "Principal must be positive"));
    }
    if input.annual_rate < Decimal::ZERO {
        return Err(CalcError::invalid("annual_rate", "Interest rate cannot be negative"));
    }
    warnings.extend(payment::high_rate_warning(input.annual_rate));
    if input.amortization_years == 0 || input.amortization_years > payment::MAX_TERM_YEARS {
        return Err(CalcError::invalid(
            "amortization_years",
            format!("Amortization must be between 1 and {} years", payment::MAX_TERM_YEARS),
        ));
    }
    if input.balloon_after_years == 0 {
        return Err(CalcError::invalid(
            "balloon_after_years",
            "Balloon must fall due after at least one year",
        ));
    }
    if input.balloon_after_years > input.amortization_years {
        return Err(CalcError::invalid(
            "balloon_after_years",
            "Balloon cannot fall due after the amortization period ends",
        ));
    }
    if input.balloon_after_years == input.amortization_years {
        warnings.push("Balloon date equals the amortization term; the loan fully amortizes".into());
    }

    let ppy = input.frequency.periods_per_year();
    let rate = payment::periodic_rate(input.annual_rate, input.frequency);
    let full_periods = input.amortization_years * ppy;
    let balloon_period = input.balloon_after_years * ppy;
    let regular = payment::fixed_payment(input.principal, rate, full_periods)?;

    let schedule =
        amortization::build_schedule(input.principal, rate, regular, balloon_period, ppy, None);
    let balloon_payment = schedule.final_balance.max(Decimal::ZERO);

    let output = BalloonOutput {
        regular_payment: regular,
        regular_payment_count: schedule.payoff_periods,
        balloon_payment,
        balloon_pct_of_principal: balloon_payment / input.principal,
        total_regular_payments: schedule.total_paid,
        total_interest: schedule.total_interest,
        total_paid: schedule.total_paid + balloon_payment,
        schedule: schedule.entries,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Balloon loan: level payments on full amortization, remaining balance due at balloon date",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::payment::remaining_balance;
    use rust_decimal_macros::dec;

    fn seven_over_thirty() -> BalloonInput {
        BalloonInput {
            principal: dec!(250000),
            annual_rate: dec!(0.07),
            amortization_years: 30,
            balloon_after_years: 7,
            frequency: PaymentFrequency::Monthly,
        }
    }

    #[test]
    fn test_balloon_matches_closed_form_balance() {
        let out = calculate_balloon(&seven_over_thirty()).unwrap().result;
        let rate = dec!(0.07) / dec!(12);
        let expected = remaining_balance(dec!(250000), rate, out.regular_payment, 84).unwrap();
        assert!((out.balloon_payment - expected).abs() < dec!(0.0001));
        assert_eq!(out.regular_payment_count, 84);
        assert_eq!(out.schedule.len(), 84);
    }

    #[test]
    fn test_total_paid_includes_balloon() {
        let out = calculate_balloon(&seven_over_thirty()).unwrap().result;
        assert_eq!(out.total_paid, out.total_regular_payments + out.balloon_payment);
        // Principal repaid = regular principal + balloon
        let regular_principal: Decimal = out.schedule.iter().map(|e| e.principal).sum();
        assert!((regular_principal + out.balloon_payment - dec!(250000)).abs() < dec!(0.0001));
        assert!(out.balloon_pct_of_principal > dec!(0.8));
    }

    #[test]
    fn test_balloon_at_term_end_is_zero() {
        let mut input = seven_over_thirty();
        input.balloon_after_years = 30;
        let out = calculate_balloon(&input).unwrap();
        assert!(out.result.balloon_payment < dec!(0.01));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_rejects_non_positive_principal() {
        let mut input = seven_over_thirty();
        input.principal = Decimal::ZERO;
        assert!(matches!(
            calculate_balloon(&input),
            Err(CalcError::InvalidInput { field, .. }) if field == "principal"
        ));
    }

    #[test]
    fn test_rate_above_one_warns() {
        let mut input = seven_over_thirty();
        input.annual_rate = dec!(1.2);
        let out = calculate_balloon(&input).unwrap();
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_balloon_after_term_rejected() {
        let mut input = seven_over_thirty();
        input.balloon_after_years = 31;
        assert!(calculate_balloon(&input).is_err());
    }
}
