use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CalcError;
use crate::interpret::Interpretation;
use crate::loan::amortization::{self, ExtraPayment, LoanTerms, TermUnit};
use crate::loan::payment::PaymentFrequency;
use crate::types::*;
use crate::CalcResult;

/// Loan-to-value above which private mortgage insurance is charged.
const PMI_LTV_THRESHOLD: Rate = dec!(0.80);

/// Input for the mortgage payment calculator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageInput {
    pub home_price: Money,
    pub down_payment: Money,
    /// Nominal annual rate (0.065 = 6.5%)
    pub annual_rate: Rate,
    pub term_years: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_tax_annual: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insurance_annual: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hoa_monthly: Option<Money>,
    /// Annual PMI premium as a fraction of the original loan amount
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmi_rate: Option<Rate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_payment: Option<ExtraPayment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Output of the mortgage payment calculator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageOutput {
    pub loan_amount: Money,
    pub down_payment_pct: Rate,
    pub loan_to_value: Rate,
    pub principal_and_interest: Money,
    pub monthly_property_tax: Money,
    pub monthly_insurance: Money,
    pub monthly_hoa: Money,
    pub monthly_pmi: Money,
    pub total_monthly_payment: Money,
    /// Months until the balance falls to 80% of the home price
    pub pmi_months: u32,
    pub total_pmi: Money,
    pub total_interest: Money,
    /// Principal, interest, PMI and down payment over the life of the loan
    pub total_cost_of_home: Money,
    pub payoff_periods: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    pub interest_saved: Money,
    pub periods_saved: u32,
    pub interest_burden: Interpretation,
}

/// Monthly mortgage payment (PITI plus HOA and PMI) with a full amortization
/// run underneath.
pub fn calculate_mortgage(input: &MortgageInput) -> CalcResult<ComputationOutput<MortgageOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.home_price <= Decimal::ZERO {
        return Err(CalcError::invalid("home_price", "Home price must be positive"));
    }
    if input.down_payment < Decimal::ZERO || input.down_payment >= input.home_price {
        return Err(CalcError::invalid(
            "down_payment",
            "Down payment must be at least zero and less than the home price",
        ));
    }
    for (field, value) in [
        ("property_tax_annual", input.property_tax_annual),
        ("insurance_annual", input.insurance_annual),
        ("hoa_monthly", input.hoa_monthly),
        ("pmi_rate", input.pmi_rate),
    ] {
        if value.is_some_and(|v| v < Decimal::ZERO) {
            return Err(CalcError::invalid(field, "Cannot be negative"));
        }
    }

    let loan_amount = input.home_price - input.down_payment;
    let down_payment_pct = input.down_payment / input.home_price;
    let loan_to_value = loan_amount / input.home_price;

    let terms = LoanTerms {
        principal: loan_amount,
        annual_rate: input.annual_rate,
        term: input.term_years,
        term_unit: TermUnit::Years,
        frequency: PaymentFrequency::Monthly,
        extra_payment: input.extra_payment.clone(),
        start_date: input.start_date,
    };
    let sim = amortization::run_simulation(&terms, &mut warnings)?;

    let twelve = dec!(12);
    let monthly_property_tax = input.property_tax_annual.unwrap_or(Decimal::ZERO) / twelve;
    let monthly_insurance = input.insurance_annual.unwrap_or(Decimal::ZERO) / twelve;
    let monthly_hoa = input.hoa_monthly.unwrap_or(Decimal::ZERO);

    let pmi_applies = loan_to_value > PMI_LTV_THRESHOLD;
    let monthly_pmi = match input.pmi_rate {
        Some(rate) if pmi_applies => loan_amount * rate / twelve,
        Some(_) => Decimal::ZERO,
        None => {
            if pmi_applies {
                warnings.push(format!(
                    "Loan-to-value {} exceeds 80% but no pmi_rate supplied; PMI excluded",
                    loan_to_value.round_dp(4)
                ));
            }
            Decimal::ZERO
        }
    };

    // PMI runs while the opening balance of a month is above 80% of the price.
    let pmi_cutoff = input.home_price * PMI_LTV_THRESHOLD;
    let pmi_months = if monthly_pmi.is_zero() {
        0
    } else {
        let mut opening = loan_amount;
        let mut months = 0u32;
        for entry in &sim.schedule {
            if opening <= pmi_cutoff {
                break;
            }
            months += 1;
            opening = entry.remaining_balance;
        }
        months
    };
    let total_pmi = monthly_pmi * Decimal::from(pmi_months);

    let total_monthly_payment = sim.fixed_payment
        + monthly_property_tax
        + monthly_insurance
        + monthly_hoa
        + monthly_pmi;

    let output = MortgageOutput {
        loan_amount,
        down_payment_pct,
        loan_to_value,
        principal_and_interest: sim.fixed_payment,
        monthly_property_tax,
        monthly_insurance,
        monthly_hoa,
        monthly_pmi,
        total_monthly_payment,
        pmi_months,
        total_pmi,
        total_interest: sim.total_interest,
        total_cost_of_home: sim.total_paid + total_pmi + input.down_payment,
        payoff_periods: sim.payoff_periods,
        payoff_date: sim.payoff_date,
        interest_saved: sim.baseline.interest_saved,
        periods_saved: sim.baseline.periods_saved,
        interest_burden: sim.interest_burden,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Mortgage payment (principal, interest, taxes, insurance, HOA, PMI)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loan::amortization::ExtraPaymentFrequency;
    use rust_decimal_macros::dec;

    fn base_input() -> MortgageInput {
        MortgageInput {
            home_price: dec!(375000),
            down_payment: dec!(75000),
            annual_rate: dec!(0.06),
            term_years: 30,
            property_tax_annual: Some(dec!(3600)),
            insurance_annual: Some(dec!(1200)),
            hoa_monthly: None,
            pmi_rate: None,
            extra_payment: None,
            start_date: None,
        }
    }

    #[test]
    fn test_piti_components() {
        let out = calculate_mortgage(&base_input()).unwrap().result;
        assert_eq!(out.loan_amount, dec!(300000));
        assert_eq!(out.down_payment_pct, dec!(0.2));
        assert_eq!(out.principal_and_interest.round_dp(2), dec!(1798.65));
        assert_eq!(out.monthly_property_tax, dec!(300));
        assert_eq!(out.monthly_insurance, dec!(100));
        assert_eq!(out.total_monthly_payment.round_dp(2), dec!(2198.65));
        // 80% LTV exactly: no PMI
        assert_eq!(out.monthly_pmi, Decimal::ZERO);
        assert_eq!(out.pmi_months, 0);
    }

    #[test]
    fn test_pmi_charged_until_eighty_percent() {
        let mut input = base_input();
        input.down_payment = dec!(37500); // 10% down
        input.pmi_rate = Some(dec!(0.006));
        let out = calculate_mortgage(&input).unwrap().result;
        assert_eq!(out.loan_amount, dec!(337500));
        assert_eq!(out.monthly_pmi, dec!(168.75));
        assert!(out.pmi_months > 0 && out.pmi_months < 360);
        assert_eq!(out.total_pmi, dec!(168.75) * Decimal::from(out.pmi_months));
    }

    #[test]
    fn test_pmi_missing_rate_warns() {
        let mut input = base_input();
        input.down_payment = dec!(10000);
        let out = calculate_mortgage(&input).unwrap();
        assert_eq!(out.result.monthly_pmi, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("PMI")));
    }

    #[test]
    fn test_extra_payment_passes_through() {
        let mut input = base_input();
        input.extra_payment = Some(ExtraPayment {
            amount: dec!(250),
            frequency: ExtraPaymentFrequency::Monthly,
        });
        let out = calculate_mortgage(&input).unwrap().result;
        assert!(out.payoff_periods < 360);
        assert!(out.interest_saved > Decimal::ZERO);
    }

    #[test]
    fn test_down_payment_bounds() {
        let mut input = base_input();
        input.down_payment = dec!(375000);
        assert!(calculate_mortgage(&input).is_err());
        input.down_payment = dec!(-1);
        assert!(calculate_mortgage(&input).is_err());
    }
}
