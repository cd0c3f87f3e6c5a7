use chrono::{Days, Months, NaiveDate};
use log::debug;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CalcError;
use crate::interpret::{Interpretation, EXTRA_PAYMENT_EFFICIENCY, INTEREST_BURDEN};
use crate::loan::payment::{self, PaymentFrequency};
use crate::types::*;
use crate::CalcResult;

/// Balance at or below which a loan counts as paid off.
pub const PAYOFF_EPSILON: Money = dec!(0.01);

/// Unit of `LoanTerms::term`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TermUnit {
    #[default]
    Years,
    Months,
}

/// When an extra principal payment is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraPaymentFrequency {
    /// Every payment period
    Monthly,
    /// First period of each payment year
    Yearly,
    /// First period only
    #[serde(alias = "one-time", alias = "onetime")]
    OneTime,
}

impl std::str::FromStr for ExtraPaymentFrequency {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "monthly" => Ok(Self::Monthly),
            "yearly" | "annual" | "annually" => Ok(Self::Yearly),
            "onetime" | "once" => Ok(Self::OneTime),
            other => Err(CalcError::invalid(
                "extra_frequency",
                format!("unknown extra payment frequency '{other}'. Use: monthly, yearly, one-time"),
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPayment {
    pub amount: Money,
    pub frequency: ExtraPaymentFrequency,
}

impl ExtraPayment {
    /// Extra amount due in 1-based `period`.
    pub fn amount_for(&self, period: u32, periods_per_year: u32) -> Money {
        let applies = match self.frequency {
            ExtraPaymentFrequency::Monthly => true,
            ExtraPaymentFrequency::Yearly => period % periods_per_year == 1 % periods_per_year,
            ExtraPaymentFrequency::OneTime => period == 1,
        };
        if applies {
            self.amount
        } else {
            Decimal::ZERO
        }
    }
}

/// Input for an amortization run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    /// Nominal annual rate (0.06 = 6%)
    pub annual_rate: Rate,
    pub term: u32,
    #[serde(default)]
    pub term_unit: TermUnit,
    #[serde(default)]
    pub frequency: PaymentFrequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_payment: Option<ExtraPayment>,
    /// Date of the first payment; enables payment and payoff dates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl LoanTerms {
    /// Number of scheduled payments, plus a warning when a month-denominated
    /// term does not divide evenly into the payment frequency.
    pub fn scheduled_periods(&self) -> (u32, Option<String>) {
        let ppy = self.frequency.periods_per_year();
        match self.term_unit {
            TermUnit::Years => (self.term * ppy, None),
            TermUnit::Months => {
                let scaled = self.term * ppy;
                let periods = scaled.div_ceil(12);
                let warning = (scaled % 12 != 0).then(|| {
                    format!(
                        "{} months is not a whole number of {} periods; rounded up to {periods}",
                        self.term, self.frequency
                    )
                });
                (periods, warning)
            }
        }
    }

    pub fn periodic_rate(&self) -> Rate {
        payment::periodic_rate(self.annual_rate, self.frequency)
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(CalcError::invalid("principal", "Principal must be positive"));
        }
        if self.annual_rate < Decimal::ZERO {
            return Err(CalcError::invalid("annual_rate", "Interest rate cannot be negative"));
        }
        if self.term == 0 {
            return Err(CalcError::invalid("term", "Term must be at least one period"));
        }
        if self.term_unit == TermUnit::Years && self.term > payment::MAX_TERM_YEARS {
            return Err(CalcError::invalid(
                "term",
                format!("Term cannot exceed {} years", payment::MAX_TERM_YEARS),
            ));
        }
        if self.term_unit == TermUnit::Months && self.term > payment::MAX_TERM_YEARS * 12 {
            return Err(CalcError::invalid(
                "term",
                format!("Term cannot exceed {} months", payment::MAX_TERM_YEARS * 12),
            ));
        }
        if let Some(extra) = &self.extra_payment {
            if extra.amount < Decimal::ZERO {
                return Err(CalcError::invalid(
                    "extra_payment.amount",
                    "Extra payment cannot be negative",
                ));
            }
        }
        Ok(())
    }
}

/// One period of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentScheduleEntry {
    pub period: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    /// Total cash paid this period (interest + principal + extra)
    pub payment: Money,
    pub interest: Money,
    /// Scheduled principal, excluding the extra payment
    pub principal: Money,
    pub extra_payment: Money,
    pub remaining_balance: Money,
}

/// Raw output of the amortization recurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub entries: Vec<PaymentScheduleEntry>,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_extra: Money,
    pub total_paid: Money,
    pub payoff_periods: u32,
    pub final_balance: Money,
}

impl Schedule {
    pub fn is_paid_off(&self) -> bool {
        self.final_balance <= PAYOFF_EPSILON
    }
}

/// Run the amortization recurrence for at most `max_periods` periods.
///
/// Each period: interest on the opening balance, scheduled principal is the
/// level payment less interest, the extra payment (if due) is added, and the
/// combined principal reduction is clamped to the balance. Stops early once
/// the balance is within `PAYOFF_EPSILON` of zero.
pub fn build_schedule(
    principal: Money,
    periodic_rate: Rate,
    level_payment: Money,
    max_periods: u32,
    periods_per_year: u32,
    extra: Option<&ExtraPayment>,
) -> Schedule {
    let mut entries = Vec::with_capacity(max_periods as usize);
    let mut balance = principal;
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;
    let mut total_extra = Decimal::ZERO;

    for period in 1..=max_periods {
        if balance <= PAYOFF_EPSILON {
            break;
        }

        let interest = balance * periodic_rate;
        let scheduled_principal = (level_payment - interest).max(Decimal::ZERO).min(balance);
        let extra_due = extra.map_or(Decimal::ZERO, |e| e.amount_for(period, periods_per_year));
        let extra_applied = extra_due.min(balance - scheduled_principal);

        balance -= scheduled_principal + extra_applied;
        total_interest += interest;
        total_principal += scheduled_principal;
        total_extra += extra_applied;

        entries.push(PaymentScheduleEntry {
            period,
            date: None,
            payment: interest + scheduled_principal + extra_applied,
            interest,
            principal: scheduled_principal,
            extra_payment: extra_applied,
            remaining_balance: balance,
        });
    }

    let payoff_periods = entries.len() as u32;
    if payoff_periods < max_periods {
        debug!("loan paid off after {payoff_periods} of {max_periods} periods");
    }

    Schedule {
        total_paid: total_interest + total_principal + total_extra,
        entries,
        total_interest,
        total_principal,
        total_extra,
        payoff_periods,
        final_balance: balance,
    }
}

/// Date of 1-based `period` given the first payment date.
pub fn payment_date(
    start: NaiveDate,
    frequency: PaymentFrequency,
    period: u32,
) -> Option<NaiveDate> {
    let offset = period.saturating_sub(1);
    match frequency {
        PaymentFrequency::Weekly => start.checked_add_days(Days::new(7 * u64::from(offset))),
        PaymentFrequency::Biweekly => start.checked_add_days(Days::new(14 * u64::from(offset))),
        PaymentFrequency::Semimonthly => start
            .checked_add_months(Months::new(offset / 2))
            .and_then(|d| d.checked_add_days(Days::new(15 * u64::from(offset % 2)))),
        PaymentFrequency::Monthly => start.checked_add_months(Months::new(offset)),
        PaymentFrequency::Quarterly => start.checked_add_months(Months::new(3 * offset)),
        PaymentFrequency::Semiannual => start.checked_add_months(Months::new(6 * offset)),
        PaymentFrequency::Annual => start.checked_add_months(Months::new(12 * offset)),
    }
}

fn attach_dates(schedule: &mut Schedule, start: NaiveDate, frequency: PaymentFrequency) {
    for entry in &mut schedule.entries {
        entry.date = payment_date(start, frequency, entry.period);
    }
}

/// Savings of the extra-payment schedule against the no-extra baseline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineComparison {
    pub baseline_total_interest: Money,
    pub baseline_total_paid: Money,
    pub baseline_payoff_periods: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_payoff_date: Option<NaiveDate>,
    pub interest_saved: Money,
    pub periods_saved: u32,
}

/// Output of a full amortization simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    pub fixed_payment: Money,
    pub periodic_rate: Rate,
    pub scheduled_periods: u32,
    pub payoff_periods: u32,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_extra: Money,
    pub total_paid: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    pub baseline: BaselineComparison,
    /// Total interest divided by principal
    pub interest_to_principal: Ratio,
    pub interest_burden: Interpretation,
    pub schedule: Vec<PaymentScheduleEntry>,
}

/// Simulate a loan, applying any extra-payment policy, and compare it with
/// the same loan without extra payments.
pub fn simulate(terms: &LoanTerms) -> CalcResult<ComputationOutput<SimulationResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let result = run_simulation(terms, &mut warnings)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Level-payment amortization with extra principal payments",
        terms,
        warnings,
        elapsed,
        result,
    ))
}

/// Shared body of `simulate`, reused by the calculators that embed a run.
pub(crate) fn run_simulation(
    terms: &LoanTerms,
    warnings: &mut Vec<String>,
) -> CalcResult<SimulationResult> {
    terms.validate()?;

    let (periods, rounding) = terms.scheduled_periods();
    warnings.extend(rounding);
    warnings.extend(payment::high_rate_warning(terms.annual_rate));

    let ppy = terms.frequency.periods_per_year();
    let rate = terms.periodic_rate();
    let level = payment::fixed_payment(terms.principal, rate, periods)?;

    debug!(
        "simulating {} over {periods} {} periods at {rate} per period",
        terms.principal, terms.frequency
    );

    let mut baseline = build_schedule(terms.principal, rate, level, periods, ppy, None);
    let mut actual = match &terms.extra_payment {
        Some(extra) if extra.amount > Decimal::ZERO => {
            if extra.amount >= terms.principal {
                warnings.push(format!(
                    "Extra payment {} covers the whole principal; loan is repaid in the first period",
                    extra.amount
                ));
            }
            build_schedule(terms.principal, rate, level, periods, ppy, Some(extra))
        }
        _ => baseline.clone(),
    };

    if !actual.is_paid_off() {
        debug!(
            "schedule ended with {} outstanding after {} periods",
            actual.final_balance, actual.payoff_periods
        );
    }

    if let Some(first) = terms.start_date {
        attach_dates(&mut baseline, first, terms.frequency);
        attach_dates(&mut actual, first, terms.frequency);
    }

    let last_date = |s: &Schedule| s.entries.last().and_then(|e| e.date);
    let comparison = BaselineComparison {
        baseline_total_interest: baseline.total_interest,
        baseline_total_paid: baseline.total_paid,
        baseline_payoff_periods: baseline.payoff_periods,
        baseline_payoff_date: last_date(&baseline),
        interest_saved: baseline.total_interest - actual.total_interest,
        periods_saved: baseline.payoff_periods.saturating_sub(actual.payoff_periods),
    };

    let interest_to_principal = actual.total_interest / terms.principal;
    let interest_burden = INTEREST_BURDEN.interpret(interest_to_principal)?;

    Ok(SimulationResult {
        fixed_payment: level,
        periodic_rate: rate,
        scheduled_periods: periods,
        payoff_periods: actual.payoff_periods,
        total_interest: actual.total_interest,
        total_principal: actual.total_principal,
        total_extra: actual.total_extra,
        total_paid: actual.total_paid,
        payoff_date: last_date(&actual),
        baseline: comparison,
        interest_to_principal,
        interest_burden,
        schedule: actual.entries,
    })
}

/// Summary of what an extra-payment policy buys
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtraPaymentAnalysis {
    pub fixed_payment: Money,
    pub total_extra: Money,
    pub interest_saved: Money,
    pub periods_saved: u32,
    pub years_saved: Years,
    pub payoff_periods: u32,
    pub baseline_payoff_periods: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_payoff_date: Option<NaiveDate>,
    /// Interest saved per unit of extra principal paid
    pub savings_per_extra: Ratio,
    pub efficiency: Interpretation,
    pub total_interest: Money,
    pub baseline_total_interest: Money,
}

/// Extra-payments calculator: how much interest and time an extra-payment
/// policy saves.
pub fn analyze_extra_payments(
    terms: &LoanTerms,
) -> CalcResult<ComputationOutput<ExtraPaymentAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if terms.extra_payment.as_ref().map_or(true, |e| e.amount.is_zero()) {
        warnings.push("No extra payment supplied; savings are zero".into());
    }

    let sim = run_simulation(terms, &mut warnings)?;
    let ppy = Decimal::from(terms.frequency.periods_per_year());

    let savings_per_extra = if sim.total_extra.is_zero() {
        Decimal::ZERO
    } else {
        sim.baseline.interest_saved / sim.total_extra
    };
    let efficiency = EXTRA_PAYMENT_EFFICIENCY.interpret(savings_per_extra)?;

    let output = ExtraPaymentAnalysis {
        fixed_payment: sim.fixed_payment,
        total_extra: sim.total_extra,
        interest_saved: sim.baseline.interest_saved,
        periods_saved: sim.baseline.periods_saved,
        years_saved: Decimal::from(sim.baseline.periods_saved) / ppy,
        payoff_periods: sim.payoff_periods,
        baseline_payoff_periods: sim.baseline.baseline_payoff_periods,
        payoff_date: sim.payoff_date,
        baseline_payoff_date: sim.baseline.baseline_payoff_date,
        savings_per_extra,
        efficiency,
        total_interest: sim.total_interest,
        baseline_total_interest: sim.baseline.baseline_total_interest,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Extra principal payment savings versus level-payment baseline",
        terms,
        warnings,
        elapsed,
        output,
    ))
}
