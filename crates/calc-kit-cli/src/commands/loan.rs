use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use calc_kit_core::loan::amortization::{
    self, ExtraPayment, ExtraPaymentFrequency, LoanTerms, TermUnit,
};
use calc_kit_core::loan::balloon::{self, BalloonInput};
use calc_kit_core::loan::mortgage::{self, MortgageInput};
use calc_kit_core::loan::payment::{self, PaymentFrequency, PaymentInput};

use super::load_input;

/// Arguments for the level payment calculator
#[derive(Args)]
pub struct PaymentArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a decimal (0.06 = 6%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long)]
    pub years: Option<u32>,

    /// Payment frequency: weekly, biweekly, semimonthly, monthly, quarterly, semiannual, annual
    #[arg(long, default_value = "monthly")]
    pub frequency: PaymentFrequency,
}

/// Arguments shared by the amortization and extra-payment calculators
#[derive(Args)]
pub struct AmortizeArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a decimal (0.06 = 6%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term (years unless --months is given)
    #[arg(long)]
    pub term: Option<u32>,

    /// Treat --term as a number of months
    #[arg(long)]
    pub months: bool,

    /// Payment frequency: weekly, biweekly, semimonthly, monthly, quarterly, semiannual, annual
    #[arg(long, default_value = "monthly")]
    pub frequency: PaymentFrequency,

    /// Extra principal paid on top of the scheduled payment
    #[arg(long)]
    pub extra: Option<Decimal>,

    /// When the extra payment applies: monthly, yearly, one-time
    #[arg(long, default_value = "monthly")]
    pub extra_frequency: ExtraPaymentFrequency,

    /// Date of the first payment (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Omit the period-by-period schedule from the output
    #[arg(long)]
    pub summary: bool,
}

/// Arguments for the mortgage calculator
#[derive(Args)]
pub struct MortgageArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Purchase price of the home
    #[arg(long)]
    pub home_price: Option<Decimal>,

    /// Down payment amount
    #[arg(long, default_value = "0")]
    pub down_payment: Decimal,

    /// Annual interest rate as a decimal (0.065 = 6.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value = "30")]
    pub years: u32,

    /// Annual property tax
    #[arg(long)]
    pub property_tax: Option<Decimal>,

    /// Annual home insurance premium
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Monthly HOA dues
    #[arg(long)]
    pub hoa: Option<Decimal>,

    /// Annual PMI premium as a fraction of the loan (0.005 = 0.5%)
    #[arg(long)]
    pub pmi_rate: Option<Decimal>,

    /// Extra principal paid on top of the scheduled payment
    #[arg(long)]
    pub extra: Option<Decimal>,

    /// When the extra payment applies: monthly, yearly, one-time
    #[arg(long, default_value = "monthly")]
    pub extra_frequency: ExtraPaymentFrequency,

    /// Date of the first payment (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

/// Arguments for the balloon loan calculator
#[derive(Args)]
pub struct BalloonArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate as a decimal (0.06 = 6%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Years over which the regular payment is sized
    #[arg(long, default_value = "30")]
    pub amortization_years: u32,

    /// Years after which the remaining balance falls due
    #[arg(long)]
    pub balloon_after: Option<u32>,

    /// Payment frequency
    #[arg(long, default_value = "monthly")]
    pub frequency: PaymentFrequency,
}

fn extra_payment(amount: Option<Decimal>, frequency: ExtraPaymentFrequency) -> Option<ExtraPayment> {
    amount.map(|amount| ExtraPayment { amount, frequency })
}

pub fn run_payment(args: PaymentArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: PaymentInput = load_input(
        args.input.as_deref(),
        || {
            Ok(match (args.principal, args.rate, args.years) {
                (Some(principal), Some(annual_rate), Some(term_years)) => Some(PaymentInput {
                    principal,
                    annual_rate,
                    term_years,
                    frequency: args.frequency,
                }),
                _ => None,
            })
        },
        "--principal, --rate and --years",
    )?;
    let result = payment::calculate_payment(&input)?;
    Ok(serde_json::to_value(result)?)
}

fn loan_terms(args: &AmortizeArgs) -> Result<LoanTerms, Box<dyn std::error::Error>> {
    load_input(
        args.input.as_deref(),
        || {
            Ok(match (args.principal, args.rate, args.term) {
                (Some(principal), Some(annual_rate), Some(term)) => Some(LoanTerms {
                    principal,
                    annual_rate,
                    term,
                    term_unit: if args.months {
                        TermUnit::Months
                    } else {
                        TermUnit::Years
                    },
                    frequency: args.frequency,
                    extra_payment: extra_payment(args.extra, args.extra_frequency),
                    start_date: args.start_date,
                }),
                _ => None,
            })
        },
        "--principal, --rate and --term",
    )
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = loan_terms(&args)?;
    let mut result = amortization::simulate(&terms)?;
    if args.summary {
        result.result.schedule.clear();
    }
    Ok(serde_json::to_value(result)?)
}

pub fn run_extra_payments(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let terms = loan_terms(&args)?;
    let result = amortization::analyze_extra_payments(&terms)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_mortgage(args: MortgageArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: MortgageInput = load_input(
        args.input.as_deref(),
        || {
            Ok(match (args.home_price, args.rate) {
                (Some(home_price), Some(annual_rate)) => Some(MortgageInput {
                    home_price,
                    down_payment: args.down_payment,
                    annual_rate,
                    term_years: args.years,
                    property_tax_annual: args.property_tax,
                    insurance_annual: args.insurance,
                    hoa_monthly: args.hoa,
                    pmi_rate: args.pmi_rate,
                    extra_payment: extra_payment(args.extra, args.extra_frequency),
                    start_date: args.start_date,
                }),
                _ => None,
            })
        },
        "--home-price and --rate",
    )?;
    let result = mortgage::calculate_mortgage(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_balloon(args: BalloonArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: BalloonInput = load_input(
        args.input.as_deref(),
        || {
            Ok(match (args.principal, args.rate, args.balloon_after) {
                (Some(principal), Some(annual_rate), Some(balloon_after_years)) => {
                    Some(BalloonInput {
                        principal,
                        annual_rate,
                        amortization_years: args.amortization_years,
                        balloon_after_years,
                        frequency: args.frequency,
                    })
                }
                _ => None,
            })
        },
        "--principal, --rate and --balloon-after",
    )?;
    let result = balloon::calculate_balloon(&input)?;
    Ok(serde_json::to_value(result)?)
}
