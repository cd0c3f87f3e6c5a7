use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use calc_kit_core::investing::correlation::{self, BetaInput, CorrelationInput};
use calc_kit_core::investing::kelly::{self, KellyInput};
use calc_kit_core::investing::options_probability::{
    self, OptionProbabilityInput, OptionType,
};

use super::load_input;

const DAYS_PER_YEAR: Decimal = dec!(365);

/// Arguments for Kelly criterion position sizing
#[derive(Args)]
pub struct KellyArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Probability of a winning outcome (0 to 1)
    #[arg(long)]
    pub win_prob: Option<Decimal>,

    /// Average amount won on a winning outcome
    #[arg(long)]
    pub avg_win: Option<Decimal>,

    /// Average amount lost on a losing outcome
    #[arg(long)]
    pub avg_loss: Option<Decimal>,

    /// Kelly fraction (0 to 1, e.g. 0.5 for half-Kelly)
    #[arg(long)]
    pub fraction: Option<Decimal>,

    /// Bankroll for monetary sizing
    #[arg(long)]
    pub bankroll: Option<Decimal>,
}

/// Arguments for Pearson correlation
#[derive(Args)]
pub struct CorrelationArgs {
    /// Path to JSON/YAML input file with `x` and `y` arrays
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated first series (e.g. "1,2,3")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub x: Option<Vec<Decimal>>,

    /// Comma-separated second series, same length as --x
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub y: Option<Vec<Decimal>>,
}

/// Arguments for beta against a market series
#[derive(Args)]
pub struct BetaArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated periodic asset returns (e.g. "0.02,-0.01,0.03")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub asset: Option<Vec<Decimal>>,

    /// Comma-separated periodic market returns over the same periods
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub market: Option<Vec<Decimal>>,
}

/// Arguments for option expiry probabilities
#[derive(Args)]
pub struct OptionProbabilityArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Current price of the underlying
    #[arg(long)]
    pub spot: Option<Decimal>,

    /// Strike price
    #[arg(long)]
    pub strike: Option<Decimal>,

    /// Days until expiry
    #[arg(long, conflicts_with = "years")]
    pub days: Option<u32>,

    /// Years until expiry
    #[arg(long)]
    pub years: Option<Decimal>,

    /// Annualised implied volatility (0.25 = 25%)
    #[arg(long)]
    pub volatility: Option<Decimal>,

    /// Risk-free rate (annualised)
    #[arg(long, default_value = "0")]
    pub risk_free_rate: Decimal,

    /// Continuous dividend yield
    #[arg(long, default_value = "0")]
    pub dividend_yield: Decimal,

    /// Price a put instead of a call
    #[arg(long)]
    pub put: bool,
}

pub fn run_kelly(args: KellyArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: KellyInput = load_input(
        args.input.as_deref(),
        || {
            Ok(match (args.win_prob, args.avg_win, args.avg_loss) {
                (Some(win_probability), Some(average_win), Some(average_loss)) => {
                    Some(KellyInput {
                        win_probability,
                        average_win,
                        average_loss,
                        kelly_fraction: args.fraction,
                        bankroll: args.bankroll,
                    })
                }
                _ => None,
            })
        },
        "--win-prob, --avg-win and --avg-loss",
    )?;
    let result = kelly::calculate_kelly(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_correlation(args: CorrelationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: CorrelationInput = load_input(
        args.input.as_deref(),
        || {
            Ok(match (args.x, args.y) {
                (Some(x), Some(y)) => Some(CorrelationInput { x, y }),
                _ => None,
            })
        },
        "--x and --y",
    )?;
    let result = correlation::calculate_correlation(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_beta(args: BetaArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: BetaInput = load_input(
        args.input.as_deref(),
        || {
            Ok(match (args.asset, args.market) {
                (Some(asset_returns), Some(market_returns)) => Some(BetaInput {
                    asset_returns,
                    market_returns,
                }),
                _ => None,
            })
        },
        "--asset and --market",
    )?;
    let result = correlation::calculate_beta(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_option_probability(
    args: OptionProbabilityArgs,
) -> Result<Value, Box<dyn std::error::Error>> {
    let time_to_expiry = match (args.years, args.days) {
        (Some(years), _) => Some(years),
        (None, Some(days)) => Some(Decimal::from(days) / DAYS_PER_YEAR),
        (None, None) => None,
    };
    let input: OptionProbabilityInput = load_input(
        args.input.as_deref(),
        || {
            Ok(match (args.spot, args.strike, time_to_expiry, args.volatility) {
                (Some(spot_price), Some(strike_price), Some(time_to_expiry), Some(volatility)) => {
                    Some(OptionProbabilityInput {
                        spot_price,
                        strike_price,
                        time_to_expiry,
                        volatility,
                        risk_free_rate: args.risk_free_rate,
                        dividend_yield: args.dividend_yield,
                        option_type: if args.put {
                            OptionType::Put
                        } else {
                            OptionType::Call
                        },
                    })
                }
                _ => None,
            })
        },
        "--spot, --strike, --days or --years, and --volatility",
    )?;
    let result = options_probability::calculate_option_probability(&input)?;
    Ok(serde_json::to_value(result)?)
}
