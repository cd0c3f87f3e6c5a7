mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::health::BmiArgs;
use commands::investing::{BetaArgs, CorrelationArgs, KellyArgs, OptionProbabilityArgs};
use commands::loan::{AmortizeArgs, BalloonArgs, MortgageArgs, PaymentArgs};

/// Loan, investing and health calculators with decimal precision
#[derive(Parser)]
#[command(
    name = "calck",
    version,
    about = "Loan, investing and health calculators with decimal precision",
    long_about = "A CLI for everyday calculators: loan payments, amortization schedules \
                  with extra payments, mortgages, balloon loans, Kelly sizing, correlation \
                  and beta, option probabilities and BMI. Every result carries an \
                  interpretation, warnings and the assumptions used."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true, env = "CALCK_OUTPUT")]
    output: OutputFormat,

    /// Log debug detail to stderr
    #[arg(long, short, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Level payment for a fully amortizing loan
    Payment(PaymentArgs),
    /// Full amortization schedule, with optional extra payments
    Amortize(AmortizeArgs),
    /// Interest and time saved by an extra-payment policy
    ExtraPayments(AmortizeArgs),
    /// Monthly mortgage cost including tax, insurance, HOA and PMI
    Mortgage(MortgageArgs),
    /// Regular payment and balloon amount for a balloon loan
    Balloon(BalloonArgs),
    /// Kelly criterion position sizing
    Kelly(KellyArgs),
    /// Pearson correlation between two series
    Correlation(CorrelationArgs),
    /// Beta of an asset against market returns
    Beta(BetaArgs),
    /// Probability an option finishes in the money
    OptionProbability(OptionProbabilityArgs),
    /// Body-mass index and healthy weight range
    Bmi(BmiArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(cli: &Cli) {
    let default_filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::loan::run_payment(args),
        Commands::Amortize(args) => commands::loan::run_amortize(args),
        Commands::ExtraPayments(args) => commands::loan::run_extra_payments(args),
        Commands::Mortgage(args) => commands::loan::run_mortgage(args),
        Commands::Balloon(args) => commands::loan::run_balloon(args),
        Commands::Kelly(args) => commands::investing::run_kelly(args),
        Commands::Correlation(args) => commands::investing::run_correlation(args),
        Commands::Beta(args) => commands::investing::run_beta(args),
        Commands::OptionProbability(args) => commands::investing::run_option_probability(args),
        Commands::Bmi(args) => commands::health::run_bmi(args),
        Commands::Version => {
            println!("calck {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
