use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use calc_kit_core::health::bmi::{self, BmiInput, UnitSystem};

use super::load_input;

/// Arguments for body-mass index
#[derive(Args)]
pub struct BmiArgs {
    /// Path to JSON/YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Body weight (kg, or lb with --imperial)
    #[arg(long)]
    pub weight: Option<Decimal>,

    /// Height (cm, or inches with --imperial)
    #[arg(long)]
    pub height: Option<Decimal>,

    /// Interpret weight and height as pounds and inches
    #[arg(long)]
    pub imperial: bool,
}

pub fn run_bmi(args: BmiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let input: BmiInput = load_input(
        args.input.as_deref(),
        || {
            Ok(match (args.weight, args.height) {
                (Some(weight), Some(height)) => Some(BmiInput {
                    weight,
                    height,
                    units: if args.imperial {
                        UnitSystem::Imperial
                    } else {
                        UnitSystem::Metric
                    },
                }),
                _ => None,
            })
        },
        "--weight and --height",
    )?;
    let result = bmi::calculate_bmi(&input)?;
    Ok(serde_json::to_value(result)?)
}
