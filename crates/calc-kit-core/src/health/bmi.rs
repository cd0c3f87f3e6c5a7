use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::CalcError;
use crate::interpret::{Interpretation, BMI_CATEGORY};
use crate::types::*;
use crate::CalcResult;

const KG_PER_LB: Decimal = dec!(0.45359237);
const CM_PER_INCH: Decimal = dec!(2.54);
const HEALTHY_BMI_LOW: Decimal = dec!(18.5);
const HEALTHY_BMI_HIGH: Decimal = dec!(24.9);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSystem {
    /// Kilograms and centimetres
    #[default]
    Metric,
    /// Pounds and inches
    Imperial,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmiInput {
    pub weight: Decimal,
    pub height: Decimal,
    #[serde(default)]
    pub units: UnitSystem,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BmiOutput {
    pub bmi: Decimal,
    pub weight_kg: Decimal,
    pub height_m: Decimal,
    /// Healthy weight range for this height, in the input's weight unit
    pub healthy_weight_min: Decimal,
    pub healthy_weight_max: Decimal,
    pub category: Interpretation,
}

pub fn calculate_bmi(input: &BmiInput) -> CalcResult<ComputationOutput<BmiOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.weight <= Decimal::ZERO {
        return Err(CalcError::invalid("weight", "Weight must be positive"));
    }
    if input.height <= Decimal::ZERO {
        return Err(CalcError::invalid("height", "Height must be positive"));
    }

    let (weight_kg, height_m) = match input.units {
        UnitSystem::Metric => (input.weight, input.height / dec!(100)),
        UnitSystem::Imperial => (
            input.weight * KG_PER_LB,
            input.height * CM_PER_INCH / dec!(100),
        ),
    };

    if height_m < dec!(0.5) || height_m > dec!(2.8) {
        warnings.push(format!(
            "Height of {} m is outside the adult range the BMI categories assume",
            height_m.round_dp(2)
        ));
    }

    let height_sq = height_m
        .checked_mul(height_m)
        .ok_or_else(|| CalcError::overflow("height", "height squared"))?;
    if height_sq.is_zero() {
        return Err(CalcError::DivisionByZero {
            context: "BMI: height squared rounds to zero".into(),
        });
    }
    let bmi = weight_kg
        .checked_div(height_sq)
        .ok_or_else(|| CalcError::overflow("weight", "BMI"))?;
    let healthy_kg = |bmi_bound: Decimal| {
        bmi_bound
            .checked_mul(height_sq)
            .ok_or_else(|| CalcError::overflow("height", "healthy weight range"))
    };

    let to_input_unit = |kg: Decimal| match input.units {
        UnitSystem::Metric => kg,
        UnitSystem::Imperial => kg / KG_PER_LB,
    };

    let output = BmiOutput {
        bmi,
        weight_kg,
        height_m,
        healthy_weight_min: to_input_unit(healthy_kg(HEALTHY_BMI_LOW)?),
        healthy_weight_max: to_input_unit(healthy_kg(HEALTHY_BMI_HIGH)?),
        category: BMI_CATEGORY.interpret(bmi)?,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Body-mass index (weight / height squared), WHO adult categories",
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

    #[test]
    fn test_metric_normal_weight() {
        let out = calculate_bmi(&BmiInput {
            weight: dec!(70),
            height: dec!(175),
            units: UnitSystem::Metric,
        })
        .unwrap()
        .result;
        assert_eq!(out.bmi.round_dp(2), dec!(22.86));
        assert_eq!(out.category.label, "Normal Weight");
        assert_eq!(out.healthy_weight_min.round_dp(2), dec!(56.66));
    }

    #[test]
    fn test_imperial_matches_metric() {
        let out = calculate_bmi(&BmiInput {
            weight: dec!(220),
            height: dec!(70),
            units: UnitSystem::Imperial,
        })
        .unwrap()
        .result;
        assert_eq!(out.bmi.round_dp(1), dec!(31.6));
        assert_eq!(out.category.label, "Obese (Class I)");
    }

    #[test]
    fn test_vanishing_height_is_error_not_panic() {
        let out = calculate_bmi(&BmiInput {
            weight: dec!(70),
            height: dec!(0.00000000000001),
            units: UnitSystem::Metric,
        });
        assert!(matches!(out, Err(CalcError::DivisionByZero { .. })));
    }

    #[test]
    fn test_rejects_non_positive() {
        assert!(calculate_bmi(&BmiInput {
            weight: Decimal::ZERO,
            height: dec!(170),
            units: UnitSystem::Metric,
        })
        .is_err());
    }
}
