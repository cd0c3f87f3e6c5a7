//! Threshold-table interpretation of calculator results.
//!
//! A [`ThresholdTable`] is an ordered list of [`Band`]s declared by inclusive
//! lower bound, highest first. Evaluation walks the bands top-down and the
//! first band whose bound is at or below the value wins. The last band has no
//! bound and catches everything else, so a well-formed table covers the whole
//! real line.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::CalcResult;

/// Severity tier of an interpreted result, ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Positive,
    Neutral,
    Caution,
    Warning,
    Critical,
}

impl Severity {
    /// Display colour conventionally used for this tier.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Positive => "green",
            Self::Neutral => "blue",
            Self::Caution => "yellow",
            Self::Warning => "orange",
            Self::Critical => "red",
        }
    }
}

/// One band of a threshold table.
#[derive(Debug, Clone, Copy)]
pub struct Band {
    /// Inclusive lower bound; `None` marks the catch-all band.
    pub at_least: Option<Decimal>,
    pub label: &'static str,
    pub severity: Severity,
    pub guidance: &'static str,
}

#[derive(Debug, Clone, Copy)]
pub struct ThresholdTable {
    pub name: &'static str,
    pub bands: &'static [Band],
}

/// Result of interpreting a value against a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    pub label: String,
    pub severity: Severity,
    pub color: String,
    pub guidance: String,
}

impl ThresholdTable {
    pub const fn new(name: &'static str, bands: &'static [Band]) -> Self {
        Self { name, bands }
    }

    /// Check that bounds strictly descend and the table ends in a catch-all.
    pub fn validate(&self) -> CalcResult<()> {
        let Some((last, rest)) = self.bands.split_last() else {
            return Err(CalcError::invalid(self.name, "threshold table has no bands"));
        };
        if last.at_least.is_some() {
            return Err(CalcError::invalid(
                self.name,
                "last band must be a catch-all (no lower bound)",
            ));
        }

        let mut previous: Option<Decimal> = None;
        for band in rest {
            let Some(bound) = band.at_least else {
                return Err(CalcError::invalid(
                    self.name,
                    format!("band '{}' is a catch-all before the end of the table", band.label),
                ));
            };
            if let Some(prev) = previous {
                if bound >= prev {
                    return Err(CalcError::invalid(
                        self.name,
                        format!("band '{}' bound {bound} does not descend below {prev}", band.label),
                    ));
                }
            }
            previous = Some(bound);
        }
        Ok(())
    }

    /// Classify `value`: the first band (top-down) whose lower bound is met wins.
    pub fn interpret(&self, value: Decimal) -> CalcResult<Interpretation> {
        self.bands
            .iter()
            .find(|band| band.at_least.map_or(true, |bound| value >= bound))
            .map(|band| Interpretation {
                label: band.label.to_string(),
                severity: band.severity,
                color: band.severity.color().to_string(),
                guidance: band.guidance.to_string(),
            })
            .ok_or_else(|| CalcError::UnclassifiedValue {
                table: self.name.to_string(),
                value,
            })
    }
}

// ---------------------------------------------------------------------------
// Built-in tables
// ---------------------------------------------------------------------------

/// Full-Kelly fraction of bankroll.
pub const KELLY_RISK: ThresholdTable = ThresholdTable::new(
    "kelly_risk",
    &[
        Band {
            at_least: Some(dec!(0.25)),
            label: "Very Aggressive",
            severity: Severity::Critical,
            guidance: "Full Kelly stakes above 25% produce severe drawdowns; size at half or quarter Kelly.",
        },
        Band {
            at_least: Some(dec!(0.10)),
            label: "Aggressive",
            severity: Severity::Warning,
            guidance: "Meaningful edge, but estimation error in the inputs can flip it; consider fractional Kelly.",
        },
        Band {
            at_least: Some(dec!(0.05)),
            label: "Moderate",
            severity: Severity::Caution,
            guidance: "A measured stake; volatility remains noticeable over short runs.",
        },
        Band {
            at_least: Some(dec!(0.0000000001)),
            label: "Conservative",
            severity: Severity::Positive,
            guidance: "Small positive edge; stakes stay small relative to bankroll.",
        },
        Band {
            at_least: None,
            label: "No Edge",
            severity: Severity::Neutral,
            guidance: "Expected value is zero or negative; Kelly recommends no position.",
        },
    ],
);

/// Absolute Pearson correlation |r|.
pub const CORRELATION_STRENGTH: ThresholdTable = ThresholdTable::new(
    "correlation_strength",
    &[
        Band {
            at_least: Some(dec!(0.9)),
            label: "Very Strong",
            severity: Severity::Positive,
            guidance: "The series move almost in lockstep.",
        },
        Band {
            at_least: Some(dec!(0.7)),
            label: "Strong",
            severity: Severity::Positive,
            guidance: "A clear linear relationship.",
        },
        Band {
            at_least: Some(dec!(0.5)),
            label: "Moderate",
            severity: Severity::Neutral,
            guidance: "A noticeable but noisy linear relationship.",
        },
        Band {
            at_least: Some(dec!(0.3)),
            label: "Weak",
            severity: Severity::Caution,
            guidance: "Only a loose linear relationship.",
        },
        Band {
            at_least: None,
            label: "Negligible",
            severity: Severity::Warning,
            guidance: "No meaningful linear relationship between the series.",
        },
    ],
);

/// Asset beta against its market.
pub const BETA_VOLATILITY: ThresholdTable = ThresholdTable::new(
    "beta_volatility",
    &[
        Band {
            at_least: Some(dec!(1.5)),
            label: "Highly Volatile",
            severity: Severity::Critical,
            guidance: "Amplifies market moves by half again or more.",
        },
        Band {
            at_least: Some(dec!(1.1)),
            label: "More Volatile Than Market",
            severity: Severity::Warning,
            guidance: "Tends to rise and fall more than the market.",
        },
        Band {
            at_least: Some(dec!(0.9)),
            label: "Market-Like",
            severity: Severity::Neutral,
            guidance: "Moves roughly in line with the market.",
        },
        Band {
            at_least: Some(dec!(0)),
            label: "Less Volatile Than Market",
            severity: Severity::Positive,
            guidance: "Dampens market moves; defensive exposure.",
        },
        Band {
            at_least: None,
            label: "Inverse",
            severity: Severity::Caution,
            guidance: "Tends to move against the market; useful as a hedge.",
        },
    ],
);

/// Probability of an option finishing in the money.
pub const OPTION_LIKELIHOOD: ThresholdTable = ThresholdTable::new(
    "option_likelihood",
    &[
        Band {
            at_least: Some(dec!(0.8)),
            label: "Very Likely",
            severity: Severity::Positive,
            guidance: "Deep in the money relative to expected volatility.",
        },
        Band {
            at_least: Some(dec!(0.6)),
            label: "Likely",
            severity: Severity::Positive,
            guidance: "Better-than-even odds of finishing in the money.",
        },
        Band {
            at_least: Some(dec!(0.4)),
            label: "Coin Flip",
            severity: Severity::Neutral,
            guidance: "Near the money; outcome is close to even odds.",
        },
        Band {
            at_least: Some(dec!(0.2)),
            label: "Unlikely",
            severity: Severity::Caution,
            guidance: "The underlying must move materially to finish in the money.",
        },
        Band {
            at_least: None,
            label: "Very Unlikely",
            severity: Severity::Warning,
            guidance: "Far out of the money for the time remaining.",
        },
    ],
);

/// Total interest divided by principal over the life of a loan.
pub const INTEREST_BURDEN: ThresholdTable = ThresholdTable::new(
    "interest_burden",
    &[
        Band {
            at_least: Some(dec!(1.0)),
            label: "Very High",
            severity: Severity::Critical,
            guidance: "Interest exceeds the amount borrowed; shorter terms or extra payments cut this sharply.",
        },
        Band {
            at_least: Some(dec!(0.5)),
            label: "High",
            severity: Severity::Warning,
            guidance: "Interest adds at least half the principal; compare shorter terms.",
        },
        Band {
            at_least: Some(dec!(0.2)),
            label: "Moderate",
            severity: Severity::Caution,
            guidance: "A typical cost of borrowing for medium-length terms.",
        },
        Band {
            at_least: None,
            label: "Low",
            severity: Severity::Positive,
            guidance: "Borrowing cost is small relative to the principal.",
        },
    ],
);

/// Interest saved per unit of extra principal paid.
pub const EXTRA_PAYMENT_EFFICIENCY: ThresholdTable = ThresholdTable::new(
    "extra_payment_efficiency",
    &[
        Band {
            at_least: Some(dec!(1.0)),
            label: "Excellent",
            severity: Severity::Positive,
            guidance: "Every extra dollar saves at least a dollar of interest.",
        },
        Band {
            at_least: Some(dec!(0.5)),
            label: "Good",
            severity: Severity::Positive,
            guidance: "Extra payments return a strong guaranteed saving.",
        },
        Band {
            at_least: Some(dec!(0.2)),
            label: "Fair",
            severity: Severity::Neutral,
            guidance: "Savings are real but compare them with other uses of the cash.",
        },
        Band {
            at_least: Some(dec!(0.0000000001)),
            label: "Low",
            severity: Severity::Caution,
            guidance: "Little interest remains to be saved at this point in the loan.",
        },
        Band {
            at_least: None,
            label: "None",
            severity: Severity::Neutral,
            guidance: "No extra payments applied.",
        },
    ],
);

/// Body-mass index, WHO adult categories.
pub const BMI_CATEGORY: ThresholdTable = ThresholdTable::new(
    "bmi_category",
    &[
        Band {
            at_least: Some(dec!(40)),
            label: "Obese (Class III)",
            severity: Severity::Critical,
            guidance: "Discuss weight-related health risks with a clinician.",
        },
        Band {
            at_least: Some(dec!(35)),
            label: "Obese (Class II)",
            severity: Severity::Critical,
            guidance: "Elevated risk of weight-related conditions.",
        },
        Band {
            at_least: Some(dec!(30)),
            label: "Obese (Class I)",
            severity: Severity::Warning,
            guidance: "Gradual, sustained weight reduction lowers health risks.",
        },
        Band {
            at_least: Some(dec!(25)),
            label: "Overweight",
            severity: Severity::Caution,
            guidance: "Above the healthy range for this height.",
        },
        Band {
            at_least: Some(dec!(18.5)),
            label: "Normal Weight",
            severity: Severity::Positive,
            guidance: "Within the healthy range for this height.",
        },
        Band {
            at_least: None,
            label: "Underweight",
            severity: Severity::Caution,
            guidance: "Below the healthy range for this height.",
        },
    ],
);

/// Every built-in table, for validation and listing.
pub const BUILT_IN_TABLES: &[ThresholdTable] = &[
    KELLY_RISK,
    CORRELATION_STRENGTH,
    BETA_VOLATILITY,
    OPTION_LIKELIHOOD,
    INTEREST_BURDEN,
    EXTRA_PAYMENT_EFFICIENCY,
    BMI_CATEGORY,
];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_built_in_tables_are_well_formed() {
        for table in BUILT_IN_TABLES {
            table.validate().unwrap();
        }
    }

    #[test]
    fn test_first_matching_band_wins() {
        let result = BMI_CATEGORY.interpret(dec!(27.3)).unwrap();
        assert_eq!(result.label, "Overweight");
        assert_eq!(result.severity, Severity::Caution);
        assert_eq!(result.color, "yellow");
    }

    #[test]
    fn test_lower_bound_is_inclusive() {
        assert_eq!(BMI_CATEGORY.interpret(dec!(18.5)).unwrap().label, "Normal Weight");
        assert_eq!(BMI_CATEGORY.interpret(dec!(18.49)).unwrap().label, "Underweight");
    }

    #[test]
    fn test_catch_all_covers_negative_values() {
        let result = BETA_VOLATILITY.interpret(dec!(-0.8)).unwrap();
        assert_eq!(result.label, "Inverse");
    }

    #[test]
    fn test_zero_kelly_is_no_edge() {
        assert_eq!(KELLY_RISK.interpret(Decimal::ZERO).unwrap().label, "No Edge");
        assert_eq!(KELLY_RISK.interpret(dec!(0.4)).unwrap().label, "Very Aggressive");
    }

    #[test]
    fn test_missing_catch_all_rejected() {
        const BROKEN: ThresholdTable = ThresholdTable::new(
            "broken",
            &[Band {
                at_least: Some(dec!(1)),
                label: "High",
                severity: Severity::Warning,
                guidance: "",
            }],
        );
        assert!(BROKEN.validate().is_err());
        assert!(matches!(
            BROKEN.interpret(dec!(0.5)),
            Err(CalcError::UnclassifiedValue { .. })
        ));
        assert_eq!(BROKEN.interpret(dec!(2)).unwrap().label, "High");
    }

    #[test]
    fn test_non_descending_bounds_rejected() {
        const UNORDERED: ThresholdTable = ThresholdTable::new(
            "unordered",
            &[
                Band {
                    at_least: Some(dec!(1)),
                    label: "A",
                    severity: Severity::Neutral,
                    guidance: "",
                },
                Band {
                    at_least: Some(dec!(2)),
                    label: "B",
                    severity: Severity::Neutral,
                    guidance: "",
                },
                Band {
                    at_least: None,
                    label: "C",
                    severity: Severity::Neutral,
                    guidance: "",
                },
            ],
        );
        assert!(UNORDERED.validate().is_err());
    }
}
