//! Decimal math helpers (no f64 in computational paths).
//!
//! Exponentials and logarithms come from `rust_decimal`'s `MathematicalOps`
//! in their checked form. The square root is a bounded Newton iteration and
//! the normal CDF is the Abramowitz-Stegun polynomial. The sample statistics
//! use checked arithmetic so extreme series surface as errors.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::error::CalcError;
use crate::CalcResult;

const SQRT_TWO_PI: Decimal = dec!(2.5066282746310005024157652848);
const SQRT_TOLERANCE: Decimal = dec!(0.0000000000000001);

/// Exponent magnitude beyond which `exp_decimal` saturates.
const EXP_CEILING: Decimal = dec!(60);

/// Newton's method square root, stops once successive guesses agree.
pub fn sqrt_decimal(x: Decimal) -> Decimal {
    if x <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    if x == Decimal::ONE {
        return Decimal::ONE;
    }
    let mut guess = if x > dec!(100) {
        dec!(10)
    } else if x < dec!(0.01) {
        dec!(0.1)
    } else {
        x / dec!(2)
    };
    for _ in 0..100 {
        let next = (guess + x / guess) / dec!(2);
        if (next - guess).abs() < SQRT_TOLERANCE {
            return next;
        }
        guess = next;
    }
    guess
}

/// exp(x), saturating to 0 below -60 and clamped at exp(60) above.
pub fn exp_decimal(x: Decimal) -> Decimal {
    if x < -EXP_CEILING {
        return Decimal::ZERO;
    }
    x.min(EXP_CEILING).checked_exp().unwrap_or(Decimal::MAX)
}

/// Natural logarithm for x > 0.
pub fn ln_decimal(x: Decimal) -> CalcResult<Decimal> {
    if x <= Decimal::ZERO {
        return Err(CalcError::invalid(
            "ln argument",
            format!("logarithm undefined for {x}"),
        ));
    }
    if x == Decimal::ONE {
        return Ok(Decimal::ZERO);
    }
    x.checked_ln()
        .ok_or_else(|| CalcError::overflow("ln argument", "natural logarithm"))
}

/// Standard normal PDF: phi(x) = exp(-x^2/2) / sqrt(2*pi)
pub fn norm_pdf(x: Decimal) -> Decimal {
    exp_decimal(-(x * x) / dec!(2)) / SQRT_TWO_PI
}

/// Standard normal CDF, Abramowitz & Stegun 26.2.17 (|error| < 7.5e-8).
pub fn norm_cdf(x: Decimal) -> Decimal {
    if x > dec!(10) {
        return Decimal::ONE;
    }
    if x < dec!(-10) {
        return Decimal::ZERO;
    }

    let b1 = dec!(0.319381530);
    let b2 = dec!(-0.356563782);
    let b3 = dec!(1.781477937);
    let b4 = dec!(-1.821255978);
    let b5 = dec!(1.330274429);
    let p = dec!(0.2316419);

    let abs_x = x.abs();
    let t = Decimal::ONE / (Decimal::ONE + p * abs_x);
    let poly = t * (b1 + t * (b2 + t * (b3 + t * (b4 + t * b5))));
    let upper = Decimal::ONE - norm_pdf(abs_x) * poly;

    if x < Decimal::ZERO {
        Decimal::ONE - upper
    } else {
        upper
    }
}

/// Arithmetic mean; zero for an empty slice.
pub fn mean(values: &[Decimal]) -> CalcResult<Decimal> {
    if values.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let sum = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))
        .ok_or_else(|| CalcError::overflow("series", "sum"))?;
    Ok(sum / Decimal::from(values.len() as u64))
}

/// Sample covariance (n - 1 denominator). Callers guarantee equal lengths >= 2.
pub fn sample_covariance(x: &[Decimal], y: &[Decimal]) -> CalcResult<Decimal> {
    let n = x.len().min(y.len());
    if n < 2 {
        return Ok(Decimal::ZERO);
    }
    let mx = mean(&x[..n])?;
    let my = mean(&y[..n])?;
    let sum = x
        .iter()
        .zip(y.iter())
        .try_fold(Decimal::ZERO, |acc, (a, b)| {
            let product = a.checked_sub(mx)?.checked_mul(b.checked_sub(my)?)?;
            acc.checked_add(product)
        })
        .ok_or_else(|| CalcError::overflow("series", "sum of squared deviations"))?;
    Ok(sum / Decimal::from((n - 1) as u64))
}

/// Sample variance (n - 1 denominator).
pub fn sample_variance(values: &[Decimal]) -> CalcResult<Decimal> {
    sample_covariance(values, values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sqrt_perfect_square() {
        assert!((sqrt_decimal(dec!(144)) - dec!(12)).abs() < dec!(0.0000001));
        assert_eq!(sqrt_decimal(dec!(-4)), Decimal::ZERO);
    }

    #[test]
    fn test_exp_and_ln_are_inverse() {
        let x = dec!(1.75);
        let back = ln_decimal(exp_decimal(x)).unwrap();
        assert!((back - x).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_ln_known_values() {
        assert!((ln_decimal(dec!(10)).unwrap() - dec!(2.302585093)).abs() < dec!(0.000001));
        assert!((ln_decimal(dec!(0.25)).unwrap() + dec!(1.386294361)).abs() < dec!(0.000001));
        assert!(ln_decimal(Decimal::ZERO).is_err());
    }

    #[test]
    fn test_exp_saturates_instead_of_overflowing() {
        assert!(exp_decimal(dec!(500)) > dec!(100000000000000000000));
    }

    #[test]
    fn test_norm_cdf_symmetry() {
        assert!((norm_cdf(Decimal::ZERO) - dec!(0.5)).abs() < dec!(0.0000001));
        let a = norm_cdf(dec!(1.2));
        let b = norm_cdf(dec!(-1.2));
        assert!((a + b - Decimal::ONE).abs() < dec!(0.0000001));
        assert!((norm_cdf(dec!(1.96)) - dec!(0.975)).abs() < dec!(0.0001));
    }

    #[test]
    fn test_sample_statistics() {
        let xs = [dec!(2), dec!(4), dec!(4), dec!(4), dec!(5), dec!(5), dec!(7), dec!(9)];
        assert_eq!(mean(&xs).unwrap(), dec!(5));
        // Sum of squared deviations = 32, n - 1 = 7
        assert_eq!(sample_variance(&xs).unwrap(), dec!(32) / dec!(7));
    }

    #[test]
    fn test_huge_deviations_are_errors() {
        let xs = [Decimal::ZERO, dec!(1000000000000000), dec!(2000000000000000)];
        assert!(matches!(
            sample_variance(&xs),
            Err(CalcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_exp_saturates_below() {
        assert_eq!(exp_decimal(dec!(-500)), Decimal::ZERO);
    }
}
