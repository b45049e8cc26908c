//! Descriptive statistics over small numeric samples.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Round half-up (`floor(x + 0.5)`), the rounding used for every
/// displayed figure.
pub fn round_half_up(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    (value + 0.5).floor() as i64
}

/// Round half-up and clamp at zero, for counts and money.
pub fn round_unsigned(value: f64) -> u64 {
    round_half_up(value).max(0) as u64
}

/// Arithmetic mean; `0.0` for an empty sample.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation, `sqrt(mean((x - mean)^2))`.
pub fn standard_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Pearson product-moment correlation coefficient.
///
/// Only the first `min(xs.len(), ys.len())` pairs are used. Returns `0.0`
/// when either side has zero variance or there are no pairs.
pub fn pearson_correlation(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return 0.0;
    }

    let (xs, ys) = (&xs[..n], &ys[..n]);
    let (mean_x, mean_y) = (mean(xs), mean(ys));

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mean_x, y - mean_y);
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if negligible(var_x, xs) || negligible(var_y, ys) {
        return 0.0;
    }

    let r = covariance / (var_x * var_y).sqrt();
    if r.is_finite() {
        r
    } else {
        0.0
    }
}

/// Spread that is only rounding error relative to the magnitude of the
/// values, as left behind by constant fractional input.
fn negligible(spread: f64, values: &[f64]) -> bool {
    let magnitude: f64 = values.iter().map(|v| v * v).sum();
    spread <= f64::EPSILON * magnitude
}

/// Strength band of a correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationStrength::Weak => write!(f, "weak"),
            CorrelationStrength::Moderate => write!(f, "moderate"),
            CorrelationStrength::Strong => write!(f, "strong"),
        }
    }
}

/// Direction of a correlation coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

impl fmt::Display for CorrelationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationDirection::Positive => write!(f, "positive"),
            CorrelationDirection::Negative => write!(f, "negative"),
        }
    }
}

/// A coefficient together with its narrative classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationSummary {
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
}

/// Classify a coefficient: `|r| < 0.3` weak, `< 0.7` moderate, else strong.
/// Zero counts as negative.
pub fn classify_correlation(r: f64) -> CorrelationSummary {
    let magnitude = r.abs();
    let strength = if magnitude < 0.3 {
        CorrelationStrength::Weak
    } else if magnitude < 0.7 {
        CorrelationStrength::Moderate
    } else {
        CorrelationStrength::Strong
    };
    let direction = if r > 0.0 {
        CorrelationDirection::Positive
    } else {
        CorrelationDirection::Negative
    };

    CorrelationSummary {
        coefficient: r,
        strength,
        direction,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3);
        assert_eq!(round_half_up(2.4), 2);
        assert_eq!(round_half_up(-2.5), -2);
        assert_eq!(round_half_up(f64::NAN), 0);
        assert_eq!(round_unsigned(-7.0), 0);
    }

    #[test]
    fn test_standard_deviation() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((standard_deviation(&values) - 2.0).abs() < 1e-12);
        assert_eq!(standard_deviation(&[]), 0.0);
        assert_eq!(standard_deviation(&[42.0]), 0.0);
    }

    #[test]
    fn test_self_correlation_is_one() {
        let xs = [25.0, 31.0, 47.0, 36.0, 50.0];
        assert!((pearson_correlation(&xs, &xs) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverse_correlation() {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [8.0, 6.0, 4.0, 2.0];
        assert!((pearson_correlation(&xs, &ys) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_variance_correlation() {
        let constant = [5.0, 5.0, 5.0, 5.0];
        let other = [1.0, 9.0, 3.0, 7.0];
        assert_eq!(pearson_correlation(&constant, &other), 0.0);
        assert_eq!(pearson_correlation(&other, &constant), 0.0);
        assert_eq!(pearson_correlation(&[], &[]), 0.0);
    }

    #[test]
    fn test_fractional_constant_correlation() {
        let constant = [0.1; 7];
        let other = [1.0, 5.0, 2.0, 8.0, 3.0, 9.0, 4.0];
        assert_eq!(pearson_correlation(&constant, &other), 0.0);
        assert_eq!(pearson_correlation(&other, &constant), 0.0);
    }

    #[test]
    fn test_classify_correlation() {
        let weak = classify_correlation(-0.04);
        assert_eq!(weak.strength, CorrelationStrength::Weak);
        assert_eq!(weak.direction, CorrelationDirection::Negative);

        let moderate = classify_correlation(0.5);
        assert_eq!(moderate.strength, CorrelationStrength::Moderate);
        assert_eq!(moderate.direction, CorrelationDirection::Positive);

        assert_eq!(
            classify_correlation(-0.7).strength,
            CorrelationStrength::Strong
        );
        assert_eq!(
            classify_correlation(0.0).direction,
            CorrelationDirection::Negative
        );
    }
}
