//! Descriptive statistics over price samples.
//!
//! Conventions follow pandas / scipy: the standard deviation is the sample
//! one (ddof = 1), the standard error of the mean divides it by `sqrt(n)`,
//! and rounding for reports is half-to-even at two decimals.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, Normal, StudentsT};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("cannot compute statistics of an empty sample")]
    Empty,
    #[error("samples differ in length ({x} vs {y})")]
    LengthMismatch { x: usize, y: usize },
    #[error("need at least {needed} observations, got {got}")]
    TooFewSamples { needed: usize, got: usize },
    #[error("correlation is undefined for a constant input")]
    ConstantInput,
    #[error("correlation is undefined for non-finite input")]
    NonFinite,
    #[error("confidence level must lie in (0, 1), got {0}")]
    InvalidConfidence(f64),
    #[error("distribution error: {0}")]
    Distribution(String),
}

pub type Result<T> = std::result::Result<T, StatsError>;

pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(StatsError::Empty);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Middle value; the average of the two middle values for an even count.
pub fn median(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(StatsError::Empty);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Ok((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Ok(sorted[mid])
    }
}

/// Sample standard deviation (ddof = 1). `None` below two observations.
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values).ok()?;
    let sum_sq: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Some((sum_sq / (values.len() - 1) as f64).sqrt())
}

/// Standard error of the mean.
pub fn sem(values: &[f64]) -> Option<f64> {
    std_dev(values).map(|s| s / (values.len() as f64).sqrt())
}

pub fn min(values: &[f64]) -> Result<f64> {
    values
        .iter()
        .copied()
        .min_by(|a, b| a.total_cmp(b))
        .ok_or(StatsError::Empty)
}

pub fn max(values: &[f64]) -> Result<f64> {
    values
        .iter()
        .copied()
        .max_by(|a, b| a.total_cmp(b))
        .ok_or(StatsError::Empty)
}

/// Round to two decimals, ties to even.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

/// Two-sided interval of a normal distribution centred at `loc` holding
/// `confidence` of its mass: `loc ± z * scale`.
pub fn normal_interval(confidence: f64, loc: f64, scale: f64) -> Result<(f64, f64)> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(StatsError::InvalidConfidence(confidence));
    }
    let standard =
        Normal::new(0.0, 1.0).map_err(|e| StatsError::Distribution(e.to_string()))?;
    let z = standard.inverse_cdf((1.0 + confidence) / 2.0);
    Ok((loc - z * scale, loc + z * scale))
}

/// Pearson correlation coefficient with its two-sided p-value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Correlation {
    pub r: f64,
    pub p_value: f64,
}

/// Pearson's r between `x` and `y`.
///
/// The p-value tests r = 0 against Student's t with n - 2 degrees of
/// freedom. Two points always give p = 1.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<Correlation> {
    if x.len() != y.len() {
        return Err(StatsError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    let n = x.len();
    if n < 2 {
        return Err(StatsError::TooFewSamples { needed: 2, got: n });
    }

    let mx = mean(x)?;
    let my = mean(y)?;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let dx = a - mx;
        let dy = b - my;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return Err(StatsError::ConstantInput);
    }
    let r = sxy / (sxx * syy).sqrt();
    if !r.is_finite() {
        return Err(StatsError::NonFinite);
    }
    let r = r.clamp(-1.0, 1.0);

    let df = (n - 2) as f64;
    let p_value = if n == 2 {
        1.0
    } else if r.abs() == 1.0 {
        0.0
    } else {
        let t = r * (df / (1.0 - r * r)).sqrt();
        let dist = StudentsT::new(0.0, 1.0, df)
            .map_err(|e| StatsError::Distribution(e.to_string()))?;
        (2.0 * dist.cdf(-t.abs())).min(1.0)
    };

    Ok(Correlation { r, p_value })
}

/// Mean, sample standard deviation and count of one group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub mean: f64,
    pub std: Option<f64>,
    pub count: usize,
}

impl Summary {
    pub fn of(values: &[f64]) -> Result<Self> {
        Ok(Summary {
            mean: mean(values)?,
            std: std_dev(values),
            count: values.len(),
        })
    }

    /// The same summary with mean and std rounded to two decimals.
    pub fn rounded(self) -> Self {
        Summary {
            mean: round2(self.mean),
            std: self.std.map(round2),
            count: self.count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;
    const SAMPLE: [f64; 8] = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

    #[test]
    fn test_mean_median_std() {
        assert!((mean(&SAMPLE).unwrap() - 5.0).abs() < EPS);
        assert!((median(&SAMPLE).unwrap() - 4.5).abs() < EPS);
        assert!((median(&[3.0, 1.0, 2.0]).unwrap() - 2.0).abs() < EPS);
        assert!((std_dev(&SAMPLE).unwrap() - (32.0f64 / 7.0).sqrt()).abs() < EPS);
        assert!((sem(&SAMPLE).unwrap() - 0.755929).abs() < EPS);
        assert_eq!(min(&SAMPLE).unwrap(), 2.0);
        assert_eq!(max(&SAMPLE).unwrap(), 9.0);
    }

    #[test]
    fn test_empty_and_single_samples() {
        assert_eq!(mean(&[]), Err(StatsError::Empty));
        assert_eq!(median(&[]), Err(StatsError::Empty));
        assert_eq!(min(&[]), Err(StatsError::Empty));
        assert_eq!(std_dev(&[1.0]), None);
        assert_eq!(sem(&[1.0]), None);
    }

    #[test]
    fn test_normal_interval_95() {
        let sem = sem(&SAMPLE).unwrap();
        let (lo, hi) = normal_interval(0.95, 5.0, sem).unwrap();
        assert!((lo - 3.518406).abs() < 1e-5, "lo = {lo}");
        assert!((hi - 6.481594).abs() < 1e-5, "hi = {hi}");
    }

    #[test]
    fn test_normal_interval_rejects_bad_confidence() {
        assert_eq!(
            normal_interval(1.0, 0.0, 1.0),
            Err(StatsError::InvalidConfidence(1.0))
        );
        assert!(normal_interval(0.0, 0.0, 1.0).is_err());
    }

    #[test]
    fn test_pearson_one_degree_of_freedom() {
        // t = 1/sqrt(3) under a Cauchy distribution: p = 2/3.
        let c = pearson(&[1.0, 2.0, 3.0], &[1.0, 3.0, 2.0]).unwrap();
        assert!((c.r - 0.5).abs() < EPS);
        assert!((c.p_value - 2.0 / 3.0).abs() < 1e-6, "p = {}", c.p_value);
    }

    #[test]
    fn test_pearson_two_degrees_of_freedom() {
        let c = pearson(&[1.0, 2.0, 3.0, 4.0], &[1.0, 3.0, 2.0, 4.0]).unwrap();
        assert!((c.r - 0.8).abs() < EPS);
        assert!((c.p_value - 0.2).abs() < 1e-6, "p = {}", c.p_value);
    }

    #[test]
    fn test_pearson_edge_cases() {
        let perfect = pearson(&[1.0, 2.0, 3.0], &[-2.0, -4.0, -6.0]).unwrap();
        assert_eq!(perfect.r, -1.0);
        assert_eq!(perfect.p_value, 0.0);

        let two = pearson(&[1.0, 2.0], &[5.0, 3.0]).unwrap();
        assert_eq!(two.p_value, 1.0);

        assert_eq!(
            pearson(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]),
            Err(StatsError::ConstantInput)
        );
        assert_eq!(
            pearson(&[1.0], &[1.0, 2.0]),
            Err(StatsError::LengthMismatch { x: 1, y: 2 })
        );
        assert_eq!(
            pearson(&[1.0], &[1.0]),
            Err(StatsError::TooFewSamples { needed: 2, got: 1 })
        );
    }

    #[test]
    fn test_pearson_infinite_input_is_an_error() {
        assert_eq!(
            pearson(&[1.0, 2.0, 3.0], &[38.55, f64::INFINITY, 12.0]),
            Err(StatsError::NonFinite)
        );
        assert_eq!(
            pearson(&[1.0, f64::NAN, 3.0], &[1.0, 2.0, 4.0]),
            Err(StatsError::NonFinite)
        );
    }

    #[test]
    fn test_summary_rounding() {
        let s = Summary::of(&[1.0, 2.0, 2.0]).unwrap().rounded();
        assert_eq!(s.mean, 1.67);
        assert_eq!(s.std, Some(0.58));
        assert_eq!(s.count, 3);

        assert_eq!(round2(0.125), 0.12);
        assert_eq!(Summary::of(&[4.0]).unwrap().std, None);
    }
}
