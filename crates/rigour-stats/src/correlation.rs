//! Correlation coefficients between paired score columns.
//!
//! Three coefficients are supported, matching what the comparison reporter
//! lets the caller select: Pearson (linear), Spearman (Pearson over
//! midranks), and Kendall tau-b (concordance with tie correction).

use crate::{distribution::t_two_sided_p, ranks::midranks};

/// Which correlation coefficient to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CorrelationMethod {
    /// Pearson product-moment correlation.
    #[default]
    Pearson,
    /// Spearman rank correlation (Pearson over midranks).
    Spearman,
    /// Kendall tau-b, with tie correction in both variables.
    Kendall,
}

impl CorrelationMethod {
    /// Computes this coefficient for two equal-length slices.
    #[must_use]
    pub fn compute(self, x: &[f64], y: &[f64]) -> f64 {
        match self {
            Self::Pearson => pearson(x, y),
            Self::Spearman => spearman(x, y),
            Self::Kendall => kendall_tau_b(x, y),
        }
    }
}

/// Pearson product-moment correlation coefficient.
///
/// Returns `f64::NAN` when fewer than two pairs are given or either column
/// has zero variance.
///
/// # Panics
///
/// Panics if `x` and `y` have different lengths.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn pearson(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len(), "columns must have equal length");
    let n = x.len();
    if n < 2 {
        return f64::NAN;
    }

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xx = 0.0;
    let mut sum_yy = 0.0;
    let mut sum_xy = 0.0;
    for (&xi, &yi) in x.iter().zip(y) {
        sum_x += xi;
        sum_y += yi;
        sum_xx += xi * xi;
        sum_yy += yi * yi;
        sum_xy += xi * yi;
    }

    let nf = n as f64;
    let num = nf.mul_add(sum_xy, -(sum_x * sum_y));
    let den_x = nf.mul_add(sum_xx, -(sum_x * sum_x));
    let den_y = nf.mul_add(sum_yy, -(sum_y * sum_y));
    let den = (den_x.max(0.0) * den_y.max(0.0)).sqrt();
    if den <= 1e-12 {
        return f64::NAN;
    }
    (num / den).clamp(-1.0, 1.0)
}

/// Spearman rank correlation: Pearson over midranks.
///
/// Tie handling comes from the midrank transform, so tied values do not
/// inflate the coefficient.
#[must_use]
pub fn spearman(x: &[f64], y: &[f64]) -> f64 {
    pearson(&midranks(x), &midranks(y))
}

/// Kendall tau-b rank correlation.
///
/// Counts concordant and discordant pairs; pairs tied in either variable
/// enter the tie-correction denominator rather than the numerator.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn kendall_tau_b(x: &[f64], y: &[f64]) -> f64 {
    assert_eq!(x.len(), y.len(), "columns must have equal length");
    let n = x.len();
    if n < 2 {
        return f64::NAN;
    }

    let mut concordant: i64 = 0;
    let mut discordant: i64 = 0;
    let mut ties_x: i64 = 0;
    let mut ties_y: i64 = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i] - x[j];
            let dy = y[i] - y[j];
            if dx == 0.0 && dy == 0.0 {
                // tied in both; contributes to neither denominator term
            } else if dx == 0.0 {
                ties_x += 1;
            } else if dy == 0.0 {
                ties_y += 1;
            } else if (dx > 0.0) == (dy > 0.0) {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }

    let n0 = concordant + discordant;
    let den = (((n0 + ties_x) as f64) * ((n0 + ties_y) as f64)).sqrt();
    if den <= 0.0 {
        return f64::NAN;
    }
    (concordant - discordant) as f64 / den
}

/// Two-sided p-value of a Pearson coefficient under the t approximation.
///
/// `t = r * sqrt((n-2) / (1-r^2))` with `n-2` degrees of freedom. Returns
/// `f64::NAN` for `n < 3` or non-finite `r`.
#[expect(clippy::cast_precision_loss)]
#[must_use]
pub fn pearson_p_value(r: f64, n: usize) -> f64 {
    if n < 3 || !r.is_finite() {
        return f64::NAN;
    }
    let df = (n - 2) as f64;
    if (1.0 - r * r) <= f64::EPSILON {
        return 0.0;
    }
    let t = r * (df / (1.0 - r * r)).sqrt();
    t_two_sided_p(t, df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pearson_perfect_positive() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [10.0, 20.0, 30.0, 40.0];
        assert!((pearson(&x, &y) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_perfect_negative() {
        let x = [1.0, 2.0, 3.0];
        let y = [3.0, 2.0, 1.0];
        assert!((pearson(&x, &y) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pearson_constant_column_is_nan() {
        let x = [1.0, 1.0, 1.0];
        let y = [1.0, 2.0, 3.0];
        assert!(pearson(&x, &y).is_nan());
    }

    #[test]
    fn spearman_monotone_nonlinear_is_one() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [1.0, 8.0, 27.0, 64.0, 125.0];
        assert!((spearman(&x, &y) - 1.0).abs() < 1e-12);
        // Pearson on the same data is strictly below 1
        assert!(pearson(&x, &y) < 1.0);
    }

    #[test]
    fn kendall_reversed_order_is_minus_one() {
        let x = [1.0, 2.0, 3.0, 4.0];
        let y = [4.0, 3.0, 2.0, 1.0];
        assert!((kendall_tau_b(&x, &y) + 1.0).abs() < 1e-12);
    }

    #[test]
    fn kendall_known_value_with_ties() {
        // x: 1 2 2 3, y: 1 2 3 4
        // pairs: (1,2)C (1,2)C (1,3)C (2,2)tie_x (2,3)C (2,3)C
        // concordant = 5, discordant = 0, ties_x = 1
        // tau_b = 5 / sqrt(6 * 5)
        let x = [1.0, 2.0, 2.0, 3.0];
        let y = [1.0, 2.0, 3.0, 4.0];
        let expected = 5.0 / (6.0_f64 * 5.0).sqrt();
        assert!((kendall_tau_b(&x, &y) - expected).abs() < 1e-12);
    }

    #[test]
    fn method_dispatch_matches_direct_calls() {
        let x = [1.0, 3.0, 2.0, 5.0, 4.0];
        let y = [2.0, 4.0, 1.0, 5.0, 3.0];
        assert_eq!(CorrelationMethod::Pearson.compute(&x, &y), pearson(&x, &y));
        assert_eq!(
            CorrelationMethod::Spearman.compute(&x, &y),
            spearman(&x, &y)
        );
        assert_eq!(
            CorrelationMethod::Kendall.compute(&x, &y),
            kendall_tau_b(&x, &y)
        );
    }

    #[test]
    fn p_value_small_for_strong_correlation() {
        let p = pearson_p_value(0.95, 15);
        assert!(p < 0.001, "p = {p}");
        let p_weak = pearson_p_value(0.1, 15);
        assert!(p_weak > 0.5, "p = {p_weak}");
    }
}
