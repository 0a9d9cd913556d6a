//! Frequentist Bradley-Terry fit with per-judge infit diagnostics.
//!
//! Item strengths are estimated by minorization-maximization (the classic
//! iterative scaling update for the Bradley-Terry likelihood), capped at 400
//! iterations. Ties do not exist in this dataset and there is no
//! home-advantage term; the two comparison columns are roles, not venues.
//!
//! On top of the strengths, the fit reports a per-judge infit statistic: the
//! information-weighted mean square of that judge's outcome residuals
//! against the model's predicted win probabilities. A judge is flagged as an
//! outlier when their infit exceeds the mean infit plus two standard
//! deviations across judges; this is a z-score style anomaly rule, not a
//! significance test.

use std::collections::{BTreeMap, BTreeSet};

use rigour_core::Judgement;
use rigour_stats::descriptive::DescriptiveStats;
use serde::{Deserialize, Serialize};

/// Iteration cap for the MM loop.
pub const MAX_ITERATIONS: usize = 400;

/// Convergence tolerance on the largest per-item log-strength change.
const CONVERGENCE_TOL: f64 = 1e-10;

/// Floor for the multiplicative strength parameters. An item that never
/// wins has its maximum-likelihood strength at zero; the floor keeps the
/// log scale finite.
const STRENGTH_FLOOR: f64 = 1e-8;

/// Infit threshold, in standard deviations above the mean.
const OUTLIER_SD_MULTIPLIER: f64 = 2.0;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum BtmError {
    #[display("no judgements to fit")]
    EmptyInput,
}

/// Strength estimate for one item.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItemEffect {
    /// Item name
    pub item: String,
    /// Log-strength, centered to mean zero across items
    pub strength: f64,
    /// Standard error of the log-strength from the diagonal of the observed
    /// information
    pub std_error: f64,
}

/// Infit diagnostic for one judge.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JudgeInfit {
    /// Judge identifier
    pub judge: String,
    /// Number of comparisons this judge contributed
    pub comparisons: usize,
    /// Information-weighted mean-square residual; 1.0 is perfect model fit
    pub infit: f64,
    /// Whether `infit > mean(infit) + 2 * sd(infit)` across judges
    pub outlier: bool,
}

/// Dataset-level summary of the fit.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BtmSummary {
    /// Number of distinct items
    pub n_items: usize,
    /// Number of distinct judges
    pub n_judges: usize,
    /// Number of comparisons used
    pub n_comparisons: usize,
    /// Iterations the MM loop actually ran
    pub iterations: usize,
    /// Whether the loop converged before the iteration cap
    pub converged: bool,
    /// Separation reliability: share of strength variance not attributable
    /// to estimation error, clamped at zero
    pub reliability: f64,
}

/// A fitted frequentist Bradley-Terry model.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BtmFit {
    /// Per-item strength estimates, sorted by item name
    pub effects: Vec<ItemEffect>,
    /// Per-judge infit diagnostics, sorted by judge identifier
    pub judges: Vec<JudgeInfit>,
    /// Dataset-level summary
    pub summary: BtmSummary,
}

impl BtmFit {
    /// Log-strength per item, keyed by name. This is the scalar score the
    /// comparison table uses.
    #[must_use]
    pub fn scores(&self) -> BTreeMap<String, f64> {
        self.effects
            .iter()
            .map(|e| (e.item.clone(), e.strength))
            .collect()
    }

    /// Judges flagged by the infit outlier rule.
    pub fn outlier_judges(&self) -> impl Iterator<Item = &JudgeInfit> {
        self.judges.iter().filter(|j| j.outlier)
    }
}

/// Fits the Bradley-Terry model and the judge infit diagnostics.
pub fn fit(judgements: &[Judgement]) -> Result<BtmFit, BtmError> {
    if judgements.is_empty() {
        return Err(BtmError::EmptyInput);
    }

    let items: Vec<String> = judgements
        .iter()
        .flat_map(|j| [j.winner.clone(), j.loser.clone()])
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let index: BTreeMap<&str, usize> = items
        .iter()
        .enumerate()
        .map(|(i, name)| (name.as_str(), i))
        .collect();
    let n = items.len();

    // Win counts and pair contest counts. Self-comparisons are skipped.
    let mut wins = vec![0.0_f64; n];
    let mut pair_counts: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    let mut used = 0_usize;
    for j in judgements {
        if j.winner == j.loser {
            continue;
        }
        let w = index[j.winner.as_str()];
        let l = index[j.loser.as_str()];
        wins[w] += 1.0;
        let key = if w < l { (w, l) } else { (l, w) };
        *pair_counts.entry(key).or_insert(0.0) += 1.0;
        used += 1;
    }

    // MM iteration: p_i <- w_i / sum_j n_ij / (p_i + p_j), rescaled to
    // geometric mean one each pass so the scale cannot drift.
    let mut p = vec![1.0_f64; n];
    let mut iterations = 0;
    let mut converged = false;
    for _ in 0..MAX_ITERATIONS {
        iterations += 1;
        let mut denominators = vec![0.0_f64; n];
        for (&(a, b), &count) in &pair_counts {
            let shared = count / (p[a] + p[b]);
            denominators[a] += shared;
            denominators[b] += shared;
        }

        let mut max_log_change = 0.0_f64;
        let mut next = vec![0.0_f64; n];
        for i in 0..n {
            next[i] = if denominators[i] > 0.0 {
                (wins[i] / denominators[i]).max(STRENGTH_FLOOR)
            } else {
                p[i]
            };
            max_log_change = max_log_change.max((next[i].ln() - p[i].ln()).abs());
        }

        normalize_geometric_mean(&mut next);
        p = next;
        if max_log_change < CONVERGENCE_TOL {
            converged = true;
            break;
        }
    }

    // Log scale, centered. The geometric-mean normalization above already
    // centers the logs.
    let strengths: Vec<f64> = p.iter().map(|v| v.ln()).collect();

    // Standard errors from the diagonal of the observed information in the
    // log-strength parameterization.
    let mut information = vec![0.0_f64; n];
    for (&(a, b), &count) in &pair_counts {
        let prob = p[a] / (p[a] + p[b]);
        let fisher = count * prob * (1.0 - prob);
        information[a] += fisher;
        information[b] += fisher;
    }
    let std_errors: Vec<f64> = information
        .iter()
        .map(|&i| if i > 0.0 { i.sqrt().recip() } else { f64::INFINITY })
        .collect();

    let effects: Vec<ItemEffect> = items
        .iter()
        .enumerate()
        .map(|(i, item)| ItemEffect {
            item: item.clone(),
            strength: strengths[i],
            std_error: std_errors[i],
        })
        .collect();

    let judges = judge_infits(judgements, &index, &p);
    let summary = BtmSummary {
        n_items: n,
        n_judges: judges.len(),
        n_comparisons: used,
        iterations,
        converged,
        reliability: separation_reliability(&strengths, &std_errors),
    };

    Ok(BtmFit {
        effects,
        judges,
        summary,
    })
}

fn normalize_geometric_mean(p: &mut [f64]) {
    #[expect(clippy::cast_precision_loss)]
    let log_mean = p.iter().map(|v| v.ln()).sum::<f64>() / p.len() as f64;
    let scale = log_mean.exp();
    for v in p.iter_mut() {
        *v /= scale;
    }
}

/// Per-judge infit: `sum (y - p)^2 / sum p(1 - p)` over that judge's
/// comparisons, where the observed outcome `y` is always 1 for the winner
/// column. Each comparison is weighted by its Bernoulli information, so
/// lopsided (uninformative) comparisons contribute little.
fn judge_infits(
    judgements: &[Judgement],
    index: &BTreeMap<&str, usize>,
    p: &[f64],
) -> Vec<JudgeInfit> {
    let mut residuals: BTreeMap<&str, (usize, f64, f64)> = BTreeMap::new();
    for j in judgements {
        if j.winner == j.loser {
            continue;
        }
        let w = index[j.winner.as_str()];
        let l = index[j.loser.as_str()];
        let prob = p[w] / (p[w] + p[l]);
        let entry = residuals.entry(j.judge.as_str()).or_insert((0, 0.0, 0.0));
        entry.0 += 1;
        entry.1 += (1.0 - prob).powi(2);
        entry.2 += prob * (1.0 - prob);
    }

    let infits: Vec<(String, usize, f64)> = residuals
        .into_iter()
        .map(|(judge, (count, sq_resid, info))| {
            let infit = if info > 0.0 { sq_resid / info } else { f64::NAN };
            (judge.to_owned(), count, infit)
        })
        .collect();

    let threshold = DescriptiveStats::new(
        infits
            .iter()
            .map(|(_, _, infit)| *infit)
            .filter(|v| v.is_finite()),
    )
    .map(|stats| {
        OUTLIER_SD_MULTIPLIER.mul_add(stats.std_dev, stats.mean)
    });

    infits
        .into_iter()
        .map(|(judge, comparisons, infit)| JudgeInfit {
            judge,
            comparisons,
            infit,
            outlier: threshold.as_ref().is_some_and(|t| infit > *t),
        })
        .collect()
}

/// `max(0, 1 - mean(se^2) / var(strength))`: how much of the spread in the
/// strength estimates is signal rather than estimation noise.
fn separation_reliability(strengths: &[f64], std_errors: &[f64]) -> f64 {
    let Some(stats) = DescriptiveStats::new(strengths.iter().copied()) else {
        return 0.0;
    };
    if stats.variance <= 0.0 {
        return 0.0;
    }
    let finite: Vec<f64> = std_errors
        .iter()
        .filter(|se| se.is_finite())
        .map(|se| se * se)
        .collect();
    if finite.is_empty() {
        return 0.0;
    }
    #[expect(clippy::cast_precision_loss)]
    let mean_error_var = finite.iter().sum::<f64>() / finite.len() as f64;
    (1.0 - mean_error_var / stats.variance).max(0.0)
}
