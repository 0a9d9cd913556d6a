//! Bayesian Bradley-Terry fit via random-walk Metropolis MCMC.
//!
//! Each item gets a latent log-strength; the probability that item `i` beats
//! item `j` is `sigmoid(s_i - s_j)`. Strengths carry a standard normal
//! prior, and the posterior is explored with single-site random-walk
//! Metropolis updates. Draws are recorded after burn-in, centered to sum to
//! zero (the likelihood only identifies strength differences).
//!
//! The fitted result exposes read-only views over the retained draws: a
//! parameter table (posterior mean and 95% HPDI per item), convergence
//! diagnostics (acceptance rate, effective sample size), a pairwise
//! win-probability table, and a posterior mean rank table. The whole
//! structure serializes, which is what the on-disk fit cache relies on.

use std::collections::{BTreeMap, BTreeSet};

use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use rand_pcg::Pcg64Mcg;
use rigour_core::Judgement;
use serde::{Deserialize, Serialize};

/// Default number of MCMC iterations.
pub const DEFAULT_ITERATIONS: usize = 3000;

/// Default number of burn-in iterations to discard.
pub const DEFAULT_BURN_IN: usize = 750;

/// Default standard deviation of the random-walk proposal kernel.
pub const DEFAULT_PROPOSAL_SD: f64 = 0.4;

/// Mass of the highest posterior density interval in the parameter table.
const HPDI_MASS: f64 = 0.95;

/// MCMC configuration. The seed is an explicit parameter: two fits with the
/// same data and config produce identical draws.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BayesConfig {
    /// Total MCMC iterations (one iteration = one sweep over all items)
    pub iterations: usize,
    /// Iterations discarded before draws are retained
    pub burn_in: usize,
    /// Standard deviation of the Gaussian proposal
    pub proposal_sd: f64,
    /// RNG seed
    pub seed: u64,
}

impl Default for BayesConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            burn_in: DEFAULT_BURN_IN,
            proposal_sd: DEFAULT_PROPOSAL_SD,
            seed: 0,
        }
    }
}

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum BayesError {
    #[display("no judgements to fit")]
    EmptyInput,
    #[display("burn-in ({burn_in}) must be smaller than the iteration count ({iterations})")]
    BurnInTooLarge { burn_in: usize, iterations: usize },
    #[display("proposal standard deviation must be positive and finite")]
    InvalidProposalSd,
}

/// Posterior summary for one item.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItemPosterior {
    /// Item name
    pub item: String,
    /// Posterior mean log-strength
    pub mean: f64,
    /// Lower bound of the 95% HPDI
    pub hpdi_low: f64,
    /// Upper bound of the 95% HPDI
    pub hpdi_high: f64,
    /// Effective sample size of this item's chain
    pub ess: f64,
}

/// Posterior mean rank for one item (rank 1 = strongest).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ItemRank {
    /// Item name
    pub item: String,
    /// Mean over draws of this item's per-draw rank
    pub mean_rank: f64,
}

/// A fitted Bayesian Bradley-Terry posterior.
///
/// Holds the retained draws themselves so that a cached fit reloaded from
/// disk reproduces every derived table bit for bit.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BayesFit {
    /// Item names, in the order draws are indexed
    pub items: Vec<String>,
    /// Retained draws, draw-major; each inner vector is one centered
    /// log-strength vector
    pub draws: Vec<Vec<f64>>,
    /// Fraction of proposals accepted over the whole run
    pub acceptance_rate: f64,
    /// Configuration the fit was produced with
    pub config: BayesConfig,
}

/// Fits the Bayesian Bradley-Terry model.
pub fn fit(judgements: &[Judgement], config: &BayesConfig) -> Result<BayesFit, BayesError> {
    if judgements.is_empty() {
        return Err(BayesError::EmptyInput);
    }
    if config.burn_in >= config.iterations {
        return Err(BayesError::BurnInTooLarge {
            burn_in: config.burn_in,
            iterations: config.iterations,
        });
    }
    if !(config.proposal_sd.is_finite() && config.proposal_sd > 0.0) {
        return Err(BayesError::InvalidProposalSd);
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

    // Per-item view of the comparisons: (opponent, won). Self-comparisons
    // carry no information and are skipped.
    let mut contests: Vec<Vec<(usize, bool)>> = vec![Vec::new(); items.len()];
    for j in judgements {
        if j.winner == j.loser {
            continue;
        }
        let w = index[j.winner.as_str()];
        let l = index[j.loser.as_str()];
        contests[w].push((l, true));
        contests[l].push((w, false));
    }

    let mut rng = Pcg64Mcg::seed_from_u64(config.seed);
    let proposal =
        Normal::new(0.0, config.proposal_sd).map_err(|_| BayesError::InvalidProposalSd)?;

    let n = items.len();
    let mut strengths = vec![0.0_f64; n];
    let mut draws = Vec::with_capacity(config.iterations - config.burn_in);
    let mut proposed = 0_u64;
    let mut accepted = 0_u64;

    for iteration in 0..config.iterations {
        for i in 0..n {
            let current = strengths[i];
            let candidate = current + proposal.sample(&mut rng);

            let mut delta = log_prior(candidate) - log_prior(current);
            for &(opponent, won) in &contests[i] {
                let other = strengths[opponent];
                let (cur_diff, cand_diff) = if won {
                    (current - other, candidate - other)
                } else {
                    (other - current, other - candidate)
                };
                delta += ln_sigmoid(cand_diff) - ln_sigmoid(cur_diff);
            }

            proposed += 1;
            if delta >= 0.0 || rng.random::<f64>() < delta.exp() {
                strengths[i] = candidate;
                accepted += 1;
            }
        }

        if iteration >= config.burn_in {
            draws.push(center(&strengths));
        }
    }

    #[expect(clippy::cast_precision_loss)]
    let acceptance_rate = accepted as f64 / proposed as f64;

    Ok(BayesFit {
        items,
        draws,
        acceptance_rate,
        config: config.clone(),
    })
}

impl BayesFit {
    /// Posterior mean log-strength per item, keyed by name. This is the
    /// scalar score the comparison table uses.
    #[must_use]
    pub fn scores(&self) -> BTreeMap<String, f64> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| (item.clone(), mean(&self.chain(i))))
            .collect()
    }

    /// Posterior mean, 95% HPDI, and effective sample size per item.
    #[must_use]
    pub fn parameter_table(&self) -> Vec<ItemPosterior> {
        self.items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let chain = self.chain(i);
                let (hpdi_low, hpdi_high) = hpdi(&chain, HPDI_MASS);
                ItemPosterior {
                    item: item.clone(),
                    mean: mean(&chain),
                    hpdi_low,
                    hpdi_high,
                    ess: effective_sample_size(&chain),
                }
            })
            .collect()
    }

    /// Posterior probability that item `a` beats item `b`, or `None` if
    /// either name is not in the fit.
    #[must_use]
    pub fn win_probability(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.items.iter().position(|item| item == a)?;
        let j = self.items.iter().position(|item| item == b)?;
        Some(self.win_probability_by_index(i, j))
    }

    /// Full pairwise win-probability table, indexed like `items`. Entry
    /// `[i][j]` is the posterior probability that item `i` beats item `j`;
    /// the diagonal is 0.5 by convention.
    #[must_use]
    pub fn win_probability_table(&self) -> Vec<Vec<f64>> {
        let n = self.items.len();
        (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| self.win_probability_by_index(i, j))
                    .collect()
            })
            .collect()
    }

    /// Posterior mean rank per item (rank 1 = strongest), sorted from
    /// strongest to weakest.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn rank_table(&self) -> Vec<ItemRank> {
        let n = self.items.len();
        let mut rank_sums = vec![0.0_f64; n];
        for draw in &self.draws {
            let mut order: Vec<usize> = (0..n).collect();
            order.sort_by(|&a, &b| draw[b].total_cmp(&draw[a]));
            for (position, &idx) in order.iter().enumerate() {
                rank_sums[idx] += (position + 1) as f64;
            }
        }

        let n_draws = self.draws.len().max(1) as f64;
        let mut table: Vec<ItemRank> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| ItemRank {
                item: item.clone(),
                mean_rank: rank_sums[i] / n_draws,
            })
            .collect();
        table.sort_by(|a, b| a.mean_rank.total_cmp(&b.mean_rank));
        table
    }

    fn chain(&self, i: usize) -> Vec<f64> {
        self.draws.iter().map(|draw| draw[i]).collect()
    }

    fn win_probability_by_index(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 0.5;
        }
        let total: f64 = self
            .draws
            .iter()
            .map(|draw| sigmoid(draw[i] - draw[j]))
            .sum();
        #[expect(clippy::cast_precision_loss)]
        let n = self.draws.len().max(1) as f64;
        total / n
    }
}

fn log_prior(s: f64) -> f64 {
    -0.5 * s * s
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// `ln(sigmoid(x))`, stable for large negative `x`.
fn ln_sigmoid(x: f64) -> f64 {
    if x < -35.0 { x } else { -(-x).exp().ln_1p() }
}

fn center(strengths: &[f64]) -> Vec<f64> {
    let m = mean(strengths);
    strengths.iter().map(|s| s - m).collect()
}

#[expect(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Shortest interval containing `mass` of the draws.
fn hpdi(chain: &[f64], mass: f64) -> (f64, f64) {
    let mut sorted = chain.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n == 0 {
        return (f64::NAN, f64::NAN);
    }

    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let window = (((n as f64) * mass).ceil() as usize).clamp(1, n);
    let mut best = (sorted[0], sorted[n - 1]);
    let mut best_width = f64::INFINITY;
    for start in 0..=(n - window) {
        let low = sorted[start];
        let high = sorted[start + window - 1];
        if high - low < best_width {
            best_width = high - low;
            best = (low, high);
        }
    }
    best
}

/// Effective sample size accounting for autocorrelation:
/// `ESS = N / (1 + 2 * sum_k rho_k)`, truncated once `rho_k` drops
/// below 0.05.
#[expect(clippy::cast_precision_loss)]
fn effective_sample_size(chain: &[f64]) -> f64 {
    let n = chain.len();
    if n < 2 {
        return n as f64;
    }

    let m = mean(chain);
    let var = chain.iter().map(|&x| (x - m).powi(2)).sum::<f64>() / n as f64;
    if var < 1e-12 {
        return n as f64;
    }

    let mut sum_rho = 0.0;
    for k in 1..=50.min(n / 2) {
        let rho = autocorrelation(chain, k, m, var);
        if rho < 0.05 {
            break;
        }
        sum_rho += rho;
    }

    n as f64 / 2.0f64.mul_add(sum_rho, 1.0)
}

#[expect(clippy::cast_precision_loss)]
fn autocorrelation(chain: &[f64], k: usize, mean: f64, var: f64) -> f64 {
    let n = chain.len();
    if k >= n {
        return 0.0;
    }
    let cov = (0..(n - k))
        .map(|i| (chain[i] - mean) * (chain[i + k] - mean))
        .sum::<f64>()
        / (n - k) as f64;
    cov / var
}

#[cfg(test)]
mod tests {
    use super::*;

    fn j(judge: &str, winner: &str, loser: &str) -> Judgement {
        Judgement {
            judge: judge.to_owned(),
            winner: winner.to_owned(),
            loser: loser.to_owned(),
        }
    }

    /// A: beats everyone. B: beats C. C: beats no one.
    fn dominance_data() -> Vec<Judgement> {
        let mut out = Vec::new();
        for _ in 0..10 {
            out.push(j("J1", "A", "B"));
            out.push(j("J1", "A", "C"));
            out.push(j("J2", "B", "C"));
        }
        out
    }

    fn quick_config() -> BayesConfig {
        BayesConfig {
            iterations: 600,
            burn_in: 100,
            proposal_sd: 0.4,
            seed: 7,
        }
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(
            fit(&[], &BayesConfig::default()),
            Err(BayesError::EmptyInput)
        ));
    }

    #[test]
    fn burn_in_must_be_below_iterations() {
        let config = BayesConfig {
            iterations: 100,
            burn_in: 100,
            ..BayesConfig::default()
        };
        assert!(matches!(
            fit(&dominance_data(), &config),
            Err(BayesError::BurnInTooLarge { .. })
        ));
    }

    #[test]
    fn one_score_per_item() {
        let fitted = fit(&dominance_data(), &quick_config()).unwrap();
        let scores = fitted.scores();
        assert_eq!(scores.len(), 3);
        assert!(scores.contains_key("A"));
        assert!(scores.contains_key("B"));
        assert!(scores.contains_key("C"));
    }

    #[test]
    fn posterior_means_recover_the_dominance_order() {
        let fitted = fit(&dominance_data(), &quick_config()).unwrap();
        let scores = fitted.scores();
        assert!(scores["A"] > scores["B"], "{scores:?}");
        assert!(scores["B"] > scores["C"], "{scores:?}");
    }

    #[test]
    fn same_seed_reproduces_draws_exactly() {
        let data = dominance_data();
        let a = fit(&data, &quick_config()).unwrap();
        let b = fit(&data, &quick_config()).unwrap();
        assert_eq!(a.draws, b.draws);
        assert_eq!(a.acceptance_rate, b.acceptance_rate);
    }

    #[test]
    fn draws_are_centered() {
        let fitted = fit(&dominance_data(), &quick_config()).unwrap();
        for draw in &fitted.draws {
            let total: f64 = draw.iter().sum();
            assert!(total.abs() < 1e-9);
        }
    }

    #[test]
    fn win_probability_favors_the_dominant_item() {
        let fitted = fit(&dominance_data(), &quick_config()).unwrap();
        let p = fitted.win_probability("A", "C").unwrap();
        assert!(p > 0.7, "p = {p}");
        let q = fitted.win_probability("C", "A").unwrap();
        assert!(q < 0.3, "q = {q}");
        assert!(fitted.win_probability("A", "Nope").is_none());
    }

    #[test]
    fn rank_table_orders_strongest_first() {
        let fitted = fit(&dominance_data(), &quick_config()).unwrap();
        let ranks = fitted.rank_table();
        assert_eq!(ranks[0].item, "A");
        assert!(ranks[0].mean_rank < ranks[1].mean_rank);
        assert_eq!(ranks.last().unwrap().item, "C");
    }

    #[test]
    fn hpdi_contains_the_posterior_mean() {
        let fitted = fit(&dominance_data(), &quick_config()).unwrap();
        for p in fitted.parameter_table() {
            assert!(p.hpdi_low <= p.mean && p.mean <= p.hpdi_high, "{p:?}");
            assert!(p.ess > 0.0);
        }
    }

    #[test]
    fn acceptance_rate_is_a_fraction() {
        let fitted = fit(&dominance_data(), &quick_config()).unwrap();
        assert!(fitted.acceptance_rate > 0.0 && fitted.acceptance_rate < 1.0);
    }

    #[test]
    fn serde_round_trip_preserves_every_draw() {
        let fitted = fit(&dominance_data(), &quick_config()).unwrap();
        let json = serde_json::to_string(&fitted).unwrap();
        let reloaded: BayesFit = serde_json::from_str(&json).unwrap();
        assert_eq!(reloaded.draws, fitted.draws);
        assert_eq!(reloaded.items, fitted.items);
        assert_eq!(reloaded.acceptance_rate, fitted.acceptance_rate);
    }

    #[test]
    fn hpdi_of_a_uniform_ramp() {
        let chain: Vec<f64> = (0..100).map(f64::from).collect();
        let (low, high) = hpdi(&chain, 0.95);
        // Any 95-wide window of 0..=99 has width 94; the first is chosen.
        assert!((high - low - 94.0).abs() < 1e-12);
    }
}
