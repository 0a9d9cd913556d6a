//! PageRank over the win/loss graph.
//!
//! Every judgement adds one directed edge loser -> winner, so rank mass
//! flows toward items that beat well-ranked opponents. Repeated comparisons
//! become parallel edges: a pair judged five times carries five times the
//! weight of a pair judged once. Power iteration with the standard 0.85
//! damping factor and a uniform teleport vector; dangling items (ones that
//! never lost) spill their mass uniformly.
//!
//! The stationary distribution sums to one across all items, which is the
//! per-item score.

use std::collections::{BTreeMap, BTreeSet};

use rigour_core::Judgement;
use serde::{Deserialize, Serialize};

/// Damping factor of the random surfer.
pub const DAMPING: f64 = 0.85;

/// Iteration cap for power iteration.
const MAX_ITERATIONS: usize = 200;

/// L1 convergence tolerance between successive rank vectors.
const CONVERGENCE_TOL: f64 = 1e-12;

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum PageRankError {
    #[display("no judgements to fit")]
    EmptyInput,
}

/// Stationary visitation probabilities over the win graph.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PageRankFit {
    /// Score per item; non-negative, sums to one
    pub scores: BTreeMap<String, f64>,
    /// Power iterations performed
    pub iterations: usize,
    /// Whether the L1 delta dropped below tolerance before the cap
    pub converged: bool,
}

impl PageRankFit {
    /// The scalar score the comparison table uses.
    #[must_use]
    pub fn scores(&self) -> BTreeMap<String, f64> {
        self.scores.clone()
    }
}

/// Computes PageRank over the loser -> winner graph.
#[expect(clippy::cast_precision_loss)]
pub fn fit(judgements: &[Judgement]) -> Result<PageRankFit, PageRankError> {
    if judgements.is_empty() {
        return Err(PageRankError::EmptyInput);
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

    // Edge multiplicities, loser -> winner, and per-node out-degree
    // (counting parallel edges).
    let mut edge_counts: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    let mut out_degree = vec![0.0_f64; n];
    for j in judgements {
        if j.winner == j.loser {
            continue;
        }
        let w = index[j.winner.as_str()];
        let l = index[j.loser.as_str()];
        *edge_counts.entry((l, w)).or_insert(0.0) += 1.0;
        out_degree[l] += 1.0;
    }

    let nf = n as f64;
    let uniform = 1.0 / nf;
    let mut rank = vec![uniform; n];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < MAX_ITERATIONS {
        iterations += 1;

        let dangling_mass: f64 = (0..n)
            .filter(|&i| out_degree[i] == 0.0)
            .map(|i| rank[i])
            .sum();

        let base = (1.0 - DAMPING).mul_add(uniform, DAMPING * dangling_mass * uniform);
        let mut next = vec![base; n];
        for (&(from, to), &count) in &edge_counts {
            next[to] += DAMPING * rank[from] * count / out_degree[from];
        }

        let delta: f64 = rank
            .iter()
            .zip(&next)
            .map(|(old, new)| (old - new).abs())
            .sum();
        rank = next;
        if delta < CONVERGENCE_TOL {
            converged = true;
            break;
        }
    }

    let scores = items
        .into_iter()
        .zip(rank)
        .collect::<BTreeMap<String, f64>>();

    Ok(PageRankFit {
        scores,
        iterations,
        converged,
    })
}
