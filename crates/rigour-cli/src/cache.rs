//! On-disk memoization of the Bayesian fit.
//!
//! The MCMC fit is the only long-running step of the pipeline, so its result
//! is cached as a JSON artifact. The cache key is the study, the dimension,
//! and an FNV-1a hash of the normalized judgement list and the fit config:
//! changing the input data or any config field (a different seed included)
//! changes the key and forces a refit, while deleting the file remains a
//! valid way to invalidate by hand. A cache hit reproduces the fit bit for
//! bit; the artifact is pure memoization, never an approximation.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use rigour_core::JudgementSet;
use rigour_models::bayes::{self, BayesConfig, BayesFit};
use serde::{Deserialize, Serialize};

use crate::util::read_json_file;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// The serialized cache artifact.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CachedBayesFit {
    /// Study the fit belongs to
    pub study: String,
    /// Judgement dimension the fit belongs to
    pub dimension: String,
    /// FNV-1a hash of the judgement list and fit config, hex
    pub fit_hash: String,
    /// When the fit was produced
    pub fitted_at: DateTime<Utc>,
    /// The fit itself, draws included
    pub fit: BayesFit,
}

/// Loads the cached fit for this judgement set, or fits and caches it.
///
/// Returns the fit and whether it came from the cache.
pub fn load_or_fit(
    cache_dir: &Path,
    set: &JudgementSet,
    config: &BayesConfig,
) -> anyhow::Result<(BayesFit, bool)> {
    let hash = fit_hash(set, config);
    let path = cache_path(cache_dir, &set.study, &set.dimension, hash);

    if path.exists() {
        let cached: CachedBayesFit = read_json_file("cached Bayesian fit", &path)?;
        return Ok((cached.fit, true));
    }

    let fit = bayes::fit(&set.judgements, config)?;

    fs::create_dir_all(cache_dir).with_context(|| {
        format!(
            "Failed to create cache directory: {}",
            cache_dir.display()
        )
    })?;
    let artifact = CachedBayesFit {
        study: set.study.clone(),
        dimension: set.dimension.clone(),
        fit_hash: format!("{hash:016x}"),
        fitted_at: Utc::now(),
        fit,
    };
    let file = fs::File::create(&path)
        .with_context(|| format!("Failed to create cache file: {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &artifact)
        .with_context(|| format!("Failed to write cache file: {}", path.display()))?;

    Ok((artifact.fit, false))
}

/// The cache file this judgement set maps to.
#[must_use]
pub fn cache_path(cache_dir: &Path, study: &str, dimension: &str, hash: u64) -> PathBuf {
    cache_dir.join(format!("{study}-{dimension}-{hash:016x}.json"))
}

/// FNV-1a over the study, dimension, every judgement in file order, and the
/// fit config. Two fits differing in any config field (the seed above all)
/// are different fits and must never share a cache entry.
#[must_use]
pub fn fit_hash(set: &JudgementSet, config: &BayesConfig) -> u64 {
    let mut hash = FNV_OFFSET;
    for part in [set.study.as_str(), set.dimension.as_str()] {
        fnv1a(&mut hash, part.as_bytes());
    }
    for j in &set.judgements {
        fnv1a(&mut hash, j.judge.as_bytes());
        fnv1a(&mut hash, b"\t");
        fnv1a(&mut hash, j.winner.as_bytes());
        fnv1a(&mut hash, b"\t");
        fnv1a(&mut hash, j.loser.as_bytes());
        fnv1a(&mut hash, b"\n");
    }
    for word in [
        config.iterations as u64,
        config.burn_in as u64,
        config.proposal_sd.to_bits(),
        config.seed,
    ] {
        fnv1a(&mut hash, &word.to_le_bytes());
    }
    hash
}

fn fnv1a(hash: &mut u64, bytes: &[u8]) {
    for &b in bytes {
        *hash ^= u64::from(b);
        *hash = hash.wrapping_mul(FNV_PRIME);
    }
}

#[cfg(test)]
mod tests {
    use rigour_core::Judgement;

    use super::*;

    fn set(judgements: Vec<Judgement>) -> JudgementSet {
        JudgementSet {
            study: "study2".to_owned(),
            dimension: "rigour".to_owned(),
            judgements,
            unknown_ids: vec![],
        }
    }

    fn j(winner: &str, loser: &str) -> Judgement {
        Judgement {
            judge: "J1".to_owned(),
            winner: winner.to_owned(),
            loser: loser.to_owned(),
        }
    }

    #[test]
    fn hash_is_stable_for_identical_data() {
        let a = set(vec![j("A", "B"), j("B", "C")]);
        let b = set(vec![j("A", "B"), j("B", "C")]);
        let config = BayesConfig::default();
        assert_eq!(fit_hash(&a, &config), fit_hash(&b, &config));
    }

    #[test]
    fn hash_changes_when_data_changes() {
        let a = set(vec![j("A", "B")]);
        let b = set(vec![j("B", "A")]);
        let config = BayesConfig::default();
        assert_ne!(fit_hash(&a, &config), fit_hash(&b, &config));
    }

    #[test]
    fn hash_changes_with_comparison_order() {
        // The Bayesian fit consumes judgements in order, so order is part
        // of the identity of the input.
        let a = set(vec![j("A", "B"), j("B", "C")]);
        let b = set(vec![j("B", "C"), j("A", "B")]);
        let config = BayesConfig::default();
        assert_ne!(fit_hash(&a, &config), fit_hash(&b, &config));
    }

    #[test]
    fn hash_changes_with_any_config_field() {
        let data = set(vec![j("A", "B")]);
        let base = BayesConfig::default();
        let seeded = BayesConfig { seed: 99, ..base.clone() };
        let longer = BayesConfig {
            iterations: base.iterations + 1,
            ..base.clone()
        };
        assert_ne!(fit_hash(&data, &base), fit_hash(&data, &seeded));
        assert_ne!(fit_hash(&data, &base), fit_hash(&data, &longer));
    }

    #[test]
    fn cache_round_trip_is_bit_identical() {
        let dir = std::env::temp_dir().join(format!(
            "rigour-cache-test-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);

        let data = set(vec![j("A", "B"), j("A", "C"), j("B", "C"), j("C", "A")]);
        let config = BayesConfig {
            iterations: 200,
            burn_in: 50,
            ..BayesConfig::default()
        };

        let (first, from_cache) = load_or_fit(&dir, &data, &config).unwrap();
        assert!(!from_cache);
        let (second, from_cache) = load_or_fit(&dir, &data, &config).unwrap();
        assert!(from_cache);
        assert_eq!(first.draws, second.draws);
        assert_eq!(first.items, second.items);
        assert_eq!(first.acceptance_rate, second.acceptance_rate);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn requesting_a_different_seed_refits_instead_of_hitting_the_cache() {
        let dir = std::env::temp_dir().join(format!(
            "rigour-cache-seed-test-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);

        let data = set(vec![j("A", "B"), j("A", "C"), j("B", "C"), j("C", "A")]);
        let config = BayesConfig {
            iterations: 200,
            burn_in: 50,
            ..BayesConfig::default()
        };
        let reseeded = BayesConfig {
            seed: 99,
            ..config.clone()
        };

        let (_, from_cache) = load_or_fit(&dir, &data, &config).unwrap();
        assert!(!from_cache);
        let (fit, from_cache) = load_or_fit(&dir, &data, &reseeded).unwrap();
        assert!(!from_cache);
        assert_eq!(fit.config.seed, 99);

        let _ = fs::remove_dir_all(&dir);
    }
}
