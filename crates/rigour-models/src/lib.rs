//! The four ranking-method fitters.
//!
//! Each module exposes one pure `fit` entry point taking a judgement slice
//! and returning that method's fitted result, from which a per-item scalar
//! score can be extracted:
//!
//! - [`bayes`]: Bayesian Bradley-Terry via random-walk Metropolis MCMC
//! - [`btm`]: frequentist Bradley-Terry with per-judge infit diagnostics
//! - [`elo`]: Elo rating over randomized presentation orders
//! - [`pagerank`]: stationary visitation probability on the win graph
//!
//! The fitters are deliberately independent: they share the input type from
//! `rigour-core` and nothing else, so each can be tested and replaced in
//! isolation. Score joining lives in `rigour-report`.

pub mod bayes;
pub mod btm;
pub mod elo;
pub mod pagerank;
