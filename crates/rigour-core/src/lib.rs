//! Data model for pairwise proof-rigour judgements.
//!
//! A judgement is one pairwise comparison: a judge decided that one proof is
//! more rigorous than another. The raw dataset stores proofs as numeric ids
//! and mixes several studies and judgement dimensions in one CSV; this crate
//! loads that file, filters it to one (study, dimension) pair, and resolves
//! the ids to proof names through a fixed lookup table.
//!
//! The model fitters in `rigour-models` consume the resulting
//! [`Judgement`](judgement::Judgement) slice; nothing here knows about any
//! particular ranking method.

pub mod judgement;
pub mod loader;
pub mod lookup;

pub use judgement::{Judgement, JudgementSet};
pub use loader::{LoadError, load_judgements, parse_judgement_csv};
pub use lookup::ItemLookup;
