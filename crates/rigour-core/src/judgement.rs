use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One pairwise comparison after normalization.
///
/// The judge decided `winner` is more rigorous than `loser`. Both names come
/// from the item lookup; an id the lookup did not know resolves to an empty
/// name, which is carried through rather than treated as fatal (downstream
/// scores for such an item are undefined).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Judgement {
    /// Identifier of the judge who made this comparison
    pub judge: String,
    /// Name of the item judged more rigorous
    pub winner: String,
    /// Name of the item judged less rigorous
    pub loser: String,
}

/// The normalized judgements for one (study, dimension) pair, together with
/// what the loader had to leave unresolved.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JudgementSet {
    /// Study the judgements were filtered to
    pub study: String,
    /// Judgement dimension the judgements were filtered to
    pub dimension: String,
    /// The comparisons, in file order
    pub judgements: Vec<Judgement>,
    /// Ids that appeared in the data but not in the lookup table
    pub unknown_ids: Vec<u32>,
}

impl JudgementSet {
    /// All distinct item names, sorted.
    #[must_use]
    pub fn items(&self) -> Vec<String> {
        let mut items = BTreeSet::new();
        for j in &self.judgements {
            items.insert(j.winner.clone());
            items.insert(j.loser.clone());
        }
        items.into_iter().collect()
    }

    /// All distinct judge identifiers, sorted.
    #[must_use]
    pub fn judges(&self) -> Vec<String> {
        let mut judges = BTreeSet::new();
        for j in &self.judgements {
            judges.insert(j.judge.clone());
        }
        judges.into_iter().collect()
    }

    /// Number of comparisons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.judgements.len()
    }

    /// Whether the set holds no comparisons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.judgements.is_empty()
    }
}
