use std::collections::BTreeMap;

/// Mapping from the dataset's opaque numeric item ids to proof names.
///
/// The judgement CSV refers to proofs by number; every analysis downstream
/// keys on the human-readable names instead. Identity after translation is
/// the name string alone.
#[derive(Debug, Clone)]
pub struct ItemLookup {
    entries: BTreeMap<u32, String>,
}

impl ItemLookup {
    /// Builds a lookup from (id, name) pairs. A repeated id keeps the last
    /// name given for it.
    #[must_use]
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (u32, S)>,
        S: Into<String>,
    {
        let entries = pairs
            .into_iter()
            .map(|(id, name)| (id, name.into()))
            .collect();
        Self { entries }
    }

    /// The fixed 15-proof vocabulary used by the rigour studies:
    /// ids 1 through 15 mapped to `Proof1` through `Proof15`.
    #[must_use]
    pub fn default_proofs() -> Self {
        Self::from_pairs((1..=15).map(|id| (id, format!("Proof{id}"))))
    }

    /// Resolves an id to its item name, if known.
    #[must_use]
    pub fn resolve(&self, id: u32) -> Option<&str> {
        self.entries.get(&id).map(String::as_str)
    }

    /// Number of known items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the lookup holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
