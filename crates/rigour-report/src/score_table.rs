//! The joined per-item score table.
//!
//! Each ranking method contributes one column; rows are keyed by item name.
//! Assembly is a sequence of left outer joins anchored by whichever source
//! is joined first: later sources fill their column for items already
//! present and append rows for items the earlier sources never mentioned,
//! so every item that appears in any model's output gets a row. Missing
//! joins surface as empty cells, never as errors.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

/// The four score columns, in the fixed order the comparison table uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoreColumn {
    /// Frequentist Bradley-Terry log-strength
    Btm,
    /// Bayesian Bradley-Terry posterior mean log-strength
    BayesianBtm,
    /// Across-run mean final Elo rating
    Elo,
    /// PageRank stationary probability
    PageRank,
}

impl ScoreColumn {
    /// All columns in table order.
    pub const ALL: [Self; 4] = [Self::Btm, Self::BayesianBtm, Self::Elo, Self::PageRank];

    /// The column's name in rendered and serialized output.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Btm => "btm_score",
            Self::BayesianBtm => "bayesian_btm_score",
            Self::Elo => "elo_score",
            Self::PageRank => "page_rank_score",
        }
    }
}

/// One row of the joined table.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreRow {
    /// Item name
    pub item: String,
    /// Frequentist Bradley-Terry score, if that model produced one
    pub btm_score: Option<f64>,
    /// Bayesian Bradley-Terry score, if that model produced one
    pub bayesian_btm_score: Option<f64>,
    /// Elo score, if that model produced one
    pub elo_score: Option<f64>,
    /// PageRank score, if that model produced one
    pub page_rank_score: Option<f64>,
}

impl ScoreRow {
    fn empty(item: String) -> Self {
        Self {
            item,
            btm_score: None,
            bayesian_btm_score: None,
            elo_score: None,
            page_rank_score: None,
        }
    }

    /// The cell for one column.
    #[must_use]
    pub const fn get(&self, column: ScoreColumn) -> Option<f64> {
        match column {
            ScoreColumn::Btm => self.btm_score,
            ScoreColumn::BayesianBtm => self.bayesian_btm_score,
            ScoreColumn::Elo => self.elo_score,
            ScoreColumn::PageRank => self.page_rank_score,
        }
    }

    fn set(&mut self, column: ScoreColumn, value: f64) {
        match column {
            ScoreColumn::Btm => self.btm_score = Some(value),
            ScoreColumn::BayesianBtm => self.bayesian_btm_score = Some(value),
            ScoreColumn::Elo => self.elo_score = Some(value),
            ScoreColumn::PageRank => self.page_rank_score = Some(value),
        }
    }
}

/// The joined score table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScoreTable {
    rows: Vec<ScoreRow>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl ScoreTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembles the table from all four methods' scores, joining in the
    /// fixed column order.
    #[must_use]
    pub fn assemble(
        btm: &BTreeMap<String, f64>,
        bayesian_btm: &BTreeMap<String, f64>,
        elo: &BTreeMap<String, f64>,
        page_rank: &BTreeMap<String, f64>,
    ) -> Self {
        let mut table = Self::new();
        table.join(ScoreColumn::Btm, btm);
        table.join(ScoreColumn::BayesianBtm, bayesian_btm);
        table.join(ScoreColumn::Elo, elo);
        table.join(ScoreColumn::PageRank, page_rank);
        table
    }

    /// Left-joins one method's scores into the table.
    ///
    /// Items already present get their cell filled (last value wins if a
    /// key repeats); unseen items are appended in the source's own order.
    pub fn join(&mut self, column: ScoreColumn, scores: &BTreeMap<String, f64>) {
        for (item, &value) in scores {
            match self.index.get(item) {
                Some(&row) => self.rows[row].set(column, value),
                None => {
                    let mut row = ScoreRow::empty(item.clone());
                    row.set(column, value);
                    self.index.insert(item.clone(), self.rows.len());
                    self.rows.push(row);
                }
            }
        }
    }

    /// The joined rows, in join order.
    #[must_use]
    pub fn rows(&self) -> &[ScoreRow] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The paired values of two columns over rows where both cells are
    /// present. This is what the correlation matrix is computed over.
    #[must_use]
    pub fn pairwise_complete(&self, a: ScoreColumn, b: ScoreColumn) -> (Vec<f64>, Vec<f64>) {
        let mut xs = Vec::new();
        let mut ys = Vec::new();
        for row in &self.rows {
            if let (Some(x), Some(y)) = (row.get(a), row.get(b)) {
                xs.push(x);
                ys.push(y);
            }
        }
        (xs, ys)
    }
}
