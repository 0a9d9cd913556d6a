//! Correlation matrix across the four score columns.

use rigour_stats::correlation::{CorrelationMethod, pearson_p_value};
use serde::Serialize;

use crate::score_table::{ScoreColumn, ScoreTable};

/// One pairwise correlation.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationCell {
    /// The coefficient; `NaN` when fewer than two complete pairs exist
    pub r: f64,
    /// Two-sided p-value from the t approximation of the coefficient;
    /// exact for Pearson, the usual approximation for Spearman, rough for
    /// Kendall
    pub p: f64,
    /// Number of pairwise-complete rows the coefficient was computed over
    pub n: usize,
    /// Significance stars: `***` p < .001, `**` p < .01, `*` p < .05
    pub stars: &'static str,
}

/// Correlation matrix over the score columns.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    /// Name of the coefficient used
    pub method: String,
    /// Column names, indexing both matrix dimensions
    pub columns: Vec<&'static str>,
    /// `cells[i][j]` correlates column `i` with column `j`
    pub cells: Vec<Vec<CorrelationCell>>,
}

/// Computes the correlation matrix over pairwise-complete rows.
#[must_use]
pub fn correlation_matrix(table: &ScoreTable, method: CorrelationMethod) -> CorrelationMatrix {
    let columns: Vec<&'static str> = ScoreColumn::ALL.iter().map(|c| c.name()).collect();
    let cells = ScoreColumn::ALL
        .iter()
        .map(|&a| {
            ScoreColumn::ALL
                .iter()
                .map(|&b| {
                    let (xs, ys) = table.pairwise_complete(a, b);
                    let r = method.compute(&xs, &ys);
                    let p = pearson_p_value(r, xs.len());
                    CorrelationCell {
                        r,
                        p,
                        n: xs.len(),
                        stars: stars(p),
                    }
                })
                .collect()
        })
        .collect();

    CorrelationMatrix {
        method: method_name(method).to_owned(),
        columns,
        cells,
    }
}

fn method_name(method: CorrelationMethod) -> &'static str {
    match method {
        CorrelationMethod::Pearson => "pearson",
        CorrelationMethod::Spearman => "spearman",
        CorrelationMethod::Kendall => "kendall",
    }
}

fn stars(p: f64) -> &'static str {
    if !p.is_finite() {
        ""
    } else if p < 0.001 {
        "***"
    } else if p < 0.01 {
        "**"
    } else if p < 0.05 {
        "*"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    fn table_from(columns: [&[(&str, f64)]; 4]) -> ScoreTable {
        let maps: Vec<BTreeMap<String, f64>> = columns
            .iter()
            .map(|pairs| {
                pairs
                    .iter()
                    .map(|(k, v)| ((*k).to_owned(), *v))
                    .collect()
            })
            .collect();
        ScoreTable::assemble(&maps[0], &maps[1], &maps[2], &maps[3])
    }

    #[test]
    fn diagonal_is_one() {
        let col: &[(&str, f64)] = &[("A", 1.0), ("B", 2.0), ("C", 3.0)];
        let matrix = correlation_matrix(
            &table_from([col, col, col, col]),
            CorrelationMethod::Pearson,
        );
        for i in 0..4 {
            assert!((matrix.cells[i][i].r - 1.0).abs() < 1e-12);
        }
    }

    #[test]
    fn matrix_is_symmetric() {
        let a: &[(&str, f64)] = &[("A", 1.0), ("B", 5.0), ("C", 2.0), ("D", 4.0)];
        let b: &[(&str, f64)] = &[("A", 2.0), ("B", 4.0), ("C", 1.0), ("D", 5.0)];
        let c: &[(&str, f64)] = &[("A", 3.0), ("B", 1.0), ("C", 4.0), ("D", 2.0)];
        let d: &[(&str, f64)] = &[("A", 1.0), ("B", 2.0), ("C", 3.0), ("D", 4.0)];
        let matrix =
            correlation_matrix(&table_from([a, b, c, d]), CorrelationMethod::Spearman);
        for i in 0..4 {
            for j in 0..4 {
                assert!((matrix.cells[i][j].r - matrix.cells[j][i].r).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn incomplete_rows_shrink_n() {
        let full: &[(&str, f64)] = &[("A", 1.0), ("B", 2.0), ("C", 3.0)];
        let partial: &[(&str, f64)] = &[("A", 1.0), ("B", 2.0)];
        let empty: &[(&str, f64)] = &[];
        let matrix = correlation_matrix(
            &table_from([full, partial, empty, empty]),
            CorrelationMethod::Pearson,
        );
        assert_eq!(matrix.cells[0][0].n, 3);
        assert_eq!(matrix.cells[0][1].n, 2);
        assert_eq!(matrix.cells[2][3].n, 0);
        assert!(matrix.cells[2][3].r.is_nan());
    }

    #[test]
    fn stars_follow_the_thresholds() {
        assert_eq!(stars(0.0001), "***");
        assert_eq!(stars(0.005), "**");
        assert_eq!(stars(0.03), "*");
        assert_eq!(stars(0.2), "");
        assert_eq!(stars(f64::NAN), "");
    }
}
