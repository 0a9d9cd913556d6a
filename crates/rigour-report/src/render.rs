//! Plain-text rendering of the score table and correlation matrix.

use std::fmt::Write as _;

use crate::{
    matrix::CorrelationMatrix,
    score_table::{ScoreColumn, ScoreTable},
};

/// Width of each numeric column in rendered tables.
const CELL_WIDTH: usize = 20;

/// Placeholder for an empty cell.
const MISSING: &str = "NA";

/// Renders the joined score table as aligned text.
#[must_use]
pub fn render_score_table(table: &ScoreTable) -> String {
    let item_width = table
        .rows()
        .iter()
        .map(|r| r.item.len())
        .chain(["item".len()])
        .max()
        .unwrap_or(4);

    let mut out = String::new();
    let _ = write!(out, "{:<item_width$}", "item");
    for column in ScoreColumn::ALL {
        let _ = write!(out, "{:>CELL_WIDTH$}", column.name());
    }
    out.push('\n');

    for row in table.rows() {
        let _ = write!(out, "{:<item_width$}", row.item);
        for column in ScoreColumn::ALL {
            match row.get(column) {
                Some(value) => {
                    let _ = write!(out, "{value:>CELL_WIDTH$.6}");
                }
                None => {
                    let _ = write!(out, "{MISSING:>CELL_WIDTH$}");
                }
            }
        }
        out.push('\n');
    }
    out
}

/// Renders the correlation matrix as aligned text, coefficients annotated
/// with significance stars.
#[must_use]
pub fn render_correlation_matrix(matrix: &CorrelationMatrix) -> String {
    let label_width = matrix
        .columns
        .iter()
        .map(|c| c.len())
        .max()
        .unwrap_or(0)
        .max(matrix.method.len());

    let mut out = String::new();
    let _ = write!(out, "{:<label_width$}", matrix.method);
    for column in &matrix.columns {
        let _ = write!(out, "{column:>CELL_WIDTH$}");
    }
    out.push('\n');

    for (label, row) in matrix.columns.iter().zip(&matrix.cells) {
        let _ = write!(out, "{label:<label_width$}");
        for cell in row {
            let rendered = if cell.r.is_nan() {
                MISSING.to_owned()
            } else {
                format!("{:.3}{}", cell.r, cell.stars)
            };
            let _ = write!(out, "{rendered:>CELL_WIDTH$}");
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rigour_stats::correlation::CorrelationMethod;

    use super::*;
    use crate::matrix::correlation_matrix;

    fn sample_table() -> ScoreTable {
        let a: BTreeMap<String, f64> = [("Proof1", 0.5), ("Proof2", -0.5)]
            .iter()
            .map(|(k, v)| ((*k).to_owned(), *v))
            .collect();
        let empty = BTreeMap::new();
        ScoreTable::assemble(&a, &a, &empty, &empty)
    }

    #[test]
    fn score_table_renders_header_rows_and_missing_cells() {
        let text = render_score_table(&sample_table());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("btm_score"));
        assert!(lines[0].contains("page_rank_score"));
        assert!(lines[1].starts_with("Proof1"));
        assert!(lines[1].contains("0.500000"));
        assert!(lines[1].contains(MISSING));
    }

    #[test]
    fn correlation_matrix_renders_square_output() {
        let matrix = correlation_matrix(&sample_table(), CorrelationMethod::Pearson);
        let text = render_correlation_matrix(&matrix);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("pearson"));
        assert!(lines[1].starts_with("btm_score"));
    }
}
