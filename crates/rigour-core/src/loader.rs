//! CSV loading and normalization for the judgement dataset.
//!
//! The input file mixes several studies and judgement dimensions; rows are
//! filtered to one (study, dimension) pair, and the numeric `Won`/`Lost` ids
//! are resolved to proof names through the [`ItemLookup`], once per role,
//! with the same translation joined against both columns. An id the lookup does
//! not know resolves to an empty name and the row is kept; the caller can
//! inspect [`JudgementSet::unknown_ids`] to warn about it.

use std::{fs, path::Path};

use crate::{
    judgement::{Judgement, JudgementSet},
    lookup::ItemLookup,
};

/// Required columns, by the names the dataset uses.
const COLUMN_STUDY: &str = "study";
const COLUMN_DIMENSION: &str = "dimension";
const COLUMN_WON: &str = "Won";
const COLUMN_LOST: &str = "Lost";
const COLUMN_JUDGE: &str = "JudgeID";

#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum LoadError {
    #[display("failed to read judgement file")]
    Io(std::io::Error),
    #[display("judgement file has no header row")]
    MissingHeader,
    #[display("missing required column '{name}'")]
    #[from(ignore)]
    MissingColumn { name: String },
    #[display("line {line}: {message}")]
    #[from(ignore)]
    MalformedRow { line: usize, message: String },
}

/// Positions of the required columns within the header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    study: usize,
    dimension: usize,
    won: usize,
    lost: usize,
    judge: usize,
}

impl ColumnIndex {
    fn from_header(header: &str) -> Result<Self, LoadError> {
        let names: Vec<&str> = header.split(',').map(str::trim).collect();
        let find = |name: &str| {
            names
                .iter()
                .position(|n| *n == name)
                .ok_or_else(|| LoadError::MissingColumn {
                    name: name.to_owned(),
                })
        };
        Ok(Self {
            study: find(COLUMN_STUDY)?,
            dimension: find(COLUMN_DIMENSION)?,
            won: find(COLUMN_WON)?,
            lost: find(COLUMN_LOST)?,
            judge: find(COLUMN_JUDGE)?,
        })
    }
}

/// Loads judgements from a CSV file, filtered to one study and dimension.
pub fn load_judgements<P>(
    path: P,
    study: &str,
    dimension: &str,
    lookup: &ItemLookup,
) -> Result<JudgementSet, LoadError>
where
    P: AsRef<Path>,
{
    let text = fs::read_to_string(path)?;
    parse_judgement_csv(&text, study, dimension, lookup)
}

/// Parses judgement CSV text, filtered to one study and dimension.
///
/// The dataset is plain comma-separated values without quoting; fields are
/// trimmed, and a trailing carriage return on a line is tolerated. Column
/// order is taken from the header row.
pub fn parse_judgement_csv(
    text: &str,
    study: &str,
    dimension: &str,
    lookup: &ItemLookup,
) -> Result<JudgementSet, LoadError> {
    let mut lines = text.lines();
    let header = lines.next().ok_or(LoadError::MissingHeader)?;
    let columns = ColumnIndex::from_header(header)?;

    let mut judgements = Vec::new();
    let mut unknown_ids = Vec::new();
    for (line_no, line) in lines.enumerate() {
        // 1-based, counting the header
        let line_no = line_no + 2;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let field = |idx: usize| -> Result<&str, LoadError> {
            fields
                .get(idx)
                .copied()
                .ok_or_else(|| LoadError::MalformedRow {
                    line: line_no,
                    message: format!(
                        "expected at least {} fields, got {}",
                        idx + 1,
                        fields.len()
                    ),
                })
        };

        if field(columns.study)? != study || field(columns.dimension)? != dimension {
            continue;
        }

        let won = parse_id(field(columns.won)?, COLUMN_WON, line_no)?;
        let lost = parse_id(field(columns.lost)?, COLUMN_LOST, line_no)?;
        let judge = field(columns.judge)?.to_owned();

        let winner = resolve_or_record(lookup, won, &mut unknown_ids);
        let loser = resolve_or_record(lookup, lost, &mut unknown_ids);

        judgements.push(Judgement {
            judge,
            winner,
            loser,
        });
    }

    Ok(JudgementSet {
        study: study.to_owned(),
        dimension: dimension.to_owned(),
        judgements,
        unknown_ids,
    })
}

fn parse_id(raw: &str, column: &str, line: usize) -> Result<u32, LoadError> {
    raw.parse().map_err(|_| LoadError::MalformedRow {
        line,
        message: format!("column '{column}' is not a numeric id: '{raw}'"),
    })
}

fn resolve_or_record(lookup: &ItemLookup, id: u32, unknown_ids: &mut Vec<u32>) -> String {
    match lookup.resolve(id) {
        Some(name) => name.to_owned(),
        None => {
            if !unknown_ids.contains(&id) {
                unknown_ids.push(id);
            }
            String::new()
        }
    }
}
