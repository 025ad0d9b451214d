//! Delimited-text table parser.
//!
//! Reads CSV-like text into a [`ParsedTable`]:
//!
//! - The first non-empty row is the header; its cells become field names.
//! - Duplicate header names get a numeric suffix (`name`, `name_1`, ...).
//! - Quoted cells follow RFC 4180: `"a, b"`, doubled quotes `""` inside.
//! - Blank lines are skipped.
//! - The delimiter is guessed from `,`, `\t`, `|`, `;` unless fixed.
//!
//! Rows shorter than the header simply lack the trailing fields; cells beyond
//! the header width are dropped.

use super::backend::{AdapterError, ParsedTable, TableParser};
use std::collections::{HashMap, HashSet};

const CANDIDATE_DELIMITERS: &[char] = &[',', '\t', '|', ';'];

/// Number of leading rows inspected when guessing the delimiter.
const GUESS_SAMPLE_ROWS: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct DelimitedTableParser {
    /// Fixed delimiter. `None` guesses one from the input.
    pub delimiter: Option<char>,
}

impl TableParser for DelimitedTableParser {
    fn parse(&self, text: &str) -> Result<ParsedTable, AdapterError> {
        let delimiter = self.delimiter.unwrap_or_else(|| guess_delimiter(text));
        let mut rows = split_rows(text, delimiter)?.into_iter();

        let Some(header) = rows.next() else {
            return Ok(ParsedTable::default());
        };
        let fields = dedupe_fields(header);

        let records = rows
            .map(|row| {
                fields
                    .iter()
                    .cloned()
                    .zip(row)
                    .collect::<HashMap<String, String>>()
            })
            .collect();

        Ok(ParsedTable { fields, records })
    }
}

/// Pick the candidate delimiter that splits the sample rows most consistently
/// into more than one column. Falls back to `,`.
fn guess_delimiter(text: &str) -> char {
    let mut best = (',', 0usize);
    for &candidate in CANDIDATE_DELIMITERS {
        let Ok(rows) = split_rows(text, candidate) else {
            continue;
        };
        let sample: Vec<usize> = rows.iter().take(GUESS_SAMPLE_ROWS).map(Vec::len).collect();
        let Some(&first) = sample.first() else {
            continue;
        };
        if first < 2 || sample.iter().any(|&n| n != first) {
            continue;
        }
        if first > best.1 {
            best = (candidate, first);
        }
    }
    best.0
}

fn dedupe_fields(header: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    let mut fields = Vec::with_capacity(header.len());
    for name in header {
        let mut candidate = name.clone();
        if used.contains(&candidate) {
            let suffix = next_suffix.entry(name.clone()).or_insert(1);
            loop {
                candidate = format!("{name}_{suffix}");
                *suffix += 1;
                if !used.contains(&candidate) {
                    break;
                }
            }
        }
        used.insert(candidate.clone());
        fields.push(candidate);
    }
    fields
}

/// Split text into rows of cells, honoring quotes. Blank lines are skipped.
fn split_rows(text: &str, delimiter: char) -> Result<Vec<Vec<String>>, AdapterError> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut cell_started = false;
    let mut chars = text.chars().peekable();

    let mut end_row = |row: &mut Vec<String>, cell: &mut String, cell_started: bool| {
        if cell_started || !row.is_empty() {
            row.push(std::mem::take(cell));
            rows.push(std::mem::take(row));
        }
    };

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    cell.push('"');
                }
                '"' => in_quotes = false,
                _ => cell.push(c),
            }
            continue;
        }
        match c {
            '"' if cell.is_empty() => {
                in_quotes = true;
                cell_started = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                end_row(&mut row, &mut cell, cell_started);
                cell_started = false;
            }
            c if c == delimiter => {
                row.push(std::mem::take(&mut cell));
                cell_started = true;
            }
            _ => {
                cell.push(c);
                cell_started = true;
            }
        }
    }

    if in_quotes {
        return Err(AdapterError::Failed(
            "unterminated quoted field".to_string(),
        ));
    }
    end_row(&mut row, &mut cell, cell_started);
    Ok(rows)
}
