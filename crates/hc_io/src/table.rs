//! Historical vote table reader.
//!
//! Input shape: semicolon-delimited, one header row holding the label column
//! (`Partido` by default) and one column per district. Every column is read as
//! text and parsed here; the placeholders `c.r.` and `-` and empty cells are
//! zero votes.

use std::collections::BTreeSet;
use std::fs;
use std::io::Cursor;
use std::path::Path;

use hc_core::{DistrictId, HistoricalVoteTable, HistoryRow};
use polars::io::SerReader;
use polars::prelude::{CsvReadOptions, DataType};

use crate::{IoError, IoResult};

/// Cell tokens that stand for "no votes recorded".
pub const PLACEHOLDER_TOKENS: &[&str] = &["c.r.", "-"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read and parse a table file.
pub fn read_history_path(path: &Path, label_column: &str) -> IoResult<HistoricalVoteTable> {
    let bytes = fs::read(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    read_history_bytes(&bytes, label_column)
}

/// Parse a table already in memory.
///
/// `IoError::Table::row` is the 1-based line number (the header is line 1).
pub fn read_history_bytes(bytes: &[u8], label_column: &str) -> IoResult<HistoricalVoteTable> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    // Headerless read: polars renames repeated header names, so the header
    // row is taken from line 1 here and checked for duplicates.
    let df = CsvReadOptions::default()
        .with_has_header(false)
        .map_parse_options(|po| po.with_separator(b';'))
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    let cells: Vec<Vec<Option<String>>> = df
        .get_columns()
        .iter()
        .map(|c| -> IoResult<Vec<Option<String>>> {
            let c = c.cast(&DataType::String)?;
            Ok(c.str()?.into_iter().map(|v| v.map(|v| v.trim().to_string())).collect())
        })
        .collect::<IoResult<_>>()?;

    let names: Vec<String> = cells
        .iter()
        .map(|col| col.first().cloned().flatten().unwrap_or_default())
        .collect();
    let label_idx = names
        .iter()
        .position(|n| n == label_column)
        .ok_or_else(|| IoError::Table {
            row: 1,
            column: label_column.to_string(),
            msg: "label column not found in header".into(),
        })?;

    let mut seen = BTreeSet::new();
    for n in &names {
        if !seen.insert(n.as_str()) {
            return Err(IoError::Integrity(format!("duplicate column {n:?} in table header")));
        }
    }

    let mut districts = Vec::with_capacity(names.len().saturating_sub(1));
    let mut value_cols = Vec::with_capacity(names.len().saturating_sub(1));
    for (j, name) in names.iter().enumerate() {
        if j == label_idx {
            continue;
        }
        let id = DistrictId::new(name.as_str()).map_err(|e| IoError::Table {
            row: 1,
            column: name.clone(),
            msg: e.to_string(),
        })?;
        districts.push(id);
        value_cols.push(j);
    }

    // Line numbers are 1-based; line 1 is the header.
    let mut rows = Vec::with_capacity(df.height().saturating_sub(1));
    for i in 1..df.height() {
        let line = i + 1;
        let mut votes = Vec::with_capacity(value_cols.len());
        let mut blank = true;
        for &j in &value_cols {
            let cell = cells[j][i].as_deref();
            if cell.is_some_and(|s| !s.is_empty()) {
                blank = false;
            }
            votes.push(parse_cell(cell).map_err(|msg| IoError::Table {
                row: line,
                column: names[j].clone(),
                msg,
            })?);
        }
        match cells[label_idx][i].as_deref().filter(|s| !s.is_empty()) {
            Some(label) => rows.push(HistoryRow { label: label.to_string(), votes }),
            None if blank => continue,
            None => {
                return Err(IoError::Table {
                    row: line,
                    column: label_column.to_string(),
                    msg: "row has values but no label".into(),
                })
            }
        }
    }

    tracing::debug!(rows = rows.len(), districts = districts.len(), "historical table parsed");
    Ok(HistoricalVoteTable::new(districts, rows)?)
}

fn parse_cell(cell: Option<&str>) -> Result<f64, String> {
    let s = match cell {
        None => return Ok(0.0),
        Some(s) => s.trim(),
    };
    if s.is_empty() || PLACEHOLDER_TOKENS.contains(&s) {
        return Ok(0.0);
    }
    let v: f64 = s.parse().map_err(|_| format!("not a vote count: {s:?}"))?;
    if !v.is_finite() || v < 0.0 {
        return Err(format!("vote count must be finite and non-negative, got {s}"));
    }
    Ok(v)
}
