//! CSV-string ingestion. Callers hand over file *contents*; this module
//! resolves column-name aliases and normalizes cells into model rows.

use crate::error::MergeError;
use crate::model::{AuxRow, ScoreRow};

/// Header aliases, tried in order. First hit wins.
pub const SEQUENCE_ALIASES: &[&str] = &["sequence", "seq", "peptide"];
pub const RATING_ALIASES: &[&str] = &["elo", "rating"];
pub const INVALID_ALIASES: &[&str] = &["invalid"];
pub const SUPERSEDED_ALIASES: &[&str] = &["removed_for", "removed"];
pub const AUX_VALUE_ALIASES: &[&str] = &["n_results", "count"];

/// Truthy flag cells as the ranking exports write them.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "y"
    )
}

/// Tagged numeric parse: malformed ratings become `None`, never an error.
pub fn parse_rating(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Supersession cells left behind by spreadsheet round-trips.
fn normalize_supersession(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") || trimmed.eq_ignore_ascii_case("none")
    {
        return None;
    }
    Some(trimmed.to_string())
}

fn strip_bom(header: &str) -> &str {
    header.trim_start_matches('\u{feff}')
}

/// Index of the first header matching any alias.
fn find_column(headers: &[String], aliases: &[&str]) -> Option<usize> {
    aliases
        .iter()
        .find_map(|alias| headers.iter().position(|h| h == alias))
}

fn read_headers<'a>(
    csv_data: &'a str,
    role: &str,
) -> Result<(csv::Reader<&'a [u8]>, Vec<String>), MergeError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| MergeError::Csv {
            role: role.into(),
            message: e.to_string(),
        })?
        .iter()
        .map(|h| strip_bom(h).to_string())
        .collect();
    Ok((reader, headers))
}

/// Parse one judge's ranking CSV into score rows.
///
/// Blank sequences are skipped. A missing rating cell (or one that does not
/// parse as a number) yields `rating: None`; the aggregator drops it later.
/// The invalid and supersession columns are optional.
pub fn load_ranking_rows(judge: &str, csv_data: &str) -> Result<Vec<ScoreRow>, MergeError> {
    let (mut reader, headers) = read_headers(csv_data, judge)?;

    let seq_idx = find_column(&headers, SEQUENCE_ALIASES).ok_or_else(|| {
        MergeError::MissingColumn {
            role: judge.into(),
            column: SEQUENCE_ALIASES[0].into(),
        }
    })?;
    let rating_idx = find_column(&headers, RATING_ALIASES).ok_or_else(|| {
        MergeError::MissingColumn {
            role: judge.into(),
            column: RATING_ALIASES[0].into(),
        }
    })?;
    let invalid_idx = find_column(&headers, INVALID_ALIASES);
    let superseded_idx = find_column(&headers, SUPERSEDED_ALIASES);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| MergeError::Csv {
            role: judge.into(),
            message: e.to_string(),
        })?;

        let sequence = record.get(seq_idx).unwrap_or("").trim().to_string();
        if sequence.is_empty() {
            continue;
        }

        let superseded_by = superseded_idx
            .and_then(|i| record.get(i))
            .and_then(normalize_supersession);
        let invalid = invalid_idx
            .and_then(|i| record.get(i))
            .map(parse_flag)
            .unwrap_or(false);
        let rating = record.get(rating_idx).and_then(|v| parse_rating(v));

        rows.push(ScoreRow {
            judge: judge.to_string(),
            sequence,
            rating,
            invalid,
            superseded_by,
        });
    }

    Ok(rows)
}

/// Parse the auxiliary dataset CSV. Non-numeric value cells mark baseline
/// rows rather than failing the load.
pub fn load_aux_rows(csv_data: &str) -> Result<Vec<AuxRow>, MergeError> {
    const ROLE: &str = "aux";
    let (mut reader, headers) = read_headers(csv_data, ROLE)?;

    let seq_idx = find_column(&headers, SEQUENCE_ALIASES).ok_or_else(|| {
        MergeError::MissingColumn {
            role: ROLE.into(),
            column: SEQUENCE_ALIASES[0].into(),
        }
    })?;
    let value_idx = find_column(&headers, AUX_VALUE_ALIASES).ok_or_else(|| {
        MergeError::MissingColumn {
            role: ROLE.into(),
            column: AUX_VALUE_ALIASES[0].into(),
        }
    })?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| MergeError::Csv {
            role: ROLE.into(),
            message: e.to_string(),
        })?;

        let sequence = record.get(seq_idx).unwrap_or("").trim().to_string();
        if sequence.is_empty() {
            continue;
        }
        let value = record.get(value_idx).and_then(|v| parse_rating(v));

        rows.push(AuxRow { sequence, value });
    }

    Ok(rows)
}
