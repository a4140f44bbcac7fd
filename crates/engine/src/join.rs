use std::collections::BTreeSet;

use crate::model::{
    AuxRow, CanonicalMap, JoinDiagnostics, JoinOutput, JoinPoint, MissingExample, RatingMap,
};

/// Cap on the recorded missing-example list. The histogram stays complete;
/// only the verbatim examples are bounded.
pub const MISSING_EXAMPLE_CAP: usize = 10;

/// Join auxiliary rows against a rating map.
///
/// Rows whose canonical sequence is invalid are skipped. Rows without an
/// auxiliary value are baseline rows and land in `baseline`; rows with one
/// become `points`. Either kind with no rating for its canonical sequence
/// is counted as missing, never an error.
///
/// `track_missing` enables the example list and per-canonical histogram;
/// the cheap path (used for secondary per-judge passes) keeps counters only.
pub fn join(
    rows: &[AuxRow],
    mapping: &CanonicalMap,
    invalid_canon: &BTreeSet<String>,
    ratings: &RatingMap,
    track_missing: bool,
) -> JoinOutput {
    let mut points = Vec::new();
    let mut baseline = std::collections::BTreeMap::new();
    let mut diagnostics = JoinDiagnostics::default();

    for row in rows {
        if row.sequence.is_empty() {
            continue;
        }
        diagnostics.rows_seen += 1;
        if row.value.is_some() {
            diagnostics.numeric_rows += 1;
        }

        let canonical = mapping.canonical_of(&row.sequence);
        if invalid_canon.contains(canonical) {
            continue;
        }

        let rating = match ratings.get(canonical) {
            Some(&r) => r,
            None => {
                diagnostics.missing_total += 1;
                if track_missing {
                    *diagnostics
                        .missing_by_canonical
                        .entry(canonical.to_string())
                        .or_insert(0) += 1;
                    if diagnostics.missing_examples.len() < MISSING_EXAMPLE_CAP {
                        diagnostics.missing_examples.push(MissingExample {
                            raw: row.sequence.clone(),
                            canonical: canonical.to_string(),
                        });
                    }
                }
                continue;
            }
        };

        match row.value {
            None => {
                baseline.insert(canonical.to_string(), rating);
            }
            Some(value) => {
                points.push(JoinPoint { value, rating });
                diagnostics.matched_rows += 1;
            }
        }
    }

    JoinOutput {
        points,
        baseline,
        diagnostics,
    }
}

/// The `n` canonical sequences with the most missing rows, biggest first.
pub fn top_missing(diagnostics: &JoinDiagnostics, n: usize) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = diagnostics
        .missing_by_canonical
        .iter()
        .map(|(seq, &count)| (seq.clone(), count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);
    ranked
}
