use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// A single normalized row from one judge's ranking output.
///
/// A row with `superseded_by` set is a merge vote (a "this sequence was
/// withdrawn in favor of that one" annotation) and never contributes a
/// rating of its own.
#[derive(Debug, Clone)]
pub struct ScoreRow {
    pub judge: String,
    pub sequence: String,
    pub rating: Option<f64>,
    pub invalid: bool,
    pub superseded_by: Option<String>,
}

/// Directed merge annotation: the `child` record was withdrawn in favor of
/// `parent`. Either side may name a sequence not present in any ranking row;
/// such sequences are registered as singleton nodes by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeEdge {
    pub child: String,
    pub parent: String,
}

/// A row from the auxiliary dataset. `value` absent marks a baseline row
/// (a fixed reference point rather than a data point).
#[derive(Debug, Clone)]
pub struct AuxRow {
    pub sequence: String,
    pub value: Option<f64>,
}

// ---------------------------------------------------------------------------
// Canonical mapping
// ---------------------------------------------------------------------------

/// Total mapping from registered sequence to its canonical representative.
///
/// One fixed point per equivalence group: `canonical_of(c) == c` for every
/// canonical sequence `c`. Sequences the resolver never saw map to
/// themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalMap(BTreeMap<String, String>);

impl CanonicalMap {
    pub fn new(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }

    /// Canonical representative for `sequence`; identity for sequences the
    /// resolver never registered.
    pub fn canonical_of<'a>(&'a self, sequence: &'a str) -> &'a str {
        self.0.get(sequence).map(String::as_str).unwrap_or(sequence)
    }

    pub fn get(&self, sequence: &str) -> Option<&str> {
        self.0.get(sequence).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The distinct canonical representatives.
    pub fn canonicals(&self) -> BTreeSet<&str> {
        self.0.values().map(String::as_str).collect()
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Canonical sequence -> mean rating. BTreeMap so iteration and
/// serialization order are deterministic.
pub type RatingMap = BTreeMap<String, f64>;

/// Per-judge rating maps plus the equal-weight-per-judge combined map.
#[derive(Debug, Clone, Serialize)]
pub struct JudgeAverages {
    pub per_judge: BTreeMap<String, RatingMap>,
    pub combined: RatingMap,
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

/// One joined (auxiliary value, mean rating) data point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinPoint {
    pub value: f64,
    pub rating: f64,
}

/// A raw/canonical pair for which no rating was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingExample {
    pub raw: String,
    pub canonical: String,
}

/// Join counters. Absence of a rating is an expected, counted outcome, not
/// an error.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JoinDiagnostics {
    /// Rows with a non-blank sequence, before any exclusion.
    pub rows_seen: usize,
    /// Rows carrying a numeric auxiliary value, before the invalid skip.
    pub numeric_rows: usize,
    /// Rows carrying a numeric auxiliary value that matched a rating.
    pub matched_rows: usize,
    /// Rows (baseline or data) whose canonical sequence had no rating.
    pub missing_total: usize,
    /// First `MISSING_EXAMPLE_CAP` missing rows, for operator triage.
    pub missing_examples: Vec<MissingExample>,
    /// Missing count per canonical sequence, for ranking the biggest gaps.
    pub missing_by_canonical: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JoinOutput {
    pub points: Vec<JoinPoint>,
    pub baseline: BTreeMap<String, f64>,
    pub diagnostics: JoinDiagnostics,
}
