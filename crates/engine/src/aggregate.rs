use std::collections::{BTreeMap, BTreeSet};

use crate::model::{CanonicalMap, JudgeAverages, RatingMap, ScoreRow};

/// Canonical images of the raw invalid set. Invalidity propagates through
/// the mapping: one invalid member poisons its whole group.
pub fn invalid_canonicals(
    mapping: &CanonicalMap,
    invalid_raw: &BTreeSet<String>,
) -> BTreeSet<String> {
    invalid_raw
        .iter()
        .map(|seq| mapping.canonical_of(seq).to_string())
        .collect()
}

/// Mean rating per canonical sequence for one judge's rows.
///
/// Rows that are invalid, superseded (merge votes), rating-less, or whose
/// canonical sequence is invalid are excluded, not errors.
pub fn judge_average(
    rows: &[&ScoreRow],
    mapping: &CanonicalMap,
    invalid_canon: &BTreeSet<String>,
) -> RatingMap {
    let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();

    for row in rows {
        if row.invalid || row.superseded_by.is_some() || row.sequence.is_empty() {
            continue;
        }
        let rating = match row.rating {
            Some(r) => r,
            None => continue,
        };
        let canonical = mapping.canonical_of(&row.sequence);
        if invalid_canon.contains(canonical) {
            continue;
        }
        let entry = sums.entry(canonical).or_insert((0.0, 0));
        entry.0 += rating;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(seq, (total, count))| (seq.to_string(), total / count as f64))
        .collect()
}

/// Per-judge rating maps plus the combined map.
///
/// The combined mean weights each judge equally: it averages the per-judge
/// means, not the pooled raw votes.
pub fn aggregate(
    rows: &[ScoreRow],
    mapping: &CanonicalMap,
    invalid_raw: &BTreeSet<String>,
) -> JudgeAverages {
    let invalid_canon = invalid_canonicals(mapping, invalid_raw);

    let mut by_judge: BTreeMap<&str, Vec<&ScoreRow>> = BTreeMap::new();
    for row in rows {
        by_judge.entry(row.judge.as_str()).or_default().push(row);
    }

    let per_judge: BTreeMap<String, RatingMap> = by_judge
        .into_iter()
        .map(|(judge, judge_rows)| {
            (
                judge.to_string(),
                judge_average(&judge_rows, mapping, &invalid_canon),
            )
        })
        .collect();

    let mut combined_sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for ratings in per_judge.values() {
        for (seq, rating) in ratings {
            let entry = combined_sums.entry(seq.as_str()).or_insert((0.0, 0));
            entry.0 += rating;
            entry.1 += 1;
        }
    }
    let combined: RatingMap = combined_sums
        .into_iter()
        .map(|(seq, (total, count))| (seq.to_string(), total / count as f64))
        .collect();

    JudgeAverages { per_judge, combined }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MergeEdge;
    use crate::resolve::resolve;

    fn row(judge: &str, seq: &str, rating: Option<f64>) -> ScoreRow {
        ScoreRow {
            judge: judge.into(),
            sequence: seq.into(),
            rating,
            invalid: false,
            superseded_by: None,
        }
    }

    fn identity_map(seqs: &[&str]) -> CanonicalMap {
        resolve(&seqs.iter().map(|s| s.to_string()).collect(), &[])
    }

    #[test]
    fn per_judge_mean() {
        let rows = vec![
            row("j1", "A", Some(1000.0)),
            row("j1", "A", Some(1200.0)),
            row("j1", "B", Some(900.0)),
        ];
        let map = identity_map(&["A", "B"]);
        let out = aggregate(&rows, &map, &BTreeSet::new());
        assert_eq!(out.per_judge["j1"]["A"], 1100.0);
        assert_eq!(out.per_judge["j1"]["B"], 900.0);
    }

    #[test]
    fn merge_votes_never_score() {
        let map = resolve(
            &["A", "B"].iter().map(|s| s.to_string()).collect(),
            &[MergeEdge { child: "B".into(), parent: "A".into() }],
        );
        let mut superseded = row("j1", "B", Some(1100.0));
        superseded.superseded_by = Some("A".into());
        let rows = vec![row("j1", "A", Some(1000.0)), superseded];

        let out = aggregate(&rows, &map, &BTreeSet::new());
        // B's vote is a merge annotation, not an observation.
        assert_eq!(out.combined["A"], 1000.0);
        assert!(!out.combined.contains_key("B"));
    }

    #[test]
    fn combined_weights_judges_equally() {
        // j1 casts three votes, j2 one; each judge still counts once.
        let rows = vec![
            row("j1", "X", Some(1400.0)),
            row("j1", "X", Some(1500.0)),
            row("j1", "X", Some(1600.0)),
            row("j2", "X", Some(1600.0)),
        ];
        let map = identity_map(&["X"]);
        let out = aggregate(&rows, &map, &BTreeSet::new());
        assert_eq!(out.per_judge["j1"]["X"], 1500.0);
        assert_eq!(out.per_judge["j2"]["X"], 1600.0);
        assert_eq!(out.combined["X"], 1550.0);
    }

    #[test]
    fn invalid_propagates_through_group() {
        let map = resolve(
            &["A", "B"].iter().map(|s| s.to_string()).collect(),
            &[MergeEdge { child: "B".into(), parent: "A".into() }],
        );
        let rows = vec![row("j1", "A", Some(1000.0))];
        // B (same group as A) is flagged invalid.
        let invalid: BTreeSet<String> = ["B".to_string()].into_iter().collect();

        let out = aggregate(&rows, &map, &invalid);
        assert!(out.per_judge["j1"].is_empty());
        assert!(out.combined.is_empty());
    }

    #[test]
    fn invalid_row_excluded() {
        let mut bad = row("j1", "A", Some(2000.0));
        bad.invalid = true;
        let rows = vec![row("j1", "A", Some(1000.0)), bad];
        let map = identity_map(&["A"]);
        let out = aggregate(&rows, &map, &BTreeSet::new());
        assert_eq!(out.combined["A"], 1000.0);
    }

    #[test]
    fn rating_less_rows_are_absent_not_zero() {
        let rows = vec![row("j1", "A", None)];
        let map = identity_map(&["A"]);
        let out = aggregate(&rows, &map, &BTreeSet::new());
        assert!(out.per_judge["j1"].is_empty());
        assert!(out.combined.is_empty());
    }

    #[test]
    fn unregistered_sequence_canonicalizes_to_itself() {
        let rows = vec![row("j1", "NEVER_RESOLVED", Some(1234.0))];
        let map = identity_map(&[]);
        let out = aggregate(&rows, &map, &BTreeSet::new());
        assert_eq!(out.combined["NEVER_RESOLVED"], 1234.0);
    }

    #[test]
    fn group_members_pool_within_one_judge() {
        let map = resolve(
            &["A", "B"].iter().map(|s| s.to_string()).collect(),
            &[MergeEdge { child: "B".into(), parent: "A".into() }],
        );
        // Non-superseded rows under either raw name pool into the canonical.
        let rows = vec![row("j1", "A", Some(1000.0)), row("j1", "B", Some(1200.0))];
        let out = aggregate(&rows, &map, &BTreeSet::new());
        assert_eq!(out.combined["A"], 1100.0);
    }
}
