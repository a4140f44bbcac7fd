use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::{aggregate, invalid_canonicals};
use crate::join::join;
use crate::model::{AuxRow, CanonicalMap, JoinOutput, RatingMap, ScoreRow};
use crate::resolve::{collect_identities, resolve};

/// Pre-loaded input for one merge run. Ranking rows carry their judge name;
/// merge edges and the invalid set are derived from the rows themselves.
#[derive(Debug, Default)]
pub struct MergeInput {
    pub rankings: Vec<ScoreRow>,
    pub aux: Vec<AuxRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MergeMeta {
    pub engine_version: String,
    pub run_at: String,
}

/// Full output of one merge run.
#[derive(Debug, Serialize)]
pub struct MergeResult {
    pub meta: MergeMeta,
    pub mapping: CanonicalMap,
    pub per_judge: BTreeMap<String, RatingMap>,
    pub combined: RatingMap,
    /// Combined-map join, with full missing diagnostics.
    pub combined_join: JoinOutput,
    /// One cheaper join per judge, counters only.
    pub judge_joins: BTreeMap<String, JoinOutput>,
}

/// Run the whole pipeline: resolve identities, aggregate ratings, join the
/// auxiliary rows against the combined map (diagnostics on) and against
/// each judge's map (diagnostics off).
///
/// Pure transformation over the input; data-quality problems degrade to
/// exclusions and counters, never errors. An empty result is a value;
/// whether it is fatal is the caller's policy.
pub fn run(input: &MergeInput) -> MergeResult {
    let (sequences, edges, invalid_raw) = collect_identities(&input.rankings);
    let mapping = resolve(&sequences, &edges);
    let invalid_canon = invalid_canonicals(&mapping, &invalid_raw);

    let averages = aggregate(&input.rankings, &mapping, &invalid_raw);

    let combined_join = join(
        &input.aux,
        &mapping,
        &invalid_canon,
        &averages.combined,
        true,
    );

    let judge_joins: BTreeMap<String, JoinOutput> = averages
        .per_judge
        .iter()
        .map(|(judge, ratings)| {
            (
                judge.clone(),
                join(&input.aux, &mapping, &invalid_canon, ratings, false),
            )
        })
        .collect();

    MergeResult {
        meta: MergeMeta {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        mapping,
        per_judge: averages.per_judge,
        combined: averages.combined,
        combined_join,
        judge_joins,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::{load_aux_rows, load_ranking_rows};

    #[test]
    fn pipeline_from_csv_strings() {
        let isaak_csv = "\
sequence,elo,invalid,removed_for
AAGG,1500,,
AAGC,1100,,AAGG
CCTT,1200,,
TTAA,900,1,
";
        let noah_csv = "\
sequence,elo,invalid,removed_for
AAGG,1600,,
CCTT,1300,,
GGCC,1000,,
";
        let aux_csv = "\
peptide,n_results
AAGC,5
CCTT,9
GGCC,2
UNKNOWN,4
AAGG,
";

        let mut rankings = load_ranking_rows("isaak", isaak_csv).unwrap();
        rankings.extend(load_ranking_rows("noah", noah_csv).unwrap());
        let aux = load_aux_rows(aux_csv).unwrap();

        let result = run(&MergeInput { rankings, aux });

        // AAGC was superseded by AAGG: same canonical, merge vote dropped.
        assert_eq!(result.mapping.canonical_of("AAGC"), "AAGG");
        assert_eq!(result.combined["AAGG"], 1550.0); // (1500 + 1600) / 2
        assert_eq!(result.combined["CCTT"], 1250.0);
        // TTAA was invalid: absent everywhere.
        assert!(!result.combined.contains_key("TTAA"));
        assert!(!result.per_judge["isaak"].contains_key("TTAA"));

        // Aux joins: AAGC row joins under AAGG's rating; AAGG (no value)
        // is a baseline row; UNKNOWN has no rating and is counted missing.
        let combined_join = &result.combined_join;
        assert_eq!(combined_join.points.len(), 3);
        assert_eq!(combined_join.baseline["AAGG"], 1550.0);
        assert_eq!(combined_join.diagnostics.missing_total, 1);
        assert_eq!(
            combined_join.diagnostics.missing_examples[0].raw,
            "UNKNOWN"
        );

        // Per-judge passes run the cheap path.
        assert_eq!(result.judge_joins.len(), 2);
        assert!(result.judge_joins["isaak"]
            .diagnostics
            .missing_examples
            .is_empty());
        // isaak never rated GGCC, so it goes missing in his pass.
        assert_eq!(result.judge_joins["isaak"].diagnostics.missing_total, 2);
        assert_eq!(result.judge_joins["noah"].diagnostics.missing_total, 1);
    }

    #[test]
    fn empty_input_is_a_value() {
        let result = run(&MergeInput::default());
        assert!(result.mapping.is_empty());
        assert!(result.combined.is_empty());
        assert!(result.combined_join.points.is_empty());
        assert_eq!(result.combined_join.diagnostics.rows_seen, 0);
    }

    #[test]
    fn result_serializes() {
        let result = run(&MergeInput::default());
        let json = serde_json::to_string_pretty(&result).unwrap();
        assert!(json.contains("\"combined_join\""));
    }
}
