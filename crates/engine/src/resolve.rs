use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::model::{CanonicalMap, MergeEdge};

/// Union-find over integer ids, parent/rank as flat arrays.
struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u32>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Root of `x`, with path compression.
    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = x;
        while self.parent[cur] != cur {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Union by rank. Redundant unions and self-loops are no-ops.
    fn union(&mut self, a: usize, b: usize) {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return;
        }
        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] += 1;
            }
        }
    }
}

/// Compute the canonical mapping for `sequences` under the merge `edges`.
///
/// Edge endpoints missing from `sequences` are registered as singleton
/// nodes. Canonical choice per group: the lexicographically smallest member
/// that never appears as an edge's child; if every member is a child (a
/// supersession cycle), the lexicographically smallest member overall.
/// The result depends only on the input sets, never on edge order.
pub fn resolve(sequences: &BTreeSet<String>, edges: &[MergeEdge]) -> CanonicalMap {
    let mut index: HashMap<&str, usize> = HashMap::with_capacity(sequences.len());
    let mut names: Vec<&str> = Vec::with_capacity(sequences.len());

    for seq in sequences {
        index.insert(seq.as_str(), names.len());
        names.push(seq.as_str());
    }
    for edge in edges {
        for endpoint in [edge.child.as_str(), edge.parent.as_str()] {
            if !index.contains_key(endpoint) {
                index.insert(endpoint, names.len());
                names.push(endpoint);
            }
        }
    }

    let mut uf = UnionFind::new(names.len());
    for edge in edges {
        uf.union(index[edge.child.as_str()], index[edge.parent.as_str()]);
    }

    let children: BTreeSet<&str> = edges.iter().map(|e| e.child.as_str()).collect();

    let mut groups: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    for id in 0..names.len() {
        groups.entry(uf.find(id)).or_default().push(names[id]);
    }

    let mut mapping = BTreeMap::new();
    for members in groups.values() {
        let canonical = members
            .iter()
            .filter(|m| !children.contains(**m))
            .min()
            .or_else(|| members.iter().min())
            .copied()
            .unwrap_or_default();
        for member in members {
            mapping.insert((*member).to_string(), canonical.to_string());
        }
    }

    CanonicalMap::new(mapping)
}

/// Group ranking rows into the identity inputs the resolver needs:
/// the full sequence set (including supersession targets), the merge
/// edges, and the raw invalid set.
pub fn collect_identities(
    rows: &[crate::model::ScoreRow],
) -> (BTreeSet<String>, Vec<MergeEdge>, BTreeSet<String>) {
    let mut sequences = BTreeSet::new();
    let mut edges = Vec::new();
    let mut invalid = BTreeSet::new();

    for row in rows {
        if row.sequence.is_empty() {
            continue;
        }
        sequences.insert(row.sequence.clone());
        if let Some(parent) = &row.superseded_by {
            sequences.insert(parent.clone());
            edges.push(MergeEdge {
                child: row.sequence.clone(),
                parent: parent.clone(),
            });
        }
        if row.invalid {
            invalid.insert(row.sequence.clone());
        }
    }

    (sequences, edges, invalid)
}
