use ordered_float::OrderedFloat;
use serde::Serialize;

use crate::model::RatingMap;

/// One canonical sequence rated by both sides.
#[derive(Debug, Clone, Serialize)]
pub struct SharedRating {
    pub sequence: String,
    pub rating_a: f64,
    pub rating_b: f64,
}

/// Agreement between two independent rankings over their shared canonical
/// sequences.
#[derive(Debug, Clone, Serialize)]
pub struct Agreement {
    pub shared: Vec<SharedRating>,
    pub pearson: f64,
    pub spearman: f64,
}

/// Compare two rating maps. Returns `None` when they share no canonical
/// sequence — whether that is fatal is the caller's call.
pub fn compare(a: &RatingMap, b: &RatingMap) -> Option<Agreement> {
    let shared: Vec<SharedRating> = a
        .iter()
        .filter_map(|(seq, &rating_a)| {
            b.get(seq).map(|&rating_b| SharedRating {
                sequence: seq.clone(),
                rating_a,
                rating_b,
            })
        })
        .collect();

    if shared.is_empty() {
        return None;
    }

    let xs: Vec<f64> = shared.iter().map(|s| s.rating_a).collect();
    let ys: Vec<f64> = shared.iter().map(|s| s.rating_b).collect();

    Some(Agreement {
        pearson: pearson(&xs, &ys),
        spearman: pearson(&average_ranks(&xs), &average_ranks(&ys)),
        shared,
    })
}

fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        // A constant series has no defined correlation.
        return f64::NAN;
    }
    cov / denom
}

/// 1-based ranks; ties receive the average of the ranks they span.
fn average_ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by_key(|&i| OrderedFloat(values[i]));

    let mut ranks = vec![0.0; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        // Ranks i+1 ..= j+1 all tie; average them.
        let rank = (i + 1 + j + 1) as f64 / 2.0;
        for &idx in &order[i..=j] {
            ranks[idx] = rank;
        }
        i = j + 1;
    }
    ranks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratings(pairs: &[(&str, f64)]) -> RatingMap {
        pairs.iter().map(|(s, r)| (s.to_string(), *r)).collect()
    }

    #[test]
    fn identical_maps_agree_perfectly() {
        let a = ratings(&[("A", 1500.0), ("B", 1400.0), ("C", 1300.0)]);
        let out = compare(&a, &a).unwrap();
        assert_eq!(out.shared.len(), 3);
        assert!((out.pearson - 1.0).abs() < 1e-12);
        assert!((out.spearman - 1.0).abs() < 1e-12);
    }

    #[test]
    fn reversed_order_is_negative() {
        let a = ratings(&[("A", 1.0), ("B", 2.0), ("C", 3.0)]);
        let b = ratings(&[("A", 3.0), ("B", 2.0), ("C", 1.0)]);
        let out = compare(&a, &b).unwrap();
        assert!((out.pearson + 1.0).abs() < 1e-12);
        assert!((out.spearman + 1.0).abs() < 1e-12);
    }

    #[test]
    fn no_shared_sequences_is_none() {
        let a = ratings(&[("A", 1500.0)]);
        let b = ratings(&[("B", 1500.0)]);
        assert!(compare(&a, &b).is_none());
    }

    #[test]
    fn unshared_sequences_ignored() {
        let a = ratings(&[("A", 1.0), ("B", 2.0), ("ONLY_A", 9.0)]);
        let b = ratings(&[("A", 10.0), ("B", 20.0), ("ONLY_B", 9.0)]);
        let out = compare(&a, &b).unwrap();
        assert_eq!(out.shared.len(), 2);
        assert!((out.pearson - 1.0).abs() < 1e-12);
    }

    #[test]
    fn spearman_monotone_but_nonlinear_is_one() {
        let a = ratings(&[("A", 1.0), ("B", 2.0), ("C", 3.0), ("D", 4.0)]);
        let b = ratings(&[("A", 1.0), ("B", 10.0), ("C", 100.0), ("D", 1000.0)]);
        let out = compare(&a, &b).unwrap();
        assert!(out.pearson < 1.0);
        assert!((out.spearman - 1.0).abs() < 1e-12);
    }

    #[test]
    fn tied_ranks_averaged() {
        // Two ties in the middle: ranks 2 and 3 both become 2.5.
        let ranks = average_ranks(&[1.0, 5.0, 5.0, 9.0]);
        assert_eq!(ranks, vec![1.0, 2.5, 2.5, 4.0]);
    }
}
