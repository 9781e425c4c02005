use std::collections::BTreeMap;

use petgraph::unionfind::UnionFind;

use crate::model::OptionTable;
use crate::validate::{Diagnostics, Warning};

/// Label given to points that belong to no cluster.
pub const NOISE: i32 = -1;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterAssignment {
    /// Cluster id per record, aligned with the input table. `NOISE` for outliers.
    pub labels: Vec<i32>,
    pub n_clusters: usize,
    pub diagnostics: Diagnostics,
}

/// Density-based clustering (DBSCAN) over standardized (strike, open interest).
///
/// Points within `eps` of each other are neighbours; a point with at least
/// `min_samples` neighbours (itself included) is a core point. Core points
/// are merged transitively, border points join their nearest core point's
/// cluster, everything else is `NOISE`. Cluster ids are numbered by each
/// cluster's smallest (strike, OI) so they do not depend on row order.
pub fn cluster(table: &OptionTable, eps: f64, min_samples: usize) -> ClusterAssignment {
    let n = table.len();
    let mut diagnostics = Diagnostics::default();
    if n == 0 {
        return ClusterAssignment::default();
    }

    let strikes: Vec<f64> = table.iter().map(|r| r.strike).collect();
    let ois: Vec<f64> = table.iter().map(|r| r.open_interest).collect();
    let xs = standardize(&strikes, "strike", &mut diagnostics);
    let ys = standardize(&ois, "open_interest", &mut diagnostics);

    let dist = |i: usize, j: usize| (xs[i] - xs[j]).hypot(ys[i] - ys[j]);
    let neighbours: Vec<Vec<usize>> = (0..n)
        .map(|i| (0..n).filter(|&j| dist(i, j) <= eps).collect())
        .collect();
    let is_core: Vec<bool> = neighbours.iter().map(|nb| nb.len() >= min_samples).collect();

    let mut uf = UnionFind::<usize>::new(n);
    for i in (0..n).filter(|&i| is_core[i]) {
        for &j in neighbours[i].iter().filter(|&&j| is_core[j]) {
            uf.union(i, j);
        }
    }

    // Canonical id per core component: order by smallest (strike, OI) member.
    let mut components: BTreeMap<usize, (f64, f64)> = BTreeMap::new();
    for i in (0..n).filter(|&i| is_core[i]) {
        let key = (strikes[i], ois[i]);
        components
            .entry(uf.find(i))
            .and_modify(|k| {
                if key.0.total_cmp(&k.0).then(key.1.total_cmp(&k.1)).is_lt() {
                    *k = key;
                }
            })
            .or_insert(key);
    }
    let mut ordered: Vec<(usize, (f64, f64))> = components.into_iter().collect();
    ordered.sort_by(|a, b| a.1.0.total_cmp(&b.1.0).then(a.1.1.total_cmp(&b.1.1)));
    let label_of_root: BTreeMap<usize, i32> = ordered
        .iter()
        .enumerate()
        .map(|(id, (root, _))| (*root, id as i32))
        .collect();

    let mut labels = vec![NOISE; n];
    for i in (0..n).filter(|&i| is_core[i]) {
        labels[i] = label_of_root[&uf.find(i)];
    }
    for i in (0..n).filter(|&i| !is_core[i]) {
        let nearest_core = neighbours[i]
            .iter()
            .filter(|&&j| is_core[j])
            .map(|&j| (dist(i, j), labels[j]))
            .min_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        if let Some((_, label)) = nearest_core {
            labels[i] = label;
        }
    }

    let n_clusters = ordered.len();
    tracing::debug!(
        clusters = n_clusters,
        noise = labels.iter().filter(|&&l| l == NOISE).count(),
        "strike clustering done"
    );

    ClusterAssignment {
        labels,
        n_clusters,
        diagnostics,
    }
}

/// Zero mean / unit (population) variance. A constant column is returned raw.
fn standardize(values: &[f64], name: &str, diagnostics: &mut Diagnostics) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        if values.len() > 1 {
            diagnostics.warn(Warning::DegenerateInput {
                stage: "cluster".to_string(),
                detail: format!("{name} has zero variance, using raw values"),
            });
        }
        return values.to_vec();
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    values.iter().map(|v| (v - mean) / std).collect()
}
