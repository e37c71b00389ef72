//! Crossing reduction.
//!
//! Alternating down/up barycenter sweeps, keeping the best ordering seen. Sorting is
//! hierarchical: each cluster's nodes stay contiguous inside the cluster's border pair, and a
//! final pass puts sibling clusters in the same relative order on every rank.

use crate::layering::{Kind, Layering};

const MAX_SWEEPS: usize = 24;
const PATIENCE: usize = 4;

pub(crate) fn run(work: &mut Layering) {
    let mut pos = positions(work);

    // Make clusters contiguous without moving anything else.
    let current: Vec<Option<f64>> = pos.iter().map(|&p| Some(p as f64)).collect();
    for r in 0..work.layers.len() {
        work.layers[r] = sort_layer(work, &work.layers[r], &current, None);
    }
    pos = positions(work);

    let mut best = work.layers.clone();
    let mut best_crossings = crossings(work, &pos);
    let mut stale = 0usize;
    for sweep in 0..MAX_SWEEPS {
        if best_crossings == 0 || stale >= PATIENCE {
            break;
        }
        let down = sweep % 2 == 0;
        let ranks: Vec<usize> = if down {
            (1..work.layers.len()).collect()
        } else {
            (0..work.layers.len().saturating_sub(1)).rev().collect()
        };
        for r in ranks {
            let bary = barycenters(work, &work.layers[r], &pos, down);
            work.layers[r] = sort_layer(work, &work.layers[r], &bary, None);
            for (i, &v) in work.layers[r].iter().enumerate() {
                pos[v] = i;
            }
        }

        let cc = crossings(work, &pos);
        if cc < best_crossings {
            best_crossings = cc;
            best = work.layers.clone();
            stale = 0;
        } else {
            stale += 1;
        }
    }
    work.layers = best;

    // Sibling clusters must not swap places between ranks, or their boxes would overlap.
    let pos = positions(work);
    let keys = cluster_keys(work, &pos);
    let current: Vec<Option<f64>> = pos.iter().map(|&p| Some(p as f64)).collect();
    for r in 0..work.layers.len() {
        work.layers[r] = sort_layer(work, &work.layers[r], &current, Some(&keys));
    }

    tracing::debug!(crossings = best_crossings, "ordered layers");
}

fn positions(work: &Layering) -> Vec<usize> {
    let mut pos = vec![0; work.nodes.len()];
    for (i, v) in work.layer_positions() {
        pos[v] = i;
    }
    pos
}

fn barycenters(work: &Layering, layer: &[usize], pos: &[usize], from_up: bool) -> Vec<Option<f64>> {
    let mut bary = vec![None; work.nodes.len()];
    for &v in layer {
        let node = &work.nodes[v];
        let neighbors = if from_up { &node.up } else { &node.down };
        if neighbors.is_empty() {
            continue;
        }
        let sum: f64 = neighbors.iter().map(|&u| pos[u] as f64).sum();
        bary[v] = Some(sum / neighbors.len() as f64);
    }
    bary
}

/// Mean relative position of each cluster over the ranks it spans.
fn cluster_keys(work: &Layering, pos: &[usize]) -> Vec<f64> {
    let mut sum = vec![0.0; work.clusters.len()];
    let mut count = vec![0usize; work.clusters.len()];
    for layer in &work.layers {
        let scale = layer.len().saturating_sub(1).max(1) as f64;
        for &v in layer {
            for &c in &work.nodes[v].path {
                sum[c] += pos[v] as f64 / scale;
                count[c] += 1;
            }
        }
    }
    sum.iter()
        .zip(&count)
        .map(|(s, &n)| if n == 0 { 0.0 } else { s / n as f64 })
        .collect()
}

enum Entry {
    Node(usize),
    Group(usize, Vec<usize>),
}

/// Sorts one layer by `keys`, keeping every cluster contiguous.
///
/// With `cluster_keys`, nodes keep their slots and sibling clusters are ordered by their key.
fn sort_layer(
    work: &Layering,
    layer: &[usize],
    keys: &[Option<f64>],
    cluster_keys: Option<&[f64]>,
) -> Vec<usize> {
    let mut out = Vec::with_capacity(layer.len());
    sort_group(work, None, layer, keys, cluster_keys, &mut out);
    out
}

fn sort_group(
    work: &Layering,
    cluster: Option<usize>,
    members: &[usize],
    keys: &[Option<f64>],
    cluster_keys: Option<&[f64]>,
    out: &mut Vec<usize>,
) {
    let mut left = None;
    let mut right = None;
    let mut entries: Vec<Entry> = Vec::new();
    for &v in members {
        let node = &work.nodes[v];
        if node.is_border() && node.cluster == cluster {
            match node.kind {
                Kind::BorderLeft => left = Some(v),
                _ => right = Some(v),
            }
            continue;
        }
        let depth = cluster.map_or(0, |c| work.clusters[c].depth + 1);
        match node.path.get(depth).copied() {
            None => entries.push(Entry::Node(v)),
            Some(child) => {
                let existing = entries.iter_mut().find_map(|e| match e {
                    Entry::Group(c, list) if *c == child => Some(list),
                    _ => None,
                });
                match existing {
                    Some(list) => list.push(v),
                    None => entries.push(Entry::Group(child, vec![v])),
                }
            }
        }
    }

    // Ties fall back to the cluster index for groups (stable across ranks) and to the current
    // slot otherwise.
    let entry_key = |i: usize, entry: &Entry| -> Option<(f64, usize)> {
        match (entry, cluster_keys) {
            (Entry::Node(_), Some(_)) => None,
            (Entry::Group(c, _), Some(ck)) => Some((ck[*c], *c)),
            (Entry::Node(v), None) => keys[*v].map(|k| (k, i)),
            (Entry::Group(_, list), None) => {
                let known: Vec<f64> = list.iter().filter_map(|&v| keys[v]).collect();
                if known.is_empty() {
                    None
                } else {
                    Some((known.iter().sum::<f64>() / known.len() as f64, i))
                }
            }
        }
    };

    // Entries without a key keep their slot; the others are sorted into the remaining slots.
    let mut sortable: Vec<(f64, usize, usize)> = entries
        .iter()
        .enumerate()
        .filter_map(|(i, e)| entry_key(i, e).map(|(k, tie)| (k, tie, i)))
        .collect();
    sortable.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    let keyed: Vec<bool> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| entry_key(i, e).is_some())
        .collect();

    let mut sorted = sortable.into_iter().map(|(_, _, i)| i);
    let mut order: Vec<usize> = Vec::with_capacity(entries.len());
    for (i, has_key) in keyed.iter().enumerate() {
        if *has_key {
            if let Some(next) = sorted.next() {
                order.push(next);
            }
        } else {
            order.push(i);
        }
    }

    if let Some(l) = left {
        out.push(l);
    }
    for i in order {
        match &entries[i] {
            Entry::Node(v) => out.push(*v),
            Entry::Group(c, list) => sort_group(work, Some(*c), list, keys, cluster_keys, out),
        }
    }
    if let Some(r) = right {
        out.push(r);
    }
}

/// Number of edge crossings between consecutive layers.
pub(crate) fn crossings(work: &Layering, pos: &[usize]) -> usize {
    let mut total = 0;
    for layer in &work.layers {
        let mut segments: Vec<(usize, usize)> = Vec::new();
        for &v in layer {
            for &w in &work.nodes[v].down {
                segments.push((pos[v], pos[w]));
            }
        }
        segments.sort_unstable();
        for i in 0..segments.len() {
            for j in i + 1..segments.len() {
                if segments[i].0 < segments[j].0 && segments[i].1 > segments[j].1 {
                    total += 1;
                }
            }
        }
    }
    total
}
