//! Longest-path ranking.
//!
//! Sinks get rank 0 and every other node sits `minlen` above its closest successor, which keeps
//! edges into a join tight. Ranks are normalized so the smallest is 0.

/// `edges` holds `(source, target, minlen)` over an acyclic graph.
pub(crate) fn longest_path(node_count: usize, edges: &[(usize, usize, usize)]) -> Vec<usize> {
    let mut out: Vec<Vec<(usize, usize)>> = vec![Vec::new(); node_count];
    for &(v, w, minlen) in edges {
        if v != w {
            out[v].push((w, minlen.max(1)));
        }
    }

    let mut rank: Vec<Option<i64>> = vec![None; node_count];
    let mut stack: Vec<(usize, bool)> = Vec::new();
    for root in 0..node_count {
        if rank[root].is_some() {
            continue;
        }
        stack.push((root, false));
        while let Some((v, expanded)) = stack.pop() {
            if rank[v].is_some() {
                continue;
            }
            if !expanded {
                stack.push((v, true));
                for &(w, _) in out[v].iter().rev() {
                    if rank[w].is_none() {
                        stack.push((w, false));
                    }
                }
                continue;
            }
            let r = out[v]
                .iter()
                .filter_map(|&(w, minlen)| rank[w].map(|rw| rw - minlen as i64))
                .min()
                .unwrap_or(0);
            rank[v] = Some(r);
        }
    }

    let min = rank.iter().flatten().copied().min().unwrap_or(0);
    rank.into_iter()
        .map(|r| (r.unwrap_or(0) - min) as usize)
        .collect()
}
