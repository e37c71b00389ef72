//! Break cycles by reversing the back edges found by a depth-first search.
//!
//! Nodes are visited in insertion order and successors in edge order, so the same graph always
//! yields the same feedback set.

/// Returns, per edge, whether it has to be reversed for the graph to become acyclic.
///
/// `edges` holds `(source, target)` leaf indices. Self-loops are never reversed.
pub(crate) fn back_edges(node_count: usize, edges: &[(usize, usize)]) -> Vec<bool> {
    let mut out: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for (idx, &(v, w)) in edges.iter().enumerate() {
        if v != w {
            out[v].push(idx);
        }
    }

    let mut reversed = vec![false; edges.len()];
    let mut visited = vec![false; node_count];
    let mut on_stack = vec![false; node_count];

    // Explicit stack of (node, next out-edge cursor).
    let mut stack: Vec<(usize, usize)> = Vec::new();
    for root in 0..node_count {
        if visited[root] {
            continue;
        }
        visited[root] = true;
        on_stack[root] = true;
        stack.push((root, 0));

        while let Some(top) = stack.last_mut() {
            let v = top.0;
            let Some(&edge) = out[v].get(top.1) else {
                on_stack[v] = false;
                stack.pop();
                continue;
            };
            top.1 += 1;
            let w = edges[edge].1;
            if on_stack[w] {
                reversed[edge] = true;
            } else if !visited[w] {
                visited[w] = true;
                on_stack[w] = true;
                stack.push((w, 0));
            }
        }
    }
    reversed
}
