//! Random topology construction.
//!
//! Nodes are addressed by index here; the simulator maps indices to IDs.
//! Edges are undirected and stored as `(low, high)` pairs.

use crate::protocol::fisher_yates;

use rand::Rng;
use std::collections::BTreeSet;

/// Populations above this size link to ~log2(N) peers instead of ~30%.
pub const LARGE_POPULATION: usize = 64;

pub type Edge = (usize, usize);

/// Number of random links each node initiates.
pub fn target_degree(node_count: usize) -> usize {
    if node_count < 2 {
        return 0;
    }

    let degree = if node_count > LARGE_POPULATION {
        (usize::BITS - (node_count - 1).leading_zeros()) as usize
    } else {
        (node_count * 3).div_ceil(10)
    };

    degree.clamp(1, node_count - 1)
}

/// Builds a random topology in which every node is reachable from every other.
///
/// Each node links to `target_degree` others chosen by Fisher-Yates. Components
/// left disconnected afterwards are stitched onto the first one with a single
/// random edge each.
pub fn random_topology<R: Rng + ?Sized>(node_count: usize, rng: &mut R) -> BTreeSet<Edge> {
    let mut edges = BTreeSet::new();
    let degree = target_degree(node_count);

    for node in 0..node_count {
        let mut others: Vec<usize> = (0..node_count).filter(|&other| other != node).collect();
        fisher_yates(&mut others, rng);

        for &other in others.iter().take(degree) {
            edges.insert(edge(node, other));
        }
    }

    let groups = components(node_count, &edges);
    if let Some((main, rest)) = groups.split_first() {
        for group in rest {
            let anchor = main[rng.gen_range(0..main.len())];
            let member = group[rng.gen_range(0..group.len())];
            edges.insert(edge(anchor, member));
        }
    }

    edges
}

/// Connected components, each sorted, ordered by their smallest member.
pub fn components(node_count: usize, edges: &BTreeSet<Edge>) -> Vec<Vec<usize>> {
    let mut adjacency = vec![Vec::new(); node_count];
    for &(a, b) in edges {
        adjacency[a].push(b);
        adjacency[b].push(a);
    }

    let mut visited = vec![false; node_count];
    let mut groups = Vec::new();

    for start in 0..node_count {
        if visited[start] {
            continue;
        }

        visited[start] = true;
        let mut stack = vec![start];
        let mut group = Vec::new();

        while let Some(current) = stack.pop() {
            group.push(current);
            for &next in &adjacency[current] {
                if !visited[next] {
                    visited[next] = true;
                    stack.push(next);
                }
            }
        }

        group.sort_unstable();
        groups.push(group);
    }

    groups
}

fn edge(a: usize, b: usize) -> Edge {
    if a < b { (a, b) } else { (b, a) }
}
