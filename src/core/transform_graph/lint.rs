use super::TransformGraph;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use serde::Serialize;
use std::collections::{HashMap, HashSet, VecDeque};

/// Pair of spaces joined by more than one shortest chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AmbiguousRoute {
    pub from: String,
    pub to: String,
    pub shortest_chains: usize,
}

/// Consistency findings for a loaded graph.
#[derive(Debug, Clone, Serialize)]
pub struct GraphReport {
    pub spaces: usize,
    pub links: usize,
    pub unreachable: Vec<(String, String)>,
    pub ambiguous: Vec<AmbiguousRoute>,
}

impl GraphReport {
    pub fn is_fully_connected(&self) -> bool {
        self.unreachable.is_empty()
    }
}

pub fn lint(graph: &TransformGraph) -> GraphReport {
    GraphReport {
        spaces: graph.space_count(),
        links: graph.link_count(),
        unreachable: unreachable_pairs(graph),
        ambiguous: ambiguous_routes(graph),
    }
}

/// Ordered pairs of distinct spaces with no chain between them.
pub fn unreachable_pairs(graph: &TransformGraph) -> Vec<(String, String)> {
    let (pg, nodes) = build_graph(graph);
    let mut pairs = Vec::new();
    for &start in &nodes {
        let mut reachable = HashSet::new();
        let mut bfs = Bfs::new(&pg, start);
        while let Some(nx) = bfs.next(&pg) {
            reachable.insert(nx);
        }
        for &other in &nodes {
            if other != start && !reachable.contains(&other) {
                pairs.push((pg[start].to_string(), pg[other].to_string()));
            }
        }
    }
    pairs
}

/// Ordered pairs for which the chain returned by a lookup depends on link order.
pub fn ambiguous_routes(graph: &TransformGraph) -> Vec<AmbiguousRoute> {
    let (pg, nodes) = build_graph(graph);
    let mut routes = Vec::new();
    for &start in &nodes {
        let counts = count_shortest_paths(&pg, start);
        for &other in &nodes {
            if other == start {
                continue;
            }
            if let Some(&count) = counts.get(&other) {
                if count > 1 {
                    routes.push(AmbiguousRoute {
                        from: pg[start].to_string(),
                        to: pg[other].to_string(),
                        shortest_chains: count,
                    });
                }
            }
        }
    }
    routes
}

fn build_graph(graph: &TransformGraph) -> (DiGraph<&str, &str>, Vec<NodeIndex>) {
    let mut pg = DiGraph::new();
    let mut node_map: HashMap<&str, NodeIndex> = HashMap::new();
    let mut nodes = Vec::new();
    for space in graph.spaces() {
        let idx = pg.add_node(space);
        node_map.insert(space, idx);
        nodes.push(idx);
    }
    for space in graph.spaces() {
        let from = node_map[space];
        for (target, transform) in graph.links_from(space).unwrap_or_default() {
            if let Some(&to) = node_map.get(target) {
                pg.add_edge(from, to, transform);
            }
        }
    }
    (pg, nodes)
}

fn count_shortest_paths(pg: &DiGraph<&str, &str>, start: NodeIndex) -> HashMap<NodeIndex, usize> {
    let mut distance: HashMap<NodeIndex, usize> = HashMap::from([(start, 0)]);
    let mut count: HashMap<NodeIndex, usize> = HashMap::from([(start, 1)]);
    let mut queue = VecDeque::from([start]);
    while let Some(node) = queue.pop_front() {
        let depth = distance[&node];
        let paths = count[&node];
        for next in pg.neighbors(node) {
            match distance.get(&next) {
                None => {
                    distance.insert(next, depth + 1);
                    count.insert(next, paths);
                    queue.push_back(next);
                }
                Some(&d) if d == depth + 1 => {
                    let entry = count.entry(next).or_insert(0);
                    *entry = entry.saturating_add(paths);
                }
                Some(_) => {}
            }
        }
    }
    count
}
