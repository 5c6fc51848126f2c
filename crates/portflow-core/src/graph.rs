//! # Dependency Graph
//!
//! A small directed graph over string node ids, used by the validators to
//! find update cycles in both the data-level dependency graph (nodes are
//! `entity.attribute` addresses) and the widget-level binding graph (nodes
//! are widget instance ids).
//!
//! All data structures use `BTreeMap`/`BTreeSet`, so traversal order and
//! therefore every reported cycle is deterministic.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// A strongly connected group of nodes that contains at least one cycle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Cycle {
    /// One concrete cycle, starting and ending at the smallest member.
    pub path: Vec<String>,
    /// Every node of the strongly connected component, sorted.
    pub members: Vec<String>,
}

impl Cycle {
    /// Render the cycle as `a -> b -> a`.
    #[must_use]
    pub fn describe(&self) -> String {
        self.path.join(" -> ")
    }
}

/// Directed graph with deterministic ordering.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeSet<String>,
    edges: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyGraph {
    /// Create a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node. Inserting twice is a no-op.
    pub fn add_node(&mut self, node: &str) {
        if !self.nodes.contains(node) {
            self.nodes.insert(node.to_string());
        }
    }

    /// Insert an edge, creating both endpoints. Parallel edges collapse.
    pub fn add_edge(&mut self, from: &str, to: &str) {
        self.add_node(from);
        self.add_node(to);
        self.edges
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
    }

    /// Check if a node exists.
    #[must_use]
    pub fn contains_node(&self, node: &str) -> bool {
        self.nodes.contains(node)
    }

    /// Check if an edge exists.
    #[must_use]
    pub fn contains_edge(&self, from: &str, to: &str) -> bool {
        self.edges.get(from).is_some_and(|targets| targets.contains(to))
    }

    /// Outgoing neighbors in sorted order.
    pub fn neighbors<'a>(&'a self, node: &str) -> impl Iterator<Item = &'a str> + use<'a> {
        self.edges
            .get(node)
            .into_iter()
            .flat_map(|targets| targets.iter().map(String::as_str))
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of distinct edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(BTreeSet::len).sum()
    }

    /// Edges per node, as millionths (integer only). Zero for an empty graph.
    #[must_use]
    pub fn density_millionths(&self) -> u64 {
        let nodes = self.node_count() as u64;
        if nodes == 0 {
            return 0;
        }
        (self.edge_count() as u64).saturating_mul(1_000_000) / nodes
    }

    /// Check if any cycle exists.
    #[must_use]
    pub fn has_cycle(&self) -> bool {
        !self.find_cycles().is_empty()
    }

    /// Find every strongly connected component that contains a cycle.
    ///
    /// Uses an iterative Tarjan traversal, so deep chains cannot exhaust the
    /// call stack. Each component is reported once, with one concrete cycle
    /// through its smallest member. Results are ordered by that member.
    #[must_use]
    pub fn find_cycles(&self) -> Vec<Cycle> {
        let mut cycles: Vec<Cycle> = self
            .strongly_connected_components()
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || scc.first().is_some_and(|n| self.contains_edge(n, n))
            })
            .filter_map(|scc| {
                let members: BTreeSet<&str> = scc.into_iter().collect();
                let path = self.cycle_through_min(&members)?;
                Some(Cycle {
                    path,
                    members: members.into_iter().map(str::to_string).collect(),
                })
            })
            .collect();
        cycles.sort();
        cycles
    }

    fn strongly_connected_components(&self) -> Vec<Vec<&str>> {
        struct Frame<'a> {
            node: &'a str,
            neighbors: Vec<&'a str>,
            next: usize,
        }

        let mut index: BTreeMap<&str, usize> = BTreeMap::new();
        let mut low: BTreeMap<&str, usize> = BTreeMap::new();
        let mut on_stack: BTreeSet<&str> = BTreeSet::new();
        let mut stack: Vec<&str> = Vec::new();
        let mut next_index = 0usize;
        let mut components = Vec::new();

        for root in &self.nodes {
            let root = root.as_str();
            if index.contains_key(root) {
                continue;
            }

            let mut call_stack: Vec<Frame<'_>> = Vec::new();
            index.insert(root, next_index);
            low.insert(root, next_index);
            next_index = next_index.saturating_add(1);
            stack.push(root);
            on_stack.insert(root);
            call_stack.push(Frame {
                node: root,
                neighbors: self.neighbors(root).collect(),
                next: 0,
            });

            while let Some(frame) = call_stack.last_mut() {
                let node = frame.node;
                if let Some(&next) = frame.neighbors.get(frame.next) {
                    frame.next = frame.next.saturating_add(1);
                    if !index.contains_key(next) {
                        index.insert(next, next_index);
                        low.insert(next, next_index);
                        next_index = next_index.saturating_add(1);
                        stack.push(next);
                        on_stack.insert(next);
                        call_stack.push(Frame {
                            node: next,
                            neighbors: self.neighbors(next).collect(),
                            next: 0,
                        });
                    } else if on_stack.contains(next) {
                        let next_idx = index.get(next).copied().unwrap_or(usize::MAX);
                        if let Some(l) = low.get_mut(node) {
                            *l = (*l).min(next_idx);
                        }
                    }
                    continue;
                }

                call_stack.pop();
                let node_low = low.get(node).copied().unwrap_or(usize::MAX);
                if let Some(parent) = call_stack.last() {
                    if let Some(l) = low.get_mut(parent.node) {
                        *l = (*l).min(node_low);
                    }
                }

                if Some(&node_low) == index.get(node) {
                    let mut component = Vec::new();
                    while let Some(member) = stack.pop() {
                        on_stack.remove(member);
                        component.push(member);
                        if member == node {
                            break;
                        }
                    }
                    components.push(component);
                }
            }
        }

        components
    }

    /// Shortest cycle from the smallest member back to itself, staying
    /// inside the component.
    fn cycle_through_min(&self, members: &BTreeSet<&str>) -> Option<Vec<String>> {
        let start = *members.first()?;
        let mut parent: BTreeMap<&str, &str> = BTreeMap::new();
        let mut queue = VecDeque::new();
        let mut visited = BTreeSet::new();

        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(current) {
                if !members.contains(next) {
                    continue;
                }
                if next == start {
                    let mut path = vec![start.to_string()];
                    let mut cursor = current;
                    let mut reversed = Vec::new();
                    while cursor != start {
                        reversed.push(cursor.to_string());
                        cursor = parent.get(cursor)?;
                    }
                    path.extend(reversed.into_iter().rev());
                    path.push(start.to_string());
                    return Some(path);
                }
                if visited.insert(next) {
                    parent.insert(next, current);
                    queue.push_back(next);
                }
            }
        }
        None
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(edges: &[(&str, &str)]) -> DependencyGraph {
        let mut g = DependencyGraph::new();
        for (from, to) in edges {
            g.add_edge(from, to);
        }
        g
    }

    #[test]
    fn acyclic_graph_has_no_cycles() {
        let g = graph(&[("a", "b"), ("b", "c"), ("a", "c")]);
        assert!(!g.has_cycle());
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.node_count(), 3);
    }

    #[test]
    fn two_node_cycle_is_named() {
        let g = graph(&[("A", "B"), ("B", "A")]);
        let cycles = g.find_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].path, vec!["A", "B", "A"]);
        assert_eq!(cycles[0].describe(), "A -> B -> A");
        assert_eq!(cycles[0].members, vec!["A", "B"]);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let g = graph(&[("a", "a"), ("a", "b")]);
        let cycles = g.find_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].path, vec!["a", "a"]);
    }

    #[test]
    fn separate_components_reported_in_order() {
        let g = graph(&[("x", "y"), ("y", "x"), ("b", "c"), ("c", "d"), ("d", "b")]);
        let cycles = g.find_cycles();
        assert_eq!(cycles.len(), 2);
        assert_eq!(cycles[0].path, vec!["b", "c", "d", "b"]);
        assert_eq!(cycles[1].path, vec!["x", "y", "x"]);
    }

    #[test]
    fn component_members_cover_overlapping_cycles() {
        let g = graph(&[("a", "b"), ("b", "a"), ("b", "c"), ("c", "a")]);
        let cycles = g.find_cycles();
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].members, vec!["a", "b", "c"]);
        assert_eq!(cycles[0].path, vec!["a", "b", "a"]);
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let mut g = DependencyGraph::new();
        for i in 0..50_000 {
            g.add_edge(&format!("n{i}"), &format!("n{}", i + 1));
        }
        assert!(!g.has_cycle());
        g.add_edge("n50000", "n0");
        assert!(g.has_cycle());
    }

    #[test]
    fn density_is_integer_millionths() {
        let g = graph(&[("a", "b"), ("b", "a"), ("a", "c")]);
        assert_eq!(g.density_millionths(), 1_000_000);
        assert_eq!(DependencyGraph::new().density_millionths(), 0);
    }
}
