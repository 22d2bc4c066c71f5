use super::bipartition::Bipartition;
use super::parser::{is_interior, Edge, ParsedTree, UNKNOWN_SUPPORT};
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use std::collections::VecDeque;

/// Upper bound on collapsing passes in [`Graph::to_newick`].
pub const MAX_REBUILD: usize = 1000;

/// Undirected adjacency of one tree, keyed in edge insertion order.
#[derive(Debug, Default, Clone)]
pub struct Graph {
    adjacency: IndexMap<String, IndexSet<String>>,
}

impl Graph {
    /// Builds the adjacency from an edge list. Each edge is added both ways.
    pub fn new(edges: &[Edge]) -> Self {
        let mut graph = Self::default();
        for (a, b) in edges {
            graph.add_edge(a, b);
            graph.add_edge(b, a);
        }
        graph
    }

    fn add_edge(&mut self, from: &str, to: &str) {
        self.adjacency
            .entry(from.to_string())
            .or_default()
            .insert(to.to_string());
    }

    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.adjacency.contains_key(node)
    }

    pub fn neighbors(&self, node: &str) -> Option<&IndexSet<String>> {
        self.adjacency.get(node)
    }

    /// Leaf ids in insertion order.
    pub fn leaves(&self) -> Vec<&str> {
        self.adjacency
            .keys()
            .map(|k| k.as_str())
            .filter(|k| !is_interior(k))
            .collect()
    }

    /// The leaf used to orient bipartitions.
    ///
    /// An exact match of `seed` first, then the first leaf containing it,
    /// then the first leaf of the graph.
    pub fn resolve_seed(&self, seed: Option<&str>) -> Option<&str> {
        let leaves = self.leaves();
        if let Some(seed) = seed {
            if let Some(leaf) = leaves.iter().find(|l| **l == seed) {
                return Some(*leaf);
            }
            if let Some(leaf) = leaves.iter().find(|l| l.contains(seed)) {
                return Some(*leaf);
            }
        }
        leaves.first().copied()
    }

    /// One bipartition per interior node of `tree`, in parse order.
    ///
    /// Removing an interior node disconnects the graph; the leaves still
    /// reachable from the seed form `seed_side`, the rest `other_side`.
    /// Interior nodes that never made it into the graph, and splits with an
    /// empty side, are skipped.
    pub fn fission(&self, tree: &ParsedTree, seed: Option<&str>) -> Vec<Bipartition> {
        let Some(seed) = self.resolve_seed(seed) else {
            return vec![];
        };
        let leaves = self.leaves();

        let mut bipartitions = vec![];
        for (node, support) in &tree.supports {
            if !self.contains(node) {
                continue;
            }

            let linked = self.spread(seed, node);
            let (seed_side, other_side): (Vec<&str>, Vec<&str>) =
                leaves.iter().copied().partition(|l| linked.contains(*l));

            // A labelled root collapses into a node that splits nothing
            if seed_side.is_empty() || other_side.is_empty() {
                continue;
            }

            bipartitions.push(Bipartition {
                node: node.clone(),
                support: support.clone(),
                seed_side: seed_side.into_iter().map(String::from).collect(),
                other_side: other_side.into_iter().map(String::from).collect(),
            });
        }

        bipartitions
    }

    /// Breadth-first search from `seed` over the graph with `removed` taken out.
    fn spread<'a>(&'a self, seed: &'a str, removed: &str) -> IndexSet<&'a str> {
        let mut done = IndexSet::new();
        let mut queue = VecDeque::new();

        done.insert(seed);
        queue.push_back(seed);

        while let Some(current) = queue.pop_front() {
            let Some(neighbors) = self.adjacency.get(current) else {
                continue;
            };
            for n in neighbors {
                if n == removed {
                    continue;
                }
                if done.insert(n.as_str()) {
                    queue.push_back(n.as_str());
                }
            }
        }

        done
    }

    /// Writes the graph back as a Newick string.
    ///
    /// Sibling leaves hanging off the same interior node are repeatedly merged
    /// into a bracketed group labelled with that node's support, until no merge
    /// is possible. Leaves containing `query` are put first in each group and
    /// in the final tip list. Branch lengths are not kept.
    ///
    /// Returns the string and whether [`MAX_REBUILD`] was reached.
    pub fn to_newick(
        &self,
        supports: &IndexMap<String, String>,
        query: Option<&str>,
    ) -> (String, bool) {
        let mut g = self.adjacency.clone();
        let query = query.filter(|q| !q.is_empty());

        let mut passes = 0;
        let mut capped = false;
        loop {
            passes += 1;
            let mut merged = 0;

            let interiors: Vec<String> = g.keys().filter(|k| is_interior(k)).cloned().collect();
            for node in interiors {
                let Some(neighbors) = g.get(&node) else {
                    continue;
                };
                let leaves: Vec<&String> = neighbors.iter().filter(|n| !is_interior(n)).collect();

                let mut group = None;
                for n1 in &leaves {
                    let mut candidate = vec![(*n1).clone()];
                    for n2 in &leaves {
                        if n1 != n2 && are_connected(&g, n1, n2) {
                            candidate.push((*n2).clone());
                        }
                    }
                    if candidate.len() > 1 {
                        group = Some(candidate);
                        break;
                    }
                }

                if let Some(group) = group {
                    let support = supports
                        .get(&node)
                        .map(String::as_str)
                        .unwrap_or(UNKNOWN_SUPPORT);
                    merge_group(&mut g, &node, group, support, query);
                    merged += 1;
                }
            }

            if merged == 0 {
                break;
            }
            if passes >= MAX_REBUILD {
                capped = true;
                break;
            }
        }

        let (mut head, tail): (Vec<&String>, Vec<&String>) = match query {
            Some(q) => g.keys().partition(|tip| tip.contains(q)),
            None => (g.keys().collect(), vec![]),
        };
        head.extend(tail);

        let tips = head.iter().map(|tip| format!("{}:0.1", tip)).join(",");
        (format!("({});", tips), capped)
    }
}

fn are_connected(g: &IndexMap<String, IndexSet<String>>, n1: &str, n2: &str) -> bool {
    match (g.get(n1), g.get(n2)) {
        (Some(a), Some(b)) => a.contains(n2) && b.contains(n1),
        _ => false,
    }
}

/// Replaces `node` and the leaves of `group` by one tip named after the
/// bracketed group.
fn merge_group(
    g: &mut IndexMap<String, IndexSet<String>>,
    node: &str,
    group: Vec<String>,
    support: &str,
    query: Option<&str>,
) {
    let mut ordered = group.clone();
    if let Some(q) = query {
        if let Some(pos) = ordered.iter().position(|l| l.contains(q)) {
            let first = ordered.remove(pos);
            ordered.insert(0, first);
        }
    }

    let name = format!(
        "({}){}",
        ordered.iter().map(|l| format!("{}:0.1", l)).join(","),
        support
    );

    // The new tip takes the place of the interior node
    let position = g
        .keys()
        .take_while(|k| k.as_str() != node)
        .filter(|k| !group.contains(*k))
        .count();

    let mut neighbors = g.shift_remove(node).unwrap_or_default();
    for leaf in &group {
        g.shift_remove(leaf);
        neighbors.shift_remove(leaf);
    }

    // Drop stale links to the merged leaves and point the rest at the new tip
    for set in g.values_mut() {
        for leaf in &group {
            set.shift_remove(leaf);
        }
        if let Some(i) = set.get_index_of(node) {
            set.shift_remove_index(i);
            set.insert(name.clone());
            set.move_index(set.len() - 1, i);
        }
    }

    g.insert(name, neighbors);
    let last = g.len() - 1;
    g.move_index(last, position.min(last));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::libs::phylo::parser::parse;

    fn sorted(v: &[String]) -> Vec<String> {
        let mut v = v.to_vec();
        v.sort();
        v
    }

    #[test]
    fn build_is_symmetric() {
        let graph = Graph::new(&[("A".to_string(), "B".to_string())]);
        assert!(graph.neighbors("A").unwrap().contains("B"));
        assert!(graph.neighbors("B").unwrap().contains("A"));
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn one_bipartition_per_interior_node() {
        let tree = parse("(X:1,((A:1,B:1)90:1,C:1)80:1,D:1);");
        let graph = Graph::new(&tree.edges);
        let parts = graph.fission(&tree, Some("A"));

        assert_eq!(parts.len(), 2);

        assert_eq!(parts[0].node, "node_0");
        assert_eq!(parts[0].support, "90");
        assert_eq!(sorted(&parts[0].seed_side), vec!["A", "B"]);
        assert_eq!(sorted(&parts[0].other_side), vec!["C", "D", "X"]);

        assert_eq!(parts[1].node, "node_1");
        assert_eq!(sorted(&parts[1].seed_side), vec!["A", "B", "C"]);
        assert_eq!(sorted(&parts[1].other_side), vec!["D", "X"]);
    }

    #[test]
    fn sides_cover_all_leaves_once() {
        let tree = parse(
            "((A:1,(B:1,C:1)99:1)80:1,((D:1,E:1)70:1,(F:1,(G:1,H:1)60:1)50:1)40:1,I:1);",
        );
        let graph = Graph::new(&tree.edges);
        let leaves = graph.leaves().len();
        assert_eq!(leaves, 9);

        let parts = graph.fission(&tree, None);
        assert_eq!(parts.len(), tree.supports.len());
        for p in &parts {
            assert_eq!(p.seed_side.len() + p.other_side.len(), leaves);
            assert!(p.seed_side.iter().all(|l| !p.other_side.contains(l)));
        }
    }

    #[test]
    fn labelled_root_is_not_a_split() {
        for newick in ["((Q:1,D1:1)95:1,D2:1)100;", "((Q:1,D1:1)95:1,D2:1):0.0;"] {
            let tree = parse(newick);
            assert_eq!(tree.supports.len(), 2);

            let graph = Graph::new(&tree.edges);
            let parts = graph.fission(&tree, Some("Q"));
            assert_eq!(parts.len(), 1);
            assert_eq!(parts[0].node, "node_0");
            assert_eq!(sorted(&parts[0].other_side), vec!["D2"]);
        }
    }

    #[test]
    fn seed_by_substring() {
        let tree = parse("((Q.seq1:1,B:1)90:1,C:1);");
        let graph = Graph::new(&tree.edges);
        assert_eq!(graph.resolve_seed(Some("Q")), Some("Q.seq1"));
        assert_eq!(graph.resolve_seed(Some("Z")), Some("Q.seq1"));
        assert_eq!(graph.resolve_seed(None), Some("Q.seq1"));
    }

    #[test]
    fn empty_graph_has_no_bipartitions() {
        let tree = parse("");
        let graph = Graph::new(&tree.edges);
        assert!(graph.is_empty());
        assert!(graph.fission(&tree, None).is_empty());
    }

    #[test]
    fn rebuild_nested() {
        let tree = parse("(((A:1,B:1)90:1,C:1)80:1,D:1,E:1);");
        let graph = Graph::new(&tree.edges);
        let (newick, capped) = graph.to_newick(&tree.supports, None);

        assert!(!capped);
        assert_eq!(newick, "(((A:0.1,B:0.1)90:0.1,C:0.1)80:0.1,D:0.1,E:0.1);");
    }

    #[test]
    fn rebuild_query_first() {
        let tree = parse("((A:1,B:1)90:1,C:1,D:1);");
        let graph = Graph::new(&tree.edges);

        let (newick, _) = graph.to_newick(&tree.supports, Some("B"));
        assert_eq!(newick, "((B:0.1,A:0.1)90:0.1,C:0.1,D:0.1);");

        let (newick, _) = graph.to_newick(&tree.supports, Some("D"));
        assert_eq!(newick, "(D:0.1,(A:0.1,B:0.1)90:0.1,C:0.1);");
    }

    #[test]
    fn rebuild_cap() {
        // Outer nodes come first, so each pass merges only the innermost group
        let depth = MAX_REBUILD + 100;
        let mut edges = vec![];
        let mut link = |a: &str, b: &str| {
            edges.push((a.to_string(), b.to_string()));
            edges.push((b.to_string(), a.to_string()));
        };
        link(&format!("node_{}", depth - 1), "R");
        for k in (0..depth).rev() {
            let node = format!("node_{}", k);
            let child = if k == 0 {
                "A".to_string()
            } else {
                format!("node_{}", k - 1)
            };
            let leaf = format!("B{}", k);
            link(&child, &leaf);
            link(&node, &child);
            link(&node, &leaf);
        }

        let graph = Graph::new(&edges);
        let (newick, capped) = graph.to_newick(&IndexMap::new(), None);
        assert!(capped);
        assert!(newick.starts_with('('));
        assert!(newick.contains("node_"));
    }
}
