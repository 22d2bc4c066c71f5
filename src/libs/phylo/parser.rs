//! Decomposes a single-line Newick string into an undirected edge list.
//!
//! The innermost bracketed group is repeatedly cut out of a working copy of
//! the string, its children are linked to each other and to a freshly named
//! interior node, and a placeholder `node_<k>:0.1` is spliced back in its
//! place. What remains after the loop is the (possibly multifurcating) root,
//! whose children are linked to each other only.
//!
//! The parser extracts topology and support values; it does not validate the
//! Newick syntax. Malformed input yields a best-effort decomposition.
//!
//! Leaf and interior tokens are told apart only by the `node_` prefix, so
//! taxon labels must not start with it.

use indexmap::IndexMap;

/// A directed edge `(from, to)`. Both directions are always stored.
pub type Edge = (String, String);

/// Prefix of the synthetic interior-node ids.
pub const INTERIOR_PREFIX: &str = "node_";

/// Support recorded for interior nodes without a label.
pub const UNKNOWN_SUPPORT: &str = "-1";

/// Upper bound on collapsed groups per tree.
pub const MAX_COLLAPSE: usize = 1000;

/// Branch length given to the placeholder spliced back into the string.
const PLACEHOLDER_LENGTH: &str = "0.1";

/// Returns `true` for ids created by the parser for interior nodes.
pub fn is_interior(id: &str) -> bool {
    id.starts_with(INTERIOR_PREFIX)
}

/// Topology of one tree as produced by [`parse`].
#[derive(Debug, Default, Clone)]
pub struct ParsedTree {
    /// Adjacency edges in the order they were generated
    pub edges: Vec<Edge>,
    /// Support value of every interior node, keyed in parse order
    pub supports: IndexMap<String, String>,
    /// The collapse loop stopped at [`MAX_COLLAPSE`] or on an unmatched bracket
    pub truncated: bool,
}

impl ParsedTree {
    /// Interior-node ids in the order they were created.
    pub fn interior_nodes(&self) -> impl Iterator<Item = &str> {
        self.supports.keys().map(|k| k.as_str())
    }
}

/// Parses a Newick string into edges and interior-node supports.
///
/// ```
/// let tree = nestedin::libs::phylo::parser::parse("((A:0.1,B:0.1)90:0.1,C:0.1);");
/// assert_eq!(tree.supports.get("node_0").map(String::as_str), Some("90"));
/// assert_eq!(tree.edges.len(), 2 + 4 + 2);
/// ```
pub fn parse(newick: &str) -> ParsedTree {
    let mut work = newick.trim().to_string();
    let mut tree = ParsedTree::default();

    let mut tag = 0;
    loop {
        let Some(close) = work.find(')') else {
            break;
        };
        // Only the outermost group is left
        if close + 3 > work.len() {
            break;
        }
        if tag >= MAX_COLLAPSE {
            tree.truncated = true;
            break;
        }

        match collapse(&mut work, tag) {
            Some((edges, support)) => {
                tree.edges.extend(edges);
                tree.supports.insert(interior_id(tag), support);
            }
            None => {
                tree.truncated = true;
                break;
            }
        }
        tag += 1;
    }

    let (children, _) = child_tokens(&work);
    tree.edges.extend(all_pairs(&children));

    tree
}

fn interior_id(tag: usize) -> String {
    format!("{}{}", INTERIOR_PREFIX, tag)
}

/// Cuts the group closed by the leftmost `)` out of `work` and splices in a
/// placeholder for interior node `tag`.
///
/// Returns the edges of the group and its support, `None` when the closing
/// bracket has no opening partner.
fn collapse(work: &mut String, tag: usize) -> Option<(Vec<Edge>, String)> {
    let close = work.find(')')?;
    let open = work[..close].rfind('(')?;

    let leading = if open == 0 {
        None
    } else {
        Some(work.as_bytes()[open - 1])
    };

    // Two layouts:
    //   ((A:0.1,B:0.1)95:0.01,C)       group left of a comma
    //   (C,(A:0.1,B:0.1)95:0.01)       group right of a comma, closed by the parent
    //   (C,(A:0.1,B:0.1)95:0.01,D)     group right of a comma, more siblings follow
    let right = if leading == Some(b',') {
        let next_close = find_from(work, ')', close + 1);
        let next_comma = find_from(work, ',', close);
        match (next_comma, next_close) {
            (Some(comma), Some(paren)) => comma.min(paren),
            (Some(comma), None) => comma,
            (None, Some(paren)) => paren,
            (None, None) => work.len(),
        }
    } else {
        find_from(work, ',', close)
            .or_else(|| find_from(work, ')', close + 1))
            .unwrap_or(work.len())
    };

    let group = work[open..right].to_string();
    let placeholder = format!("{}:{}", interior_id(tag), PLACEHOLDER_LENGTH);
    work.replace_range(open..right, &placeholder);

    let (children, support) = child_tokens(&group);
    let node = interior_id(tag);

    let mut edges = all_pairs(&children);
    for child in &children {
        edges.push((node.clone(), child.clone()));
        edges.push((child.clone(), node.clone()));
    }

    let support = support
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_SUPPORT.to_string());

    Some((edges, support))
}

/// Extracts the immediate child tokens of a group such as
/// `(A:0.5,B:0.5)95:0.5`, plus the support label following its `)`.
///
/// A token is the text between the previous comma (or the start) and a colon.
/// The colon of the group's own support shares its comma with the last child
/// and is skipped.
fn child_tokens(line: &str) -> (Vec<String>, Option<String>) {
    let line = match line.find('(') {
        Some(paren) => &line[paren + 1..],
        None => line,
    };

    let mut tokens = vec![];
    let mut support = None;

    let mut from = 0;
    let mut start = 0;
    while let Some(colon) = find_from(line, ':', from) {
        from = colon + 1;
        if colon == 0 {
            continue;
        }

        if let Some(paren) = line[..colon].rfind(')') {
            support = Some(line[paren + 1..colon].to_string());
        }

        match line[..colon].rfind(',') {
            None => start = 0,
            Some(comma) if comma + 1 == start => continue,
            Some(comma) => start = comma + 1,
        }

        tokens.push(line[start..colon].to_string());
    }

    (tokens, support)
}

/// Bidirectional edges between every pair of nodes.
fn all_pairs(nodes: &[String]) -> Vec<Edge> {
    let mut edges = vec![];
    for (i, a) in nodes.iter().enumerate() {
        for (j, b) in nodes.iter().enumerate() {
            if i != j {
                edges.push((a.clone(), b.clone()));
            }
        }
    }
    edges
}

fn find_from(s: &str, pat: char, from: usize) -> Option<usize> {
    if from > s.len() || !s.is_char_boundary(from) {
        return None;
    }
    s[from..].find(pat).map(|i| i + from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn has_edge(tree: &ParsedTree, a: &str, b: &str) -> bool {
        tree.edges.iter().any(|(x, y)| x == a && y == b)
    }

    #[test]
    fn flat_tree_is_all_pairs() {
        let tree = parse("(A:0.1,B:0.2,C:0.3,D:0.4);");
        assert!(tree.supports.is_empty());
        assert_eq!(tree.edges.len(), 4 * 3);
        assert!(has_edge(&tree, "A", "D"));
        assert!(has_edge(&tree, "D", "A"));
        assert!(!tree.truncated);
    }

    #[test]
    fn unbracketed_list() {
        let tree = parse("A:1,B:1,C:1");
        assert_eq!(tree.edges.len(), 6);
        assert!(tree.supports.is_empty());
    }

    #[test]
    fn group_left_of_comma() {
        let tree = parse("((A:0.1,B:0.1)90:0.1,C:0.1);");
        assert_eq!(tree.supports.len(), 1);
        assert_eq!(tree.supports["node_0"], "90");

        assert!(has_edge(&tree, "A", "B"));
        assert!(has_edge(&tree, "node_0", "A"));
        assert!(has_edge(&tree, "B", "node_0"));
        assert!(has_edge(&tree, "node_0", "C"));
        assert!(!has_edge(&tree, "A", "C"));
    }

    #[test]
    fn group_right_of_comma() {
        let tree = parse("(C:0.1,(A:0.1,B:0.1)95:0.01);");
        assert_eq!(tree.supports["node_0"], "95");
        assert!(has_edge(&tree, "node_0", "A"));
        assert!(has_edge(&tree, "C", "node_0"));
    }

    #[test]
    fn group_between_siblings() {
        let tree = parse("(C:0.1,(A:0.1,B:0.1)95:0.01,D:0.2);");
        assert_eq!(tree.supports.len(), 1);
        assert!(has_edge(&tree, "node_0", "D"));
        assert!(has_edge(&tree, "C", "D"));
        assert!(!has_edge(&tree, "A", "D"));
    }

    #[test]
    fn nested_groups_in_parse_order() {
        let tree = parse("(X:1,((A:1,B:1)90:1,C:1)80:1,D:1);");
        let ids: Vec<&str> = tree.interior_nodes().collect();
        assert_eq!(ids, vec!["node_0", "node_1"]);
        assert_eq!(tree.supports["node_0"], "90");
        assert_eq!(tree.supports["node_1"], "80");
        assert!(has_edge(&tree, "node_1", "node_0"));
        assert!(has_edge(&tree, "node_1", "X"));
    }

    #[test]
    fn missing_support_is_unknown() {
        let tree = parse("((A:0.1,B:0.1):0.1,C:0.1,D:0.1);");
        assert_eq!(tree.supports["node_0"], UNKNOWN_SUPPORT);
    }

    #[test]
    fn unbalanced_root() {
        // No opening bracket for the root
        let tree = parse("(A:0.1,B:0.1)90:0.1,C:0.1);");
        assert_eq!(tree.supports.len(), 1);
        assert_eq!(tree.supports["node_0"], "90");
        assert!(has_edge(&tree, "node_0", "C"));
    }

    #[test]
    fn unmatched_close_is_truncated() {
        let tree = parse("A:1,B:1)90:1,C:1,D:1);");
        assert!(tree.truncated);
        assert!(tree.supports.is_empty());
    }

    #[test]
    fn non_ascii_labels() {
        let tree = parse("((Émile:1,ß:1)90:1,C:1,D:1);");
        assert_eq!(tree.supports["node_0"], "90");
        assert!(has_edge(&tree, "Émile", "ß"));
        assert!(has_edge(&tree, "node_0", "Émile"));

        let (tokens, _) = child_tokens("(Ä:1,B:1)");
        assert_eq!(tokens, vec!["Ä".to_string(), "B".to_string()]);
    }

    /// `depth` groups of the form `(inner,B<i>:1)90:1`, innermost first.
    fn caterpillar(depth: usize) -> String {
        let mut newick = "A:1".to_string();
        for i in 0..depth {
            newick = format!("({},B{}:1)90:1", newick, i);
        }
        newick + ";"
    }

    #[test]
    fn collapse_cap() {
        let tree = parse(&caterpillar(MAX_COLLAPSE + 1));
        assert!(tree.truncated);
        assert_eq!(tree.supports.len(), MAX_COLLAPSE);
        assert!(has_edge(&tree, "node_999", "B1000"));

        let tree = parse(&caterpillar(10));
        assert!(!tree.truncated);
    }

    #[test]
    fn tokens_skip_group_support() {
        let (tokens, support) = child_tokens("(A:0.5,B:0.5)95:0.5");
        assert_eq!(tokens, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(support.as_deref(), Some("95"));
    }

    #[test]
    fn single_token_has_no_edges() {
        assert!(all_pairs(&["A".to_string()]).is_empty());
    }
}
