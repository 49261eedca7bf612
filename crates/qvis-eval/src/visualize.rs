//! Node/edge graph for rendering an annotated query tree.

use serde::{Deserialize, Serialize};

use crate::annotate::AnnotatedNode;

/// Parent id of the root node.
pub const NO_PARENT: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// Term and proximity leaves.
    Box,
    /// Boolean combinators.
    Circle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualizationNode {
    pub id: usize,
    /// `"<retrieved> (<relevant retrieved>)"`
    pub label: String,
    /// Description of the query node, e.g. `diabetes[Title]` or `AND`.
    pub title: String,
    pub retrieved_count: usize,
    pub relevant_retrieved_count: usize,
    pub level: usize,
    pub shape: Shape,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisualizationEdge {
    pub from: usize,
    pub to: usize,
    /// Retrieved count of the child end.
    pub value: usize,
    pub label: String,
}

/// Everything a renderer needs, plus the totals callers summarise with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryGraph {
    pub nodes: Vec<VisualizationNode>,
    pub edges: Vec<VisualizationEdge>,
    pub num_rel: usize,
    pub num_ret: usize,
    pub num_rel_ret: usize,
}

impl QueryGraph {
    pub fn build(root: &AnnotatedNode<'_>, num_rel: usize) -> Self {
        let (nodes, edges) = emit(root);
        Self {
            nodes,
            edges,
            num_rel,
            num_ret: root.retrieved_count(),
            num_rel_ret: root.relevant_retrieved_count,
        }
    }
}

pub fn fmt_label(retrieved: usize, relevant_retrieved: usize) -> String {
    format!("{} ({})", retrieved, relevant_retrieved)
}

/// Flattens the tree into nodes and edges. Ids are assigned in pre-order
/// starting at 1; every node except the root gets one inbound edge.
pub fn emit(root: &AnnotatedNode<'_>) -> (Vec<VisualizationNode>, Vec<VisualizationEdge>) {
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    let mut next_id = NO_PARENT + 1;
    emit_rec(root, NO_PARENT, 0, &mut next_id, &mut nodes, &mut edges);
    (nodes, edges)
}

fn emit_rec(
    node: &AnnotatedNode<'_>,
    parent: usize,
    level: usize,
    next_id: &mut usize,
    nodes: &mut Vec<VisualizationNode>,
    edges: &mut Vec<VisualizationEdge>,
) {
    let id = *next_id;
    *next_id += 1;
    let retrieved = node.retrieved_count();
    let label = fmt_label(retrieved, node.relevant_retrieved_count);
    nodes.push(VisualizationNode {
        id,
        label: label.clone(),
        title: node.source().describe(),
        retrieved_count: retrieved,
        relevant_retrieved_count: node.relevant_retrieved_count,
        level,
        shape: if node.source().is_leaf() { Shape::Box } else { Shape::Circle },
    });
    if parent != NO_PARENT {
        edges.push(VisualizationEdge { from: parent, to: id, value: retrieved, label });
    }
    for child in &node.children {
        emit_rec(child, id, level + 1, next_id, nodes, edges);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::annotate;
    use crate::evaluator::RetrievedNode;
    use qvis_core::{DocumentSet, QueryNode};
    use std::collections::HashSet;

    fn docs(ids: &[&str]) -> DocumentSet {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn leaf<'q>(source: &'q QueryNode, ids: &[&str]) -> RetrievedNode<'q> {
        RetrievedNode { source, documents: docs(ids), children: vec![] }
    }

    #[test]
    fn ids_are_preorder_and_edges_point_at_children() {
        let a = QueryNode::term("a");
        let b = QueryNode::term("b");
        let c = QueryNode::term("c");
        let inner = QueryNode::or(vec![b.clone(), c.clone()]);
        let root = QueryNode::and(vec![a.clone(), inner.clone()]);
        let retrieved = RetrievedNode {
            source: &root,
            documents: docs(&["1"]),
            children: vec![
                leaf(&a, &["1", "2"]),
                RetrievedNode { source: &inner, documents: docs(&["1", "3"]), children: vec![leaf(&b, &["1"]), leaf(&c, &["3"])] },
            ],
        };
        let relevant: HashSet<String> = ["1".to_string()].into_iter().collect();
        let graph = QueryGraph::build(&annotate(&retrieved, &relevant), relevant.len());

        let ids: Vec<usize> = graph.nodes.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        let titles: Vec<&str> = graph.nodes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["AND", "a", "OR", "b", "c"]);
        let levels: Vec<usize> = graph.nodes.iter().map(|n| n.level).collect();
        assert_eq!(levels, vec![0, 1, 1, 2, 2]);
        let shapes: Vec<Shape> = graph.nodes.iter().map(|n| n.shape).collect();
        assert_eq!(shapes, vec![Shape::Circle, Shape::Box, Shape::Circle, Shape::Box, Shape::Box]);

        let pairs: Vec<(usize, usize)> = graph.edges.iter().map(|e| (e.from, e.to)).collect();
        assert_eq!(pairs, vec![(1, 2), (1, 3), (3, 4), (3, 5)]);
        assert_eq!(graph.edges[1].label, "2 (1)");
        assert_eq!(graph.edges[1].value, 2);
        assert_eq!(graph.nodes[0].label, "1 (1)");
        assert_eq!((graph.num_rel, graph.num_ret, graph.num_rel_ret), (1, 1, 1));
    }

    #[test]
    fn shape_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Shape::Box).unwrap(), "\"box\"");
        assert_eq!(serde_json::to_string(&Shape::Circle).unwrap(), "\"circle\"");
    }
}
