#[path = "../common/mod.rs"]
mod common;

use std::collections::{BTreeSet, HashSet};

use common::{MapRetriever, NullCache};
use proptest::prelude::*;
use qvis_cache::MemoryDocumentCache;
use qvis_core::{DocumentSet, QueryNode};
use qvis_eval::{annotate, AnnotatedNode, QueryGraph, TreeEvaluator};

fn to_set(ids: &BTreeSet<u8>) -> DocumentSet {
    ids.iter().map(|i| format!("doc{}", i)).collect()
}

fn doc_set() -> impl Strategy<Value = BTreeSet<u8>> {
    prop_oneof![
        3 => prop::collection::btree_set(0u8..40, 0..20),
        1 => Just(BTreeSet::new()),
    ]
}

/// Independent sets, with empty and fully-overlapping cases drawn often.
fn doc_sets() -> impl Strategy<Value = Vec<BTreeSet<u8>>> {
    prop_oneof![
        3 => prop::collection::vec(doc_set(), 2..5),
        1 => (prop::collection::btree_set(0u8..40, 0..20), 2usize..5).prop_map(|(set, n)| vec![set; n]),
    ]
}

fn union_of(sets: &[BTreeSet<u8>]) -> DocumentSet {
    sets.iter().flat_map(to_set).collect()
}

/// One retriever entry and one term leaf per generated set.
fn leaves(sets: &[BTreeSet<u8>]) -> (MapRetriever, Vec<QueryNode>) {
    let mut retriever = MapRetriever::new();
    let mut nodes = Vec::new();
    for (i, ids) in sets.iter().enumerate() {
        let query = format!("term{}", i);
        retriever = retriever.with_set(&query, to_set(ids));
        nodes.push(QueryNode::term(query));
    }
    (retriever, nodes)
}

fn check_counts(node: &AnnotatedNode<'_>, relevant: &HashSet<String>) -> Result<(), TestCaseError> {
    prop_assert!(node.relevant_retrieved_count <= node.retrieved_count());
    prop_assert!(node.relevant_retrieved_count <= relevant.len());
    for child in &node.children {
        check_counts(child, relevant)?;
    }
    Ok(())
}

proptest! {
    #[test]
    fn and_is_the_intersection_of_its_children(sets in doc_sets()) {
        let (retriever, children) = leaves(&sets);
        let evaluator = TreeEvaluator::new(NullCache, retriever);
        let query = QueryNode::and(children);
        let root = evaluator.evaluate(&query).unwrap();
        for child in &root.children {
            prop_assert!(root.documents.is_subset(&child.documents));
        }
        let expected = sets.iter().skip(1).fold(to_set(&sets[0]), |acc, s| acc.intersection(&to_set(s)).cloned().collect());
        prop_assert_eq!(root.documents, expected);
    }

    #[test]
    fn or_is_the_union_of_its_children(sets in doc_sets()) {
        let (retriever, children) = leaves(&sets);
        let evaluator = TreeEvaluator::new(NullCache, retriever);
        let query = QueryNode::or(children);
        let root = evaluator.evaluate(&query).unwrap();
        for child in &root.children {
            prop_assert!(child.documents.is_subset(&root.documents));
        }
        prop_assert_eq!(root.documents, union_of(&sets));
    }

    #[test]
    fn not_is_the_base_minus_every_exclusion(sets in doc_sets()) {
        let (retriever, children) = leaves(&sets);
        let evaluator = TreeEvaluator::new(NullCache, retriever);
        let query = QueryNode::not(children);
        let root = evaluator.evaluate(&query).unwrap();
        for excluded in &root.children[1..] {
            prop_assert!(root.documents.is_disjoint(&excluded.documents));
        }
        let excluded = union_of(&sets[1..]);
        let expected: DocumentSet = to_set(&sets[0]).difference(&excluded).cloned().collect();
        prop_assert_eq!(root.documents, expected);
    }

    #[test]
    fn relevant_counts_never_exceed_retrieved(sets in doc_sets(), rel in prop::collection::btree_set(0u8..40, 0..15)) {
        let (retriever, children) = leaves(&sets);
        let evaluator = TreeEvaluator::new(MemoryDocumentCache::new(), retriever);
        let (first, rest) = children.split_at(1);
        let query = QueryNode::or(vec![
            QueryNode::and(children.clone()),
            QueryNode::not(vec![first[0].clone(), QueryNode::or(rest.to_vec())]),
        ]);
        let relevant: HashSet<String> = to_set(&rel).into_iter().collect();
        let root = evaluator.evaluate(&query).unwrap();
        let annotated = annotate(&root, &relevant);
        check_counts(&annotated, &relevant)?;

        let graph = QueryGraph::build(&annotated, relevant.len());
        prop_assert_eq!(graph.nodes.len(), query.node_count());
        prop_assert_eq!(graph.edges.len(), query.node_count() - 1);
        prop_assert_eq!(graph.num_rel_ret, root.documents.iter().filter(|d| relevant.contains(*d)).count());
    }

    #[test]
    fn json_round_trip_preserves_the_key(sets in doc_sets(), distance in 0i64..10, ordered in any::<bool>()) {
        let (_, children) = leaves(&sets);
        let query = QueryNode::and(vec![
            QueryNode::or(children),
            QueryNode::proximity("heart attack", distance, ordered),
        ]);
        let json = serde_json::to_string(&query).unwrap();
        let parsed: QueryNode = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(parsed.key(), query.key());
    }
}
