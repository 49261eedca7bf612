use std::collections::HashSet;

use qvis_core::types::{DocumentId, DocumentSet, QueryNode};

use crate::evaluator::RetrievedNode;

/// A retrieved node together with how many of its documents are relevant.
#[derive(Debug, Clone)]
pub struct AnnotatedNode<'a> {
    pub node: &'a RetrievedNode<'a>,
    pub relevant_retrieved_count: usize,
    pub children: Vec<AnnotatedNode<'a>>,
}

impl<'a> AnnotatedNode<'a> {
    pub fn source(&self) -> &'a QueryNode {
        self.node.source
    }

    pub fn retrieved_count(&self) -> usize {
        self.node.retrieved_count()
    }
}

/// Counts, for every node, the retrieved documents that appear in `relevant`.
///
/// Each node is intersected on its own: with NOT, or with documents shared
/// between siblings, a parent's count cannot be derived from its children's.
pub fn annotate<'a>(root: &'a RetrievedNode<'a>, relevant: &HashSet<DocumentId>) -> AnnotatedNode<'a> {
    AnnotatedNode {
        node: root,
        relevant_retrieved_count: relevant_in(&root.documents, relevant),
        children: root.children.iter().map(|child| annotate(child, relevant)).collect(),
    }
}

fn relevant_in(documents: &DocumentSet, relevant: &HashSet<DocumentId>) -> usize {
    if relevant.len() < documents.len() {
        relevant.iter().filter(|id| documents.contains(*id)).count()
    } else {
        documents.iter().filter(|id| relevant.contains(*id)).count()
    }
}
