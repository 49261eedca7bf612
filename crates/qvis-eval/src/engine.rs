use std::collections::HashSet;
use tracing::info;

use qvis_core::error::Result;
use qvis_core::traits::{DocumentSetCache, RetrievalAdapter};
use qvis_core::types::{DocumentId, QueryNode};

use crate::annotate::annotate;
use crate::evaluator::TreeEvaluator;
use crate::visualize::QueryGraph;

/// Evaluate, annotate and emit in one call.
pub struct QueryVisualizer<C, R> where C: DocumentSetCache, R: RetrievalAdapter {
    evaluator: TreeEvaluator<C, R>,
}

impl<C, R> QueryVisualizer<C, R> where C: DocumentSetCache, R: RetrievalAdapter {
    pub fn new(evaluator: TreeEvaluator<C, R>) -> Self { Self { evaluator } }

    pub fn evaluator(&self) -> &TreeEvaluator<C, R> { &self.evaluator }

    /// Builds the annotated graph for `query`. A failed evaluation yields an
    /// error and no graph at all.
    pub fn visualize(&self, query: &QueryNode, relevant: &HashSet<DocumentId>) -> Result<QueryGraph> {
        let retrieved = self.evaluator.evaluate(query)?;
        let annotated = annotate(&retrieved, relevant);
        let graph = QueryGraph::build(&annotated, relevant.len());
        info!(
            num_rel = graph.num_rel,
            num_ret = graph.num_ret,
            num_rel_ret = graph.num_rel_ret,
            nodes = graph.nodes.len(),
            "finished processing query, tree has been constructed"
        );
        Ok(graph)
    }
}
