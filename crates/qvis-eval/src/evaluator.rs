//! Recursive, memoizing evaluation of query trees.
//!
//! Only leaves touch the cache and the backend. Combinators are rebuilt from
//! their children's sets on every evaluation, which keeps the cache bounded by
//! the number of distinct leaves rather than distinct sub-trees.

use rayon::prelude::*;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, info, warn};

use qvis_core::error::{Error, Result};
use qvis_core::traits::{DocumentSetCache, RetrievalAdapter};
use qvis_core::types::{DocumentSet, Operator, QueryNode};
use qvis_core::CacheKey;

/// Result of evaluating one query node, mirroring the query tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedNode<'q> {
    pub source: &'q QueryNode,
    pub documents: DocumentSet,
    pub children: Vec<RetrievedNode<'q>>,
}

impl<'q> RetrievedNode<'q> {
    pub fn retrieved_count(&self) -> usize {
        self.documents.len()
    }
}

type Slot = Arc<Mutex<Option<Result<DocumentSet>>>>;

/// Leaf outcomes seen during one `evaluate` call. Each key gets its own slot so
/// concurrent siblings asking for the same leaf wait for a single lookup.
/// Failures are remembered too: once one leaf fails, no other leaf reaches the
/// cache or the backend.
#[derive(Default)]
struct Memo {
    slots: Mutex<HashMap<CacheKey, Slot>>,
    failure: Mutex<Option<Error>>,
}

impl Memo {
    fn slot(&self, key: CacheKey) -> Slot {
        Arc::clone(lock(&self.slots).entry(key).or_default())
    }

    fn failure(&self) -> Option<Error> {
        lock(&self.failure).clone()
    }

    fn record_failure(&self, error: &Error) {
        let mut failure = lock(&self.failure);
        if failure.is_none() {
            *failure = Some(error.clone());
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct TreeEvaluator<C, R> where C: DocumentSetCache, R: RetrievalAdapter {
    cache: C,
    retriever: R,
    parallel: bool,
}

impl<C, R> TreeEvaluator<C, R> where C: DocumentSetCache, R: RetrievalAdapter {
    pub fn new(cache: C, retriever: R) -> Self { Self { cache, retriever, parallel: false } }

    /// Evaluate sibling sub-trees on the rayon pool.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn cache(&self) -> &C { &self.cache }

    pub fn retriever(&self) -> &R { &self.retriever }

    /// Evaluates `root` depth-first, children before parents.
    ///
    /// The tree is validated up front, so a malformed query fails with
    /// [`Error::Structural`] before any cache or backend access. Any leaf
    /// failure aborts the whole evaluation; cache entries written before the
    /// failure are kept. In parallel mode leaves already in flight finish, but
    /// none start after the first failure.
    pub fn evaluate<'q>(&self, root: &'q QueryNode) -> Result<RetrievedNode<'q>> {
        root.validate()?;
        let start = Instant::now();
        let memo = Memo::default();
        let retrieved = self.evaluate_node(root, &memo, 0)?;
        info!(
            nodes = root.node_count(),
            retrieved = retrieved.retrieved_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "finished evaluating query tree"
        );
        Ok(retrieved)
    }

    fn evaluate_node<'q>(&self, node: &'q QueryNode, memo: &Memo, level: usize) -> Result<RetrievedNode<'q>> {
        let (documents, children) = match node {
            QueryNode::Term(term) => (self.leaf(node, memo, || self.retriever.retrieve_term(term))?, Vec::new()),
            QueryNode::Proximity(p) => (self.leaf(node, memo, || self.retriever.retrieve_proximity(p))?, Vec::new()),
            QueryNode::Combinator(c) => {
                let children = self.evaluate_children(&c.children, memo, level + 1)?;
                let sets: Vec<&DocumentSet> = children.iter().map(|child| &child.documents).collect();
                (combine(c.operator, &sets), children)
            }
        };
        let kind = if node.is_leaf() { "atom" } else { "clause" };
        debug!(
            kind,
            node = %node.describe(),
            docs = documents.len(),
            level,
            "combined"
        );
        Ok(RetrievedNode { source: node, documents, children })
    }

    fn evaluate_children<'q>(&self, children: &'q [QueryNode], memo: &Memo, level: usize) -> Result<Vec<RetrievedNode<'q>>> {
        if !self.parallel {
            return children.iter().map(|child| self.evaluate_node(child, memo, level)).collect();
        }
        // Siblings started after a failure return that failure without touching
        // the backend, so collecting every result costs no extra retrievals.
        let results: Vec<Result<RetrievedNode<'q>>> = children.par_iter().map(|child| self.evaluate_node(child, memo, level)).collect();
        results.into_iter().collect()
    }

    /// Cache lookup for a leaf, falling back to `retrieve` on a miss and
    /// writing the result through. Each key is resolved at most once per
    /// evaluation, whether it succeeds or fails.
    fn leaf<F>(&self, node: &QueryNode, memo: &Memo, retrieve: F) -> Result<DocumentSet>
    where
        F: FnOnce() -> anyhow::Result<DocumentSet>,
    {
        let key = node.key();
        let slot = memo.slot(key);
        let mut slot = lock(&slot);
        if let Some(outcome) = slot.as_ref() {
            return outcome.clone();
        }
        if let Some(error) = memo.failure() {
            debug!(%key, node = %node.describe(), "skipped after earlier failure");
            return Err(error);
        }

        let outcome = self.resolve(node, &key, retrieve);
        if let Err(e) = &outcome {
            memo.record_failure(e);
        }
        *slot = Some(outcome.clone());
        outcome
    }

    fn resolve<F>(&self, node: &QueryNode, key: &CacheKey, retrieve: F) -> Result<DocumentSet>
    where
        F: FnOnce() -> anyhow::Result<DocumentSet>,
    {
        if let Some(documents) = self.cache.get(key).inspect_err(|e| warn!(%key, error = %e, "cache read failed"))? {
            return Ok(documents);
        }
        let documents = retrieve().map_err(|e| {
            warn!(%key, node = %node.describe(), error = %e, "retrieval failed");
            Error::Backend { node: node.describe(), message: format!("{:#}", e) }
        })?;
        self.cache.set(key, &documents).inspect_err(|e| warn!(%key, error = %e, "cache write failed"))?;
        Ok(documents)
    }
}

/// Combines child result sets under `operator`.
///
/// `AND` intersects left to right, `OR` unions, and `NOT` subtracts the union
/// of every set after the first from the first. No sets yields the empty set.
pub fn combine(operator: Operator, sets: &[&DocumentSet]) -> DocumentSet {
    let Some((first, rest)) = sets.split_first() else {
        return DocumentSet::new();
    };
    match operator {
        Operator::And => {
            let mut result = (*first).clone();
            for set in rest {
                if result.is_empty() { break; }
                result.retain(|doc| set.contains(doc));
            }
            result
        }
        Operator::Or => sets.iter().flat_map(|set| set.iter().cloned()).collect(),
        Operator::Not => first.iter().filter(|doc| !rest.iter().any(|set| set.contains(*doc))).cloned().collect(),
    }
}
