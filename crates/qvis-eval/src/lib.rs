//! qvis-eval
//!
//! Evaluates query trees against a cached retrieval backend, attaches
//! relevance counts and flattens the result into a renderable graph.
pub mod annotate;
pub mod engine;
pub mod evaluator;
pub mod visualize;

pub use annotate::{annotate, AnnotatedNode};
pub use engine::QueryVisualizer;
pub use evaluator::{combine, RetrievedNode, TreeEvaluator};
pub use visualize::{emit, QueryGraph, Shape, VisualizationEdge, VisualizationNode};
