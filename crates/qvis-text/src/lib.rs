//! qvis-text
//!
//! Tantivy-backed retrieval adapter: `TantivyIndexer` builds an index from
//! plain text files and `TantivyRetriever` answers term and proximity leaves
//! against it with the full set of matching document ids.
pub mod tantivy_utils;
pub mod index;
pub mod retriever;

pub use index::{SourceDocument, TantivyIndexer};
pub use retriever::TantivyRetriever;
