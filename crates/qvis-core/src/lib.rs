#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

//! qvis-core
//!
//! Query tree model, canonical cache keys, error kinds and the seam traits
//! (`RetrievalAdapter`, `DocumentSetCache`) shared by every other crate.

pub mod config;
pub mod error;
pub mod fields;
pub mod key;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use key::{key, CacheKey};
pub use traits::{DocumentSetCache, RetrievalAdapter};
pub use types::{Combinator, DocumentId, DocumentSet, Operator, Proximity, QueryNode, Term};
