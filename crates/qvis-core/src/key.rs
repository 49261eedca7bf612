//! Canonical cache keys for query nodes.
//!
//! A key is the BLAKE3 digest of a tagged, length-prefixed encoding of the
//! node's full structure. Field order is significant and nothing is
//! normalized here, so two nodes share a key exactly when they are equal.

use std::fmt;

use crate::error::{Error, Result};
use crate::types::QueryNode;

pub const KEY_LEN: usize = 32;

/// Bumping this invalidates every persisted cache entry.
const DOMAIN: &[u8] = b"qvis.query-node.v1";

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey([u8; KEY_LEN]);

impl CacheKey {
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        blake3::Hash::from_hex(hex)
            .map(|h| Self(*h.as_bytes()))
            .map_err(|e| Error::Cache(format!("invalid cache key '{}': {}", hex, e)))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({})", self.to_hex())
    }
}

/// Derives the canonical key of `node`.
pub fn key(node: &QueryNode) -> CacheKey {
    let mut hasher = blake3::Hasher::new();
    hasher.update(DOMAIN);
    write_node(&mut hasher, node);
    CacheKey(*hasher.finalize().as_bytes())
}

impl QueryNode {
    pub fn key(&self) -> CacheKey {
        key(self)
    }
}

fn write_node(hasher: &mut blake3::Hasher, node: &QueryNode) {
    match node {
        QueryNode::Term(t) => {
            hasher.update(b"T");
            write_str(hasher, &t.query_string);
            write_fields(hasher, &t.fields);
        }
        QueryNode::Proximity(p) => {
            hasher.update(b"P");
            write_str(hasher, &p.query_string);
            write_fields(hasher, &p.fields);
            hasher.update(&p.distance.to_le_bytes());
            hasher.update(&[u8::from(p.ordered)]);
        }
        QueryNode::Combinator(c) => {
            hasher.update(b"C");
            write_str(hasher, c.operator.as_str());
            write_len(hasher, c.children.len());
            for child in &c.children {
                hasher.update(key(child).as_bytes());
            }
        }
    }
}

fn write_fields(hasher: &mut blake3::Hasher, fields: &[String]) {
    write_len(hasher, fields.len());
    for field in fields {
        write_str(hasher, field);
    }
}

fn write_str(hasher: &mut blake3::Hasher, s: &str) {
    write_len(hasher, s.len());
    hasher.update(s.as_bytes());
}

fn write_len(hasher: &mut blake3::Hasher, len: usize) {
    hasher.update(&(len as u64).to_le_bytes());
}
