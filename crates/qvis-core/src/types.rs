//! Query tree and document types shared by the evaluator, caches and backends.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Error, Result};
use crate::fields::display_name;

/// Opaque identifier of a retrieved document. Kept as a string so that
/// backend identifiers round-trip exactly.
pub type DocumentId = String;

/// Set of document identifiers. Ordered, so iteration (and therefore every
/// label derived from it) is deterministic.
pub type DocumentSet = BTreeSet<DocumentId>;

/// Boolean operator of a [`Combinator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    And,
    Or,
    /// First child minus the union of the remaining children.
    Not,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Not => "NOT",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword or phrase leaf, optionally restricted to named fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    #[serde(rename = "query")]
    pub query_string: String,
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Leaf requiring its terms to occur within `distance` tokens of each other.
/// The backend evaluates the constraint as a unit, so it is never split.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Proximity {
    #[serde(rename = "query")]
    pub query_string: String,
    #[serde(default)]
    pub fields: Vec<String>,
    pub distance: i64,
    #[serde(default)]
    pub ordered: bool,
}

impl Proximity {
    /// Whitespace-separated terms of the query string.
    pub fn terms(&self) -> Vec<&str> {
        self.query_string.split_whitespace().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Combinator {
    pub operator: Operator,
    pub children: Vec<QueryNode>,
}

/// A parsed Boolean/proximity query. Immutable once built.
///
/// The JSON form is externally tagged:
/// `{"combinator": {"operator": "AND", "children": [{"term": {"query": "insulin"}}]}}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryNode {
    Term(Term),
    Proximity(Proximity),
    Combinator(Combinator),
}

impl QueryNode {
    pub fn term(query: impl Into<String>) -> Self {
        Self::term_in(query, Vec::<String>::new())
    }

    pub fn term_in<S: Into<String>>(query: impl Into<String>, fields: impl IntoIterator<Item = S>) -> Self {
        QueryNode::Term(Term {
            query_string: query.into(),
            fields: fields.into_iter().map(Into::into).collect(),
        })
    }

    pub fn proximity(query: impl Into<String>, distance: i64, ordered: bool) -> Self {
        QueryNode::Proximity(Proximity {
            query_string: query.into(),
            fields: Vec::new(),
            distance,
            ordered,
        })
    }

    pub fn combinator(operator: Operator, children: Vec<QueryNode>) -> Self {
        QueryNode::Combinator(Combinator { operator, children })
    }

    pub fn and(children: Vec<QueryNode>) -> Self {
        Self::combinator(Operator::And, children)
    }

    pub fn or(children: Vec<QueryNode>) -> Self {
        Self::combinator(Operator::Or, children)
    }

    pub fn not(children: Vec<QueryNode>) -> Self {
        Self::combinator(Operator::Not, children)
    }

    pub fn is_leaf(&self) -> bool {
        !matches!(self, QueryNode::Combinator(_))
    }

    pub fn children(&self) -> &[QueryNode] {
        match self {
            QueryNode::Combinator(c) => &c.children,
            _ => &[],
        }
    }

    /// Number of nodes in this tree, the root included.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(QueryNode::node_count).sum::<usize>()
    }

    /// Checks the whole tree for shapes that cannot be evaluated.
    ///
    /// Runs before any cache or backend access so a malformed tree has no
    /// side effects.
    pub fn validate(&self) -> Result<()> {
        match self {
            QueryNode::Term(t) => {
                if t.query_string.trim().is_empty() {
                    return Err(Error::Structural("term with an empty query string".into()));
                }
            }
            QueryNode::Proximity(p) => {
                if p.terms().len() < 2 {
                    return Err(Error::Structural(format!(
                        "proximity query '{}' needs at least two terms",
                        p.query_string
                    )));
                }
                if p.distance < 0 {
                    return Err(Error::Structural(format!(
                        "proximity query '{}' has negative distance {}",
                        p.query_string, p.distance
                    )));
                }
            }
            QueryNode::Combinator(c) => {
                if c.children.is_empty() {
                    return Err(Error::Structural(format!("{} combinator without children", c.operator)));
                }
                if c.operator == Operator::Not && c.children.len() < 2 {
                    return Err(Error::Structural(
                        "NOT needs a base child followed by at least one excluded child".into(),
                    ));
                }
                for child in &c.children {
                    child.validate()?;
                }
            }
        }
        Ok(())
    }

    /// Human-readable description used for graph titles and log lines.
    pub fn describe(&self) -> String {
        match self {
            QueryNode::Term(t) => format!("{}{}", t.query_string, field_suffix(&t.fields)),
            QueryNode::Proximity(p) => format!(
                "\"{}\"~{}{} ({})",
                p.query_string,
                p.distance,
                field_suffix(&p.fields),
                if p.ordered { "ordered" } else { "unordered" }
            ),
            QueryNode::Combinator(c) => c.operator.to_string(),
        }
    }
}

fn field_suffix(fields: &[String]) -> String {
    if fields.is_empty() {
        return String::new();
    }
    let mapped: Vec<&str> = fields.iter().map(|f| display_name(f)).collect();
    format!("[{}]", mapped.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_maps_known_fields_and_keeps_unknown_ones() {
        let node = QueryNode::term_in("diabetes", ["title_abstract", "custom"]);
        assert_eq!(node.describe(), "diabetes[Title/Abstract,custom]");
        assert_eq!(QueryNode::term("insulin").describe(), "insulin");
    }

    #[test]
    fn describe_proximity_mentions_order() {
        let node = QueryNode::proximity("heart attack", 3, true);
        assert_eq!(node.describe(), "\"heart attack\"~3 (ordered)");
    }

    #[test]
    fn node_count_includes_root() {
        let q = QueryNode::and(vec![QueryNode::term("a"), QueryNode::or(vec![QueryNode::term("b"), QueryNode::term("c")])]);
        assert_eq!(q.node_count(), 5);
    }
}
