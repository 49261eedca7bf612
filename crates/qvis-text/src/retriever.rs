use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::time::Instant;
use tantivy::collector::DocSetCollector;
use tantivy::query::{BooleanQuery, Occur, PhraseQuery, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Value};
use tantivy::tokenizer::TokenStream;
use tantivy::{Index, IndexReader, ReloadPolicy, TantivyDocument, Term as IndexTerm};
use tracing::{debug, warn};

use qvis_core::traits::RetrievalAdapter;
use qvis_core::types::{DocumentSet, Proximity, Term};

use crate::tantivy_utils::{register_tokenizer, DEFAULT_FIELDS, ID_FIELD};

/// Unordered proximity is expanded into one phrase per ordering of its terms.
pub const MAX_UNORDERED_TERMS: usize = 5;

const SLOW_RETRIEVAL_MS: u128 = 500;

/// Retrieval backend over a local tantivy index. Returns every matching
/// document, unranked.
pub struct TantivyRetriever {
	index: Index,
	reader: IndexReader,
	id_field: Field,
	default_fields: Vec<Field>,
}

impl TantivyRetriever {
	pub fn open(index_dir: PathBuf) -> Result<Self, anyhow::Error> {
		let index = Index::open_in_dir(&index_dir)?;
		register_tokenizer(&index);
		let reader = index.reader_builder().reload_policy(ReloadPolicy::Manual).try_into()?;
		let schema = index.schema();
		let id_field = schema.get_field(ID_FIELD)?;
		let default_fields = DEFAULT_FIELDS.iter().map(|name| schema.get_field(name)).collect::<tantivy::Result<Vec<_>>>()?;
		Ok(Self { index, reader, id_field, default_fields })
	}

	/// Picks up commits made since the retriever was opened.
	pub fn reload(&self) -> Result<()> {
		self.reader.reload()?;
		Ok(())
	}

	fn resolve_fields(&self, names: &[String]) -> Result<Vec<Field>> {
		if names.is_empty() { return Ok(self.default_fields.clone()); }
		let schema = self.index.schema();
		names.iter().map(|name| schema.get_field(name).map_err(|_| anyhow!("unknown field '{}'", name))).collect()
	}

	/// Runs the field's analyzer over `text`, keeping token positions so that
	/// removed stop words still count towards phrase distance.
	fn analyze(&self, field: Field, text: &str) -> Result<Vec<(usize, IndexTerm)>> {
		let mut analyzer = self.index.tokenizer_for_field(field)?;
		let mut stream = analyzer.token_stream(text);
		let mut terms = Vec::new();
		stream.process(&mut |token| terms.push((token.position, IndexTerm::from_field_text(field, &token.text))));
		Ok(terms)
	}

	fn collect(&self, clauses: Vec<Box<dyn Query>>) -> Result<DocumentSet> {
		if clauses.is_empty() { return Ok(DocumentSet::new()); }
		let query = BooleanQuery::new(clauses.into_iter().map(|q| (Occur::Should, q)).collect());
		let searcher = self.reader.searcher();
		let addresses = searcher.search(&query, &DocSetCollector)?;
		let mut ids = DocumentSet::new();
		for address in addresses {
			let doc: TantivyDocument = searcher.doc(address)?;
			let id = doc.get_first(self.id_field).and_then(|v| v.as_str()).ok_or_else(|| anyhow!("document {:?} has no id", address))?;
			ids.insert(id.to_string());
		}
		Ok(ids)
	}
}

impl RetrievalAdapter for TantivyRetriever {
	fn retrieve_term(&self, term: &Term) -> anyhow::Result<DocumentSet> {
		let start = Instant::now();
		let mut clauses = Vec::new();
		for field in self.resolve_fields(&term.fields)? {
			if let Some(q) = phrase_or_term(self.analyze(field, &term.query_string)?, 0) { clauses.push(q); }
		}
		let ids = self.collect(clauses)?;
		log_timing(&term.query_string, ids.len(), start);
		Ok(ids)
	}

	fn retrieve_proximity(&self, proximity: &Proximity) -> anyhow::Result<DocumentSet> {
		let start = Instant::now();
		let slop = u32::try_from(proximity.distance).map_err(|_| anyhow!("distance {} out of range", proximity.distance))?;
		let mut clauses = Vec::new();
		for field in self.resolve_fields(&proximity.fields)? {
			let terms = self.analyze(field, &proximity.query_string)?;
			if proximity.ordered || terms.len() < 2 {
				if let Some(q) = phrase_or_term(terms, slop) { clauses.push(q); }
				continue;
			}
			if terms.len() > MAX_UNORDERED_TERMS {
				return Err(anyhow!("unordered proximity supports at most {} terms, got {}", MAX_UNORDERED_TERMS, terms.len()));
			}
			// Every ordering keeps the gaps left by removed stop words.
			let first = terms[0].0;
			let offsets: Vec<usize> = terms.iter().map(|(pos, _)| pos - first).collect();
			for order in permutations(terms.len()) {
				let phrase = order.iter().zip(&offsets).map(|(&i, &offset)| (offset, terms[i].1.clone())).collect();
				if let Some(q) = phrase_or_term(phrase, slop) { clauses.push(q); }
			}
		}
		let ids = self.collect(clauses)?;
		log_timing(&proximity.query_string, ids.len(), start);
		Ok(ids)
	}
}

/// One token becomes a term query, several a phrase query with `slop`.
/// Nothing is returned when every token was a stop word.
fn phrase_or_term(mut terms: Vec<(usize, IndexTerm)>, slop: u32) -> Option<Box<dyn Query>> {
	match terms.len() {
		0 => None,
		1 => terms.pop().map(|(_, t)| Box::new(TermQuery::new(t, IndexRecordOption::Basic)) as Box<dyn Query>),
		_ => {
			let first = terms[0].0;
			let mut phrase = PhraseQuery::new_with_offset(terms.into_iter().map(|(pos, t)| (pos - first, t)).collect());
			phrase.set_slop(slop);
			Some(Box::new(phrase))
		}
	}
}

fn permutations(n: usize) -> Vec<Vec<usize>> {
	fn extend(prefix: &mut Vec<usize>, used: &mut [bool], out: &mut Vec<Vec<usize>>) {
		if prefix.len() == used.len() { out.push(prefix.clone()); return; }
		for i in 0..used.len() {
			if used[i] { continue; }
			used[i] = true; prefix.push(i);
			extend(prefix, used, out);
			prefix.pop(); used[i] = false;
		}
	}
	let mut out = Vec::new();
	extend(&mut Vec::with_capacity(n), &mut vec![false; n], &mut out);
	out
}

fn log_timing(query: &str, hits: usize, start: Instant) {
	let elapsed = start.elapsed().as_millis();
	if elapsed > SLOW_RETRIEVAL_MS { warn!(query, hits, elapsed_ms = elapsed as u64, "slow retrieval"); }
	else { debug!(query, hits, elapsed_ms = elapsed as u64, "retrieved"); }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn permutations_cover_every_ordering_once() {
		let p = permutations(3);
		assert_eq!(p.len(), 6);
		let unique: std::collections::HashSet<_> = p.iter().cloned().collect();
		assert_eq!(unique.len(), 6);
		assert_eq!(p[0], vec![0, 1, 2]);
	}
}
