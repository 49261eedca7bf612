use tantivy::schema::{Schema, TextFieldIndexing, TextOptions, IndexRecordOption, STRING, STORED};
use tantivy::tokenizer::{TextAnalyzer, SimpleTokenizer, LowerCaser, StopWordFilter};
use tantivy::Index;

pub const ID_FIELD: &str = "id";
pub const PATH_FIELD: &str = "doc_path";
pub const TITLE_FIELD: &str = "title";
pub const TEXT_FIELD: &str = "text";

/// Fields searched when a query names none.
pub const DEFAULT_FIELDS: [&str; 2] = [TITLE_FIELD, TEXT_FIELD];

const ANALYZER: &str = "qvis_text";

pub fn build_schema() -> Schema {
	let mut schema_builder = Schema::builder();
	let _id_field = schema_builder.add_text_field(ID_FIELD, STRING | STORED);
	let _doc_path_field = schema_builder.add_text_field(PATH_FIELD, STRING | STORED);
	// Proximity queries need positions on every tokenized field.
	let text_field_indexing = TextFieldIndexing::default().set_tokenizer(ANALYZER).set_index_option(IndexRecordOption::WithFreqsAndPositions);
	let text_options = TextOptions::default().set_indexing_options(text_field_indexing);
	let _title_field = schema_builder.add_text_field(TITLE_FIELD, text_options.clone().set_stored());
	let _text_field = schema_builder.add_text_field(TEXT_FIELD, text_options);
	schema_builder.build()
}

pub fn register_tokenizer(index: &Index) {
	let stop_words = vec![
		"a","an","and","are","as","at","be","by","for","from","has","he","in","is","it","its","of","on","that","the","to","was","will","with","or","but","not","this","these","they","them","their","there","then","than","so","if","when","where","why","how","what","which","who","whom","whose","can","could","should","would","may","might","must","shall","do","does","did","have","had","having",
	];
	let tokenizer = TextAnalyzer::builder(SimpleTokenizer::default())
		.filter(LowerCaser)
		.filter(StopWordFilter::remove(stop_words.into_iter().map(|s| s.to_string())))
		.build();
	index.tokenizers().register(ANALYZER, tokenizer);
}
