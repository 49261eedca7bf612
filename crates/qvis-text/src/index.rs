use anyhow::Result;
use std::path::{Path, PathBuf};
use tantivy::{doc, Index};
use tracing::{debug, info};

use crate::tantivy_utils::{build_schema, register_tokenizer, ID_FIELD, PATH_FIELD, TEXT_FIELD, TITLE_FIELD};

/// One document as handed to the indexer.
#[derive(Debug, Clone)]
pub struct SourceDocument {
	pub id: String,
	pub title: String,
	pub text: String,
	pub path: String,
}

pub struct TantivyIndexer {
	index: Index,
	id_field: tantivy::schema::Field,
	path_field: tantivy::schema::Field,
	title_field: tantivy::schema::Field,
	text_field: tantivy::schema::Field,
}

impl TantivyIndexer {
	/// Creates a fresh index in `index_dir`, replacing whatever was there.
	pub fn new(index_dir: PathBuf) -> Result<Self, anyhow::Error> {
		let schema = build_schema();
		if index_dir.exists() { std::fs::remove_dir_all(&index_dir)?; }
		std::fs::create_dir_all(&index_dir)?;
		let index = Index::create_in_dir(&index_dir, schema.clone())?;
		register_tokenizer(&index);
		let id_field = schema.get_field(ID_FIELD)?;
		let path_field = schema.get_field(PATH_FIELD)?;
		let title_field = schema.get_field(TITLE_FIELD)?;
		let text_field = schema.get_field(TEXT_FIELD)?;
		Ok(Self { index, id_field, path_field, title_field, text_field })
	}

	/// Indexes every `.txt` file under `data_dir`. The document id is the path
	/// relative to `data_dir`; the title is the first non-empty line.
	pub fn index_files(&self, data_dir: &Path) -> Result<usize, anyhow::Error> {
		let mut documents = Vec::new();
		for entry in walkdir::WalkDir::new(data_dir).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
			if entry.file_type().is_file() && entry.path().extension().is_some_and(|ext| ext == "txt") {
				let file_path = entry.path();
				let relative_path = file_path.strip_prefix(data_dir).unwrap_or(file_path);
				match std::fs::read_to_string(file_path) {
					Ok(content) => documents.push(SourceDocument {
						id: relative_path.to_string_lossy().replace('\\', "/"),
						title: Self::title_of(&content),
						text: content,
						path: file_path.to_string_lossy().to_string(),
					}),
					Err(e) => debug!(path = %file_path.display(), error = %e, "skipping unreadable file"),
				}
			}
		}
		self.index_documents(&documents)
	}

	pub fn index_documents(&self, documents: &[SourceDocument]) -> Result<usize, anyhow::Error> {
		let mut index_writer = self.index.writer(50_000_000)?;
		for d in documents {
			let doc = doc!(
				self.id_field => d.id.clone(),
				self.path_field => d.path.clone(),
				self.title_field => d.title.clone(),
				self.text_field => d.text.clone(),
			);
			index_writer.add_document(doc)?;
		}
		index_writer.commit()?;
		info!(documents = documents.len(), "index committed");
		Ok(documents.len())
	}

	fn title_of(content: &str) -> String {
		content.lines().map(str::trim).find(|line| !line.is_empty()).unwrap_or_default().to_string()
	}
}
