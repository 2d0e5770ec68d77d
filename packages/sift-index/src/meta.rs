use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One row of the corpus metadata table. The row's position in the table is
/// the id the vector and lexical indices refer back to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMeta {
	pub doc_id: String,
	#[serde(default)]
	pub title: String,
	#[serde(default)]
	pub path: String,
	pub chunk_id: i64,
	#[serde(default)]
	pub text: String,
}

/// Position-indexed chunk metadata, loaded once at startup and read-only
/// thereafter.
#[derive(Debug, Default)]
pub struct MetadataStore {
	entries: Vec<ChunkMeta>,
}
impl MetadataStore {
	/// Loads `meta.json`. A missing file yields an empty table (the corpus is
	/// simply not there yet); a present-but-unparseable file is a startup
	/// error.
	pub fn load(path: &Path) -> Result<Self> {
		if !path.exists() {
			tracing::warn!(?path, "No metadata table found; corpus is empty.");

			return Ok(Self::default());
		}

		let raw = fs::read_to_string(path)
			.map_err(|err| Error::ReadFile { path: path.to_path_buf(), source: err })?;
		let entries: Vec<ChunkMeta> = serde_json::from_str(&raw)
			.map_err(|err| Error::ParseFile { path: path.to_path_buf(), source: err })?;

		tracing::info!(entries = entries.len(), "Loaded metadata table.");

		Ok(Self { entries })
	}

	pub fn from_entries(entries: Vec<ChunkMeta>) -> Self {
		Self { entries }
	}

	/// Out-of-range positions are "no such entry," never an error; index and
	/// metadata drifting out of sync must not crash a request.
	pub fn get(&self, position: usize) -> Option<&ChunkMeta> {
		self.entries.get(position)
	}

	pub fn texts(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|entry| entry.text.as_str())
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}
}
