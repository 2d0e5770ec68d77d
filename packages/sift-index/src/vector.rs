use std::{fs, path::Path};

use serde::Deserialize;

use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct VectorFile {
	dim: usize,
	vectors: Vec<Vec<f32>>,
}

/// Brute-force flat vector index. Rows are position-aligned with the metadata
/// table and normalized at build time, so inner product is cosine similarity.
#[derive(Debug)]
pub struct FlatIndex {
	dim: usize,
	vectors: Vec<Vec<f32>>,
}
impl FlatIndex {
	pub fn load(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::ReadFile { path: path.to_path_buf(), source: err })?;
		let file: VectorFile = serde_json::from_str(&raw)
			.map_err(|err| Error::ParseFile { path: path.to_path_buf(), source: err })?;

		let index = Self::from_vectors(file.dim, file.vectors)?;

		tracing::info!(rows = index.len(), dim = index.dim(), "Loaded vector index.");

		Ok(index)
	}

	pub fn from_vectors(dim: usize, vectors: Vec<Vec<f32>>) -> Result<Self> {
		if dim == 0 {
			return Err(Error::Malformed {
				message: "Vector index dimension must be greater than zero.".to_string(),
			});
		}
		if let Some(row) = vectors.iter().position(|vector| vector.len() != dim) {
			return Err(Error::Malformed {
				message: format!("Vector index row {row} does not match dimension {dim}."),
			});
		}

		Ok(Self { dim, vectors })
	}

	pub fn dim(&self) -> usize {
		self.dim
	}

	pub fn len(&self) -> usize {
		self.vectors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.vectors.is_empty()
	}

	/// Returns up to `top_k` `(position, similarity)` pairs, best first. A
	/// query of the wrong width scores nothing rather than panicking.
	pub fn search(&self, query: &[f32], top_k: usize) -> Vec<(usize, f32)> {
		if query.len() != self.dim || top_k == 0 {
			return Vec::new();
		}

		let mut scored: Vec<(usize, f32)> = self
			.vectors
			.iter()
			.enumerate()
			.map(|(position, vector)| (position, dot(query, vector)))
			.collect();

		scored.sort_by(|a, b| cmp_desc(a.1, b.1));
		scored.truncate(top_k);

		scored
	}
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
	a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn cmp_desc(a: f32, b: f32) -> std::cmp::Ordering {
	b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
}
