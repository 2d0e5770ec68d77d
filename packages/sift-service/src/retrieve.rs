use sift_domain::Candidate;
use sift_domain::ordering::cmp_f32_desc;
use sift_index::{ChunkMeta, lexical};

use crate::SiftService;

impl SiftService {
	/// Dense retrieval: embed the query and search the vector index, best
	/// first. Dense is an optional signal; a missing index, an embedding
	/// failure, or an empty metadata table all yield an empty list, never an
	/// error. Index positions with no metadata entry are silently dropped.
	pub async fn retrieve_dense(&self, query: &str, top_k: usize) -> Vec<Candidate> {
		let Some(index) = self.dense.as_ref() else {
			return Vec::new();
		};

		if self.meta.is_empty() {
			return Vec::new();
		}

		let texts = [query.to_string()];
		let vectors =
			match self.providers.embedding.embed(&self.cfg.providers.embedding, &texts).await {
				Ok(vectors) => vectors,
				Err(err) => {
					tracing::warn!("Query embedding failed: {err}");

					return Vec::new();
				},
			};
		let Some(vector) = vectors.first() else {
			tracing::warn!("Embedding provider returned no vectors for the query.");

			return Vec::new();
		};

		index
			.search(vector, top_k)
			.into_iter()
			.filter_map(|(position, score)| {
				self.meta.get(position).map(|meta| {
					let mut candidate = candidate_from_meta(meta);

					candidate.dense_score = Some(score);

					candidate
				})
			})
			.collect()
	}

	/// Sparse retrieval: BM25 over whitespace-split query tokens, best first.
	/// Over-fetches to `max(2 * top_k, top_k)` so fusion has breadth to work
	/// with. Any failure degrades to an empty list; sparse retrieval failing
	/// must never fail the request.
	pub fn retrieve_sparse(&self, query: &str, top_k: usize) -> Vec<Candidate> {
		let Some(index) = self.lexical.as_ref() else {
			return Vec::new();
		};

		if self.meta.is_empty() {
			return Vec::new();
		}

		let tokens = lexical::tokenize(query);
		let scores = index.score_all(&tokens);

		if scores.len() != self.meta.len() {
			tracing::warn!(
				scored = scores.len(),
				meta = self.meta.len(),
				"Lexical index is out of sync with the metadata table; skipping sparse retrieval.",
			);

			return Vec::new();
		}

		let mut ranked: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();

		ranked.sort_by(|a, b| cmp_f32_desc(a.1, b.1));
		ranked.truncate((top_k * 2).max(top_k));

		ranked
			.into_iter()
			.filter_map(|(position, score)| {
				self.meta.get(position).map(|meta| {
					let mut candidate = candidate_from_meta(meta);

					candidate.lexical_score = Some(score);

					candidate
				})
			})
			.collect()
	}
}

fn candidate_from_meta(meta: &ChunkMeta) -> Candidate {
	Candidate {
		doc_id: meta.doc_id.clone(),
		chunk_id: meta.chunk_id,
		title: meta.title.clone(),
		path: meta.path.clone(),
		text: meta.text.clone(),
		..Default::default()
	}
}
