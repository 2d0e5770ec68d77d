use serde::{Deserialize, Serialize};
use serde_json::Value;

use sift_domain::{Candidate, context::build_context, fusion, ordering::cmp_f32_desc};
use sift_providers::generation::{self, Dispatch, GenerationRequest};

use crate::{Error, Result, SiftService};

const SYSTEM_RAG: &str = "You are a domain-specific assistant. Answer using only the provided \
context. If the context is insufficient or you are uncertain, state that the evidence is \
insufficient. End every answer with the titles and document ids of the sources you cited.";

#[derive(Debug, Clone, Deserialize)]
pub struct AnswerRequest {
	pub query: String,
	pub top_k: Option<u32>,
	pub stream: Option<bool>,
}

/// One entry of the caller-facing source attribution list, in final rank
/// order. Scores a candidate never earned stay absent rather than zero.
#[derive(Debug, Clone, Serialize)]
pub struct SourceAttribution {
	pub doc_id: String,
	pub title: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub score: Option<f32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub bm25_score: Option<f32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rerank_score: Option<f32>,
	pub chunk_id: i64,
}
impl From<&Candidate> for SourceAttribution {
	fn from(candidate: &Candidate) -> Self {
		Self {
			doc_id: candidate.doc_id.clone(),
			title: candidate.title.clone(),
			score: candidate.dense_score,
			bm25_score: candidate.lexical_score,
			rerank_score: candidate.rerank_score,
			chunk_id: candidate.chunk_id,
		}
	}
}

#[derive(Debug)]
pub enum AnswerOutcome {
	/// Relay the downstream byte stream untouched.
	Stream(reqwest::Response),
	/// Downstream answer wrapped with the final ranking's attribution.
	Completed { answer: Value, sources: Vec<SourceAttribution> },
}

impl SiftService {
	/// The augmented query pipeline: retrieve both signals concurrently, fuse,
	/// rerank, pack the context, and dispatch to the generation backend.
	/// Every stage before dispatch degrades to empty results instead of
	/// failing; only dispatch errors surface to the caller.
	pub async fn answer(&self, request: AnswerRequest) -> Result<AnswerOutcome> {
		if request.top_k == Some(0) {
			return Err(Error::InvalidRequest {
				message: "top_k must be greater than zero.".to_string(),
			});
		}

		let top_k = request.top_k.unwrap_or(self.cfg.retrieval.top_k) as usize;
		let fetch_k = (top_k * 2).max(top_k);
		let (dense, sparse) = tokio::join!(
			self.retrieve_dense(&request.query, fetch_k),
			async { self.retrieve_sparse(&request.query, top_k) },
		);

		tracing::debug!(dense = dense.len(), sparse = sparse.len(), "Retrieved candidates.");

		let fused = fusion::fuse(dense, sparse, top_k, self.cfg.retrieval.rrf_k);
		let hits = self.rerank_candidates(&request.query, fused, top_k).await;
		let context =
			build_context(&hits, self.cfg.retrieval.max_context_chars as usize);
		let generation = GenerationRequest {
			model: self.cfg.generation.model.clone(),
			messages: rag_messages(&request.query, &context),
			temperature: self.cfg.generation.temperature,
			stream: request.stream.unwrap_or(true),
		};

		match generation::dispatch(&self.cfg.generation, &generation).await? {
			Dispatch::Stream(upstream) => Ok(AnswerOutcome::Stream(upstream)),
			Dispatch::Completed { body, .. } => Ok(AnswerOutcome::Completed {
				answer: body,
				sources: hits.iter().map(SourceAttribution::from).collect(),
			}),
		}
	}

	/// Cross-encoder reranking of the fused candidates. Disabled, empty, or
	/// failing reranks all collapse to the identity truncation; when scores do
	/// arrive they fully replace the fusion ordering.
	pub async fn rerank_candidates(
		&self,
		query: &str,
		mut candidates: Vec<Candidate>,
		top_k: usize,
	) -> Vec<Candidate> {
		if !self.cfg.retrieval.use_reranker || candidates.is_empty() {
			candidates.truncate(top_k);

			return candidates;
		}

		let docs: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
		let scores = match self
			.providers
			.rerank
			.rerank(&self.cfg.providers.rerank, query, &docs)
			.await
		{
			Ok(scores) if scores.len() == candidates.len() => scores,
			Ok(scores) => {
				tracing::warn!(
					scored = scores.len(),
					candidates = candidates.len(),
					"Rerank provider returned a misaligned score list; keeping fusion order.",
				);
				candidates.truncate(top_k);

				return candidates;
			},
			Err(err) => {
				tracing::warn!("Rerank failed: {err}");
				candidates.truncate(top_k);

				return candidates;
			},
		};

		for (candidate, score) in candidates.iter_mut().zip(scores) {
			candidate.rerank_score = Some(score);
		}

		candidates.sort_by(|a, b| {
			cmp_f32_desc(a.rerank_score.unwrap_or(0.0), b.rerank_score.unwrap_or(0.0))
		});
		candidates.truncate(top_k);

		candidates
	}
}

fn rag_messages(query: &str, context: &str) -> Vec<Value> {
	let user = format!(
		"Question: {query}\n\n[Context]\n{context}\n\nRequirements:\n1) Summarize the key \
points, 2) quote the supporting evidence, 3) give the final answer.\n4) Do not reason beyond \
the context; state explicitly when the evidence is insufficient."
	);

	vec![
		serde_json::json!({ "role": "system", "content": SYSTEM_RAG }),
		serde_json::json!({ "role": "user", "content": user }),
	]
}
