use serde::{Deserialize, Serialize};

/// One retrieved unit of evidence, enriched as it moves through the pipeline.
///
/// `(doc_id, chunk_id)` is the candidate's identity across every stage; the
/// same key coming out of both retrievers must merge into a single candidate.
/// Score fields are `None` until the corresponding stage has run, and an
/// absent score is not the same thing as a score of zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
	pub doc_id: String,
	pub chunk_id: i64,
	pub title: String,
	pub path: String,
	pub text: String,
	pub dense_score: Option<f32>,
	pub lexical_score: Option<f32>,
	pub fusion_score: Option<f32>,
	pub rerank_score: Option<f32>,
}
impl Candidate {
	pub fn key(&self) -> CandidateKey {
		CandidateKey { doc_id: self.doc_id.clone(), chunk_id: self.chunk_id }
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CandidateKey {
	pub doc_id: String,
	pub chunk_id: i64,
}
