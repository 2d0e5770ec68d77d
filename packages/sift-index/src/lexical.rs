use std::{collections::HashMap, fs, path::Path};

use serde::Deserialize;

use crate::{Error, Result};

// Okapi BM25 parameters.
const K1: f32 = 1.2;
const B: f32 = 0.75;

#[derive(Debug, Deserialize)]
struct LexicalFile {
	docs: Vec<Vec<String>>,
}

#[derive(Debug)]
struct DocStats {
	term_freq: HashMap<String, u32>,
	len: u32,
}

/// BM25 lexical index over the tokenized corpus. Documents are
/// position-aligned with the metadata table; statistics are computed once at
/// load and read-only thereafter.
#[derive(Debug)]
pub struct Bm25Index {
	docs: Vec<DocStats>,
	doc_freq: HashMap<String, u32>,
	avgdl: f32,
}
impl Bm25Index {
	pub fn load(path: &Path) -> Result<Self> {
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::ReadFile { path: path.to_path_buf(), source: err })?;
		let file: LexicalFile = serde_json::from_str(&raw)
			.map_err(|err| Error::ParseFile { path: path.to_path_buf(), source: err })?;

		let index = Self::from_docs(file.docs);

		tracing::info!(docs = index.len(), "Loaded lexical index.");

		Ok(index)
	}

	pub fn from_docs(tokenized: Vec<Vec<String>>) -> Self {
		let mut docs = Vec::with_capacity(tokenized.len());
		let mut doc_freq: HashMap<String, u32> = HashMap::new();
		let mut total_len = 0_u64;

		for tokens in tokenized {
			let mut term_freq: HashMap<String, u32> = HashMap::new();

			for token in &tokens {
				*term_freq.entry(token.clone()).or_insert(0) += 1;
			}
			for term in term_freq.keys() {
				*doc_freq.entry(term.clone()).or_insert(0) += 1;
			}

			total_len += tokens.len() as u64;

			docs.push(DocStats { term_freq, len: tokens.len() as u32 });
		}

		let avgdl =
			if docs.is_empty() { 0.0 } else { total_len as f32 / docs.len() as f32 };

		Self { docs, doc_freq, avgdl }
	}

	pub fn len(&self) -> usize {
		self.docs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.docs.is_empty()
	}

	/// Okapi BM25 score of every document against the query tokens, one score
	/// per corpus position.
	pub fn score_all(&self, query_tokens: &[String]) -> Vec<f32> {
		let mut scores = vec![0.0_f32; self.docs.len()];

		if self.avgdl <= 0.0 {
			return scores;
		}

		for token in query_tokens {
			let Some(&df) = self.doc_freq.get(token) else {
				continue;
			};
			let idf = idf(self.docs.len() as f32, df);

			for (position, doc) in self.docs.iter().enumerate() {
				let Some(&tf) = doc.term_freq.get(token) else {
					continue;
				};
				let tf = tf as f32;
				let norm = 1.0 - B + B * (doc.len as f32 / self.avgdl);

				scores[position] += idf * (tf * (K1 + 1.0)) / (tf + K1 * norm);
			}
		}

		scores
	}
}

/// Whitespace-split tokenization. A deliberate placeholder policy: the fusion
/// contract upstream does not depend on it, so a language-appropriate
/// tokenizer can replace it without touching the ranking math.
pub fn tokenize(query: &str) -> Vec<String> {
	query.split_whitespace().map(str::to_string).collect()
}

/// Standard BM25 IDF, `ln(1 + (N - df + 0.5) / (df + 0.5))`, floored at zero.
fn idf(total_docs: f32, doc_freq: u32) -> f32 {
	let df = doc_freq as f32;
	let ratio = (total_docs - df + 0.5) / (df + 0.5);

	(1.0 + ratio.max(0.0)).ln()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn docs(raw: &[&str]) -> Vec<Vec<String>> {
		raw.iter().map(|doc| tokenize(doc)).collect()
	}

	#[test]
	fn scores_every_corpus_position() {
		let index = Bm25Index::from_docs(docs(&["alpha beta", "beta gamma", "gamma delta"]));
		let scores = index.score_all(&tokenize("beta"));

		assert_eq!(scores.len(), 3);
		assert!(scores[0] > 0.0);
		assert!(scores[1] > 0.0);
		assert_eq!(scores[2], 0.0);
	}

	#[test]
	fn rarer_terms_score_higher() {
		let index =
			Bm25Index::from_docs(docs(&["alpha common", "beta common", "gamma common"]));
		let rare = index.score_all(&tokenize("alpha"));
		let common = index.score_all(&tokenize("common"));

		assert!(rare[0] > common[0]);
	}

	#[test]
	fn unknown_terms_score_zero() {
		let index = Bm25Index::from_docs(docs(&["alpha beta"]));
		let scores = index.score_all(&tokenize("omega"));

		assert_eq!(scores, vec![0.0]);
	}

	#[test]
	fn empty_corpus_scores_nothing() {
		let index = Bm25Index::from_docs(Vec::new());

		assert!(index.score_all(&tokenize("alpha")).is_empty());
	}

	#[test]
	fn tokenize_splits_on_whitespace() {
		assert_eq!(tokenize("  alpha\tbeta\ngamma "), vec!["alpha", "beta", "gamma"]);
	}
}
