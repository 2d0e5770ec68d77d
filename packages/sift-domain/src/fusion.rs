use std::collections::HashMap;

use crate::{
	candidate::{Candidate, CandidateKey},
	ordering::cmp_f32_desc,
};

pub const DEFAULT_RRF_K: u32 = 60;

/// Accumulator for one candidate key while both rankings are being walked.
/// The first sighting of a key donates the stored representative.
struct FusionEntry {
	candidate: Candidate,
	weight: f32,
}

/// Reciprocal-rank fusion of the dense and sparse rankings.
///
/// Each input is re-sorted by its own score descending first; callers are not
/// trusted to pre-sort. Walking a list at rank `r` (1-based) adds
/// `1 / (k_const + r)` to that candidate's accumulated weight. RRF is
/// scale-free, so the unrelated numeric ranges of similarity and BM25 scores
/// never need calibration against each other.
///
/// Entries are kept in first-seen order and the final sort is stable, so equal
/// weights resolve toward the dense ranking (dense is accumulated first).
pub fn fuse(
	dense: Vec<Candidate>,
	sparse: Vec<Candidate>,
	top_k: usize,
	k_const: u32,
) -> Vec<Candidate> {
	let mut dense = dense;
	let mut sparse = sparse;

	dense.sort_by(|a, b| cmp_f32_desc(a.dense_score.unwrap_or(0.0), b.dense_score.unwrap_or(0.0)));
	sparse.sort_by(|a, b| {
		cmp_f32_desc(a.lexical_score.unwrap_or(0.0), b.lexical_score.unwrap_or(0.0))
	});

	let mut entries: Vec<FusionEntry> = Vec::with_capacity(dense.len() + sparse.len());
	let mut by_key: HashMap<CandidateKey, usize> = HashMap::new();

	accumulate(&mut entries, &mut by_key, dense, k_const);
	accumulate(&mut entries, &mut by_key, sparse, k_const);

	entries.sort_by(|a, b| cmp_f32_desc(a.weight, b.weight));

	entries
		.into_iter()
		.take(top_k)
		.map(|entry| {
			let mut candidate = entry.candidate;

			candidate.fusion_score = Some(entry.weight);

			candidate
		})
		.collect()
}

fn accumulate(
	entries: &mut Vec<FusionEntry>,
	by_key: &mut HashMap<CandidateKey, usize>,
	ranked: Vec<Candidate>,
	k_const: u32,
) {
	for (idx, candidate) in ranked.into_iter().enumerate() {
		let rank = idx as u32 + 1;
		let weight = 1.0 / (k_const + rank) as f32;

		match by_key.get(&candidate.key()) {
			Some(&slot) => {
				let entry = &mut entries[slot];

				entry.weight += weight;
				// Carry scores from the other retriever onto the merged
				// representative so attribution keeps both signals.
				if entry.candidate.dense_score.is_none() {
					entry.candidate.dense_score = candidate.dense_score;
				}
				if entry.candidate.lexical_score.is_none() {
					entry.candidate.lexical_score = candidate.lexical_score;
				}
			},
			None => {
				by_key.insert(candidate.key(), entries.len());
				entries.push(FusionEntry { candidate, weight });
			},
		}
	}
}
