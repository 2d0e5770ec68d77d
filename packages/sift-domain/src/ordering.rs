use std::cmp::Ordering;

/// Descending comparison for f32 scores. NaN sorts last so a poisoned score
/// can never float to the top of a ranking.
pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn sorts_descending_with_nan_last() {
		let mut scores = vec![0.2_f32, f32::NAN, 0.9, 0.5];

		scores.sort_by(|a, b| cmp_f32_desc(*a, *b));

		assert_eq!(scores[0], 0.9);
		assert_eq!(scores[1], 0.5);
		assert_eq!(scores[2], 0.2);
		assert!(scores[3].is_nan());
	}
}
