use crate::candidate::Candidate;

/// Packs ranked chunks into one numbered context block under a hard character
/// budget. Blocks are emitted in rank order and the walk stops at the first
/// block that would push the emitted length (separators included) past
/// `max_chars`; no partial blocks, no reordering to fit more.
pub fn build_context(chunks: &[Candidate], max_chars: usize) -> String {
	let mut out = String::new();
	let mut emitted = 0_usize;

	for (idx, chunk) in chunks.iter().enumerate() {
		let title = if chunk.title.is_empty() { "no-title" } else { chunk.title.as_str() };
		let doc_id = if chunk.doc_id.is_empty() { "?" } else { chunk.doc_id.as_str() };
		let block = format!("{}) {title} (id={doc_id}):\n{}\n", idx + 1, chunk.text.trim());
		let separator = usize::from(!out.is_empty());
		let block_chars = block.chars().count();

		if emitted + separator + block_chars > max_chars {
			break;
		}
		if separator == 1 {
			out.push('\n');
		}

		out.push_str(&block);

		emitted += separator + block_chars;
	}

	out
}
