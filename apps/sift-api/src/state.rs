use std::sync::Arc;

use color_eyre::eyre;

use sift_index::{Bm25Index, FlatIndex, LEXICAL_FILE, META_FILE, MetadataStore, VECTORS_FILE};
use sift_service::SiftService;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<SiftService>,
}
impl AppState {
	/// Loads the on-disk index artifacts and assembles the shared service.
	/// A dense index of the wrong width is a startup error; a missing or
	/// unreadable retrieval artifact only disables that signal.
	pub fn new(config: sift_config::Config) -> color_eyre::Result<Self> {
		let dir = &config.indices.dir;
		let meta = MetadataStore::load(&dir.join(META_FILE))?;
		let vectors_path = dir.join(VECTORS_FILE);
		let dense = if vectors_path.exists() {
			let index = FlatIndex::load(&vectors_path)?;

			if index.dim() != config.providers.embedding.dimensions as usize {
				return Err(eyre::eyre!(
					"Vector index dimension {} does not match the embedding provider's {}.",
					index.dim(),
					config.providers.embedding.dimensions
				));
			}
			if index.len() != meta.len() {
				tracing::warn!(
					rows = index.len(),
					entries = meta.len(),
					"Vector index and metadata table disagree on row count.",
				);
			}

			Some(index)
		} else {
			tracing::warn!(?vectors_path, "No vector index found; dense retrieval is disabled.");

			None
		};
		let lexical_path = dir.join(LEXICAL_FILE);
		let lexical = if lexical_path.exists() {
			match Bm25Index::load(&lexical_path) {
				Ok(index) => Some(index),
				Err(err) => {
					tracing::warn!(
						"Failed to load the lexical index; sparse retrieval is disabled: {err}"
					);

					None
				},
			}
		} else {
			tracing::warn!(?lexical_path, "No lexical index found; sparse retrieval is disabled.");

			None
		};
		let service = SiftService::new(config, meta, dense, lexical);

		Ok(Self { service: Arc::new(service) })
	}
}
