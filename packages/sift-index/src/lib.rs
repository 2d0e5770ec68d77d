mod error;

pub mod lexical;
pub mod meta;
pub mod vector;

pub use error::{Error, Result};
pub use lexical::Bm25Index;
pub use meta::{ChunkMeta, MetadataStore};
pub use vector::FlatIndex;

/// File names expected inside the configured indices directory.
pub const META_FILE: &str = "meta.json";
pub const VECTORS_FILE: &str = "vectors.json";
pub const LEXICAL_FILE: &str = "bm25.json";
