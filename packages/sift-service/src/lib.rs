pub mod answer;
pub mod chat;
pub mod retrieve;

use std::{future::Future, pin::Pin, sync::Arc};

use serde_json::Value;

pub use answer::{AnswerOutcome, AnswerRequest, SourceAttribution};
pub use chat::{ChatOutcome, ChatRequest};

use sift_config::{Config, EmbeddingProviderConfig, ProviderConfig};
use sift_index::{Bm25Index, FlatIndex, MetadataStore};
use sift_providers::{embedding, generation::DispatchError, rerank};

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	/// Downstream generation failure, preserved status and body/text. Never
	/// retried here.
	#[error("Generation backend returned {status}.")]
	Upstream { status: u16, detail: Value },
	#[error("Generation request failed: {message}")]
	Network { message: String },
}
impl From<DispatchError> for Error {
	fn from(err: DispatchError) -> Self {
		match err {
			DispatchError::Transport { source } => Self::Network { message: source.to_string() },
			DispatchError::UpstreamStatus { status, detail } => Self::Upstream { status, detail },
			DispatchError::UpstreamBody { status, detail } => {
				Self::Upstream { status, detail: Value::String(detail) }
			},
			DispatchError::Headers { message } => Self::Network { message },
		}
	}
}

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>>;
}

pub trait RerankProvider
where
	Self: Send + Sync,
{
	fn rerank<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub rerank: Arc<dyn RerankProvider>,
}
impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>, rerank: Arc<dyn RerankProvider>) -> Self {
		Self { embedding, rerank }
	}
}
impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);
		Self { embedding: provider.clone(), rerank: provider }
	}
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl RerankProvider for DefaultProviders {
	fn rerank<'a>(
		&'a self,
		cfg: &'a ProviderConfig,
		query: &'a str,
		docs: &'a [String],
	) -> BoxFuture<'a, color_eyre::Result<Vec<f32>>> {
		Box::pin(rerank::rerank(cfg, query, docs))
	}
}

/// The retrieval-augmented answer service. Index and metadata handles are
/// loaded once by the startup sequence and shared read-only across requests;
/// per-request pipeline state never outlives its response.
pub struct SiftService {
	pub cfg: Config,
	pub meta: MetadataStore,
	pub dense: Option<FlatIndex>,
	pub lexical: Option<Bm25Index>,
	pub providers: Providers,
}
impl SiftService {
	pub fn new(
		cfg: Config,
		meta: MetadataStore,
		dense: Option<FlatIndex>,
		lexical: Option<Bm25Index>,
	) -> Self {
		Self { cfg, meta, dense, lexical, providers: Providers::default() }
	}

	pub fn with_providers(
		cfg: Config,
		meta: MetadataStore,
		dense: Option<FlatIndex>,
		lexical: Option<Bm25Index>,
		providers: Providers,
	) -> Self {
		Self { cfg, meta, dense, lexical, providers }
	}
}
