use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub indices: Indices,
	#[serde(default)]
	pub retrieval: Retrieval,
	pub generation: Generation,
	pub providers: Providers,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

#[derive(Debug, Deserialize)]
pub struct Indices {
	/// Directory holding `meta.json`, `vectors.json`, and `bm25.json`.
	pub dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Retrieval {
	pub top_k: u32,
	pub rrf_k: u32,
	pub max_context_chars: u32,
	pub use_reranker: bool,
}
impl Default for Retrieval {
	fn default() -> Self {
		Self { top_k: 4, rrf_k: 60, max_context_chars: 2_400, use_reranker: true }
	}
}

#[derive(Debug, Deserialize)]
pub struct Generation {
	pub api_base: String,
	#[serde(default = "default_generation_path")]
	pub path: String,
	pub model: String,
	#[serde(default = "default_temperature")]
	pub temperature: f32,
	pub api_key: Option<String>,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub rerank: ProviderConfig,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ProviderConfig {
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Security {
	/// Bearer token required on `/chat` and `/answer`. Empty or absent disables auth.
	pub api_auth_token: Option<String>,
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_generation_path() -> String {
	"/chat/completions".to_string()
}

fn default_temperature() -> f32 {
	0.2
}
