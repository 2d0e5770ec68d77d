mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Config, EmbeddingProviderConfig, Generation, Indices, ProviderConfig, Providers, Retrieval,
	Security, Service,
};

use std::{fs, path::Path};

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.retrieval.top_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.top_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.rrf_k == 0 {
		return Err(Error::Validation {
			message: "retrieval.rrf_k must be greater than zero.".to_string(),
		});
	}
	if cfg.retrieval.max_context_chars == 0 {
		return Err(Error::Validation {
			message: "retrieval.max_context_chars must be greater than zero.".to_string(),
		});
	}
	if cfg.generation.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "generation.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.generation.model.trim().is_empty() {
		return Err(Error::Validation {
			message: "generation.model must be non-empty.".to_string(),
		});
	}
	if !cfg.generation.temperature.is_finite() {
		return Err(Error::Validation {
			message: "generation.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=2.0).contains(&cfg.generation.temperature) {
		return Err(Error::Validation {
			message: "generation.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}
	if cfg.providers.embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.embedding.api_key must be non-empty.".to_string(),
		});
	}
	if cfg.retrieval.use_reranker && cfg.providers.rerank.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "providers.rerank.api_key must be non-empty when retrieval.use_reranker is true."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.security.api_auth_token.as_deref().map(|token| token.trim().is_empty()).unwrap_or(false)
	{
		cfg.security.api_auth_token = None;
	}
	if cfg.generation.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.generation.api_key = None;
	}
}
