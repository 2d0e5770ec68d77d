use serde::Deserialize;
use serde_json::Value;

use sift_providers::generation::{self, Dispatch, GenerationRequest};

use crate::{Error, Result, SiftService};

/// Pass-through chat request. Messages go downstream untouched; model and
/// temperature fall back to the configured defaults when absent.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
	pub messages: Vec<Value>,
	pub model: Option<String>,
	pub temperature: Option<f32>,
	pub stream: Option<bool>,
}

#[derive(Debug)]
pub enum ChatOutcome {
	/// Relay the downstream byte stream untouched.
	Stream(reqwest::Response),
	/// Downstream body and success status, both preserved as-is.
	Completed { status: u16, body: Value },
}

impl SiftService {
	/// Direct proxy mode: no retrieval, no prompt augmentation. The request is
	/// forwarded to the generation backend and its response relayed verbatim.
	pub async fn chat(&self, request: ChatRequest) -> Result<ChatOutcome> {
		if request.messages.is_empty() {
			return Err(Error::InvalidRequest {
				message: "messages must not be empty.".to_string(),
			});
		}

		let generation = GenerationRequest {
			model: request.model.unwrap_or_else(|| self.cfg.generation.model.clone()),
			messages: request.messages,
			temperature: request.temperature.unwrap_or(self.cfg.generation.temperature),
			stream: request.stream.unwrap_or(true),
		};

		match generation::dispatch(&self.cfg.generation, &generation).await? {
			Dispatch::Stream(upstream) => Ok(ChatOutcome::Stream(upstream)),
			Dispatch::Completed { status, body } => Ok(ChatOutcome::Completed { status, body }),
		}
	}
}
