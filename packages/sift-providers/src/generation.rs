use reqwest::{
	Client,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde::Serialize;
use serde_json::Value;

/// The outbound chat-completion payload. Built once per inbound call and
/// serialized as-is; messages are kept as raw JSON values so pass-through
/// traffic is forwarded verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
	pub model: String,
	pub messages: Vec<Value>,
	pub temperature: f32,
	pub stream: bool,
}

/// Outcome of a successful dispatch. Streaming hands the raw downstream
/// response back so the caller can relay its bytes; non-streaming carries the
/// fully parsed body.
#[derive(Debug)]
pub enum Dispatch {
	Stream(reqwest::Response),
	Completed { status: u16, body: Value },
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
	#[error("Generation request failed: {source}")]
	Transport {
		#[from]
		source: reqwest::Error,
	},
	/// Downstream answered with an error status and a parseable body; both
	/// are preserved for the caller.
	#[error("Generation backend returned {status}.")]
	UpstreamStatus { status: u16, detail: Value },
	/// Downstream body was not the expected structured format; the raw text
	/// is the only detail available.
	#[error("Generation backend returned {status} with an unparseable body.")]
	UpstreamBody { status: u16, detail: String },
	#[error("{message}")]
	Headers { message: String },
}

/// Sends one chat-completion request to the configured backend.
///
/// Streaming requests return as soon as response headers arrive; the body is
/// relayed by the caller and is never inspected or reframed here.
/// Non-streaming requests await and parse the full body, translating error
/// statuses and unparseable payloads per the proxy contract. The client is
/// built without a timeout: streaming dispatch is long-lived by design.
pub async fn dispatch(
	cfg: &sift_config::Generation,
	request: &GenerationRequest,
) -> Result<Dispatch, DispatchError> {
	let client = Client::builder().build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let res = client.post(url).headers(request_headers(cfg)?).json(request).send().await?;

	if request.stream {
		return Ok(Dispatch::Stream(res));
	}

	let status = res.status().as_u16();
	let text = res.text().await?;
	let body: Value = serde_json::from_str(&text)
		.map_err(|_| DispatchError::UpstreamBody { status, detail: text })?;

	if status >= 400 {
		return Err(DispatchError::UpstreamStatus { status, detail: body });
	}

	Ok(Dispatch::Completed { status, body })
}

fn request_headers(cfg: &sift_config::Generation) -> Result<HeaderMap, DispatchError> {
	let mut headers = HeaderMap::new();

	if let Some(api_key) = cfg.api_key.as_deref() {
		let value = format!("Bearer {api_key}")
			.parse()
			.map_err(|_| DispatchError::Headers {
				message: "generation.api_key is not a valid header value.".to_string(),
			})?;

		headers.insert(AUTHORIZATION, value);
	}
	for (key, value) in &cfg.default_headers {
		let Some(raw) = value.as_str() else {
			return Err(DispatchError::Headers {
				message: "Default header values must be strings.".to_string(),
			});
		};
		let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| DispatchError::Headers {
			message: format!("Invalid default header name {key}."),
		})?;
		let value = raw.parse().map_err(|_| DispatchError::Headers {
			message: format!("Invalid default header value for {key}."),
		})?;

		headers.insert(name, value);
	}

	Ok(headers)
}
