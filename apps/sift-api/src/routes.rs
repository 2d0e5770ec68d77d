use axum::{
	Json, Router,
	body::Body,
	extract::State,
	http::{HeaderMap, HeaderValue, StatusCode, header},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde_json::{Value, json};

use sift_service::{AnswerOutcome, AnswerRequest, ChatOutcome, ChatRequest};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/healthz", get(healthz))
		.route("/chat", post(chat))
		.route("/answer", post(answer))
		.with_state(state)
}

/// Liveness probe; never authenticated.
async fn healthz() -> Json<Value> {
	Json(json!({ "ok": true }))
}

async fn chat(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<ChatRequest>,
) -> Result<Response, ApiError> {
	require_auth(&state, &headers)?;

	match state.service.chat(payload).await? {
		ChatOutcome::Stream(upstream) => Ok(stream_response(upstream)),
		ChatOutcome::Completed { status, body } => {
			Ok((StatusCode::from_u16(status).unwrap_or(StatusCode::OK), Json(body))
				.into_response())
		},
	}
}

async fn answer(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<AnswerRequest>,
) -> Result<Response, ApiError> {
	require_auth(&state, &headers)?;

	match state.service.answer(payload).await? {
		AnswerOutcome::Stream(upstream) => Ok(stream_response(upstream)),
		AnswerOutcome::Completed { answer, sources } => {
			Ok(Json(json!({ "answer": answer, "sources": sources })).into_response())
		},
	}
}

fn require_auth(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
	let Some(token) = state.service.cfg.security.api_auth_token.as_deref() else {
		return Ok(());
	};
	let expected = format!("Bearer {token}");
	let presented = headers.get(header::AUTHORIZATION).and_then(|value| value.to_str().ok());

	if presented != Some(expected.as_str()) {
		return Err(ApiError {
			status: StatusCode::UNAUTHORIZED,
			detail: Value::String("Invalid or missing bearer token.".to_string()),
		});
	}

	Ok(())
}

/// Relays the downstream byte stream without reframing it; the body is
/// forwarded chunk by chunk as it arrives and dropped if the client
/// disconnects.
fn stream_response(upstream: reqwest::Response) -> Response {
	let mut response = Body::from_stream(upstream.bytes_stream()).into_response();

	response
		.headers_mut()
		.insert(header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream"));

	response
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	detail: Value,
}
impl From<sift_service::Error> for ApiError {
	fn from(err: sift_service::Error) -> Self {
		match err {
			sift_service::Error::InvalidRequest { message } => {
				Self { status: StatusCode::UNPROCESSABLE_ENTITY, detail: Value::String(message) }
			},
			sift_service::Error::Upstream { status, detail } => Self {
				status: StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
				detail,
			},
			sift_service::Error::Network { message } => {
				Self { status: StatusCode::BAD_GATEWAY, detail: Value::String(message) }
			},
		}
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status, Json(json!({ "detail": self.detail }))).into_response()
	}
}
