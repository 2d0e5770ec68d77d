use std::{env, sync::Arc};

use axum::{
	Json, Router,
	body::{self, Body},
	http::{Request, StatusCode},
	routing::post,
};
use serde_json::{Map, Value};
use tower::util::ServiceExt;

use sift_api::{routes, state::AppState};
use sift_config::{
	Config, EmbeddingProviderConfig, Generation, Indices, ProviderConfig, Providers, Retrieval,
	Security, Service,
};
use sift_index::MetadataStore;
use sift_service::SiftService;

fn test_config(api_base: String, api_auth_token: Option<String>) -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		indices: Indices { dir: env::temp_dir() },
		retrieval: Retrieval { top_k: 4, rrf_k: 60, max_context_chars: 2_400, use_reranker: false },
		generation: Generation {
			api_base,
			path: "/chat/completions".to_string(),
			model: "test-model".to_string(),
			temperature: 0.2,
			api_key: None,
			default_headers: Map::new(),
		},
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/embeddings".to_string(),
				model: "test".to_string(),
				dimensions: 2,
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			rerank: ProviderConfig {
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: "test-key".to_string(),
				path: "/rerank".to_string(),
				model: "test".to_string(),
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
		},
		security: Security { api_auth_token },
	}
}

fn test_app(api_base: String, api_auth_token: Option<String>) -> Router {
	let config = test_config(api_base, api_auth_token);
	let service = SiftService::new(config, MetadataStore::default(), None, None);

	routes::router(AppState { service: Arc::new(service) })
}

async fn spawn_backend(status: StatusCode, reply: Value) -> String {
	let app = Router::new().route(
		"/chat/completions",
		post(move || async move { (status, Json(reply.clone())) }),
	);

	spawn(app).await
}

async fn spawn_text_backend(status: StatusCode, body: &'static str) -> String {
	let app =
		Router::new().route("/chat/completions", post(move || async move { (status, body) }));

	spawn(app).await
}

async fn spawn(app: Router) -> String {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
		.await
		.expect("Failed to bind the stub backend.");
	let addr = listener.local_addr().expect("Failed to read the stub backend address.");

	tokio::spawn(async move {
		axum::serve(listener, app).await.expect("Stub backend crashed.");
	});

	format!("http://{addr}")
}

fn post_json(uri: &str, payload: &Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header("content-type", "application/json")
		.body(Body::from(payload.to_string()))
		.expect("Failed to build request.")
}

async fn response_json(response: axum::response::Response) -> Value {
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&bytes).expect("Failed to parse response body.")
}

#[tokio::test]
async fn healthz_needs_no_token() {
	let app = test_app("http://127.0.0.1:1".to_string(), Some("secret".to_string()));
	let response = app
		.oneshot(
			Request::builder()
				.uri("/healthz")
				.body(Body::empty())
				.expect("Failed to build request."),
		)
		.await
		.expect("Failed to call /healthz.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = response_json(response).await;

	assert_eq!(json["ok"], true);
}

#[tokio::test]
async fn rejects_a_missing_bearer_token() {
	let app = test_app("http://127.0.0.1:1".to_string(), Some("secret".to_string()));
	let payload = serde_json::json!({
		"messages": [{ "role": "user", "content": "hello" }],
		"stream": false,
	});
	let response =
		app.oneshot(post_json("/chat", &payload)).await.expect("Failed to call /chat.");

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

	let json = response_json(response).await;

	assert_eq!(json["detail"], "Invalid or missing bearer token.");
}

#[tokio::test]
async fn answers_with_the_configured_bearer_token() {
	let reply = serde_json::json!({ "choices": [{ "message": { "content": "hi" } }] });
	let api_base = spawn_backend(StatusCode::OK, reply.clone()).await;
	let app = test_app(api_base, Some("secret".to_string()));
	let payload = serde_json::json!({ "query": "anything", "stream": false });
	let request = Request::builder()
		.method("POST")
		.uri("/answer")
		.header("content-type", "application/json")
		.header("authorization", "Bearer secret")
		.body(Body::from(payload.to_string()))
		.expect("Failed to build request.");
	let response = app.oneshot(request).await.expect("Failed to call /answer.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = response_json(response).await;

	assert_eq!(json["answer"], reply);
	assert_eq!(json["sources"], serde_json::json!([]));
}

#[tokio::test]
async fn chat_passes_through_the_downstream_body() {
	let reply = serde_json::json!({ "choices": [{ "message": { "content": "hi" } }] });
	let api_base = spawn_backend(StatusCode::OK, reply.clone()).await;
	let app = test_app(api_base, None);
	let payload = serde_json::json!({
		"messages": [{ "role": "user", "content": "hello" }],
		"stream": false,
	});
	let response =
		app.oneshot(post_json("/chat", &payload)).await.expect("Failed to call /chat.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(response_json(response).await, reply);
}

#[tokio::test]
async fn chat_relays_the_downstream_stream() {
	let api_base = spawn_text_backend(StatusCode::OK, "data: hello\n\ndata: [DONE]\n\n").await;
	let app = test_app(api_base, None);
	let payload = serde_json::json!({
		"messages": [{ "role": "user", "content": "hello" }],
		"stream": true,
	});
	let response =
		app.oneshot(post_json("/chat", &payload)).await.expect("Failed to call /chat.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		response.headers().get("content-type").expect("Missing content type."),
		"text/event-stream"
	);

	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read the relayed stream.");

	assert_eq!(&bytes[..], b"data: hello\n\ndata: [DONE]\n\n");
}

#[tokio::test]
async fn answer_relays_the_downstream_stream() {
	let api_base = spawn_text_backend(StatusCode::OK, "data: hello\n\ndata: [DONE]\n\n").await;
	let app = test_app(api_base, None);
	let payload = serde_json::json!({ "query": "anything", "stream": true });
	let response =
		app.oneshot(post_json("/answer", &payload)).await.expect("Failed to call /answer.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(
		response.headers().get("content-type").expect("Missing content type."),
		"text/event-stream"
	);

	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read the relayed stream.");

	assert_eq!(&bytes[..], b"data: hello\n\ndata: [DONE]\n\n");
}

#[tokio::test]
async fn preserves_an_unparseable_downstream_error() {
	let api_base =
		spawn_text_backend(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").await;
	let app = test_app(api_base, None);
	let payload = serde_json::json!({
		"messages": [{ "role": "user", "content": "hello" }],
		"stream": false,
	});
	let response =
		app.oneshot(post_json("/chat", &payload)).await.expect("Failed to call /chat.");

	assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

	let json = response_json(response).await;

	assert_eq!(json["detail"], "upstream exploded");
}

#[tokio::test]
async fn rejects_an_empty_message_list() {
	let app = test_app("http://127.0.0.1:1".to_string(), None);
	let payload = serde_json::json!({ "messages": [], "stream": false });
	let response =
		app.oneshot(post_json("/chat", &payload)).await.expect("Failed to call /chat.");

	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
