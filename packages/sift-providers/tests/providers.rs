use reqwest::header::AUTHORIZATION;
use serde_json::Map;

#[test]
fn builds_bearer_auth_header() {
	let headers =
		sift_providers::auth_headers("secret", &Map::new()).expect("Failed to build headers.");
	let value = headers.get(AUTHORIZATION).expect("Missing authorization header.");
	assert_eq!(value, "Bearer secret");
}

#[test]
fn forwards_default_headers() {
	let mut defaults = Map::new();

	defaults.insert("x-api-version".to_string(), serde_json::json!("2024-01-01"));

	let headers =
		sift_providers::auth_headers("secret", &defaults).expect("Failed to build headers.");
	let value = headers.get("x-api-version").expect("Missing default header.");
	assert_eq!(value, "2024-01-01");
}

#[test]
fn rejects_non_string_default_headers() {
	let mut defaults = Map::new();

	defaults.insert("x-retries".to_string(), serde_json::json!(3));

	assert!(sift_providers::auth_headers("secret", &defaults).is_err());
}
