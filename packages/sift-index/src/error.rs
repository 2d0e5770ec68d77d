pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read index file at {path:?}.")]
	ReadFile { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to parse index file at {path:?}.")]
	ParseFile { path: std::path::PathBuf, source: serde_json::Error },
	#[error("{message}")]
	Malformed { message: String },
}
