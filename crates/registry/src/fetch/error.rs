//! Error types for emote fetching.
//!
//! None of these ever reach a reader: a failed fetch leaves the published map
//! untouched and is only reported to whoever issued it.

use thiserror::Error;

/// Transport-level failure reported by an [`HttpClient`](super::HttpClient).
#[derive(Debug, Clone, Error)]
pub enum NetworkError {
	/// The request could not be sent or the body could not be read.
	#[error("transport error: {0}")]
	Transport(String),

	/// The request did not finish within the configured timeout.
	#[error("request timed out")]
	Timeout,

	/// The provider answered with a non-success status.
	#[error("unexpected status {status} from {url}")]
	Status {
		status: u16,
		url: String,
	},
}

/// Payload that could not be turned into emote records.
#[derive(Debug, Error)]
pub enum ParseError {
	/// Body is not valid JSON or does not match the expected shape.
	#[error("invalid payload: {0}")]
	Json(#[from] serde_json::Error),

	/// A field the record cannot exist without is absent.
	#[error("missing required field: {0}")]
	MissingField(&'static str),

	/// An image or page URL in the payload does not parse.
	#[error("invalid url {value:?}: {source}")]
	InvalidUrl {
		value: String,
		#[source]
		source: url::ParseError,
	},

	/// Payload is well-formed but inconsistent with itself.
	#[error("schema mismatch: {0}")]
	Schema(String),
}

/// Why one fetch attempt ended without publishing.
#[derive(Debug, Error)]
pub enum FetchError {
	#[error(transparent)]
	Network(#[from] NetworkError),

	#[error(transparent)]
	Parse(#[from] ParseError),

	/// The request URL could not be built for this target.
	#[error("invalid request url {value:?}: {source}")]
	RequestUrl {
		value: String,
		#[source]
		source: url::ParseError,
	},

	/// The worker task running the fetch panicked or was cancelled.
	#[error("fetch task failed: {0}")]
	Worker(String),
}

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;
