//! HTTP contract consumed by fetchers, plus the reqwest-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use super::error::NetworkError;

/// Raw provider response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
	pub status: u16,
	pub body: Bytes,
}

impl HttpResponse {
	pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
		Self {
			status,
			body: body.into(),
		}
	}

	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}
}

/// Minimal request surface the registry needs from a network layer.
///
/// Retries, caching and cancellation belong to the implementation.
#[async_trait]
pub trait HttpClient: Send + Sync + 'static {
	/// Issues a GET request. Non-success statuses are returned as responses,
	/// not errors.
	async fn get(&self, url: &Url) -> Result<HttpResponse, NetworkError>;
}

/// [`HttpClient`] backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestClient {
	inner: reqwest::Client,
}

impl ReqwestClient {
	pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, NetworkError> {
		let inner = reqwest::Client::builder()
			.timeout(timeout)
			.user_agent(user_agent)
			.build()
			.map_err(|e| NetworkError::Transport(e.to_string()))?;
		Ok(Self { inner })
	}
}

#[async_trait]
impl HttpClient for ReqwestClient {
	async fn get(&self, url: &Url) -> Result<HttpResponse, NetworkError> {
		let response = self.inner.get(url.clone()).send().await.map_err(classify)?;
		let status = response.status().as_u16();
		let body = response.bytes().await.map_err(classify)?;
		Ok(HttpResponse { status, body })
	}
}

fn classify(err: reqwest::Error) -> NetworkError {
	if err.is_timeout() {
		NetworkError::Timeout
	} else {
		NetworkError::Transport(err.to_string())
	}
}
