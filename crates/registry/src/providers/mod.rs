//! Provider-specific endpoint and payload knowledge.
//!
//! An [`EmoteSource`] knows where a provider serves its emote lists and how to
//! turn a response body into [`Emote`] records. It knows nothing about caching
//! or publication; [`crate::fetch::ProviderFetcher`] drives it.
//!
//! Parsing is strict about required fields and lenient about everything else:
//! unknown fields are ignored and missing optional fields degrade to `None`,
//! but one malformed entry fails the whole payload so a partial list is never
//! published.

mod bttv;
mod ffz;

use std::sync::Arc;

use url::Url;

pub use bttv::BttvSource;
pub use ffz::FfzSource;

use crate::core::{Emote, Provider};
use crate::fetch::{FetchError, FetchResult, FetchTarget, ParseError};

/// Placeholder substituted with the channel login in channel URL templates.
pub const CHANNEL_PLACEHOLDER: &str = "{channel}";

/// Endpoint knowledge and payload parsing for one provider.
pub trait EmoteSource: Send + Sync + 'static {
	fn provider(&self) -> Provider;

	/// URL serving the emote list for `target`.
	fn url(&self, target: &FetchTarget) -> FetchResult<Url>;

	/// Parses a successful response body for `target`.
	fn parse(&self, target: &FetchTarget, body: &[u8]) -> Result<Vec<Emote>, ParseError>;
}

/// Global URL and channel URL template of a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
	pub global: String,
	/// Must contain [`CHANNEL_PLACEHOLDER`].
	pub channel: String,
}

impl Endpoints {
	pub fn new(global: impl Into<String>, channel: impl Into<String>) -> Self {
		Self {
			global: global.into(),
			channel: channel.into(),
		}
	}

	/// Built-in endpoints of a provider.
	pub fn builtin(provider: Provider) -> Self {
		match provider {
			Provider::Bttv => Self::new(bttv::GLOBAL_URL, bttv::CHANNEL_URL),
			Provider::Ffz => Self::new(ffz::GLOBAL_URL, ffz::CHANNEL_URL),
		}
	}

	pub fn url(&self, target: &FetchTarget) -> FetchResult<Url> {
		let raw = match target {
			FetchTarget::Global => self.global.clone(),
			FetchTarget::Channel(channel) => {
				let encoded: String = url::form_urlencoded::byte_serialize(channel.as_str().as_bytes()).collect();
				self.channel.replace(CHANNEL_PLACEHOLDER, &encoded)
			}
		};
		Url::parse(&raw).map_err(|source| FetchError::RequestUrl { value: raw, source })
	}
}

/// Creates the source for `provider` with the given endpoints.
pub fn source_for(provider: Provider, endpoints: Endpoints) -> Arc<dyn EmoteSource> {
	match provider {
		Provider::Bttv => Arc::new(BttvSource::new(endpoints)),
		Provider::Ffz => Arc::new(FfzSource::new(endpoints)),
	}
}

/// Parses a payload URL, accepting the protocol-relative form providers use.
pub(crate) fn parse_payload_url(raw: &str) -> Result<Url, ParseError> {
	let absolute = if raw.starts_with("//") {
		format!("https:{raw}")
	} else {
		raw.to_owned()
	};
	Url::parse(&absolute).map_err(|source| ParseError::InvalidUrl {
		value: raw.to_owned(),
		source,
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::core::ChannelId;

	#[test]
	fn channel_url_substitutes_encoded_login() {
		let endpoints = Endpoints::new("https://api.test/global", "https://api.test/room/{channel}");
		let url = endpoints.url(&FetchTarget::Channel(ChannelId::new("Some User"))).unwrap();
		assert_eq!(url.as_str(), "https://api.test/room/some+user");

		let url = endpoints.url(&FetchTarget::Global).unwrap();
		assert_eq!(url.as_str(), "https://api.test/global");
	}

	#[test]
	fn invalid_endpoint_is_request_error() {
		let endpoints = Endpoints::new("not a url", "also not {channel}");
		assert!(matches!(endpoints.url(&FetchTarget::Global), Err(FetchError::RequestUrl { .. })));
	}

	#[test]
	fn protocol_relative_urls_become_https() {
		let url = parse_payload_url("//cdn.betterttv.net/emote/abc/1x").unwrap();
		assert_eq!(url.as_str(), "https://cdn.betterttv.net/emote/abc/1x");
		assert!(matches!(parse_payload_url("::"), Err(ParseError::InvalidUrl { .. })));
	}

	#[test]
	fn builtin_endpoints_resolve() {
		for provider in Provider::ALL {
			let endpoints = Endpoints::builtin(provider);
			assert!(endpoints.url(&FetchTarget::Global).is_ok());
			assert!(endpoints.url(&FetchTarget::Channel(ChannelId::new("forsen"))).is_ok());
		}
	}
}
