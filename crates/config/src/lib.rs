//! Configuration for the emote registry.
//!
//! Configuration is written in TOML. Every key is optional; an absent file
//! means all defaults.
//!
//! # Configuration File
//!
//! Looked up at `$XDG_CONFIG_HOME/emote/config.toml` (or the platform config
//! directory) unless a path is given explicitly.
//!
//! ```toml
//! request_timeout_secs = 15
//! user_agent = "emote/0.4.0"
//!
//! # Global tier lookup order; enabled providers left out are appended.
//! precedence = ["ffz", "bttv"]
//!
//! [providers.bttv]
//! enabled = true
//!
//! [providers.ffz]
//! global_url = "https://ffz-mirror.example/v1/set/global"
//! channel_url = "https://ffz-mirror.example/v1/room/{channel}"
//! ```
//!
//! # Validation
//!
//! [`EmoteConfig::validate`] runs on every load. Endpoint overrides must be
//! absolute URLs, channel templates must contain `{channel}`, and precedence
//! entries must name known providers exactly once.

pub mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use emote_registry::providers::CHANNEL_PLACEHOLDER;
use emote_registry::{ChannelId, EmoteRegistry, Endpoints, FetchTarget, HttpClient, Provider, ProviderFetcher, source_for};
use serde::{Deserialize, Serialize};

pub use error::{ConfigError, Result};

/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmoteConfig {
	pub request_timeout_secs: u64,
	pub user_agent: String,
	pub providers: ProvidersConfig,
	/// Provider keys in global tier lookup order.
	pub precedence: Vec<String>,
}

impl Default for EmoteConfig {
	fn default() -> Self {
		Self {
			request_timeout_secs: DEFAULT_TIMEOUT_SECS,
			user_agent: concat!("emote/", env!("CARGO_PKG_VERSION")).to_owned(),
			providers: ProvidersConfig::default(),
			precedence: Provider::ALL.iter().map(|p| p.as_str().to_owned()).collect(),
		}
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProvidersConfig {
	pub bttv: ProviderConfig,
	pub ffz: ProviderConfig,
}

/// Per-provider switch and endpoint overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
	pub enabled: bool,
	pub global_url: Option<String>,
	/// Must contain `{channel}`.
	pub channel_url: Option<String>,
}

impl Default for ProviderConfig {
	fn default() -> Self {
		Self {
			enabled: true,
			global_url: None,
			channel_url: None,
		}
	}
}

impl EmoteConfig {
	/// Parse and validate a TOML string.
	pub fn parse(input: &str) -> Result<Self> {
		let config: Self = toml::from_str(input)?;
		config.validate()?;
		Ok(config)
	}

	/// Load configuration from a file.
	pub fn load(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
			path: path.to_path_buf(),
			error: e,
		})?;
		let config = Self::parse(&content)?;
		tracing::debug!(path = %path.display(), "emote config loaded");
		Ok(config)
	}

	/// Load configuration from a file, falling back to defaults if it does not exist.
	pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
		let path = path.as_ref();
		if !path.exists() {
			tracing::debug!(path = %path.display(), "no emote config file; using defaults");
			return Ok(Self::default());
		}
		Self::load(path)
	}

	/// Load from [`default_path`], or defaults when there is no config directory.
	pub fn load_default() -> Result<Self> {
		match default_path() {
			Some(path) => Self::load_or_default(path),
			None => Ok(Self::default()),
		}
	}

	pub fn validate(&self) -> Result<()> {
		if self.request_timeout_secs == 0 {
			return Err(ConfigError::Invalid("request_timeout_secs must be greater than zero".into()));
		}
		if self.user_agent.trim().is_empty() {
			return Err(ConfigError::Invalid("user_agent must not be empty".into()));
		}
		self.precedence()?;

		for provider in Provider::ALL {
			let config = self.provider(provider);
			let endpoints = self.endpoints(provider);
			if let Some(value) = &config.global_url
				&& endpoints.url(&FetchTarget::Global).is_err()
			{
				return Err(invalid_url(provider, "global_url", value));
			}
			if let Some(value) = &config.channel_url
				&& (!value.contains(CHANNEL_PLACEHOLDER) || endpoints.url(&FetchTarget::Channel(ChannelId::new("channel"))).is_err())
			{
				return Err(invalid_url(provider, "channel_url", value));
			}
		}
		Ok(())
	}

	pub fn provider(&self, provider: Provider) -> &ProviderConfig {
		match provider {
			Provider::Bttv => &self.providers.bttv,
			Provider::Ffz => &self.providers.ffz,
		}
	}

	/// Built-in endpoints of `provider` with any configured overrides applied.
	pub fn endpoints(&self, provider: Provider) -> Endpoints {
		let config = self.provider(provider);
		let mut endpoints = Endpoints::builtin(provider);
		if let Some(global) = &config.global_url {
			endpoints.global.clone_from(global);
		}
		if let Some(channel) = &config.channel_url {
			endpoints.channel.clone_from(channel);
		}
		endpoints
	}

	/// Listed providers in order, then any unlisted ones in default order.
	pub fn precedence(&self) -> Result<Vec<Provider>> {
		let mut order = Vec::with_capacity(Provider::ALL.len());
		for key in &self.precedence {
			let provider =
				Provider::from_key(key).ok_or_else(|| ConfigError::Invalid(format!("unknown provider {key:?} in precedence")))?;
			if order.contains(&provider) {
				return Err(ConfigError::Invalid(format!("provider {key:?} listed twice in precedence")));
			}
			order.push(provider);
		}
		for provider in Provider::ALL {
			if !order.contains(&provider) {
				order.push(provider);
			}
		}
		Ok(order)
	}

	/// Enabled providers in precedence order.
	pub fn enabled_providers(&self) -> Result<Vec<Provider>> {
		let mut order = self.precedence()?;
		order.retain(|p| self.provider(*p).enabled);
		Ok(order)
	}

	pub fn request_timeout(&self) -> Duration {
		Duration::from_secs(self.request_timeout_secs)
	}

	/// Builds a registry over the enabled providers, sharing `http`.
	pub fn build_registry(&self, http: Arc<dyn HttpClient>) -> Result<EmoteRegistry> {
		let providers: Vec<_> = self
			.enabled_providers()?
			.into_iter()
			.map(|provider| ProviderFetcher::new(source_for(provider, self.endpoints(provider)), Arc::clone(&http)))
			.collect();
		if providers.is_empty() {
			tracing::warn!("all emote providers disabled");
		}
		Ok(EmoteRegistry::new(providers))
	}
}

/// Default config file location, if the platform has a config directory.
pub fn default_path() -> Option<PathBuf> {
	dirs::config_dir().map(|dir| dir.join("emote").join("config.toml"))
}

fn invalid_url(provider: Provider, field: &str, value: &str) -> ConfigError {
	ConfigError::InvalidUrl {
		key: format!("providers.{}.{field}", provider.as_str()),
		value: value.to_owned(),
	}
}
