//! Concurrent emote registry for chat rendering.
//!
//! Third-party emote lists are fetched in the background, built into complete
//! immutable maps, and published atomically. Rendering and autocomplete read
//! the current maps without ever blocking on a fetch or a writer.
//!
//! # Modules
//!
//! - [`core`] - Emote records, immutable maps, and the atomic snapshot cell
//! - [`fetch`] - Provider fetchers, the HTTP contract, and fetch errors
//! - [`providers`] - BetterTTV and FrankerFaceZ endpoint and payload knowledge
//! - [`registry`] - Ordered lookup across providers and channel scopes
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use emote_registry::{ChannelId, EmoteRegistry, Endpoints, Provider, ProviderFetcher, ReqwestClient, source_for};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let http = Arc::new(ReqwestClient::new(Duration::from_secs(15), "emote")?);
//! let providers = Provider::ALL
//! 	.into_iter()
//! 	.map(|p| ProviderFetcher::new(source_for(p, Endpoints::builtin(p)), http.clone()))
//! 	.collect();
//! let registry = EmoteRegistry::new(providers);
//!
//! for handle in registry.load_global() {
//! 	handle.await?;
//! }
//! let (channel, _loading) = registry.load_for_channel(ChannelId::new("forsen"));
//! let emote = channel.lookup("Kappa");
//! # let _ = emote;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod fetch;
pub mod providers;
pub mod registry;

pub use crate::core::{
	ChannelId, Emote, EmoteId, EmoteMap, EmoteMapBuilder, EmoteName, EmoteScope, Generation, ImageSet, Provider, Publish,
	Snapshot, SnapshotCell,
};
pub use crate::fetch::{
	EmoteSet, FetchError, FetchHandle, FetchOutcome, FetchResult, FetchTarget, HttpClient, HttpResponse, NetworkError,
	ParseError, ProviderFetcher, ReqwestClient,
};
pub use crate::providers::{BttvSource, EmoteSource, Endpoints, FfzSource, source_for};
pub use crate::registry::{ChannelEmotes, EmoteRegistry};

#[cfg(test)]
mod tests;
