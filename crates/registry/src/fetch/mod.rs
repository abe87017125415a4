//! Provider fetchers: request, parse off the hot path, publish.
//!
//! Each fetch takes a generation ticket from its target [`EmoteSet`] when it
//! is issued. The response is parsed on the blocking pool into a complete
//! [`EmoteMap`], then published with that ticket. A fetch that finishes after
//! a newer one has published is reported as superseded and discarded.
//!
//! Failures are returned through the [`FetchHandle`] and logged; the set keeps
//! serving its previous map.

mod error;
mod http;
mod set;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use emote_worker::TaskClass;
use tokio::task::JoinHandle;

pub use error::{FetchError, FetchResult, NetworkError, ParseError};
pub use http::{HttpClient, HttpResponse, ReqwestClient};
pub use set::{EmoteSet, FetchTarget};

use crate::core::{ChannelId, Emote, EmoteMap, EmoteMapBuilder, Generation, Provider, Snapshot};
use crate::providers::EmoteSource;

/// How a fetch that did not fail ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
	/// The new map is current.
	Published { generation: Generation, count: usize },
	/// A newer fetch had already published; this result was dropped.
	Superseded { generation: Generation, current: Generation },
	/// The target set was dropped (channel detached) before the fetch finished.
	Detached,
}

/// Completion handle for one fetch.
///
/// Awaiting yields the outcome. Dropping it does not cancel the fetch.
#[derive(Debug)]
pub struct FetchHandle {
	provider: Provider,
	task: JoinHandle<FetchResult<FetchOutcome>>,
}

impl FetchHandle {
	pub fn provider(&self) -> Provider {
		self.provider
	}

	pub fn is_finished(&self) -> bool {
		self.task.is_finished()
	}

	/// Cancels the fetch. The set keeps its current map.
	pub fn abort(&self) {
		self.task.abort();
	}
}

impl Future for FetchHandle {
	type Output = FetchResult<FetchOutcome>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		Pin::new(&mut self.get_mut().task).poll(cx).map(|joined| match joined {
			Ok(result) => result,
			Err(err) => Err(FetchError::Worker(err.to_string())),
		})
	}
}

/// Loads one provider's emotes into its global set and into channel sets on request.
pub struct ProviderFetcher {
	source: Arc<dyn EmoteSource>,
	http: Arc<dyn HttpClient>,
	global: Arc<EmoteSet>,
}

impl ProviderFetcher {
	pub fn new(source: Arc<dyn EmoteSource>, http: Arc<dyn HttpClient>) -> Self {
		let global = Arc::new(EmoteSet::new(source.provider(), FetchTarget::Global));
		Self { source, http, global }
	}

	pub fn provider(&self) -> Provider {
		self.source.provider()
	}

	/// The process-wide set of this provider.
	pub fn global(&self) -> &Arc<EmoteSet> {
		&self.global
	}

	/// Looks up a global emote of this provider.
	#[inline]
	pub fn lookup(&self, name: &str) -> Option<Arc<Emote>> {
		self.global.lookup(name)
	}

	/// Starts a reload of the global set.
	pub fn load_global(&self) -> FetchHandle {
		self.load(&self.global)
	}

	/// Creates an empty set for a channel's emotes from this provider.
	pub fn channel_set(&self, channel: ChannelId) -> Arc<EmoteSet> {
		Arc::new(EmoteSet::new(self.provider(), FetchTarget::Channel(channel)))
	}

	/// Starts a reload of a channel set created by [`Self::channel_set`].
	///
	/// The fetch only holds the set weakly; if every other handle is dropped
	/// before it finishes, the result is discarded.
	pub fn load_for_channel(&self, set: &Arc<EmoteSet>) -> FetchHandle {
		debug_assert_eq!(set.provider(), self.provider(), "channel set belongs to another provider");
		self.load(set)
	}

	fn load(&self, set: &Arc<EmoteSet>) -> FetchHandle {
		let ticket = set.begin();
		let provider = self.provider();
		let target = set.target().clone();
		let source = Arc::clone(&self.source);
		let http = Arc::clone(&self.http);

		tracing::debug!(provider = provider.as_str(), %target, generation = %ticket.generation(), "emote fetch issued");

		let task = emote_worker::spawn(TaskClass::Background, async move {
			let fetched = request(source.as_ref(), http.as_ref(), &target).await;

			let Some(set) = ticket.set() else {
				tracing::debug!(provider = provider.as_str(), %target, "emote set detached before fetch finished");
				return Ok(FetchOutcome::Detached);
			};

			let built = match fetched {
				Ok(body) => build_off_thread(source, target, body, set.get()).await,
				Err(err) => Err(err),
			};
			set.settle(ticket.generation(), built)
		});

		FetchHandle { provider, task }
	}
}

impl std::fmt::Debug for ProviderFetcher {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ProviderFetcher")
			.field("provider", &self.provider())
			.field("global", &self.global)
			.finish_non_exhaustive()
	}
}

/// Issues the request. `Ok(None)` means the channel is unknown to the
/// provider, which is an empty emote list rather than a failure.
async fn request(source: &dyn EmoteSource, http: &dyn HttpClient, target: &FetchTarget) -> FetchResult<Option<Bytes>> {
	let url = source.url(target)?;
	let response = http.get(&url).await?;

	if response.status == 404 && target.channel().is_some() {
		return Ok(None);
	}
	if !response.is_success() {
		return Err(NetworkError::Status {
			status: response.status,
			url: url.to_string(),
		}
		.into());
	}
	Ok(Some(response.body))
}

async fn build_off_thread(
	source: Arc<dyn EmoteSource>,
	target: FetchTarget,
	body: Option<Bytes>,
	previous: Option<Snapshot<EmoteMap>>,
) -> FetchResult<EmoteMap> {
	let Some(body) = body else {
		return Ok(EmoteMap::empty());
	};

	let built = emote_worker::spawn_blocking(TaskClass::CpuBlocking, move || build_map(source.as_ref(), &target, &body, previous.as_deref()))
		.await
		.map_err(|err| FetchError::Worker(err.to_string()))?;
	Ok(built?)
}

/// Parses a provider payload into a finished map, reusing unchanged records
/// from `previous`.
pub fn build_map(source: &dyn EmoteSource, target: &FetchTarget, body: &[u8], previous: Option<&EmoteMap>) -> Result<EmoteMap, ParseError> {
	let emotes = source.parse(target, body)?;
	let mut builder = EmoteMapBuilder::with_capacity(emotes.len());
	builder.extend(emotes);

	if builder.replaced() > 0 {
		tracing::debug!(
			provider = source.provider().as_str(),
			%target,
			replaced = builder.replaced(),
			"duplicate emote names in payload; later entries kept"
		);
	}
	Ok(builder.build_reusing(previous))
}
