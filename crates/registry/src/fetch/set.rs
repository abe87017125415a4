//! Per-provider, per-scope emote set: one snapshot cell plus fetch bookkeeping.

use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use super::FetchOutcome;
use super::error::FetchResult;
use crate::core::{ChannelId, Emote, EmoteMap, EmoteScope, Generation, Provider, Publish, Snapshot, SnapshotCell};

/// Which endpoint of a provider an [`EmoteSet`] is filled from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FetchTarget {
	Global,
	Channel(ChannelId),
}

impl FetchTarget {
	pub fn scope(&self) -> EmoteScope {
		match self {
			Self::Global => EmoteScope::Global,
			Self::Channel(_) => EmoteScope::Channel,
		}
	}

	pub fn channel(&self) -> Option<&ChannelId> {
		match self {
			Self::Global => None,
			Self::Channel(channel) => Some(channel),
		}
	}
}

impl fmt::Display for FetchTarget {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Global => f.write_str("global"),
			Self::Channel(channel) => write!(f, "channel:{channel}"),
		}
	}
}

#[derive(Debug, Default)]
struct FetchStatus {
	in_flight: usize,
	/// Newest generation whose fetch has finished, successfully or not.
	settled: Option<Generation>,
	last_error: Option<String>,
}

/// The current emote map of one provider for one scope.
///
/// Reads go straight to the snapshot cell. The status mutex is only taken by
/// fetch bookkeeping and diagnostics, never by [`Self::get`] or [`Self::lookup`].
pub struct EmoteSet {
	provider: Provider,
	target: FetchTarget,
	cell: SnapshotCell<EmoteMap>,
	status: Mutex<FetchStatus>,
}

impl EmoteSet {
	pub fn new(provider: Provider, target: FetchTarget) -> Self {
		Self {
			provider,
			target,
			cell: SnapshotCell::new(),
			status: Mutex::new(FetchStatus::default()),
		}
	}

	pub fn provider(&self) -> Provider {
		self.provider
	}

	pub fn target(&self) -> &FetchTarget {
		&self.target
	}

	/// Returns the current map, or `None` until the first successful load.
	#[inline]
	pub fn get(&self) -> Option<Snapshot<EmoteMap>> {
		self.cell.get()
	}

	/// Looks up one emote in the current map.
	#[inline]
	pub fn lookup(&self, name: &str) -> Option<Arc<Emote>> {
		let map = self.cell.get()?;
		map.get(name.trim()).cloned()
	}

	/// Number of emotes currently published; zero while empty.
	pub fn len(&self) -> usize {
		self.cell.get().map_or(0, |map| map.len())
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn generation(&self) -> Option<Generation> {
		self.cell.generation()
	}

	/// Publishes a map directly, bypassing any fetch.
	///
	/// Outstanding fetches issued before this call can no longer overwrite it.
	pub fn set(&self, map: EmoteMap) -> Snapshot<EmoteMap> {
		self.cell.set(map)
	}

	/// Number of fetches issued for this set that have not finished.
	pub fn in_flight(&self) -> usize {
		self.status.lock().in_flight
	}

	/// Error of the newest finished fetch, cleared by the next success.
	pub fn last_error(&self) -> Option<String> {
		self.status.lock().last_error.clone()
	}

	/// Registers a new fetch and hands out its generation ticket.
	pub(crate) fn begin(self: &Arc<Self>) -> InFlight {
		self.status.lock().in_flight += 1;
		InFlight {
			set: Arc::downgrade(self),
			generation: self.cell.issue(),
		}
	}

	/// Publishes or records the result of the fetch holding `generation`.
	pub(crate) fn settle(&self, generation: Generation, result: FetchResult<EmoteMap>) -> FetchResult<FetchOutcome> {
		let provider = self.provider.as_str();
		match result {
			Ok(map) => {
				let count = map.len();
				match self.cell.publish(generation, map) {
					Publish::Published(_) => {
						self.record(generation, None);
						tracing::debug!(provider, target = %self.target, %generation, count, "emote map published");
						Ok(FetchOutcome::Published { generation, count })
					}
					Publish::Superseded { current } => {
						tracing::debug!(provider, target = %self.target, %generation, %current, "emote map superseded by newer fetch");
						Ok(FetchOutcome::Superseded { generation, current })
					}
				}
			}
			Err(err) => {
				tracing::warn!(provider, target = %self.target, %generation, error = %err, "emote fetch failed; keeping previous map");
				self.record(generation, Some(err.to_string()));
				Err(err)
			}
		}
	}

	fn record(&self, generation: Generation, error: Option<String>) {
		let mut status = self.status.lock();
		if status.settled.is_none_or(|settled| generation > settled) {
			status.settled = Some(generation);
			status.last_error = error;
		}
	}
}

impl fmt::Debug for EmoteSet {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("EmoteSet")
			.field("provider", &self.provider)
			.field("target", &self.target)
			.field("generation", &self.cell.generation())
			.field("len", &self.len())
			.finish()
	}
}

/// Ticket for one outstanding fetch. Dropping it ends the in-flight count,
/// including when the fetch task is aborted.
pub(crate) struct InFlight {
	set: Weak<EmoteSet>,
	generation: Generation,
}

impl InFlight {
	pub(crate) fn generation(&self) -> Generation {
		self.generation
	}

	pub(crate) fn set(&self) -> Option<Arc<EmoteSet>> {
		self.set.upgrade()
	}
}

impl Drop for InFlight {
	fn drop(&mut self) {
		if let Some(set) = self.set.upgrade() {
			let mut status = set.status.lock();
			status.in_flight = status.in_flight.saturating_sub(1);
		}
	}
}
