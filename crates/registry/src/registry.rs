//! Single lookup surface over every provider's emote sets.
//!
//! # Precedence Contract
//!
//! A name resolves to the first match in this order:
//! 1. **Channel tier:** the attached channel's sets, in provider precedence order.
//! 2. **Global tier:** each provider's global set, in provider precedence order.
//!
//! Provider precedence is the order providers were given to
//! [`EmoteRegistry::new`]. Channel-specific emotes therefore always override
//! global ones, and among equals the earlier provider wins.
//!
//! Each set is read through its own snapshot, so one lookup may combine an old
//! map from one provider with a new map from another while both reload.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::core::{ChannelId, Emote, EmoteName, Provider};
use crate::fetch::{EmoteSet, FetchHandle, ProviderFetcher};

struct Inner {
	/// In precedence order.
	providers: Vec<ProviderFetcher>,
}

/// Process-wide emote registry.
///
/// Cheap to clone; clones share the same providers and global sets.
#[derive(Clone)]
pub struct EmoteRegistry {
	inner: Arc<Inner>,
}

impl EmoteRegistry {
	/// Creates a registry consulting `providers` in the given order.
	pub fn new(providers: Vec<ProviderFetcher>) -> Self {
		Self {
			inner: Arc::new(Inner { providers }),
		}
	}

	/// Providers in precedence order.
	pub fn providers(&self) -> impl Iterator<Item = &ProviderFetcher> + '_ {
		self.inner.providers.iter()
	}

	pub fn provider(&self, provider: Provider) -> Option<&ProviderFetcher> {
		self.inner.providers.iter().find(|p| p.provider() == provider)
	}

	/// Starts a reload of every provider's global set.
	pub fn load_global(&self) -> Vec<FetchHandle> {
		self.inner.providers.iter().map(ProviderFetcher::load_global).collect()
	}

	/// Looks up a name in the global tier.
	pub fn lookup(&self, name: &str) -> Option<Arc<Emote>> {
		self.inner.providers.iter().find_map(|p| p.lookup(name))
	}

	/// Total number of global emotes across providers, duplicates included.
	pub fn global_count(&self) -> usize {
		self.inner.providers.iter().map(|p| p.global().len()).sum()
	}

	/// Global emote names starting with `prefix`, sorted and deduplicated.
	pub fn names_with_prefix(&self, prefix: &str) -> Vec<EmoteName> {
		collect_prefixed(self.inner.providers.iter().map(|p| p.global().as_ref()), prefix)
	}

	/// Creates the channel-scoped sets for `channel` without loading them.
	pub fn attach(&self, channel: ChannelId) -> ChannelEmotes {
		let sets = self
			.inner
			.providers
			.iter()
			.map(|p| p.channel_set(channel.clone()))
			.collect();
		tracing::debug!(%channel, "emote channel attached");
		ChannelEmotes {
			channel,
			registry: Arc::clone(&self.inner),
			sets,
		}
	}

	/// Attaches `channel` and starts loading its sets.
	pub fn load_for_channel(&self, channel: ChannelId) -> (ChannelEmotes, Vec<FetchHandle>) {
		let channel = self.attach(channel);
		let handles = channel.reload();
		(channel, handles)
	}
}

impl std::fmt::Debug for EmoteRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("EmoteRegistry")
			.field("providers", &self.inner.providers)
			.finish()
	}
}

/// Channel-scoped view: the channel's own sets layered over the global tier.
///
/// Dropping it detaches the channel; fetches still running for it are discarded.
pub struct ChannelEmotes {
	channel: ChannelId,
	registry: Arc<Inner>,
	/// Parallel to `registry.providers`.
	sets: Vec<Arc<EmoteSet>>,
}

impl ChannelEmotes {
	pub fn channel(&self) -> &ChannelId {
		&self.channel
	}

	/// Starts a reload of every channel set.
	pub fn reload(&self) -> Vec<FetchHandle> {
		self.registry
			.providers
			.iter()
			.zip(&self.sets)
			.map(|(provider, set)| provider.load_for_channel(set))
			.collect()
	}

	/// The channel set of one provider.
	pub fn set(&self, provider: Provider) -> Option<&Arc<EmoteSet>> {
		self.sets.iter().find(|s| s.provider() == provider)
	}

	/// Looks up a name, channel tier first, then global.
	pub fn lookup(&self, name: &str) -> Option<Arc<Emote>> {
		self.sets
			.iter()
			.find_map(|set| set.lookup(name))
			.or_else(|| self.registry.providers.iter().find_map(|p| p.lookup(name)))
	}

	/// Looks up a name in the channel tier only.
	pub fn lookup_channel(&self, name: &str) -> Option<Arc<Emote>> {
		self.sets.iter().find_map(|set| set.lookup(name))
	}

	/// Number of channel-scoped emotes across providers.
	pub fn channel_count(&self) -> usize {
		self.sets.iter().map(|s| s.len()).sum()
	}

	/// Names usable in this channel starting with `prefix`, sorted and deduplicated.
	pub fn names_with_prefix(&self, prefix: &str) -> Vec<EmoteName> {
		let channel = self.sets.iter().map(Arc::as_ref);
		let global = self.registry.providers.iter().map(|p| p.global().as_ref());
		collect_prefixed(channel.chain(global), prefix)
	}
}

impl std::fmt::Debug for ChannelEmotes {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ChannelEmotes")
			.field("channel", &self.channel)
			.field("sets", &self.sets)
			.finish()
	}
}

fn collect_prefixed<'a>(sets: impl Iterator<Item = &'a EmoteSet>, prefix: &str) -> Vec<EmoteName> {
	let mut names = BTreeSet::new();
	for set in sets {
		let Some(map) = set.get() else {
			continue;
		};
		names.extend(map.names().filter(|name| name.as_str().starts_with(prefix)).cloned());
	}
	names.into_iter().collect()
}
