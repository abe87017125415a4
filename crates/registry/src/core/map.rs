//! Immutable name-to-emote mapping and its builder.
//!
//! A map is assembled completely in an [`EmoteMapBuilder`] owned by a single
//! fetch, then frozen with [`EmoteMapBuilder::build`]. Nothing can mutate an
//! [`EmoteMap`] afterwards; a reload always produces a new one.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::emote::{Emote, EmoteName};

/// Fully built, read-only mapping from emote name to shared record.
#[derive(Debug, Clone, Default)]
pub struct EmoteMap {
	entries: FxHashMap<EmoteName, Arc<Emote>>,
}

impl EmoteMap {
	/// Returns an empty map.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Looks up an emote by exact (normalized) name.
	#[inline]
	pub fn get(&self, name: &str) -> Option<&Arc<Emote>> {
		self.entries.get(name)
	}

	#[inline]
	pub fn contains(&self, name: &str) -> bool {
		self.entries.contains_key(name)
	}

	#[inline]
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	#[inline]
	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Iterates entries in unspecified order.
	pub fn iter(&self) -> impl Iterator<Item = (&EmoteName, &Arc<Emote>)> + '_ {
		self.entries.iter()
	}

	pub fn names(&self) -> impl Iterator<Item = &EmoteName> + '_ {
		self.entries.keys()
	}
}

impl FromIterator<Emote> for EmoteMap {
	fn from_iter<I: IntoIterator<Item = Emote>>(iter: I) -> Self {
		let mut builder = EmoteMapBuilder::default();
		builder.extend(iter);
		builder.build()
	}
}

/// Mutable staging area for a new [`EmoteMap`].
#[derive(Debug, Default)]
pub struct EmoteMapBuilder {
	entries: FxHashMap<EmoteName, Arc<Emote>>,
	replaced: usize,
}

impl EmoteMapBuilder {
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
			replaced: 0,
		}
	}

	/// Inserts an emote. A later emote with the same name replaces an earlier one.
	///
	/// Emotes with an empty name are skipped.
	pub fn insert(&mut self, emote: Emote) -> Option<Arc<Emote>> {
		if emote.name.is_empty() {
			return None;
		}
		let previous = self.entries.insert(emote.name.clone(), Arc::new(emote));
		if previous.is_some() {
			self.replaced += 1;
		}
		previous
	}

	pub fn extend(&mut self, emotes: impl IntoIterator<Item = Emote>) {
		for emote in emotes {
			self.insert(emote);
		}
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Number of inserts that replaced an earlier emote of the same name.
	pub fn replaced(&self) -> usize {
		self.replaced
	}

	/// Freezes the staged entries into an immutable map.
	pub fn build(self) -> EmoteMap {
		EmoteMap { entries: self.entries }
	}

	/// Freezes the staged entries, sharing records with `previous` wherever the
	/// new record is equal to the one already published under the same name.
	///
	/// `previous` is only read.
	pub fn build_reusing(mut self, previous: Option<&EmoteMap>) -> EmoteMap {
		if let Some(previous) = previous {
			for (name, emote) in self.entries.iter_mut() {
				if let Some(existing) = previous.get(name.as_str())
					&& **existing == **emote
				{
					*emote = Arc::clone(existing);
				}
			}
		}
		self.build()
	}
}
