//! Atomic snapshot cell with generation-guarded publication.
//!
//! # Role
//!
//! Holds the current immutable value for one provider scope. Readers load it
//! without locking; writers replace it wholesale in one atomic swap.
//!
//! # Invariants
//!
//! - A load returns a value published by a completed swap, or empty (see `invariants::test_atomic_publication`).
//! - A [`Snapshot`] keeps its value alive after the cell moves on (see `invariants::test_snapshot_liveness_across_swap`).
//! - Published generations only increase (see `invariants::test_stale_generation_rejected`).

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::ArcSwapOption;

/// Monotonic publication stamp issued by a [`SnapshotCell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl fmt::Display for Generation {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

struct Stamped<T> {
	generation: Generation,
	value: Arc<T>,
}

/// Pinned view of one published value.
///
/// Holding a snapshot keeps the value alive and unchanged regardless of later
/// publications into the cell it came from.
pub struct Snapshot<T> {
	stamp: Arc<Stamped<T>>,
}

impl<T> Snapshot<T> {
	/// Generation this value was published under.
	pub fn generation(&self) -> Generation {
		self.stamp.generation
	}

	/// Shared handle to the underlying value.
	pub fn value(&self) -> &Arc<T> {
		&self.stamp.value
	}

	/// Returns true if both snapshots pin the same value.
	pub fn ptr_eq(a: &Self, b: &Self) -> bool {
		Arc::ptr_eq(&a.stamp.value, &b.stamp.value)
	}
}

impl<T> Clone for Snapshot<T> {
	fn clone(&self) -> Self {
		Self {
			stamp: Arc::clone(&self.stamp),
		}
	}
}

impl<T> Deref for Snapshot<T> {
	type Target = T;

	fn deref(&self) -> &T {
		&self.stamp.value
	}
}

impl<T: fmt::Debug> fmt::Debug for Snapshot<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Snapshot")
			.field("generation", &self.stamp.generation)
			.field("value", &*self.stamp.value)
			.finish()
	}
}

/// Result of a generation-guarded publication.
#[derive(Debug)]
pub enum Publish<T> {
	/// The value is now current.
	Published(Snapshot<T>),
	/// A value with the same or a newer generation was already current; nothing changed.
	Superseded {
		/// Generation that stayed current.
		current: Generation,
	},
}

impl<T> Publish<T> {
	pub fn is_published(&self) -> bool {
		matches!(self, Self::Published(_))
	}
}

/// Thread-safe holder of the current immutable `T`.
///
/// Reads are wait-free and never observe a partially built value. Writes
/// either replace the value unconditionally ([`Self::set`]) or only when
/// their generation is newer than what is published ([`Self::publish`]).
pub struct SnapshotCell<T> {
	slot: ArcSwapOption<Stamped<T>>,
	clock: AtomicU64,
}

impl<T> Default for SnapshotCell<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> SnapshotCell<T> {
	/// Creates an empty cell.
	pub fn new() -> Self {
		Self {
			slot: ArcSwapOption::empty(),
			clock: AtomicU64::new(0),
		}
	}

	/// Returns the current value, or `None` before the first publication.
	#[inline]
	pub fn get(&self) -> Option<Snapshot<T>> {
		self.slot.load_full().map(|stamp| Snapshot { stamp })
	}

	/// Returns true if nothing has been published yet.
	pub fn is_empty(&self) -> bool {
		self.slot.load().is_none()
	}

	/// Generation of the current value, if any.
	pub fn generation(&self) -> Option<Generation> {
		match &*self.slot.load() {
			Some(stamp) => Some(stamp.generation),
			None => None,
		}
	}

	/// Issues a new generation ticket, greater than every ticket issued before it.
	pub fn issue(&self) -> Generation {
		Generation(self.clock.fetch_add(1, Ordering::AcqRel).wrapping_add(1))
	}

	/// Replaces the current value.
	///
	/// Always succeeds; the value is stamped with a fresh generation so a
	/// later [`Self::publish`] carrying an older ticket cannot undo it.
	pub fn set(&self, value: impl Into<Arc<T>>) -> Snapshot<T> {
		let value = value.into();
		loop {
			let generation = self.issue();
			if let Publish::Published(snapshot) = self.publish(generation, Arc::clone(&value)) {
				return snapshot;
			}
			// A ticket issued after ours landed first; retry above it.
		}
	}

	/// Publishes `value` under `generation` unless an equal or newer
	/// generation is already current.
	pub fn publish(&self, generation: Generation, value: impl Into<Arc<T>>) -> Publish<T> {
		let fresh = Arc::new(Stamped {
			generation,
			value: value.into(),
		});

		loop {
			let current = self.slot.load_full();
			if let Some(stamp) = &current
				&& stamp.generation >= generation
			{
				return Publish::Superseded {
					current: stamp.generation,
				};
			}

			let prev = self.slot.compare_and_swap(&current, Some(Arc::clone(&fresh)));
			if same_stamp(&*prev, &current) {
				return Publish::Published(Snapshot { stamp: fresh });
			}
			// Lost the race against another writer; re-check against its generation.
		}
	}
}

impl<T> fmt::Debug for SnapshotCell<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SnapshotCell")
			.field("generation", &self.generation())
			.finish_non_exhaustive()
	}
}

fn same_stamp<T>(a: &Option<Arc<Stamped<T>>>, b: &Option<Arc<Stamped<T>>>) -> bool {
	match (a, b) {
		(Some(a), Some(b)) => Arc::ptr_eq(a, b),
		(None, None) => true,
		_ => false,
	}
}
