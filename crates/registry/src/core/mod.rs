#![cfg_attr(doc, allow(rustdoc::private_intra_doc_links))]
//! Core emote data structures and the atomic publication primitive.
//!
//! # Purpose
//!
//! Everything the rendering hot path touches lives here: immutable emote
//! records, the immutable per-reload [`EmoteMap`], and the [`SnapshotCell`]
//! that makes one map current at a time.
//!
//! # Mental Model
//!
//! 1. **Build Phase:** A fetch parses a provider payload into [`Emote`]s and
//!    stages them in an [`EmoteMapBuilder`] that no other thread can see.
//! 2. **Publication:** The finished map is handed to [`SnapshotCell::publish`]
//!    (or [`SnapshotCell::set`]), which swaps it in with one atomic store.
//! 3. **Consumption:** Readers call [`SnapshotCell::get`] and receive a
//!    [`Snapshot`] that pins that exact map for as long as they hold it.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`Emote`] | Immutable record for one emote, shared as `Arc<Emote>`. |
//! | [`EmoteMap`] | Frozen name-to-record mapping produced by one reload. |
//! | [`EmoteMapBuilder`] | Private staging area a fetch fills before freezing. |
//! | [`SnapshotCell`] | Atomic holder of the current value for one scope. |
//! | [`Snapshot`] | Pinned handle to a published value. |
//! | [`Generation`] | Monotonic ticket ordering publications within one cell. |
//!
//! # Concurrency
//!
//! - **Reads:** Wait-free (atomic load of the current stamp plus a refcount increment).
//! - **Writes:** Lock-free CAS loop; a publication carrying an older generation than the current one is rejected.
//!
//! # Invariants
//!
//! - Readers never observe a partially built map.
//!   - Enforced in: [`EmoteMapBuilder::build`] (only finished maps reach a cell), [`SnapshotCell::publish`].
//!   - Tested by: [`crate::core::invariants::test_atomic_publication`]
//!   - Failure symptom: Lookups succeed for some names of a reload and fail for others.
//!
//! - Must keep published maps alive while pinned.
//!   - Enforced in: [`Snapshot`] (holds the `Arc` of its stamp).
//!   - Tested by: [`crate::core::invariants::test_snapshot_liveness_across_swap`]
//!   - Failure symptom: Renderer reads freed or changed records mid-frame.
//!
//! - A publication completed before another starts is never observed after it.
//!   - Enforced in: [`SnapshotCell::set`] (fresh ticket per attempt).
//!   - Tested by: [`crate::core::invariants::test_no_lost_update_ordering`]
//!   - Failure symptom: Emotes from an older reload reappear.
//!
//! - Must not publish a response older than the current one.
//!   - Enforced in: [`SnapshotCell::publish`] (generation comparison inside the CAS loop).
//!   - Tested by: [`crate::core::invariants::test_stale_generation_rejected`]
//!   - Failure symptom: A slow, superseded fetch overwrites fresher data.

mod cell;
mod emote;
mod map;

pub use cell::{Generation, Publish, Snapshot, SnapshotCell};
pub use emote::{ChannelId, Emote, EmoteId, EmoteName, EmoteScope, ImageSet, Provider};
pub use map::{EmoteMap, EmoteMapBuilder};

#[cfg(any(test, doc))]
pub(crate) mod invariants;
