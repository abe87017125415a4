#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use super::cell::{Publish, SnapshotCell};

struct Tracked {
	tag: &'static str,
	drops: Arc<AtomicUsize>,
}

impl Drop for Tracked {
	fn drop(&mut self) {
		self.drops.fetch_add(1, Ordering::SeqCst);
	}
}

/// Every element equals the batch number and the batch has `number + 1` elements.
fn uniform_batch(number: u64) -> Vec<u64> {
	vec![number; number as usize + 1]
}

fn is_uniform_batch(batch: &[u64]) -> bool {
	match batch.first() {
		Some(&number) => batch.len() == number as usize + 1 && batch.iter().all(|&n| n == number),
		None => false,
	}
}

/// Invariant: Readers only observe fully published values.
///
/// Concurrent loads during a stream of swaps MUST return either empty or a value
/// exactly as it was built by one publisher.
pub(crate) fn inv_atomic_publication() {
	let cell = Arc::new(SnapshotCell::<Vec<u64>>::new());
	let done = Arc::new(AtomicBool::new(false));

	let readers: Vec<_> = (0..4)
		.map(|_| {
			let cell = Arc::clone(&cell);
			let done = Arc::clone(&done);
			thread::spawn(move || {
				let mut observed = 0usize;
				while !done.load(Ordering::Acquire) {
					if let Some(snapshot) = cell.get() {
						assert!(is_uniform_batch(&snapshot), "torn read: len={} first={:?}", snapshot.len(), snapshot.first());
						observed += 1;
					}
				}
				observed
			})
		})
		.collect();

	for number in 0..200 {
		cell.set(uniform_batch(number));
	}
	done.store(true, Ordering::Release);

	for reader in readers {
		reader.join().expect("reader panicked");
	}
	assert_eq!(cell.get().map(|s| s.len()), Some(200));
}

#[cfg_attr(test, test)]
pub(crate) fn test_atomic_publication() {
	inv_atomic_publication()
}

/// Invariant: Snapshot liveness across swaps.
///
/// A value MUST stay alive and unchanged for as long as a reader pins it, and be
/// released once both the cell and every reader have let go.
pub(crate) fn inv_snapshot_liveness_across_swap() {
	let drops = Arc::new(AtomicUsize::new(0));
	let cell: SnapshotCell<Tracked> = SnapshotCell::new();

	cell.set(Tracked {
		tag: "A",
		drops: Arc::clone(&drops),
	});
	let pinned = cell.get().expect("A published");

	cell.set(Tracked {
		tag: "B",
		drops: Arc::clone(&drops),
	});
	assert_eq!(cell.get().map(|s| s.tag), Some("B"));

	assert_eq!(drops.load(Ordering::SeqCst), 0, "A must be kept alive by the pinned snapshot");
	assert_eq!(pinned.tag, "A");

	drop(pinned);
	assert_eq!(drops.load(Ordering::SeqCst), 1, "A must be released after the last reader drops it");

	drop(cell);
	assert_eq!(drops.load(Ordering::SeqCst), 2);
}

#[cfg_attr(test, test)]
pub(crate) fn test_snapshot_liveness_across_swap() {
	inv_snapshot_liveness_across_swap()
}

/// Invariant: No lost update ordering.
///
/// If `set(A)` completes before `set(B)` begins, no load issued after `set(B)`
/// completes may return `A`.
pub(crate) fn inv_no_lost_update_ordering() {
	let cell = Arc::new(SnapshotCell::<&'static str>::new());
	let a = cell.set("A");
	let b = cell.set("B");
	assert!(b.generation() > a.generation());

	let readers: Vec<_> = (0..4)
		.map(|_| {
			let cell = Arc::clone(&cell);
			thread::spawn(move || {
				for _ in 0..1_000 {
					assert_eq!(cell.get().as_deref().copied(), Some("B"));
				}
			})
		})
		.collect();
	for reader in readers {
		reader.join().expect("reader panicked");
	}
}

#[cfg_attr(test, test)]
pub(crate) fn test_no_lost_update_ordering() {
	inv_no_lost_update_ordering()
}

/// Invariant: Stale generations are never published over newer ones.
///
/// Racing publishers holding distinct tickets MUST leave the cell at the
/// highest ticket, whatever order they finish in.
pub(crate) fn inv_stale_generation_rejected() {
	let cell = Arc::new(SnapshotCell::<u64>::new());
	let tickets: Vec<_> = (0..16).map(|_| cell.issue()).collect();
	let newest = *tickets.iter().max().expect("tickets issued");

	let publishers: Vec<_> = tickets
		.into_iter()
		.rev()
		.map(|ticket| {
			let cell = Arc::clone(&cell);
			thread::spawn(move || cell.publish(ticket, ticket.get()).is_published())
		})
		.collect();
	for publisher in publishers {
		publisher.join().expect("publisher panicked");
	}

	assert_eq!(cell.generation(), Some(newest));
	assert_eq!(cell.get().as_deref().copied(), Some(newest.get()));

	let oldest = cell.issue();
	let newer = cell.issue();
	assert!(cell.publish(newer, 2).is_published());
	assert!(matches!(cell.publish(oldest, 1), Publish::Superseded { current } if current == newer));
}

#[cfg_attr(test, test)]
pub(crate) fn test_stale_generation_rejected() {
	inv_stale_generation_rejected()
}
