//! Spawning onto the caller's runtime, or a shared fallback outside of one.

use std::future::Future;
use std::sync::OnceLock;

use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;

use crate::TaskClass;

/// Thread name of the fallback runtime's workers.
pub const FALLBACK_THREAD_NAME: &str = "emote-fetch";

const FALLBACK_WORKERS: usize = 2;

static FALLBACK: OnceLock<Runtime> = OnceLock::new();

/// The ambient runtime if there is one; otherwise the fallback runtime, built
/// on first use and kept for the life of the process.
fn target() -> (Handle, bool) {
	match Handle::try_current() {
		Ok(handle) => (handle, false),
		Err(_) => (fallback().handle().clone(), true),
	}
}

fn fallback() -> &'static Runtime {
	FALLBACK.get_or_init(|| {
		Builder::new_multi_thread()
			.worker_threads(FALLBACK_WORKERS)
			.thread_name(FALLBACK_THREAD_NAME)
			.enable_all()
			.build()
			.expect("failed to build emote fetch runtime")
	})
}

/// Spawns an async task of the given class.
///
/// CPU-bound work must go through [`spawn_blocking`] instead.
pub fn spawn<F>(class: TaskClass, fut: F) -> JoinHandle<F::Output>
where
	F: Future + Send + 'static,
	F::Output: Send + 'static,
{
	debug_assert_ne!(class, TaskClass::CpuBlocking, "cpu-bound work must use spawn_blocking");
	let (handle, fallback) = target();
	tracing::trace!(worker_class = class.as_str(), fallback, "worker.spawn");
	handle.spawn(fut)
}

/// Runs `f` on the blocking pool so it never stalls an async worker.
pub fn spawn_blocking<F, R>(class: TaskClass, f: F) -> JoinHandle<R>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	let (handle, fallback) = target();
	tracing::trace!(worker_class = class.as_str(), fallback, "worker.spawn_blocking");
	handle.spawn_blocking(f)
}
