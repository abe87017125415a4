//! Shared worker primitives for emote fetching.
//!
//! Network requests run as background tasks and payload parsing runs on the
//! blocking pool, so neither ever executes on a thread that renders. Callers
//! without an ambient tokio runtime (a UI thread, a plain test) are served by
//! a lazily built global runtime.

mod class;
mod spawn;

pub use class::TaskClass;
pub use spawn::{FALLBACK_THREAD_NAME, spawn, spawn_blocking};
