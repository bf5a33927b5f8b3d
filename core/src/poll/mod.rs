//! Per-page refresh loop.
//!
//! Each page owns a [`PollHandle`]: an immediate fetch, then one per interval,
//! skipping ticks while a fetch is pending. Responses carry a sequence number
//! so a page can drop any that resolve after a newer one was applied.

mod poller;
mod seq;

pub use poller::{
    fetch_fn, spawn_poller, FetchFn, FetchFuture, PollHandle, PollUpdate, Trigger,
    MIN_POLL_INTERVAL,
};
pub use seq::{Freshness, RequestSeq};
