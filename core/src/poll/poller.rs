use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::seq::RequestSeq;
use crate::error::ApiError;

/// Shortest period a poller will run at; smaller values are raised to this.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

pub type FetchFuture<T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send>>;
pub type FetchFn<T> = Arc<dyn Fn() -> FetchFuture<T> + Send + Sync>;

/// Box an async closure into a [`FetchFn`].
pub fn fetch_fn<T, F, Fut>(f: F) -> FetchFn<T>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
{
    Arc::new(move || Box::pin(f()) as FetchFuture<T>)
}

/// Counts a fetch as in flight until dropped, including on cancel or abort.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(count: &Arc<AtomicUsize>) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(count))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Initial,
    Interval,
    Manual,
}

#[derive(Debug)]
pub struct PollUpdate<T> {
    pub seq: u64,
    pub trigger: Trigger,
    pub result: Result<T, ApiError>,
}

/// Owns one page's poll loop. Dropping or cancelling it tears the loop down,
/// aborts in-flight fetches and discards anything that still resolves.
pub struct PollHandle<T> {
    token: CancellationToken,
    seq: Arc<RequestSeq>,
    in_flight: Arc<AtomicUsize>,
    fetch: FetchFn<T>,
    tx: mpsc::UnboundedSender<PollUpdate<T>>,
    join: Option<JoinHandle<()>>,
}

/// Start polling: fetch immediately, then once per `interval`.
///
/// A tick that comes due while the previous fetch is still running is
/// skipped, so at most one scheduled fetch is ever in flight. `interval` is
/// raised to [`MIN_POLL_INTERVAL`] if shorter.
pub fn spawn_poller<T: Send + 'static>(
    name: &'static str,
    interval: Duration,
    fetch: FetchFn<T>,
    tx: mpsc::UnboundedSender<PollUpdate<T>>,
) -> PollHandle<T> {
    let interval = interval.max(MIN_POLL_INTERVAL);
    let token = CancellationToken::new();
    let seq = Arc::new(RequestSeq::new());
    let in_flight = Arc::new(AtomicUsize::new(0));
    let join = tokio::spawn(poll_loop(
        name,
        interval,
        Arc::clone(&fetch),
        Arc::clone(&seq),
        Arc::clone(&in_flight),
        token.clone(),
        tx.clone(),
    ));
    tracing::debug!(target: "mission.poll", page = name, interval_ms = interval.as_millis() as u64, "poller mounted");
    PollHandle {
        token,
        seq,
        in_flight,
        fetch,
        tx,
        join: Some(join),
    }
}

async fn poll_loop<T: Send + 'static>(
    name: &'static str,
    interval: Duration,
    fetch: FetchFn<T>,
    seq: Arc<RequestSeq>,
    in_flight: Arc<AtomicUsize>,
    token: CancellationToken,
    tx: mpsc::UnboundedSender<PollUpdate<T>>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut trigger = Trigger::Initial;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let seq_no = seq.next();
        let started = Instant::now();
        let result = {
            let _busy = InFlight::enter(&in_flight);
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                res = fetch() => res,
            }
        };
        if token.is_cancelled() {
            break;
        }

        let elapsed = started.elapsed();
        if elapsed > interval {
            tracing::debug!(
                target: "mission.poll",
                page = name,
                seq = seq_no,
                elapsed_ms = elapsed.as_millis() as u64,
                "fetch outlived the interval; overlapping ticks skipped"
            );
        }
        if let Err(ref err) = result {
            tracing::warn!(target: "mission.poll", page = name, seq = seq_no, "refresh failed: {err}");
        }
        if tx
            .send(PollUpdate {
                seq: seq_no,
                trigger,
                result,
            })
            .is_err()
        {
            break;
        }
        trigger = Trigger::Interval;
    }
    tracing::debug!(target: "mission.poll", page = name, "poller stopped");
}

impl<T: Send + 'static> PollHandle<T> {
    /// Fetch once, outside the schedule, under a fresh sequence number.
    /// Always issues a request, even with another one pending.
    pub fn refresh_now(&self) -> u64 {
        let seq_no = self.seq.next();
        let token = self.token.child_token();
        let fetch = Arc::clone(&self.fetch);
        let tx = self.tx.clone();
        let busy = InFlight::enter(&self.in_flight);
        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                res = fetch() => res,
            };
            drop(busy);
            if token.is_cancelled() {
                return;
            }
            let _ = tx.send(PollUpdate {
                seq: seq_no,
                trigger: Trigger::Manual,
                result,
            });
        });
        seq_no
    }

    /// Like [`refresh_now`](Self::refresh_now), but does nothing while any
    /// fetch for this page is still pending.
    pub fn refresh_if_idle(&self) -> Option<u64> {
        if self.is_fetching() {
            return None;
        }
        Some(self.refresh_now())
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Unmount: stop the schedule and cancel every outstanding request.
    pub fn cancel(&mut self) {
        self.token.cancel();
        if let Some(join) = self.join.take() {
            join.abort();
        }
    }
}

impl<T> Drop for PollHandle<T> {
    fn drop(&mut self) {
        self.token.cancel();
        if let Some(join) = self.join.take() {
            join.abort();
        }
    }
}
