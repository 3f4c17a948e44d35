//! Live subscription primitive.
//!
//! A [`SnapshotFeed`] owns a background thread that watches one store
//! directory and re-runs a loader whenever its contents change. Every event
//! carries the **full current snapshot**, never a diff. Consumers hold the
//! feed as an explicit handle and must release it (`cancel()` or drop) to
//! stop the watcher; at most one feed should back a given view at a time.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::Result;

/// How often the watcher thread wakes to observe cancellation
const CANCEL_POLL_MS: u64 = 250;

/// One push from a live subscription
#[derive(Debug)]
pub enum FeedEvent<T> {
    /// The full current result set
    Snapshot(T),
    /// A load or watch failure; the feed stays alive
    Error(String),
}

/// Handle to a live subscription; dropping it releases the watcher
pub struct SnapshotFeed<T> {
    rx: Receiver<FeedEvent<T>>,
    canceled: Arc<AtomicBool>,
}

impl<T> SnapshotFeed<T> {
    /// Wait up to `timeout` for the next event
    pub fn recv_timeout(&self, timeout: Duration) -> Option<FeedEvent<T>> {
        self.rx.recv_timeout(timeout).ok()
    }

    /// Drain one event without blocking
    pub fn try_recv(&self) -> Option<FeedEvent<T>> {
        self.rx.try_recv().ok()
    }

    /// Release the subscription explicitly
    pub fn cancel(self) {}
}

impl<T> Drop for SnapshotFeed<T> {
    fn drop(&mut self) {
        self.canceled.store(true, Ordering::Relaxed);
    }
}

/// Spawn a feed over `dir`: an immediate initial snapshot, then one
/// snapshot per debounced batch of filesystem changes.
pub fn spawn_feed<T, F>(dir: PathBuf, debounce: Duration, mut load: F) -> Result<SnapshotFeed<T>>
where
    T: Send + 'static,
    F: FnMut() -> Result<T> + Send + 'static,
{
    std::fs::create_dir_all(&dir)?;

    // Arm the watch before the first load so changes racing the initial
    // snapshot still produce a follow-up event. A watch that cannot be
    // opened fails the subscription outright.
    let (event_tx, event_rx) = mpsc::channel();
    let mut watcher: RecommendedWatcher = notify::recommended_watcher(move |res| {
        let _ = event_tx.send(res);
    })?;
    watcher.watch(&dir, RecursiveMode::NonRecursive)?;

    let (tx, rx) = mpsc::channel();
    let canceled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&canceled);

    thread::spawn(move || {
        // The watcher lives exactly as long as the feed thread.
        let _watcher = watcher;

        if send_snapshot(&tx, &mut load).is_err() {
            return;
        }

        let cancel_poll = Duration::from_millis(CANCEL_POLL_MS);
        let mut pending: Option<Instant> = None;

        loop {
            if flag.load(Ordering::Relaxed) {
                break;
            }
            let timeout = pending
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(cancel_poll);
            match event_rx.recv_timeout(timeout) {
                Ok(Ok(_)) => {
                    pending = Some(Instant::now() + debounce);
                }
                Ok(Err(err)) => {
                    let _ = tx.send(FeedEvent::Error(err.to_string()));
                }
                Err(RecvTimeoutError::Timeout) => {
                    if pending.is_some() {
                        pending = None;
                        if send_snapshot(&tx, &mut load).is_err() {
                            break;
                        }
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    });

    Ok(SnapshotFeed { rx, canceled })
}

fn send_snapshot<T, F>(
    tx: &Sender<FeedEvent<T>>,
    load: &mut F,
) -> std::result::Result<(), mpsc::SendError<FeedEvent<T>>>
where
    F: FnMut() -> Result<T>,
{
    match load() {
        Ok(snapshot) => tx.send(FeedEvent::Snapshot(snapshot)),
        Err(err) => tx.send(FeedEvent::Error(err.to_string())),
    }
}
