//! Cancellation handshake between a controller and its workers.
//!
//! genstats runs its write loop in a background worker while the controller
//! waits for an interrupt. When the interrupt arrives the controller must tell
//! the worker to stop and then wait until the worker has finished reporting
//! before the process exits.
//!
//! The mechanism has two halves, a `Broadcaster` and a `Watcher`. The
//! `Broadcaster` raises the stop flag exactly once. The `Watcher` polls that
//! flag without blocking, which keeps the check cheap enough to run on every
//! iteration of a hot loop, and acknowledges completion when it is dropped.

#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::pedantic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]
#![deny(clippy::unwrap_used)]
#![deny(unused_extern_crates)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![allow(clippy::multiple_crate_versions)]

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU32, Ordering},
};

use tokio::sync::Notify;
use tracing::info;

#[derive(Debug)]
struct Shared {
    /// Set once by the `Broadcaster`, never cleared.
    stopped: AtomicBool,
    /// Number of `Watcher` instances that have not yet acknowledged.
    peers: AtomicU32,
    /// Wakes `Broadcaster::signal_and_wait` when a peer acknowledges.
    notify: Notify,
}

/// Construct a `Watcher` and `Broadcaster` pair.
#[must_use]
pub fn signal() -> (Watcher, Broadcaster) {
    let shared = Arc::new(Shared {
        stopped: AtomicBool::new(false),
        peers: AtomicU32::new(1),
        notify: Notify::new(),
    });

    let w = Watcher {
        shared: Arc::clone(&shared),
        signal_received: false,
        acknowledged: false,
    };
    let b = Broadcaster { shared };

    (w, b)
}

#[derive(Debug)]
/// Raises the stop flag for one or more `Watcher` instances.
pub struct Broadcaster {
    shared: Arc<Shared>,
}

impl Broadcaster {
    /// Raise the stop flag.
    ///
    /// Function will NOT block until all peers have acknowledged.
    pub fn signal(self) {
        self.shared.stopped.store(true, Ordering::Release);
    }

    /// Raise the stop flag.
    ///
    /// Function WILL block until all peers have acknowledged, that is, until
    /// every `Watcher` has been dropped.
    pub async fn signal_and_wait(self) {
        self.shared.stopped.store(true, Ordering::Release);

        // Register for notification before reading the peer count. A peer
        // that acknowledges between the read and the await would otherwise
        // be missed and we would hang forever.
        loop {
            let notified = self.shared.notify.notified();

            let peers = self.shared.peers.load(Ordering::SeqCst);
            if peers == 0 {
                break;
            }
            info!("Waiting for {peers} peers");

            notified.await;
        }
    }
}

#[derive(Debug)]
/// Observes the stop flag and acknowledges completion on drop.
pub struct Watcher {
    shared: Arc<Shared>,
    /// Local copy of the flag so repeat polls skip the atomic load.
    signal_received: bool,
    acknowledged: bool,
}

impl Watcher {
    /// Check whether the stop flag has been raised, without blocking.
    ///
    /// Once this returns `true` it returns `true` forever.
    #[inline]
    pub fn try_recv(&mut self) -> bool {
        if self.signal_received {
            return true;
        }
        if self.shared.stopped.load(Ordering::Acquire) {
            self.signal_received = true;
        }
        self.signal_received
    }

    /// Acknowledge completion, releasing a `Broadcaster` waiting in
    /// `signal_and_wait`. Equivalent to dropping the `Watcher`.
    pub fn acknowledge(self) {
        drop(self);
    }

    fn decrease_peer_count(&mut self) {
        if self.acknowledged {
            return;
        }

        // fetch_sub would wrap at zero, leaving the count at u32::MAX.
        let mut old = self.shared.peers.load(Ordering::Relaxed);
        while old > 0 {
            match self.shared.peers.compare_exchange_weak(
                old,
                old - 1,
                Ordering::SeqCst,
                Ordering::Relaxed,
            ) {
                Ok(_) => {
                    self.shared.notify.notify_waiters();
                    break;
                }
                Err(x) => old = x,
            }
        }
        self.acknowledged = true;
    }
}

impl Drop for Watcher {
    fn drop(&mut self) {
        self.decrease_peer_count();
    }
}
