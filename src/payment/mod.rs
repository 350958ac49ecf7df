//! Payment rendezvous.
//!
//! A plan selection opens a short-lived, time-boxed wait for the first of
//! three competing events: payment screenshot, cancel press, or timeout.
//! The registry here is the only per-user mutable state held in process
//! memory; it is not persisted, so a restart abandons in-flight waits
//! (acceptable - the window is five minutes).
//!
//! Entries are keyed by a unique token, not just the user id: if the same
//! user double-taps into two concurrent flows, each flow owns exactly one
//! entry, and a terminal event tears down only its own.

mod rendezvous;

pub use rendezvous::run_rendezvous;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use teloxide::types::MessageId;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tracing::debug;

/// How long a pending payment waits for a screenshot or cancel.
pub const PAYMENT_WINDOW: Duration = Duration::from_secs(300);

/// Event delivered into a waiting rendezvous.
#[derive(Debug)]
pub enum Signal {
    /// The user sent a photo; carries the screenshot message id.
    Screenshot(MessageId),
    /// The user pressed Cancel.
    Cancel,
}

/// Terminal outcome of one rendezvous.
#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Screenshot(MessageId),
    Cancelled,
    TimedOut,
}

struct Entry {
    token: u64,
    tx: mpsc::Sender<Signal>,
}

/// Registry of live pending payments.
pub struct PendingPayments {
    entries: DashMap<i64, Vec<Entry>>,
    next_token: AtomicU64,
}

impl PendingPayments {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            next_token: AtomicU64::new(0),
        }
    }

    /// Register a new rendezvous for a user.
    ///
    /// Returns the signal receiver and a guard that deregisters this entry
    /// (and only this entry) when dropped - on every exit path, including
    /// task cancellation.
    pub fn register(self: &Arc<Self>, user_id: i64) -> (RendezvousGuard, mpsc::Receiver<Signal>) {
        let token = self.next_token.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(1);

        self.entries
            .entry(user_id)
            .or_default()
            .push(Entry { token, tx });
        debug!("Registered pending payment {} for user {}", token, user_id);

        let guard = RendezvousGuard {
            registry: Arc::clone(self),
            user_id,
            token,
        };
        (guard, rx)
    }

    fn deregister(&self, user_id: i64, token: u64) {
        if let Some(mut entries) = self.entries.get_mut(&user_id) {
            entries.retain(|e| e.token != token);
        }
        self.entries.remove_if(&user_id, |_, v| v.is_empty());
        debug!("Deregistered pending payment {} for user {}", token, user_id);
    }

    /// Whether the user currently has any rendezvous waiting.
    pub fn has_pending(&self, user_id: i64) -> bool {
        self.entries
            .get(&user_id)
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }

    /// Deliver a screenshot to the user's oldest live rendezvous.
    /// Returns false when nothing was waiting.
    pub fn notify_screenshot(&self, user_id: i64, message_id: MessageId) -> bool {
        self.notify(user_id, Signal::Screenshot(message_id))
    }

    /// Deliver a cancel press to the user's oldest live rendezvous.
    pub fn notify_cancel(&self, user_id: i64) -> bool {
        self.notify(user_id, Signal::Cancel)
    }

    fn notify(&self, user_id: i64, signal: Signal) -> bool {
        let Some(entries) = self.entries.get(&user_id) else {
            return false;
        };
        match entries.first() {
            Some(entry) => {
                // A full channel means a terminal signal is already queued
                // for this entry; the late one is a no-op, not an error.
                let _ = entry.tx.try_send(signal);
                true
            }
            None => false,
        }
    }
}

impl Default for PendingPayments {
    fn default() -> Self {
        Self::new()
    }
}

/// Deregisters one rendezvous entry on drop.
pub struct RendezvousGuard {
    registry: Arc<PendingPayments>,
    user_id: i64,
    token: u64,
}

impl Drop for RendezvousGuard {
    fn drop(&mut self) {
        self.registry.deregister(self.user_id, self.token);
    }
}

/// Wait for the first terminal event: a signal or the window elapsing.
pub async fn await_outcome(rx: &mut mpsc::Receiver<Signal>, window: Duration) -> Outcome {
    tokio::select! {
        signal = rx.recv() => match signal {
            Some(Signal::Screenshot(id)) => Outcome::Screenshot(id),
            // A closed channel only happens when the registry entry is
            // gone; treat it like a cancel so the wait still terminates.
            Some(Signal::Cancel) | None => Outcome::Cancelled,
        },
        _ = sleep(window) => Outcome::TimedOut,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_terminal() {
        let registry = Arc::new(PendingPayments::new());
        let (_guard, mut rx) = registry.register(1);

        let outcome = await_outcome(&mut rx, PAYMENT_WINDOW).await;
        assert_eq!(outcome, Outcome::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn test_screenshot_beats_timeout() {
        let registry = Arc::new(PendingPayments::new());
        let (_guard, mut rx) = registry.register(1);

        assert!(registry.notify_screenshot(1, MessageId(99)));
        let outcome = await_outcome(&mut rx, PAYMENT_WINDOW).await;
        assert_eq!(outcome, Outcome::Screenshot(MessageId(99)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_terminal_event_wins() {
        let registry = Arc::new(PendingPayments::new());
        let (guard, mut rx) = registry.register(1);

        // Fire both competing signals; only the first is observable.
        registry.notify_screenshot(1, MessageId(5));
        registry.notify_cancel(1);

        let outcome = await_outcome(&mut rx, PAYMENT_WINDOW).await;
        assert_eq!(outcome, Outcome::Screenshot(MessageId(5)));

        // After the terminal outcome the guard tears the entry down and
        // later signals find nothing to fire on.
        drop(guard);
        assert!(!registry.notify_cancel(1));
        assert!(!registry.notify_screenshot(1, MessageId(6)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_flows_do_not_cross_talk() {
        let registry = Arc::new(PendingPayments::new());
        let (guard_a, mut rx_a) = registry.register(1);
        let (_guard_b, mut rx_b) = registry.register(1);

        // Signals route to the oldest flow.
        registry.notify_cancel(1);
        let outcome_a = await_outcome(&mut rx_a, PAYMENT_WINDOW).await;
        assert_eq!(outcome_a, Outcome::Cancelled);
        drop(guard_a);

        // The surviving flow is untouched and still reachable.
        assert!(registry.has_pending(1));
        registry.notify_screenshot(1, MessageId(7));
        let outcome_b = await_outcome(&mut rx_b, PAYMENT_WINDOW).await;
        assert_eq!(outcome_b, Outcome::Screenshot(MessageId(7)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_guard_deregisters_only_its_own_entry() {
        let registry = Arc::new(PendingPayments::new());
        let (guard_a, _rx_a) = registry.register(1);
        let (guard_b, _rx_b) = registry.register(1);

        drop(guard_a);
        assert!(registry.has_pending(1));
        drop(guard_b);
        assert!(!registry.has_pending(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_detached_wait_receives_signal() {
        // The wait runs in its own task while other handlers deliver the
        // signal through the registry; it must resolve well inside the
        // window instead of draining it.
        let registry = Arc::new(PendingPayments::new());
        let (guard, mut rx) = registry.register(1);

        let waiter = tokio::spawn(async move {
            let outcome = await_outcome(&mut rx, PAYMENT_WINDOW).await;
            drop(guard);
            outcome
        });

        tokio::task::yield_now().await;
        assert!(registry.notify_screenshot(1, MessageId(42)));
        assert_eq!(waiter.await.unwrap(), Outcome::Screenshot(MessageId(42)));
        assert!(!registry.has_pending(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_before_wait_is_buffered() {
        // Registration precedes the prompt, so a cancel can land before
        // the wait starts; the channel buffers it.
        let registry = Arc::new(PendingPayments::new());
        let (_guard, mut rx) = registry.register(1);

        assert!(registry.notify_cancel(1));
        assert_eq!(await_outcome(&mut rx, PAYMENT_WINDOW).await, Outcome::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_users_are_isolated() {
        let registry = Arc::new(PendingPayments::new());
        let (_guard, mut rx) = registry.register(1);

        assert!(!registry.notify_cancel(2));
        registry.notify_cancel(1);
        assert_eq!(await_outcome(&mut rx, PAYMENT_WINDOW).await, Outcome::Cancelled);
    }
}
