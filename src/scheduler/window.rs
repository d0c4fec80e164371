//! Per-endpoint quota windows.

use std::{collections::HashMap, sync::Mutex, time::Duration};

use tokio::time::Instant;

/// The quota-consumption period currently open for one endpoint.
#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Instant,
    request_count: u32,
}

impl Window {
    fn open() -> Self {
        Self { started_at: Instant::now(), request_count: 0 }
    }

    fn is_expired(&self, window_size: Duration) -> bool {
        self.started_at.elapsed() >= window_size
    }

    fn remaining(&self, window_size: Duration) -> Duration {
        window_size.saturating_sub(self.started_at.elapsed())
    }
}

/// Outcome of one slot-acquisition attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotAttempt {
    /// A slot was reserved; the caller may begin its operation.
    Acquired {
        /// The expired window was replaced before the slot was taken.
        window_was_reset: bool,
    },
    /// The window is full; the caller must wait out the remainder and try
    /// again.
    Exhausted {
        /// Time until the window turns over.
        resume_in: Duration,
    },
}

/// Store of per-endpoint windows.
///
/// Windows are created lazily on first use and replaced, never mutated in
/// place, on reset. The check-and-increment in [`try_acquire`] is one
/// critical section, so concurrent callers can never overshoot the limit;
/// the lock is never held across an await point.
///
/// [`try_acquire`]: Self::try_acquire
#[derive(Debug, Default)]
pub(crate) struct WindowStore {
    windows: Mutex<HashMap<String, Window>>,
}

impl WindowStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Attempts to reserve one request slot for the endpoint.
    pub(crate) fn try_acquire(
        &self,
        endpoint: &str,
        window_size: Duration,
        safe_limit: u32,
    ) -> SlotAttempt {
        let mut windows = self.windows.lock().expect("window store lock poisoned");
        let window = windows.entry(endpoint.to_string()).or_insert_with(Window::open);

        let mut window_was_reset = false;
        if window.is_expired(window_size) {
            *window = Window::open();
            window_was_reset = true;
        }

        if window.request_count < safe_limit {
            window.request_count += 1;
            SlotAttempt::Acquired { window_was_reset }
        } else {
            SlotAttempt::Exhausted { resume_in: window.remaining(window_size) }
        }
    }

    /// Replaces the endpoint's window with a fresh one. Used when the
    /// provider reports the quota as already spent.
    pub(crate) fn reset(&self, endpoint: &str) {
        let mut windows = self.windows.lock().expect("window store lock poisoned");
        windows.insert(endpoint.to_string(), Window::open());
    }

    #[cfg(test)]
    pub(crate) fn request_count(&self, endpoint: &str) -> Option<u32> {
        let windows = self.windows.lock().expect("window store lock poisoned");
        windows.get(endpoint).map(|w| w.request_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(60);

    #[tokio::test]
    async fn acquires_up_to_safe_limit() {
        let store = WindowStore::new();

        for _ in 0..3 {
            assert!(matches!(
                store.try_acquire("feed", WINDOW, 3),
                SlotAttempt::Acquired { window_was_reset: false }
            ));
        }
        assert!(matches!(
            store.try_acquire("feed", WINDOW, 3),
            SlotAttempt::Exhausted { .. }
        ));
        assert_eq!(store.request_count("feed"), Some(3));
    }

    #[tokio::test]
    async fn endpoints_are_accounted_independently() {
        let store = WindowStore::new();

        assert!(matches!(store.try_acquire("a", WINDOW, 1), SlotAttempt::Acquired { .. }));
        assert!(matches!(store.try_acquire("a", WINDOW, 1), SlotAttempt::Exhausted { .. }));
        assert!(matches!(store.try_acquire("b", WINDOW, 1), SlotAttempt::Acquired { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn expired_window_is_replaced_on_acquire() {
        let store = WindowStore::new();

        assert!(matches!(store.try_acquire("feed", WINDOW, 1), SlotAttempt::Acquired { .. }));
        tokio::time::advance(WINDOW).await;

        assert!(matches!(
            store.try_acquire("feed", WINDOW, 1),
            SlotAttempt::Acquired { window_was_reset: true }
        ));
        assert_eq!(store.request_count("feed"), Some(1));
    }

    #[tokio::test]
    async fn reset_clears_the_count() {
        let store = WindowStore::new();

        store.try_acquire("feed", WINDOW, 2);
        store.try_acquire("feed", WINDOW, 2);
        store.reset("feed");

        assert_eq!(store.request_count("feed"), Some(0));
        assert!(matches!(store.try_acquire("feed", WINDOW, 2), SlotAttempt::Acquired { .. }));
    }
}
