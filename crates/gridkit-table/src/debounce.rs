//! Debounced intents
//!
//! A `Debouncer` delivers an intent to its sink after a delay unless it is
//! cancelled or replaced first. `ClickDisambiguator` builds click vs
//! double-click detection on top of it. Neither knows anything about input
//! events; callers feed them keys and intents.
//!
//! Both need a tokio runtime when scheduling.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

pub struct Debouncer<I> {
    sink: UnboundedSender<I>,
    pending: Option<JoinHandle<()>>,
}

impl<I> Debouncer<I> {
    /// Drop the scheduled intent, if any; returns whether one was still waiting
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let live = !handle.is_finished();
                handle.abort();
                live
            }
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<I: Send + 'static> Debouncer<I> {
    pub fn new(sink: UnboundedSender<I>) -> Self {
        Self {
            sink,
            pending: None,
        }
    }

    /// Deliver `intent` after `window`, replacing anything already scheduled
    ///
    /// # Panics
    ///
    /// Panics outside a tokio runtime.
    pub fn schedule(&mut self, intent: I, window: Duration) {
        self.cancel();
        let sink = self.sink.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            // receiver gone means the grid was torn down
            let _ = sink.send(intent);
        }));
    }
}

impl<I> Drop for Debouncer<I> {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<I> std::fmt::Debug for Debouncer<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Debouncer")
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// Result of feeding one click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Click {
    /// Single-click intent scheduled
    Single,
    /// Second click on the same key inside the window
    Double,
}

/// Tells a single click from a double click on the same key
///
/// A click schedules its single-click intent. A second click on the same key
/// while that intent is still pending cancels it and reports `Double`. A click
/// on a different key replaces the pending intent.
pub struct ClickDisambiguator<K, I> {
    window: Duration,
    debouncer: Debouncer<I>,
    pending_key: Option<K>,
}

impl<K: PartialEq, I: Send + 'static> ClickDisambiguator<K, I> {
    pub fn new(window: Duration, sink: UnboundedSender<I>) -> Self {
        Self {
            window,
            debouncer: Debouncer::new(sink),
            pending_key: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn click(&mut self, key: K, intent: I) -> Click {
        if self.debouncer.is_pending() && self.pending_key.as_ref() == Some(&key) {
            self.debouncer.cancel();
            self.pending_key = None;
            return Click::Double;
        }

        self.debouncer.schedule(intent, self.window);
        self.pending_key = Some(key);
        Click::Single
    }

    /// A native double-click event arrived; drop any pending single click
    pub fn double_click(&mut self) -> bool {
        self.pending_key = None;
        self.debouncer.cancel()
    }

    pub fn cancel(&mut self) -> bool {
        self.pending_key = None;
        self.debouncer.cancel()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }
}

impl<K, I> std::fmt::Debug for ClickDisambiguator<K, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClickDisambiguator")
            .field("window", &self.window)
            .field("debouncer", &self.debouncer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    const WINDOW: Duration = Duration::from_millis(200);

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_keeps_only_latest_intent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(tx);

        debouncer.schedule("first", WINDOW);
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.schedule("second", WINDOW);
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(rx.try_recv().is_err());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(rx.try_recv().ok(), Some("second"));
        assert!(rx.try_recv().is_err());
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_drop_cancels_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut debouncer = Debouncer::new(tx);
        debouncer.schedule(1, WINDOW);
        drop(debouncer);

        tokio::time::sleep(WINDOW * 2).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_click_within_window_is_double() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut clicks = ClickDisambiguator::new(WINDOW, tx);

        assert_eq!(clicks.click(7, "row 7 clicked"), Click::Single);
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(clicks.click(7, "row 7 clicked"), Click::Double);

        tokio::time::sleep(WINDOW * 2).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_after_window_is_single() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut clicks = ClickDisambiguator::new(WINDOW, tx);

        clicks.click(1, 1);
        tokio::time::sleep(WINDOW + Duration::from_millis(10)).await;
        assert_eq!(rx.try_recv().ok(), Some(1));

        assert_eq!(clicks.click(1, 2), Click::Single);
    }

    #[tokio::test(start_paused = true)]
    async fn test_click_on_other_row_replaces_pending() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut clicks = ClickDisambiguator::new(WINDOW, tx);

        clicks.click(1, "one");
        assert_eq!(clicks.click(2, "two"), Click::Single);

        tokio::time::sleep(WINDOW * 2).await;
        assert_eq!(rx.try_recv().ok(), Some("two"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_native_double_click_cancels_pending() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut clicks = ClickDisambiguator::new(WINDOW, tx);

        clicks.click(1, "one");
        assert!(clicks.double_click());
        assert!(!clicks.is_pending());

        tokio::time::sleep(WINDOW * 2).await;
        assert!(rx.try_recv().is_err());
    }
}
