//! Cancellable live-query subscription handle.
//!
//! A live query is a standing query against the remote collection. The
//! adapter pushes a full snapshot of the result set on every change through a
//! [`LiveQueryFeed`]; the subscriber pulls snapshots from the paired
//! [`LiveQuery`] in arrival order.
//!
//! Cancellation is synchronous and idempotent. Once [`LiveQuery::cancel`]
//! returns, [`LiveQuery::next`] yields `None` and the feed reports the
//! subscriber as gone, even if snapshots were already buffered.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;

use super::HuntCollectionError;

type Event<T> = Result<T, HuntCollectionError>;
type Teardown = Box<dyn FnOnce() + Send>;

/// Subscriber half of a live query.
pub struct LiveQuery<T> {
    events: mpsc::UnboundedReceiver<Event<T>>,
    cancelled: Arc<AtomicBool>,
    teardown: Option<Teardown>,
}

/// Publisher half of a live query, held by the adapter.
pub struct LiveQueryFeed<T> {
    events: mpsc::UnboundedSender<Event<T>>,
    cancelled: Arc<AtomicBool>,
}

impl<T> LiveQuery<T> {
    /// Create a connected feed and subscription pair.
    ///
    /// # Examples
    /// ```
    /// use hunts::domain::ports::LiveQuery;
    ///
    /// let (feed, mut query) = LiveQuery::<u32>::channel();
    /// assert!(feed.publish(Ok(1)));
    /// query.cancel();
    /// assert!(!feed.publish(Ok(2)));
    /// ```
    #[must_use]
    pub fn channel() -> (LiveQueryFeed<T>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let feed = LiveQueryFeed {
            events: tx,
            cancelled: Arc::clone(&cancelled),
        };
        let query = Self {
            events: rx,
            cancelled,
            teardown: None,
        };
        (feed, query)
    }

    /// Register a callback run exactly once when the query is cancelled.
    #[must_use]
    pub fn with_teardown(mut self, teardown: impl FnOnce() + Send + 'static) -> Self {
        self.teardown = Some(Box::new(teardown));
        self
    }

    /// Wait for the next snapshot event.
    ///
    /// Returns `None` once the query is cancelled or the adapter has closed
    /// the feed.
    pub async fn next(&mut self) -> Option<Event<T>> {
        if self.is_cancelled() {
            return None;
        }
        let event = self.events.recv().await?;
        if self.is_cancelled() {
            return None;
        }
        Some(event)
    }

    /// Stop the subscription. Safe to call more than once.
    pub fn cancel(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.events.close();
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }

    /// Whether [`Self::cancel`] has run.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl<T> Drop for LiveQuery<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl<T> fmt::Debug for LiveQuery<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveQuery")
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<T> LiveQueryFeed<T> {
    /// Push a snapshot or error to the subscriber.
    ///
    /// Returns `false` when the subscriber has cancelled or gone away, in
    /// which case the adapter should drop the feed.
    pub fn publish(&self, event: Event<T>) -> bool {
        if self.cancelled.load(Ordering::SeqCst) {
            return false;
        }
        self.events.send(event).is_ok()
    }

    /// Whether the subscriber is still listening.
    pub fn is_active(&self) -> bool {
        !self.cancelled.load(Ordering::SeqCst) && !self.events.is_closed()
    }
}

impl<T> fmt::Debug for LiveQueryFeed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LiveQueryFeed")
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}
