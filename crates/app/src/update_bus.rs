//! In-process multicast bus backed by a tokio broadcast channel.

use std::pin::Pin;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll, ready};

use tokio::sync::broadcast;
use tokio_stream::Stream;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

/// Fan-out of updates to any number of independent subscribers.
///
/// Publishing succeeds even when there are no active subscribers (the update
/// is simply dropped). Subscribers only see updates published *after* they
/// subscribed. Once [`close`](Self::close)d, publishing is a no-op and every
/// subscriber's stream ends after draining what it already received.
pub struct UpdateBus<T> {
    sender: Mutex<Option<broadcast::Sender<T>>>,
}

impl<T> UpdateBus<T> {
    fn sender(&self) -> MutexGuard<'_, Option<broadcast::Sender<T>>> {
        self.sender.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Close the bus, terminating every subscriber.
    ///
    /// Returns `false` if it was already closed.
    pub fn close(&self) -> bool {
        self.sender().take().is_some()
    }
}

impl<T: Clone + Send + 'static> UpdateBus<T> {
    /// Create a new bus; each subscriber can lag `capacity` updates behind.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Mutex::new(Some(sender)),
        }
    }

    /// Deliver an update to every current subscriber.
    ///
    /// Returns how many subscribers received it.
    pub fn publish(&self, update: T) -> usize {
        // send only fails when nobody is subscribed: zero deliveries.
        self.sender()
            .as_ref()
            .map_or(0, |sender| sender.send(update).unwrap_or(0))
    }

    /// Subscribe to updates on this bus.
    ///
    /// After [`close`](Self::close) the returned receiver is already
    /// terminated.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        if let Some(sender) = self.sender().as_ref() {
            return sender.subscribe();
        }
        let (sender, receiver) = broadcast::channel(1);
        drop(sender);
        receiver
    }

    /// Subscribe and wrap the receiver as an [`UpdateStream`].
    #[must_use]
    pub fn stream(&self) -> UpdateStream<T> {
        UpdateStream {
            inner: BroadcastStream::new(self.subscribe()),
        }
    }
}

/// One subscriber's view of an [`UpdateBus`].
///
/// A subscriber that falls more than the bus capacity behind skips the
/// oldest updates; the gap is logged and the stream carries on. The stream
/// ends when the bus is closed.
pub struct UpdateStream<T> {
    inner: BroadcastStream<T>,
}

impl<T: Clone + Send + 'static> Stream for UpdateStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        loop {
            match ready!(Pin::new(&mut self.inner).poll_next(cx)) {
                Some(Ok(update)) => return Poll::Ready(Some(update)),
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    tracing::warn!(skipped, "update subscriber lagged, some updates were dropped");
                }
                None => return Poll::Ready(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};
    use tokio_stream::StreamExt as _;

    #[tokio::test]
    async fn should_deliver_update_to_subscriber() {
        let bus = UpdateBus::new(16);
        let mut rx = bus.subscribe();

        assert_eq!(bus.publish("fix"), 1);

        assert_eq!(rx.recv().await.unwrap(), "fix");
    }

    #[tokio::test]
    async fn should_deliver_update_to_multiple_subscribers_in_order() {
        let bus = UpdateBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(1);
        bus.publish(2);

        assert_eq!(rx1.recv().await.unwrap(), 1);
        assert_eq!(rx1.recv().await.unwrap(), 2);
        assert_eq!(rx2.recv().await.unwrap(), 1);
        assert_eq!(rx2.recv().await.unwrap(), 2);
        assert_eq!(rx1.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn should_succeed_when_no_subscribers() {
        let bus = UpdateBus::new(16);
        assert_eq!(bus.publish(42), 0);
    }

    #[tokio::test]
    async fn should_not_deliver_updates_published_before_subscription() {
        let bus = UpdateBus::new(16);
        bus.publish("early");

        let mut rx = bus.subscribe();
        bus.publish("later");

        assert_eq!(rx.recv().await.unwrap(), "later");
    }

    #[tokio::test]
    async fn should_keep_other_subscribers_when_one_is_dropped() {
        let bus = UpdateBus::new(16);
        let rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        drop(rx1);

        assert_eq!(bus.publish(7), 1);
        assert_eq!(rx2.recv().await.unwrap(), 7);
    }

    #[tokio::test]
    async fn should_terminate_subscribers_on_close_after_draining() {
        let bus = UpdateBus::new(16);
        let mut rx = bus.subscribe();
        bus.publish(1);

        assert!(bus.close());
        assert!(!bus.close());

        assert_eq!(rx.recv().await.unwrap(), 1);
        assert_eq!(rx.recv().await, Err(RecvError::Closed));
    }

    #[tokio::test]
    async fn should_ignore_publish_and_end_new_streams_after_close() {
        let bus = UpdateBus::new(16);
        bus.close();

        assert_eq!(bus.publish(1), 0);
        let mut stream = bus.stream();
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn should_skip_lag_notifications_in_stream() {
        let bus = UpdateBus::new(2);
        let stream = bus.stream();

        for n in 0..5 {
            bus.publish(n);
        }
        bus.close();

        let received: Vec<i32> = stream.collect().await;
        assert_eq!(received, vec![3, 4]);
    }
}
