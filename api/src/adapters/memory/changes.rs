//! Per-collection change feed backing the real-time document listeners

use futures::stream::{self, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::domain::ports::repositories::DocumentStream;
use crate::error::DomainError;

const FEED_CAPACITY: usize = 256;

/// Broadcasts `(document id, new snapshot)` after every write to a collection
pub struct ChangeFeed<K, V> {
    sender: broadcast::Sender<(K, Option<V>)>,
}

impl<K, V> Default for ChangeFeed<K, V>
where
    K: Clone,
    V: Clone,
{
    fn default() -> Self {
        let (sender, _) = broadcast::channel(FEED_CAPACITY);
        Self { sender }
    }
}

impl<K, V> ChangeFeed<K, V>
where
    K: Clone + PartialEq + Send + Sync + std::fmt::Display + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub fn publish(&self, id: K, snapshot: Option<V>) {
        // No receivers is fine: nobody is listening
        let _ = self.sender.send((id, snapshot));
    }

    /// Stream the current snapshot of `id`, then every later change to it.
    ///
    /// The receiver is attached before `current` is read, so no write can fall
    /// between the snapshot and the first change.
    pub fn watch<F>(&self, id: K, current: F) -> DocumentStream<V>
    where
        F: FnOnce() -> Result<Option<V>, DomainError>,
    {
        let receiver = self.sender.subscribe();
        let initial = current();

        let changes = stream::unfold((receiver, id), |(mut receiver, id)| async move {
            loop {
                match receiver.recv().await {
                    Ok((changed, snapshot)) if changed == id => {
                        return Some((Ok(snapshot), (receiver, id)));
                    }
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        let err = DomainError::Internal(format!(
                            "listener on {} lagged behind by {} changes",
                            id, skipped
                        ));
                        return Some((Err(err), (receiver, id)));
                    }
                    Err(RecvError::Closed) => return None,
                }
            }
        });

        stream::once(async move { initial }).chain(changes).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn emits_snapshot_then_matching_changes() {
        let feed: ChangeFeed<String, u32> = ChangeFeed::default();
        let mut stream = feed.watch("a".to_string(), || Ok(Some(1)));

        feed.publish("b".to_string(), Some(99));
        feed.publish("a".to_string(), Some(2));
        feed.publish("a".to_string(), None);

        assert_eq!(stream.next().await.unwrap().unwrap(), Some(1));
        assert_eq!(stream.next().await.unwrap().unwrap(), Some(2));
        assert_eq!(stream.next().await.unwrap().unwrap(), None);
    }

    #[tokio::test]
    async fn stream_ends_when_feed_is_dropped() {
        let feed: ChangeFeed<String, u32> = ChangeFeed::default();
        let mut stream = feed.watch("a".to_string(), || Ok(None));
        drop(feed);

        assert_eq!(stream.next().await.unwrap().unwrap(), None);
        assert!(stream.next().await.is_none());
    }
}
