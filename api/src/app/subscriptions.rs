//! Shared real-time listeners
//!
//! A reference-counted registry keyed by entity id. The first subscriber for a
//! key opens one backend listener and every later subscriber attaches to the
//! same broadcast channel. When the last `Subscription` is dropped the listener
//! task is aborted and the entry removed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use futures::StreamExt;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

use crate::domain::ports::repositories::DocumentStream;
use crate::error::DomainError;

const CHANNEL_CAPACITY: usize = 64;

type Update<V> = Result<Option<V>, DomainError>;

/// `None` until the listener delivered its first snapshot
type Latest<V> = Arc<Mutex<Option<Option<V>>>>;

struct Entry<V> {
    /// Dropped once the backend stream ends, which closes every receiver
    sender: Option<broadcast::Sender<Update<V>>>,
    latest: Latest<V>,
    observers: usize,
    task: JoinHandle<()>,
}

type Entries<V> = Arc<Mutex<HashMap<String, Entry<V>>>>;

pub struct SubscriptionRegistry<V> {
    entries: Entries<V>,
}

impl<V> Default for SubscriptionRegistry<V> {
    fn default() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl<V> Clone for SubscriptionRegistry<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<V> SubscriptionRegistry<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to the listener for `key`, opening it with `open` if none is running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn subscribe<F>(&self, key: &str, open: F) -> Subscription<V>
    where
        F: FnOnce() -> DocumentStream<V>,
    {
        let mut entries = lock(&self.entries);

        if let Some(entry) = entries.get_mut(key) {
            if let Some(sender) = &entry.sender {
                entry.observers += 1;
                let receiver = sender.subscribe();
                let pending = lock(&entry.latest).clone();
                tracing::debug!(key, observers = entry.observers, "Reusing listener");
                return Subscription {
                    key: key.to_string(),
                    entries: self.entries.clone(),
                    latest: entry.latest.clone(),
                    receiver,
                    pending,
                };
            }
        }

        let (sender, receiver) = broadcast::channel(CHANNEL_CAPACITY);
        let latest: Latest<V> = Arc::new(Mutex::new(None));
        let task = spawn_listener(
            key.to_string(),
            open(),
            sender.clone(),
            latest.clone(),
            self.entries.clone(),
        );

        // A finished listener for this key is replaced; its observers keep counting
        let observers = entries.get(key).map_or(0, |e| e.observers) + 1;
        entries.insert(
            key.to_string(),
            Entry {
                sender: Some(sender),
                latest: latest.clone(),
                observers,
                task,
            },
        );
        tracing::debug!(key, "Opened listener");

        Subscription {
            key: key.to_string(),
            entries: self.entries.clone(),
            latest,
            receiver,
            pending: None,
        }
    }

    /// Number of listener tasks currently registered
    pub fn active_listeners(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn observer_count(&self, key: &str) -> usize {
        lock(&self.entries).get(key).map_or(0, |e| e.observers)
    }
}

fn spawn_listener<V>(
    key: String,
    mut stream: DocumentStream<V>,
    sender: broadcast::Sender<Update<V>>,
    latest: Latest<V>,
    entries: Entries<V>,
) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    tokio::spawn(async move {
        while let Some(update) = stream.next().await {
            match &update {
                Ok(snapshot) => *lock(&latest) = Some(snapshot.clone()),
                Err(e) => tracing::warn!(key = %key, error = %e, "Listener error"),
            }
            // No receivers only happens between the last drop and the abort
            let _ = sender.send(update);
        }

        drop(sender);
        if let Some(entry) = lock(&entries).get_mut(&key) {
            entry.sender = None;
        }
        tracing::debug!(key = %key, "Listener stream ended");
    })
}

/// One observer of a shared listener
pub struct Subscription<V> {
    key: String,
    entries: Entries<V>,
    latest: Latest<V>,
    receiver: broadcast::Receiver<Update<V>>,
    /// Snapshot cached before this observer attached, delivered first
    pending: Option<Option<V>>,
}

impl<V: Clone> Subscription<V> {
    /// Next update, or `None` once the listener has ended.
    ///
    /// A lagging observer skips the missed updates; the next one received is
    /// always a full snapshot.
    pub async fn recv(&mut self) -> Option<Update<V>> {
        if let Some(snapshot) = self.pending.take() {
            return Some(Ok(snapshot));
        }
        loop {
            match self.receiver.recv().await {
                Ok(update) => return Some(update),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(key = %self.key, skipped, "Observer lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Last snapshot delivered by the listener, if any
    pub fn current(&self) -> Option<V> {
        lock(&self.latest).clone().flatten()
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<V> Drop for Subscription<V> {
    fn drop(&mut self) {
        let mut entries = lock(&self.entries);
        let last = match entries.get_mut(&self.key) {
            Some(entry) => {
                entry.observers = entry.observers.saturating_sub(1);
                entry.observers == 0
            }
            None => false,
        };
        if last {
            if let Some(entry) = entries.remove(&self.key) {
                entry.task.abort();
                tracing::debug!(key = %self.key, "Closed listener");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use futures::channel::mpsc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn manual() -> (mpsc::UnboundedSender<Update<u32>>, DocumentStream<u32>) {
        let (tx, rx) = mpsc::unbounded();
        (tx, rx.boxed())
    }

    #[tokio::test]
    async fn one_listener_is_shared() {
        let registry: SubscriptionRegistry<u32> = SubscriptionRegistry::new();
        let opened = Arc::new(AtomicUsize::new(0));
        let (tx, feed) = manual();

        let mut first = {
            let opened = opened.clone();
            registry.subscribe("club", move || {
                opened.fetch_add(1, Ordering::SeqCst);
                feed
            })
        };
        let mut second = {
            let opened = opened.clone();
            registry.subscribe("club", move || {
                opened.fetch_add(1, Ordering::SeqCst);
                stream::empty().boxed()
            })
        };

        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert_eq!(registry.active_listeners(), 1);
        assert_eq!(registry.observer_count("club"), 2);

        tx.unbounded_send(Ok(Some(7))).unwrap();
        assert_eq!(first.recv().await.unwrap().unwrap(), Some(7));
        assert_eq!(second.recv().await.unwrap().unwrap(), Some(7));
        assert_eq!(first.current(), Some(7));
    }

    #[tokio::test]
    async fn late_subscriber_gets_cached_snapshot_first() {
        let registry: SubscriptionRegistry<u32> = SubscriptionRegistry::new();
        let (tx, feed) = manual();

        let mut first = registry.subscribe("club", move || feed);
        tx.unbounded_send(Ok(Some(1))).unwrap();
        assert_eq!(first.recv().await.unwrap().unwrap(), Some(1));

        let mut late = registry.subscribe("club", || stream::empty().boxed());
        assert_eq!(late.current(), Some(1));
        assert_eq!(late.recv().await.unwrap().unwrap(), Some(1));

        tx.unbounded_send(Ok(Some(2))).unwrap();
        assert_eq!(late.recv().await.unwrap().unwrap(), Some(2));
    }

    #[tokio::test]
    async fn last_drop_tears_down_listener() {
        let registry: SubscriptionRegistry<u32> = SubscriptionRegistry::new();
        let (_tx, feed) = manual();

        let first = registry.subscribe("club", move || feed);
        let second = registry.subscribe("club", || stream::empty().boxed());

        drop(first);
        assert_eq!(registry.observer_count("club"), 1);
        assert_eq!(registry.active_listeners(), 1);

        drop(second);
        assert_eq!(registry.observer_count("club"), 0);
        assert_eq!(registry.active_listeners(), 0);
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let registry: SubscriptionRegistry<u32> = SubscriptionRegistry::new();
        let (_a_tx, a) = manual();
        let (_b_tx, b) = manual();

        let _a = registry.subscribe("a", move || a);
        let _b = registry.subscribe("b", move || b);

        assert_eq!(registry.active_listeners(), 2);
        assert_eq!(registry.observer_count("a"), 1);
    }

    #[tokio::test]
    async fn ended_stream_closes_observers_and_reopens() {
        let registry: SubscriptionRegistry<u32> = SubscriptionRegistry::new();

        let mut sub = registry.subscribe("club", || stream::iter(vec![Ok(Some(3))]).boxed());
        assert_eq!(sub.recv().await.unwrap().unwrap(), Some(3));
        assert!(sub.recv().await.is_none());

        let mut again = registry.subscribe("club", || stream::iter(vec![Ok(Some(4))]).boxed());
        assert_eq!(again.recv().await.unwrap().unwrap(), Some(4));
        assert_eq!(registry.observer_count("club"), 2);
    }

    #[tokio::test]
    async fn errors_are_forwarded_without_touching_cache() {
        let registry: SubscriptionRegistry<u32> = SubscriptionRegistry::new();
        let (tx, feed) = manual();
        let mut sub = registry.subscribe("club", move || feed);

        tx.unbounded_send(Ok(Some(5))).unwrap();
        tx.unbounded_send(Err(DomainError::Internal("boom".into()))).unwrap();

        assert_eq!(sub.recv().await.unwrap().unwrap(), Some(5));
        assert!(sub.recv().await.unwrap().is_err());
        assert_eq!(sub.current(), Some(5));
    }
}
