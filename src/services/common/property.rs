use std::fmt::Debug;

use futures::stream::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// A reactive value that readers can snapshot or watch for changes.
///
/// Readers get a consistent snapshot of the whole value; only the owning
/// service writes to it. Each watcher sees the current value immediately
/// on subscribing, then every subsequent change.
#[derive(Clone)]
pub struct Property<T: Clone + Send + Sync + 'static> {
    tx: watch::Sender<T>,
}

impl<T: Clone + Send + Sync + 'static> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Set a new value, notifying watchers only when it differs.
    pub(crate) fn set(&self, new_value: T)
    where
        T: PartialEq,
    {
        self.tx.send_if_modified(|current| {
            if *current != new_value {
                *current = new_value;
                true
            } else {
                false
            }
        });
    }

    /// Mutate the value in place. Watchers are notified when `modify` returns true.
    pub(crate) fn update(&self, modify: impl FnOnce(&mut T) -> bool) {
        self.tx.send_if_modified(modify);
    }

    /// Get a snapshot of the current value.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Watch for changes to this property.
    ///
    /// The stream yields the current value first. Intermediate values may be
    /// skipped when the writer is faster than the reader; the latest value is
    /// never lost.
    pub fn watch(&self) -> impl Stream<Item = T> + Send + use<T> {
        WatchStream::new(self.tx.subscribe())
    }
}

impl<T: Clone + Send + Sync + Debug + 'static> Debug for Property<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Property")
            .field("value", &self.get())
            .finish()
    }
}
