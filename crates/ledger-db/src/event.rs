//! # Change Notification Fan-out
//!
//! Typed publish/subscribe for committed entity changes.
//!
//! ## Delivery Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Event Delivery Pipeline                         │
//! │                                                                     │
//! │  Repository write                                                   │
//! │       │  BEGIN ... COMMIT   (events are NEVER raised for an        │
//! │       │                      aborted transaction)                   │
//! │       ▼                                                             │
//! │  ChangeNotifier::notify(event)    ← writer does not block           │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  NotificationExecutor (ONE task, shared by every notifier)          │
//! │       │  events processed strictly one at a time, in send order     │
//! │       ▼                                                             │
//! │  listener 1 → listener 2 → ...    ← a panicking listener is         │
//! │                                     logged and isolated; the        │
//! │                                     committed write stands          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Consumers register a [`ModelChangedListener`] per entity type and receive
//! one [`ModelEvent`] per committed write. The `Upserted` kind is a
//! convenience for consumers that don't care whether a row was added or
//! updated.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

// =============================================================================
// Event Types
// =============================================================================

/// The kind of change an event carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Added,
    Updated,
    Deleted,
    /// Added-or-updated, for consumers that don't need the distinction.
    Upserted,
}

/// A committed change to one entity type, carrying the affected snapshots.
#[derive(Debug, Clone)]
pub enum ModelEvent<M> {
    Added(Vec<M>),
    Updated(Vec<M>),
    Deleted(Vec<M>),
    Upserted(Vec<M>),
}

impl<M> ModelEvent<M> {
    /// The affected entity snapshots, regardless of kind.
    pub fn models(&self) -> &[M] {
        match self {
            ModelEvent::Added(models)
            | ModelEvent::Updated(models)
            | ModelEvent::Deleted(models)
            | ModelEvent::Upserted(models) => models,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            ModelEvent::Added(_) => EventKind::Added,
            ModelEvent::Updated(_) => EventKind::Updated,
            ModelEvent::Deleted(_) => EventKind::Deleted,
            ModelEvent::Upserted(_) => EventKind::Upserted,
        }
    }
}

/// A consumer of committed changes for one entity type.
pub trait ModelChangedListener<M>: Send + Sync {
    fn on_model_changed(&self, event: &ModelEvent<M>);
}

// =============================================================================
// Notification Executor
// =============================================================================

type Job = Box<dyn FnOnce() + Send>;

/// The single delivery context shared by all notifiers.
///
/// One spawned task drains a queue of delivery jobs: one event is fully
/// processed (all its listeners invoked) before the next begins, across every
/// entity type. The writer side only enqueues and never waits.
#[derive(Clone)]
pub struct NotificationExecutor {
    tx: mpsc::UnboundedSender<Job>,
}

impl NotificationExecutor {
    /// Spawns the delivery task on the current tokio runtime.
    pub fn spawn() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                job();
            }
            debug!("Notification executor drained and stopped");
        });
        NotificationExecutor { tx }
    }

    /// Enqueues a delivery job. Never blocks; a job sent after the executor
    /// stopped is dropped.
    fn execute(&self, job: impl FnOnce() + Send + 'static) {
        let _ = self.tx.send(Box::new(job));
    }

    /// Waits until every job enqueued before this call has run.
    ///
    /// ## Usage
    /// Teardown and tests; production writers never need to wait.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        self.execute(move || {
            let _ = done_tx.send(());
        });
        let _ = done_rx.await;
    }
}

// =============================================================================
// Change Notifier
// =============================================================================

/// Handle for unregistering a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct Registry<M> {
    next_id: u64,
    listeners: Vec<(ListenerId, Arc<dyn ModelChangedListener<M>>)>,
    closed: bool,
}

/// The per-entity-type listener registry.
///
/// One instance exists per entity type (Order, Customer, Product, ...), all
/// delivering through the same [`NotificationExecutor`]. Explicitly
/// constructed and owned by `Database`; there is no global singleton.
pub struct ChangeNotifier<M> {
    executor: NotificationExecutor,
    registry: Arc<Mutex<Registry<M>>>,
}

impl<M> Clone for ChangeNotifier<M> {
    fn clone(&self) -> Self {
        ChangeNotifier {
            executor: self.executor.clone(),
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<M: Send + Sync + 'static> ChangeNotifier<M> {
    pub fn new(executor: NotificationExecutor) -> Self {
        ChangeNotifier {
            executor,
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
                closed: false,
            })),
        }
    }

    /// Registers a listener for committed changes of this entity type.
    pub fn register(&self, listener: Arc<dyn ModelChangedListener<M>>) -> ListenerId {
        let mut registry = self.lock_registry();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        if !registry.closed {
            registry.listeners.push((id, listener));
        }
        id
    }

    /// Unregisters a listener; late events no longer reach it.
    pub fn unregister(&self, id: ListenerId) {
        self.lock_registry()
            .listeners
            .retain(|(listener_id, _)| *listener_id != id);
    }

    /// Delivers a committed event to all registered listeners.
    ///
    /// Must only be called after the originating transaction committed. The
    /// call returns immediately; delivery happens on the shared executor
    /// task, one event at a time, listeners in registration order.
    ///
    /// The listener set is resolved at delivery time, not at enqueue time: a
    /// consumer that unregisters while an event is still queued does not
    /// receive it.
    pub fn notify(&self, event: ModelEvent<M>) {
        let registry = Arc::clone(&self.registry);
        self.executor.execute(move || {
            let listeners: Vec<_> = registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .listeners
                .iter()
                .map(|(_, listener)| Arc::clone(listener))
                .collect();

            // The lock is released before invoking anyone, so a listener may
            // register or unregister from inside its callback.
            for listener in &listeners {
                // A misbehaving listener must not corrupt the committed
                // write nor starve its peers.
                let delivery =
                    catch_unwind(AssertUnwindSafe(|| listener.on_model_changed(&event)));
                if delivery.is_err() {
                    error!("Change listener panicked during event delivery");
                }
            }
        });
    }

    /// Drains the listener set. Events notified after closing go nowhere.
    pub fn close(&self) {
        let mut registry = self.lock_registry();
        registry.closed = true;
        registry.listeners.clear();
    }

    /// Waits until all events notified so far have been delivered.
    pub async fn flush(&self) {
        self.executor.flush().await;
    }

    fn lock_registry(&self) -> std::sync::MutexGuard<'_, Registry<M>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
