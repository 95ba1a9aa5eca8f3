//! Query parameter store service.
//!
//! # Responsibilities
//! - Attach to a host router and drive the pipeline from its event stream
//! - Expose the resolved state and its subscriber channel
//! - Tear the router subscription down on `detach` or drop
//!
//! # Design Decisions
//! - One tokio task per attached store; the pipeline runs inside it
//! - The event receiver is created before `attach` returns, so no event
//!   sent after attaching is missed
//! - State and channel outlive the subscription: a detached store keeps
//!   serving its latest state and can be attached again

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::routing::navigator::{Navigator, RouterEvents};
use crate::store::gate::Pipeline;
use crate::store::state::{ResolvedState, StateHandle, StatePublisher, StateSubscriber};

/// Live router subscription. Dropping it stops event processing.
#[derive(Debug)]
struct RouterSubscription {
    task: JoinHandle<()>,
}

impl Drop for RouterSubscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Resolves, validates and publishes query parameter state for a router.
#[derive(Debug)]
pub struct QueryParamsStore {
    state: StateHandle,
    publisher: StatePublisher,
    subscription: Mutex<Option<RouterSubscription>>,
}

impl QueryParamsStore {
    pub fn new() -> Self {
        Self::with_state(StateHandle::new())
    }

    /// Create a store over an existing state container.
    pub fn with_state(state: StateHandle) -> Self {
        Self {
            state,
            publisher: StatePublisher::new(),
            subscription: Mutex::new(None),
        }
    }

    /// Start processing the router's events.
    ///
    /// Returns `false` if the store was already attached; the existing
    /// subscription is kept. Must be called within a tokio runtime.
    pub fn attach<R>(&self, router: Arc<R>) -> bool
    where
        R: RouterEvents + Navigator + 'static,
    {
        let mut subscription = self.lock();
        if subscription.is_some() {
            tracing::debug!("Store already attached, ignoring");
            return false;
        }

        let mut events = router.subscribe_events();
        let mut pipeline = Pipeline::new(self.state.clone(), self.publisher.clone());

        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let step = pipeline.handle(&event, &*router);
                        tracing::trace!(event = event.kind(), ?step, "Router event handled");
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Store fell behind the router, events dropped");
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Router event stream closed");
                        break;
                    }
                }
            }
        });

        *subscription = Some(RouterSubscription { task });
        tracing::info!("Store attached to router");
        true
    }

    pub fn is_attached(&self) -> bool {
        self.lock().is_some()
    }

    /// Stop processing router events. Returns `false` if not attached.
    pub fn detach(&self) -> bool {
        let detached = self.lock().take().is_some();
        if detached {
            tracing::info!("Store detached from router");
        }
        detached
    }

    /// Subscribe to published states, starting with the latest one.
    pub fn subscribe(&self) -> StateSubscriber {
        self.publisher.subscribe()
    }

    /// Wait for the next (or latest) published state.
    pub async fn first_state(&self) -> Option<Arc<ResolvedState>> {
        self.subscribe().first().await
    }

    /// The current state, which may be empty mid-navigation.
    pub fn current(&self) -> Arc<ResolvedState> {
        self.state.current()
    }

    pub fn state_handle(&self) -> &StateHandle {
        &self.state
    }

    fn lock(&self) -> MutexGuard<'_, Option<RouterSubscription>> {
        self.subscription.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for QueryParamsStore {
    fn default() -> Self {
        Self::new()
    }
}
