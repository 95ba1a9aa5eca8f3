//! Resolved state container and publish channel.
//!
//! # Responsibilities
//! - Hold the session's resolved query parameter state
//! - Reset it when a navigation starts, replace it when one resolves
//! - Broadcast resolved states to subscribers, replaying the latest one
//!
//! # Design Decisions
//! - The container is an injected handle (`StateHandle`), not a global
//! - Readers never block the pipeline: the state is swapped atomically
//! - Every published state is queued for every subscriber (broadcast);
//!   the latest one is also kept in a replay slot for late subscribers
//! - "Resolution in progress" only clears the replay slot; it is never
//!   delivered and never drops a queued state

use std::fmt;
use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};
use futures_util::stream::{self, Stream};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

/// Published states queued per subscriber before it starts lagging.
const STATE_CAPACITY: usize = 64;

/// Errors raised when reading the resolved state.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("resolved state does not fit the requested type: {0}")]
    Typed(#[from] serde_json::Error),
}

/// Query parameter values keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResolvedState(Map<String, Value>);

impl ResolvedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Deserialize into an application type.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(self.to_value())?)
    }
}

impl From<Map<String, Value>> for ResolvedState {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Shared handle to the current resolved state.
#[derive(Clone)]
pub struct StateHandle(Arc<ArcSwap<ResolvedState>>);

impl StateHandle {
    pub fn new() -> Self {
        Self(Arc::new(ArcSwap::from_pointee(ResolvedState::default())))
    }

    pub fn current(&self) -> Arc<ResolvedState> {
        self.0.load_full()
    }

    /// Empty the state (navigation started).
    pub fn reset(&self) {
        self.0.store(Arc::new(ResolvedState::default()));
    }

    /// Replace the state and return the stored value.
    pub fn replace(&self, state: ResolvedState) -> Arc<ResolvedState> {
        let state = Arc::new(state);
        self.0.store(state.clone());
        state
    }
}

impl Default for StateHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for StateHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateHandle").field(&self.current()).finish()
    }
}

/// Sending side of the state channel.
#[derive(Debug, Clone)]
pub struct StatePublisher {
    tx: broadcast::Sender<Arc<ResolvedState>>,
    replay: Arc<ArcSwapOption<ResolvedState>>,
}

impl StatePublisher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(STATE_CAPACITY);
        Self {
            tx,
            replay: Arc::new(ArcSwapOption::empty()),
        }
    }

    pub fn publish(&self, state: Arc<ResolvedState>) {
        // Replay slot first: a subscriber created in between sees the state
        // twice, which StateSubscriber filters out.
        self.replay.store(Some(state.clone()));
        let _ = self.tx.send(state);
    }

    /// Hide the latest state from new subscribers until the next publish.
    pub fn suppress(&self) {
        self.replay.store(None);
    }

    /// The latest published state, unless suppressed.
    pub fn latest(&self) -> Option<Arc<ResolvedState>> {
        self.replay.load_full()
    }

    pub fn subscribe(&self) -> StateSubscriber {
        let rx = self.tx.subscribe();
        StateSubscriber {
            rx,
            replay: self.replay.load_full(),
            replayed: None,
        }
    }
}

impl Default for StatePublisher {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of the state channel.
///
/// A new subscriber first sees the latest published state, if any, then
/// every later one in publish order. A subscriber more than 64 states
/// behind skips the oldest ones.
#[derive(Debug)]
pub struct StateSubscriber {
    rx: broadcast::Receiver<Arc<ResolvedState>>,
    replay: Option<Arc<ResolvedState>>,
    replayed: Option<Arc<ResolvedState>>,
}

impl StateSubscriber {
    /// Wait for the next resolved state. `None` once the store is gone.
    pub async fn next(&mut self) -> Option<Arc<ResolvedState>> {
        if let Some(state) = self.replay.take() {
            self.replayed = Some(state.clone());
            return Some(state);
        }
        loop {
            match self.rx.recv().await {
                Ok(state) => {
                    let duplicate = self
                        .replayed
                        .take()
                        .is_some_and(|replayed| Arc::ptr_eq(&replayed, &state));
                    if !duplicate {
                        return Some(state);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    self.replayed = None;
                    tracing::warn!(skipped, "State subscriber fell behind, states dropped");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Wait for the first resolved state.
    pub async fn first(mut self) -> Option<Arc<ResolvedState>> {
        self.next().await
    }

    pub fn into_stream(self) -> impl Stream<Item = Arc<ResolvedState>> {
        stream::unfold(self, |mut subscriber| async move {
            let state = subscriber.next().await?;
            Some((state, subscriber))
        })
    }
}
