//! Query parameter store.
//!
//! # Data Flow
//! ```text
//! RouterEvent
//!     → gate.rs (event gate, per-navigation state machine)
//!     → resolver.rs (merged schema of the leaf's ancestry)
//!     → validator.rs (convert, validate, decide rewrite vs. accept)
//!     → state.rs (resolved state, replay slot + broadcast delivery)
//! service.rs owns the task that feeds router events into the gate.
//! ```

pub mod converter;
pub mod gate;
pub mod resolver;
pub mod service;
pub mod state;
pub mod validator;

pub use converter::{ConverterKind, CustomConverter};
pub use gate::{NavigationPhase, Pipeline, Step};
pub use resolver::{MergedSchema, Resolution};
pub use service::QueryParamsStore;
pub use state::{ResolvedState, StateHandle, StatePublisher, StateSubscriber, StoreError};
pub use validator::{ParamError, ValidationResult};
