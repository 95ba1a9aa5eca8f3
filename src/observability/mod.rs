//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! router events, store pipeline
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (navigation, publish, redirect counters)
//! ```
//!
//! # Design Decisions
//! - Library code only emits; the binary installs the subscriber
//! - Metrics go through the `metrics` facade, so with no recorder
//!   installed every update is a no-op

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
