//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! navigate_by_url / Navigator::navigate
//!     → matcher.rs (recognize route chain)
//!     → snapshot.rs (one snapshot per segment, shared query params)
//!     → event.rs (lifecycle events, broadcast to subscribers)
//! ```
//!
//! # Design Decisions
//! - The store only depends on the `RouterEvents` and `Navigator` traits;
//!   `MemoryRouter` is one host among many
//! - Route tables compiled once, immutable at runtime
//! - Deterministic: same URL always recognizes the same chain

pub mod event;
pub mod matcher;
pub mod navigator;
pub mod router;
pub mod snapshot;

pub use event::{NavigationId, RouterEvent};
pub use navigator::{NavigationRequest, Navigator, QueryParamsHandling, RouterError, RouterEvents};
pub use router::MemoryRouter;
pub use snapshot::{QueryParams, RouteSegment, RouteSnapshot};
