//! Selection cascade.
//!
//! Four dependent levels, each gated by the one before it:
//!
//! ```text
//! vehicle type ──► brands ──► models ──► years ──► result
//!                    │          │          │
//!                    │          │          └─ pending year reconciled here
//!                    │          └─ candidate years offered from here
//!                    └─ static fallback when providers and cache miss
//! ```
//!
//! Every level tracks its own request sequence. Selecting upstream aborts the
//! downstream requests in flight, and a response that arrives after its level
//! moved on is dropped.

mod events;
mod service;
mod session;
mod state;
mod years;


pub use events::{
    Advisory, CascadeError, CascadeEvent, CascadeEventSink, Level, MockCascadeEventSink,
    NoOpCascadeEventSink,
};
pub use service::{CascadeConfig, SelectionCascade};
pub use session::SessionYearCache;
pub use state::CascadeSnapshot;
pub use years::{match_pending_year, YearWindow, MIN_YEAR};
