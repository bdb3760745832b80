//! # jointscope-core
//!
//! State-synchronization and trace-reconstruction core for the
//! joint-functioning operator console.
//!
//! ## Design Principles
//!
//! - **Synchronous**: no async runtime dependency; the transport layer wraps
//!   these types from its own event loop.
//! - **Pure where it counts**: the reducer, the timeline builder and the
//!   trace model are plain functions over owned data so they can be tested
//!   without any transport.
//! - **Replace, not merge**: a subsystem push fully supersedes the previous
//!   snapshot for that subsystem only.
//! - **Session-scoped**: every piece of state hangs off one
//!   [`SessionContext`]; teardown discards it all.

pub mod config;
pub mod error;
pub mod readiness;
pub mod reducer;
pub mod session;
pub mod timeline;
pub mod token_store;
pub mod trace;
pub mod views;

pub use config::ConsoleConfig;
pub use error::{ConsoleError, Result};
pub use readiness::{evaluate_readiness, ReadinessOutcome, ReadinessRow};
pub use reducer::{reduce, ConsoleState};
pub use session::SessionContext;
pub use timeline::{build_timeline, Lane, TimelineEvent, TimelineView};
pub use trace::{build_trace, Branch, StepView, TracePanel};
