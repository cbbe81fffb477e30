//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → router.rs (method bucket, linear scan)
//!     → pattern.rs (match pattern, collect captures)
//!     → Return: Matched / Redirect / MethodNotAllowed / NotFound
//!
//! Route registration (at setup):
//!     add(method, pattern, handler)
//!     → appended to the method's list
//!     → frozen once handed to the server
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable while serving
//! - No regex, no trie: one left-to-right scan per pattern
//! - Deterministic: same input always matches same route
//! - First match wins (ordered by registration)

pub mod handler;
pub mod params;
pub mod pattern;
pub mod router;

pub use handler::{BoxHandler, Handler, StatusHandler};
pub use params::Params;
pub use pattern::{match_path, tail, Pattern};
pub use router::{with_trailing_slash, Resolution, Route, Router};
