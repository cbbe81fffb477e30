//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Routing and server produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (dispatch counters, resolve latency)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through logs via the tower-http trace span
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
