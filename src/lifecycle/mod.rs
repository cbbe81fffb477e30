//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging/metrics → Register routes → Bind
//!
//! Shutdown (shutdown.rs):
//!     SIGINT/SIGTERM → broadcast → stop accepting → drain in-flight → exit
//! ```

pub mod shutdown;

pub use shutdown::Shutdown;
