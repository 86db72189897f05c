//! Observability for the Kuuhaku affiliate site.
//!
//! This crate provides:
//! - `LoggingConfig` / `init_logging` - `tracing` subscriber setup (text or JSON)
//! - `RequestId` - Per-request identifier for log correlation

mod logging;
mod request;

pub use logging::*;
pub use request::*;
