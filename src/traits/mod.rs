//! Trait definitions for MobSF operations.
//!
//! The workflow layer talks to the server through [`ScanService`], so it can
//! be driven by the real client or by a test double.

mod service;

pub use service::ScanService;
