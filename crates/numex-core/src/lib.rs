//! numex-core — shared library for the numex exporter.
//!
//! Provides:
//! - `collector` — NUMA node discovery and per-node memory statistics
//!   collection from the sysfs node tree
//! - `exporter` — Prometheus publishing of collected sample sets

pub mod collector;
pub mod exporter;

/// Version string with the embedded git revision, e.g. `0.1.0 (1a2b3c4)`.
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_SHA"), ")");
