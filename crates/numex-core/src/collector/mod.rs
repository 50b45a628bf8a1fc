//! NUMA memory statistics collector.
//!
//! This module reads per-node memory statistics from the sysfs NUMA node
//! tree (`/sys/devices/system/node/node<N>/`), with support for mocking
//! for testing on non-Linux hosts.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │                  MemoryCollector                   │
//! │  - node<N> directory discovery                     │
//! │  - node<N>/meminfo   → gauge sample set            │
//! │  - node<N>/numastat  → counter sample set          │
//! │                        │                           │
//! │                 ┌──────▼──────┐                    │
//! │                 │  FileSystem │ (trait)            │
//! │                 └──────┬──────┘                    │
//! └────────────────────────┼───────────────────────────┘
//!                          │
//!          ┌───────────────┼───────────────┐
//!          │               │               │
//!   ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!   │   RealFs    │ │   MockFs    │ │  Scenarios  │
//!   │ (Linux)     │ │ (Testing)   │ │ (Fixtures)  │
//!   └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use numex_core::collector::{MemoryCollector, RealFs};
//!
//! let collector = MemoryCollector::new(RealFs::new(), "/sys");
//! let samples = collector.collect().unwrap();
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use numex_core::collector::{MemoryCollector, MockFs};
//!
//! let fs = MockFs::typical_numa_system();
//! let collector = MemoryCollector::new(fs, "/sys");
//! let samples = collector.collect().unwrap();
//! assert!(!samples.gauges.is_empty());
//! ```

pub mod mock;
pub mod sysfs;
pub mod traits;

pub use mock::MockFs;
pub use sysfs::{CollectError, MemoryCollector, MemorySamples, SampleKey, SampleSet};
pub use traits::{FileSystem, RealFs};
