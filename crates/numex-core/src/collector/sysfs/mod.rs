//! Collectors for the sysfs NUMA node tree.
//!
//! This module provides parsers for the per-node `meminfo` and `numastat`
//! files and the collector that merges them into per-cycle sample sets.

pub mod memory;
pub mod parser;

pub use memory::{CollectError, MemoryCollector, MemorySamples, SampleKey, SampleSet};
