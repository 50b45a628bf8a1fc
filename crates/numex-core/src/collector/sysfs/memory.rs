//! Per-node memory collector reading the sysfs NUMA node tree.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::collector::sysfs::parser::{self, ParseError};
use crate::collector::traits::FileSystem;

/// Relative path from the sysfs root to the NUMA node tree.
const NODE_TREE: &str = "devices/system/node";
/// Directory-name prefix for NUMA node entries.
const NODE_PREFIX: &str = "node";

/// Identifies one time series within a collection cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampleKey {
    /// Normalized metric name.
    pub metric_name: String,
    /// NUMA node identifier as a string.
    pub node: String,
}

impl SampleKey {
    /// Creates a new sample key.
    pub fn new(metric_name: impl Into<String>, node: impl Into<String>) -> Self {
        Self {
            metric_name: metric_name.into(),
            node: node.into(),
        }
    }
}

/// A set of samples keyed by (metric name, node id).
pub type SampleSet = HashMap<SampleKey, f64>;

/// The two disjoint sample sets produced by one collection cycle.
#[derive(Debug, Clone, Default)]
pub struct MemorySamples {
    /// Instantaneous memory-state fields from the meminfo files.
    pub gauges: SampleSet,
    /// Monotonically increasing event counts from the numastat files.
    pub counters: SampleSet,
}

/// Error type for collection failures.
#[derive(Debug)]
pub enum CollectError {
    /// Listing the node directory tree failed.
    Discovery { path: PathBuf, source: io::Error },
    /// A discovered directory does not end in a `node<N>` component.
    PathFormat(PathBuf),
    /// Reading a node data file failed.
    Io { path: PathBuf, source: io::Error },
    /// A node data file contained an unparsable line.
    Parse { path: PathBuf, source: ParseError },
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::Discovery { path, source } => {
                write!(
                    f,
                    "cannot list node directories under {}: {}",
                    path.display(),
                    source
                )
            }
            CollectError::PathFormat(path) => {
                write!(f, "node path has unexpected format: {}", path.display())
            }
            CollectError::Io { path, source } => {
                write!(f, "I/O error reading {}: {}", path.display(), source)
            }
            CollectError::Parse { path, source } => {
                write!(f, "parse error in {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for CollectError {}

/// Collects per-node memory statistics from the sysfs NUMA node tree.
///
/// One `collect` call is one cycle: every discovered node's `meminfo` and
/// `numastat` files are parsed and merged into two sample sets. A failure
/// anywhere aborts the whole cycle; no partial results are returned.
pub struct MemoryCollector<F: FileSystem> {
    fs: F,
    node_root: PathBuf,
}

impl<F: FileSystem> MemoryCollector<F> {
    /// Creates a new collector.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `sysfs_path` - Base path to the sysfs filesystem (usually "/sys")
    pub fn new(fs: F, sysfs_path: impl AsRef<Path>) -> Self {
        Self {
            node_root: sysfs_path.as_ref().join(NODE_TREE),
            fs,
        }
    }

    /// Runs one collection cycle over every discovered NUMA node.
    pub fn collect(&self) -> Result<MemorySamples, CollectError> {
        let nodes = self.discover_nodes()?;
        debug!(nodes = nodes.len(), "collecting NUMA memory statistics");

        let mut samples = MemorySamples::default();

        for node_path in &nodes {
            // Gauge samples carry the node id embedded in each meminfo
            // line; counter samples get it from the directory name. The
            // two sources are not cross-validated.
            let meminfo_path = node_path.join("meminfo");
            let content = self.read_file(&meminfo_path)?;
            let meminfo = parser::parse_node_meminfo(&content).map_err(|e| {
                CollectError::Parse {
                    path: meminfo_path,
                    source: e,
                }
            })?;
            for sample in meminfo {
                samples
                    .gauges
                    .insert(SampleKey::new(sample.field, sample.node), sample.value);
            }

            let node_id = node_id_from_path(node_path)
                .ok_or_else(|| CollectError::PathFormat(node_path.clone()))?;

            let numastat_path = node_path.join("numastat");
            let content = self.read_file(&numastat_path)?;
            let numastat = parser::parse_node_numastat(&content).map_err(|e| {
                CollectError::Parse {
                    path: numastat_path,
                    source: e,
                }
            })?;
            for (field, value) in numastat {
                samples
                    .counters
                    .insert(SampleKey::new(field, node_id), value);
            }
        }

        Ok(samples)
    }

    /// Lists `node<N>` directories under the sysfs node tree.
    ///
    /// A tree with zero matching entries is not an error. Paths are sorted
    /// so cycles iterate deterministically.
    fn discover_nodes(&self) -> Result<Vec<PathBuf>, CollectError> {
        let entries =
            self.fs
                .read_dir(&self.node_root)
                .map_err(|e| CollectError::Discovery {
                    path: self.node_root.clone(),
                    source: e,
                })?;

        let mut nodes: Vec<PathBuf> = entries
            .into_iter()
            .filter(|path| node_id_from_path(path).is_some())
            .collect();
        nodes.sort();
        Ok(nodes)
    }

    fn read_file(&self, path: &Path) -> Result<String, CollectError> {
        self.fs.read_to_string(path).map_err(|e| CollectError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Extracts the numeric node id from a `node<N>` directory path.
///
/// Returns `None` when the final path component is not `node` followed by
/// one or more ASCII digits.
fn node_id_from_path(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    let id = name.strip_prefix(NODE_PREFIX)?;
    if !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()) {
        Some(id)
    } else {
        None
    }
}
