//! Prometheus publisher for NUMA memory sample sets.
//!
//! Owns the metric-family cache: one family per distinct metric name,
//! created lazily on first observation and reused for the process
//! lifetime. The parsing core stays free of this state.

use std::collections::HashMap;

use prometheus::{CounterVec, GaugeVec, Opts, Registry};
use tracing::debug;

use crate::collector::sysfs::{CollectError, MemoryCollector};
use crate::collector::traits::FileSystem;

/// Metric namespace shared by all exported series.
const NAMESPACE: &str = "node";
/// Subsystem segment for NUMA memory series.
const SUBSYSTEM: &str = "memory_numa";
/// The single label attached to every series.
const NODE_LABEL: &str = "node";

/// Error type for publish failures.
#[derive(Debug)]
pub enum ExportError {
    /// The collection cycle failed.
    Collect(CollectError),
    /// Metric family creation or registration failed.
    Metrics(prometheus::Error),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Collect(e) => write!(f, "couldn't get NUMA meminfo: {}", e),
            ExportError::Metrics(e) => write!(f, "metric registration failed: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<CollectError> for ExportError {
    fn from(e: CollectError) -> Self {
        ExportError::Collect(e)
    }
}

impl From<prometheus::Error> for ExportError {
    fn from(e: prometheus::Error) -> Self {
        ExportError::Metrics(e)
    }
}

/// Kind of metric family to create on first observation of a name.
#[derive(Clone, Copy)]
enum FamilyKind {
    Gauge,
    Counter,
}

/// A cached metric family.
///
/// The cache is keyed by metric name alone, not by kind: a name that ever
/// appeared in both sample sets would share whichever family was
/// registered first.
enum Family {
    Gauge(GaugeVec),
    Counter(CounterVec),
}

/// Publishes collected sample sets as Prometheus metrics.
///
/// Gauge samples become `node_memory_numa_<field>{node="N"}` gauge series
/// and counter samples the equivalent counter series.
pub struct NumaMemoryExporter<F: FileSystem> {
    collector: MemoryCollector<F>,
    registry: Registry,
    families: HashMap<String, Family>,
}

impl<F: FileSystem> NumaMemoryExporter<F> {
    /// Creates an exporter with an empty registry around the given collector.
    pub fn new(collector: MemoryCollector<F>) -> Self {
        Self {
            collector,
            registry: Registry::new(),
            families: HashMap::new(),
        }
    }

    /// Returns the registry holding all published families.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Runs one collection cycle and republishes every sample.
    ///
    /// On a collection error nothing is republished and the families keep
    /// the values from the last successful cycle; the caller decides
    /// whether to retry on the next cycle.
    pub fn update(&mut self) -> Result<(), ExportError> {
        let samples = self.collector.collect()?;

        // Drop every child so series from nodes that vanished do not linger.
        for family in self.families.values() {
            match family {
                Family::Gauge(vec) => vec.reset(),
                Family::Counter(vec) => vec.reset(),
            }
        }

        for (key, value) in &samples.gauges {
            self.publish(&key.metric_name, &key.node, *value, FamilyKind::Gauge)?;
        }
        for (key, value) in &samples.counters {
            self.publish(&key.metric_name, &key.node, *value, FamilyKind::Counter)?;
        }

        Ok(())
    }

    fn publish(
        &mut self,
        name: &str,
        node: &str,
        value: f64,
        kind: FamilyKind,
    ) -> Result<(), ExportError> {
        match self.family(name, kind)? {
            Family::Gauge(vec) => vec.with_label_values(&[node]).set(value),
            // Children are fresh after the reset in `update`, so inc_by
            // transcribes the absolute value.
            Family::Counter(vec) => vec.with_label_values(&[node]).inc_by(value),
        }
        Ok(())
    }

    /// Returns the family for `name`, creating and registering it on first
    /// observation.
    fn family(&mut self, name: &str, kind: FamilyKind) -> Result<&Family, ExportError> {
        if !self.families.contains_key(name) {
            let opts = Opts::new(name, format!("Memory information field {}.", name))
                .namespace(NAMESPACE)
                .subsystem(SUBSYSTEM);

            let family = match kind {
                FamilyKind::Gauge => {
                    let vec = GaugeVec::new(opts, &[NODE_LABEL])?;
                    self.registry.register(Box::new(vec.clone()))?;
                    Family::Gauge(vec)
                }
                FamilyKind::Counter => {
                    let vec = CounterVec::new(opts, &[NODE_LABEL])?;
                    self.registry.register(Box::new(vec.clone()))?;
                    Family::Counter(vec)
                }
            };
            debug!(metric = name, "registered new metric family");
            self.families.insert(name.to_string(), family);
        }
        Ok(&self.families[name])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;
    use prometheus::proto::MetricType;

    fn exporter_for(fs: MockFs) -> NumaMemoryExporter<MockFs> {
        NumaMemoryExporter::new(MemoryCollector::new(fs, "/sys"))
    }

    fn family_value(
        exporter: &NumaMemoryExporter<MockFs>,
        family_name: &str,
        node: &str,
    ) -> Option<f64> {
        let families = exporter.registry().gather();
        let family = families.iter().find(|f| f.get_name() == family_name)?;
        let metric = family.get_metric().iter().find(|metric| {
            metric
                .get_label()
                .iter()
                .any(|label| label.get_name() == NODE_LABEL && label.get_value() == node)
        })?;
        Some(match family.get_field_type() {
            MetricType::COUNTER => metric.get_counter().get_value(),
            _ => metric.get_gauge().get_value(),
        })
    }

    #[test]
    fn test_update_publishes_gauges_and_counters() {
        let mut exporter = exporter_for(MockFs::typical_numa_system());
        exporter.update().unwrap();

        assert_eq!(
            family_value(&exporter, "node_memory_numa_MemTotal", "0"),
            Some(16_699_543_552.0)
        );
        assert_eq!(
            family_value(&exporter, "node_memory_numa_Active_anon", "0"),
            Some(2_410_124.0 * 1024.0)
        );
        assert_eq!(
            family_value(&exporter, "node_memory_numa_numa_hit", "1"),
            Some(98_765_432_100.0)
        );
    }

    #[test]
    fn test_update_family_kinds() {
        let mut exporter = exporter_for(MockFs::typical_numa_system());
        exporter.update().unwrap();

        let families = exporter.registry().gather();
        let memtotal = families
            .iter()
            .find(|f| f.get_name() == "node_memory_numa_MemTotal")
            .unwrap();
        assert_eq!(memtotal.get_field_type(), MetricType::GAUGE);
        assert_eq!(memtotal.get_help(), "Memory information field MemTotal.");

        let numa_hit = families
            .iter()
            .find(|f| f.get_name() == "node_memory_numa_numa_hit")
            .unwrap();
        assert_eq!(numa_hit.get_field_type(), MetricType::COUNTER);
    }

    #[test]
    fn test_update_is_idempotent_across_cycles() {
        // Counters must transcribe the absolute value each cycle, not
        // accumulate, and families must be reused rather than re-registered.
        let mut exporter = exporter_for(MockFs::typical_numa_system());
        exporter.update().unwrap();
        let families_after_first = exporter.registry().gather().len();

        exporter.update().unwrap();
        assert_eq!(exporter.registry().gather().len(), families_after_first);
        assert_eq!(
            family_value(&exporter, "node_memory_numa_numa_hit", "0"),
            Some(193_460_335_812.0)
        );
    }

    #[test]
    fn test_update_empty_tree_publishes_nothing() {
        let mut exporter = exporter_for(MockFs::empty_node_tree());
        exporter.update().unwrap();
        assert!(exporter.registry().gather().is_empty());
    }

    #[test]
    fn test_update_error_propagates() {
        let mut fs = MockFs::new();
        fs.add_node(0, "Node 0 MemTotal: bogus kB\n", "numa_hit 1\n");

        let mut exporter = exporter_for(fs);
        let err = exporter.update().unwrap_err();
        assert!(matches!(err, ExportError::Collect(_)));
        assert!(err.to_string().contains("bogus"));
    }
}
