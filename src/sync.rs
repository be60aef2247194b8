use crate::catalog::FieldDescriptor;
use crate::config::SyncConfig;
use crate::resolver::FieldRole;
use indexmap::IndexSet;
use log::info;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use thiserror::Error;

/// Host-side table identifier.
pub type TableId = u64;

/// Host-side actor identifier.
pub type ActorId = u64;

/// Aggregation stamped on metrics registered from discovered measures.
pub const DEFAULT_METRIC_AGGREGATION: &str = "count";

/// A derived measure persisted in the host catalog. Identity key is
/// `(table, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDefinition {
    pub table: TableId,
    pub creator: ActorId,
    pub name: String,
    pub description: String,
    pub aggregation: String,
}

#[derive(Error, Debug)]
pub enum MetricCatalogError {
    #[error("Metric lookup failed: {0}")]
    LookupFailed(String),

    #[error("Metric insert failed: {0}")]
    InsertFailed(String),
}

/// The host's metric catalog. This crate only reads it and appends to it;
/// concurrent-access discipline is the catalog's responsibility.
pub trait MetricCatalog {
    fn retrieve_all(&self, table: TableId) -> Result<Vec<MetricDefinition>, MetricCatalogError>;
    fn insert(&self, metric: MetricDefinition) -> Result<(), MetricCatalogError>;
}

/// In-memory [`MetricCatalog`] for tests and local runs.
#[derive(Debug, Default)]
pub struct LocalMetricCatalog {
    metrics: Mutex<Vec<MetricDefinition>>,
}

impl LocalMetricCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn metrics(&self) -> Vec<MetricDefinition> {
        self.metrics.lock().map(|m| m.clone()).unwrap_or_default()
    }
}

impl MetricCatalog for LocalMetricCatalog {
    fn retrieve_all(&self, table: TableId) -> Result<Vec<MetricDefinition>, MetricCatalogError> {
        let metrics = self
            .metrics
            .lock()
            .map_err(|e| MetricCatalogError::LookupFailed(e.to_string()))?;
        Ok(metrics.iter().filter(|m| m.table == table).cloned().collect())
    }

    fn insert(&self, metric: MetricDefinition) -> Result<(), MetricCatalogError> {
        let mut metrics = self
            .metrics
            .lock()
            .map_err(|e| MetricCatalogError::InsertFailed(e.to_string()))?;
        metrics.push(metric);
        Ok(())
    }
}

/// One-way reconciliation of discovered measures into the metric catalog:
/// inserts gaps, never updates or deletes existing metrics.
pub struct SchemaSynchronizer<C: MetricCatalog> {
    catalog: C,
    config: SyncConfig,
}

impl<C: MetricCatalog> SchemaSynchronizer<C> {
    pub fn new(catalog: C, config: SyncConfig) -> Self {
        SchemaSynchronizer { catalog, config }
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Registers a metric for every discovered measure not yet present for
    /// the table, matched by name. Returns the number inserted; running
    /// again with the same measures inserts nothing.
    pub fn sync_metrics(
        &self,
        table: TableId,
        discovered: &[FieldDescriptor],
    ) -> Result<usize, MetricCatalogError> {
        let mut known: IndexSet<String> = self
            .catalog
            .retrieve_all(table)?
            .into_iter()
            .map(|metric| metric.name)
            .collect();

        let mut inserted = 0;
        for field in discovered.iter().filter(|f| f.role == FieldRole::Measure) {
            if !known.insert(field.name.clone()) {
                continue;
            }
            self.catalog.insert(MetricDefinition {
                table,
                creator: self.config.system_actor,
                name: field.name.clone(),
                description: field.description.clone(),
                aggregation: DEFAULT_METRIC_AGGREGATION.to_string(),
            })?;
            inserted += 1;
        }

        if inserted > 0 {
            info!("Registered {} new metrics for table {}", inserted, table);
        }
        Ok(inserted)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::catalog::CatalogClient;
    use crate::transport::LocalMetaTransport;

    fn sync_config(actor: ActorId) -> SyncConfig {
        SyncConfig {
            system_actor: actor,
        }
    }

    async fn orders_descriptors() -> Vec<FieldDescriptor> {
        let client = CatalogClient::new(LocalMetaTransport::mock());
        client
            .find_cube("orders")
            .await
            .unwrap()
            .field_descriptors()
    }

    #[tokio::test]
    async fn sync_registers_missing_measures_only() {
        let descriptors = orders_descriptors().await;
        let synchronizer = SchemaSynchronizer::new(LocalMetricCatalog::new(), sync_config(7));

        let inserted = synchronizer.sync_metrics(42, &descriptors).unwrap();
        assert_eq!(inserted, 2);

        let metrics = synchronizer.catalog().metrics();
        assert_eq!(metrics.len(), 2);
        assert!(metrics.iter().all(|m| m.table == 42));
        assert!(metrics.iter().all(|m| m.creator == 7));
        assert!(metrics.iter().all(|m| m.aggregation == "count"));
        // Dimensions never become metrics.
        assert!(metrics.iter().all(|m| m.name != "status"));
    }

    #[tokio::test]
    async fn sync_is_idempotent() {
        let descriptors = orders_descriptors().await;
        let synchronizer = SchemaSynchronizer::new(LocalMetricCatalog::new(), sync_config(1));

        assert_eq!(synchronizer.sync_metrics(42, &descriptors).unwrap(), 2);
        assert_eq!(synchronizer.sync_metrics(42, &descriptors).unwrap(), 0);
        assert_eq!(synchronizer.catalog().metrics().len(), 2);
    }

    #[tokio::test]
    async fn sync_never_touches_existing_metrics() {
        let catalog = LocalMetricCatalog::new();
        catalog
            .insert(MetricDefinition {
                table: 42,
                creator: 99,
                name: "count".to_string(),
                description: "hand-tuned".to_string(),
                aggregation: "sum".to_string(),
            })
            .unwrap();

        let descriptors = orders_descriptors().await;
        let synchronizer = SchemaSynchronizer::new(catalog, sync_config(1));
        assert_eq!(synchronizer.sync_metrics(42, &descriptors).unwrap(), 1);

        let existing = synchronizer
            .catalog()
            .metrics()
            .into_iter()
            .find(|m| m.name == "count")
            .unwrap();
        // The pre-existing definition is left exactly as it was.
        assert_eq!(existing.creator, 99);
        assert_eq!(existing.aggregation, "sum");
    }

    #[tokio::test]
    async fn tables_are_synced_independently() {
        let descriptors = orders_descriptors().await;
        let synchronizer = SchemaSynchronizer::new(LocalMetricCatalog::new(), sync_config(1));

        assert_eq!(synchronizer.sync_metrics(1, &descriptors).unwrap(), 2);
        assert_eq!(synchronizer.sync_metrics(2, &descriptors).unwrap(), 2);
        assert_eq!(synchronizer.catalog().retrieve_all(1).unwrap().len(), 2);
        assert_eq!(synchronizer.catalog().retrieve_all(2).unwrap().len(), 2);
    }
}
