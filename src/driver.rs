use crate::catalog::{CatalogClient, DiscoveryError, FieldDescriptor};
use crate::config::SyncConfig;
use crate::query::{self, BackendQuery, GenericQuery};
use crate::resolver::{FieldResolver, FieldStore};
use crate::sync::{MetricCatalog, MetricCatalogError, SchemaSynchronizer, TableId};
use crate::transport::MetaTransport;
use log::{debug, info};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    MetricCatalog(#[from] MetricCatalogError),
}

/// The driver bridging the host query engine to a cube-model analytics
/// backend.
///
/// One concrete type wired explicitly by the host with its transport, field
/// store and metric catalog. Lifecycle per table is two-phase: first
/// [`describe_table`] (discover the cube, register metrics, hand the field
/// inventory back to the host, which populates the field store), then
/// [`translate`] resolves incoming queries against that store. Translating
/// before discovery simply finds no field references to resolve.
///
/// [`describe_table`]: CubeDriver::describe_table
/// [`translate`]: CubeDriver::translate
pub struct CubeDriver<T, F, C>
where
    T: MetaTransport,
    F: FieldStore,
    C: MetricCatalog,
{
    catalog: CatalogClient<T>,
    fields: F,
    synchronizer: SchemaSynchronizer<C>,
}

impl<T, F, C> CubeDriver<T, F, C>
where
    T: MetaTransport,
    F: FieldStore,
    C: MetricCatalog,
{
    pub fn new(transport: T, fields: F, metrics: C, sync_config: SyncConfig) -> Self {
        CubeDriver {
            catalog: CatalogClient::new(transport),
            fields,
            synchronizer: SchemaSynchronizer::new(metrics, sync_config),
        }
    }

    /// Connection check: one metadata round-trip, result discarded.
    pub async fn test_connection(&self) -> Result<(), DiscoveryError> {
        self.catalog.fetch_cubes().await.map(|_| ())
    }

    /// Discovery phase: fetch the named cube, register missing metrics for
    /// the table, and return the normalized field inventory.
    pub async fn describe_table(
        &self,
        table: TableId,
        cube_name: &str,
    ) -> Result<Vec<FieldDescriptor>, DriverError> {
        let cube = self.catalog.find_cube(cube_name).await?;
        let descriptors = cube.field_descriptors();
        self.synchronizer.sync_metrics(table, &descriptors)?;
        info!(
            "Described table {} (cube {}): {} fields",
            table,
            cube_name,
            descriptors.len()
        );
        Ok(descriptors)
    }

    /// Translation phase: pure and synchronous. Unresolvable references are
    /// dropped; ambiguous queries still produce a best-effort request.
    pub fn translate(&self, generic: &GenericQuery) -> BackendQuery {
        let resolver = FieldResolver::new(&self.fields);
        let extraction = query::extract(generic, &resolver);
        let backend = BackendQuery::from_extraction(extraction, generic.limit);
        debug!(
            "Translated query: {}",
            serde_json::to_string(&backend).unwrap_or_default()
        );
        backend
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::query::{Expr, Granularity, OrderBy, OrderDirection};
    use crate::resolver::{FieldRole, LocalFieldStore};
    use crate::sync::LocalMetricCatalog;
    use crate::transport::{LocalMetaTransport, MetaTransport, TransportError};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct DownTransport;

    #[async_trait]
    impl MetaTransport for DownTransport {
        async fn fetch_meta(&self) -> Result<Value, TransportError> {
            Err(TransportError::RequestFailed("timed out".to_string()))
        }
    }

    fn driver_with(
        transport: LocalMetaTransport,
        fields: LocalFieldStore,
    ) -> CubeDriver<LocalMetaTransport, LocalFieldStore, LocalMetricCatalog> {
        CubeDriver::new(
            transport,
            fields,
            LocalMetricCatalog::new(),
            SyncConfig { system_actor: 1 },
        )
    }

    #[test_log::test(tokio::test)]
    async fn discover_then_translate_round_trip() {
        let driver = driver_with(LocalMetaTransport::mock(), LocalFieldStore::mock());

        // Phase 1: discovery registers metrics and returns the inventory.
        let descriptors = driver.describe_table(42, "orders").await.unwrap();
        assert_eq!(descriptors.len(), 4);
        assert_eq!(
            descriptors
                .iter()
                .filter(|d| d.role == FieldRole::Measure)
                .count(),
            2
        );

        // Phase 2: translation against the populated field store.
        let generic = GenericQuery {
            fields: vec![Expr::Field { id: 1 }, Expr::Field { id: 2 }],
            breakout: vec![Expr::BucketedField {
                id: 3,
                granularity: Granularity::Month,
            }],
            order_by: vec![OrderBy {
                direction: OrderDirection::Desc,
                target: Expr::Field { id: 1 },
            }],
            limit: Some(10),
            ..Default::default()
        };
        let backend = driver.translate(&generic);
        assert_eq!(
            serde_json::to_value(&backend).unwrap(),
            json!({
                "measures": ["count"],
                "dimensions": ["status"],
                "timeDimensions": [{"dimension": "created_at", "granularity": "month"}],
                "order": {"count": "desc"},
                "limit": 10
            })
        );
    }

    #[test_log::test(tokio::test)]
    async fn translate_before_discovery_resolves_nothing() {
        let driver = driver_with(LocalMetaTransport::mock(), LocalFieldStore::new());
        let generic = GenericQuery {
            fields: vec![Expr::Field { id: 1 }, Expr::Field { id: 2 }],
            limit: Some(10),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(driver.translate(&generic)).unwrap(),
            json!({"limit": 10})
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_connection_surfaces_cannot_connect() {
        let driver = CubeDriver::new(
            DownTransport,
            LocalFieldStore::new(),
            LocalMetricCatalog::new(),
            SyncConfig { system_actor: 1 },
        );
        let err = driver.test_connection().await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Connectivity(_)));
    }

    #[test_log::test(tokio::test)]
    async fn describe_unknown_cube_fails_discovery() {
        let driver = driver_with(LocalMetaTransport::mock(), LocalFieldStore::mock());
        let err = driver.describe_table(42, "invoices").await.unwrap_err();
        assert!(matches!(
            err,
            DriverError::Discovery(DiscoveryError::CubeNotFound(_))
        ));
    }
}
