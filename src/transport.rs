use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Metadata request failed: {0}")]
    RequestFailed(String),
}

/// Issues the backend's read-only `GET meta` request and returns the raw
/// JSON body.
///
/// HTTP, authentication and retries are the host's concern; production
/// implementations live with the host and are wired into the driver
/// explicitly. [`LocalMetaTransport`] serves a canned body for tests and
/// local runs.
#[async_trait]
pub trait MetaTransport {
    async fn fetch_meta(&self) -> Result<Value, TransportError>;
}

/// In-memory [`MetaTransport`] serving a fixed metadata body.
#[derive(Debug, Clone)]
pub struct LocalMetaTransport {
    body: Value,
}

impl LocalMetaTransport {
    pub fn new(body: Value) -> Self {
        LocalMetaTransport { body }
    }

    /// A one-cube `orders` schema matching [`LocalFieldStore::mock`].
    ///
    /// [`LocalFieldStore::mock`]: crate::resolver::LocalFieldStore::mock
    pub fn mock() -> Self {
        Self::new(serde_json::json!({
            "cubes": [{
                "name": "orders",
                "schema": "public",
                "measures": [
                    {"name": "count", "type": "number", "description": "measure"},
                    {"name": "subtotal", "type": "number", "description": "measure"}
                ],
                "dimensions": [
                    {"name": "status", "type": "string", "description": "dimension"},
                    {"name": "created_at", "type": "time", "description": "dimension"}
                ]
            }]
        }))
    }
}

#[async_trait]
impl MetaTransport for LocalMetaTransport {
    async fn fetch_meta(&self) -> Result<Value, TransportError> {
        Ok(self.body.clone())
    }
}
