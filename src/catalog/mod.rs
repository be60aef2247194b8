pub mod cube_type;

use crate::resolver::FieldRole;
use crate::transport::MetaTransport;
use self::cube_type::{BaseType, CubeType};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A raw field as the metadata endpoint declares it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawField {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// One backend-exposed queryable entity, analogous to a table.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Cube {
    pub name: String,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub measures: Vec<RawField>,
    #[serde(default)]
    pub dimensions: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
struct MetaResponse {
    cubes: Vec<Cube>,
}

/// Normalized field metadata handed back to the host engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub declared_type: CubeType,
    pub base_type: BaseType,
    pub role: FieldRole,
    pub description: String,
    pub creation_time: bool,
}

impl FieldDescriptor {
    fn from_raw(raw: &RawField, role: FieldRole) -> Self {
        let declared_type = CubeType::from(raw.declared_type.as_str());
        FieldDescriptor {
            name: raw.name.clone(),
            declared_type,
            base_type: declared_type.base_type(),
            role,
            description: raw.description.clone().unwrap_or_default(),
            creation_time: declared_type.is_creation_time(),
        }
    }
}

impl Cube {
    /// Field inventory of this cube: measures first, then dimensions.
    pub fn field_descriptors(&self) -> Vec<FieldDescriptor> {
        self.measures
            .iter()
            .map(|raw| FieldDescriptor::from_raw(raw, FieldRole::Measure))
            .chain(
                self.dimensions
                    .iter()
                    .map(|raw| FieldDescriptor::from_raw(raw, FieldRole::Dimension)),
            )
            .collect()
    }
}

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("Cannot connect to analytics backend: {0}")]
    Connectivity(String),

    #[error("Cube not found: {0}")]
    CubeNotFound(String),
}

/// Fetches and normalizes the backend schema through a [`MetaTransport`].
///
/// Single-shot semantics: no retries, no caching. A transport failure and a
/// malformed body are the same thing to callers, "cannot connect".
pub struct CatalogClient<T: MetaTransport> {
    transport: T,
}

impl<T: MetaTransport> CatalogClient<T> {
    pub fn new(transport: T) -> Self {
        CatalogClient { transport }
    }

    pub async fn fetch_cubes(&self) -> Result<Vec<Cube>, DiscoveryError> {
        let body = self
            .transport
            .fetch_meta()
            .await
            .map_err(|e| DiscoveryError::Connectivity(e.to_string()))?;

        let meta: MetaResponse = serde_json::from_value(body)
            .map_err(|e| DiscoveryError::Connectivity(format!("malformed metadata body: {e}")))?;

        debug!("Fetched {} cubes from metadata endpoint", meta.cubes.len());
        Ok(meta.cubes)
    }

    pub async fn find_cube(&self, name: &str) -> Result<Cube, DiscoveryError> {
        self.fetch_cubes()
            .await?
            .into_iter()
            .find(|cube| cube.name == name)
            .ok_or_else(|| DiscoveryError::CubeNotFound(name.to_string()))
    }
}
