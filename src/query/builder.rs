use super::expr::{Granularity, OrderDirection};
use super::matcher::Extraction;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeDimension {
    pub dimension: String,
    pub granularity: Granularity,
}

/// The backend's wire-format query object.
///
/// Wire contract: a key whose collection is empty must be omitted entirely,
/// never sent as an empty collection. `limit: 0` is an explicit limit and is
/// kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendQuery {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub measures: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub time_dimensions: Vec<TimeDimension>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub order: IndexMap<String, OrderDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

impl BackendQuery {
    /// Pure assembly from an extraction. No cross-field validation happens
    /// here: a partially-unresolved query still produces a best-effort
    /// request.
    pub fn from_extraction(extraction: Extraction, limit: Option<u64>) -> Self {
        BackendQuery {
            measures: extraction.measures.into_iter().collect(),
            dimensions: extraction.dimensions.into_iter().collect(),
            time_dimensions: extraction.time_dimensions.into_iter().collect(),
            order: extraction.order,
            limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_query_serializes_to_empty_object() {
        let query = BackendQuery::default();
        assert_eq!(serde_json::to_value(&query).unwrap(), json!({}));
    }

    #[test]
    fn explicit_zero_limit_is_kept() {
        let query = BackendQuery {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&query).unwrap(), json!({"limit": 0}));
    }

    #[test]
    fn populated_query_uses_wire_key_names() {
        let mut order = IndexMap::new();
        order.insert("count".to_string(), OrderDirection::Desc);
        let query = BackendQuery {
            measures: vec!["count".to_string()],
            dimensions: vec!["status".to_string()],
            time_dimensions: vec![TimeDimension {
                dimension: "created_at".to_string(),
                granularity: Granularity::Month,
            }],
            order,
            limit: Some(10),
        };

        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "measures": ["count"],
                "dimensions": ["status"],
                "timeDimensions": [{"dimension": "created_at", "granularity": "month"}],
                "order": {"count": "desc"},
                "limit": 10
            })
        );
    }
}
