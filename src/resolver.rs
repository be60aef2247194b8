use crate::query::builder::TimeDimension;
use crate::query::expr::{Expr, FieldId};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Role a field plays in the cube model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldRole {
    Measure,
    Dimension,
}

impl FieldRole {
    /// Parses the role tag the host stashes in a field's description slot.
    pub fn from_tag(tag: &str) -> Option<FieldRole> {
        match tag {
            "measure" => Some(FieldRole::Measure),
            "dimension" => Some(FieldRole::Dimension),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredField {
    pub name: String,
    pub role: FieldRole,
}

/// Query-time field store, indexed by the host engine's field identifiers.
///
/// Populated by the host from the field inventory that discovery returns;
/// this crate only issues read-only lookups against it.
pub trait FieldStore {
    fn lookup(&self, id: FieldId) -> Option<StoredField>;
}

/// In-memory [`FieldStore`] for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct LocalFieldStore {
    fields: HashMap<FieldId, StoredField>,
}

impl LocalFieldStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: FieldId, name: &str, role: FieldRole) {
        self.fields.insert(
            id,
            StoredField {
                name: name.to_string(),
                role,
            },
        );
    }

    /// A store describing the `orders` cube used across the test suite.
    pub fn mock() -> Self {
        let mut store = Self::new();
        store.insert(1, "count", FieldRole::Measure);
        store.insert(2, "status", FieldRole::Dimension);
        store.insert(3, "created_at", FieldRole::Dimension);
        store.insert(4, "subtotal", FieldRole::Measure);
        store
    }
}

impl FieldStore for LocalFieldStore {
    fn lookup(&self, id: FieldId) -> Option<StoredField> {
        self.fields.get(&id).cloned()
    }
}

/// Resolves abstract field references to concrete field names and roles.
///
/// Unresolvable references are dropped, not raised: a stale or foreign
/// reference must not block the rest of the query from translating.
pub struct FieldResolver<'a, F: FieldStore> {
    store: &'a F,
}

impl<'a, F: FieldStore> FieldResolver<'a, F> {
    pub fn new(store: &'a F) -> Self {
        FieldResolver { store }
    }

    pub fn resolve(&self, expr: &Expr) -> Option<StoredField> {
        match expr {
            Expr::Field { id } => self.lookup(*id),
            // A bucketed reference resolves through its inner field id.
            Expr::BucketedField { id, .. } => self.lookup(*id),
            _ => None,
        }
    }

    /// Resolves a datetime-bucketed reference to a wire-shape time dimension,
    /// normalizing the unspecified granularity sentinel to `day`.
    pub fn resolve_time(&self, expr: &Expr) -> Option<TimeDimension> {
        match expr {
            Expr::BucketedField { id, granularity } => {
                self.lookup(*id).map(|field| TimeDimension {
                    dimension: field.name,
                    granularity: granularity.or_day(),
                })
            }
            _ => None,
        }
    }

    fn lookup(&self, id: FieldId) -> Option<StoredField> {
        let field = self.store.lookup(id);
        if field.is_none() {
            warn!("Dropping unresolved field reference: {}", id);
        }
        field
    }
}
