use super::builder::TimeDimension;
use super::expr::{Expr, GenericQuery, OrderDirection};
use crate::resolver::{FieldResolver, FieldRole, FieldStore};
use indexmap::{IndexMap, IndexSet};
use log::warn;

/// Everything the tree walk recovers from a generic query, normalized and
/// deduplicated, in traversal order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub measures: IndexSet<String>,
    pub dimensions: IndexSet<String>,
    pub time_dimensions: IndexSet<TimeDimension>,
    pub order: IndexMap<String, OrderDirection>,
}

/// Walks the query tree and extracts measures, dimensions, time dimensions
/// and order-by pairs, independent of which shape the query takes (flat
/// field list or derived-metric aggregations).
pub fn extract<F: FieldStore>(query: &GenericQuery, resolver: &FieldResolver<F>) -> Extraction {
    let mut extraction = Extraction::default();

    // Flat field list: stored role decides whether a field is a measure or
    // a dimension.
    for field in &query.fields {
        if let Some(resolved) = resolver.resolve(field) {
            match resolved.role {
                FieldRole::Measure => extraction.measures.insert(resolved.name),
                FieldRole::Dimension => extraction.dimensions.insert(resolved.name),
            };
        }
    }

    // Aggregations carry their display name as the measure name. Tree
    // search, not flat list: aggregations may nest inside other clauses.
    query.walk(|expr| {
        if let Expr::Aggregation { display_name, .. } = expr {
            extraction.measures.insert(display_name.clone());
        }
    });

    // Breakout entries are plain groupings; bucketed ones are picked up by
    // the time-dimension search below instead.
    for breakout in &query.breakout {
        if let Expr::Field { .. } = breakout {
            if let Some(resolved) = resolver.resolve(breakout) {
                extraction.dimensions.insert(resolved.name);
            }
        }
    }

    query.walk(|expr| {
        if let Some(time) = resolver.resolve_time(expr) {
            extraction.time_dimensions.insert(time);
        }
    });

    let aggregation_names = aggregation_names(query);
    for order in &query.order_by {
        let name = match &order.target {
            Expr::AggregationAt { index } => {
                let name = aggregation_names.get(*index).cloned();
                if name.is_none() {
                    warn!("Skipping order-by on missing aggregation ordinal {}", index);
                }
                name
            }
            target => resolver.resolve(target).map(|resolved| resolved.name),
        };
        // Unresolved order-by entries are skipped outright rather than
        // recorded under a placeholder key.
        if let Some(name) = name {
            extraction.order.insert(name, order.direction);
        }
    }

    extraction
}

/// Display names of every aggregation node, in traversal order. Ordinal
/// references index into this list, 0-based.
fn aggregation_names(query: &GenericQuery) -> Vec<String> {
    let mut names = Vec::new();
    query.walk(|expr| {
        if let Expr::Aggregation { display_name, .. } = expr {
            names.push(display_name.clone());
        }
    });
    names
}
