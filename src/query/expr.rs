use serde::{Deserialize, Serialize};

/// Opaque field identifier, owned by the host query engine's namespace.
pub type FieldId = u64;

/// Time-bucket width applied to a time dimension.
///
/// `Default` is the unspecified sentinel carried by full-table-scan queries;
/// it never reaches the wire (see [`Granularity::or_day`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Default,
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Default for Granularity {
    fn default() -> Self {
        Granularity::Default
    }
}

impl Granularity {
    /// The backend requires an explicit granularity on every time dimension,
    /// so the unspecified sentinel normalizes to `day`.
    pub fn or_day(self) -> Granularity {
        match self {
            Granularity::Default => Granularity::Day,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    Asc,
    Desc,
}

/// One node of the generic query's expression tree.
///
/// Aggregation operands may nest further expressions, so aggregation and
/// time-bucket nodes can appear at arbitrary depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expr {
    /// Field reference by identifier.
    Field { id: FieldId },
    /// Datetime-bucketed field reference.
    BucketedField {
        id: FieldId,
        #[serde(default)]
        granularity: Granularity,
    },
    /// Aggregation carrying a display name, e.g. a derived metric.
    Aggregation {
        display_name: String,
        #[serde(default)]
        operands: Vec<Expr>,
    },
    /// Reference to the nth aggregation node in traversal order, 0-indexed.
    /// Only meaningful inside an order-by clause.
    AggregationAt { index: usize },
}

impl Expr {
    fn walk<'a, V: FnMut(&'a Expr)>(&'a self, visit: &mut V) {
        visit(self);
        if let Expr::Aggregation { operands, .. } = self {
            for operand in operands {
                operand.walk(visit);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub direction: OrderDirection,
    pub target: Expr,
}

/// The host engine's aggregate-query representation. Read-only to this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenericQuery {
    pub fields: Vec<Expr>,
    pub breakout: Vec<Expr>,
    pub aggregation: Vec<Expr>,
    pub order_by: Vec<OrderBy>,
    pub limit: Option<u64>,
}

impl GenericQuery {
    /// Pre-order walk over every expression in the query: fields, breakout,
    /// aggregation, then order-by targets. Matches are visited in traversal
    /// order, which pins the ordinal numbering of aggregation references.
    pub fn walk<'a, V: FnMut(&'a Expr)>(&'a self, mut visit: V) {
        for expr in self
            .fields
            .iter()
            .chain(self.breakout.iter())
            .chain(self.aggregation.iter())
        {
            expr.walk(&mut visit);
        }
        for order in &self.order_by {
            order.target.walk(&mut visit);
        }
    }
}
