pub mod builder;
pub mod expr;
pub mod matcher;

pub use builder::{BackendQuery, TimeDimension};
pub use expr::{Expr, FieldId, GenericQuery, Granularity, OrderBy, OrderDirection};
pub use matcher::{extract, Extraction};
