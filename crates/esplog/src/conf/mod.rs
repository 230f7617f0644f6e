pub mod lookup;
pub mod model;

pub use lookup::{AncillaryCatalog, TimezoneTable, VariableDef};
pub use model::ParserConfig;
