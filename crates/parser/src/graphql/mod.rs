//! GraphQL introspection parser
//!
//! Turns the result of an introspection query into SchemaEntity records.
//!
//! ## Mapping
//! - `OBJECT`, `INTERFACE`, `INPUT_OBJECT`, `UNION`, `ENUM` → one entity each,
//!   the introspection kind kept as entity kind
//! - `SCALAR` and `__*` types → skipped
//! - enum values → `ENUM_VALUE` fields, always required
//!
//! ## Usage
//! ```rust,ignore
//! use graphmorph_parser::graphql::GraphqlParser;
//!
//! let parser = GraphqlParser::from_json(&introspection_json, "countries")?;
//! let report = parser.parse()?;
//! ```

mod converter;
mod parser;
mod types;

pub use converter::{convert_schema, convert_type};
pub use parser::GraphqlParser;
pub use types::*;
