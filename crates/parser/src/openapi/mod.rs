//! OpenAPI 3.x / Swagger 2.0 parser
//!
//! Parses named schemas of an OpenAPI document into SchemaEntity records.
//!
//! ## Mapping
//! - `$ref` → final path segment (`#/components/schemas/Pet` → `Pet`)
//! - `array` → `[<items>]`, items resolved recursively
//! - `string`/`integer`/`number`/`boolean`/`object` →
//!   `String`/`Int`/`Float`/`Boolean`/`Object`
//! - required-ness from the owning schema's `required` list
//!
//! ## Usage
//! ```rust,ignore
//! use graphmorph_parser::openapi::OpenApiParser;
//!
//! let parser = OpenApiParser::from_json(&spec_json, "petstore")?;
//! let report = parser.parse()?;
//! ```

mod converter;
mod parser;
mod types;

pub use converter::{classify, convert_document, convert_schema};
pub use parser::OpenApiParser;
pub use types::*;
