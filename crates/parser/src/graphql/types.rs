//! GraphQL introspection type definitions
//!
//! Every field is optional: servers differ in what they return and the
//! normalizer falls back to safe defaults instead of rejecting a payload.

use serde::{Deserialize, Serialize};

/// `__schema` object of an introspection result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntrospectionSchema {
    /// Root query type
    #[serde(rename = "queryType")]
    #[serde(default)]
    pub query_type: Option<NamedType>,

    /// Root mutation type
    #[serde(rename = "mutationType")]
    #[serde(default)]
    pub mutation_type: Option<NamedType>,

    /// Root subscription type
    #[serde(rename = "subscriptionType")]
    #[serde(default)]
    pub subscription_type: Option<NamedType>,

    /// All types known to the server, built-ins included
    #[serde(default)]
    pub types: Option<Vec<FullType>>,
}

/// Bare `{ name }` reference
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamedType {
    #[serde(default)]
    pub name: Option<String>,
}

/// One entry of `__schema.types`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FullType {
    /// `OBJECT`, `INTERFACE`, `UNION`, `ENUM`, `INPUT_OBJECT` or `SCALAR`
    #[serde(default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Output fields (objects and interfaces)
    #[serde(default)]
    pub fields: Option<Vec<Field>>,

    /// Input fields (input objects)
    #[serde(rename = "inputFields")]
    #[serde(default)]
    pub input_fields: Option<Vec<Field>>,

    /// Enum values (enums)
    #[serde(rename = "enumValues")]
    #[serde(default)]
    pub enum_values: Option<Vec<EnumValue>>,
}

impl FullType {
    /// Names starting with `__` belong to the introspection system itself
    pub fn is_introspection_internal(&self) -> bool {
        self.name.as_deref().is_some_and(|n| n.starts_with("__"))
    }

    /// Number of members shown in digests: fields, input fields or enum values
    pub fn member_count(&self) -> usize {
        [
            self.fields.as_ref().map(Vec::len),
            self.input_fields.as_ref().map(Vec::len),
            self.enum_values.as_ref().map(Vec::len),
        ]
        .into_iter()
        .flatten()
        .find(|&n| n > 0)
        .unwrap_or(0)
    }
}

/// Field or input value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Wrapped type reference
    #[serde(rename = "type")]
    #[serde(default)]
    pub field_type: Option<TypeRef>,
}

/// Enum value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnumValue {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// Type reference as a chain of `NON_NULL` / `LIST` wrappers
///
/// `[String!]!` arrives as
/// `NON_NULL { ofType: LIST { ofType: NON_NULL { ofType: SCALAR String } } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    #[serde(default)]
    pub kind: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(rename = "ofType")]
    #[serde(default)]
    pub of_type: Option<Box<TypeRef>>,
}

impl TypeRef {
    /// Terminal reference with a concrete name
    pub fn named(kind: &str, name: &str) -> Self {
        Self {
            kind: Some(kind.to_string()),
            name: Some(name.to_string()),
            of_type: None,
        }
    }

    /// `NON_NULL` wrapper around `inner`
    pub fn non_null(inner: TypeRef) -> Self {
        Self::wrapper("NON_NULL", inner)
    }

    /// `LIST` wrapper around `inner`
    pub fn list(inner: TypeRef) -> Self {
        Self::wrapper("LIST", inner)
    }

    fn wrapper(kind: &str, inner: TypeRef) -> Self {
        Self {
            kind: Some(kind.to_string()),
            name: None,
            of_type: Some(Box::new(inner)),
        }
    }

    /// True when no key of the reference is set
    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.name.is_none() && self.of_type.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_deserializes_null_of_type() {
        let json = r#"{"kind": "SCALAR", "name": "String", "ofType": null}"#;
        let type_ref: TypeRef = serde_json::from_str(json).unwrap();
        assert_eq!(type_ref, TypeRef::named("SCALAR", "String"));
    }

    #[test]
    fn test_member_count_prefers_first_non_empty() {
        let json = r#"{
            "kind": "INPUT_OBJECT",
            "name": "PetInput",
            "fields": null,
            "inputFields": [{"name": "a"}, {"name": "b"}],
            "enumValues": null
        }"#;
        let full_type: FullType = serde_json::from_str(json).unwrap();
        assert_eq!(full_type.member_count(), 2);
        assert!(!full_type.is_introspection_internal());
    }
}
