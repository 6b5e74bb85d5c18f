//! OpenAPI 3.x / Swagger 2.0 type definitions
//!
//! Only the parts needed for entity extraction. Maps are kept as ordered
//! `serde_json::Map`s so schemas and properties stay in declaration order;
//! individual entries are decoded on demand.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// OpenAPI or Swagger document root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version (3.x)
    #[serde(default)]
    pub openapi: Option<Value>,

    /// Swagger version (2.0)
    #[serde(default)]
    pub swagger: Option<Value>,

    /// API metadata
    #[serde(default)]
    pub info: Option<Info>,

    /// API paths (endpoints), in document order
    #[serde(default)]
    pub paths: Option<Map<String, Value>>,

    /// Reusable components (3.x)
    #[serde(default)]
    pub components: Option<Components>,

    /// Schema definitions (2.0)
    #[serde(default)]
    pub definitions: Option<Map<String, Value>>,
}

/// API information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Info {
    #[serde(default)]
    pub title: Option<String>,

    /// Usually a string, occasionally a bare number
    #[serde(default)]
    pub version: Option<Value>,

    #[serde(default)]
    pub description: Option<String>,
}

/// Reusable components
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: Option<Map<String, Value>>,
}

/// `type` keyword: a single name, or a list in OpenAPI 3.1
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Multiple(Vec<String>),
}

impl SchemaType {
    /// The effective type name; `null` entries of a 3.1 list are skipped
    pub fn primary(&self) -> Option<&str> {
        match self {
            SchemaType::Single(name) => Some(name.as_str()),
            SchemaType::Multiple(names) => names
                .iter()
                .map(String::as_str)
                .find(|name| *name != "null"),
        }
    }
}

/// Named schema definition (`components.schemas.X` or `definitions.X`)
///
/// Keys with an unexpected shape decode as absent instead of discarding
/// the whole definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDefinition {
    #[serde(rename = "type")]
    #[serde(default, deserialize_with = "lenient")]
    pub schema_type: Option<SchemaType>,

    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,

    /// Properties in declaration order
    #[serde(default, deserialize_with = "lenient")]
    pub properties: Option<Map<String, Value>>,

    /// Names of required properties
    #[serde(default, deserialize_with = "string_list")]
    pub required: Vec<String>,

    #[serde(rename = "enum")]
    #[serde(default, deserialize_with = "lenient")]
    pub enum_values: Option<Vec<Value>>,

    #[serde(rename = "allOf")]
    #[serde(default, deserialize_with = "lenient")]
    pub all_of: Option<Vec<Value>>,
}

impl SchemaDefinition {
    /// Decode a definition, treating unreadable entries as empty schemas
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    pub fn type_name(&self) -> Option<&str> {
        self.schema_type.as_ref().and_then(SchemaType::primary)
    }

    pub fn property_count(&self) -> usize {
        self.properties.as_ref().map_or(0, Map::len)
    }
}

/// Property definition inside a schema
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertySchema {
    /// Reference such as `#/components/schemas/Pet`
    #[serde(rename = "$ref")]
    #[serde(default, deserialize_with = "lenient")]
    pub ref_path: Option<String>,

    #[serde(rename = "type")]
    #[serde(default, deserialize_with = "lenient")]
    pub schema_type: Option<SchemaType>,

    /// Item schema for arrays; tuple-style `items` lists are not modelled
    #[serde(default, deserialize_with = "lenient")]
    pub items: Option<Box<PropertySchema>>,

    #[serde(default, deserialize_with = "lenient")]
    pub description: Option<String>,

    #[serde(rename = "enum")]
    #[serde(default, deserialize_with = "lenient")]
    pub enum_values: Option<Vec<Value>>,
}

impl PropertySchema {
    /// Decode a property, treating unreadable entries as empty schemas
    pub fn from_value(value: &Value) -> Self {
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    /// Reference to another schema
    pub fn reference(ref_path: &str) -> Self {
        Self {
            ref_path: Some(ref_path.to_string()),
            ..Self::default()
        }
    }

    /// Primitive of the given type name
    pub fn primitive(type_name: &str) -> Self {
        Self {
            schema_type: Some(SchemaType::Single(type_name.to_string())),
            ..Self::default()
        }
    }

    /// Array of `items`
    pub fn array(items: PropertySchema) -> Self {
        Self {
            schema_type: Some(SchemaType::Single("array".to_string())),
            items: Some(Box::new(items)),
            ..Self::default()
        }
    }
}

impl OpenApiDocument {
    /// `openapi` or `swagger` version marker
    pub fn version_marker(&self) -> Option<String> {
        self.openapi
            .as_ref()
            .or(self.swagger.as_ref())
            .map(scalar_text)
    }

    /// Named schemas: `components.schemas`, falling back to `definitions`
    pub fn schema_definitions(&self) -> Option<&Map<String, Value>> {
        let components = self
            .components
            .as_ref()
            .and_then(|c| c.schemas.as_ref())
            .filter(|schemas| !schemas.is_empty());

        components.or_else(|| self.definitions.as_ref().filter(|defs| !defs.is_empty()))
    }
}

/// Decode an optional key, mapping `null` or a mismatched shape to `None`
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decode a list of names, keeping only the string entries
fn string_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default())
}

/// Render a scalar JSON value as plain text (`"3.0.0"` → `3.0.0`, `2` → `2`)
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_schema_type_primary_skips_null() {
        let t: SchemaType = serde_json::from_value(json!(["null", "string"])).unwrap();
        assert_eq!(t.primary(), Some("string"));

        let t: SchemaType = serde_json::from_value(json!("integer")).unwrap();
        assert_eq!(t.primary(), Some("integer"));
    }

    #[test]
    fn test_schema_definitions_fall_back_to_definitions() {
        let doc: OpenApiDocument = serde_json::from_value(json!({
            "swagger": "2.0",
            "components": {"schemas": {}},
            "definitions": {"Pet": {"type": "object"}}
        }))
        .unwrap();

        let schemas = doc.schema_definitions().unwrap();
        assert!(schemas.contains_key("Pet"));
        assert_eq!(doc.version_marker().as_deref(), Some("2.0"));
    }

    #[test]
    fn test_malformed_keys_do_not_drop_definition() {
        let schema = SchemaDefinition::from_value(&json!({
            "type": "object",
            "required": null,
            "description": 42,
            "properties": {
                "id": {"type": "integer"},
                "tags": {"type": "array", "items": {"type": "string"}}
            }
        }));
        assert_eq!(schema.type_name(), Some("object"));
        assert_eq!(schema.property_count(), 2);
        assert!(schema.required.is_empty());
        assert!(schema.description.is_none());

        let schema = SchemaDefinition::from_value(&json!({"required": ["id", 7, "name"]}));
        assert_eq!(schema.required, ["id", "name"]);
    }

    #[test]
    fn test_tuple_items_keep_the_property() {
        let prop = PropertySchema::from_value(&json!({
            "type": "array",
            "description": "labels",
            "items": [{"type": "string"}]
        }));
        assert_eq!(prop.schema_type, Some(SchemaType::Single("array".to_string())));
        assert_eq!(prop.description.as_deref(), Some("labels"));
        assert!(prop.items.is_none());
    }

    #[test]
    fn test_unreadable_property_is_empty() {
        let prop = PropertySchema::from_value(&json!(true));
        assert!(prop.ref_path.is_none());
        assert!(prop.schema_type.is_none());
    }
}
