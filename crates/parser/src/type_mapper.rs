//! Type normalization
//!
//! Maps GraphQL wrapper chains and OpenAPI property schemas onto one
//! canonical type string. Lists are written as `[Inner]`.

use crate::graphql::TypeRef;
use crate::openapi::PropertySchema;

/// Terminal name used when a wrapper chain never reaches a named type
pub const UNKNOWN_TYPE: &str = "Unknown";

/// Maps source type descriptors to canonical type strings
pub struct TypeMapper;

impl TypeMapper {
    /// Unwrap a GraphQL type reference into `(canonical type, is_required)`
    ///
    /// Walks from the outermost wrapper inwards. Any `NON_NULL` in the chain
    /// marks the field required, so `[String!]` and `[String]!` both yield
    /// `("[String]", true)`. A chain that ends without a name terminates in
    /// `Unknown`.
    ///
    /// # Examples
    /// ```
    /// use graphmorph_parser::graphql::TypeRef;
    /// use graphmorph_parser::TypeMapper;
    ///
    /// let t = TypeRef::non_null(TypeRef::named("SCALAR", "String"));
    /// assert_eq!(TypeMapper::unwrap_graphql(&t), ("String".to_string(), true));
    /// ```
    pub fn unwrap_graphql(type_ref: &TypeRef) -> (String, bool) {
        let mut is_required = false;
        let mut depth = 0usize;
        let mut terminal = None;
        let mut current = Some(type_ref);

        while let Some(node) = current.filter(|n| !n.is_empty()) {
            match node.kind.as_deref() {
                Some("NON_NULL") => is_required = true,
                Some("LIST") => depth += 1,
                _ => {
                    if let Some(name) = node.name.as_deref() {
                        terminal = Some(name);
                        break;
                    }
                }
            }
            current = node.of_type.as_deref();
        }

        let name = terminal.unwrap_or(UNKNOWN_TYPE);
        let mut type_name = String::with_capacity(name.len() + depth * 2);
        type_name.push_str(&"[".repeat(depth));
        type_name.push_str(name);
        type_name.push_str(&"]".repeat(depth));

        (type_name, is_required)
    }

    /// Map an OpenAPI property schema to a canonical type string
    ///
    /// `$ref` wins over everything else; arrays resolve their items
    /// recursively; primitives go through [`TypeMapper::map_primitive`].
    /// A property without `type` is treated as an `object`.
    ///
    /// # Examples
    /// ```
    /// use graphmorph_parser::openapi::PropertySchema;
    /// use graphmorph_parser::TypeMapper;
    ///
    /// let pets = PropertySchema::array(PropertySchema::reference("#/definitions/Pet"));
    /// assert_eq!(TypeMapper::openapi_type(&pets), "[Pet]");
    /// ```
    pub fn openapi_type(prop: &PropertySchema) -> String {
        if let Some(ref ref_path) = prop.ref_path {
            return Self::resolve_ref(ref_path);
        }

        let type_name = prop
            .schema_type
            .as_ref()
            .and_then(|t| t.primary())
            .unwrap_or("object");

        if type_name == "array" {
            let item_type = match prop.items.as_deref() {
                Some(items) => Self::openapi_type(items),
                None => Self::map_primitive("object"),
            };
            return format!("[{}]", item_type);
        }

        Self::map_primitive(type_name)
    }

    /// Final path segment of a `$ref`
    ///
    /// `#/components/schemas/Pet` and `#/definitions/Pet` both give `Pet`.
    pub fn resolve_ref(ref_path: &str) -> String {
        ref_path.rsplit('/').next().unwrap_or(ref_path).to_string()
    }

    /// Map an OpenAPI primitive name to its canonical name
    ///
    /// Unknown names pass through unchanged.
    pub fn map_primitive(type_name: &str) -> String {
        match type_name {
            "string" => "String",
            "integer" => "Int",
            "number" => "Float",
            "boolean" => "Boolean",
            "object" => "Object",
            other => other,
        }
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string() -> TypeRef {
        TypeRef::named("SCALAR", "String")
    }

    #[test]
    fn test_unwrap_non_null() {
        assert_eq!(
            TypeMapper::unwrap_graphql(&TypeRef::non_null(string())),
            ("String".to_string(), true)
        );
    }

    #[test]
    fn test_unwrap_list_of_non_null() {
        let t = TypeRef::list(TypeRef::non_null(string()));
        assert_eq!(
            TypeMapper::unwrap_graphql(&t),
            ("[String]".to_string(), true)
        );
    }

    #[test]
    fn test_unwrap_non_null_list() {
        let t = TypeRef::non_null(TypeRef::list(string()));
        assert_eq!(
            TypeMapper::unwrap_graphql(&t),
            ("[String]".to_string(), true)
        );
    }

    #[test]
    fn test_unwrap_nullable_nested_lists() {
        let t = TypeRef::list(TypeRef::list(TypeRef::named("OBJECT", "Pet")));
        assert_eq!(
            TypeMapper::unwrap_graphql(&t),
            ("[[Pet]]".to_string(), false)
        );
    }

    #[test]
    fn test_unwrap_malformed() {
        assert_eq!(
            TypeMapper::unwrap_graphql(&TypeRef::default()),
            ("Unknown".to_string(), false)
        );

        // Wrapper whose ofType was cut off by the query depth
        let truncated = TypeRef {
            kind: Some("LIST".to_string()),
            name: None,
            of_type: None,
        };
        assert_eq!(
            TypeMapper::unwrap_graphql(&truncated),
            ("[Unknown]".to_string(), false)
        );
    }

    #[test]
    fn test_unwrap_skips_nameless_named_kind() {
        let t = TypeRef {
            kind: Some("OBJECT".to_string()),
            name: None,
            of_type: Some(Box::new(string())),
        };
        assert_eq!(
            TypeMapper::unwrap_graphql(&t),
            ("String".to_string(), false)
        );
    }

    #[test]
    fn test_resolve_ref() {
        assert_eq!(TypeMapper::resolve_ref("#/components/schemas/Pet"), "Pet");
        assert_eq!(TypeMapper::resolve_ref("#/definitions/Order"), "Order");
        assert_eq!(TypeMapper::resolve_ref("Plain"), "Plain");
    }

    #[test]
    fn test_openapi_primitives() {
        assert_eq!(
            TypeMapper::openapi_type(&PropertySchema::primitive("string")),
            "String"
        );
        assert_eq!(
            TypeMapper::openapi_type(&PropertySchema::primitive("integer")),
            "Int"
        );
        assert_eq!(
            TypeMapper::openapi_type(&PropertySchema::primitive("number")),
            "Float"
        );
        assert_eq!(
            TypeMapper::openapi_type(&PropertySchema::primitive("boolean")),
            "Boolean"
        );
        assert_eq!(
            TypeMapper::openapi_type(&PropertySchema::primitive("file")),
            "file"
        );
        assert_eq!(TypeMapper::openapi_type(&PropertySchema::default()), "Object");
    }

    #[test]
    fn test_openapi_arrays() {
        let pets = PropertySchema::array(PropertySchema::reference("#/definitions/Pet"));
        assert_eq!(TypeMapper::openapi_type(&pets), "[Pet]");

        let tags = PropertySchema::array(PropertySchema::primitive("string"));
        assert_eq!(TypeMapper::openapi_type(&tags), "[String]");

        let matrix = PropertySchema::array(PropertySchema::array(PropertySchema::primitive(
            "number",
        )));
        assert_eq!(TypeMapper::openapi_type(&matrix), "[[Float]]");

        let bare = PropertySchema {
            items: None,
            ..PropertySchema::primitive("array")
        };
        assert_eq!(TypeMapper::openapi_type(&bare), "[Object]");
    }

    #[test]
    fn test_ref_beats_type() {
        let prop = PropertySchema {
            ref_path: Some("#/components/schemas/Category".to_string()),
            ..PropertySchema::primitive("string")
        };
        assert_eq!(TypeMapper::openapi_type(&prop), "Category");
    }
}
