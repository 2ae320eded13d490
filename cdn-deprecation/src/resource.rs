//! Resource - Planned resources as seen by the create guard

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Unique identifier for a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    /// Resource type (e.g., "cdn_profile", "cdn_frontdoor_route")
    #[serde(rename = "type")]
    pub resource_type: String,
    /// Resource name (identifier specified in configuration)
    pub name: String,
}

impl ResourceId {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.name)
    }
}

/// Attribute value of a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    String(String),
    List(Vec<Value>),
    Map(HashMap<String, Value>),
}

/// Desired state of a resource about to be created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(flatten)]
    pub id: ResourceId,
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ResourceId::new(resource_type, name),
            attributes: HashMap::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// String attribute, if present and a string
    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.attributes.get(key) {
            Some(Value::String(s)) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_from_json() {
        let json = r#"{
            "type": "cdn_profile",
            "name": "legacy",
            "attributes": {
                "sku": "Standard_Microsoft",
                "tags": { "env": "prod" },
                "origin_ports": [80, 443],
                "enabled": true
            }
        }"#;

        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.id, ResourceId::new("cdn_profile", "legacy"));
        assert_eq!(resource.get_string("sku"), Some("Standard_Microsoft"));
        assert_eq!(resource.attributes.get("enabled"), Some(&Value::Bool(true)));
        assert_eq!(
            resource.attributes.get("origin_ports"),
            Some(&Value::List(vec![Value::Int(80), Value::Int(443)]))
        );
        assert!(matches!(resource.attributes.get("tags"), Some(Value::Map(_))));
    }

    #[test]
    fn test_resource_without_attributes() {
        let resource: Resource =
            serde_json::from_str(r#"{"type": "cdn_endpoint", "name": "ep"}"#).unwrap();
        assert!(resource.attributes.is_empty());
        assert_eq!(resource.get_string("sku"), None);
    }

    #[test]
    fn test_get_string_ignores_other_types() {
        let resource = Resource::new("cdn_profile", "p").with_attribute("sku", Value::Int(1));
        assert_eq!(resource.get_string("sku"), None);
    }

    #[test]
    fn test_resource_id_display() {
        assert_eq!(
            ResourceId::new("frontdoor", "main").to_string(),
            "frontdoor.main"
        );
    }
}
