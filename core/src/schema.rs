//! Entity schema registry.
//!
//! # Design
//! Each entity type maps to an optional `Schema`. A schema names the id
//! attribute and the fields that hold nested entities of other types.
//! Relations point at types by name rather than embedding the target schema,
//! so cyclic shapes (a user listing orders that each embed their user) need no
//! shared mutable definitions. The registry is built once at startup, shared
//! behind an `Arc`, and never mutated afterwards.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_id_attribute() -> String {
    "id".to_string()
}

/// A field holding nested entities of another type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    One(String),
    Many(String),
}

impl Relation {
    pub fn target(&self) -> &str {
        match self {
            Relation::One(target) | Relation::Many(target) => target,
        }
    }
}

/// The nested-reference shape of one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    #[serde(default = "default_id_attribute")]
    pub id_attribute: String,
    #[serde(default)]
    pub relations: BTreeMap<String, Relation>,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            id_attribute: default_id_attribute(),
            relations: BTreeMap::new(),
        }
    }
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id_attribute(mut self, name: &str) -> Self {
        self.id_attribute = name.to_string();
        self
    }

    pub fn one(mut self, field: &str, entity_type: &str) -> Self {
        self.relations
            .insert(field.to_string(), Relation::One(entity_type.to_string()));
        self
    }

    pub fn many(mut self, field: &str, entity_type: &str) -> Self {
        self.relations
            .insert(field.to_string(), Relation::Many(entity_type.to_string()));
        self
    }
}

/// Entity type name to optional schema. Types without a schema, and types
/// not registered at all, pass through normalization untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRegistry {
    entries: HashMap<String, Option<Schema>>,
}

impl EntityRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Load a registry from JSON, e.g.
    /// `{"users": {"relations": {"orders": {"many": "orders"}}}, "notes": null}`.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn schema(&self, entity_type: &str) -> Option<&Schema> {
        self.entries.get(entity_type).and_then(Option::as_ref)
    }

    pub fn contains(&self, entity_type: &str) -> bool {
        self.entries.contains_key(entity_type)
    }

    pub fn entity_types(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: HashMap<String, Option<Schema>>,
}

impl RegistryBuilder {
    pub fn entity(mut self, entity_type: &str, schema: Schema) -> Self {
        self.entries.insert(entity_type.to_string(), Some(schema));
        self
    }

    /// Register a type whose responses are never normalized.
    pub fn untyped(mut self, entity_type: &str) -> Self {
        self.entries.insert(entity_type.to_string(), None);
        self
    }

    pub fn build(self) -> EntityRegistry {
        EntityRegistry {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_registers_schemas_and_untyped_entries() {
        let registry = EntityRegistry::builder()
            .entity("orders", Schema::new().one("user", "users"))
            .untyped("notes")
            .build();

        assert!(registry.contains("notes"));
        assert!(registry.schema("notes").is_none());
        assert!(registry.schema("missing").is_none());

        let orders = registry.schema("orders").unwrap();
        assert_eq!(orders.id_attribute, "id");
        assert_eq!(orders.relations["user"], Relation::One("users".to_string()));
    }

    #[test]
    fn loads_from_json() {
        let registry = EntityRegistry::from_json_str(
            r#"{
                "users": {"relations": {"orders": {"many": "orders"}}},
                "orders": {"id_attribute": "uuid", "relations": {"user": {"one": "users"}}},
                "notes": null
            }"#,
        )
        .unwrap();

        assert_eq!(registry.schema("orders").unwrap().id_attribute, "uuid");
        assert_eq!(
            registry.schema("users").unwrap().relations["orders"].target(),
            "orders"
        );
        assert!(registry.contains("notes"));
        assert!(registry.schema("notes").is_none());
        assert_eq!(registry.entity_types().count(), 3);
    }

    #[test]
    fn rejects_unknown_relation_kind() {
        let err = EntityRegistry::from_json_str(r#"{"users": {"relations": {"x": {"some": "y"}}}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Registry(_)));
    }
}
