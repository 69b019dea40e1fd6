//! Schema-driven normalization of response bodies.
//!
//! # Design
//! Normalizing walks a response with the registered schema, replaces every
//! nested entity with its id and files the entity under
//! `entities[type][id]`. The top-level id (or ids, for a collection) becomes
//! `result`. Types without a schema pass through untouched. Everything here is
//! a pure function of the response, the entity type and the registry.

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::NormalizeError;
use crate::schema::{EntityRegistry, Relation, Schema};
use crate::transport::ApiResponse;
use crate::types::EntityId;

/// Flat entity tables plus the reference to the top-level object(s).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedGraph {
    /// Entity type to (id to entity).
    pub entities: BTreeMap<String, Map<String, Value>>,
    /// An id string, or an ordered array of id strings.
    pub result: Value,
}

impl NormalizedGraph {
    pub fn entity(&self, entity_type: &str, id: &str) -> Option<&Value> {
        self.entities.get(entity_type).and_then(|table| table.get(id))
    }
}

/// The output of normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Normalized {
    /// No schema applied; the response as received.
    PassThrough(ApiResponse),
    Graph(NormalizedGraph),
}

impl Normalized {
    pub fn graph(&self) -> Option<&NormalizedGraph> {
        match self {
            Normalized::Graph(graph) => Some(graph),
            Normalized::PassThrough(_) => None,
        }
    }
}

impl EntityRegistry {
    /// Normalize `response` as one entity of `entity_type`.
    pub fn normalize_single(&self, response: &ApiResponse, entity_type: &str) -> Result<Normalized, NormalizeError> {
        let (Some(schema), ApiResponse::Json(value)) = (self.schema(entity_type), response) else {
            return Ok(Normalized::PassThrough(response.clone()));
        };

        let mut flattener = Flattener::new(self);
        let result = flattener.root(value, entity_type, schema)?;
        Ok(Normalized::Graph(flattener.finish(result)))
    }

    /// Normalize `response` as an ordered sequence of `entity_type` entities.
    pub fn normalize_collection(
        &self,
        response: &ApiResponse,
        entity_type: &str,
    ) -> Result<Normalized, NormalizeError> {
        let (Some(schema), ApiResponse::Json(value)) = (self.schema(entity_type), response) else {
            return Ok(Normalized::PassThrough(response.clone()));
        };
        let Value::Array(items) = value else {
            return Err(NormalizeError::ExpectedCollection {
                entity_type: entity_type.to_string(),
            });
        };

        let mut flattener = Flattener::new(self);
        let ids = items
            .iter()
            .map(|item| flattener.root(item, entity_type, schema))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Normalized::Graph(flattener.finish(Value::Array(ids))))
    }

    /// Reassemble the nested object graph that `graph` was flattened from.
    ///
    /// Only string references are expanded, since flattening always writes
    /// the string key. A numeric bare id from the original response stays as
    /// it was. A bare string id naming an entity present in the graph cannot
    /// be told apart from a flattened reference and comes back expanded.
    /// An id that refers back to an entity already being expanded is left as
    /// a bare id, so cyclic references terminate.
    pub fn denormalize(&self, graph: &NormalizedGraph, entity_type: &str) -> Value {
        let mut expander = Expander {
            registry: self,
            graph,
            in_progress: HashSet::new(),
        };
        match &graph.result {
            Value::Array(ids) => Value::Array(ids.iter().map(|id| expander.entity(id, entity_type)).collect()),
            id => expander.entity(id, entity_type),
        }
    }
}

struct Flattener<'a> {
    registry: &'a EntityRegistry,
    entities: BTreeMap<String, Map<String, Value>>,
}

impl<'a> Flattener<'a> {
    fn new(registry: &'a EntityRegistry) -> Self {
        Self {
            registry,
            entities: BTreeMap::new(),
        }
    }

    fn finish(self, result: Value) -> NormalizedGraph {
        NormalizedGraph {
            entities: self.entities,
            result,
        }
    }

    /// A top-level entity must be an object.
    fn root(&mut self, value: &Value, entity_type: &str, schema: &Schema) -> Result<Value, NormalizeError> {
        if !value.is_object() {
            return Err(NormalizeError::ExpectedEntity {
                entity_type: entity_type.to_string(),
            });
        }
        self.entity(value, entity_type, schema)
    }

    /// File one entity and return its id. Nested non-objects (null, a bare
    /// id) are returned as they are.
    fn entity(&mut self, value: &Value, entity_type: &str, schema: &Schema) -> Result<Value, NormalizeError> {
        let Value::Object(object) = value else {
            return Ok(value.clone());
        };
        let id = object
            .get(&schema.id_attribute)
            .and_then(EntityId::from_json)
            .ok_or_else(|| NormalizeError::MissingId {
                entity_type: entity_type.to_string(),
                id_attribute: schema.id_attribute.clone(),
            })?;
        let key = id.to_string();

        let mut flat = object.clone();
        for (field, relation) in &schema.relations {
            if let Some(nested) = object.get(field) {
                let replaced = self.relation(nested, relation)?;
                flat.insert(field.clone(), replaced);
            }
        }

        let table = self.entities.entry(entity_type.to_string()).or_default();
        match table.get_mut(&key) {
            Some(Value::Object(existing)) => existing.extend(flat),
            _ => {
                table.insert(key.clone(), Value::Object(flat));
            }
        }
        Ok(Value::String(key))
    }

    fn relation(&mut self, nested: &Value, relation: &Relation) -> Result<Value, NormalizeError> {
        let registry = self.registry;
        let target = relation.target();
        let Some(schema) = registry.schema(target) else {
            return Ok(nested.clone());
        };
        match (relation, nested) {
            (Relation::Many(_), Value::Array(items)) => items
                .iter()
                .map(|item| self.entity(item, target, schema))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            (Relation::Many(_), other) => Ok(other.clone()),
            (Relation::One(_), value) => self.entity(value, target, schema),
        }
    }
}

struct Expander<'a> {
    registry: &'a EntityRegistry,
    graph: &'a NormalizedGraph,
    in_progress: HashSet<(String, String)>,
}

impl<'a> Expander<'a> {
    fn entity(&mut self, reference: &Value, entity_type: &str) -> Value {
        let registry: &'a EntityRegistry = self.registry;
        let graph: &'a NormalizedGraph = self.graph;
        let Value::String(key) = reference else {
            return reference.clone();
        };
        let Some(Value::Object(stored)) = graph.entity(entity_type, key) else {
            return reference.clone();
        };
        let Some(schema) = registry.schema(entity_type) else {
            return Value::Object(stored.clone());
        };
        let marker = (entity_type.to_string(), key.clone());
        if !self.in_progress.insert(marker.clone()) {
            return reference.clone();
        }

        let mut object = stored.clone();
        for (field, relation) in &schema.relations {
            let target = relation.target();
            if registry.schema(target).is_none() {
                continue;
            }
            let expanded = match (relation, object.get(field)) {
                (Relation::Many(_), Some(Value::Array(ids))) => {
                    Value::Array(ids.iter().map(|id| self.entity(id, target)).collect())
                }
                (Relation::One(_), Some(id)) => self.entity(id, target),
                _ => continue,
            };
            object.insert(field.clone(), expanded);
        }

        self.in_progress.remove(&marker);
        Value::Object(object)
    }
}
