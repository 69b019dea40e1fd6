//! Request intents: what a caller wants done, before it becomes HTTP.
//!
//! `Intent` is a closed set of eight kinds. It deserializes from action-style
//! JSON (`{"type": "FETCH_ENTITY", "entity_type": "users", ...}`) so intents
//! can be queued or replayed as data and handed to `EntityClient::dispatch`.

use serde::Deserialize;
use serde_json::Value;

use crate::http::RequestOptions;
use crate::query::Query;
use crate::types::EntityId;

/// Fetch one entity, a collection, or a collection under the current user.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FetchIntent {
    pub entity_type: String,
    pub endpoint: String,
    #[serde(default)]
    pub query: Query,
    #[serde(default)]
    pub options: RequestOptions,
}

impl FetchIntent {
    pub fn new(entity_type: &str, endpoint: &str) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            endpoint: endpoint.to_string(),
            query: Query::new(),
            options: RequestOptions::default(),
        }
    }

    pub fn query(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.query.insert(key.to_string(), value.into());
        self
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// POST `entity` to `endpoint`. `options` are layered over the POST defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CreateIntent {
    pub entity_type: String,
    pub endpoint: String,
    pub entity: Value,
    #[serde(default)]
    pub options: RequestOptions,
}

impl CreateIntent {
    pub fn new(entity_type: &str, endpoint: &str, entity: Value) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            endpoint: endpoint.to_string(),
            entity,
            options: RequestOptions::default(),
        }
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// PUT `changes` to `endpoint`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UpdateIntent {
    pub entity_type: String,
    pub endpoint: String,
    pub changes: Value,
    /// Carried through to the emitted event untouched.
    #[serde(default)]
    pub success_message: Option<String>,
}

impl UpdateIntent {
    pub fn new(entity_type: &str, endpoint: &str, changes: Value) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            endpoint: endpoint.to_string(),
            changes,
            success_message: None,
        }
    }

    pub fn success_message(mut self, message: &str) -> Self {
        self.success_message = Some(message.to_string());
        self
    }
}

/// An update whose method and body the caller chooses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CustomUpdateIntent {
    pub entity_type: String,
    pub endpoint: String,
    #[serde(default)]
    pub options: RequestOptions,
}

impl CustomUpdateIntent {
    pub fn new(entity_type: &str, endpoint: &str, options: RequestOptions) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            endpoint: endpoint.to_string(),
            options,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeleteIntent {
    pub entity_type: String,
    pub endpoint: String,
    pub id: EntityId,
}

impl DeleteIntent {
    pub fn new(entity_type: &str, endpoint: &str, id: impl Into<EntityId>) -> Self {
        Self {
            entity_type: entity_type.to_string(),
            endpoint: endpoint.to_string(),
            id: id.into(),
        }
    }
}

/// A bare API call: no normalization, no event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CallIntent {
    pub endpoint: String,
    #[serde(default)]
    pub query: Query,
    #[serde(default)]
    pub options: RequestOptions,
}

impl CallIntent {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            query: Query::new(),
            options: RequestOptions::default(),
        }
    }

    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    FetchEntity(FetchIntent),
    FetchEntities(FetchIntent),
    FetchUserEntities(FetchIntent),
    CreateEntity(CreateIntent),
    UpdateEntity(UpdateIntent),
    CustomUpdateEntity(CustomUpdateIntent),
    DeleteEntity(DeleteIntent),
    CallApi(CallIntent),
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::FetchEntity(_) => "FETCH_ENTITY",
            Intent::FetchEntities(_) => "FETCH_ENTITIES",
            Intent::FetchUserEntities(_) => "FETCH_USER_ENTITIES",
            Intent::CreateEntity(_) => "CREATE_ENTITY",
            Intent::UpdateEntity(_) => "UPDATE_ENTITY",
            Intent::CustomUpdateEntity(_) => "CUSTOM_UPDATE_ENTITY",
            Intent::DeleteEntity(_) => "DELETE_ENTITY",
            Intent::CallApi(_) => "CALL_API",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use serde_json::json;

    #[test]
    fn fetch_action_deserializes_with_defaults() {
        let intent: Intent = serde_json::from_value(json!({
            "type": "FETCH_ENTITIES",
            "entity_type": "orders",
            "endpoint": "orders"
        }))
        .unwrap();
        assert_eq!(intent, Intent::FetchEntities(FetchIntent::new("orders", "orders")));
        assert_eq!(intent.name(), "FETCH_ENTITIES");
    }

    #[test]
    fn custom_update_action_carries_options() {
        let intent: Intent = serde_json::from_value(json!({
            "type": "CUSTOM_UPDATE_ENTITY",
            "entity_type": "orders",
            "endpoint": "orders/1",
            "options": {"method": "PATCH", "body": "{\"quantity\":3}"}
        }))
        .unwrap();
        let Intent::CustomUpdateEntity(update) = intent else {
            panic!("wrong variant");
        };
        assert_eq!(update.options.method, Some(HttpMethod::Patch));
        assert_eq!(update.options.body.as_deref(), Some(r#"{"quantity":3}"#));
    }

    #[test]
    fn action_headers_may_be_an_object() {
        let intent: Intent = serde_json::from_value(json!({
            "type": "CALL_API",
            "endpoint": "reports",
            "options": {"headers": {"X-Trace": "1"}}
        }))
        .unwrap();
        let Intent::CallApi(call) = intent else {
            panic!("wrong variant");
        };
        assert_eq!(call.options.header_value("x-trace"), Some("1"));
    }

    #[test]
    fn delete_action_accepts_numeric_and_string_ids() {
        let numeric: Intent = serde_json::from_value(json!({
            "type": "DELETE_ENTITY", "entity_type": "orders", "endpoint": "orders/7", "id": 7
        }))
        .unwrap();
        assert_eq!(numeric, Intent::DeleteEntity(DeleteIntent::new("orders", "orders/7", 7)));

        let text: Intent = serde_json::from_value(json!({
            "type": "DELETE_ENTITY", "entity_type": "orders", "endpoint": "orders/a", "id": "a"
        }))
        .unwrap();
        assert_eq!(text, Intent::DeleteEntity(DeleteIntent::new("orders", "orders/a", "a")));
    }

    #[test]
    fn unknown_action_type_is_rejected() {
        let result: Result<Intent, _> = serde_json::from_value(json!({"type": "CREATE_OR_UPDATE"}));
        assert!(result.is_err());
    }
}
