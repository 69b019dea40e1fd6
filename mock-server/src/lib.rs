use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// The only token order routes accept in the `Authorization` header.
pub const TOKEN: &str = "test-token";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
}

/// Orders embed their owning user, giving clients a nested shape to flatten.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub item: String,
    pub quantity: u32,
    pub user: User,
}

fn one() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct CreateOrder {
    pub user_id: u64,
    pub item: String,
    #[serde(default = "one")]
    pub quantity: u32,
}

#[derive(Deserialize)]
pub struct UpdateOrder {
    pub item: Option<String>,
    pub quantity: Option<u32>,
}

#[derive(Deserialize)]
pub struct OrderFilter {
    /// Comma-separated item names.
    pub items: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

type Failure = (StatusCode, Json<ErrorBody>);

fn failure(status: StatusCode, code: &str) -> Failure {
    (
        status,
        Json(ErrorBody {
            error: code.to_string(),
        }),
    )
}

#[derive(Debug, Default)]
pub struct Store {
    users: HashMap<u64, User>,
    orders: Vec<Order>,
}

pub type Db = Arc<RwLock<Store>>;

/// Seeded with users 42 "Ann" and 99 "Bob" and no orders.
pub fn app() -> Router {
    let mut store = Store::default();
    for (id, name) in [(42, "Ann"), (99, "Bob")] {
        store.users.insert(
            id,
            User {
                id,
                name: name.to_string(),
            },
        );
    }
    let db: Db = Arc::new(RwLock::new(store));

    Router::new()
        .route("/users/{id}", get(get_user))
        .route("/users/{id}/orders", get(list_user_orders))
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/{id}",
            get(get_order)
                .put(update_order)
                .patch(update_order)
                .delete(delete_order),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn authorize(headers: &HeaderMap) -> Result<(), Failure> {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some(token) if token == TOKEN => Ok(()),
        _ => Err(failure(StatusCode::UNAUTHORIZED, "unauthorized")),
    }
}

async fn get_user(State(db): State<Db>, Path(id): Path<u64>) -> Result<Json<User>, Failure> {
    let store = db.read().await;
    store
        .users
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "not_found"))
}

async fn list_user_orders(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> Result<Json<Vec<Order>>, Failure> {
    authorize(&headers)?;
    let store = db.read().await;
    if !store.users.contains_key(&id) {
        return Err(failure(StatusCode::NOT_FOUND, "not_found"));
    }
    Ok(Json(
        store
            .orders
            .iter()
            .filter(|order| order.user.id == id)
            .cloned()
            .collect(),
    ))
}

async fn list_orders(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<Order>>, Failure> {
    authorize(&headers)?;
    let wanted: Option<Vec<&str>> = filter.items.as_deref().map(|items| items.split(',').collect());
    let store = db.read().await;
    Ok(Json(
        store
            .orders
            .iter()
            .filter(|order| {
                wanted
                    .as_ref()
                    .map_or(true, |items| items.contains(&order.item.as_str()))
            })
            .cloned()
            .collect(),
    ))
}

async fn create_order(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateOrder>,
) -> Result<(StatusCode, Json<Order>), Failure> {
    authorize(&headers)?;
    let mut store = db.write().await;
    let user = store
        .users
        .get(&input.user_id)
        .cloned()
        .ok_or_else(|| failure(StatusCode::UNPROCESSABLE_ENTITY, "unknown_user"))?;
    let order = Order {
        id: Uuid::new_v4(),
        item: input.item,
        quantity: input.quantity,
        user,
    };
    store.orders.push(order.clone());
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>, Failure> {
    authorize(&headers)?;
    let store = db.read().await;
    store
        .orders
        .iter()
        .find(|order| order.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "not_found"))
}

async fn update_order(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateOrder>,
) -> Result<Json<Order>, Failure> {
    authorize(&headers)?;
    let mut store = db.write().await;
    let order = store
        .orders
        .iter_mut()
        .find(|order| order.id == id)
        .ok_or_else(|| failure(StatusCode::NOT_FOUND, "not_found"))?;
    if let Some(item) = input.item {
        order.item = item;
    }
    if let Some(quantity) = input.quantity {
        order.quantity = quantity;
    }
    Ok(Json(order.clone()))
}

async fn delete_order(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, Failure> {
    authorize(&headers)?;
    let mut store = db.write().await;
    let before = store.orders.len();
    store.orders.retain(|order| order.id != id);
    if store.orders.len() == before {
        return Err(failure(StatusCode::NOT_FOUND, "not_found"));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_serializes_with_embedded_user() {
        let order = Order {
            id: Uuid::nil(),
            item: "apple".to_string(),
            quantity: 2,
            user: User {
                id: 42,
                name: "Ann".to_string(),
            },
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["id"], "00000000-0000-0000-0000-000000000000");
        assert_eq!(json["user"]["id"], 42);
        assert_eq!(json["user"]["name"], "Ann");
    }

    #[test]
    fn create_order_defaults_quantity_to_one() {
        let input: CreateOrder = serde_json::from_str(r#"{"user_id":42,"item":"pear"}"#).unwrap();
        assert_eq!(input.quantity, 1);
    }

    #[test]
    fn create_order_rejects_missing_item() {
        let result: Result<CreateOrder, _> = serde_json::from_str(r#"{"user_id":42}"#);
        assert!(result.is_err());
    }

    #[test]
    fn update_order_all_fields_optional() {
        let input: UpdateOrder = serde_json::from_str(r#"{}"#).unwrap();
        assert!(input.item.is_none());
        assert!(input.quantity.is_none());
    }

    #[test]
    fn authorize_requires_exact_token() {
        let mut headers = HeaderMap::new();
        assert!(authorize(&headers).is_err());
        headers.insert("authorization", "Bearer test-token".parse().unwrap());
        assert!(authorize(&headers).is_err());
        headers.insert("authorization", TOKEN.parse().unwrap());
        assert!(authorize(&headers).is_ok());
    }
}
