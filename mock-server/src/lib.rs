use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub age: i64,
    pub active: bool,
    pub score: f64,
}

#[derive(Deserialize)]
pub struct NewUser {
    pub name: String,
    pub age: i64,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub score: f64,
}

#[derive(Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub active: Option<bool>,
    pub score: Option<f64>,
}

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResult {
    pub query: String,
    pub count: i64,
}

pub type Db = Arc<RwLock<HashMap<Uuid, User>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/search", get(search))
        .route("/status/{code}", get(status))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// The client only treats 200 as success, so creation answers 200 too.
async fn create_user(State(db): State<Db>, Json(input): Json<NewUser>) -> Json<User> {
    let user = User {
        id: Uuid::new_v4(),
        name: input.name,
        age: input.age,
        active: input.active,
        score: input.score,
    };
    debug!(id = %user.id, "created user");
    db.write().await.insert(user.id, user.clone());
    Json(user)
}

async fn get_user(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<User>, StatusCode> {
    let users = db.read().await;
    users.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn update_user(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UserPatch>,
) -> Result<Json<User>, StatusCode> {
    let mut users = db.write().await;
    let user = users.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(age) = input.age {
        user.age = age;
    }
    if let Some(active) = input.active {
        user.active = active;
    }
    if let Some(score) = input.score {
        user.score = score;
    }
    Ok(Json(user.clone()))
}

async fn delete_user(State(db): State<Db>, Path(id): Path<Uuid>) -> Result<Json<User>, StatusCode> {
    let mut users = db.write().await;
    users.remove(&id).map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn search(State(db): State<Db>, Query(query): Query<SearchQuery>) -> Json<SearchResult> {
    let users = db.read().await;
    let count = users
        .values()
        .filter(|user| user.name.contains(&query.q))
        .count() as i64;
    Json(SearchResult {
        query: query.q,
        count,
    })
}

/// Answer with whatever status the path names.
async fn status(Path(code): Path<u16>) -> (StatusCode, Json<serde_json::Value>) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(serde_json::json!({ "code": status.as_u16() })))
}
