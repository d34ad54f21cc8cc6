use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::query::{contains, sort_by_key, ListQuery, Listing};
use crate::store::Profile;
use crate::{AppState, Db};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profiles", get(list))
        .route("/profiles/public", get(list_public))
        .route("/profiles/templates", get(list_templates))
        .route("/profiles/{id}", get(fetch))
}

async fn list(
    State(db): State<Db>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let query = ListQuery::new(pairs);
    let page = query.page()?;

    let store = db.read().await;
    let mut profiles: Vec<Profile> = store
        .profiles
        .iter()
        .filter(|p| query.get("name").map_or(true, |n| contains(Some(p.name.as_str()), n)))
        .filter(|p| query.get("type").map_or(true, |t| p.profile_type == t))
        .filter(|p| query.get("status").map_or(true, |s| p.status == s))
        .filter(|p| {
            query
                .get("enrollment_method")
                .map_or(true, |m| p.enrollment_method == m)
        })
        .cloned()
        .collect();

    if query.get("sort_by") == Some("name") {
        sort_by_key(&mut profiles, query.descending(), |p| Some(p.name.clone()));
    }

    Ok(Json(Listing::paginate(profiles, page).into_json("profiles")))
}

async fn list_public(
    State(db): State<Db>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let page = ListQuery::new(pairs).page()?;
    let store = db.read().await;
    let profiles: Vec<Profile> = store
        .profiles
        .iter()
        .filter(|p| p.public && p.status == "active")
        .cloned()
        .collect();
    Ok(Json(Listing::paginate(profiles, page).into_json("profiles")))
}

async fn list_templates(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    Json(json!({"templates": store.templates}))
}

async fn fetch(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Profile>, ApiError> {
    let store = db.read().await;
    store
        .profile(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("profile"))
}
