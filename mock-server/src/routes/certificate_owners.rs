use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{payload, require, ApiError};
use crate::query::{contains, sort_by_key, ListQuery, Listing};
use crate::store::{new_id, Owner, Store};
use crate::{AppState, Db};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/certificate-owners", get(list).post(create))
        .route("/certificate-owners/{id}", get(fetch).put(update).delete(remove))
        .route(
            "/certificate-owners/certificate/{id}",
            put(assign).delete(unassign),
        )
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OwnerRequest {
    email: String,
    first_name: String,
    last_name: String,
    phone_number: Option<String>,
    job_title: Option<String>,
    company: Option<String>,
    department: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Assignment {
    owner_ids: Vec<String>,
}

fn validate(store: &Store, request: &OwnerRequest, current: Option<&str>) -> Result<(), ApiError> {
    require("email", &request.email)?;
    require("first_name", &request.first_name)?;
    require("last_name", &request.last_name)?;
    if !request.email.contains('@') {
        return Err(ApiError::validation(format!("invalid email {:?}", request.email)));
    }

    let taken = store
        .owners
        .iter()
        .any(|o| o.email.eq_ignore_ascii_case(&request.email) && Some(o.id.as_str()) != current);
    if taken {
        return Err(ApiError::conflict(
            "DUPLICATE_EMAIL",
            format!("an owner with email {} already exists", request.email),
        ));
    }
    Ok(())
}

async fn create(
    State(db): State<Db>,
    body: Result<Json<OwnerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Owner>), ApiError> {
    let request = payload(body)?;
    let mut store = db.write().await;
    validate(&store, &request, None)?;

    let now = Utc::now();
    let owner = Owner {
        id: new_id(),
        email: request.email,
        first_name: request.first_name,
        last_name: request.last_name,
        phone_number: request.phone_number,
        job_title: request.job_title,
        company: request.company,
        department: request.department,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    store.owners.push(owner.clone());
    Ok((StatusCode::CREATED, Json(owner)))
}

async fn fetch(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Owner>, ApiError> {
    let store = db.read().await;
    store
        .owners
        .iter()
        .find(|o| o.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("certificate owner"))
}

async fn update(
    State(db): State<Db>,
    Path(id): Path<String>,
    body: Result<Json<OwnerRequest>, JsonRejection>,
) -> Result<Json<Owner>, ApiError> {
    let request = payload(body)?;
    let mut store = db.write().await;
    if !store.owners.iter().any(|o| o.id == id) {
        return Err(ApiError::not_found("certificate owner"));
    }
    validate(&store, &request, Some(&id))?;

    let owner = store
        .owners
        .iter_mut()
        .find(|o| o.id == id)
        .ok_or_else(|| ApiError::not_found("certificate owner"))?;
    owner.email = request.email;
    owner.first_name = request.first_name;
    owner.last_name = request.last_name;
    owner.phone_number = request.phone_number;
    owner.job_title = request.job_title;
    owner.company = request.company;
    owner.department = request.department;
    owner.updated_at = Utc::now();
    Ok(Json(owner.clone()))
}

async fn remove(State(db): State<Db>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    let before = store.owners.len();
    store.owners.retain(|o| o.id != id);
    if store.owners.len() == before {
        return Err(ApiError::not_found("certificate owner"));
    }
    for owners in store.assignments.values_mut() {
        owners.retain(|o| *o != id);
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list(
    State(db): State<Db>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let query = ListQuery::new(pairs);
    let page = query.page()?;
    let active = query.flag("is_active")?;

    let store = db.read().await;
    let mut owners: Vec<Owner> = store
        .owners
        .iter()
        .filter(|o| query.get("email").map_or(true, |e| contains(Some(o.email.as_str()), e)))
        .filter(|o| {
            query
                .get("first_name")
                .map_or(true, |n| contains(Some(o.first_name.as_str()), n))
        })
        .filter(|o| {
            query
                .get("last_name")
                .map_or(true, |n| contains(Some(o.last_name.as_str()), n))
        })
        .filter(|o| active.map_or(true, |a| o.is_active == a))
        .cloned()
        .collect();

    match query.get("sort_by") {
        Some("email") => sort_by_key(&mut owners, query.descending(), |o| Some(o.email.clone())),
        Some("last_name") => {
            sort_by_key(&mut owners, query.descending(), |o| Some(o.last_name.clone()))
        }
        _ => {}
    }

    Ok(Json(Listing::paginate(owners, page).into_json("certificate_owners")))
}

async fn assign(
    State(db): State<Db>,
    Path(certificate_id): Path<String>,
    body: Result<Json<Assignment>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = payload(body)?;
    if request.owner_ids.is_empty() {
        return Err(ApiError::validation("owner_ids must not be empty"));
    }

    let mut store = db.write().await;
    if store.certificate_by_id(&certificate_id).is_none() {
        return Err(ApiError::not_found("certificate"));
    }
    if let Some(unknown) = request
        .owner_ids
        .iter()
        .find(|id| !store.owners.iter().any(|o| &o.id == *id))
    {
        return Err(ApiError::validation(format!("unknown owner {unknown}")));
    }

    store.assignments.insert(certificate_id, request.owner_ids);
    Ok(StatusCode::NO_CONTENT)
}

async fn unassign(
    State(db): State<Db>,
    Path(certificate_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    if store.certificate_by_id(&certificate_id).is_none() {
        return Err(ApiError::not_found("certificate"));
    }
    store.assignments.remove(&certificate_id);
    Ok(StatusCode::NO_CONTENT)
}
