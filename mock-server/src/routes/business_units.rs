use std::collections::BTreeMap;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{payload, require, ApiError};
use crate::query::{contains, sort_by_key, ListQuery, Listing};
use crate::store::{new_id, Admin, BusinessUnit, Store, DEFAULT_BUSINESS_UNIT_ID};
use crate::{AppState, Db};

const SEATS_PER_UNIT: u64 = 100;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/business-unit", get(list).post(create))
        .route("/business-unit/{id}", get(fetch).put(update).delete(remove))
        .route("/business-unit/{id}/licensed-seats", get(licensed_seats))
        .route("/business-unit/{id}/admin", get(list_admins).post(add_admin))
        .route("/business-unit/{id}/admin/{admin_id}", delete(remove_admin))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct UnitRequest {
    name: String,
    description: Option<String>,
    parent_id: Option<String>,
    tags: Vec<String>,
    custom_attributes: BTreeMap<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AdminRequest {
    email: String,
    first_name: String,
    last_name: String,
    role: String,
}

/// Shared checks for create and update; `current` is the unit being replaced.
fn validate(store: &Store, request: &UnitRequest, current: Option<&str>) -> Result<(), ApiError> {
    require("name", &request.name)?;

    let duplicate = store
        .business_units
        .iter()
        .any(|b| b.name.eq_ignore_ascii_case(&request.name) && Some(b.id.as_str()) != current);
    if duplicate {
        return Err(ApiError::conflict(
            "DUPLICATE_NAME",
            format!("business unit {:?} already exists", request.name),
        ));
    }

    if let Some(parent) = request.parent_id.as_deref().filter(|p| !p.is_empty()) {
        if Some(parent) == current {
            return Err(ApiError::validation("a business unit cannot be its own parent"));
        }
        if store.business_unit(parent).is_none() {
            return Err(ApiError::validation(format!("unknown parent_id {parent}")));
        }
    }

    Ok(())
}

async fn create(
    State(db): State<Db>,
    body: Result<Json<UnitRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BusinessUnit>), ApiError> {
    let request = payload(body)?;
    let mut store = db.write().await;
    validate(&store, &request, None)?;

    let now = Utc::now();
    let unit = BusinessUnit {
        id: new_id(),
        name: request.name,
        description: request.description,
        parent_id: request.parent_id.filter(|p| !p.is_empty()),
        account_id: "account-1".to_string(),
        is_active: true,
        licensed_seats: SEATS_PER_UNIT,
        used_seats: 0,
        available_seats: SEATS_PER_UNIT,
        tags: request.tags,
        custom_attributes: request.custom_attributes,
        created_at: now,
        updated_at: now,
    };
    tracing::info!(id = %unit.id, name = %unit.name, "business unit created");
    store.business_units.push(unit.clone());
    Ok((StatusCode::CREATED, Json(unit)))
}

async fn fetch(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<BusinessUnit>, ApiError> {
    let store = db.read().await;
    store
        .business_unit(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("business unit"))
}

async fn update(
    State(db): State<Db>,
    Path(id): Path<String>,
    body: Result<Json<UnitRequest>, JsonRejection>,
) -> Result<Json<BusinessUnit>, ApiError> {
    let request = payload(body)?;
    let mut store = db.write().await;
    if store.business_unit(&id).is_none() {
        return Err(ApiError::not_found("business unit"));
    }
    validate(&store, &request, Some(&id))?;

    let unit = store
        .business_units
        .iter_mut()
        .find(|b| b.id == id)
        .ok_or_else(|| ApiError::not_found("business unit"))?;
    unit.name = request.name;
    unit.description = request.description;
    unit.parent_id = request.parent_id.filter(|p| !p.is_empty());
    unit.tags = request.tags;
    unit.custom_attributes = request.custom_attributes;
    unit.updated_at = Utc::now();
    Ok(Json(unit.clone()))
}

async fn remove(State(db): State<Db>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    if store.business_unit(&id).is_none() {
        return Err(ApiError::not_found("business unit"));
    }
    if id == DEFAULT_BUSINESS_UNIT_ID {
        return Err(ApiError::conflict(
            "DEFAULT_UNIT",
            "the default business unit cannot be deleted",
        ));
    }
    if store
        .business_units
        .iter()
        .any(|b| b.parent_id.as_deref() == Some(id.as_str()))
    {
        return Err(ApiError::conflict(
            "HAS_CHILDREN",
            "business unit has child units",
        ));
    }

    store.business_units.retain(|b| b.id != id);
    store.admins.remove(&id);
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
    let mut units: Vec<BusinessUnit> = store
        .business_units
        .iter()
        .filter(|b| query.get("name").map_or(true, |n| contains(Some(b.name.as_str()), n)))
        .filter(|b| query.get("parent_id").map_or(true, |p| b.parent_id.as_deref() == Some(p)))
        .filter(|b| active.map_or(true, |a| b.is_active == a))
        .cloned()
        .collect();

    if query.get("sort_by") == Some("name") {
        sort_by_key(&mut units, query.descending(), |b| Some(b.name.to_lowercase()));
    }

    Ok(Json(Listing::paginate(units, page).into_json("business_units")))
}

async fn licensed_seats(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    let unit = store
        .business_unit(&id)
        .ok_or_else(|| ApiError::not_found("business unit"))?;
    Ok(Json(json!({
        "total_seats": unit.licensed_seats,
        "used_seats": unit.used_seats,
        "available_seats": unit.available_seats,
        "seat_types": [{
            "type": "SSL",
            "total": unit.licensed_seats,
            "used": unit.used_seats,
            "available": unit.available_seats,
        }],
    })))
}

async fn add_admin(
    State(db): State<Db>,
    Path(id): Path<String>,
    body: Result<Json<AdminRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Admin>), ApiError> {
    let request = payload(body)?;
    require("email", &request.email)?;
    require("role", &request.role)?;

    let mut store = db.write().await;
    if store.business_unit(&id).is_none() {
        return Err(ApiError::not_found("business unit"));
    }

    let admins = store.admins.entry(id).or_default();
    if admins.iter().any(|a| a.email.eq_ignore_ascii_case(&request.email)) {
        return Err(ApiError::conflict(
            "DUPLICATE_ADMIN",
            format!("{} is already an administrator", request.email),
        ));
    }

    let admin = Admin {
        id: new_id(),
        email: request.email,
        first_name: request.first_name,
        last_name: request.last_name,
        role: request.role,
        is_active: true,
        created_at: Utc::now(),
    };
    admins.push(admin.clone());
    Ok((StatusCode::CREATED, Json(admin)))
}

async fn list_admins(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Admin>>, ApiError> {
    let store = db.read().await;
    if store.business_unit(&id).is_none() {
        return Err(ApiError::not_found("business unit"));
    }
    Ok(Json(store.admins.get(&id).cloned().unwrap_or_default()))
}

async fn remove_admin(
    State(db): State<Db>,
    Path((id, admin_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    if store.business_unit(&id).is_none() {
        return Err(ApiError::not_found("business unit"));
    }

    let admins = store.admins.entry(id).or_default();
    let before = admins.len();
    admins.retain(|a| a.id != admin_id);
    if admins.len() == before {
        return Err(ApiError::not_found("administrator"));
    }
    Ok(StatusCode::NO_CONTENT)
}
