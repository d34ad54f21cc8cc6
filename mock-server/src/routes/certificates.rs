use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{attribute_map, Attributes, CustomAttribute, Validity};
use crate::error::{payload, require, ApiError};
use crate::query::{contains, sort_by_key, ListQuery, Listing};
use crate::store::{new_id, Certificate, CertificateDraft, Reference, SeatReference, DEFERRED_PROFILE_ID};
use crate::{AppState, Db};

const CA_CHAIN: &str = "-----BEGIN CERTIFICATE-----\nMIIBmockIssuingCA\n-----END CERTIFICATE-----";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/certificate", post(issue))
        .route("/certificate/{serial}", get(get_by_serial))
        .route("/certificate/{serial}/revoke", put(revoke).delete(unrevoke))
        .route("/certificate/{serial}/renew", post(renew))
        .route("/certificate/{serial}/additional-formats", get(additional_formats))
        .route("/certificate-by-id/{id}", get(get_by_id))
        .route("/certificate-search", get(search))
        .route("/certificate-pickup/{request_id}", post(pickup))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IssueRequest {
    profile: Reference,
    seat: Option<SeatReference>,
    csr: Option<String>,
    validity: Option<Validity>,
    include_ca_chain: bool,
    attributes: Option<Attributes>,
    tags: Vec<String>,
    custom_attributes: Vec<CustomAttribute>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RenewRequest {
    validity: Option<Validity>,
    include_ca_chain: bool,
    attributes: Option<Attributes>,
    tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RevokeRequest {
    reason: String,
    comment: Option<String>,
}

fn issued(certificate: &Certificate, include_chain: bool) -> Value {
    let mut body = json!({"certificate": certificate});
    if include_chain {
        body["chain"] = json!([CA_CHAIN]);
    }
    body
}

async fn issue(
    State(db): State<Db>,
    body: Result<Json<IssueRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = payload(body)?;
    require("profile.id", &request.profile.id)?;

    let mut store = db.write().await;
    let profile = store
        .profile(&request.profile.id)
        .ok_or_else(|| ApiError::validation(format!("unknown profile {}", request.profile.id)))?;
    if profile.status != "active" {
        return Err(ApiError::validation(format!("profile {} is {}", profile.id, profile.status)));
    }
    let deferred = profile.id == DEFERRED_PROFILE_ID;

    let common_name = request
        .attributes
        .and_then(|a| a.common_name)
        .filter(|cn| !cn.is_empty());
    if common_name.is_none() && request.csr.as_deref().unwrap_or_default().is_empty() {
        return Err(ApiError::validation("csr or attributes.common_name is required"));
    }

    let certificate = store.mint(CertificateDraft {
        profile_id: request.profile.id,
        common_name,
        seat_id: request.seat.map(|s| s.seat_id),
        validity_days: Validity::days(request.validity.as_ref())?,
        tags: request.tags,
        custom_attributes: attribute_map(request.custom_attributes),
    });

    if deferred {
        let request_id = new_id();
        tracing::info!(%request_id, "certificate issuance deferred");
        store.pending.insert(request_id.clone(), certificate);
        return Ok((StatusCode::ACCEPTED, Json(json!({"request_id": request_id}))).into_response());
    }

    tracing::info!(serial = %certificate.serial_number, "certificate issued");
    store.certificates.push(certificate.clone());
    Ok((StatusCode::CREATED, Json(issued(&certificate, request.include_ca_chain))).into_response())
}

async fn get_by_serial(
    State(db): State<Db>,
    Path(serial): Path<String>,
) -> Result<Json<Certificate>, ApiError> {
    let store = db.read().await;
    store
        .certificate_by_serial(&serial)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("certificate"))
}

async fn get_by_id(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Certificate>, ApiError> {
    let store = db.read().await;
    store
        .certificate_by_id(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("certificate"))
}

async fn search(
    State(db): State<Db>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let query = ListQuery::new(pairs);
    let page = query.page()?;
    let tags = query.get_all("tags");

    let store = db.read().await;
    let mut items: Vec<Certificate> = store
        .certificates
        .iter()
        .filter(|c| query.get("common_name").map_or(true, |cn| contains(c.common_name.as_deref(), cn)))
        .filter(|c| query.get("serial_number").map_or(true, |s| c.serial_number == s))
        .filter(|c| query.get("status").map_or(true, |s| c.status == s))
        .filter(|c| query.get("profile_id").map_or(true, |p| c.profile.id == p))
        .filter(|c| tags.iter().all(|t| c.tags.iter().any(|ct| ct == t)))
        .cloned()
        .collect();

    match query.get("sort_by") {
        Some("common_name") => sort_by_key(&mut items, query.descending(), |c| c.common_name.clone()),
        Some("serial_number") => {
            sort_by_key(&mut items, query.descending(), |c| Some(c.serial_number.clone()))
        }
        Some("valid_to") => sort_by_key(&mut items, query.descending(), |c| Some(c.valid_to.clone())),
        _ => {}
    }

    Ok(Json(Listing::paginate(items, page).into_json("items")))
}

async fn revoke(
    State(db): State<Db>,
    Path(serial): Path<String>,
    body: Result<Json<RevokeRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let request = payload(body)?;
    require("reason", &request.reason)?;

    let mut store = db.write().await;
    let certificate = store
        .certificate_by_serial_mut(&serial)
        .ok_or_else(|| ApiError::not_found("certificate"))?;
    if certificate.status == "revoked" {
        return Err(ApiError::conflict("ALREADY_REVOKED", "certificate is already revoked"));
    }

    certificate.status = "revoked".to_string();
    certificate.revocation_reason = Some(request.reason);
    tracing::info!(%serial, comment = ?request.comment, "certificate revoked");
    Ok(StatusCode::NO_CONTENT)
}

async fn unrevoke(
    State(db): State<Db>,
    Path(serial): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mut store = db.write().await;
    let certificate = store
        .certificate_by_serial_mut(&serial)
        .ok_or_else(|| ApiError::not_found("certificate"))?;
    if certificate.revocation_reason.as_deref() != Some("certificate_hold") {
        return Err(ApiError::conflict(
            "NOT_ON_HOLD",
            "only certificates revoked with certificate_hold can be reinstated",
        ));
    }

    certificate.status = "issued".to_string();
    certificate.revocation_reason = None;
    Ok(StatusCode::NO_CONTENT)
}

async fn renew(
    State(db): State<Db>,
    Path(serial): Path<String>,
    body: Result<Json<RenewRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = payload(body)?;

    let mut store = db.write().await;
    let original = store
        .certificate_by_serial(&serial)
        .cloned()
        .ok_or_else(|| ApiError::not_found("certificate"))?;
    if original.status == "revoked" {
        return Err(ApiError::conflict("REVOKED", "a revoked certificate cannot be renewed"));
    }

    let common_name = request
        .attributes
        .and_then(|a| a.common_name)
        .or(original.common_name);
    let tags = if request.tags.is_empty() {
        original.tags
    } else {
        request.tags
    };
    let renewed = store.mint(CertificateDraft {
        profile_id: original.profile.id,
        common_name,
        seat_id: original.seat.map(|s| s.seat_id),
        validity_days: Validity::days(request.validity.as_ref())?,
        tags,
        custom_attributes: original.custom_attributes,
    });
    store.certificates.push(renewed.clone());

    Ok(Json(issued(&renewed, request.include_ca_chain)))
}

async fn additional_formats(
    State(db): State<Db>,
    Path(serial): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    let certificate = store
        .certificate_by_serial(&serial)
        .ok_or_else(|| ApiError::not_found("certificate"))?;

    let pem = format!(
        "-----BEGIN CERTIFICATE-----\n{}\n-----END CERTIFICATE-----",
        certificate.certificate
    );
    Ok(Json(json!({
        "formats": {
            "der": certificate.certificate,
            "pem": pem,
            "p7b": format!("MIIP7B{}", certificate.serial_number),
        }
    })))
}

async fn pickup(
    State(db): State<Db>,
    Path(request_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut store = db.write().await;
    let certificate = store
        .pending
        .remove(&request_id)
        .ok_or_else(|| ApiError::not_found("certificate request"))?;
    store.certificates.push(certificate.clone());
    Ok(Json(issued(&certificate, false)))
}
