use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{Attributes, Validity, DEFAULT_VALIDITY_DAYS};
use crate::error::{payload, require, ApiError};
use crate::query::{sort_by_key, ListQuery, Listing};
use crate::store::{new_id, CertificateDraft, Enrollment, Profile, Reference, SeatReference, Store};
use crate::{AppState, Db};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/enrollment", post(create))
        .route("/enrollment/redeem", post(redeem))
        .route("/enrollment/{id}", get(fetch_by_code))
        .route("/enrollment/{id}/status", get(status))
        .route("/enrollment/certificate/{id}", get(fetch_by_certificate))
        .route("/enrollment-details", get(list_details))
        .route("/enrollment-details/{id}", get(fetch_details))
        .route("/manual-enrollment", post(create_manual))
        .route("/manual-enrollment/renew/{id}", post(renew_manual))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct EnrollmentRequest {
    profile: Reference,
    seat: Option<SeatReference>,
    email: Option<String>,
    common_name: Option<String>,
    attributes: Option<Attributes>,
    tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RedeemRequest {
    enrollment_code: String,
    csr: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ManualRequest {
    profile: Reference,
    seat: Option<SeatReference>,
    csr: String,
    validity: Option<Validity>,
    attributes: Option<Attributes>,
    tags: Vec<String>,
    approver_email: Option<String>,
}

fn active_profile<'a>(store: &'a Store, id: &str) -> Result<&'a Profile, ApiError> {
    require("profile.id", id)?;
    let profile = store
        .profile(id)
        .ok_or_else(|| ApiError::validation(format!("unknown profile {id}")))?;
    if profile.status != "active" {
        return Err(ApiError::validation(format!("profile {id} is {}", profile.status)));
    }
    Ok(profile)
}

/// `ABCD-EF01-2345` style redemption code.
fn enrollment_code() -> String {
    let hex = Uuid::new_v4().simple().to_string().to_uppercase();
    format!("{}-{}-{}", &hex[0..4], &hex[4..8], &hex[8..12])
}

fn summary(enrollment: &Enrollment, message: &str) -> Value {
    json!({
        "enrollment_id": enrollment.id,
        "enrollment_code": enrollment.enrollment_code,
        "status": enrollment.status,
        "message": message,
    })
}

async fn create(
    State(db): State<Db>,
    body: Result<Json<EnrollmentRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let request = payload(body)?;
    let mut store = db.write().await;
    let profile_name = active_profile(&store, &request.profile.id)?.name.clone();

    let now = Utc::now();
    let enrollment = Enrollment {
        id: new_id(),
        enrollment_code: enrollment_code(),
        status: "pending".to_string(),
        profile_id: request.profile.id,
        profile_name,
        seat_id: request.seat.map(|s| s.seat_id),
        certificate_id: None,
        common_name: request
            .common_name
            .or(request.attributes.and_then(|a| a.common_name)),
        email: request.email,
        tags: request.tags,
        created_at: now,
        updated_at: now,
    };
    let body = summary(&enrollment, "Enrollment created");
    store.enrollments.push(enrollment);
    Ok((StatusCode::CREATED, Json(body)))
}

async fn fetch_by_code(
    State(db): State<Db>,
    Path(code): Path<String>,
) -> Result<Json<Enrollment>, ApiError> {
    let store = db.read().await;
    store
        .enrollments
        .iter()
        .find(|e| e.enrollment_code == code)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("enrollment"))
}

async fn status(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    let enrollment = store
        .enrollments
        .iter()
        .find(|e| e.id == id)
        .ok_or_else(|| ApiError::not_found("enrollment"))?;
    Ok(Json(json!({
        "status": enrollment.status,
        "certificate_id": enrollment.certificate_id,
        "message": format!("Enrollment is {}", enrollment.status),
        "last_updated": enrollment.updated_at,
    })))
}

async fn redeem(
    State(db): State<Db>,
    body: Result<Json<RedeemRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let request = payload(body)?;
    require("enrollment_code", &request.enrollment_code)?;
    require("csr", &request.csr)?;

    let mut store = db.write().await;
    let index = store
        .enrollments
        .iter()
        .position(|e| e.enrollment_code == request.enrollment_code)
        .ok_or_else(|| ApiError::not_found("enrollment"))?;
    if store.enrollments[index].status != "pending" {
        return Err(ApiError::conflict(
            "ALREADY_REDEEMED",
            "enrollment code has already been used",
        ));
    }

    let draft = {
        let enrollment = &store.enrollments[index];
        CertificateDraft {
            profile_id: enrollment.profile_id.clone(),
            common_name: enrollment.common_name.clone(),
            seat_id: enrollment.seat_id.clone(),
            validity_days: DEFAULT_VALIDITY_DAYS,
            tags: enrollment.tags.clone(),
            ..Default::default()
        }
    };
    let certificate = store.mint(draft);
    store.certificates.push(certificate.clone());

    let enrollment = &mut store.enrollments[index];
    enrollment.status = "redeemed".to_string();
    enrollment.certificate_id = Some(certificate.id.clone());
    enrollment.updated_at = Utc::now();
    tracing::info!(code = %enrollment.enrollment_code, serial = %certificate.serial_number, "enrollment redeemed");

    Ok(Json(json!({"certificate": certificate})))
}

/// Record a manual enrollment, issuing at once unless the profile needs approval.
fn enroll_manually(
    store: &mut Store,
    request: ManualRequest,
    fallback_common_name: Option<String>,
) -> Result<Value, ApiError> {
    require("csr", &request.csr)?;
    let profile = active_profile(store, &request.profile.id)?;
    let needs_approval = profile.require_approval;
    let profile_name = profile.name.clone();

    let common_name = request
        .attributes
        .and_then(|a| a.common_name)
        .or(fallback_common_name);
    let seat_id = request.seat.map(|s| s.seat_id);

    let certificate_id = if needs_approval {
        None
    } else {
        let certificate = store.mint(CertificateDraft {
            profile_id: request.profile.id.clone(),
            common_name: common_name.clone(),
            seat_id: seat_id.clone(),
            validity_days: Validity::days(request.validity.as_ref())?,
            tags: request.tags.clone(),
            ..Default::default()
        });
        let id = certificate.id.clone();
        store.certificates.push(certificate);
        Some(id)
    };

    let now = Utc::now();
    let enrollment = Enrollment {
        id: new_id(),
        enrollment_code: enrollment_code(),
        status: if needs_approval { "pending_approval" } else { "issued" }.to_string(),
        profile_id: request.profile.id,
        profile_name,
        seat_id,
        certificate_id,
        common_name,
        email: request.approver_email,
        tags: request.tags,
        created_at: now,
        updated_at: now,
    };
    let message = if needs_approval {
        "Enrollment awaiting approval"
    } else {
        "Certificate issued"
    };
    let body = summary(&enrollment, message);
    store.enrollments.push(enrollment);
    Ok(body)
}

async fn create_manual(
    State(db): State<Db>,
    body: Result<Json<ManualRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let request = payload(body)?;
    let mut store = db.write().await;
    let body = enroll_manually(&mut store, request, None)?;
    Ok((StatusCode::CREATED, Json(body)))
}

async fn renew_manual(
    State(db): State<Db>,
    Path(certificate_id): Path<String>,
    body: Result<Json<ManualRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let request = payload(body)?;
    let mut store = db.write().await;
    let common_name = store
        .certificate_by_id(&certificate_id)
        .ok_or_else(|| ApiError::not_found("certificate"))?
        .common_name
        .clone();
    let body = enroll_manually(&mut store, request, common_name)?;
    Ok((StatusCode::CREATED, Json(body)))
}

async fn list_details(
    State(db): State<Db>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<Value>, ApiError> {
    let query = ListQuery::new(pairs);
    let page = query.page()?;

    let store = db.read().await;
    let mut enrollments: Vec<Enrollment> = store
        .enrollments
        .iter()
        .filter(|e| query.get("status").map_or(true, |s| e.status == s))
        .filter(|e| query.get("profile_id").map_or(true, |p| e.profile_id == p))
        .cloned()
        .collect();

    match query.get("sort_by") {
        Some("created_at") => sort_by_key(&mut enrollments, query.descending(), |e| {
            Some(e.created_at.to_rfc3339())
        }),
        Some("status") => sort_by_key(&mut enrollments, query.descending(), |e| Some(e.status.clone())),
        _ => {}
    }

    Ok(Json(Listing::paginate(enrollments, page).into_json("enrollments")))
}

async fn fetch_details(
    State(db): State<Db>,
    Path(id): Path<String>,
) -> Result<Json<Enrollment>, ApiError> {
    let store = db.read().await;
    store
        .enrollments
        .iter()
        .find(|e| e.id == id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("enrollment"))
}

async fn fetch_by_certificate(
    State(db): State<Db>,
    Path(certificate_id): Path<String>,
) -> Result<Json<Enrollment>, ApiError> {
    let store = db.read().await;
    store
        .enrollments
        .iter()
        .find(|e| e.certificate_id.as_deref() == Some(certificate_id.as_str()))
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::not_found("enrollment"))
}
