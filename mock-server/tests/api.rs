use axum::http::{self, Request, StatusCode};
use axum::routing::RouterIntoService;
use http_body_util::BodyExt;
use mock_server::{app, app_with_key, API_KEY};
use serde_json::Value;
use tower::{Service, ServiceExt};

const BASE: &str = "/mpki/api/v1";

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(path: &str) -> Request<String> {
    Request::builder()
        .uri(format!("{BASE}{path}"))
        .header("x-api-key", API_KEY)
        .body(String::new())
        .unwrap()
}

fn delete(path: &str) -> Request<String> {
    Request::builder()
        .method("DELETE")
        .uri(format!("{BASE}{path}"))
        .header("x-api-key", API_KEY)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, path: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(format!("{BASE}{path}"))
        .header("x-api-key", API_KEY)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

async fn call(
    app: &mut RouterIntoService<String>,
    request: Request<String>,
) -> axum::response::Response {
    ServiceExt::ready(app).await.unwrap().call(request).await.unwrap()
}

// --- auth and routing ---

#[tokio::test]
async fn missing_api_key_returns_401_json() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri(format!("{BASE}/profiles"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(resp).await;
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn custom_key_rejects_default_key() {
    let resp = app_with_key("other-key")
        .oneshot(get("/profiles"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unknown_route_returns_plain_text_404() {
    let resp = app().oneshot(get("/does-not-exist")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"404 page not found");
}

#[tokio::test]
async fn malformed_json_returns_vendor_400() {
    let resp = app()
        .oneshot(json_request("POST", "/certificate", "{not json"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = body_json(resp).await;
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

// --- profiles ---

#[tokio::test]
async fn profiles_list_paginates_and_filters() {
    let mut app = app().into_service();

    let body = body_json(call(&mut app, get("/profiles")).await).await;
    assert_eq!(body["total"], 6);
    assert_eq!(body["limit"], 20);
    assert_eq!(body["profiles"].as_array().unwrap().len(), 6);

    let body = body_json(call(&mut app, get("/profiles?offset=4&limit=500")).await).await;
    assert_eq!(body["offset"], 4);
    assert_eq!(body["limit"], 100);
    assert_eq!(body["profiles"].as_array().unwrap().len(), 2);

    let body = body_json(call(&mut app, get("/profiles?status=disabled")).await).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["profiles"][0]["id"], "profile-legacy");

    let resp = call(&mut app, get("/profiles?limit=abc")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn public_profiles_and_templates() {
    let mut app = app().into_service();

    let body = body_json(call(&mut app, get("/profiles/public")).await).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["profiles"][0]["id"], "profile-client");

    let body = body_json(call(&mut app, get("/profiles/templates")).await).await;
    assert_eq!(body["templates"].as_array().unwrap().len(), 3);

    let resp = call(&mut app, get("/profiles/nope")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["code"], "NOT_FOUND");
}

// --- certificates ---

#[tokio::test]
async fn certificate_lifecycle() {
    let mut app = app().into_service();

    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/certificate",
            r#"{"profile":{"id":"profile-ssl"},"attributes":{"common_name":"www.example.com"},"tags":["prod"],"include_ca_chain":true}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["chain"].as_array().unwrap().len(), 1);
    let serial = body["certificate"]["serial_number"].as_str().unwrap().to_string();
    let id = body["certificate"]["id"].as_str().unwrap().to_string();

    let body = body_json(call(&mut app, get(&format!("/certificate/{serial}"))).await).await;
    assert_eq!(body["common_name"], "www.example.com");
    let body = body_json(call(&mut app, get(&format!("/certificate-by-id/{id}"))).await).await;
    assert_eq!(body["serial_number"], serial.as_str());

    let body = body_json(call(&mut app, get("/certificate-search?tags=prod&common_name=EXAMPLE")).await).await;
    assert_eq!(body["total"], 1);
    let body = body_json(call(&mut app, get("/certificate-search?tags=staging")).await).await;
    assert_eq!(body["total"], 0);

    let revoke = |reason: &str| {
        json_request(
            "PUT",
            &format!("/certificate/{serial}/revoke"),
            &format!(r#"{{"reason":"{reason}"}}"#),
        )
    };
    let resp = call(&mut app, revoke("certificate_hold")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = call(&mut app, revoke("key_compromise")).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["code"], "ALREADY_REVOKED");

    let resp = call(&mut app, delete(&format!("/certificate/{serial}/revoke"))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = call(&mut app, delete(&format!("/certificate/{serial}/revoke"))).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["code"], "NOT_ON_HOLD");

    let resp = call(
        &mut app,
        json_request("POST", &format!("/certificate/{serial}/renew"), r#"{"validity":{"days":30}}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_ne!(body["certificate"]["serial_number"], serial.as_str());
    assert_eq!(body["certificate"]["common_name"], "www.example.com");

    let body = body_json(call(&mut app, get(&format!("/certificate/{serial}/additional-formats"))).await).await;
    assert!(body["formats"]["pem"].as_str().unwrap().starts_with("-----BEGIN CERTIFICATE-----"));
}

#[tokio::test]
async fn issue_rejects_unknown_and_disabled_profiles() {
    let mut app = app().into_service();

    let resp = call(
        &mut app,
        json_request("POST", "/certificate", r#"{"profile":{"id":"nope"},"csr":"CSR"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = call(
        &mut app,
        json_request("POST", "/certificate", r#"{"profile":{"id":"profile-legacy"},"csr":"CSR"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = call(
        &mut app,
        json_request("POST", "/certificate", r#"{"profile":{"id":"profile-ssl"}}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn oversized_validity_is_a_validation_error() {
    let mut app = app().into_service();

    for validity in [
        r#"{"days":9000000000000}"#,
        r#"{"years":9223372036854775807}"#,
        r#"{"years":200}"#,
    ] {
        let body = format!(r#"{{"profile":{{"id":"profile-ssl"}},"csr":"x","validity":{validity}}}"#);
        let resp = call(&mut app, json_request("POST", "/certificate", &body)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{validity}");
        let body = body_json(resp).await;
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "validity out of range");
    }

    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/manual-enrollment",
            r#"{"profile":{"id":"profile-ssl"},"csr":"x","validity":{"months":9223372036854775807}}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body = body_json(call(&mut app, get("/certificate-search")).await).await;
    assert_eq!(body["total"], 0);

    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/certificate",
            r#"{"profile":{"id":"profile-ssl"},"csr":"x","validity":{"years":2,"days":30}}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn deferred_issuance_is_collected_once() {
    let mut app = app().into_service();

    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/certificate",
            r#"{"profile":{"id":"profile-deferred"},"attributes":{"common_name":"later.example.com"}}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let request_id = body_json(resp).await["request_id"].as_str().unwrap().to_string();

    let pickup = || {
        Request::builder()
            .method("POST")
            .uri(format!("{BASE}/certificate-pickup/{request_id}"))
            .header("x-api-key", API_KEY)
            .body(String::new())
            .unwrap()
    };
    let resp = call(&mut app, pickup()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["certificate"]["common_name"], "later.example.com");

    let resp = call(&mut app, pickup()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- business units ---

#[tokio::test]
async fn business_unit_crud_and_conflicts() {
    let mut app = app().into_service();

    let resp = call(&mut app, json_request("POST", "/business-unit", r#"{"name":"Engineering"}"#)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let id = body_json(resp).await["id"].as_str().unwrap().to_string();

    let resp = call(&mut app, json_request("POST", "/business-unit", r#"{"name":"engineering"}"#)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["code"], "DUPLICATE_NAME");

    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/business-unit",
            &format!(r#"{{"name":"Platform","parent_id":"{id}"}}"#),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = call(&mut app, delete(&format!("/business-unit/{id}"))).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["code"], "HAS_CHILDREN");

    let resp = call(&mut app, delete("/business-unit/bu-default")).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["code"], "DEFAULT_UNIT");

    let body = body_json(call(&mut app, get(&format!("/business-unit?parent_id={id}"))).await).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["business_units"][0]["name"], "Platform");

    let body = body_json(call(&mut app, get(&format!("/business-unit/{id}/licensed-seats"))).await).await;
    assert_eq!(body["total_seats"], 100);
    assert_eq!(body["seat_types"][0]["type"], "SSL");
}

#[tokio::test]
async fn business_unit_admins() {
    let mut app = app().into_service();
    let admin = r#"{"email":"admin@example.com","first_name":"Ada","last_name":"Admin","role":"manager"}"#;

    let resp = call(&mut app, json_request("POST", "/business-unit/bu-default/admin", admin)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let admin_id = body_json(resp).await["id"].as_str().unwrap().to_string();

    let resp = call(&mut app, json_request("POST", "/business-unit/bu-default/admin", admin)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body = body_json(call(&mut app, get("/business-unit/bu-default/admin")).await).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let resp = call(&mut app, delete(&format!("/business-unit/bu-default/admin/{admin_id}"))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = call(&mut app, delete(&format!("/business-unit/bu-default/admin/{admin_id}"))).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- certificate owners ---

#[tokio::test]
async fn owner_validation_and_assignment() {
    let mut app = app().into_service();

    let resp = call(
        &mut app,
        json_request("POST", "/certificate-owners", r#"{"email":"no-at-sign","first_name":"A","last_name":"B"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/certificate-owners",
            r#"{"email":"jane@example.com","first_name":"Jane","last_name":"Doe"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let owner_id = body_json(resp).await["id"].as_str().unwrap().to_string();

    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/certificate-owners",
            r#"{"email":"JANE@example.com","first_name":"J","last_name":"D"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body = body_json(call(&mut app, get("/certificate-owners?last_name=doe")).await).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["certificate_owners"][0]["email"], "jane@example.com");

    let assignment = format!(r#"{{"owner_ids":["{owner_id}"]}}"#);
    let resp = call(
        &mut app,
        json_request("PUT", "/certificate-owners/certificate/missing", &assignment),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/certificate",
            r#"{"profile":{"id":"profile-ssl"},"csr":"CSR"}"#,
        ),
    )
    .await;
    let cert_id = body_json(resp).await["certificate"]["id"].as_str().unwrap().to_string();

    let resp = call(
        &mut app,
        json_request("PUT", &format!("/certificate-owners/certificate/{cert_id}"), &assignment),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = call(&mut app, delete(&format!("/certificate-owners/certificate/{cert_id}"))).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

// --- enrollments ---

#[tokio::test]
async fn enrollment_code_redeems_once() {
    let mut app = app().into_service();

    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/enrollment",
            r#"{"profile":{"id":"profile-client"},"email":"user@example.com","common_name":"user"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["status"], "pending");
    let code = body["enrollment_code"].as_str().unwrap().to_string();
    let enrollment_id = body["enrollment_id"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 14);

    let body = body_json(call(&mut app, get(&format!("/enrollment/{code}"))).await).await;
    assert_eq!(body["profile_name"], "Client Auth");

    let redeem = format!(r#"{{"enrollment_code":"{code}","csr":"CSR"}}"#);
    let resp = call(&mut app, json_request("POST", "/enrollment/redeem", &redeem)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cert_id = body_json(resp).await["certificate"]["id"].as_str().unwrap().to_string();

    let resp = call(&mut app, json_request("POST", "/enrollment/redeem", &redeem)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["code"], "ALREADY_REDEEMED");

    let body = body_json(call(&mut app, get(&format!("/enrollment/{enrollment_id}/status"))).await).await;
    assert_eq!(body["status"], "redeemed");
    assert_eq!(body["certificate_id"], cert_id.as_str());

    let body = body_json(call(&mut app, get(&format!("/enrollment/certificate/{cert_id}"))).await).await;
    assert_eq!(body["id"], enrollment_id.as_str());
}

#[tokio::test]
async fn manual_enrollment_respects_approval() {
    let mut app = app().into_service();

    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/manual-enrollment",
            r#"{"profile":{"id":"profile-approval"},"csr":"CSR"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_json(resp).await["status"], "pending_approval");

    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/manual-enrollment",
            r#"{"profile":{"id":"profile-ssl"},"csr":"CSR","attributes":{"common_name":"m.example.com"}}"#,
        ),
    )
    .await;
    assert_eq!(body_json(resp).await["status"], "issued");

    let body = body_json(call(&mut app, get("/enrollment-details?status=pending_approval")).await).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["enrollments"][0]["profile_id"], "profile-approval");

    let resp = call(
        &mut app,
        json_request(
            "POST",
            "/manual-enrollment/renew/missing",
            r#"{"profile":{"id":"profile-ssl"},"csr":"CSR"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = call(
        &mut app,
        json_request("POST", "/manual-enrollment", r#"{"profile":{"id":"profile-ssl"}}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
