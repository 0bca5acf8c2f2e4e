//! End-to-end tests driving the router without a socket.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use rsvp::{create_router, AppState, Config, Storage};

const PASSWORD: &str = "correct horse";

fn app_with(password: Option<&str>) -> Router {
    let mut config = Config::default();
    config.admin.password = password.map(str::to_string);

    let storage = Storage::open_in_memory().unwrap();
    storage.seed_sample_data().unwrap();

    create_router(AppState::new(storage, &config))
}

fn app() -> Router {
    app_with(Some(PASSWORD))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn admin_get(uri: &str) -> Request<Body> {
    Request::get(uri)
        .header("x-admin-password", PASSWORD)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn reception_guest(name: &str) -> Value {
    json!({
        "name": name,
        "events": { "ceremony": true, "reception": true },
        "entreeSelection": { "fish": true },
        "dietaryRestrictions": { "glutenFree": true, "other": "" }
    })
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "rsvp");
}

#[tokio::test]
async fn test_frame_ancestors_header() {
    let response = app().oneshot(get("/health")).await.unwrap();
    let csp = response
        .headers()
        .get(header::CONTENT_SECURITY_POLICY)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(csp.starts_with("frame-ancestors 'self'"));
    assert!(csp.contains("https://sites.google.com"));
}

#[tokio::test]
async fn test_lookup_by_partial_name() {
    let app = app();

    let (status, body) = send(&app, get("/api/rsvp?name=sarah")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "2");
    assert_eq!(body["primaryGuestName"], "Sarah Johnson");
    assert_eq!(body["rsvpStatus"], "pending");
}

#[tokio::test]
async fn test_lookup_errors() {
    let app = app();

    let (status, body) = send(&app, get("/api/rsvp")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name parameter required");

    let (status, _) = send(&app, get("/api/rsvp?name=%20%20")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, get("/api/rsvp?name=nobody")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Invitation not found");
}

#[tokio::test]
async fn test_lookup_folds_accented_names() {
    let app = app();

    let new = json!({
        "primaryGuestName": "Zoë Ångström",
        "email": "zoe@example.com",
        "partySize": 1,
        "invitationType": "standard"
    });
    let request = Request::post("/api/invitations")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-admin-password", PASSWORD)
        .body(Body::from(new.to_string()))
        .unwrap();
    let (status, created) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);

    // "ZOË" and "zoë ångström", percent-encoded.
    for uri in [
        "/api/rsvp?name=ZO%C3%8B",
        "/api/rsvp?name=zo%C3%AB%20%C3%A5ngstr%C3%B6m",
    ] {
        let (status, body) = send(&app, get(uri)).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["id"], created["id"]);
    }
}

#[tokio::test]
async fn test_submit_and_resubmit() {
    let app = app();

    let first = json!({ "invitationId": "2", "guests": [reception_guest("Sarah Johnson")] });
    let (status, body) = send(&app, post_json("/api/rsvp", &first)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["submissionNumber"], 1);
    assert_eq!(body["isCurrent"], true);

    let second = json!({
        "invitationId": "2",
        "guests": [reception_guest("Sarah Johnson"), reception_guest("Tom Johnson")]
    });
    let (status, body) = send(&app, post_json("/api/rsvp", &second)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["submissionNumber"], 2);

    let (status, _) = send(&app, get("/api/rsvp/2/history")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, history) = send(&app, admin_get("/api/rsvp/2/history")).await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["isCurrent"], false);
    assert_eq!(history[1]["isCurrent"], true);
    assert_eq!(history[1]["guests"].as_array().unwrap().len(), 2);

    let (_, invitation) = send(&app, get("/api/rsvp?name=Sarah")).await;
    assert_eq!(invitation["rsvpStatus"], "updated");
}

#[tokio::test]
async fn test_submit_rejects_invalid_guests() {
    let app = app();

    let body = json!({
        "invitationId": "2",
        "guests": [{ "name": "", "events": {} }]
    });
    let (status, body) = send(&app, post_json("/api/rsvp", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let details: Vec<&str> = body["details"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(details.contains(&"Guest 1: Name is required"));
    assert!(details.contains(&"Guest 1: Please select at least one event"));

    let (_, history) = send(&app, admin_get("/api/rsvp/2/history")).await;
    assert!(history.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_unknown_invitation() {
    let body = json!({ "invitationId": "missing", "guests": [reception_guest("Nobody")] });
    let (status, body) = send(&app(), post_json("/api/rsvp", &body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Invitation not found");
}

#[tokio::test]
async fn test_submit_malformed_body() {
    let request = Request::post("/api/rsvp")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request data"));
}

#[tokio::test]
async fn test_confirmation_text() {
    let app = app();

    let (status, _) = send(&app, get("/api/rsvp/1/confirmation")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let submit = json!({ "invitationId": "1", "guests": [reception_guest("John Smith")] });
    send(&app, post_json("/api/rsvp", &submit)).await;

    let response = app
        .clone()
        .oneshot(get("/api/rsvp/1/confirmation"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("John Smith"));
    assert!(text.contains("Lily & Terron Wedding"));
}

#[tokio::test]
async fn test_admin_routes_require_password() {
    let app = app();

    let (status, body) = send(&app, get("/api/admin/summary")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid password");

    let request = Request::get("/api/invitations")
        .header("x-admin-password", "wrong")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, admin_get("/api/invitations")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_admin_disabled_without_password() {
    let app = app_with(None);

    let (status, _) = send(&app, admin_get("/api/admin/summary")).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send(&app, post_json("/api/admin/auth", &json!({ "password": "" }))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // The guest form keeps working.
    let (status, _) = send(&app, get("/api/rsvp?name=emily")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_auth_endpoint() {
    let app = app();

    let (status, body) = send(&app, post_json("/api/admin/auth", &json!({ "password": PASSWORD }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, body) = send(&app, post_json("/api/admin/auth", &json!({ "password": "nope" }))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid password");
}

#[tokio::test]
async fn test_setup_actions() {
    let app = app();

    let bad_password = json!({ "action": "seed", "adminPassword": "nope" });
    let (status, body) = send(&app, post_json("/api/admin/setup", &bad_password)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid admin password");

    let bad_action = json!({ "action": "drop", "adminPassword": PASSWORD });
    let (status, body) = send(&app, post_json("/api/admin/setup", &bad_action)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid action");

    let seed = json!({ "action": "seed", "adminPassword": PASSWORD });
    let (status, body) = send(&app, post_json("/api/admin/setup", &seed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sample data already exists");

    let full = json!({ "action": "full-setup", "adminPassword": PASSWORD });
    let (status, body) = send(&app, post_json("/api/admin/setup", &full)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(
        body["details"]["connection"]["message"],
        "Database connection successful"
    );
}

#[tokio::test]
async fn test_create_search_and_delete_invitation() {
    let app = app();

    let new = json!({
        "id": "5",
        "primaryGuestName": "  Grace Hopper ",
        "email": "Grace@Example.com",
        "partySize": 2,
        "invitationType": "plus-one"
    });
    let request = Request::post("/api/invitations")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-admin-password", PASSWORD)
        .body(Body::from(new.to_string()))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["primaryGuestName"], "Grace Hopper");
    assert_eq!(body["email"], "grace@example.com");

    let duplicate = Request::post("/api/invitations")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-admin-password", PASSWORD)
        .body(Body::from(new.to_string()))
        .unwrap();
    let (status, _) = send(&app, duplicate).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, found) = send(&app, admin_get("/api/invitations?q=example.com")).await;
    let found = found.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["id"], "5");

    let remove = || {
        Request::delete("/api/invitations/5")
            .header("x-admin-password", PASSWORD)
            .body(Body::empty())
            .unwrap()
    };
    let (status, body) = send(&app, remove()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(&app, remove()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_invitation_validation() {
    let request = Request::post("/api/invitations")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-admin-password", PASSWORD)
        .body(Body::from(
            json!({ "primaryGuestName": "", "email": "not-an-email", "partySize": 0 }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"].as_array().unwrap().len() >= 3);
}

#[tokio::test]
async fn test_responses_and_summary() {
    let app = app();

    let submit = json!({
        "invitationId": "1",
        "guests": [reception_guest("John Smith"), {
            "name": "Jane Smith",
            "events": { "ceremony": true, "afterPartyBrunch": true },
            "dietaryRestrictions": { "vegan": true, "other": "no cilantro" }
        }]
    });
    let (status, _) = send(&app, post_json("/api/rsvp", &submit)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, groups) = send(&app, admin_get("/api/admin/responses")).await;
    assert_eq!(status, StatusCode::OK);
    let groups = groups.as_array().unwrap();
    assert_eq!(groups.len(), 4);
    let john = groups
        .iter()
        .find(|g| g["invitation"]["id"] == "1")
        .unwrap();
    assert_eq!(john["guests"].as_array().unwrap().len(), 2);
    assert_eq!(john["submissionNumber"], 1);

    let (status, summary) = send(&app, admin_get("/api/admin/summary")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["summary"]["totalInvitations"], 4);
    assert_eq!(summary["summary"]["completedRSVPs"], 1);
    assert_eq!(summary["summary"]["responseRate"], "25.0%");
    assert_eq!(summary["summary"]["totalGuests"], 2);
    assert_eq!(summary["eventAttendance"]["ceremony"], 2);
    assert_eq!(summary["eventAttendance"]["afterPartyBrunch"], 1);
    assert_eq!(summary["entreeSelections"]["fish"], 1);
    assert_eq!(summary["dietaryRestrictions"]["vegan"], 1);
    assert_eq!(summary["dietaryRestrictions"]["other"], 1);
}

#[tokio::test]
async fn test_csv_export_download() {
    let app = app();

    let submit = json!({ "invitationId": "4", "guests": [reception_guest("Emily \"Em\" Davis")] });
    send(&app, post_json("/api/rsvp", &submit)).await;

    let response = app
        .clone()
        .oneshot(admin_get("/api/admin/export?format=csv"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/csv"));
    let disposition = headers[header::CONTENT_DISPOSITION].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"lily-terron-wedding-rsvp-"));
    assert!(disposition.ends_with(".csv\""));

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = csv.lines();
    assert!(lines.next().unwrap().starts_with("\"Primary Guest\",\"Email\",\"Guest Name\""));
    let row = lines.next().unwrap();
    assert!(row.contains("\"Emily \"\"Em\"\" Davis\""));
    assert!(row.ends_with("\"Gluten Free\""));
}

#[tokio::test]
async fn test_export_formats() {
    let app = app();

    let response = app
        .clone()
        .oneshot(admin_get("/api/admin/export?format=summary"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.contains("-summary-"));
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let report: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(report["summary"]["totalInvitations"], 4);
    assert_eq!(report["responses"].as_array().unwrap().len(), 4);

    let (status, body) = send(&app, admin_get("/api/admin/export?format=xml")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unknown export format"));
}
