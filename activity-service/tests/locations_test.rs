mod common;

use activity_service::services::ActivityStore;
use axum::http::StatusCode;
use common::{TestApp, CARACAS, CHACAO_SHOEBOX_GG};
use serde_json::{json, Value};

fn strings(body: &Value) -> Vec<&str> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_cascade_option_lists() {
    let app = TestApp::new().await;

    let (status, zones) = app.get("/api/locations/zones", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(strings(&zones), ["Caracas", "Valencia"]);

    let (_, subzones) = app.get("/api/locations/subzones?zone=Caracas", None).await;
    assert_eq!(strings(&subzones), ["Sambil Chacao", "Centro Plaza"]);

    let (_, stores) = app
        .get("/api/locations/stores?zone=Caracas&subzone=Sambil%20Chacao", None)
        .await;
    assert_eq!(strings(&stores), ["SHOE BOX", "FOREVER 21", "ILAHUI"]);

    let (_, companies) = app
        .get(
            "/api/locations/companies?zone=Caracas&subzone=Sambil%20Chacao&store=SHOE%20BOX",
            None,
        )
        .await;
    assert_eq!(strings(&companies), ["GG CCS 2024, C.A.", "EE CCS 2024, C.A."]);
}

#[tokio::test]
async fn test_child_lists_are_empty_without_parent() {
    let app = TestApp::new().await;

    let (status, subzones) = app.get("/api/locations/subzones", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(strings(&subzones).is_empty());

    let (_, stores) = app.get("/api/locations/stores?subzone=Sambil%20Chacao", None).await;
    assert!(strings(&stores).is_empty());
}

#[tokio::test]
async fn test_resolve_exact_tuple() {
    let app = TestApp::new().await;
    let uri = "/api/locations/resolve?zone=Caracas&subzone=Sambil%20Chacao&store=SHOE%20BOX&company=GG%20CCS%202024%2C%20C.A.";

    let (status, body) = app.get(uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], CHACAO_SHOEBOX_GG);

    // Idempotent.
    let (_, again) = app.get(uri, None).await;
    assert_eq!(again, body);

    let (status, body) = app.get("/api/locations/resolve?zone=Caracas", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], CARACAS);
}

#[tokio::test]
async fn test_resolve_never_returns_partial_match() {
    let app = TestApp::new().await;

    // A prefix of existing rows, but no row has exactly these four values.
    let (status, body) = app
        .get(
            "/api/locations/resolve?zone=Caracas&subzone=Sambil%20Chacao&store=SHOE%20BOX",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "location_not_found");

    let (status, _) = app.get("/api/locations/resolve", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_store_change_hides_stale_company() {
    let app = TestApp::new().await;

    // Switching the store from SHOE BOX to FOREVER 21 only offers that store's
    // companies; the stale GG CCS value is not an option any more.
    let (status, body) = app
        .get(
            "/api/locations/options?zone=Caracas&subzone=Sambil%20Chacao&store=FOREVER%2021",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        strings(&body["companies"]),
        ["HH CCS 2024, C.A.", "AA CCS OUTLET 2025, C.A."]
    );

    let (status, body) = app
        .get(
            "/api/locations/options?zone=Caracas&subzone=Sambil%20Chacao&store=FOREVER%2021&company=GG%20CCS%202024%2C%20C.A.",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "location_not_an_option");
    assert_eq!(body["field"], "company");
}

#[tokio::test]
async fn test_location_admin_requires_staff() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/locations",
            Some(&app.user_token()),
            json!({ "zone": "Maracay" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "insufficient_role");

    let (status, body) = app
        .post(
            "/api/locations",
            Some(&app.admin_token()),
            json!({ "zone": " Maracay ", "subzone": "NULL" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["zone"], "Maracay");
    assert_eq!(body["subzone"], Value::Null);

    let (_, zones) = app.get("/api/locations/zones", None).await;
    assert_eq!(strings(&zones), ["Caracas", "Valencia", "Maracay"]);
}

#[tokio::test]
async fn test_duplicate_combination_conflicts() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/locations",
            Some(&app.admin_token()),
            json!({
                "zone": "Caracas",
                "subzone": "Sambil Chacao",
                "store": "SHOE BOX",
                "company": "GG CCS 2024, C.A."
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "location_exists");

    let (status, body) = app
        .put(
            &format!("/api/locations/{}", CARACAS),
            Some(&app.admin_token()),
            json!({ "zone": "Valencia", "subzone": "Sambil Valencia", "store": "SHOE BOX", "company": "GG VAL 2024, C.A." }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "location_exists");
}

#[tokio::test]
async fn test_deleting_location_detaches_activities() {
    let app = TestApp::new().await;
    let token = app.admin_token();

    let (status, created) = app
        .post(
            "/api/activities",
            Some(&token),
            json!({ "description": "Inventory", "location_id": CHACAO_SHOEBOX_GG }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .delete(&format!("/api/locations/{}", CHACAO_SHOEBOX_GG), Some(&token))
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let id = created["id"].as_i64().unwrap();
    let activity = app.store.find_activity(id).await.unwrap().unwrap();
    assert_eq!(activity.location_id, None);

    let (status, _) = app
        .delete(&format!("/api/locations/{}", CHACAO_SHOEBOX_GG), Some(&token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
