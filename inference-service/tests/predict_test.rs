mod common;

use axum::http::StatusCode;
use common::TestApp;
use serde_json::{json, Value};

fn healthy_request() -> Value {
    json!({
        "age": 30,
        "weight": 70,
        "body_temp": 36.6,
        "bp_systolic": 110,
        "cholesterol": 180
    })
}

#[tokio::test]
async fn healthy_example_returns_healthy() {
    let app = TestApp::spawn().await;
    assert!(app.model_loaded);

    let response = app.post_predict(healthy_request().to_string()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body, json!({"prediction": 0, "health_status": "Healthy"}));
}

#[tokio::test]
async fn risky_example_returns_at_risk() {
    let app = TestApp::spawn().await;

    let response = app
        .post_predict(
            json!({
                "age": 64,
                "weight": 95,
                "body_temp": 38.4,
                "bp_systolic": 172,
                "cholesterol": 265
            })
            .to_string(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["prediction"], 1);
    assert_eq!(body["health_status"], "At Risk");
}

#[tokio::test]
async fn string_encoded_body_matches_object_body() {
    let app = TestApp::spawn().await;

    let as_object: Value = app
        .post_predict(healthy_request().to_string())
        .await
        .json()
        .await
        .expect("Failed to parse JSON");
    // A JSON string whose content is the encoded request.
    let encoded = Value::String(healthy_request().to_string()).to_string();
    let as_string: Value = app
        .post_predict(encoded)
        .await
        .json()
        .await
        .expect("Failed to parse JSON");

    assert_eq!(as_object, as_string);
}

#[tokio::test]
async fn numeric_strings_are_accepted() {
    let app = TestApp::spawn().await;
    let mut request = healthy_request();
    request["body_temp"] = json!("36.6");
    request["age"] = json!("30");

    let response = app.post_predict(request.to_string()).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn non_numeric_field_is_rejected() {
    let app = TestApp::spawn().await;
    let mut request = healthy_request();
    request["age"] = json!("not-a-number");

    let response = app.post_predict(request.to_string()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert!(body["error"].as_str().unwrap().contains("age"));
}

#[tokio::test]
async fn missing_field_is_rejected() {
    let app = TestApp::spawn().await;
    let mut request = healthy_request();
    request.as_object_mut().unwrap().remove("weight");

    let response = app.post_predict(request.to_string()).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "missing field `weight`");
}

#[tokio::test]
async fn malformed_and_empty_bodies_are_rejected() {
    let app = TestApp::spawn().await;

    for body in ["{not json", "", "[1, 2, 3]"] {
        let response = app.post_predict(body).await;
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "body {:?} should be rejected",
            body
        );
    }
}

#[tokio::test]
async fn invoke_returns_proxy_shape() {
    let app = TestApp::spawn().await;

    let response = app
        .post_invoke(&json!({ "body": healthy_request().to_string() }))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let envelope: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(envelope["statusCode"], 200);
    let inner: Value = serde_json::from_str(envelope["body"].as_str().unwrap())
        .expect("Inner body should be JSON");
    assert_eq!(inner, json!({"prediction": 0, "health_status": "Healthy"}));
}

#[tokio::test]
async fn invoke_reports_bad_input_inside_envelope() {
    let app = TestApp::spawn().await;

    let response = app.post_invoke(&json!({ "body": { "age": 40 } })).await;

    assert_eq!(response.status(), StatusCode::OK);
    let envelope: Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(envelope["statusCode"], 400);
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/predict", app.address))
        .header("x-request-id", "req-123")
        .body(healthy_request().to_string())
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "req-123"
    );
}

#[tokio::test]
async fn non_finite_values_are_rejected() {
    let app = TestApp::spawn().await;

    for spelling in ["inf", "-Infinity", "NaN"] {
        let mut request = healthy_request();
        request["body_temp"] = json!(spelling);

        let response = app.post_predict(request.to_string()).await;

        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "{:?} should be rejected",
            spelling
        );
    }
}
