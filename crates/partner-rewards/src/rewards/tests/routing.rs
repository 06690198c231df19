use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::rewards::guard::RewardPolicy;
use crate::rewards::repository::RewardRepository;
use crate::rewards::service::RewardProgramService;

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::to_vec(&body).expect("serialize payload"),
        ))
        .expect("build request")
}

#[tokio::test]
async fn evaluate_route_returns_the_winning_group() {
    let (_, service) = build_service();
    let router = reward_router_with_service(service);

    let payload = json!({
        "conditions": [
            {
                "operator": "AND",
                "amount": 15,
                "conditions": [
                    { "entity": "partner", "attribute": "country", "operator": "equals_to", "value": "CA" }
                ]
            },
            {
                "operator": "OR",
                "amount": 40,
                "conditions": [
                    { "entity": "partner", "attribute": "totalConversions", "operator": "greater_than_or_equal", "value": 50 },
                    { "entity": "customer", "attribute": "country", "operator": "in", "value": ["US", "GB"] }
                ]
            }
        ],
        "context": {
            "partner": { "country": "CA", "totalConversions": 75 }
        }
    });

    let response = router
        .oneshot(json_request("POST", "/api/v1/rewards/evaluate", payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["matched"], json!(true));
    assert_eq!(body["group"]["amount"], json!(40.0));
    assert_eq!(body["group"]["operator"], json!("OR"));
}

#[tokio::test]
async fn evaluate_route_reports_no_match_without_context() {
    let (_, service) = build_service();
    let router = reward_router_with_service(service);

    let payload = json!({
        "conditions": [
            {
                "operator": "AND",
                "amount": 15,
                "conditions": [
                    { "entity": "partner", "attribute": "country", "operator": "not_equals", "value": "US" }
                ]
            }
        ]
    });

    let response = router
        .oneshot(json_request("POST", "/api/v1/rewards/evaluate", payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["matched"], json!(false));
    assert_eq!(body["group"], Value::Null);
}

#[tokio::test]
async fn evaluate_route_rejects_unknown_operators() {
    let (_, service) = build_service();
    let router = reward_router_with_service(service);

    let payload = json!({
        "conditions": [
            {
                "operator": "AND",
                "amount": 15,
                "conditions": [
                    { "entity": "partner", "attribute": "country", "operator": "matches_regex", "value": "^C" }
                ]
            }
        ]
    });

    let response = router
        .oneshot(json_request("POST", "/api/v1/rewards/evaluate", payload))
        .await
        .expect("router responds");

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn configure_route_uses_the_path_program() {
    let (repository, service) = build_service();
    let router = reward_router_with_service(service);

    let mut reward = serde_json::to_value(lead_reward()).expect("serialize reward");
    reward["programId"] = json!("ignored");

    let response = router
        .oneshot(json_request(
            "PUT",
            "/api/v1/programs/prog_acme/rewards",
            reward,
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["programId"], json!("prog_acme"));
    assert_eq!(body["type"], json!("flat"));

    let stored = repository.list(&program()).expect("list succeeds");
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn configure_handler_returns_unprocessable_for_violations() {
    let (_, service) = build_service();
    let mut reward = sale_reward();
    reward.amount = 250.0;

    let response = crate::rewards::router::configure_handler::<MemoryRepository>(
        State(Arc::new(service)),
        Path("prog_acme".to_string()),
        axum::Json(reward),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = read_json_body(response).await;
    let message = body["error"].as_str().expect("error message");
    assert!(message.contains("100%"), "unexpected message: {message}");
}

#[tokio::test]
async fn configure_handler_returns_internal_error_on_repository_failure() {
    let service = Arc::new(RewardProgramService::new(
        Arc::new(UnavailableRepository),
        RewardPolicy::default(),
    ));

    let response = crate::rewards::router::configure_handler::<UnavailableRepository>(
        State(service),
        Path("prog_acme".to_string()),
        axum::Json(lead_reward()),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn list_route_summarises_rewards() {
    let (_, service) = build_service();
    service.configure(sale_reward()).expect("sale reward");
    service.configure(lead_reward()).expect("lead reward");
    let router = reward_router_with_service(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/programs/prog_acme/rewards")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["programId"], json!("prog_acme"));
    let rewards = body["rewards"].as_array().expect("rewards array");
    assert_eq!(rewards.len(), 2);
    assert_eq!(rewards[0]["event"], json!("lead"));
    assert_eq!(
        rewards[1]["description"],
        json!("10% of each sale, for 12 month(s), 2 modifiers")
    );
}

#[tokio::test]
async fn quote_route_returns_not_found_without_reward() {
    let (_, service) = build_service();
    let router = reward_router_with_service(service);

    let payload = serde_json::to_value(sale_quote(partner("CA", 60.0), 10_000))
        .expect("serialize quote");
    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/programs/prog_acme/commissions/quote",
            payload,
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn quote_route_returns_payable_commission() {
    let (_, service) = build_service();
    service.configure(sale_reward()).expect("sale reward");
    let router = reward_router_with_service(service);

    let payload = json!({
        "event": "sale",
        "saleAmount": 20000,
        "occurredAt": "2025-06-01T09:30:00Z",
        "context": {
            "partner": { "country": "CA", "totalConversions": 3 }
        }
    });
    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/programs/prog_acme/commissions/quote",
            payload,
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["reward"]["modifierIndex"], json!(0));
    assert_eq!(body["decision"]["status"], json!("payable"));
    assert_eq!(body["decision"]["earnings"], json!(3000));
}
