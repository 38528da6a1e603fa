use std::collections::HashMap;

use actix_web::{test, web, App};
use serde_json::json;
use wiremock::matchers::{body_json, header, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wooproxy::oauth::{sign, Credentials};
use wooproxy::ProxyMethod;
use wooproxy_gateway::config::{GatewayConfig, WooUpstream};
use wooproxy_gateway::routes;
use wooproxy_gateway::state::AppState;

const API_PREFIX: &str = "/wp-json/wc/v3";

fn make_state(
    upstream: Option<WooUpstream>,
    preserve_upstream_status: bool,
) -> web::Data<AppState> {
    let config = GatewayConfig {
        upstream,
        upstream_timeout_secs: 5,
        preserve_upstream_status,
        ..GatewayConfig::default()
    };
    web::Data::new(AppState::new(config).unwrap())
}

fn upstream_for(server: &MockServer) -> WooUpstream {
    WooUpstream::new(format!("{}{}", server.uri(), API_PREFIX), "ck_test", "cs_secret")
}

/// Split an `Authorization: OAuth k="v", ...` value into decoded pairs.
fn oauth_params(header_value: &str) -> HashMap<String, String> {
    header_value
        .strip_prefix("OAuth ")
        .unwrap()
        .split(", ")
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap();
            let value = urlencoding::decode(value.trim_matches('"')).unwrap();
            (key.to_string(), value.into_owned())
        })
        .collect()
}

#[actix_rt::test]
async fn test_get_forwards_params_as_query_without_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API_PREFIX}/products")))
        .and(query_param("per_page", "1"))
        .and(query_param("status", "publish"))
        .and(header_exists("authorization"))
        .and(header("accept", "application/json"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let state = make_state(Some(upstream_for(&server)), false);
    let app = test::init_service(
        App::new()
            .app_data(state)
            .configure(routes::woo_proxy::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/woo-proxy")
        .set_json(json!({
            "endpoint": "products",
            "method": "GET",
            "params": { "per_page": 1, "status": "publish" },
            "data": { "should": "be ignored" }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let upstream_req = &received[0];
    assert!(upstream_req.body.is_empty(), "GET must not carry a body");

    let auth = upstream_req
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(auth.starts_with("OAuth "));
    assert!(auth.contains("oauth_signature="));
    assert!(!auth.contains("cs_secret"));

    let query = upstream_req.url.query().unwrap_or_default();
    assert!(!query.contains("consumer_key"));
    assert!(!query.contains("consumer_secret"));
    assert_eq!(upstream_req.url.query_pairs().count(), 2, "params applied exactly once");
}

#[actix_rt::test]
async fn test_products_payload_relayed_verbatim() {
    let server = MockServer::start().await;
    let upstream_body = r#"[{"id":42,"name":"Test Product"}]"#;
    Mock::given(method("GET"))
        .and(path(format!("{API_PREFIX}/products")))
        .and(query_param("per_page", "1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(upstream_body, "application/json"),
        )
        .mount(&server)
        .await;

    let state = make_state(Some(upstream_for(&server)), false);
    let app = test::init_service(
        App::new()
            .app_data(state)
            .configure(routes::woo_proxy::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/woo-proxy")
        .set_json(json!({ "endpoint": "products", "method": "GET", "params": { "per_page": 1 } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/json"
    );
    let body = test::read_body(resp).await;
    assert_eq!(body, upstream_body.as_bytes());
}

#[actix_rt::test]
async fn test_post_sends_json_body_and_ignores_params() {
    let server = MockServer::start().await;
    let order = json!({ "status": "processing", "line_items": [{ "product_id": 42, "quantity": 2 }] });
    Mock::given(method("POST"))
        .and(path(format!("{API_PREFIX}/orders")))
        .and(body_json(&order))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 7 })))
        .expect(1)
        .mount(&server)
        .await;

    let state = make_state(Some(upstream_for(&server)), false);
    let app = test::init_service(
        App::new()
            .app_data(state)
            .configure(routes::woo_proxy::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/woo-proxy")
        .set_json(json!({
            "endpoint": "orders",
            "method": "POST",
            "params": { "per_page": 10 },
            "data": order
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    // Upstream 201 is normalized to 200 by default.
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "id": 7 }));

    let received = server.received_requests().await.unwrap();
    assert_eq!(received[0].url.query(), None);
}

#[actix_rt::test]
async fn test_signature_matches_url_received_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API_PREFIX}/products")))
        .and(query_param("search", "blue shirt & co"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let state = make_state(Some(upstream_for(&server)), false);
    let app = test::init_service(
        App::new()
            .app_data(state)
            .configure(routes::woo_proxy::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/woo-proxy")
        .set_json(json!({
            "endpoint": "products",
            "params": { "search": "blue shirt & co", "per_page": 5, "on_sale": true }
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let received = server.received_requests().await.unwrap();
    let upstream_req = &received[0];
    let auth = upstream_req
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap();
    let params = oauth_params(auth);
    assert_eq!(params["oauth_consumer_key"], "ck_test");
    assert_eq!(params["oauth_signature_method"], "HMAC-SHA1");
    assert_eq!(params["oauth_version"], "1.0");

    let expected = sign(
        ProxyMethod::Get,
        &upstream_req.url,
        &Credentials::new("ck_test", "cs_secret"),
        &params["oauth_nonce"],
        params["oauth_timestamp"].parse().unwrap(),
    );
    assert_eq!(params["oauth_signature"], expected.signature);
}

#[actix_rt::test]
async fn test_put_and_delete_forward_body_without_query() {
    let server = MockServer::start().await;
    let update = json!({ "status": "completed" });
    let removal = json!({ "force": true });
    Mock::given(method("PUT"))
        .and(path(format!("{API_PREFIX}/orders/7")))
        .and(body_json(&update))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 7 })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("{API_PREFIX}/products/3")))
        .and(body_json(&removal))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 3 })))
        .expect(1)
        .mount(&server)
        .await;

    let state = make_state(Some(upstream_for(&server)), false);
    let app = test::init_service(
        App::new()
            .app_data(state)
            .configure(routes::woo_proxy::configure),
    )
    .await;

    for (payload, id) in [
        (
            json!({
                "endpoint": "orders/7",
                "method": "PUT",
                "params": { "per_page": 10 },
                "data": update
            }),
            7,
        ),
        (
            json!({
                "endpoint": "products/3",
                "method": "DELETE",
                "params": { "force": "true" },
                "data": removal
            }),
            3,
        ),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/woo-proxy")
            .set_json(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["id"], id);
    }

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 2);
    for upstream_req in &received {
        assert_eq!(upstream_req.url.query(), None);
        assert!(!upstream_req.body.is_empty());
    }
}

#[actix_rt::test]
async fn test_preserve_upstream_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("{API_PREFIX}/products")))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 99 })))
        .mount(&server)
        .await;

    let state = make_state(Some(upstream_for(&server)), true);
    let app = test::init_service(
        App::new()
            .app_data(state)
            .configure(routes::woo_proxy::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/woo-proxy")
        .set_json(json!({ "endpoint": "products", "method": "POST", "data": { "name": "Mug" } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 201);
}

#[actix_rt::test]
async fn test_missing_credentials_makes_no_upstream_call() {
    let server = MockServer::start().await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = make_state(None, false);
    let app = test::init_service(
        App::new()
            .app_data(state)
            .configure(routes::woo_proxy::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/woo-proxy")
        .set_json(json!({ "endpoint": "products" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Missing WooCommerce credentials" }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_non_post_verbs_rejected_with_405() {
    let state = make_state(None, false);
    let app = test::init_service(
        App::new()
            .app_data(state)
            .configure(routes::woo_proxy::configure),
    )
    .await;

    for req in [
        test::TestRequest::get().uri("/api/woo-proxy").to_request(),
        test::TestRequest::put().uri("/api/woo-proxy").to_request(),
        test::TestRequest::delete().uri("/api/woo-proxy").to_request(),
    ] {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 405);
        assert_eq!(resp.headers().get("allow").unwrap(), "POST");
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Method not allowed");
    }
}

#[actix_rt::test]
async fn test_upstream_error_relayed_with_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{API_PREFIX}/products/999")))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "woocommerce_rest_product_invalid_id",
            "message": "Invalid ID.",
            "data": { "status": 404 }
        })))
        .mount(&server)
        .await;

    let upstream = upstream_for(&server);
    let api_url = upstream.api_url.clone();
    let state = make_state(Some(upstream), false);
    let app = test::init_service(
        App::new()
            .app_data(state)
            .configure(routes::woo_proxy::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/woo-proxy")
        .set_json(json!({ "endpoint": "/products/999" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 404);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid ID.");
    assert_eq!(body["statusCode"], 404);
    assert_eq!(body["raw"]["code"], "woocommerce_rest_product_invalid_id");
    assert_eq!(body["requestDetails"]["endpoint"], "products/999");
    assert_eq!(body["requestDetails"]["method"], "GET");
    assert_eq!(body["requestDetails"]["apiUrl"], api_url);
    assert!(!body.to_string().contains("cs_secret"));
}

#[actix_rt::test]
async fn test_upstream_error_without_json_gets_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&server)
        .await;

    let state = make_state(Some(upstream_for(&server)), false);
    let app = test::init_service(
        App::new()
            .app_data(state)
            .configure(routes::woo_proxy::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/woo-proxy")
        .set_json(json!({ "endpoint": "orders" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 503);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "WooCommerce API request failed with status 503");
    assert_eq!(body["raw"], "Service Unavailable");
}

#[actix_rt::test]
async fn test_unreachable_upstream_returns_500_envelope() {
    let upstream = WooUpstream::new("http://127.0.0.1:1/wp-json/wc/v3", "ck_test", "cs_secret");
    let state = make_state(Some(upstream), false);
    let app = test::init_service(
        App::new()
            .app_data(state)
            .configure(routes::woo_proxy::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/woo-proxy")
        .set_json(json!({ "endpoint": "products" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 500);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["statusCode"], 500);
    assert!(body.get("raw").is_none());
    assert_eq!(body["requestDetails"]["endpoint"], "products");
}

#[actix_rt::test]
async fn test_invalid_body_rejected_with_400() {
    let server = MockServer::start().await;
    let state = make_state(Some(upstream_for(&server)), false);
    let app = test::init_service(
        App::new()
            .app_data(state)
            .configure(routes::woo_proxy::configure),
    )
    .await;

    for payload in [
        "not json".to_string(),
        json!({ "endpoint": "" }).to_string(),
        json!({ "endpoint": "products", "method": "PATCH" }).to_string(),
        json!({ "endpoint": "../../wp-admin" }).to_string(),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/woo-proxy")
            .insert_header(("Content-Type", "application/json"))
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_health_reports_configuration_without_secrets() {
    let upstream = WooUpstream::new(
        "https://shop.example.com/wp-json/wc/v3",
        "ck_test",
        "cs_secret",
    );
    let state = make_state(Some(upstream), false);
    let app = test::init_service(
        App::new()
            .app_data(state)
            .configure(routes::health::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["credentials_configured"], true);
    assert!(!body.to_string().contains("ck_test"));
}

#[actix_rt::test]
async fn test_metrics_requires_token_when_configured() {
    let config = GatewayConfig {
        metrics_token: Some("t0ken".to_string()),
        ..GatewayConfig::default()
    };
    let state = web::Data::new(AppState::new(config).unwrap());
    let app = test::init_service(
        App::new()
            .app_data(state)
            .configure(routes::health::configure),
    )
    .await;

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let req = test::TestRequest::get()
        .uri("/metrics")
        .insert_header(("Authorization", "Bearer t0ken"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
}
