//! Integration tests for checkout against the fake commerce backend.

use reqwest::StatusCode;
use serde_json::json;
use soar_integration_tests::{PAYMENT_ORIGIN, TestContext};

#[tokio::test]
async fn test_checkout_sends_minor_units_and_returns_payment_url() {
    let ctx = TestContext::new().await;
    ctx.add_item("p-a", "Item A", 5.0, 2).await;
    ctx.add_item("p-b", "Item B", 3.0, 1).await;

    let (status, body) = ctx.post_json("/api/checkout", &json!({})).await;
    assert_eq!(status, StatusCode::OK, "checkout failed: {body}");
    let url = body["url"].as_str().expect("payment url");
    assert!(url.starts_with(PAYMENT_ORIGIN));

    assert_eq!(ctx.backend.payment_link_calls(), 1);
    let request = &ctx.backend.payment_requests()[0];
    assert_eq!(
        request["line_items"],
        json!([
            {"name": "Item A", "price": 500, "quantity": 2},
            {"name": "Item B", "price": 300, "quantity": 1},
        ])
    );
    let order_id = request["order_id"].as_str().expect("order id");
    assert!(order_id.starts_with("order_"));
    assert!(order_id.contains("_guest_"));
    assert_eq!(request["success_url"], "http://127.0.0.1:3000/checkout/success");
    assert_eq!(request["cancel_url"], "http://127.0.0.1:3000/cart");
}

#[tokio::test]
async fn test_checkout_rounds_fractional_cents() {
    let ctx = TestContext::new().await;
    ctx.add_item("p-a", "Item A", 19.99, 1).await;
    ctx.add_item("p-b", "Item B", 0.125, 3).await;

    let (status, _) = ctx.post_json("/api/checkout", &json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let request = &ctx.backend.payment_requests()[0];
    assert_eq!(request["line_items"][0]["price"], 1999);
    assert_eq!(request["line_items"][1]["price"], 13);
}

#[tokio::test]
async fn test_checkout_tags_order_with_user() {
    let ctx = TestContext::new().await;
    ctx.add_item("p-a", "Item A", 1.0, 1).await;

    let (status, _) = ctx
        .post_json("/api/checkout", &json!({"user_id": "user-42"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let request = &ctx.backend.payment_requests()[0];
    assert!(
        request["order_id"]
            .as_str()
            .expect("order id")
            .contains("_user-42_")
    );
}

#[tokio::test]
async fn test_empty_cart_checkout_makes_no_backend_call() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.post_json("/api/checkout", &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().expect("error message").contains("empty"));
    assert_eq!(ctx.backend.payment_link_calls(), 0);
}

#[tokio::test]
async fn test_backend_failure_keeps_cart_and_is_not_retried() {
    let ctx = TestContext::new().await;
    ctx.add_item("p-a", "Item A", 5.0, 2).await;
    ctx.backend.fail_payments();

    let (status, body) = ctx.post_json("/api/checkout", &json!({})).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    let message = body["error"].as_str().expect("error message");
    assert!(message.contains("try again"));
    assert!(!message.contains("payment provider down"));
    assert_eq!(ctx.backend.payment_link_calls(), 1);

    let (_, cart) = ctx.get_json("/api/cart").await;
    assert_eq!(cart["item_count"], 2);
}

#[tokio::test]
async fn test_form_checkout_redirects_to_payment_page() {
    let ctx = TestContext::new().await;
    ctx.add_item("p-a", "Item A", 5.0, 1).await;

    let response = ctx
        .client
        .post(ctx.url("/checkout"))
        .send()
        .await
        .expect("Request failed");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .expect("location header");
    assert!(location.starts_with(PAYMENT_ORIGIN));
}

#[tokio::test]
async fn test_success_with_session_token_clears_cart() {
    let ctx = TestContext::new().await;
    ctx.add_item("p-a", "Item A", 5.0, 2).await;
    let (status, _) = ctx.post_json("/api/checkout", &json!({})).await;
    assert_eq!(status, StatusCode::OK);

    // Cart is kept until the visitor returns from payment
    let (_, cart) = ctx.get_json("/api/cart").await;
    assert_eq!(cart["item_count"], 2);

    let (status, outcome) = ctx
        .get_json("/checkout/success?session_id=cs_test_a1b2")
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["status"], "success");
    assert_eq!(outcome["cart"]["item_count"], 0);

    let (_, cart) = ctx.get_json("/api/cart").await;
    assert_eq!(cart["items"], json!([]));
}

#[tokio::test]
async fn test_success_without_session_token_preserves_cart() {
    let ctx = TestContext::new().await;
    ctx.add_item("p-a", "Item A", 5.0, 2).await;

    for path in ["/checkout/success", "/checkout/success?session_id="] {
        let (status, outcome) = ctx.get_json(path).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outcome["status"], "error");
        assert_eq!(outcome["cart"]["item_count"], 2);
    }

    let (_, cart) = ctx.get_json("/api/cart").await;
    assert_eq!(cart["item_count"], 2);
}
