//! The cart mutation gateway against a stateful fake cart.

#![allow(clippy::unwrap_used)]

use serde_json::json;

use techmart_client::{AddOutcome, AppContext, ClientError, GuestCartRetention};
use techmart_core::{CartItemId, CartLine, ProductId};
use techmart_integration_tests::{
    FakeBackend, Reply, customer, memory_storage, product, signed_in_storage,
};

const EMAIL: &str = "priya@techmart.in";

async fn signed_in(backend: &FakeBackend) -> AppContext {
    backend.add_product(5, "Noise Cancelling Headphones", 7999.0);
    backend.add_product(8, "Mechanical Keyboard", 4999.0);
    let (_, storage) = signed_in_storage(&customer());
    backend
        .context(storage, GuestCartRetention::default())
        .await
        .0
}

fn server_cart(backend: &FakeBackend) -> Vec<CartLine> {
    serde_json::from_value(backend.server_cart(EMAIL)).unwrap()
}

fn line_for(context: &AppContext, product_id: i64) -> CartItemId {
    context
        .cart()
        .iter()
        .find(|line| line.product_id == Some(ProductId::new(product_id)))
        .unwrap()
        .id
}

#[tokio::test]
async fn test_mutations_leave_cart_equal_to_backend() {
    let backend = FakeBackend::start().await;
    let mut context = signed_in(&backend).await;

    let outcome = context
        .add_to_cart(&product(5, "Noise Cancelling Headphones", 7999.0), 2)
        .await
        .unwrap();
    assert_eq!(outcome, AddOutcome::Added);
    assert_eq!(context.cart(), server_cart(&backend));

    context
        .add_to_cart(&product(8, "Mechanical Keyboard", 4999.0), 1)
        .await
        .unwrap();
    assert_eq!(context.cart(), server_cart(&backend));

    let headphones = line_for(&context, 5);
    context.update_quantity(headphones, 1).await.unwrap();
    assert_eq!(context.cart(), server_cart(&backend));
    assert_eq!(context.cart().first().unwrap().quantity, 3);

    let keyboard = line_for(&context, 8);
    context.remove_item(keyboard).await.unwrap();
    assert_eq!(context.cart(), server_cart(&backend));
    assert_eq!(context.cart().len(), 1);
}

#[tokio::test]
async fn test_every_mutation_is_followed_by_a_fetch() {
    let backend = FakeBackend::start().await;
    let mut context = signed_in(&backend).await;
    backend.clear_requests();

    context
        .add_to_cart(&product(5, "Noise Cancelling Headphones", 7999.0), 1)
        .await
        .unwrap();
    let line = line_for(&context, 5);
    context.update_quantity(line, 2).await.unwrap();
    context.remove_item(line).await.unwrap();

    let calls: Vec<_> = backend
        .requests()
        .into_iter()
        .map(|request| format!("{} {}", request.method, request.path))
        .collect();
    assert_eq!(
        calls,
        [
            "POST /cart/add",
            "GET /cart",
            format!("PUT /cart/update/{line}").as_str(),
            "GET /cart",
            format!("DELETE /cart/remove/{line}").as_str(),
            "GET /cart",
        ]
    );
}

#[tokio::test]
async fn test_decrement_below_one_removes_instead_of_updating() {
    let backend = FakeBackend::start().await;
    let mut context = signed_in(&backend).await;
    context
        .add_to_cart(&product(5, "Noise Cancelling Headphones", 7999.0), 1)
        .await
        .unwrap();
    context
        .add_to_cart(&product(8, "Mechanical Keyboard", 4999.0), 3)
        .await
        .unwrap();

    let headphones = line_for(&context, 5);
    context.update_quantity(headphones, -1).await.unwrap();
    let keyboard = line_for(&context, 8);
    context.update_quantity(keyboard, -7).await.unwrap();

    assert!(backend.requests_to("PUT", &format!("/cart/update/{headphones}")).is_empty());
    assert!(backend.requests_to("PUT", &format!("/cart/update/{keyboard}")).is_empty());
    assert_eq!(
        backend
            .requests_to("DELETE", &format!("/cart/remove/{headphones}"))
            .len(),
        1
    );
    assert_eq!(
        backend
            .requests_to("DELETE", &format!("/cart/remove/{keyboard}"))
            .len(),
        1
    );
    assert!(
        backend
            .requests()
            .iter()
            .filter_map(|request| request.query("quantity"))
            .all(|quantity| quantity.parse::<i64>().unwrap() >= 1)
    );
    assert!(context.cart().is_empty());
}

#[tokio::test]
async fn test_failed_add_is_alerted_and_keeps_cart() {
    let backend = FakeBackend::start().await;
    let (_, storage) = signed_in_storage(&customer());
    let (mut context, notifier) = backend
        .context(storage, GuestCartRetention::default())
        .await;
    backend.clear_requests();

    let result = context
        .add_to_cart(&product(42, "Discontinued Tablet", 15999.0), 1)
        .await;

    assert!(matches!(result, Err(ClientError::Api(_))));
    assert_eq!(notifier.alerts(), vec!["Failed to add product to cart"]);
    assert!(context.cart().is_empty());
    assert!(backend.requests_to("GET", "/cart").is_empty());
}

#[tokio::test]
async fn test_failed_update_is_alerted() {
    let backend = FakeBackend::start().await;
    let mut context = signed_in(&backend).await;
    context
        .add_to_cart(&product(5, "Noise Cancelling Headphones", 7999.0), 1)
        .await
        .unwrap();
    let line = line_for(&context, 5);
    backend.respond(
        "PUT",
        &format!("/cart/update/{line}"),
        Reply::json(400, &json!({"message": "Only 1 left in stock"})),
    );
    let before = context.cart().to_vec();

    let result = context.update_quantity(line, 1).await;

    assert!(result.is_err());
    assert_eq!(context.cart(), before);
}

#[tokio::test]
async fn test_failed_remove_is_alerted_and_keeps_cart() {
    let backend = FakeBackend::start().await;
    backend.add_product(5, "Noise Cancelling Headphones", 7999.0);
    let (_, storage) = signed_in_storage(&customer());
    let (mut context, notifier) = backend
        .context(storage, GuestCartRetention::default())
        .await;
    context
        .add_to_cart(&product(5, "Noise Cancelling Headphones", 7999.0), 1)
        .await
        .unwrap();
    let line = line_for(&context, 5);
    backend.respond("DELETE", &format!("/cart/remove/{line}"), Reply::status(500));
    let before = context.cart().to_vec();
    backend.clear_requests();

    let result = context.remove_item(line).await;

    assert!(matches!(result, Err(ClientError::Api(_))));
    assert_eq!(context.cart(), before);
    assert_eq!(server_cart(&backend), before);
    assert_eq!(
        notifier.alerts().last().map(String::as_str),
        Some("Failed to remove item")
    );
    assert!(backend.requests_to("GET", "/cart").is_empty());
}

#[tokio::test]
async fn test_failed_refresh_keeps_last_snapshot() {
    let backend = FakeBackend::start().await;
    let mut context = signed_in(&backend).await;
    backend.respond_once("GET", "/cart", Reply::status(500));

    let outcome = context
        .add_to_cart(&product(5, "Noise Cancelling Headphones", 7999.0), 1)
        .await
        .unwrap();

    assert_eq!(outcome, AddOutcome::Added);
    assert!(context.cart().is_empty());
    assert_eq!(server_cart(&backend).len(), 1);

    context.refresh_cart().await.unwrap();
    assert_eq!(context.cart(), server_cart(&backend));
}

#[tokio::test]
async fn test_guest_mutations_never_reach_backend() {
    let backend = FakeBackend::start().await;
    let (_, storage) = memory_storage();
    let (mut context, notifier) = backend
        .context(storage.clone(), GuestCartRetention::default())
        .await;

    let outcome = context
        .add_to_cart(&product(5, "Noise Cancelling Headphones", 7999.0), 2)
        .await
        .unwrap();
    context.update_quantity(CartItemId::new(5), 1).await.unwrap();
    context.remove_item(CartItemId::new(5)).await.unwrap();

    assert_eq!(outcome, AddOutcome::Deferred);
    assert!(backend.requests().is_empty());
    assert!(storage.pending_intent().is_some());
    assert_eq!(notifier.alerts(), vec!["Please login to add items to cart"]);
}
