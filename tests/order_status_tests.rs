// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Seller order handling: status transitions, visibility, stats.

use eurofood_market::error::AppError;
use eurofood_market::models::{NewOrder, OrderItem, OrderStatus, PaymentStatus};
use eurofood_market::AppState;
use rust_decimal::Decimal;

mod common;
use common::{buyer, create_test_app, seller, test_address};

fn item(product_id: &str, seller_id: &str, quantity: u32, cents: i64) -> OrderItem {
    let price = Decimal::new(cents, 2);
    OrderItem {
        product_id: product_id.to_string(),
        product_name: format!("Product {}", product_id),
        product_image: None,
        seller_id: seller_id.to_string(),
        seller_name: format!("Seller {}", seller_id),
        quantity,
        price_per_unit: price,
        subtotal: price * Decimal::from(quantity),
    }
}

fn new_order(user_id: &str, items: Vec<OrderItem>) -> NewOrder {
    let subtotal: Decimal = items.iter().map(|i| i.subtotal).sum();
    NewOrder {
        user_id: user_id.to_string(),
        user_email: format!("{}@example.com", user_id),
        items,
        subtotal,
        shipping_cost: Decimal::ZERO,
        tax: Decimal::ZERO,
        total: subtotal,
        status: OrderStatus::Pending,
        shipping_address: test_address(),
        billing_address: test_address(),
        payment_method: "cash_on_delivery".to_string(),
        payment_status: PaymentStatus::Pending,
        notes: None,
        idempotency_key: None,
    }
}

async fn mixed_order(state: &AppState) -> String {
    state
        .orders
        .create_order(new_order(
            "b1",
            vec![item("p1", "s1", 2, 1000), item("p2", "s2", 1, 2500)],
        ))
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn test_create_order_does_not_touch_cart() {
    let (_, state, _) = create_test_app();
    let s1 = seller("s1");
    let product = common::add_product(&state, &s1, "Brie", 1500).await;
    state.carts.add_product("b1", &product.id, 1).await.unwrap();

    mixed_order(&state).await;
    assert_eq!(state.carts.get_cart("b1").await.unwrap().items.len(), 1);
}

#[tokio::test]
async fn test_forward_progress_stamps_delivery() {
    let (_, state, _) = create_test_app();
    let id = mixed_order(&state).await;
    let s1 = seller("s1");

    for status in [OrderStatus::Processing, OrderStatus::Shipped] {
        let order = state.orders.update_order_status(&s1, &id, status).await.unwrap();
        assert_eq!(order.status, status);
        assert!(order.delivered_at.is_none());
    }

    let delivered = state
        .orders
        .update_order_status(&s1, &id, OrderStatus::Delivered)
        .await
        .unwrap();
    assert!(delivered.delivered_at.is_some());

    let stored = state.db.get_order(&id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::Delivered);
    assert_eq!(stored.delivered_at, delivered.delivered_at);
}

#[tokio::test]
async fn test_forward_moves_may_skip_steps() {
    let (_, state, _) = create_test_app();
    let id = mixed_order(&state).await;

    let order = state
        .orders
        .update_order_status(&seller("s2"), &id, OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(order.status, OrderStatus::Shipped);
}

#[tokio::test]
async fn test_backward_and_terminal_moves_rejected() {
    let (_, state, _) = create_test_app();
    let id = mixed_order(&state).await;
    let s1 = seller("s1");

    state
        .orders
        .update_order_status(&s1, &id, OrderStatus::Shipped)
        .await
        .unwrap();
    let err = state
        .orders
        .update_order_status(&s1, &id, OrderStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));

    state
        .orders
        .update_order_status(&s1, &id, OrderStatus::Cancelled)
        .await
        .unwrap();
    for status in [OrderStatus::Pending, OrderStatus::Delivered, OrderStatus::Cancelled] {
        let err = state
            .orders
            .update_order_status(&s1, &id, status)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)), "{:?}", status);
    }
}

#[tokio::test]
async fn test_unrelated_seller_and_buyer_cannot_change_status() {
    let (_, state, _) = create_test_app();
    let id = mixed_order(&state).await;

    let err = state
        .orders
        .update_order_status(&seller("s3"), &id, OrderStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = state
        .orders
        .update_order_status(&buyer("b1"), &id, OrderStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = state
        .orders
        .update_order_status(&seller("s1"), "missing", OrderStatus::Processing)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_tracking_number() {
    let (_, state, _) = create_test_app();
    let id = mixed_order(&state).await;

    let order = state
        .orders
        .update_tracking_number(&seller("s1"), &id, "  DHL-0042  ")
        .await
        .unwrap();
    assert_eq!(order.tracking_number.as_deref(), Some("DHL-0042"));

    let err = state
        .orders
        .update_tracking_number(&seller("s1"), &id, "   ")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_order_visibility() {
    let (_, state, _) = create_test_app();
    let id = mixed_order(&state).await;

    let full = state.orders.get_order(&buyer("b1"), &id).await.unwrap();
    assert_eq!(full.items.len(), 2);

    let view = state.orders.get_order(&seller("s1"), &id).await.unwrap();
    assert_eq!(view.items.len(), 1);
    assert_eq!(view.subtotal, Decimal::new(2000, 2));

    for outsider in [buyer("b2"), seller("s3")] {
        let err = state.orders.get_order(&outsider, &id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}

#[tokio::test]
async fn test_user_orders_newest_first() {
    let (_, state, _) = create_test_app();
    let first = mixed_order(&state).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let second = mixed_order(&state).await;

    let orders = state.orders.get_user_orders(&buyer("b1")).await.unwrap();
    let ids: Vec<_> = orders.iter().map(|o| o.id.clone()).collect();
    assert_eq!(ids, vec![second, first]);

    assert!(state.orders.get_user_orders(&buyer("b2")).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_seller_orders_and_stats() {
    let (_, state, _) = create_test_app();

    // Two orders: s1 sells 2 × 10.00 in the first and 1 × 10.00 in the second.
    let first = state
        .orders
        .create_order(new_order(
            "b1",
            vec![item("p1", "s1", 2, 1000), item("p2", "s2", 1, 2500)],
        ))
        .await
        .unwrap();
    state
        .orders
        .create_order(new_order("b2", vec![item("p1", "s1", 1, 1000)]))
        .await
        .unwrap();
    state
        .orders
        .create_order(new_order("b3", vec![item("p9", "s9", 1, 9900)]))
        .await
        .unwrap();

    let s1 = seller("s1");
    state
        .orders
        .update_order_status(&s1, &first.id, OrderStatus::Delivered)
        .await
        .unwrap();

    let orders = state.orders.get_seller_orders("s1").await.unwrap();
    assert_eq!(orders.len(), 2);

    let stats = state.orders.get_seller_order_stats("s1").await.unwrap();
    assert_eq!(stats.total_orders, 2);
    assert_eq!(stats.pending_orders, 1);
    assert_eq!(stats.delivered_orders, 1);
    assert_eq!(stats.total_revenue, Decimal::new(3000, 2));

    let none = state.orders.get_seller_order_stats("nobody").await.unwrap();
    assert_eq!(none.total_orders, 0);
    assert_eq!(none.total_revenue, Decimal::ZERO);
}
