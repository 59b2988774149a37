mod common;

use admin_client::socket::MemoryConnector;
use admin_client::{
    AcceptOrder, AdminSession, ClientError, ConnectionManager, ErrorKind, MutationResult,
    OrderBuckets, OrderStatus, RejectOrder, SocketConfig, SocketEvent, SocketMessage,
};
use common::{FakeBackend, RESTAURANT_ID, dine_in, eventually, order, waiter_call};
use shared::message::OrderStatusBroadcast;
use shared::models::{RestaurantStatus, WaiterCallStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

const WAIT: Duration = Duration::from_secs(2);

struct Harness {
    admin: AdminSession,
    backend: Arc<FakeBackend>,
    server: MemoryConnector,
    outbound: broadcast::Receiver<SocketMessage>,
}

fn harness(backend: FakeBackend) -> Harness {
    let backend = Arc::new(backend);
    let (manager, server) = ConnectionManager::in_memory(SocketConfig::default());
    let outbound = server.outbound();
    let admin = AdminSession::new(backend.clone(), Arc::new(manager), Duration::from_secs(1));
    Harness {
        admin,
        backend,
        server,
        outbound,
    }
}

/// Restaurant loaded, room joined, join frame drained
async fn loaded(backend: FakeBackend) -> Harness {
    let mut h = harness(backend);
    h.admin.load_restaurant().await.unwrap();

    let join = h.outbound.recv().await.unwrap();
    assert_eq!(join.event, SocketEvent::JoinRestaurantRoom);
    assert_eq!(join.data, serde_json::json!(RESTAURANT_ID));
    h
}

fn list_counts(backend: &FakeBackend) -> [usize; 3] {
    OrderStatus::BUCKETED.map(|s| backend.list_calls(s))
}

fn ids(orders: &[shared::models::Order]) -> Vec<&str> {
    orders.iter().map(|o| o.id.as_str()).collect()
}

fn order_update() -> SocketMessage {
    SocketMessage::new(SocketEvent::OrderUpdate, serde_json::json!({ "id": "o-1" }))
}

// ========== Mutations ==========

#[tokio::test]
async fn test_transitions_move_orders_between_buckets() {
    let h = loaded(FakeBackend::with_orders(vec![
        order("o-1", OrderStatus::Pending),
        order("o-2", OrderStatus::Pending),
        order("o-3", OrderStatus::Processing),
    ]))
    .await;
    let store = h.admin.orders();
    store.reload_all().await.unwrap();

    let accepted = store
        .accept_order(
            "o-1",
            &AcceptOrder {
                processing_time: 15,
                customer_id: Some("cust-1".into()),
            },
        )
        .await;
    assert!(accepted.is_success());

    let rejected = store
        .reject_order(
            "o-2",
            &RejectOrder {
                reason: Some("Out of stock".into()),
                customer_id: None,
            },
        )
        .await;
    assert!(rejected.is_success());

    let completed = store.complete_order("o-3").await;
    assert!(completed.is_success());

    let buckets = store.snapshot().await;
    assert_eq!(ids(&buckets.pending), Vec::<&str>::new());
    assert_eq!(ids(&buckets.processing), vec!["o-1"]);
    assert_eq!(ids(&buckets.completed), vec!["o-3"]);
    assert!(buckets.find("o-2").is_none());
    assert_eq!(h.backend.order_status("o-2"), Some(OrderStatus::Rejected));
    assert_eq!(buckets.processing[0].processing_time, Some(15));
}

#[tokio::test]
async fn test_accept_reloads_orders_exactly_once() {
    let h = loaded(FakeBackend::with_orders(vec![order("order-1", OrderStatus::Pending)])).await;
    let store = h.admin.orders();
    store.reload_all().await.unwrap();

    let before = list_counts(&h.backend);
    let dine_in_before = h.backend.dine_in_calls();

    let result = store
        .accept_order(
            "order-1",
            &AcceptOrder {
                processing_time: 15,
                customer_id: Some("cust-1".into()),
            },
        )
        .await;

    assert_eq!(result, MutationResult::Success);
    assert_eq!(list_counts(&h.backend), before.map(|n| n + 1));
    assert_eq!(h.backend.dine_in_calls(), dine_in_before);
    assert_eq!(h.backend.writes(), vec!["accept order-1"]);
}

#[tokio::test]
async fn test_accept_broadcasts_status_to_room() {
    let mut h = loaded(FakeBackend::with_orders(vec![order("o-1", OrderStatus::Pending)])).await;

    let result = h
        .admin
        .orders()
        .accept_order(
            "o-1",
            &AcceptOrder {
                processing_time: 20,
                customer_id: Some("cust-1".into()),
            },
        )
        .await;
    assert!(result.is_success());

    let frame = h.outbound.recv().await.unwrap();
    assert_eq!(frame.event, SocketEvent::OrderAcceptedOrRejected);
    let payload: OrderStatusBroadcast = frame.parse_data().unwrap();
    assert_eq!(
        payload,
        OrderStatusBroadcast {
            order_id: "o-1".into(),
            order_status: OrderStatus::Processing,
            restaurant_id: RESTAURANT_ID.into(),
            customer_id: Some("cust-1".into()),
        }
    );
    assert_eq!(frame.data["orderStatus"], "processing");
}

#[tokio::test]
async fn test_failed_reject_reports_failure() {
    let h = loaded(FakeBackend::with_orders(vec![order("o-1", OrderStatus::Pending)])).await;
    h.backend.fail_writes();

    let before = list_counts(&h.backend);
    let result = h
        .admin
        .orders()
        .reject_order(
            "o-1",
            &RejectOrder {
                reason: None,
                customer_id: None,
            },
        )
        .await;

    assert!(!result.is_success());
    assert_eq!(result.kind(), Some(ErrorKind::Server));
    assert!(result.message().is_some_and(|m| !m.trim().is_empty()));
    // Reload still runs after a failed write
    assert_eq!(list_counts(&h.backend), before.map(|n| n + 1));
}

#[tokio::test]
async fn test_illegal_local_transition_skips_remote_write() {
    let h = loaded(FakeBackend::with_orders(vec![order("o-3", OrderStatus::Processing)])).await;
    let store = h.admin.orders();
    store.load_orders().await.unwrap();

    let result = store
        .accept_order(
            "o-3",
            &AcceptOrder {
                processing_time: 5,
                customer_id: None,
            },
        )
        .await;

    assert_eq!(result.kind(), Some(ErrorKind::Validation));
    assert!(h.backend.writes().is_empty());
    assert_eq!(store.orders(OrderStatus::Processing).await.len(), 1);
}

#[tokio::test]
async fn test_unknown_order_is_left_to_server() {
    let h = loaded(FakeBackend::default()).await;

    let result = h.admin.orders().complete_order("missing").await;

    assert_eq!(result.kind(), Some(ErrorKind::NotFound));
    assert_eq!(h.backend.writes(), vec!["complete missing"]);
}

// ========== Reloads ==========

#[tokio::test]
async fn test_failed_bucket_keeps_previous_and_others_refresh() {
    let h = loaded(FakeBackend::with_orders(vec![
        order("o-1", OrderStatus::Pending),
        order("o-2", OrderStatus::Processing),
    ]))
    .await;
    let store = h.admin.orders();
    assert!(store.load_orders().await.unwrap().is_complete());

    h.backend.set_orders(vec![
        order("o-4", OrderStatus::Pending),
        order("o-5", OrderStatus::Processing),
        order("o-6", OrderStatus::Completed),
    ]);
    h.backend.fail_status(OrderStatus::Processing);

    let report = store.load_orders().await.unwrap();
    assert_eq!(report.failed, vec![OrderStatus::Processing]);

    let buckets = store.snapshot().await;
    assert_eq!(ids(&buckets.pending), vec!["o-4"]);
    assert_eq!(ids(&buckets.processing), vec!["o-2"]);
    assert_eq!(ids(&buckets.completed), vec!["o-6"]);
}

#[tokio::test]
async fn test_malformed_bucket_keeps_previous() {
    let h = loaded(FakeBackend::with_orders(vec![order("o-1", OrderStatus::Pending)])).await;
    let store = h.admin.orders();
    store.load_orders().await.unwrap();

    h.backend.set_orders(Vec::new());
    h.backend.malformed_status(OrderStatus::Pending);

    let report = store.load_orders().await.unwrap();
    assert_eq!(report.failed, vec![OrderStatus::Pending]);
    assert_eq!(ids(&store.orders(OrderStatus::Pending).await), vec!["o-1"]);

    h.backend.heal();
    assert!(store.load_orders().await.unwrap().is_complete());
    assert!(store.orders(OrderStatus::Pending).await.is_empty());
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_reload_all_fills_active_dine_in() {
    let backend = FakeBackend::default();
    backend.set_dine_in(vec![dine_in("d-1", "table-4")]);
    let h = loaded(backend).await;

    let revision = h.admin.orders().revision();
    let report = h.admin.orders().reload_all().await.unwrap();

    assert!(report.is_complete());
    assert_eq!(h.admin.orders().active_dine_in().await[0].table_id, "table-4");
    assert_eq!(h.admin.orders().revision(), revision + 2);
}

#[tokio::test]
async fn test_operations_before_restaurant_load() {
    let h = harness(FakeBackend::with_orders(vec![order("o-1", OrderStatus::Pending)]));
    let store = h.admin.orders();

    assert!(matches!(store.load_orders().await, Err(ClientError::NoSession)));
    assert!(matches!(
        h.admin.waiter_calls().load_waiter_calls().await,
        Err(ClientError::NoSession)
    ));

    let result = store.complete_order("o-1").await;
    assert_eq!(result.kind(), Some(ErrorKind::Session));
    assert!(h.backend.writes().is_empty());

    assert!(matches!(
        h.admin.toggle_status().await,
        Err(ClientError::NoSession)
    ));
}

// ========== Socket-driven sync ==========

#[tokio::test]
async fn test_order_update_without_listener_changes_nothing() {
    let h = loaded(FakeBackend::with_orders(vec![order("o-1", OrderStatus::Pending)])).await;
    let store = h.admin.orders();
    let revision = store.revision();

    // Before any mount
    assert!(h.server.push(order_update()) > 0);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(list_counts(&h.backend), [0, 0, 0]);
    assert_eq!(store.revision(), revision);

    // After unmount
    h.admin.mount_listeners().await;
    h.admin.unmount_listeners().await;
    h.server.push(order_update());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(list_counts(&h.backend), [0, 0, 0]);
    assert!(store.orders(OrderStatus::Pending).await.is_empty());
}

#[tokio::test]
async fn test_order_update_triggers_full_reload() {
    let h = loaded(FakeBackend::default()).await;
    h.admin.mount_listeners().await;
    let store = h.admin.orders().clone();
    let revision = store.revision();

    h.backend.push_order(order("o-9", OrderStatus::Pending));
    h.server.push(order_update());

    assert!(eventually(WAIT, || store.revision() >= revision + 2).await);
    assert_eq!(ids(&store.orders(OrderStatus::Pending).await), vec!["o-9"]);
    assert_eq!(h.backend.dine_in_calls(), 1);
}

#[tokio::test]
async fn test_remount_does_not_duplicate_handlers() {
    let h = loaded(FakeBackend::default()).await;
    h.admin.mount_listeners().await;
    h.admin.mount_listeners().await;

    let registry = h.admin.sockets().registry();
    assert_eq!(registry.listener_count(&SocketEvent::OrderUpdate), 1);
    assert_eq!(registry.listener_count(&SocketEvent::NewWaiterCall), 1);

    h.server.push(order_update());
    let backend = h.backend.clone();
    assert!(eventually(WAIT, || backend.dine_in_calls() >= 1).await);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(list_counts(&h.backend), [1, 1, 1]);
}

#[tokio::test]
async fn test_order_placed_is_only_logged() {
    let h = loaded(FakeBackend::default()).await;
    h.admin.mount_listeners().await;

    h.server.push(SocketMessage::new(
        SocketEvent::OrderPlaced,
        serde_json::json!({ "id": "o-new" }),
    ));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(list_counts(&h.backend), [0, 0, 0]);
}

// ========== Waiter calls ==========

#[tokio::test]
async fn test_waiter_call_lifecycle() {
    let backend = FakeBackend::default();
    backend.set_waiter_calls(vec![waiter_call("c-1", WaiterCallStatus::Pending)]);
    let h = loaded(backend).await;
    let calls = h.admin.waiter_calls();
    assert!(calls.load_waiter_calls().await.unwrap());

    assert!(calls.acknowledge("c-1").await.is_success());
    assert_eq!(calls.calls().await[0].status, WaiterCallStatus::Acknowledged);

    assert!(calls.resolve("c-1").await.is_success());
    assert!(calls.open_calls().await.is_empty());

    let again = calls.acknowledge("c-1").await;
    assert_eq!(again.kind(), Some(ErrorKind::Validation));
    assert_eq!(h.backend.writes(), vec!["waiter-call c-1", "waiter-call c-1"]);
}

#[tokio::test]
async fn test_new_waiter_call_push_reloads_calls() {
    let h = loaded(FakeBackend::default()).await;
    h.admin.mount_listeners().await;
    let calls = h.admin.waiter_calls().clone();
    let revision = calls.revision();

    h.backend
        .set_waiter_calls(vec![waiter_call("c-2", WaiterCallStatus::Pending)]);
    h.server.push(SocketMessage::new(
        SocketEvent::NewWaiterCall,
        serde_json::json!({ "id": "c-2" }),
    ));

    assert!(eventually(WAIT, || calls.revision() > revision).await);
    assert_eq!(calls.calls().await[0].id, "c-2");
    assert_eq!(list_counts(&h.backend), [0, 0, 0]);
}

#[tokio::test]
async fn test_store_changes_wake_on_waiter_call_push() {
    let h = loaded(FakeBackend::default()).await;
    h.admin.mount_listeners().await;
    let mut changes = h.admin.subscribe_changes();

    h.backend
        .set_waiter_calls(vec![waiter_call("c-3", WaiterCallStatus::Pending)]);
    h.server.push(SocketMessage::new(
        SocketEvent::NewWaiterCall,
        serde_json::json!({ "id": "c-3" }),
    ));

    let woke = tokio::time::timeout(WAIT, changes.changed()).await.unwrap();
    assert!(woke);
    assert_eq!(list_counts(&h.backend), [0, 0, 0]);
    assert_eq!(h.admin.waiter_calls().open_calls().await.len(), 1);
}

// ========== Restaurant session ==========

#[tokio::test]
async fn test_restaurant_toggles_update_backend_and_session() {
    let h = loaded(FakeBackend::default()).await;

    let session = h.admin.toggle_status().await.unwrap();
    assert_eq!(session.status, RestaurantStatus::Open);
    assert_eq!(h.backend.restaurant_status(), RestaurantStatus::Open);

    let session = h.admin.set_dine_in_available(true).await.unwrap();
    assert!(session.dine_in_available);
    assert!(h.backend.dine_in_available());
    assert_eq!(h.admin.session().get().await, Some(session));
}

#[tokio::test]
async fn test_failed_toggle_leaves_session_unchanged() {
    let h = loaded(FakeBackend::default()).await;
    h.backend.fail_writes();

    assert!(h.admin.toggle_status().await.is_err());
    let session = h.admin.session().get().await.unwrap();
    assert_eq!(session.status, RestaurantStatus::Closed);
}

#[tokio::test]
async fn test_reload_restaurant_reuses_connection_and_rejoins() {
    let mut h = loaded(FakeBackend::default()).await;
    let first = h.admin.connection().await.unwrap();

    h.admin.load_restaurant().await.unwrap();

    let second = h.admin.connection().await.unwrap();
    assert_eq!(first.id(), second.id());
    assert_eq!(h.admin.sockets().leases().await, 1);

    let join = h.outbound.recv().await.unwrap();
    assert_eq!(join.event, SocketEvent::JoinRestaurantRoom);
}

#[tokio::test]
async fn test_logout_tears_everything_down() {
    let h = loaded(FakeBackend::with_orders(vec![order("o-1", OrderStatus::Pending)])).await;
    h.admin.mount_listeners().await;
    h.admin.orders().reload_all().await.unwrap();
    let connection = h.admin.connection().await.unwrap();

    h.admin.logout().await;

    assert!(connection.is_closed());
    assert!(h.admin.connection().await.is_none());
    assert!(h.admin.session().get().await.is_none());
    assert!(h.admin.sockets().registry().is_empty());
    assert_eq!(h.admin.orders().snapshot().await, OrderBuckets::default());
}

#[tokio::test]
async fn test_refresh_loads_every_store() {
    let backend = FakeBackend::with_orders(vec![order("o-1", OrderStatus::Completed)]);
    backend.set_waiter_calls(vec![waiter_call("c-1", WaiterCallStatus::Pending)]);
    let h = loaded(backend).await;

    let report = h.admin.refresh().await.unwrap();

    assert!(report.is_complete());
    assert_eq!(list_counts(&h.backend), [1, 1, 1]);
    assert_eq!(h.backend.dine_in_calls(), 1);
    assert_eq!(h.backend.waiter_call_lists(), 1);
    assert_eq!(ids(&h.admin.orders().orders(OrderStatus::Completed).await), vec!["o-1"]);
    assert_eq!(h.admin.waiter_calls().open_calls().await.len(), 1);
}
