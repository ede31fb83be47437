use crate::presence::PresenceRegistry;
use huddle_api::types::UserId;
use uuid::Uuid;

#[tokio::test]
async fn register_reports_first_connection_only_once() {
    let registry = PresenceRegistry::new();
    let amy = UserId::new("amy");
    assert!(registry.register(&amy, Uuid::new_v4()).await);
    assert!(!registry.register(&amy, Uuid::new_v4()).await);
    assert!(!registry.register(&amy, Uuid::new_v4()).await);
}

#[tokio::test]
async fn deregister_reports_last_connection_only_once() {
    let registry = PresenceRegistry::new();
    let amy = UserId::new("amy");
    let c1 = Uuid::new_v4();
    let c2 = Uuid::new_v4();
    registry.register(&amy, c1).await;
    registry.register(&amy, c2).await;
    let (user, last) = registry.deregister(c1).await.expect("registered");
    assert_eq!(user, amy);
    assert!(!last);
    let (_, last) = registry.deregister(c2).await.expect("registered");
    assert!(last);
    assert!(registry.deregister(c2).await.is_none());
}

#[tokio::test]
async fn online_iff_live_connections_nonempty() {
    let registry = PresenceRegistry::new();
    let amy = UserId::new("amy");
    assert!(!registry.is_online(&amy).await);
    assert!(registry.live_connections(&amy).await.is_empty());
    let conn = Uuid::new_v4();
    registry.register(&amy, conn).await;
    assert!(registry.is_online(&amy).await);
    assert_eq!(registry.live_connections(&amy).await, vec![conn]);
    registry.deregister(conn).await;
    assert!(!registry.is_online(&amy).await);
    assert!(registry.live_connections(&amy).await.is_empty());
}

#[tokio::test]
async fn list_all_counts_connections_per_user() {
    let registry = PresenceRegistry::new();
    let amy = UserId::new("amy");
    let sue = UserId::new("sue");
    registry.register(&amy, Uuid::new_v4()).await;
    registry.register(&amy, Uuid::new_v4()).await;
    registry.register(&sue, Uuid::new_v4()).await;
    let mut listed = registry.list_all().await;
    listed.sort_by(|a, b| a.user_id.value.cmp(&b.user_id.value));
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].user_id, amy);
    assert_eq!(listed[0].connection_count, 2);
    assert_eq!(listed[1].user_id, sue);
    assert_eq!(listed[1].connection_count, 1);
}

#[tokio::test]
async fn deregistered_user_disappears_from_listing() {
    let registry = PresenceRegistry::new();
    let amy = UserId::new("amy");
    let conn = Uuid::new_v4();
    registry.register(&amy, conn).await;
    registry.deregister(conn).await;
    assert!(registry.list_all().await.is_empty());
}
