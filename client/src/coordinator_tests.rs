//! Tests for the coordinator.

use std::sync::Arc;

use super::*;
use crate::domain::AsyncStatus;
use crate::domain::ports::RecordGatewayError;
use crate::domain::record::CostRecord;
use crate::test_support::InMemoryRemoteService;

fn credentials() -> Credentials {
    Credentials::try_from_parts("ada@example.com", "correct horse").expect("credentials shape")
}

async fn signed_in_coordinator() -> (Arc<InMemoryRemoteService>, Coordinator<InMemoryRemoteService>, Identity)
{
    let service = Arc::new(InMemoryRemoteService::default());
    service.register_account("ada@example.com", "correct horse");
    let coordinator = Coordinator::new(Arc::clone(&service));
    coordinator.start().await;
    let identity = coordinator
        .sign_in(&credentials())
        .await
        .expect("sign-in succeeds");
    (service, coordinator, identity)
}

#[tokio::test]
async fn start_resumes_an_existing_session() {
    let service = Arc::new(InMemoryRemoteService::default());
    let resumed = service.with_active_session("ada@example.com", "correct horse");

    let coordinator = Coordinator::new(service);
    coordinator.start().await;

    assert_eq!(coordinator.session().identity(), Some(resumed));
    assert_eq!(coordinator.session().status(), AsyncStatus::Succeeded);
}

#[tokio::test]
async fn start_without_a_session_leaves_the_store_idle() {
    let coordinator = Coordinator::new(Arc::new(InMemoryRemoteService::default()));
    coordinator.start().await;

    assert!(coordinator.session().identity().is_none());
    assert_eq!(coordinator.session().status(), AsyncStatus::Idle);
}

#[tokio::test]
async fn collection_commands_require_a_session() {
    let service = Arc::new(InMemoryRemoteService::default());
    let coordinator = Coordinator::new(Arc::clone(&service));
    coordinator.start().await;

    let err = coordinator.fetch_items().await.expect_err("must fail");

    assert!(matches!(err, StoreError::Unauthenticated));
    assert_eq!(service.record_calls(), 0, "the service must not see the request");
    assert_eq!(coordinator.items().status(), AsyncStatus::Failed);
}

#[tokio::test]
async fn collection_commands_inject_the_signed_in_identity() {
    let (service, coordinator, identity) = signed_in_coordinator().await;
    let seeded = service.seed_item(identity.id(), "timber", 120.0);
    service.seed_item(&crate::domain::UserId::random(), "paint", 35.0);

    let fetched = coordinator.fetch_items().await.expect("fetch succeeds");
    assert_eq!(fetched, vec![seeded]);

    let draft = ItemDraft::new("bricks", 80.0).expect("valid draft");
    let created = coordinator.add_item(&draft).await.expect("create succeeds");
    assert_eq!(created.owner_id(), identity.id());
    assert_eq!(coordinator.items().records().first(), Some(&created));

    let revised = ItemDraft::new("bricks", 95.0).expect("valid draft");
    let updated = coordinator
        .update_item(created.id(), &revised)
        .await
        .expect("update succeeds");
    assert_eq!(updated.cost(), 95.0);

    coordinator
        .remove_item(created.id())
        .await
        .expect("delete succeeds");
    assert!(
        coordinator
            .items()
            .records()
            .iter()
            .all(|record| record.id() != created.id())
    );
}

#[tokio::test]
async fn other_cost_commands_share_the_same_gate() {
    let (_, coordinator, _) = signed_in_coordinator().await;

    let draft = OtherCostDraft::new("permit fee", 250.0).expect("valid draft");
    let created = coordinator
        .add_other_cost(&draft)
        .await
        .expect("create succeeds");
    assert_eq!(coordinator.other_costs().records(), vec![created.clone()]);

    coordinator
        .remove_other_cost(created.id())
        .await
        .expect("delete succeeds");
    assert!(coordinator.other_costs().records().is_empty());
}

#[tokio::test]
async fn sign_out_purges_both_collections() {
    let (service, coordinator, identity) = signed_in_coordinator().await;
    service.seed_item(identity.id(), "timber", 120.0);
    service.seed_other_cost(identity.id(), "permit fee", 250.0);
    coordinator.fetch_items().await.expect("fetch succeeds");
    coordinator.fetch_other_costs().await.expect("fetch succeeds");

    coordinator.sign_out().await.expect("sign-out succeeds");

    assert!(coordinator.session().identity().is_none());
    assert!(coordinator.items().records().is_empty());
    assert!(coordinator.other_costs().records().is_empty());
    assert_eq!(coordinator.items().status(), AsyncStatus::Idle);
}

#[tokio::test]
async fn out_of_band_sign_out_purges_and_re_broadcasts() {
    let (service, coordinator, identity) = signed_in_coordinator().await;
    let mut feed = coordinator.subscribe();
    service.seed_item(identity.id(), "timber", 120.0);
    coordinator.fetch_items().await.expect("fetch succeeds");

    service.publish(SessionEvent::SignedOut);

    // The pump replays the feed in order: first the sign-in from the
    // fixture setup, then the out-of-band sign-out.
    assert_eq!(feed.next().await, Some(SessionEvent::SignedIn(identity)));
    assert_eq!(feed.next().await, Some(SessionEvent::SignedOut));
    assert!(coordinator.session().identity().is_none());
    assert!(coordinator.items().records().is_empty());
    assert!(coordinator.other_costs().records().is_empty());
}

#[tokio::test]
async fn sign_in_events_reach_application_subscribers() {
    let service = Arc::new(InMemoryRemoteService::default());
    service.register_account("ada@example.com", "correct horse");
    let coordinator = Coordinator::new(Arc::clone(&service));
    coordinator.start().await;
    let mut feed = coordinator.subscribe();

    let identity = coordinator
        .sign_in(&credentials())
        .await
        .expect("sign-in succeeds");

    assert_eq!(feed.next().await, Some(SessionEvent::SignedIn(identity)));
}

#[tokio::test]
async fn duplicate_sign_out_events_are_dropped() {
    let service = Arc::new(InMemoryRemoteService::default());
    let identity = service.with_active_session("ada@example.com", "correct horse");
    let coordinator = Coordinator::new(Arc::clone(&service));
    coordinator.start().await;
    let mut feed = coordinator.subscribe();

    // The explicit sign-out clears the identity before the service's own
    // signed-out event reaches the pump, so that event is a duplicate.
    coordinator.sign_out().await.expect("sign-out succeeds");
    service.publish(SessionEvent::SignedIn(identity.clone()));

    assert_eq!(
        feed.next().await,
        Some(SessionEvent::SignedIn(identity)),
        "the duplicate signed-out event must not be re-broadcast"
    );
}

#[tokio::test]
async fn navigation_follows_the_session() {
    let service = Arc::new(InMemoryRemoteService::default());
    service.register_account("ada@example.com", "correct horse");
    let coordinator = Coordinator::new(Arc::clone(&service));
    coordinator.start().await;

    assert_eq!(coordinator.resolve_screen(Screen::Dashboard), Screen::Login);
    assert_eq!(coordinator.resolve_screen(Screen::SignUp), Screen::SignUp);

    coordinator
        .sign_in(&credentials())
        .await
        .expect("sign-in succeeds");

    assert_eq!(coordinator.resolve_screen(Screen::Dashboard), Screen::Dashboard);
    assert_eq!(coordinator.resolve_screen(Screen::Login), Screen::Dashboard);
}

#[tokio::test]
async fn spend_summary_totals_both_collections() {
    let (service, coordinator, identity) = signed_in_coordinator().await;
    service.seed_item(identity.id(), "timber", 120.0);
    service.seed_item(identity.id(), "bricks", 80.0);
    service.seed_other_cost(identity.id(), "permit fee", 250.0);
    coordinator.fetch_items().await.expect("fetch succeeds");
    coordinator.fetch_other_costs().await.expect("fetch succeeds");

    let summary = coordinator.spend_summary();
    assert_eq!(summary.items_total(), 200.0);
    assert_eq!(summary.other_costs_total(), 250.0);
    assert_eq!(summary.grand_total(), 450.0);
}

#[tokio::test]
async fn failed_service_calls_surface_in_the_store() {
    let (service, coordinator, _) = signed_in_coordinator().await;
    service.fail_next_record(RecordGatewayError::transport("connection reset"));

    let err = coordinator.fetch_items().await.expect_err("fetch fails");

    assert!(err.to_string().contains("connection reset"));
    assert_eq!(coordinator.items().status(), AsyncStatus::Failed);
    assert_eq!(coordinator.items().error(), Some(err.to_string()));
}

#[tokio::test]
async fn failed_resume_is_swallowed() {
    let service = Arc::new(InMemoryRemoteService::default());
    service.fail_next_auth(crate::domain::ports::AuthProviderError::transport(
        "connection refused",
    ));

    let coordinator = Coordinator::new(service);
    coordinator.start().await;

    assert!(coordinator.session().identity().is_none());
    assert_eq!(coordinator.session().status(), AsyncStatus::Idle);
}
