mod common;

use brutalmotors::fetch::{FetchFailure, VehicleDetailHook, VehicleListHook};
use brutalmotors::gateway::{CatalogScope, PersistenceGateway};

#[tokio::test]
async fn public_listing_hides_sold_vehicles() {
    let h = common::harness();

    let hook = VehicleListHook::mount(h.gateway.clone(), CatalogScope::Public).await;
    let state = hook.state();

    assert!(!state.is_loading);
    assert!(state.error.is_none());
    assert!(state.data.iter().all(|v| v.available));
    assert!(!state.data.iter().any(|v| v.make == "Porsche"));
}

#[tokio::test]
async fn public_listing_is_newest_first() {
    let h = common::harness();

    let hook = VehicleListHook::mount(h.gateway.clone(), CatalogScope::Public).await;
    let state = hook.state();
    let makes: Vec<&str> = state.data.iter().map(|v| v.make.as_str()).collect();

    assert_eq!(makes, ["Ferrari", "Lamborghini", "McLaren"]);
}

#[tokio::test]
async fn admin_scope_includes_every_record() {
    let h = common::harness();

    let hook = VehicleListHook::mount(h.gateway.clone(), CatalogScope::Admin).await;
    let state = hook.state();

    assert_eq!(state.data.len(), 4);
    assert!(state.data.iter().any(|v| v.make == "Porsche" && !v.available));
}

#[tokio::test]
async fn list_failure_keeps_previous_data() {
    let h = common::harness();
    let hook = VehicleListHook::mount(h.gateway.clone(), CatalogScope::Public).await;
    let before = hook.state().data;
    assert!(!before.is_empty());

    h.gateway.set_offline(true);
    hook.refetch().await;

    let state = hook.state();
    assert_eq!(
        state.error,
        Some(FetchFailure::Transport("Failed to fetch vehicles".into()))
    );
    // The last good listing stays on screen.
    assert_eq!(state.data, before);

    h.gateway.set_offline(false);
    hook.refetch().await;
    assert!(hook.state().error.is_none());
}

#[tokio::test]
async fn detail_hook_finds_a_vehicle_by_id() {
    let h = common::harness();
    let ferrari = h
        .gateway
        .list_vehicles(CatalogScope::Public)
        .await
        .unwrap()
        .into_iter()
        .find(|v| v.make == "Ferrari")
        .unwrap();

    let hook = VehicleDetailHook::mount(h.gateway.clone(), ferrari.id.as_str()).await;
    let state = hook.state();

    assert!(state.error.is_none());
    assert_eq!(state.data.unwrap().model, "488 GTB");
}

#[tokio::test]
async fn detail_hook_reports_missing_ids_distinctly() {
    let h = common::harness();

    let hook = VehicleDetailHook::mount(h.gateway.clone(), "no-such-id").await;
    let state = hook.state();

    assert_eq!(state.error, Some(FetchFailure::NotFound));
    assert!(state.data.is_none());
}

#[tokio::test]
async fn detail_hook_follows_a_retarget() {
    let h = common::harness();
    let vehicles = h.gateway.list_vehicles(CatalogScope::Public).await.unwrap();
    let ferrari = vehicles.iter().find(|v| v.make == "Ferrari").unwrap();
    let mclaren = vehicles.iter().find(|v| v.make == "McLaren").unwrap();

    let hook = VehicleDetailHook::mount(h.gateway.clone(), ferrari.id.as_str()).await;
    hook.retarget(mclaren.id.as_str()).await;

    assert_eq!(hook.state().data.unwrap().model, "720S");
}

#[tokio::test]
async fn detail_failure_keeps_the_vehicle_on_screen() {
    let h = common::harness();
    let ferrari = h
        .gateway
        .list_vehicles(CatalogScope::Public)
        .await
        .unwrap()
        .into_iter()
        .find(|v| v.make == "Ferrari")
        .unwrap();

    let hook = VehicleDetailHook::mount(h.gateway.clone(), ferrari.id.as_str()).await;
    h.gateway.set_offline(true);
    hook.refetch().await;

    let state = hook.state();
    assert_eq!(
        state.error,
        Some(FetchFailure::Transport("Failed to fetch vehicle".into()))
    );
    assert_eq!(state.data.map(|v| v.id), Some(ferrari.id));
}
