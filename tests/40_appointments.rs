mod common;

use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};

use brutalmotors::fetch::{AppointmentsHook, FetchFailure};
use brutalmotors::gateway::{CatalogScope, GatewayError, PersistenceGateway};
use brutalmotors::models::{AppointmentStatus, BookingRequest, Vehicle};

async fn first_vehicle(h: &common::Harness) -> Vehicle {
    h.gateway
        .list_vehicles(CatalogScope::Public)
        .await
        .unwrap()
        .into_iter()
        .next()
        .unwrap()
}

fn booking(vehicle_id: &str) -> BookingRequest {
    BookingRequest {
        vehicle_id: vehicle_id.to_string(),
        date: NaiveDate::from_ymd_opt(2026, 9, 15).unwrap(),
        time: NaiveTime::from_hms_opt(14, 30, 0).unwrap(),
        notes: "First test drive".into(),
    }
}

/// Poll until the watcher task has caught up with an auth transition.
async fn wait_until(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("hook did not settle in time");
}

#[tokio::test]
async fn signed_out_hook_issues_no_requests() {
    let h = common::harness();
    h.auth.bootstrap().await;

    let hook = AppointmentsHook::mount(h.gateway.clone(), h.auth.subscribe()).await;

    assert_eq!(h.gateway.counters().appointment_reads, 0);
    let state = hook.state();
    assert!(state.data.is_empty());
    assert!(state.error.is_none());

    // Booking while signed out is refused without a request.
    let vehicle = first_vehicle(&h).await;
    assert!(!hook.book(booking(&vehicle.id)).await);
}

#[tokio::test]
async fn sign_in_triggers_exactly_one_scoped_fetch() {
    let h = common::harness();
    h.auth.bootstrap().await;
    let hook = AppointmentsHook::mount(h.gateway.clone(), h.auth.subscribe()).await;

    common::sign_in_user(&h).await;
    wait_until(|| h.gateway.counters().appointment_reads == 1).await;

    let state = hook.state();
    assert!(state.data.is_empty());
    assert!(state.error.is_none());
    assert_eq!(h.gateway.counters().appointment_reads, 1);
}

#[tokio::test]
async fn booking_creates_a_pending_appointment() {
    let h = common::harness();
    h.auth.bootstrap().await;
    common::sign_in_user(&h).await;

    let hook = AppointmentsHook::mount(h.gateway.clone(), h.auth.subscribe()).await;
    let vehicle = first_vehicle(&h).await;
    assert!(hook.book(booking(&vehicle.id)).await);

    hook.refetch().await;
    let state = hook.state();
    assert_eq!(state.data.len(), 1);

    let appointment = &state.data[0];
    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.vehicle_id, vehicle.id);
    assert_eq!(appointment.user_id, h.auth.identity().unwrap().id);
    assert_eq!(appointment.notes, "First test drive");
}

#[tokio::test]
async fn booking_an_unknown_vehicle_fails() {
    let h = common::harness();
    h.auth.bootstrap().await;
    common::sign_in_user(&h).await;

    let hook = AppointmentsHook::mount(h.gateway.clone(), h.auth.subscribe()).await;
    assert!(!hook.book(booking("no-such-vehicle")).await);

    assert_eq!(
        hook.state().error,
        Some(FetchFailure::Transport(
            "Failed to create appointment".into()
        ))
    );
}

#[tokio::test]
async fn sign_out_resets_the_hook_without_a_request() {
    let h = common::harness();
    h.auth.bootstrap().await;
    common::sign_in_user(&h).await;

    let hook = AppointmentsHook::mount(h.gateway.clone(), h.auth.subscribe()).await;
    let vehicle = first_vehicle(&h).await;
    assert!(hook.book(booking(&vehicle.id)).await);
    hook.refetch().await;
    assert_eq!(hook.state().data.len(), 1);

    let reads_before = h.gateway.counters().appointment_reads;
    h.auth.logout();
    wait_until(|| hook.state().data.is_empty()).await;

    assert_eq!(h.gateway.counters().appointment_reads, reads_before);
    assert!(hook.state().error.is_none());
}

#[tokio::test]
async fn appointments_are_ordered_by_date_then_time() {
    let h = common::harness();
    h.auth.bootstrap().await;
    common::sign_in_user(&h).await;
    let user_id = h.auth.identity().unwrap().id;
    let vehicle = first_vehicle(&h).await;

    let later = NaiveDate::from_ymd_opt(2026, 10, 1).unwrap();
    let sooner = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
    for date in [later, sooner] {
        h.gateway
            .create_appointment(&user_id, &vehicle.id, date, noon, "")
            .await
            .unwrap();
    }

    let listed = h.gateway.list_appointments(&user_id).await.unwrap();
    assert_eq!(listed[0].date, sooner);
    assert_eq!(listed[1].date, later);
}

#[tokio::test]
async fn status_follows_the_lifecycle_table() {
    let h = common::harness();
    let vehicle = first_vehicle(&h).await;
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
    let appointment = h
        .gateway
        .create_appointment(
            "2",
            &vehicle.id,
            NaiveDate::from_ymd_opt(2026, 9, 20).unwrap(),
            noon,
            "",
        )
        .await
        .unwrap();

    // Pending cannot complete outright.
    let skipped = h
        .gateway
        .set_appointment_status(&appointment.id, AppointmentStatus::Completed)
        .await;
    assert!(matches!(skipped, Err(GatewayError::Conflict(_))));

    let confirmed = h
        .gateway
        .set_appointment_status(&appointment.id, AppointmentStatus::Confirmed)
        .await
        .unwrap();
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);

    let completed = h
        .gateway
        .set_appointment_status(&appointment.id, AppointmentStatus::Completed)
        .await
        .unwrap();
    assert_eq!(completed.status, AppointmentStatus::Completed);

    // Completed is terminal.
    let reopened = h
        .gateway
        .set_appointment_status(&appointment.id, AppointmentStatus::Pending)
        .await;
    assert!(matches!(reopened, Err(GatewayError::Conflict(_))));
}

#[tokio::test]
async fn vehicles_with_bookings_cannot_be_deleted() {
    let h = common::harness();
    let vehicle = first_vehicle(&h).await;
    h.gateway
        .create_appointment(
            "2",
            &vehicle.id,
            NaiveDate::from_ymd_opt(2026, 9, 20).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            "",
        )
        .await
        .unwrap();

    let refused = h.gateway.delete_vehicle(&vehicle.id).await;
    assert!(matches!(refused, Err(GatewayError::Conflict(_))));

    // A vehicle nobody booked deletes fine.
    let other = h
        .gateway
        .list_vehicles(CatalogScope::Public)
        .await
        .unwrap()
        .into_iter()
        .find(|v| v.id != vehicle.id)
        .unwrap();
    h.gateway.delete_vehicle(&other.id).await.unwrap();
}

#[tokio::test]
async fn back_office_sees_every_users_bookings() {
    let h = common::harness();
    let vehicle = first_vehicle(&h).await;
    let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
    let date = NaiveDate::from_ymd_opt(2026, 9, 25).unwrap();

    for user_id in ["1", "2"] {
        h.gateway
            .create_appointment(user_id, &vehicle.id, date, noon, "")
            .await
            .unwrap();
    }

    let all = h.gateway.list_all_appointments().await.unwrap();
    assert_eq!(all.len(), 2);

    // The per-user view stays scoped.
    let scoped = h.gateway.list_appointments("2").await.unwrap();
    assert_eq!(scoped.len(), 1);
}
