mod common;

use std::time::Duration;

use brutalmotors::guard::{AdminGate, GateDecision, RedirectTarget};

#[tokio::test]
async fn gate_is_pending_until_bootstrap_resolves() {
    let h = common::harness();
    let mut gate = AdminGate::new(h.auth.subscribe());

    assert_eq!(gate.decision(), GateDecision::Pending);

    h.auth.bootstrap().await;
    assert_eq!(
        gate.decision(),
        GateDecision::Redirect(RedirectTarget::Login)
    );
}

#[tokio::test]
async fn gate_redirects_non_administrators_home() {
    let h = common::harness();
    h.auth.bootstrap().await;
    common::sign_in_user(&h).await;

    let mut gate = AdminGate::new(h.auth.subscribe());
    assert_eq!(gate.decision(), GateDecision::Redirect(RedirectTarget::Home));
}

#[tokio::test]
async fn gate_admits_a_signed_in_administrator() {
    let h = common::harness();
    h.auth.bootstrap().await;
    common::sign_in_admin(&h).await;

    let mut gate = AdminGate::new(h.auth.subscribe());
    assert_eq!(gate.decision(), GateDecision::Grant);
}

#[tokio::test]
async fn gate_re_gates_when_the_admin_signs_out() {
    let h = common::harness();
    h.auth.bootstrap().await;
    common::sign_in_admin(&h).await;

    let mut gate = AdminGate::new(h.auth.subscribe());
    assert_eq!(gate.decision(), GateDecision::Grant);

    h.auth.logout();
    let next = tokio::time::timeout(Duration::from_secs(1), gate.changed())
        .await
        .expect("gate saw no transition");
    assert_eq!(next, Some(GateDecision::Redirect(RedirectTarget::Login)));
}

#[tokio::test]
async fn gate_opens_when_an_admin_logs_in() {
    let h = common::harness();
    h.auth.bootstrap().await;

    let mut gate = AdminGate::new(h.auth.subscribe());
    assert_eq!(
        gate.decision(),
        GateDecision::Redirect(RedirectTarget::Login)
    );

    common::sign_in_admin(&h).await;
    let next = tokio::time::timeout(Duration::from_secs(1), gate.changed())
        .await
        .expect("gate saw no transition");
    assert_eq!(next, Some(GateDecision::Grant));
}
