use super::*;
use crate::test_helpers::{captain, customer};

fn grace(ms: u64) -> GuardOptions {
    GuardOptions::default().with_policy(RedirectPolicy::AfterGrace(Duration::from_millis(ms)))
}

#[test]
fn should_redirect_unauth_when_resolved_without_user() {
    assert!(should_redirect_unauth(&AuthState::Unauthenticated));
}

#[test]
fn should_not_redirect_while_loading() {
    assert!(!should_redirect_unauth(&AuthState::Initializing));
}

#[test]
fn should_not_redirect_when_user_exists() {
    assert!(!should_redirect_unauth(&AuthState::Authenticated(customer())));
}

#[test]
fn initializing_never_renders_children() {
    let options = [GuardOptions::default(), grace(2000), GuardOptions::default().require_role(UserRole::Captain)];
    for opts in &options {
        for ms in [0, 1, 500, 1999, 2000, 60_000, u64::from(u32::MAX)] {
            assert_eq!(guard_view(&AuthState::Initializing, opts, Duration::from_millis(ms)), GuardView::Loading);
        }
    }
}

#[test]
fn authenticated_renders() {
    let view = guard_view(&AuthState::Authenticated(customer()), &GuardOptions::default(), Duration::ZERO);
    assert_eq!(view, GuardView::Render);
    assert_eq!(view.redirect_target(), None);
}

#[test]
fn immediate_policy_redirects_at_once() {
    let view = guard_view(&AuthState::Unauthenticated, &GuardOptions::default(), Duration::ZERO);
    assert_eq!(view, GuardView::Redirect { to: "/signin".to_owned() });
    assert_eq!(view.redirect_target(), Some("/signin"));
}

#[test]
fn grace_policy_shows_notice_then_redirects() {
    let opts = grace(1500);
    assert_eq!(
        guard_view(&AuthState::Unauthenticated, &opts, Duration::ZERO),
        GuardView::Notice { remaining: Duration::from_millis(1500), to: "/signin".to_owned() }
    );
    assert_eq!(
        guard_view(&AuthState::Unauthenticated, &opts, Duration::from_millis(1000)),
        GuardView::Notice { remaining: Duration::from_millis(500), to: "/signin".to_owned() }
    );
    assert_eq!(
        guard_view(&AuthState::Unauthenticated, &opts, Duration::from_millis(1500)),
        GuardView::Redirect { to: "/signin".to_owned() }
    );
    assert_eq!(
        guard_view(&AuthState::Unauthenticated, &opts, Duration::from_secs(10)),
        GuardView::Redirect { to: "/signin".to_owned() }
    );
}

#[test]
fn decision_is_deterministic() {
    let opts = grace(800);
    let elapsed = Duration::from_millis(300);
    let first = guard_view(&AuthState::Unauthenticated, &opts, elapsed);
    for _ in 0..10 {
        assert_eq!(guard_view(&AuthState::Unauthenticated, &opts, elapsed), first);
    }
}

#[test]
fn captain_view_redirects_customers() {
    let opts = GuardOptions::default().require_role(UserRole::Captain);
    assert_eq!(
        guard_view(&AuthState::Authenticated(customer()), &opts, Duration::ZERO),
        GuardView::Redirect { to: "/".to_owned() }
    );
    assert_eq!(guard_view(&AuthState::Authenticated(captain()), &opts, Duration::ZERO), GuardView::Render);
}

#[test]
fn captain_view_sends_visitors_to_sign_in() {
    let opts = GuardOptions { sign_in_path: "/captain/login".to_owned(), ..GuardOptions::default() }
        .require_role(UserRole::Captain);
    assert_eq!(
        guard_view(&AuthState::Unauthenticated, &opts, Duration::ZERO),
        GuardView::Redirect { to: "/captain/login".to_owned() }
    );
}
