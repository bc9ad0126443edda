use super::*;
use crate::test_helpers::{captain, customer};

#[test]
fn default_state_is_initializing() {
    let state = AuthState::default();
    assert!(state.is_loading());
    assert!(!state.is_authenticated());
    assert!(state.user().is_none());
}

#[test]
fn authenticated_exposes_user() {
    let state = AuthState::Authenticated(customer());
    assert!(state.is_authenticated());
    assert!(!state.is_loading());
    assert_eq!(state.user(), Some(&customer()));
}

#[test]
fn unauthenticated_has_no_user() {
    let state = AuthState::Unauthenticated;
    assert!(!state.is_authenticated());
    assert!(!state.is_loading());
    assert!(state.user().is_none());
}

#[test]
fn has_role_matches_user_role() {
    assert!(AuthState::Authenticated(captain()).has_role(UserRole::Captain));
    assert!(!AuthState::Authenticated(customer()).has_role(UserRole::Captain));
    assert!(!AuthState::Unauthenticated.has_role(UserRole::Customer));
}

#[test]
fn labels() {
    assert_eq!(AuthState::Initializing.label(), "initializing");
    assert_eq!(AuthState::Authenticated(customer()).label(), "authenticated");
    assert_eq!(AuthState::Unauthenticated.label(), "unauthenticated");
}
