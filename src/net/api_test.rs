use super::*;

#[test]
fn endpoint_joins_base_and_path() {
    assert_eq!(endpoint("https://api.tiffin.test/v1", ME_PATH), "https://api.tiffin.test/v1/auth/me");
}

#[test]
fn resolve_base_url_trims_trailing_slash() {
    assert_eq!(resolve_base_url("https://api.tiffin.test/v1/"), "https://api.tiffin.test/v1");
    assert_eq!(resolve_base_url("/api/"), "/api");
}

#[test]
fn check_status_accepts_success_range() {
    assert!(check_status(200, "").is_ok());
    assert!(check_status(204, "").is_ok());
}

#[test]
fn check_status_maps_auth_failures() {
    assert_eq!(check_status(401, ""), Err(AuthError::Unauthorized { status: 401 }));
    assert_eq!(check_status(403, ""), Err(AuthError::Unauthorized { status: 403 }));
}

#[test]
fn check_status_keeps_body_for_other_failures() {
    assert_eq!(
        check_status(503, "maintenance"),
        Err(AuthError::Api { status: 503, body: "maintenance".to_owned() })
    );
}

#[test]
fn check_refresh_status_reports_dead_refresh_token() {
    for status in [400, 401, 403] {
        assert_eq!(check_refresh_status(status, ""), Err(AuthError::RefreshFailed));
    }
    assert!(matches!(check_refresh_status(500, ""), Err(AuthError::Api { status: 500, .. })));
    assert!(check_refresh_status(200, "").is_ok());
}

#[test]
fn parse_user_reads_profile() {
    let user = parse_user(r#"{"id":"u1","name":"Asha","email":"asha@example.com"}"#).unwrap();
    assert_eq!(user.id, "u1");
    assert_eq!(user.email.as_deref(), Some("asha@example.com"));
}

#[test]
fn parse_user_rejects_garbage() {
    assert!(matches!(parse_user("<html>"), Err(AuthError::Parse(_))));
}

#[test]
fn parse_refresh_grant_rejects_empty_access_token() {
    assert!(matches!(parse_refresh_grant(r#"{"access_token":""}"#), Err(AuthError::Parse(_))));
    assert_eq!(parse_refresh_grant(r#"{"access_token":"a2"}"#).unwrap().access_token, "a2");
}

#[test]
fn http_auth_api_builds_from_default_config() {
    let api = HttpAuthApi::new(&SessionConfig::default()).unwrap();
    assert_eq!(api.endpoint(LOGOUT_PATH), "/api/auth/logout");
}
