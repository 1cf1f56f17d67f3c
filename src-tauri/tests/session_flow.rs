mod common;

use cims_tauri::catalog::{EMPLOYEE_TYPE, EQUIPMENT_TYPE};
use cims_tauri::transport::{Method, RequestBody};
use cims_tauri::{Authenticator, ConsoleError, Navigation, UiEvent};
use common::{Harness, TOKEN};
use serde_json::json;
use time::macros::datetime;

fn authenticator(harness: &Harness) -> Authenticator {
    Authenticator::new(harness.client.clone(), harness.sessions.clone())
}

#[test]
fn login_stores_the_token_and_moves_to_page_redirection() {
    let harness = Harness::new();
    harness
        .transport
        .reply(Method::Post, "/auth/token", 200, "jwt-abc");
    harness.transport.reply(
        Method::Get,
        "/user/userAccount/pageRedirection",
        200,
        r#"{"userName":"alice","token":"jwt-abc"}"#,
    );
    let auth = authenticator(&harness);

    let navigation = auth.login(" alice ", "secret").expect("login");

    assert_eq!(navigation, Navigation::PageRedirection);
    assert_eq!(auth.path(&navigation), "/user/userAccount/pageRedirection");
    assert_eq!(harness.sessions.get("token").as_deref(), Some("jwt-abc"));
    let request = harness
        .transport
        .last_to(Method::Post, "/auth/token")
        .expect("token request");
    assert_eq!(
        request.body,
        RequestBody::Json(json!({
            "serviceName": "USER",
            "userName": "alice",
            "password": "secret"
        }))
    );
    assert_eq!(request.bearer, None);

    let landing = auth.page_redirection().expect("redirect");
    assert_eq!(auth.path(&landing), "/user/dashboard/alice/jwt-abc");
    assert_eq!(harness.sessions.get("user").as_deref(), Some("alice"));
    let redirect = harness
        .transport
        .last_to(Method::Get, "/user/userAccount/pageRedirection")
        .expect("redirect request");
    assert_eq!(redirect.bearer.as_deref(), Some("jwt-abc"));
}

#[test]
fn rejected_credentials_store_nothing() {
    let harness = Harness::new();
    harness
        .transport
        .reply(Method::Post, "/auth/token", 401, "");
    let auth = authenticator(&harness);

    let err = auth.login("alice", "wrong").expect_err("rejected");

    assert!(matches!(err, ConsoleError::InvalidCredentials));
    assert!(harness.sessions.is_empty());
}

#[test]
fn blank_credentials_never_reach_the_network() {
    let harness = Harness::new();
    let auth = authenticator(&harness);

    let err = auth.login("  ", "secret").expect_err("blank");

    assert!(matches!(err, ConsoleError::Input(_)));
    assert_eq!(harness.transport.count(), 0);
}

#[test]
fn internal_redirection_keeps_the_stored_token() {
    let harness = Harness::logged_in();
    harness.transport.reply(
        Method::Get,
        "/user/userAccount/pageRedirection",
        200,
        r#"{"userName":"alice","token":"fresh-token"}"#,
    );
    let auth = authenticator(&harness);

    let navigation = auth.internal_redirection("employee-salary").expect("redirect");

    assert_eq!(
        auth.path(&navigation),
        format!("/user/employee-salary/alice/{TOKEN}")
    );
}

#[test]
fn page_without_token_logs_out_before_loading_anything() {
    let harness = Harness::new();
    harness.sessions.set("user", "alice");
    let page = harness.page(&EMPLOYEE_TYPE);

    let err = page.open().expect_err("no session");

    assert!(matches!(err, ConsoleError::MissingSession));
    assert_eq!(harness.transport.count(), 0);
    assert!(harness.sessions.is_empty());
    assert_eq!(
        page.take_events(),
        vec![UiEvent::Navigate {
            path: "/user/login".to_string(),
        }]
    );
}

#[test]
fn expired_session_closes_the_page() {
    let harness = Harness::logged_in();
    harness
        .transport
        .get_ok("/equipment/equipmentType/getAll", json!([]));
    harness
        .sessions
        .set_expiry(datetime!(2026-03-01 10:00 UTC))
        .expect("expiry");
    let page = harness.page(&EQUIPMENT_TYPE);
    page.open().expect("open");

    assert!(!page.check_expiry(datetime!(2026-03-01 09:59 UTC)));
    assert!(page.check_expiry(datetime!(2026-03-01 10:01 UTC)));

    assert!(harness.sessions.is_empty());
    assert_eq!(
        page.take_events(),
        vec![UiEvent::Navigate {
            path: "/user/login".to_string(),
        }]
    );
    let before = harness.transport.count();
    assert!(page.reload_list().is_err());
    assert_eq!(harness.transport.count(), before);
}

#[test]
fn logout_clears_storage() {
    let harness = Harness::logged_in();
    harness.sessions.set("user", "alice");
    let auth = authenticator(&harness);

    let navigation = auth.logout();

    assert_eq!(auth.path(&navigation), "/user/login");
    assert!(harness.sessions.is_empty());
}
