use coachhub::net::types::{Role, User};

use super::*;

fn coach() -> User {
    User {
        id: 2,
        first_name: "Grace".to_owned(),
        last_name: "Hopper".to_owned(),
        email: "grace@example.com".to_owned(),
        role: Role::Coach,
    }
}

#[test]
fn describe_state_includes_user_when_authenticated() {
    let value = describe_state(&SessionState::Authenticated { user: coach() });
    assert_eq!(value["state"], "authenticated");
    assert_eq!(value["user"]["firstName"], "Grace");
    assert_eq!(value["user"]["role"], "coach");
}

#[test]
fn describe_state_anonymous_has_no_user() {
    let value = describe_state(&SessionState::Anonymous);
    assert_eq!(value, json!({ "state": "anonymous" }));
}

#[test]
fn describe_check_renders_for_allowed_role() {
    let value = describe_check(
        &SessionState::Authenticated { user: coach() },
        &AccessPolicy::only([Role::Coach, Role::Admin]),
    );
    assert_eq!(value["decision"], "render");
    assert_eq!(value["allowed"], json!(["coach", "admin"]));
    assert!(value.get("redirect").is_none());
}

#[test]
fn describe_check_reports_redirect_target() {
    let value = describe_check(&SessionState::Authenticated { user: coach() }, &AccessPolicy::from(Role::Admin));
    assert_eq!(value["decision"], "redirect");
    assert_eq!(value["redirect"], "/unauthorized");

    let value = describe_check(&SessionState::Anonymous, &AccessPolicy::default());
    assert_eq!(value["redirect"], "/login");
}
