//! JSON renderings of session state and guard decisions for stdout.

#[cfg(test)]
#[path = "output_test.rs"]
mod output_test;

use coachhub::state::session::SessionState;
use coachhub::util::guard::{AccessPolicy, GuardDecision};
use serde_json::{Value, json};

pub fn describe_state(state: &SessionState) -> Value {
    match state {
        SessionState::Resolving => json!({ "state": "resolving" }),
        SessionState::Anonymous => json!({ "state": "anonymous" }),
        SessionState::Authenticated { user } => json!({ "state": "authenticated", "user": user }),
    }
}

pub fn describe_check(state: &SessionState, policy: &AccessPolicy) -> Value {
    let decision = policy.evaluate(state);
    let allowed: Vec<&str> = policy.roles().map(|role| role.as_str()).collect();
    let mut out = describe_state(state);
    out["allowed"] = json!(allowed);
    out["decision"] = json!(match decision {
        GuardDecision::Pending => "pending",
        GuardDecision::Render => "render",
        GuardDecision::Redirect(_) => "redirect",
    });
    if let Some(target) = decision.redirect() {
        out["redirect"] = json!(target.path());
    }
    out
}
