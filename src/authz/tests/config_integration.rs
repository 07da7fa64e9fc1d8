//! Integration tests for declarative stack configuration

use scope_authz::{AccessGuard, AuthzError, Decision, StackConfig};
use std::io::Write;

const ROLES: &str = r#"{
    "layers": [
        {
            "name": "guest",
            "permissions": [
                { "scope": "glimpse:productions:*:read", "decision": true }
            ]
        },
        {
            "name": "user",
            "permissions": [
                { "scope": "glimpse:productions:*:write", "decision": "DENY" },
                { "scope": "glimpse:users:robere2:*", "decision": "ALLOW" }
            ]
        },
        {
            "name": "session",
            "permissions": [
                { "scope": "*", "decision": false }
            ]
        }
    ]
}"#;

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(ROLES.as_bytes()).unwrap();

    let config = StackConfig::from_path(file.path()).unwrap();
    let stack = config.build();

    assert_eq!(stack.len(), 3);
    assert_eq!(stack.evaluate("glimpse:productions:abc:read"), Decision::Allow);
    assert_eq!(stack.evaluate("glimpse:productions:abc:write"), Decision::Deny);
    assert_eq!(stack.evaluate("glimpse:users:robere2:email:read"), Decision::Allow);
    // Only the catch-all session layer has an opinion
    assert_eq!(stack.evaluate("glimpse:tags:Private"), Decision::Deny);
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = StackConfig::from_path(dir.path().join("missing.json"));
    assert!(matches!(result, Err(AuthzError::Io(_))));
}

#[test]
fn test_guard_from_config() {
    let config = StackConfig::from_json_str(ROLES).unwrap();
    let guard = AccessGuard::with_stack(config.build());

    assert!(guard.assert_formatted("glimpse:users:$1:name:write", &[&"robere2"]).is_ok());

    let err = guard
        .assert_formatted("glimpse:users:$1:name:write", &[&"daoj"])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Missing required permission for scope glimpse:users:daoj:name:write"
    );
}

#[test]
fn test_config_round_trips_through_serde() {
    let config = StackConfig::from_json_str(ROLES).unwrap();
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(StackConfig::from_json_str(&json).unwrap(), config);
}
