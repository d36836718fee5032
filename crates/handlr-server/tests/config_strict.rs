#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use handlr_core::HttpMethod;
use handlr_server::config::{self, AuthConfig, HandlerKind};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "0.0.0.0:8080"
handlers:
  - name: "ping"
    kind: ping
    path: "/ping"
    timeout_msec: 100 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "BAD_REQUEST");
}

#[test]
fn ok_minimal_config() {
    let ok = r#"
version: 1
handlers:
  - name: "ping"
    kind: ping
    path: "/ping"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:8080");
    assert_eq!(cfg.server.statistics_path, "/statistics");
    assert!(cfg.server.log_request);
    assert_eq!(cfg.handlers[0].kind, HandlerKind::Ping);
    assert!(cfg.handlers[0].methods.is_empty());
    assert!(cfg.handlers[0].auth.is_none());
}

#[test]
fn full_handler_config_parses() {
    let ok = r#"
version: 1
server:
  listen: "127.0.0.1:9000"
  log_request_headers: true
  max_body_bytes: 4096
handlers:
  - name: "echo"
    kind: echo
    path: "/echo"
    methods: [GET, POST]
    method_statistics: true
    timeout_ms: 2000
    auth:
      type: header-token
      header: authorization
      scheme: Bearer
      tokens: ["t1"]
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    let h = &cfg.handlers[0];
    assert_eq!(h.methods, vec![HttpMethod::Get, HttpMethod::Post]);
    assert_eq!(h.timeout_ms, Some(2000));
    match h.auth.as_ref().unwrap() {
        AuthConfig::HeaderToken { header, scheme, tokens } => {
            assert_eq!(header, "authorization");
            assert_eq!(scheme.as_deref(), Some("Bearer"));
            assert_eq!(tokens, &vec!["t1".to_string()]);
        }
    }
}

#[test]
fn unsupported_version_is_reported() {
    let bad = r#"
version: 2
handlers:
  - name: "ping"
    kind: ping
    path: "/ping"
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn duplicate_handler_names_fail() {
    let bad = r#"
version: 1
handlers:
  - { name: "a", kind: ping, path: "/a" }
  - { name: "a", kind: echo, path: "/b" }
"#;
    let err = config::load_from_str(bad).expect_err("must fail");
    assert!(err.to_string().contains("duplicate handler name"));
}

#[test]
fn reserved_and_colliding_paths_fail() {
    let reserved = r#"
version: 1
handlers:
  - { name: "a", kind: ping, path: "/healthz" }
"#;
    assert!(config::load_from_str(reserved).is_err());

    let collides = r#"
version: 1
handlers:
  - { name: "a", kind: ping, path: "/statistics" }
"#;
    let err = config::load_from_str(collides).expect_err("must fail");
    assert!(err.to_string().contains("statistics_path"));
}

#[test]
fn invalid_values_fail() {
    for bad in [
        "version: 1\nhandlers: []\n",
        "version: 1\nserver: { listen: \"nope\" }\nhandlers:\n  - { name: a, kind: ping, path: /a }\n",
        "version: 1\nhandlers:\n  - { name: a, kind: ping, path: a }\n",
        "version: 1\nhandlers:\n  - { name: a, kind: ping, path: /a, timeout_ms: 0 }\n",
        "version: 1\nhandlers:\n  - { name: a, kind: ping, path: /a, methods: [BREW] }\n",
        "version: 1\nhandlers:\n  - name: a\n    kind: ping\n    path: /a\n    auth: { type: header-token, header: x-key, tokens: [] }\n",
    ] {
        let err = config::load_from_str(bad).expect_err(bad);
        assert_eq!(err.client_code().as_str(), "BAD_REQUEST", "{bad}");
    }
}

#[test]
fn route_syntax_in_paths_fails() {
    for path in ["/files/*", "/files/*rest", "/users/:id", "/users/{id}", "/a//b", "/a?x=1"] {
        let yaml = format!("version: 1\nhandlers:\n  - {{ name: a, kind: ping, path: \"{path}\" }}\n");
        let err = config::load_from_str(&yaml).expect_err(path);
        assert!(err.to_string().contains("literal path"), "{path}: {err}");
    }
}
