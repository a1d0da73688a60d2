#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use metersnap_server::config::{self, VisionProvider};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
server:
  listen: "0.0.0.0:3000"
vision:
  provider: gemini
  gemini:
    modle: "gemini-1.5-flash" # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.client_code().as_str(), "INVALID_DATA");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.server.listen, "0.0.0.0:3000");
    assert_eq!(cfg.vision.provider, VisionProvider::Stub);
    assert_eq!(cfg.vision.timeout_ms, 15000);
}

#[test]
fn full_config_round_trips_values() {
    let ok = r#"
version: 1
server:
  listen: "127.0.0.1:8088"
  public_base_url: "https://meters.example.org"
  max_body_bytes: 2097152
vision:
  provider: gemini
  timeout_ms: 5000
  gemini:
    model: "gemini-1.5-pro"
    api_key_env: "MY_KEY"
  stub:
    value: 7.5
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    assert_eq!(cfg.server.listen_addr().unwrap().port(), 8088);
    assert_eq!(cfg.vision.provider, VisionProvider::Gemini);
    assert_eq!(cfg.vision.gemini.model, "gemini-1.5-pro");
    assert_eq!(cfg.vision.gemini.api_key_env, "MY_KEY");
    assert!(cfg.vision.gemini.endpoint.starts_with("https://"));
    assert_eq!(cfg.vision.stub.value, 7.5);
}

#[test]
fn rejects_out_of_range_values() {
    for bad in [
        "version: 2\n",
        "version: 1\nserver:\n  listen: \"not-an-addr\"\n",
        "version: 1\nserver:\n  public_base_url: \"ftp://x\"\n",
        "version: 1\nvision:\n  timeout_ms: 10\n",
        "version: 1\nvision:\n  provider: ocr\n",
    ] {
        assert!(config::load_from_str(bad).is_err(), "should reject: {bad}");
    }
}

#[test]
fn port_override_keeps_host() {
    let mut cfg = config::load_from_str("version: 1\nserver:\n  listen: \"127.0.0.1:3000\"\n").unwrap();
    cfg.server.override_port("4100").unwrap();
    assert_eq!(cfg.server.listen, "127.0.0.1:4100");
    assert!(cfg.server.override_port("http").is_err());
}
