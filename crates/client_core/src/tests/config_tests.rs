use super::*;

use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn defaults_to_build_profile_url() {
    let config = resolve_client_config(None, env_from(&[])).expect("config");
    assert_eq!(config.base_url.as_str(), default_base_url());
    assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
}

#[test]
fn combine_endpoint_appends_route_once() {
    let plain = ClientConfig::new("http://localhost:5001/api", DEFAULT_REQUEST_TIMEOUT)
        .expect("config");
    assert_eq!(
        plain.combine_endpoint().as_str(),
        "http://localhost:5001/api/combine"
    );

    let trailing = ClientConfig::new("http://localhost:5001/api/", DEFAULT_REQUEST_TIMEOUT)
        .expect("config");
    assert_eq!(
        trailing.combine_endpoint().as_str(),
        "http://localhost:5001/api/combine"
    );

    let root = ClientConfig::new("http://localhost:5001", DEFAULT_REQUEST_TIMEOUT)
        .expect("config");
    assert_eq!(root.combine_endpoint().as_str(), "http://localhost:5001/combine");
}

#[test]
fn file_then_env_override_base_url() {
    let file = "base_url = \"http://files.local/api\"\nrequest_timeout_secs = 15\n";
    let from_file = resolve_client_config(Some(file), env_from(&[])).expect("config");
    assert_eq!(from_file.base_url.as_str(), "http://files.local/api");
    assert_eq!(from_file.request_timeout, Duration::from_secs(15));

    let from_env = resolve_client_config(
        Some(file),
        env_from(&[
            ("COMBINER_BASE_URL", "http://legacy.local/api"),
            ("APP__BASE_URL", "https://env.local/api"),
            ("APP__REQUEST_TIMEOUT_SECS", "30"),
        ]),
    )
    .expect("config");
    assert_eq!(from_env.base_url.as_str(), "https://env.local/api");
    assert_eq!(from_env.request_timeout, Duration::from_secs(30));
}

#[test]
fn ignores_blank_env_and_unreadable_file() {
    let config = resolve_client_config(
        Some("base_url = ["),
        env_from(&[("APP__BASE_URL", "  "), ("APP__REQUEST_TIMEOUT_SECS", "soon")]),
    )
    .expect("config");
    assert_eq!(config.base_url.as_str(), default_base_url());
    assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
}

#[test]
fn rejects_non_http_base_urls() {
    assert!(parse_base_url("ftp://example.com/api").is_err());
    assert!(parse_base_url("mailto:someone@example.com").is_err());
    assert!(parse_base_url("not a url").is_err());
    assert!(resolve_client_config(None, env_from(&[("APP__BASE_URL", "nope")])).is_err());
}

#[test]
fn with_base_url_replaces_only_the_url() {
    let config = ClientConfig::new(DEV_BASE_URL, Duration::from_secs(3))
        .expect("config")
        .with_base_url("https://override.local/api")
        .expect("override");
    assert_eq!(config.base_url.as_str(), "https://override.local/api");
    assert_eq!(config.request_timeout, Duration::from_secs(3));
}

#[test]
fn zero_timeout_is_ignored_at_every_layer() {
    let from_file =
        resolve_client_config(Some("request_timeout_secs = 0\n"), env_from(&[])).expect("config");
    assert_eq!(from_file.request_timeout, DEFAULT_REQUEST_TIMEOUT);

    let from_env = resolve_client_config(
        Some("request_timeout_secs = 15\n"),
        env_from(&[("APP__REQUEST_TIMEOUT_SECS", "0")]),
    )
    .expect("config");
    assert_eq!(from_env.request_timeout, Duration::from_secs(15));
}
