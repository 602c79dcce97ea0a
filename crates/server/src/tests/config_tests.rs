use super::{resolve_settings, Settings};

use std::{collections::HashMap, path::PathBuf};

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn defaults_match_local_dev_server() {
    let settings = resolve_settings(None, env_from(&[]));
    assert_eq!(settings.server_bind, "127.0.0.1:5001");
    assert_eq!(settings.public_url(), "http://127.0.0.1:5001");
    assert_eq!(settings.output_dir, PathBuf::from("output"));
}

#[test]
fn file_values_are_overridden_by_env() {
    let file = "bind_addr = \"0.0.0.0:8080\"\npublic_url = \"https://files.example\"\noutput_dir = \"/srv/out\"\n";
    let from_file = resolve_settings(Some(file), env_from(&[]));
    assert_eq!(from_file.server_bind, "0.0.0.0:8080");
    assert_eq!(from_file.public_url(), "https://files.example");
    assert_eq!(from_file.output_dir, PathBuf::from("/srv/out"));

    let from_env = resolve_settings(
        Some(file),
        env_from(&[
            ("APP__BIND_ADDR", "127.0.0.1:9000"),
            ("APP__PUBLIC_URL", "https://combiner.example/"),
            ("APP__OUTPUT_DIR", "results"),
            ("APP__MAX_UPLOAD_BYTES", "1024"),
        ]),
    );
    assert_eq!(from_env.server_bind, "127.0.0.1:9000");
    assert_eq!(from_env.public_url(), "https://combiner.example");
    assert_eq!(from_env.output_dir, PathBuf::from("results"));
    assert_eq!(from_env.max_upload_bytes, 1024);
}

#[test]
fn blank_public_url_falls_back_to_bind_address() {
    let settings = Settings {
        server_public_url: Some("   ".into()),
        ..Settings::default()
    };
    assert_eq!(settings.public_url(), "http://127.0.0.1:5001");
}

#[test]
fn file_accepts_integer_limits() {
    let file = "bind_addr = \"0.0.0.0:8080\"\nmax_upload_bytes = 1024\nretained_requests = 3\n";
    let settings = resolve_settings(Some(file), env_from(&[]));
    assert_eq!(settings.server_bind, "0.0.0.0:8080");
    assert_eq!(settings.max_upload_bytes, 1024);
    assert_eq!(settings.retained_requests, 3);
}

#[test]
fn unreadable_file_keeps_defaults() {
    let settings = resolve_settings(Some("bind_addr = [1, 2]"), env_from(&[]));
    assert_eq!(settings.server_bind, Settings::default().server_bind);
    assert_eq!(settings.retained_requests, 20);
}
