use std::{fs, time::Duration};

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use shared::protocol::COMBINE_ROUTE;
use url::Url;

pub const CONFIG_FILE: &str = "combiner.toml";
pub const DEV_BASE_URL: &str = "http://127.0.0.1:5001/api";
pub const PRODUCTION_BASE_URL: &str = "https://image-combiner.vercel.app/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Client settings resolved once at startup and handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: Url,
    pub request_timeout: Duration,
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    base_url: Option<String>,
    request_timeout_secs: Option<u64>,
}

impl ClientConfig {
    pub fn new(base_url: &str, request_timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            request_timeout,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        self.base_url = parse_base_url(base_url)?;
        Ok(self)
    }

    /// `{base_url}/combine`, tolerating a trailing slash on the base.
    pub fn combine_endpoint(&self) -> Url {
        let mut endpoint = self.base_url.clone();
        let path = format!("{}{COMBINE_ROUTE}", self.base_url.path().trim_end_matches('/'));
        endpoint.set_path(&path);
        endpoint
    }
}

/// Base URL for the build profile: the local dev server in debug builds, the
/// deployed service in release builds.
pub fn default_base_url() -> &'static str {
    if cfg!(debug_assertions) {
        DEV_BASE_URL
    } else {
        PRODUCTION_BASE_URL
    }
}

pub fn parse_base_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    let url = Url::parse(raw).with_context(|| format!("invalid backend base URL '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("backend base URL '{raw}' must use http or https");
    }
    if url.cannot_be_a_base() {
        bail!("backend base URL '{raw}' cannot carry a path");
    }
    Ok(url)
}

pub fn load_client_config() -> Result<ClientConfig> {
    let file_contents = fs::read_to_string(CONFIG_FILE).ok();
    resolve_client_config(file_contents.as_deref(), |name| std::env::var(name).ok())
}

/// Layers the build default, then `combiner.toml`, then environment variables.
/// A zero timeout would fail every request, so it is ignored at each layer.
pub fn resolve_client_config(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig> {
    let mut base_url = default_base_url().to_string();
    let mut request_timeout = DEFAULT_REQUEST_TIMEOUT;

    if let Some(raw) = file_contents {
        match toml::from_str::<FileConfig>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.base_url {
                    base_url = v;
                }
                match file_cfg.request_timeout_secs {
                    Some(0) => tracing::warn!("ignoring request_timeout_secs = 0 in {CONFIG_FILE}"),
                    Some(secs) => request_timeout = Duration::from_secs(secs),
                    None => {}
                }
            }
            Err(err) => tracing::warn!("ignoring unreadable {CONFIG_FILE}: {err}"),
        }
    }

    let non_empty = |name: &str| env(name).filter(|value| !value.trim().is_empty());
    if let Some(v) = non_empty("COMBINER_BASE_URL") {
        base_url = v;
    }
    if let Some(v) = non_empty("APP__BASE_URL") {
        base_url = v;
    }
    if let Some(v) = non_empty("APP__REQUEST_TIMEOUT_SECS") {
        match v.trim().parse::<u64>() {
            Ok(0) => tracing::warn!("ignoring APP__REQUEST_TIMEOUT_SECS=0"),
            Ok(secs) => request_timeout = Duration::from_secs(secs),
            Err(err) => tracing::warn!("ignoring APP__REQUEST_TIMEOUT_SECS={v}: {err}"),
        }
    }

    ClientConfig::new(&base_url, request_timeout)
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
