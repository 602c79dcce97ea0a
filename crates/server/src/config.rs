use std::{fs, path::PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: String,
    pub server_public_url: Option<String>,
    pub output_dir: PathBuf,
    pub max_upload_bytes: usize,
    /// Request directories kept under `output_dir`; older ones are swept.
    pub retained_requests: usize,
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    public_url: Option<String>,
    output_dir: Option<PathBuf>,
    max_upload_bytes: Option<usize>,
    retained_requests: Option<usize>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:5001".into(),
            server_public_url: None,
            output_dir: PathBuf::from("output"),
            max_upload_bytes: 32 * 1024 * 1024,
            retained_requests: 20,
        }
    }
}

impl Settings {
    /// Origin used to build result URLs handed back to clients.
    pub fn public_url(&self) -> String {
        match self.server_public_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => format!("http://{}", self.server_bind),
        }
    }
}

pub fn load_settings() -> Settings {
    let file_contents = fs::read_to_string("server.toml").ok();
    resolve_settings(file_contents.as_deref(), |name| std::env::var(name).ok())
}

pub fn resolve_settings(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file_contents {
        match toml::from_str::<FileSettings>(raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.bind_addr {
                    settings.server_bind = v;
                }
                if let Some(v) = file_cfg.public_url {
                    settings.server_public_url = Some(v);
                }
                if let Some(v) = file_cfg.output_dir {
                    settings.output_dir = v;
                }
                if let Some(v) = file_cfg.max_upload_bytes {
                    settings.max_upload_bytes = v;
                }
                if let Some(v) = file_cfg.retained_requests {
                    settings.retained_requests = v;
                }
            }
            Err(err) => tracing::warn!("ignoring unreadable server.toml: {err}"),
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("SERVER_PUBLIC_URL") {
        settings.server_public_url = Some(v);
    }
    if let Some(v) = env("APP__PUBLIC_URL") {
        settings.server_public_url = Some(v);
    }

    if let Some(v) = env("APP__OUTPUT_DIR") {
        settings.output_dir = PathBuf::from(v);
    }

    if let Some(v) = env("APP__MAX_UPLOAD_BYTES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_upload_bytes = parsed;
        }
    }

    if let Some(v) = env("APP__RETAINED_REQUESTS") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.retained_requests = parsed;
        }
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
