use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context};
use serde::Deserialize;
use url::Url;

pub const CONFIG_FILE: &str = "server.toml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Settings {
    pub server_bind: String,
    pub public_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:3000".into(),
            public_url: "https://hellobase.vercel.app".into(),
        }
    }
}

pub fn load_settings() -> Settings {
    load_settings_from(Path::new(CONFIG_FILE), |name| std::env::var(name).ok())
}

pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("bind_addr") {
                settings.server_bind = v.clone();
            }
            if let Some(v) = file_cfg.get("public_url") {
                settings.public_url = v.clone();
            }
        }
    }

    if let Some(v) = env("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("PUBLIC_URL") {
        settings.public_url = v;
    }
    if let Some(v) = env("APP__PUBLIC_URL") {
        settings.public_url = v;
    }

    settings
}

/// Public origin the metadata document points at, without a trailing slash.
pub fn prepare_public_url(raw_public_url: &str) -> anyhow::Result<String> {
    let raw_public_url = raw_public_url.trim();
    let parsed = Url::parse(raw_public_url)
        .with_context(|| format!("invalid public url '{raw_public_url}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("public url must use http or https, got '{raw_public_url}'");
    }
    Ok(raw_public_url.trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
