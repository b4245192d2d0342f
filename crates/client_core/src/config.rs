use std::{fs, path::Path, time::Duration};

use anyhow::{anyhow, bail, Context};
use serde::{Deserialize, Serialize};
use shared::domain::{ActionKind, Address, NetworkId, Wei};
use tracing::warn;
use url::Url;

use crate::actions::{ActionRequest, ActionTarget};

pub const CONFIG_FILE: &str = "miniapp.toml";
pub const ENV_PREFIX: &str = "APP__";

/// Raw client settings as read from `miniapp.toml` and `APP__*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub canonical_url: String,
    pub settle_delay_ms: u64,
    pub mint_network_id: u64,
    pub mint_contract: Option<String>,
    pub mint_function: String,
    pub mint_explorer_url: String,
    pub mint_cast_template: String,
    pub donate_network_id: u64,
    pub donate_recipient: Option<String>,
    pub donate_amount_eth: String,
    pub donate_explorer_url: String,
    pub donate_cast_template: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canonical_url: "https://hellobase.vercel.app/".into(),
            settle_delay_ms: 0,
            mint_network_id: NetworkId::BASE_SEPOLIA.0,
            mint_contract: None,
            mint_function: "mint".into(),
            mint_explorer_url: "https://sepolia.basescan.org".into(),
            mint_cast_template:
                "I just minted the HelloBase Early Supporter NFT on Base! {tx_url}".into(),
            donate_network_id: NetworkId::BASE.0,
            donate_recipient: None,
            donate_amount_eth: "0.0001".into(),
            donate_explorer_url: "https://basescan.org".into(),
            donate_cast_template: "I just sent a donation to HelloBase on Base! {tx_url}".into(),
        }
    }
}

const SETTING_KEYS: [&str; 12] = [
    "canonical_url",
    "settle_delay_ms",
    "mint_network_id",
    "mint_contract",
    "mint_function",
    "mint_explorer_url",
    "mint_cast_template",
    "donate_network_id",
    "donate_recipient",
    "donate_amount_eth",
    "donate_explorer_url",
    "donate_cast_template",
];

impl Settings {
    fn apply(&mut self, key: &str, value: String) {
        let value = value.trim().to_string();
        match key {
            "canonical_url" => self.canonical_url = value,
            "settle_delay_ms" => parse_into(key, &value, &mut self.settle_delay_ms),
            "mint_network_id" => parse_into(key, &value, &mut self.mint_network_id),
            "mint_contract" => self.mint_contract = Some(value),
            "mint_function" => self.mint_function = value,
            "mint_explorer_url" => self.mint_explorer_url = value,
            "mint_cast_template" => self.mint_cast_template = value,
            "donate_network_id" => parse_into(key, &value, &mut self.donate_network_id),
            "donate_recipient" => self.donate_recipient = Some(value),
            "donate_amount_eth" => self.donate_amount_eth = value,
            "donate_explorer_url" => self.donate_explorer_url = value,
            "donate_cast_template" => self.donate_cast_template = value,
            other => warn!("config: ignoring unknown setting key={other}"),
        }
    }
}

fn parse_into(key: &str, raw: &str, slot: &mut u64) {
    match raw.parse::<u64>() {
        Ok(parsed) => *slot = parsed,
        Err(err) => warn!("config: ignoring invalid value for {key}={raw}: {err}"),
    }
}

/// Defaults, then `miniapp.toml` in the working directory, then `APP__*` variables.
pub fn load_settings() -> Settings {
    load_settings_from(Path::new(CONFIG_FILE), |name| std::env::var(name).ok())
}

pub fn load_settings_from(path: &Path, env: impl Fn(&str) -> Option<String>) -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match raw.parse::<toml::Table>() {
            Ok(table) => {
                for (key, value) in table {
                    let value = match value {
                        toml::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    settings.apply(&key, value);
                }
            }
            Err(err) => warn!("config: ignoring unreadable {}: {err}", path.display()),
        }
    }

    for key in SETTING_KEYS {
        let name = format!("{ENV_PREFIX}{}", key.to_ascii_uppercase());
        if let Some(value) = env(&name) {
            settings.apply(key, value);
        }
    }

    settings
}

/// Validated client configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MiniAppConfig {
    pub canonical_url: String,
    pub settle_delay: Duration,
    pub mint: ActionTarget,
    pub donate: ActionTarget,
}

impl MiniAppConfig {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_settings(&load_settings())
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let canonical_url = validate_http_url("canonical_url", &settings.canonical_url)?;

        let mint_contract: Address = required("mint_contract", settings.mint_contract.as_deref())?
            .parse()
            .context("invalid mint_contract")?;
        if settings.mint_function.trim().is_empty() {
            bail!("mint_function must not be empty");
        }
        let mint = ActionTarget {
            kind: ActionKind::Mint,
            network_id: NetworkId(settings.mint_network_id),
            request: ActionRequest::contract_call(mint_contract, settings.mint_function.trim()),
            explorer_url: validate_http_url("mint_explorer_url", &settings.mint_explorer_url)?,
            cast_template: settings.mint_cast_template.clone(),
        };

        let donate_recipient: Address =
            required("donate_recipient", settings.donate_recipient.as_deref())?
                .parse()
                .context("invalid donate_recipient")?;
        let donate_amount =
            Wei::parse_ether(&settings.donate_amount_eth).context("invalid donate_amount_eth")?;
        if donate_amount == Wei(0) {
            bail!("donate_amount_eth must be greater than zero");
        }
        let donate = ActionTarget {
            kind: ActionKind::Donate,
            network_id: NetworkId(settings.donate_network_id),
            request: ActionRequest::transfer(donate_recipient, donate_amount),
            explorer_url: validate_http_url("donate_explorer_url", &settings.donate_explorer_url)?,
            cast_template: settings.donate_cast_template.clone(),
        };

        Ok(Self {
            canonical_url,
            settle_delay: Duration::from_millis(settings.settle_delay_ms),
            mint,
            donate,
        })
    }

    pub fn target(&self, kind: ActionKind) -> &ActionTarget {
        match kind {
            ActionKind::Mint => &self.mint,
            ActionKind::Donate => &self.donate,
        }
    }
}

fn required<'a>(key: &str, value: Option<&'a str>) -> anyhow::Result<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| {
            anyhow!(
                "{key} is not configured (set it in {CONFIG_FILE} or {ENV_PREFIX}{})",
                key.to_ascii_uppercase()
            )
        })
}

/// Validates without normalizing: embeds are matched against the configured string verbatim.
fn validate_http_url(key: &str, raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    let parsed = Url::parse(raw).with_context(|| format!("invalid {key} '{raw}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("{key} must be an http(s) url, got '{raw}'");
    }
    Ok(raw.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
