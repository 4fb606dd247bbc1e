use std::{fs, path::Path};

use anyhow::Context;
use article_client::{controller::DEFAULT_PAGE_ITEMS_LIMIT, presentation::DateLocale};
use serde::Deserialize;
use tracing::warn;

pub const CONFIG_FILE: &str = "reader.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub page_items_limit: u32,
    pub token: Option<String>,
    pub login_origin: Option<String>,
    pub date_locale: DateLocale,
    pub start_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api".into(),
            page_items_limit: DEFAULT_PAGE_ITEMS_LIMIT,
            token: None,
            login_origin: None,
            date_locale: DateLocale::default(),
            start_url: "http://localhost:4200/articles".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    api_url: Option<String>,
    page_items_limit: Option<u32>,
    token: Option<String>,
    login_origin: Option<String>,
    date_locale: Option<String>,
    start_url: Option<String>,
}

pub fn load_settings() -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = Path::new(CONFIG_FILE);
    if path.exists() {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid configuration in '{}'", path.display()))?;
    }

    apply_env(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileConfig = toml::from_str(raw)?;

    if let Some(v) = file_cfg.api_url {
        settings.api_url = v;
    }
    if let Some(v) = file_cfg.page_items_limit {
        settings.page_items_limit = v;
    }
    if let Some(v) = file_cfg.token {
        settings.token = Some(v);
    }
    if let Some(v) = file_cfg.login_origin {
        settings.login_origin = Some(v);
    }
    if let Some(v) = file_cfg.date_locale {
        settings.date_locale = v.parse().map_err(anyhow::Error::msg)?;
    }
    if let Some(v) = file_cfg.start_url {
        settings.start_url = v;
    }
    Ok(())
}

/// Later names win: `APP__*` overrides the bare variable.
fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("API_URL") {
        settings.api_url = v;
    }
    if let Some(v) = lookup("APP__API_URL") {
        settings.api_url = v;
    }

    if let Some(v) = lookup("READER_TOKEN") {
        settings.token = Some(v);
    }
    if let Some(v) = lookup("APP__TOKEN") {
        settings.token = Some(v);
    }

    if let Some(v) = lookup("APP__LOGIN_ORIGIN") {
        settings.login_origin = Some(v);
    }

    if let Some(v) = lookup("APP__PAGE_ITEMS_LIMIT") {
        match v.parse::<u32>() {
            Ok(parsed) => settings.page_items_limit = parsed,
            Err(_) => warn!(value = %v, "ignoring invalid APP__PAGE_ITEMS_LIMIT"),
        }
    }

    if let Some(v) = lookup("APP__DATE_LOCALE") {
        match v.parse::<DateLocale>() {
            Ok(parsed) => settings.date_locale = parsed,
            Err(err) => warn!(error = %err, "ignoring APP__DATE_LOCALE"),
        }
    }
}
