//! Client settings: grading service base URL and the identity provider
//! client id. Defaults, then an optional `portal.toml`, then environment
//! overrides, last writer wins.

use std::{collections::HashMap, fs};

#[derive(Debug, Clone)]
pub struct Settings {
    pub api_base: String,
    pub identity_client_id: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:8000/api".into(),
            identity_client_id: String::new(),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("portal.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("api_base") {
                settings.api_base = v.clone();
            }
            if let Some(v) = file_cfg.get("identity_client_id") {
                settings.identity_client_id = v.clone();
            }
        }
    }

    if let Ok(v) = std::env::var("PORTAL_API_BASE") {
        settings.api_base = v;
    }
    if let Ok(v) = std::env::var("APP__API_BASE") {
        settings.api_base = v;
    }

    if let Ok(v) = std::env::var("GOOGLE_CLIENT_ID") {
        settings.identity_client_id = v;
    }
    if let Ok(v) = std::env::var("APP__IDENTITY_CLIENT_ID") {
        settings.identity_client_id = v;
    }

    settings.api_base = normalize_api_base(&settings.api_base);
    settings
}

/// Trims whitespace and trailing slashes; an empty value falls back to
/// the default so a blank env var cannot produce relative request URLs.
pub fn normalize_api_base(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Settings::default().api_base;
    }
    trimmed.to_string()
}
