//! Environment resolver.
//!
//! Derives the backend URL and debug flag from the page's hostname. An
//! override saved in `localStorage` under `kairos:config` wins.

use kairos_types::{
    KioskError, Result,
    config::{BACKEND_PORT, KioskConfig},
};

pub const CONFIG_STORAGE_KEY: &str = "kairos:config";
pub const ERR_BACKEND_URL: &str = "La URL del servidor debe empezar con http:// o https://";

/// Resolve the configuration for the current page.
pub fn resolve_config() -> KioskConfig {
    let host = gloo_utils::window().location().hostname().unwrap_or_default();
    let derived = config_for_host(&host);

    match load_override() {
        Ok(Some(config)) => {
            log::info!("Using stored configuration override");
            config
        }
        Ok(None) => derived,
        Err(e) => {
            log::warn!("Ignoring stored configuration: {}", e);
            derived
        }
    }
}

/// Defaults for a page served from `host`.
pub fn config_for_host(host: &str) -> KioskConfig {
    let local = is_local(host);
    let api_base_url = if local || host.is_empty() {
        format!("http://localhost:{}", BACKEND_PORT)
    } else {
        format!("http://{}:{}", host, BACKEND_PORT)
    };
    KioskConfig {
        api_base_url,
        debug: local,
        ..KioskConfig::default()
    }
}

pub fn is_local(host: &str) -> bool {
    matches!(host, "localhost" | "127.0.0.1" | "::1" | "[::1]")
}

pub fn load_override() -> Result<Option<KioskConfig>> {
    let Some(storage) = local_storage()? else {
        return Ok(None);
    };
    let raw = storage
        .get_item(CONFIG_STORAGE_KEY)
        .map_err(|e| KioskError::Config(format!("{:?}", e)))?;
    match raw {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// `current` pointed at another backend. Only absolute http(s) URLs are accepted.
pub fn with_backend_url(current: &KioskConfig, url: &str) -> Result<KioskConfig> {
    let url = url.trim().trim_end_matches('/');
    let host = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .unwrap_or_default();
    if host.is_empty() || host.contains(char::is_whitespace) {
        return Err(KioskError::Validation(vec![ERR_BACKEND_URL.to_string()]));
    }
    Ok(KioskConfig {
        api_base_url: url.to_string(),
        ..current.clone()
    })
}

pub fn save_override(config: &KioskConfig) -> Result<()> {
    let storage = local_storage()?.ok_or_else(|| KioskError::Config("localStorage unavailable".to_string()))?;
    let json = serde_json::to_string(config)?;
    storage
        .set_item(CONFIG_STORAGE_KEY, &json)
        .map_err(|e| KioskError::Config(format!("{:?}", e)))
}

/// Drop the stored override; the next page load derives the URL from the host again.
pub fn clear_override() -> Result<()> {
    if let Some(storage) = local_storage()? {
        storage
            .remove_item(CONFIG_STORAGE_KEY)
            .map_err(|e| KioskError::Config(format!("{:?}", e)))?;
    }
    Ok(())
}

/// Restart the app so a new backend URL takes effect.
pub fn reload_page() -> Result<()> {
    gloo_utils::window()
        .location()
        .reload()
        .map_err(|e| KioskError::JsInterop(format!("{:?}", e)))
}

fn local_storage() -> Result<Option<web_sys::Storage>> {
    gloo_utils::window()
        .local_storage()
        .map_err(|e| KioskError::JsInterop(format!("{:?}", e)))
}
