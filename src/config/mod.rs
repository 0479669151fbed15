use serde::{Deserialize, Serialize};

pub(crate) const DEFAULT_API_URL: &str = "https://reqres.in/api";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        // Both `window.ENV.API_URL` and the lowercase `window.ENV.api_url` are honoured.
        let api_url = read_window_env("API_URL")
            .or_else(|| read_window_env("api_url"))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Self::with_api_url(api_url)
    }

    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        let api_url = api_url.into();
        let trimmed = api_url.trim().trim_end_matches('/');
        let api_url = if trimmed.is_empty() {
            DEFAULT_API_URL.to_string()
        } else {
            trimmed.to_string()
        };

        Self { api_url }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
fn read_window_env(key: &str) -> Option<String> {
    let window = web_sys::window()?;
    let env = window.get("ENV")?;
    if env.is_undefined() || !env.is_object() {
        return None;
    }

    js_sys::Reflect::get(&env, &key.into())
        .ok()
        .and_then(|v| v.as_string())
        .filter(|s| !s.trim().is_empty())
}

// No `window` off the browser.
#[cfg(not(target_arch = "wasm32"))]
fn read_window_env(_key: &str) -> Option<String> {
    None
}
