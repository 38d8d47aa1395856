use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    /// Public base URL of the API
    pub api_base_url: String,
    /// Remote callable functions; `None` runs them in-process
    pub functions_url: Option<String>,
    pub functions_token: Option<String>,
    /// Validity window of generated invite codes (in-process callables only)
    pub invite_code_ttl: chrono::Duration,
    pub storage_dir: PathBuf,
    /// Base URL returned for uploaded objects
    pub storage_public_url: String,
    pub preferences_dir: PathBuf,
    /// How long `await_selected_club` waits before using the cached club
    pub selection_wait: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_base_url =
            env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());
        let storage_public_url = env::var("STORAGE_PUBLIC_URL")
            .unwrap_or_else(|_| format!("{}/files", api_base_url.trim_end_matches('/')));

        Self {
            port: parse_or("PORT", 8080),
            functions_url: non_empty("FUNCTIONS_URL"),
            functions_token: non_empty("FUNCTIONS_TOKEN"),
            invite_code_ttl: chrono::Duration::hours(parse_or("INVITE_CODE_TTL_HOURS", 168)),
            storage_dir: env::var("STORAGE_DIR")
                .unwrap_or_else(|_| "./data/storage".to_string())
                .into(),
            storage_public_url,
            preferences_dir: env::var("PREFERENCES_DIR")
                .unwrap_or_else(|_| "./data/preferences".to_string())
                .into(),
            selection_wait: Duration::from_secs(parse_or("SELECTION_WAIT_SECS", 5)),
            api_base_url,
        }
    }

    /// Whether callables go to a remote backend
    pub fn remote_functions(&self) -> bool {
        self.functions_url.is_some()
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Invalid value, using default");
            default
        }),
        Err(_) => default,
    }
}
