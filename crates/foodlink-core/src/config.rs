//! Client configuration
//!
//! Resolved from environment variables with sensible defaults:
//!
//! | Variable                | Default                          |
//! |-------------------------|----------------------------------|
//! | `FOODLINK_API_URL`      | `http://localhost:8080`          |
//! | `FOODLINK_TIMEOUT_SECS` | `30`                             |
//! | `FOODLINK_TOKEN_PATH`   | `<data dir>/session.json`        |
//! | `FOODLINK_RESTORE`      | `none`                           |

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const TOKEN_FILE_NAME: &str = "session.json";

pub const ENV_API_URL: &str = "FOODLINK_API_URL";
pub const ENV_TIMEOUT_SECS: &str = "FOODLINK_TIMEOUT_SECS";
pub const ENV_TOKEN_PATH: &str = "FOODLINK_TOKEN_PATH";
pub const ENV_RESTORE: &str = "FOODLINK_RESTORE";

/// How a stored token is checked while restoring a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RestoreValidation {
    /// Trust the stored token without contacting the backend
    #[default]
    None,
    /// Validate with `GET /auth/me` and adopt the returned identity
    Me,
    /// Validate with `GET /users/me` and cache the profile
    Profile,
}

impl FromStr for RestoreValidation {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(RestoreValidation::None),
            "me" => Ok(RestoreValidation::Me),
            "profile" => Ok(RestoreValidation::Profile),
            _ => Err(format!(
                "Invalid restore mode: {}. Use 'none', 'me' or 'profile'",
                s
            )),
        }
    }
}

impl Display for RestoreValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RestoreValidation::None => write!(f, "none"),
            RestoreValidation::Me => write!(f, "me"),
            RestoreValidation::Profile => write!(f, "profile"),
        }
    }
}

/// Resolved client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub token_path: PathBuf,
    pub restore: RestoreValidation,
}

impl ClientConfig {
    /// Build the configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let api_base_url = std::env::var(ENV_API_URL)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let request_timeout_secs = match std::env::var(ENV_TIMEOUT_SECS) {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                Error::config(format!("{} must be a number of seconds, got '{}'", ENV_TIMEOUT_SECS, raw))
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        let token_path = get_token_path()?;

        let restore = match std::env::var(ENV_RESTORE) {
            Ok(raw) => raw.parse::<RestoreValidation>().map_err(Error::config)?,
            Err(_) => RestoreValidation::default(),
        };

        Ok(Self {
            api_base_url: normalize_base_url(&api_base_url)?,
            request_timeout_secs,
            token_path,
            restore,
        })
    }
}

/// Get the token file path, honouring `FOODLINK_TOKEN_PATH`
pub fn get_token_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(ENV_TOKEN_PATH) {
        if !path.trim().is_empty() {
            return Ok(expand_path(&path));
        }
    }

    // Default: use app data directory
    let dirs = directories::ProjectDirs::from("com", "foodlink", "FoodLink")
        .ok_or_else(|| Error::config("Could not determine project directories"))?;

    Ok(dirs.data_dir().join(TOKEN_FILE_NAME))
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Trim trailing slashes and require an http(s) scheme
fn normalize_base_url(url: &str) -> Result<String> {
    let trimmed = url.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(Error::config(format!(
            "API URL must start with http:// or https://, got '{}'",
            url
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests don't run in parallel
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in [ENV_API_URL, ENV_TIMEOUT_SECS, ENV_TOKEN_PATH, ENV_RESTORE] {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn test_from_env_defaults() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.restore, RestoreValidation::None);
        assert!(config.token_path.to_string_lossy().contains(TOKEN_FILE_NAME));
    }

    #[test]
    fn test_from_env_overrides() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        std::env::set_var(ENV_API_URL, "https://api.foodlink.test/");
        std::env::set_var(ENV_TIMEOUT_SECS, "5");
        std::env::set_var(ENV_TOKEN_PATH, "/tmp/foodlink-test/token.json");
        std::env::set_var(ENV_RESTORE, "profile");

        let config = ClientConfig::from_env().unwrap();
        clear_env();

        assert_eq!(config.api_base_url, "https://api.foodlink.test");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.token_path, PathBuf::from("/tmp/foodlink-test/token.json"));
        assert_eq!(config.restore, RestoreValidation::Profile);
    }

    #[test]
    fn test_from_env_rejects_bad_timeout() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        std::env::set_var(ENV_TIMEOUT_SECS, "soon");

        let result = ClientConfig::from_env();
        clear_env();

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("http://10.0.2.2:8080//").unwrap(), "http://10.0.2.2:8080");
        assert!(normalize_base_url("ftp://example.com").is_err());
        assert!(normalize_base_url("localhost:8080").is_err());
    }

    #[test]
    fn test_restore_validation_from_str() {
        assert_eq!("ME".parse::<RestoreValidation>().unwrap(), RestoreValidation::Me);
        assert_eq!("none".parse::<RestoreValidation>().unwrap(), RestoreValidation::None);
        assert!("always".parse::<RestoreValidation>().is_err());
        assert_eq!(RestoreValidation::Profile.to_string(), "profile");
    }

    #[test]
    fn test_token_path_from_env() {
        let _lock = ENV_MUTEX.lock().unwrap();
        clear_env();
        std::env::set_var(ENV_TOKEN_PATH, "~/foodlink/session.json");

        let path = get_token_path().unwrap();
        clear_env();

        assert!(path.ends_with("foodlink/session.json"));
    }
}
