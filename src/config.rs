// ⚙️ Configuration
// Environment-driven settings shared by the CLI and the server

use crate::validators::field::parse_bool_str;
use std::env;
use std::path::PathBuf;
use tracing::warn;

pub const DEFAULT_DATABASE_PATH: &str = "swift_directory.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_SWIFT_DATA_FILE: &str = "configs/swift_data.csv";

/// Database path that selects an in-memory store
pub const IN_MEMORY: &str = ":memory:";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `DATABASE_PATH`, or `:memory:` for a throwaway store
    pub database_path: String,
    /// `BIND_ADDR`
    pub bind_addr: String,
    /// `API_VERSION`, the route prefix
    pub api_version: String,
    /// `LOAD_INITIAL_DATA`: seed an empty store at startup
    pub load_initial_data: bool,
    /// `SWIFT_DATA_FILE`
    pub swift_data_file: PathBuf,
    /// `API_DEBUG`: expose internal error messages in responses
    pub api_debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            load_initial_data: false,
            swift_data_file: PathBuf::from(DEFAULT_SWIFT_DATA_FILE),
            api_debug: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset or empty keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| get_or_default(&lookup, key, default);

        Config {
            database_path: get("DATABASE_PATH", DEFAULT_DATABASE_PATH),
            bind_addr: get("BIND_ADDR", DEFAULT_BIND_ADDR),
            api_version: normalize_api_version(&get("API_VERSION", DEFAULT_API_VERSION)),
            load_initial_data: flag(&lookup, "LOAD_INITIAL_DATA"),
            swift_data_file: PathBuf::from(get("SWIFT_DATA_FILE", DEFAULT_SWIFT_DATA_FILE)),
            api_debug: flag(&lookup, "API_DEBUG"),
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path == IN_MEMORY
    }

    /// Route prefix, e.g. `/v1`
    pub fn route_prefix(&self) -> String {
        format!("/{}", self.api_version)
    }
}

/// Strip surrounding slashes; a value with nothing else falls back to the default.
pub fn normalize_api_version(raw: &str) -> String {
    let version = raw.trim().trim_matches('/');
    if version.is_empty() {
        warn!(value = raw, "empty API_VERSION, using {}", DEFAULT_API_VERSION);
        DEFAULT_API_VERSION.to_string()
    } else {
        version.to_string()
    }
}

fn get_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn flag<F>(lookup: &F, key: &str) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let raw = get_or_default(lookup, key, "false");
    parse_bool_str(raw.trim()).unwrap_or_else(|| {
        warn!(key, value = %raw, "unrecognized boolean, using false");
        false
    })
}
