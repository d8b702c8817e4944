use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

/// Root directory that relative secret paths are resolved against.
pub const THERMOSTAT_SECRETS_DIR: &str = "THERMOSTAT_SECRETS_DIR";
pub const OAUTH2_ID_FILE: &str = "OAUTH2_ID_FILE";
pub const OAUTH2_SECRET_FILE: &str = "OAUTH2_SECRET_FILE";
pub const AUTH_TOKEN_FILE: &str = "AUTH_TOKEN_FILE";
pub const REFRESH_TOKEN_FILE: &str = "REFRESH_TOKEN_FILE";
pub const PROJECT_ID_FILE: &str = "PROJECT_ID_FILE";
pub const OAUTH2_TOKEN_URL: &str = "OAUTH2_TOKEN_URL";
pub const NEST_API_URL: &str = "NEST_API_URL";
pub const TOKEN_JITTER_SECS: &str = "TOKEN_JITTER_SECS";

/// Every key [`Settings`] understands.
pub const KNOWN_KEYS: &[&str] = &[
    THERMOSTAT_SECRETS_DIR,
    OAUTH2_ID_FILE,
    OAUTH2_SECRET_FILE,
    AUTH_TOKEN_FILE,
    REFRESH_TOKEN_FILE,
    PROJECT_ID_FILE,
    OAUTH2_TOKEN_URL,
    NEST_API_URL,
    TOKEN_JITTER_SECS,
];

pub const DEFAULT_TOKEN_URL: &str = "https://www.googleapis.com/oauth2/v4/token";
pub const DEFAULT_API_URL: &str = "https://smartdevicemanagement.googleapis.com/v1/enterprises";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read env file {}: {source}", path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Resolved process settings.
///
/// Path fields hold whatever the configuration said, which may be empty.
/// An empty path is kept empty so that loading from it reports the secret
/// as missing rather than reading some unrelated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub secrets_dir: Option<PathBuf>,
    pub oauth2_id_file: PathBuf,
    pub oauth2_secret_file: PathBuf,
    pub auth_token_file: PathBuf,
    pub refresh_token_file: PathBuf,
    pub project_id_file: PathBuf,
    pub token_url: String,
    pub api_base_url: String,
    /// Seconds subtracted from a token's expiry before it is considered stale.
    pub token_jitter_secs: i64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            secrets_dir: None,
            oauth2_id_file: PathBuf::new(),
            oauth2_secret_file: PathBuf::new(),
            auth_token_file: PathBuf::new(),
            refresh_token_file: PathBuf::new(),
            project_id_file: PathBuf::new(),
            token_url: DEFAULT_TOKEN_URL.into(),
            api_base_url: DEFAULT_API_URL.into(),
            token_jitter_secs: 0,
        }
    }
}

impl Settings {
    /// Build settings from raw key/value pairs. Unknown keys are ignored.
    pub fn from_map(values: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            values
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
        };
        let path = |key: &str| get(key).map(PathBuf::from).unwrap_or_default();

        let token_jitter_secs = match get(TOKEN_JITTER_SECS) {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: TOKEN_JITTER_SECS,
                value: raw.to_string(),
            })?,
            None => 0,
        };

        Ok(Self {
            secrets_dir: get(THERMOSTAT_SECRETS_DIR).map(PathBuf::from),
            oauth2_id_file: path(OAUTH2_ID_FILE),
            oauth2_secret_file: path(OAUTH2_SECRET_FILE),
            auth_token_file: path(AUTH_TOKEN_FILE),
            refresh_token_file: path(REFRESH_TOKEN_FILE),
            project_id_file: path(PROJECT_ID_FILE),
            token_url: get(OAUTH2_TOKEN_URL)
                .unwrap_or(DEFAULT_TOKEN_URL)
                .trim_end_matches('/')
                .to_string(),
            api_base_url: get(NEST_API_URL)
                .unwrap_or(DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            token_jitter_secs,
        })
    }

    /// Resolve a configured secret path against the secrets directory.
    ///
    /// Absolute paths and empty paths are returned unchanged.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.as_os_str().is_empty() || path.is_absolute() {
            return path.to_path_buf();
        }
        match &self.secrets_dir {
            Some(dir) => dir.join(path),
            None => path.to_path_buf(),
        }
    }
}
