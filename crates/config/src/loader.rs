use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::schema::{ConfigError, KNOWN_KEYS, Settings};

/// Env file picked up from the working directory when none is given.
const DEFAULT_ENV_FILE: &str = ".env";

/// Load settings from `env_file` (or `./.env` if present), with the process
/// environment filling any key the file does not set.
pub fn load_settings(env_file: Option<&Path>) -> Result<Settings, ConfigError> {
    load_settings_with(env_file, |key| std::env::var(key).ok())
}

/// Like [`load_settings`], but with an explicit fallback lookup instead of
/// the process environment.
pub fn load_settings_with(
    env_file: Option<&Path>,
    fallback: impl Fn(&str) -> Option<String>,
) -> Result<Settings, ConfigError> {
    let mut values = match find_env_file(env_file) {
        Some(path) => read_env_file(&path)?,
        None => {
            debug!("no env file found, using process environment only");
            HashMap::new()
        },
    };

    for key in KNOWN_KEYS {
        if !values.contains_key(*key)
            && let Some(value) = fallback(key)
        {
            values.insert((*key).to_string(), value);
        }
    }

    Settings::from_map(&values)
}

/// An explicit env file is always used, so a missing one surfaces as an
/// error. The default `.env` is only used when it exists.
fn find_env_file(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    let default = PathBuf::from(DEFAULT_ENV_FILE);
    default.exists().then_some(default)
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let to_err = |source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    };
    let mut values = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(to_err)? {
        let (key, value) = item.map_err(to_err)?;
        values.insert(key, value);
    }
    debug!(path = %path.display(), keys = values.len(), "loaded env file");
    Ok(values)
}
