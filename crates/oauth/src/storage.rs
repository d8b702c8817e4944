use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use {
    nestread_config::Settings,
    serde::{Deserialize, Serialize},
    tracing::{debug, warn},
};

use crate::{
    error::AuthError,
    types::{Lifetime, Secret, SecretKind, Timing},
};

/// On-disk layout of a secret file.
#[derive(Debug, Serialize, Deserialize)]
struct SecretRecord {
    #[serde(rename = "Secret")]
    secret: String,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    kind: Option<String>,
    #[serde(rename = "Lifetime", default, skip_serializing_if = "Option::is_none")]
    lifetime: Option<i64>,
    #[serde(rename = "Created", default, skip_serializing_if = "Option::is_none")]
    created: Option<i64>,
}

impl SecretRecord {
    fn into_secret(self) -> Result<Secret, String> {
        let kind = self.kind.as_deref().map(str::parse).transpose()?;
        let timing = match (self.lifetime, self.created) {
            (None, None) => None,
            (Some(lifetime), Some(created_at)) => Some(Timing {
                created_at,
                lifetime: Lifetime::from_raw(lifetime)
                    .ok_or_else(|| format!("invalid Lifetime {lifetime}"))?,
            }),
            (Some(_), None) => return Err("Lifetime is set without Created".into()),
            (None, Some(_)) => return Err("Created is set without Lifetime".into()),
        };
        Ok(Secret::from_parts(self.secret, kind, timing))
    }
}

impl From<&Secret> for SecretRecord {
    fn from(secret: &Secret) -> Self {
        Self {
            secret: secret.expose().to_string(),
            kind: secret.kind.map(|k| k.as_str().to_string()),
            lifetime: secret.timing.map(|t| t.lifetime.as_raw()),
            created: secret.timing.map(|t| t.created_at),
        }
    }
}

/// File-backed secret storage, one TOML record per secret.
#[derive(Debug, Clone, Copy)]
pub struct SecretStore<'a> {
    settings: &'a Settings,
}

impl<'a> SecretStore<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Backing file for `kind`, resolved against the secrets directory.
    pub fn path_for(&self, kind: SecretKind) -> PathBuf {
        let configured = match kind {
            SecretKind::AccessToken => &self.settings.auth_token_file,
            SecretKind::RefreshToken => &self.settings.refresh_token_file,
            SecretKind::ProjectId => &self.settings.project_id_file,
            SecretKind::ClientId => &self.settings.oauth2_id_file,
            SecretKind::ClientSecret => &self.settings.oauth2_secret_file,
        };
        self.settings.resolve(configured)
    }

    /// Load the secret configured for `kind`. A record without a `Type`
    /// takes `kind` as its type.
    pub fn load_kind(&self, kind: SecretKind) -> Result<Secret, AuthError> {
        let path = self.path_for(kind);
        let mut secret = Self::load(&path)?;
        match secret.kind {
            None => secret.kind = Some(kind),
            Some(found) if found != kind => {
                warn!(path = %path.display(), expected = %kind, found = %found, "secret type mismatch");
            },
            Some(_) => {},
        }
        Ok(secret)
    }

    /// Persist `secret` to the file configured for `kind`.
    pub fn save_kind(&self, kind: SecretKind, secret: &Secret) -> Result<(), AuthError> {
        Self::save(&self.path_for(kind), secret)
    }

    /// Parse the secret record at `path`.
    pub fn load(path: &Path) -> Result<Secret, AuthError> {
        if path.as_os_str().is_empty() {
            return Err(AuthError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let raw = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                AuthError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                AuthError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let malformed = |reason: String| AuthError::MalformedRecord {
            path: path.to_path_buf(),
            reason,
        };
        let record: SecretRecord = toml::from_str(&raw).map_err(|e| malformed(e.to_string()))?;
        let secret = record.into_secret().map_err(malformed)?;
        debug!(path = %path.display(), kind = ?secret.kind, "loaded secret");
        Ok(secret)
    }

    /// Write `secret` to `path`, replacing any previous record in one step.
    ///
    /// The record is written to a temporary file in the same directory and
    /// renamed over `path`, so a failed write leaves the old file intact.
    pub fn save(path: &Path, secret: &Secret) -> Result<(), AuthError> {
        let io_err = |source| AuthError::Io {
            path: path.to_path_buf(),
            source,
        };
        let data = toml::to_string(&SecretRecord::from(secret))
            .map_err(|e| io_err(io::Error::other(e)))?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(io_err)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(data.as_bytes()).map_err(io_err)?;
        tmp.as_file().sync_all().map_err(io_err)?;

        // Set file permissions to 0600 on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(tmp.path(), std::fs::Permissions::from_mode(0o600))
                .map_err(io_err)?;
        }

        tmp.persist(path).map_err(|e| io_err(e.error))?;
        debug!(path = %path.display(), kind = ?secret.kind, "saved secret");
        Ok(())
    }
}
