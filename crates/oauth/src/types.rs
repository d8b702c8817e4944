use std::{
    fmt,
    str::FromStr,
    time::{SystemTime, UNIX_EPOCH},
};

use secrecy::{ExposeSecret, SecretString};

/// What a stored secret is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SecretKind {
    AccessToken,
    RefreshToken,
    ProjectId,
    ClientId,
    ClientSecret,
}

impl SecretKind {
    /// The `Type` string written to the backing file.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccessToken => "Auth",
            Self::RefreshToken => "Refresh",
            Self::ProjectId => "Project ID",
            Self::ClientId => "OAuth2 ID",
            Self::ClientSecret => "OAuth2 Secret",
        }
    }
}

impl fmt::Display for SecretKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SecretKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Auth" => Ok(Self::AccessToken),
            "Refresh" => Ok(Self::RefreshToken),
            "Project ID" => Ok(Self::ProjectId),
            "OAuth2 ID" => Ok(Self::ClientId),
            "OAuth2 Secret" => Ok(Self::ClientSecret),
            other => Err(format!("unknown secret type {other:?}")),
        }
    }
}

/// How long a secret stays valid after it was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifetime {
    /// Stored as `-1`.
    Never,
    /// Non-negative. Zero means no lifetime has been issued yet.
    Seconds(i64),
}

impl Lifetime {
    pub(crate) const NEVER_SENTINEL: i64 = -1;

    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            Self::NEVER_SENTINEL => Some(Self::Never),
            secs if secs >= 0 => Some(Self::Seconds(secs)),
            _ => None,
        }
    }

    pub fn as_raw(self) -> i64 {
        match self {
            Self::Never => Self::NEVER_SENTINEL,
            Self::Seconds(secs) => secs,
        }
    }
}

/// Issue time and lifetime of a secret. Both or neither are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Epoch seconds.
    pub created_at: i64,
    pub lifetime: Lifetime,
}

impl Timing {
    /// Epoch second at which the secret stops being valid, or `None` if it
    /// never expires.
    pub fn expires_at(&self) -> Option<i64> {
        match self.lifetime {
            Lifetime::Never => None,
            Lifetime::Seconds(secs) => Some(self.created_at.saturating_add(secs)),
        }
    }
}

/// A single persisted credential.
#[derive(Debug, Clone)]
pub struct Secret {
    value: SecretString,
    pub kind: Option<SecretKind>,
    /// `None` means the secret has never been issued a lifetime, which is
    /// not the same as one that never expires.
    pub timing: Option<Timing>,
}

impl Secret {
    pub fn new(value: impl Into<String>, kind: SecretKind) -> Self {
        Self {
            value: SecretString::new(value.into()),
            kind: Some(kind),
            timing: None,
        }
    }

    pub fn with_timing(mut self, created_at: i64, lifetime: Lifetime) -> Self {
        self.timing = Some(Timing {
            created_at,
            lifetime,
        });
        self
    }

    pub(crate) fn from_parts(
        value: String,
        kind: Option<SecretKind>,
        timing: Option<Timing>,
    ) -> Self {
        Self {
            value: SecretString::new(value),
            kind,
            timing,
        }
    }

    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    /// Replace the value and restart the lifetime clock at `now`.
    pub fn reissue(&mut self, value: String, lifetime: Lifetime, now: i64) {
        self.value = SecretString::new(value);
        self.timing = Some(Timing {
            created_at: now,
            lifetime,
        });
    }

    /// Whether the secret can still be used at `now`, treating it as expired
    /// `jitter` seconds early.
    ///
    /// A secret without timing data is never valid.
    pub fn is_valid_at(&self, now: i64, jitter: i64) -> bool {
        match self.timing {
            None => false,
            Some(Timing {
                lifetime: Lifetime::Never,
                ..
            }) => true,
            Some(timing) => timing
                .expires_at()
                .is_some_and(|expiry| expiry.saturating_sub(jitter) > now),
        }
    }
}

impl PartialEq for Secret {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose() && self.kind == other.kind && self.timing == other.timing
    }
}

impl Eq for Secret {}

pub(crate) fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}
