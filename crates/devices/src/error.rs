use nestread_oauth::{AuthError, Unavailable};

#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("cannot authenticate")]
    Unauthenticated(#[from] Unavailable),

    #[error("cannot read project id")]
    ProjectId(#[source] AuthError),

    #[error("invalid device id {0:?}")]
    InvalidDeviceId(String),

    #[error("device API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("device API error: {0}")]
    Api(String),

    #[error("device request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected device payload: {0}")]
    Decode(#[from] serde_json::Error),
}
