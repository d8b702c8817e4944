use {
    chrono::Local,
    nestread_config::Settings,
    nestread_oauth::{SecretKind, TokenManager},
    reqwest::{Client, Response},
    serde::Deserialize,
    tracing::{debug, warn},
};

use crate::{device::Device, error::DeviceError};

#[derive(Debug, Deserialize)]
struct DeviceList {
    #[serde(default)]
    devices: Vec<serde_json::Value>,
}

/// Read-only client for the SDM `devices` endpoints.
///
/// Every request asks the token manager for a valid token first and is
/// abandoned if none can be produced.
pub struct DeviceClient<'a> {
    client: Client,
    base_url: String,
    tokens: &'a TokenManager<'a>,
}

impl<'a> DeviceClient<'a> {
    pub fn new(settings: &Settings, tokens: &'a TokenManager<'a>) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.api_base_url.clone(),
            tokens,
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// `GET {base}/{project_id}/devices/{device_id}`.
    ///
    /// The id must be a single path segment.
    pub async fn get_device(&self, device_id: &str) -> Result<Device, DeviceError> {
        if !is_path_segment(device_id) {
            return Err(DeviceError::InvalidDeviceId(device_id.to_string()));
        }
        let body = self.get_json(&format!("devices/{device_id}")).await?;
        Ok(Device::from_value(body, Local::now())?)
    }

    /// `GET {base}/{project_id}/devices`.
    pub async fn list_devices(&self) -> Result<Vec<Device>, DeviceError> {
        let body = self.get_json("devices").await?;
        let list: DeviceList = serde_json::from_value(body)?;
        let received_at = Local::now();
        list.devices
            .into_iter()
            .map(|d| Device::from_value(d, received_at).map_err(DeviceError::from))
            .collect()
    }

    async fn get_json(&self, path: &str) -> Result<serde_json::Value, DeviceError> {
        let bearer = self.tokens.bearer_token(false).await?;
        let project_id = self
            .tokens
            .store()
            .load_kind(SecretKind::ProjectId)
            .map_err(DeviceError::ProjectId)?;

        let url = format!("{}/{}/{path}", self.base_url, project_id.expose());
        debug!(%url, "fetching");
        let response = self
            .client
            .get(&url)
            .bearer_auth(bearer)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let body = Self::check_status(response).await?;
        if let Some(error) = body.get("error") {
            warn!(%error, "device API returned an error payload");
            let message = error["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Err(DeviceError::Api(message));
        }
        Ok(body)
    }

    async fn check_status(response: Response) -> Result<serde_json::Value, DeviceError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeviceError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

fn is_path_segment(id: &str) -> bool {
    !id.is_empty()
        && id != "."
        && id != ".."
        && !id.contains(['/', '\\', '?', '#', '%'])
}
