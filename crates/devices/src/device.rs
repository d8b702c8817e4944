use std::fmt;

use chrono::{DateTime, Local};

use crate::thermostat::Thermostat;

const THERMOSTAT: &str = "sdm.devices.types.THERMOSTAT";
const DOORBELL: &str = "sdm.devices.types.DOORBELL";
const CAMERA: &str = "sdm.devices.types.CAMERA";
const DISPLAY: &str = "sdm.devices.types.DISPLAY";

/// Device type as reported in the resource's `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceKind {
    Thermostat,
    Doorbell,
    Camera,
    Display,
    Other(String),
}

impl DeviceKind {
    pub fn from_type(device_type: &str) -> Self {
        match device_type {
            THERMOSTAT => Self::Thermostat,
            DOORBELL => Self::Doorbell,
            CAMERA => Self::Camera,
            DISPLAY => Self::Display,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Thermostat => THERMOSTAT,
            Self::Doorbell => DOORBELL,
            Self::Camera => CAMERA,
            Self::Display => DISPLAY,
            Self::Other(other) => other,
        }
    }
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A device resource, parsed into a typed view when one exists for its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Device {
    Thermostat(Box<Thermostat>),
    /// No typed view for this kind; the raw resource is kept.
    Unsupported {
        kind: DeviceKind,
        raw: serde_json::Value,
    },
}

impl Device {
    pub fn from_value(
        value: serde_json::Value,
        received_at: DateTime<Local>,
    ) -> Result<Self, serde_json::Error> {
        let kind = DeviceKind::from_type(value["type"].as_str().unwrap_or_default());
        match kind {
            DeviceKind::Thermostat => Ok(Self::Thermostat(Box::new(Thermostat::from_value(
                value,
                received_at,
            )?))),
            kind => Ok(Self::Unsupported { kind, raw: value }),
        }
    }

    pub fn kind(&self) -> DeviceKind {
        match self {
            Self::Thermostat(_) => DeviceKind::Thermostat,
            Self::Unsupported { kind, .. } => kind.clone(),
        }
    }

    /// Full resource name, `enterprises/{project}/devices/{id}`.
    pub fn name(&self) -> &str {
        match self {
            Self::Thermostat(t) => &t.name,
            Self::Unsupported { raw, .. } => raw["name"].as_str().unwrap_or_default(),
        }
    }

    pub fn device_id(&self) -> &str {
        let name = self.name();
        name.rsplit('/').next().unwrap_or(name)
    }

    /// User-assigned name from the Info trait, if any.
    pub fn custom_name(&self) -> Option<&str> {
        let name = match self {
            Self::Thermostat(t) => t.custom_name.as_str(),
            Self::Unsupported { raw, .. } => raw
                .pointer("/traits/sdm.devices.traits.Info/customName")
                .and_then(|v| v.as_str())
                .unwrap_or_default(),
        };
        (!name.is_empty()).then_some(name)
    }
}
