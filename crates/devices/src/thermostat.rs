//! Thermostat view over an `sdm.devices.types.THERMOSTAT` device.

use std::fmt;

use {
    chrono::{DateTime, Local},
    serde::Deserialize,
};

/// Thermostat operating mode (`ThermostatMode.mode`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum HvacMode {
    #[serde(rename = "HEAT")]
    Heat,
    #[serde(rename = "COOL")]
    Cool,
    #[serde(rename = "HEATCOOL")]
    HeatCool,
    #[default]
    #[serde(rename = "OFF")]
    Off,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Heat => "HEAT",
            Self::Cool => "COOL",
            Self::HeatCool => "HEATCOOL",
            Self::Off => "OFF",
            Self::Unknown => "UNKNOWN",
        })
    }
}

/// What the HVAC is doing right now (`ThermostatHvac.status`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum HvacStatus {
    #[default]
    #[serde(rename = "OFF")]
    Off,
    #[serde(rename = "HEATING")]
    Heating,
    #[serde(rename = "COOLING")]
    Cooling,
    #[serde(other)]
    Unknown,
}

impl fmt::Display for HvacStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Off => "OFF",
            Self::Heating => "HEATING",
            Self::Cooling => "COOLING",
            Self::Unknown => "UNKNOWN",
        })
    }
}

/// Display scale configured on the device. The API always reports Celsius.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemperatureScale {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureScale {
    /// Convert a Celsius reading into this scale.
    pub fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius_to_fahrenheit(celsius),
        }
    }
}

fn celsius_to_fahrenheit(temp: f64) -> f64 {
    temp * 9.0 / 5.0 + 32.0
}

/// Target temperature(s) for the active mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Setpoint {
    Single(f64),
    Range { heat: f64, cool: f64 },
}

/// A thermostat's trait values at the time the device was fetched.
///
/// Temperatures are stored in Celsius; use [`Thermostat::ambient_temp`] and
/// [`Thermostat::setpoint`] for values in the device's display scale.
#[derive(Debug, Clone, PartialEq)]
pub struct Thermostat {
    pub name: String,
    pub device_type: String,
    pub assignee: String,
    pub custom_name: String,
    pub ambient_humidity_percent: f64,
    pub connectivity: String,
    pub fan_timer_mode: String,
    pub mode: HvacMode,
    pub available_modes: Vec<String>,
    pub eco_mode: String,
    pub available_eco_modes: Vec<String>,
    pub eco_heat_celsius: f64,
    pub eco_cool_celsius: f64,
    pub temperature_scale: TemperatureScale,
    pub ambient_celsius: f64,
    pub hvac_status: HvacStatus,
    pub heat_setpoint_celsius: Option<f64>,
    pub cool_setpoint_celsius: Option<f64>,
    pub received_at: DateTime<Local>,
}

impl Thermostat {
    /// Build the view from a device resource.
    ///
    /// Missing traits fall back to "off"/zero defaults. Setpoints are only
    /// taken for the modes that use them.
    pub fn from_value(
        value: serde_json::Value,
        received_at: DateTime<Local>,
    ) -> Result<Self, serde_json::Error> {
        let raw: RawThermostat = serde_json::from_value(value)?;
        let t = raw.traits;

        let (heat, cool) = match t.mode.mode {
            HvacMode::Heat => (t.setpoint.heat_celsius, None),
            HvacMode::Cool => (None, t.setpoint.cool_celsius),
            HvacMode::HeatCool => (t.setpoint.heat_celsius, t.setpoint.cool_celsius),
            HvacMode::Off | HvacMode::Unknown => (None, None),
        };

        Ok(Self {
            name: raw.name,
            device_type: raw.device_type,
            assignee: raw.assignee,
            custom_name: t.info.custom_name,
            ambient_humidity_percent: t.humidity.ambient_humidity_percent,
            connectivity: t.connectivity.status,
            fan_timer_mode: t.fan.timer_mode,
            mode: t.mode.mode,
            available_modes: t.mode.available_modes,
            eco_mode: t.eco.mode,
            available_eco_modes: t.eco.available_modes,
            eco_heat_celsius: t.eco.heat_celsius,
            eco_cool_celsius: t.eco.cool_celsius,
            temperature_scale: t.settings.temperature_scale,
            ambient_celsius: t.temperature.ambient_temperature_celsius,
            hvac_status: t.hvac.status,
            heat_setpoint_celsius: heat,
            cool_setpoint_celsius: cool,
            received_at,
        })
    }

    /// Last segment of the resource name.
    pub fn device_id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or(&self.name)
    }

    /// Ambient temperature in the device's display scale.
    pub fn ambient_temp(&self) -> f64 {
        self.temperature_scale.from_celsius(self.ambient_celsius)
    }

    /// Setpoint(s) for the current mode in the device's display scale.
    /// `None` when the mode has no setpoint or the device did not report one.
    pub fn setpoint(&self) -> Option<Setpoint> {
        let scale = |c: f64| self.temperature_scale.from_celsius(c);
        match (self.mode, self.heat_setpoint_celsius, self.cool_setpoint_celsius) {
            (HvacMode::Heat, Some(heat), _) => Some(Setpoint::Single(scale(heat))),
            (HvacMode::Cool, _, Some(cool)) => Some(Setpoint::Single(scale(cool))),
            (HvacMode::HeatCool, Some(heat), Some(cool)) => Some(Setpoint::Range {
                heat: scale(heat),
                cool: scale(cool),
            }),
            _ => None,
        }
    }
}

// ── API Types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawThermostat {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    device_type: String,
    #[serde(default)]
    assignee: String,
    #[serde(default)]
    traits: Traits,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Traits {
    #[serde(rename = "sdm.devices.traits.Info")]
    info: InfoTrait,
    #[serde(rename = "sdm.devices.traits.Humidity")]
    humidity: HumidityTrait,
    #[serde(rename = "sdm.devices.traits.Connectivity")]
    connectivity: ConnectivityTrait,
    #[serde(rename = "sdm.devices.traits.Fan")]
    fan: FanTrait,
    #[serde(rename = "sdm.devices.traits.ThermostatMode")]
    mode: ModeTrait,
    #[serde(rename = "sdm.devices.traits.ThermostatEco")]
    eco: EcoTrait,
    #[serde(rename = "sdm.devices.traits.ThermostatHvac")]
    hvac: HvacTrait,
    #[serde(rename = "sdm.devices.traits.Settings")]
    settings: SettingsTrait,
    #[serde(rename = "sdm.devices.traits.ThermostatTemperatureSetpoint")]
    setpoint: SetpointTrait,
    #[serde(rename = "sdm.devices.traits.Temperature")]
    temperature: TemperatureTrait,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct InfoTrait {
    custom_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct HumidityTrait {
    ambient_humidity_percent: f64,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConnectivityTrait {
    status: String,
}

impl Default for ConnectivityTrait {
    fn default() -> Self {
        Self {
            status: "OFFLINE".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct FanTrait {
    timer_mode: String,
}

impl Default for FanTrait {
    fn default() -> Self {
        Self {
            timer_mode: "OFF".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ModeTrait {
    mode: HvacMode,
    available_modes: Vec<String>,
}

impl Default for ModeTrait {
    fn default() -> Self {
        Self {
            mode: HvacMode::Off,
            available_modes: vec!["OFF".into()],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct EcoTrait {
    mode: String,
    available_modes: Vec<String>,
    heat_celsius: f64,
    cool_celsius: f64,
}

impl Default for EcoTrait {
    fn default() -> Self {
        Self {
            mode: "OFF".into(),
            available_modes: vec!["OFF".into()],
            heat_celsius: 0.0,
            cool_celsius: 0.0,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HvacTrait {
    status: HvacStatus,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SettingsTrait {
    temperature_scale: TemperatureScale,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SetpointTrait {
    heat_celsius: Option<f64>,
    cool_celsius: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct TemperatureTrait {
    ambient_temperature_celsius: f64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {super::*, rstest::rstest, serde_json::json};

    fn device(mode: &str, scale: &str) -> serde_json::Value {
        json!({
            "name": "enterprises/proj-9/devices/AVPHwEu",
            "type": "sdm.devices.types.THERMOSTAT",
            "assignee": "enterprises/proj-9/structures/s1/rooms/r1",
            "traits": {
                "sdm.devices.traits.Info": { "customName": "Hallway" },
                "sdm.devices.traits.Humidity": { "ambientHumidityPercent": 41 },
                "sdm.devices.traits.Connectivity": { "status": "ONLINE" },
                "sdm.devices.traits.Fan": { "timerMode": "ON" },
                "sdm.devices.traits.ThermostatMode": {
                    "mode": mode,
                    "availableModes": ["HEAT", "COOL", "HEATCOOL", "OFF"]
                },
                "sdm.devices.traits.ThermostatEco": {
                    "availableModes": ["OFF", "MANUAL_ECO"],
                    "mode": "OFF",
                    "heatCelsius": 15.5,
                    "coolCelsius": 26.0
                },
                "sdm.devices.traits.ThermostatHvac": { "status": "HEATING" },
                "sdm.devices.traits.Settings": { "temperatureScale": scale },
                "sdm.devices.traits.ThermostatTemperatureSetpoint": {
                    "heatCelsius": 20.0,
                    "coolCelsius": 25.0
                },
                "sdm.devices.traits.Temperature": { "ambientTemperatureCelsius": 21.53 }
            }
        })
    }

    #[test]
    fn parses_all_traits() {
        let t = Thermostat::from_value(device("HEAT", "CELSIUS"), Local::now()).unwrap();
        assert_eq!(t.device_id(), "AVPHwEu");
        assert_eq!(t.custom_name, "Hallway");
        assert_eq!(t.ambient_humidity_percent, 41.0);
        assert_eq!(t.connectivity, "ONLINE");
        assert_eq!(t.fan_timer_mode, "ON");
        assert_eq!(t.mode, HvacMode::Heat);
        assert_eq!(t.hvac_status, HvacStatus::Heating);
        assert_eq!(t.available_eco_modes, vec!["OFF", "MANUAL_ECO"]);
        assert_eq!(t.eco_heat_celsius, 15.5);
        assert_eq!(t.ambient_temp(), 21.53);
        assert_eq!(t.heat_setpoint_celsius, Some(20.0));
        assert_eq!(t.cool_setpoint_celsius, None);
        assert_eq!(t.setpoint(), Some(Setpoint::Single(20.0)));
    }

    #[test]
    fn missing_traits_use_defaults() {
        let t = Thermostat::from_value(
            json!({ "name": "x", "type": "sdm.devices.types.THERMOSTAT" }),
            Local::now(),
        )
        .unwrap();
        assert_eq!(t.connectivity, "OFFLINE");
        assert_eq!(t.fan_timer_mode, "OFF");
        assert_eq!(t.mode, HvacMode::Off);
        assert_eq!(t.available_modes, vec!["OFF"]);
        assert_eq!(t.hvac_status, HvacStatus::Off);
        assert_eq!(t.temperature_scale, TemperatureScale::Celsius);
        assert_eq!(t.ambient_temp(), 0.0);
        assert_eq!(t.setpoint(), None);
    }

    #[rstest]
    #[case("HEAT", "CELSIUS", Some(Setpoint::Single(20.0)))]
    #[case("COOL", "CELSIUS", Some(Setpoint::Single(25.0)))]
    #[case("HEATCOOL", "CELSIUS", Some(Setpoint::Range { heat: 20.0, cool: 25.0 }))]
    #[case("OFF", "CELSIUS", None)]
    #[case("HEAT", "FAHRENHEIT", Some(Setpoint::Single(68.0)))]
    #[case("COOL", "FAHRENHEIT", Some(Setpoint::Single(77.0)))]
    fn setpoint_follows_mode_and_scale(
        #[case] mode: &str,
        #[case] scale: &str,
        #[case] expected: Option<Setpoint>,
    ) {
        let t = Thermostat::from_value(device(mode, scale), Local::now()).unwrap();
        assert_eq!(t.setpoint(), expected);
    }

    #[test]
    fn unknown_mode_has_no_setpoint() {
        let t = Thermostat::from_value(device("MANUAL_ECO", "CELSIUS"), Local::now()).unwrap();
        assert_eq!(t.mode, HvacMode::Unknown);
        assert_eq!(t.setpoint(), None);
    }

    #[test]
    fn fahrenheit_display_converts_ambient() {
        let t = Thermostat::from_value(device("HEAT", "FAHRENHEIT"), Local::now()).unwrap();
        assert!((t.ambient_temp() - 70.754).abs() < 1e-9);
    }

    #[test]
    fn fahrenheit_fixed_points() {
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }
}
