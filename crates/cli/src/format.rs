//! Log-friendly rendering of device readings.

use {
    chrono::format::{Item, StrftimeItems},
    nestread_devices::{Setpoint, Thermostat},
};

/// RSS-style timestamp, e.g. `Sun, 18 Oct 2026 09:15:02 +0200`.
pub const DEFAULT_TIME_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

#[derive(Debug, thiserror::Error)]
#[error("invalid time format {0:?}")]
pub struct InvalidTimeFormat(pub String);

/// One `"{time} thermo.{field}:{value}"` line per reading.
///
/// The setpoint line is left out when the current mode has no setpoint.
pub fn thermostat_lines(
    thermo: &Thermostat,
    time_format: &str,
) -> Result<Vec<String>, InvalidTimeFormat> {
    let items: Vec<Item<'_>> = StrftimeItems::new(time_format).collect();
    if items.iter().any(|i| matches!(i, Item::Error)) {
        return Err(InvalidTimeFormat(time_format.to_string()));
    }
    let now = thermo
        .received_at
        .format_with_items(items.iter())
        .to_string();

    let mut lines = vec![
        format!("{now} thermo.ambient.temp:{}", round2(thermo.ambient_temp())),
        format!(
            "{now} thermo.ambient.humidity:{}",
            thermo.ambient_humidity_percent
        ),
        format!("{now} thermo.hvac.mode:{}", thermo.mode),
        format!("{now} thermo.hvac.status:{}", thermo.hvac_status),
    ];
    match thermo.setpoint() {
        Some(Setpoint::Single(target)) => {
            lines.push(format!("{now} thermo.hvac.setpoint:{target:.0}"));
        },
        Some(Setpoint::Range { heat, cool }) => {
            lines.push(format!("{now} thermo.hvac.setpoint:{heat:.0}/{cool:.0}"));
        },
        None => {},
    }
    Ok(lines)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        chrono::{Local, TimeZone},
        serde_json::json,
    };

    fn thermostat(mode: &str, scale: &str) -> Thermostat {
        let received_at = Local.with_ymd_and_hms(2026, 10, 18, 9, 15, 2).unwrap();
        Thermostat::from_value(
            json!({
                "name": "enterprises/p/devices/T1",
                "type": "sdm.devices.types.THERMOSTAT",
                "traits": {
                    "sdm.devices.traits.Humidity": { "ambientHumidityPercent": 44 },
                    "sdm.devices.traits.ThermostatMode": { "mode": mode },
                    "sdm.devices.traits.ThermostatHvac": { "status": "HEATING" },
                    "sdm.devices.traits.Settings": { "temperatureScale": scale },
                    "sdm.devices.traits.ThermostatTemperatureSetpoint": {
                        "heatCelsius": 20.4,
                        "coolCelsius": 24.6
                    },
                    "sdm.devices.traits.Temperature": { "ambientTemperatureCelsius": 21.456 }
                }
            }),
            received_at,
        )
        .unwrap()
    }

    #[test]
    fn renders_heat_mode_lines() {
        let lines = thermostat_lines(&thermostat("HEAT", "CELSIUS"), "%Y-%m-%dT%H:%M:%S").unwrap();
        assert_eq!(lines, vec![
            "2026-10-18T09:15:02 thermo.ambient.temp:21.46",
            "2026-10-18T09:15:02 thermo.ambient.humidity:44",
            "2026-10-18T09:15:02 thermo.hvac.mode:HEAT",
            "2026-10-18T09:15:02 thermo.hvac.status:HEATING",
            "2026-10-18T09:15:02 thermo.hvac.setpoint:20",
        ]);
    }

    #[test]
    fn heatcool_renders_range_in_display_scale() {
        let lines = thermostat_lines(&thermostat("HEATCOOL", "FAHRENHEIT"), "%H:%M").unwrap();
        assert_eq!(lines[0], "09:15 thermo.ambient.temp:70.62");
        assert_eq!(lines[4], "09:15 thermo.hvac.setpoint:69/76");
    }

    #[test]
    fn off_mode_omits_setpoint() {
        let lines = thermostat_lines(&thermostat("OFF", "CELSIUS"), "%H:%M").unwrap();
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|l| !l.contains("setpoint")));
    }

    #[test]
    fn rejects_bad_time_format() {
        let err = thermostat_lines(&thermostat("HEAT", "CELSIUS"), "%Q").unwrap_err();
        assert_eq!(err.0, "%Q");
    }

    #[test]
    fn default_format_is_rss_like() {
        let lines = thermostat_lines(&thermostat("HEAT", "CELSIUS"), DEFAULT_TIME_FORMAT).unwrap();
        assert!(lines[0].starts_with("Sun, 18 Oct 2026 09:15:02 "), "{}", lines[0]);
    }
}
