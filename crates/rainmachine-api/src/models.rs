// Response models
//
// Typed shapes for the controller's JSON payloads. Commonly used fields are
// modelled explicitly; everything else lands in a flattened `extra` map
// because the field set varies between firmware releases.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// ── Acknowledgement ──────────────────────────────────────────────────

/// The `{ "statusCode": 0, "message": "OK" }` body returned by mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(rename = "statusCode", default)]
    pub status_code: i64,
    #[serde(default)]
    pub message: String,
}

impl Ack {
    pub fn is_ok(&self) -> bool {
        crate::error::LOCAL_SUCCESS_CODES.contains(&self.status_code)
    }
}

// ── Authentication ───────────────────────────────────────────────────

/// Local `auth/login` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LocalLoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

/// Cloud `login/auth` and `devices/login-sprinkler` responses.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
}

/// A device linked to a cloud account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprinkler {
    #[serde(rename = "sprinklerId", deserialize_with = "string_or_number")]
    pub sprinkler_id: String,
    pub mac: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct SprinklerList {
    #[serde(default)]
    pub sprinklers: Vec<Sprinkler>,
}

// ── Versions / identity ──────────────────────────────────────────────

/// `apiVer` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiVersions {
    #[serde(rename = "apiVer", deserialize_with = "string_or_number")]
    pub api_version: String,
    /// `"1"` identifies first-generation hardware. Older firmware sends a number.
    #[serde(rename = "hwVer", deserialize_with = "string_or_number")]
    pub hardware_version: String,
    #[serde(rename = "swVer", default, deserialize_with = "string_or_number")]
    pub software_version: String,
}

/// `provision/wifi` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiSettings {
    #[serde(rename = "macAddress")]
    pub mac_address: String,
    #[serde(rename = "ipAddress", default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub ssid: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DeviceName {
    pub name: String,
}

/// `provision` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionSettings {
    #[serde(default)]
    pub system: Map<String, Value>,
    #[serde(default)]
    pub location: Map<String, Value>,
}

// ── Programs ─────────────────────────────────────────────────────────

/// A watering program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub uid: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active: bool,
    /// 0 = not running, 1 = running, 2 = queued.
    #[serde(default)]
    pub status: u8,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Program {
    pub fn is_running(&self) -> bool {
        self.status == 1
    }
}

/// Entry of `program/nextrun`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextRun {
    pub pid: u32,
    #[serde(rename = "startTime", default)]
    pub start_time: Option<String>,
}

// ── Zones ────────────────────────────────────────────────────────────

/// A zone (valve) as reported by `zone` / `zone/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub uid: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub active: bool,
    /// 0 = idle, 1 = watering, 2 = queued.
    #[serde(default)]
    pub state: u8,
    /// Extended properties, present when fetched with details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<ZoneProperties>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Zone {
    pub fn is_running(&self) -> bool {
        self.state == 1
    }

    /// Attach extended properties. Property values win over base values
    /// for the fields both shapes carry.
    pub fn attach_properties(&mut self, properties: ZoneProperties) {
        if let Some(name) = properties.name.as_ref().filter(|n| !n.is_empty()) {
            self.name.clone_from(name);
        }
        if let Some(active) = properties.active {
            self.active = active;
        }
        self.properties = Some(properties);
    }
}

/// `zone/properties` / `zone/{id}/properties` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneProperties {
    pub uid: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(rename = "valveid", default)]
    pub valve_id: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Watering ─────────────────────────────────────────────────────────

/// One day of `watering/log` (`waterLog.days[]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterLogDay {
    #[serde(default)]
    pub date: String,
    /// Per-program breakdown; zone-level entries only with details.
    #[serde(default)]
    pub programs: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entry of `watering/past` (`pastValues[]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PastRun {
    #[serde(default)]
    pub pid: Option<u32>,
    #[serde(rename = "dateTime", default)]
    pub date_time: Option<String>,
    #[serde(default)]
    pub used: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entry of `watering/queue` (`queue[]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueuedRun {
    #[serde(default)]
    pub pid: Option<u32>,
    /// Zone id.
    #[serde(default)]
    pub zid: Option<u32>,
    #[serde(default)]
    pub running: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Statistics ───────────────────────────────────────────────────────

/// Entry of `dailystats` (`DailyStats[]` / `DailyStatsDetails[]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyStat {
    #[serde(default)]
    pub day: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Restrictions ─────────────────────────────────────────────────────

/// `restrictions/currently` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentRestrictions {
    #[serde(default)]
    pub hourly: bool,
    #[serde(default)]
    pub freeze: bool,
    #[serde(default)]
    pub month: bool,
    #[serde(rename = "weekDay", default)]
    pub week_day: bool,
    #[serde(rename = "rainDelay", default)]
    pub rain_delay: bool,
    #[serde(rename = "rainDelayCounter", default)]
    pub rain_delay_counter: i64,
    #[serde(rename = "rainSensor", default)]
    pub rain_sensor: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entry of `restrictions/hourly` (`hourlyRestrictions[]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyRestriction {
    pub uid: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "dayStartMinute", default)]
    pub day_start_minute: u32,
    #[serde(rename = "minuteDuration", default)]
    pub minute_duration: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `restrictions/raindelay` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RainDelay {
    /// Seconds of delay remaining; `-1` when no delay is active.
    #[serde(rename = "delayCounter")]
    pub delay_counter: i64,
}

// ── Machine ──────────────────────────────────────────────────────────

/// `machine/update` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmwareUpdate {
    #[serde(default)]
    pub update: bool,
    #[serde(rename = "updateStatus", default)]
    pub update_status: i64,
    #[serde(rename = "lastUpdateCheck", default)]
    pub last_update_check: Option<String>,
    #[serde(rename = "packageDetails", default)]
    pub package_details: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Parsers ──────────────────────────────────────────────────────────

/// A weather data parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parser {
    pub uid: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Helpers ──────────────────────────────────────────────────────────

/// Accept a JSON string or number and normalize to `String`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {other}"
        ))),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn versions_accept_numeric_hardware_version() {
        let v: ApiVersions =
            serde_json::from_value(json!({"apiVer": "4.5.0", "hwVer": 3, "swVer": "4.0.1144"}))
                .unwrap();
        assert_eq!(v.hardware_version, "3");
        assert_eq!(v.api_version, "4.5.0");

        let gen1: ApiVersions =
            serde_json::from_value(json!({"apiVer": "4.1.0", "hwVer": "1", "swVer": "4.0.9"}))
                .unwrap();
        assert_eq!(gen1.hardware_version, "1");
    }

    #[test]
    fn zone_properties_override_base_fields() {
        let mut zone: Zone = serde_json::from_value(json!({
            "uid": 2, "name": "Zone 2", "active": false, "state": 0, "userDuration": 0
        }))
        .unwrap();
        let props: ZoneProperties = serde_json::from_value(json!({
            "uid": 2, "name": "Front Lawn", "active": true, "valveid": 2, "soil": 5
        }))
        .unwrap();

        zone.attach_properties(props);

        assert_eq!(zone.name, "Front Lawn");
        assert!(zone.active);
        let props = zone.properties.as_ref().unwrap();
        assert_eq!(props.valve_id, Some(2));
        assert_eq!(props.extra["soil"], json!(5));
        assert_eq!(zone.extra["userDuration"], json!(0));
    }

    #[test]
    fn unknown_program_fields_are_kept() {
        let p: Program = serde_json::from_value(json!({
            "uid": 1, "name": "Morning", "active": true, "startTime": "06:00", "status": 1
        }))
        .unwrap();
        assert!(p.is_running());
        assert_eq!(p.extra["startTime"], json!("06:00"));
    }

    #[test]
    fn ack_accepts_both_success_codes() {
        let ack: Ack = serde_json::from_value(json!({"statusCode": 0, "message": "OK"})).unwrap();
        assert!(ack.is_ok());
        let ack: Ack = serde_json::from_value(json!({"statusCode": 200, "message": "OK"})).unwrap();
        assert!(ack.is_ok());
    }
}
