//! Documento de configuração do dispositivo
//!
//! Chega por provisionamento como JSON. É lido numa forma crua (todos os
//! campos opcionais) e validado uma única vez numa configuração tipada;
//! a validação lista todos os campos ausentes ou inválidos de uma vez.
//! Nenhum parâmetro de transporte recebe valor padrão silencioso.
//!
//! ```json
//! {
//!   "device_id": "udara-07",
//!   "sensor_type": "MQ135-MQ7-MQ9",
//!   "protocol": "mqtt",
//!   "interval_ms": 5000,
//!   "mqtt": { "host": "broker.local", "port": 1883, "topic": "udara/07", "client_id": "udara-07" },
//!   "wifi": { "ssid": "lab", "password": "..." }
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use udara_core::io::EepromError;
use udara_orchestration::{DeviceIdentity, MIN_INTERVAL_MS};

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Um problema encontrado na validação
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Caminho do campo (`mqtt.port`)
    pub field: String,
    pub problem: String,
}

impl ConfigIssue {
    fn new(field: &str, problem: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            problem: problem.into(),
        }
    }

    fn missing(field: &str) -> Self {
        Self::new(field, "is required")
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.problem)
    }
}

/// Erros de configuração
#[derive(Debug, Error, Clone)]
pub enum ConfigError {
    #[error("Configuration is not valid JSON: {0}")]
    Parse(String),

    #[error("Configuration invalid: {}", format_issues(.0))]
    Invalid(Vec<ConfigIssue>),

    #[error("Stored configuration corrupt: {0}")]
    Corrupt(String),

    #[error("Storage error: {0}")]
    Storage(#[from] EepromError),

    #[error("Lock poisoned: {0}")]
    LockPoisoned(String),
}

fn format_issues(issues: &[ConfigIssue]) -> String {
    issues.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ConfigError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        ConfigError::LockPoisoned(err.to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FORMA CRUA
// ═══════════════════════════════════════════════════════════════════════════════

/// Documento como recebido
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDeviceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sensor_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<RawHttp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mqtt: Option<RawMqtt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wifi: Option<WifiCredentials>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHttp {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMqtt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

/// Credenciais de rede; o nó só as guarda e repassa
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WifiCredentials {
    pub ssid: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for WifiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WifiCredentials")
            .field("ssid", &self.ssid)
            .field("password", &"***")
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FORMA TIPADA
// ═══════════════════════════════════════════════════════════════════════════════

/// Parâmetros do broker MQTT
#[derive(Clone, PartialEq, Eq)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub topic: String,
    pub client_id: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for MqttSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("topic", &self.topic)
            .field("client_id", &self.client_id)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Transporte selecionado
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    Http { url: String },
    Mqtt(MqttSettings),
    /// Uma linha JSON por leitura na saída padrão
    Serial,
}

impl TransportConfig {
    pub fn protocol(&self) -> &'static str {
        match self {
            TransportConfig::Http { .. } => "http",
            TransportConfig::Mqtt(_) => "mqtt",
            TransportConfig::Serial => "serial",
        }
    }
}

/// Configuração validada
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceConfiguration {
    identity: DeviceIdentity,
    interval_ms: u64,
    transport: TransportConfig,
    wifi: Option<WifiCredentials>,
}

impl DeviceConfiguration {
    /// Lê e valida um documento JSON
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let raw: RawDeviceConfig = serde_json::from_str(json)?;
        Self::validate(raw)
    }

    /// Valida a forma crua, reportando todos os problemas
    pub fn validate(raw: RawDeviceConfig) -> ConfigResult<Self> {
        let mut issues = Vec::new();

        let device_id = required_text(&mut issues, "device_id", raw.device_id);
        let sensor_type = required_text(&mut issues, "sensor_type", raw.sensor_type);

        let interval_ms = match raw.interval_ms {
            None => {
                issues.push(ConfigIssue::missing("interval_ms"));
                None
            }
            Some(ms) if ms < MIN_INTERVAL_MS => {
                issues.push(ConfigIssue::new(
                    "interval_ms",
                    format!("must be at least {MIN_INTERVAL_MS}"),
                ));
                None
            }
            Some(ms) => Some(ms),
        };

        let transport = match raw.protocol.as_deref().map(str::trim) {
            None | Some("") => {
                issues.push(ConfigIssue::missing("protocol"));
                None
            }
            Some("http") => validate_http(&mut issues, raw.http),
            Some("mqtt") => validate_mqtt(&mut issues, raw.mqtt),
            Some("serial") => Some(TransportConfig::Serial),
            Some(other) => {
                issues.push(ConfigIssue::new(
                    "protocol",
                    format!("must be one of http, mqtt, serial (got '{other}')"),
                ));
                None
            }
        };

        if let Some(wifi) = &raw.wifi {
            if wifi.ssid.trim().is_empty() {
                issues.push(ConfigIssue::new("wifi.ssid", "must not be empty"));
            }
        }

        match (device_id, sensor_type, interval_ms, transport) {
            (Some(device_id), Some(sensor_type), Some(interval_ms), Some(transport)) if issues.is_empty() => {
                Ok(Self {
                    identity: DeviceIdentity::new(device_id, sensor_type),
                    interval_ms,
                    transport,
                    wifi: raw.wifi,
                })
            }
            _ => Err(ConfigError::Invalid(issues)),
        }
    }

    pub fn identity(&self) -> &DeviceIdentity {
        &self.identity
    }

    pub fn device_id(&self) -> &str {
        &self.identity.device_id
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    pub fn transport(&self) -> &TransportConfig {
        &self.transport
    }

    pub fn wifi(&self) -> Option<&WifiCredentials> {
        self.wifi.as_ref()
    }

    /// Volta à forma de documento (para persistir)
    pub fn to_raw(&self) -> RawDeviceConfig {
        let (http, mqtt) = match &self.transport {
            TransportConfig::Http { url } => (Some(RawHttp { url: Some(url.clone()) }), None),
            TransportConfig::Mqtt(m) => (
                None,
                Some(RawMqtt {
                    host: Some(m.host.clone()),
                    port: Some(m.port as u32),
                    topic: Some(m.topic.clone()),
                    client_id: Some(m.client_id.clone()),
                    username: m.username.clone(),
                    password: m.password.clone(),
                }),
            ),
            TransportConfig::Serial => (None, None),
        };

        RawDeviceConfig {
            device_id: Some(self.identity.device_id.clone()),
            sensor_type: Some(self.identity.sensor_type.clone()),
            protocol: Some(self.transport.protocol().to_string()),
            interval_ms: Some(self.interval_ms),
            http,
            mqtt,
            wifi: self.wifi.clone(),
        }
    }

    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string(&self.to_raw())?)
    }
}

fn required_text(issues: &mut Vec<ConfigIssue>, field: &str, value: Option<String>) -> Option<String> {
    match value.map(|v| v.trim().to_string()) {
        None => {
            issues.push(ConfigIssue::missing(field));
            None
        }
        Some(v) if v.is_empty() => {
            issues.push(ConfigIssue::new(field, "must not be empty"));
            None
        }
        Some(v) => Some(v),
    }
}

fn validate_http(issues: &mut Vec<ConfigIssue>, http: Option<RawHttp>) -> Option<TransportConfig> {
    let Some(http) = http else {
        issues.push(ConfigIssue::new("http", "section is required for protocol http"));
        return None;
    };

    let url = required_text(issues, "http.url", http.url)?;
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        issues.push(ConfigIssue::new("http.url", "must start with http:// or https://"));
        return None;
    }

    Some(TransportConfig::Http { url })
}

fn validate_mqtt(issues: &mut Vec<ConfigIssue>, mqtt: Option<RawMqtt>) -> Option<TransportConfig> {
    let Some(mqtt) = mqtt else {
        issues.push(ConfigIssue::new("mqtt", "section is required for protocol mqtt"));
        return None;
    };

    let host = required_text(issues, "mqtt.host", mqtt.host);

    let port = match mqtt.port {
        None => {
            issues.push(ConfigIssue::missing("mqtt.port"));
            None
        }
        Some(p) => match u16::try_from(p) {
            Ok(p) if p > 0 => Some(p),
            _ => {
                issues.push(ConfigIssue::new("mqtt.port", "must be between 1 and 65535"));
                None
            }
        },
    };

    let topic = match required_text(issues, "mqtt.topic", mqtt.topic) {
        Some(t) if t.contains(['+', '#']) => {
            issues.push(ConfigIssue::new("mqtt.topic", "must not contain wildcards"));
            None
        }
        other => other,
    };

    let client_id = required_text(issues, "mqtt.client_id", mqtt.client_id);

    let username = mqtt.username.filter(|u| !u.is_empty());
    if mqtt.password.is_some() && username.is_none() {
        issues.push(ConfigIssue::new("mqtt.password", "requires mqtt.username"));
        return None;
    }

    Some(TransportConfig::Mqtt(MqttSettings {
        host: host?,
        port: port?,
        topic: topic?,
        client_id: client_id?,
        username,
        password: mqtt.password,
    }))
}
