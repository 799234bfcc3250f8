//! Transportes de referência
//!
//! Todos recebem o JSON da leitura pronto. [`NodeTransport`] escolhe a
//! implementação a partir da configuração do dispositivo.

pub mod http;
pub mod mqtt;
pub mod serial;

pub use http::HttpTransport;
pub use mqtt::MqttTransport;
pub use serial::SerialEcho;

use udara_core::traits::{Component, Transport, TransportError, TransportStatus};

use crate::config::TransportConfig;

/// Transporte selecionado pelo documento de configuração
#[derive(Debug)]
pub enum NodeTransport {
    Serial(SerialEcho<std::io::Stdout>),
    Http(HttpTransport),
    Mqtt(MqttTransport),
}

impl NodeTransport {
    /// Constrói o transporte; `timeout_ms` é o orçamento de um envio
    pub fn from_config(config: &TransportConfig, timeout_ms: u64) -> Self {
        match config {
            TransportConfig::Serial => NodeTransport::Serial(SerialEcho::stdout()),
            TransportConfig::Http { url } => NodeTransport::Http(HttpTransport::new(url.clone(), timeout_ms)),
            TransportConfig::Mqtt(settings) => NodeTransport::Mqtt(MqttTransport::connect(settings, timeout_ms)),
        }
    }

    fn inner(&self) -> &dyn Transport {
        match self {
            NodeTransport::Serial(t) => t,
            NodeTransport::Http(t) => t,
            NodeTransport::Mqtt(t) => t,
        }
    }
}

impl Component for NodeTransport {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn is_ready(&self) -> bool {
        self.inner().is_ready()
    }
}

impl Transport for NodeTransport {
    fn send(&mut self, payload: &str) -> Result<(), TransportError> {
        match self {
            NodeTransport::Serial(t) => t.send(payload),
            NodeTransport::Http(t) => t.send(payload),
            NodeTransport::Mqtt(t) => t.send(payload),
        }
    }

    fn status(&self) -> TransportStatus {
        self.inner().status()
    }
}
