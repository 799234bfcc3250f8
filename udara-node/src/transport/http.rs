//! Transporte HTTP: POST do JSON da leitura

use std::time::Duration;
use udara_core::traits::{Component, Transport, TransportError, TransportStatus};

/// POST de cada leitura numa URL fixa
#[derive(Debug)]
pub struct HttpTransport {
    agent: ureq::Agent,
    url: String,
    timeout_ms: u64,
    status: TransportStatus,
}

impl HttpTransport {
    /// O timeout do agente cobre conexão, envio e resposta
    pub fn new(url: impl Into<String>, timeout_ms: u64) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_millis(timeout_ms))
            .build();

        Self {
            agent,
            url: url.into(),
            timeout_ms,
            status: TransportStatus::Ready,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }
}

impl Component for HttpTransport {
    fn name(&self) -> &str {
        "http"
    }
}

impl Transport for HttpTransport {
    fn send(&mut self, payload: &str) -> Result<(), TransportError> {
        let result = self
            .agent
            .post(&self.url)
            .set("Content-Type", "application/json")
            .send_string(payload);

        let outcome = match result {
            Ok(response) if (200..300).contains(&response.status()) => Ok(()),
            Ok(response) => Err(TransportError::Rejected(format!("HTTP {}", response.status()))),
            Err(ureq::Error::Status(code, _)) => Err(TransportError::Rejected(format!("HTTP {code}"))),
            Err(ureq::Error::Transport(t)) => {
                if t.kind() == ureq::ErrorKind::ConnectionFailed || t.kind() == ureq::ErrorKind::Dns {
                    Err(TransportError::ConnectionFailed(t.to_string()))
                } else {
                    Err(TransportError::SendFailed(t.to_string()))
                }
            }
        };

        self.status = if outcome.is_ok() {
            TransportStatus::Ready
        } else {
            TransportStatus::Fault
        };
        outcome
    }

    fn status(&self) -> TransportStatus {
        self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreachable_endpoint_is_connection_failure() {
        // Porta 9 (discard) em loopback: conexão recusada sem rede externa
        let mut transport = HttpTransport::new("http://127.0.0.1:9/readings", 500);
        let result = transport.send("{}");
        assert!(result.is_err());
        assert_eq!(transport.status(), TransportStatus::Fault);
    }

    #[test]
    fn test_accessors() {
        let transport = HttpTransport::new("https://api.example/readings", 5000);
        assert_eq!(transport.url(), "https://api.example/readings");
        assert_eq!(transport.timeout_ms(), 5000);
        assert_eq!(transport.name(), "http");
    }
}
