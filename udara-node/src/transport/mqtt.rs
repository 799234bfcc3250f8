//! Transporte MQTT: publica cada leitura num tópico fixo
//!
//! O event loop do `rumqttc` roda numa thread própria e só mantém a flag de
//! conexão. `send` nunca bloqueia: sem broker, ou com a fila de requisições
//! cheia, o envio falha na hora.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{Client, Event, MqttOptions, Packet, QoS};
use udara_core::traits::{Component, Transport, TransportError, TransportStatus};

use crate::config::MqttSettings;

/// Requisições pendentes entre `send` e o event loop
const REQUEST_CAPACITY: usize = 16;

/// Publicador MQTT
pub struct MqttTransport {
    client: Client,
    topic: String,
    connected: Arc<AtomicBool>,
    published: u64,
}

impl std::fmt::Debug for MqttTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttTransport")
            .field("topic", &self.topic)
            .field("connected", &self.connected.load(Ordering::Relaxed))
            .field("published", &self.published)
            .finish()
    }
}

impl MqttTransport {
    /// Conecta em segundo plano; `timeout_ms` limita a espera por resposta do broker
    pub fn connect(settings: &MqttSettings, timeout_ms: u64) -> Self {
        let mut opts = MqttOptions::new(&settings.client_id, &settings.host, settings.port);
        opts.set_keep_alive(Duration::from_secs(30));

        if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
            opts.set_credentials(user, pass);
        } else if let Some(user) = &settings.username {
            opts.set_credentials(user, "");
        }

        let (client, mut connection) = Client::new(opts, REQUEST_CAPACITY);
        let connected = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&connected);
        let host = settings.host.clone();
        let retry = Duration::from_millis(timeout_ms.max(100));

        std::thread::spawn(move || {
            for notification in connection.iter() {
                match notification {
                    Ok(Event::Incoming(Packet::ConnAck(_))) => {
                        flag.store(true, Ordering::SeqCst);
                        tracing::info!(%host, "mqtt connected");
                    }
                    Ok(_) => {}
                    Err(e) => {
                        if flag.swap(false, Ordering::SeqCst) {
                            tracing::warn!(%host, error = %e, "mqtt connection lost");
                        } else {
                            tracing::debug!(%host, error = %e, "mqtt connect attempt failed");
                        }
                        std::thread::sleep(retry);
                    }
                }
            }
            tracing::debug!(%host, "mqtt event loop stopped");
        });

        Self {
            client,
            topic: settings.topic.clone(),
            connected,
            published: 0,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Mensagens entregues ao event loop
    pub fn published(&self) -> u64 {
        self.published
    }
}

impl Component for MqttTransport {
    fn name(&self) -> &str {
        "mqtt"
    }

    fn is_ready(&self) -> bool {
        self.is_connected()
    }
}

impl Transport for MqttTransport {
    fn send(&mut self, payload: &str) -> Result<(), TransportError> {
        if !self.is_connected() {
            return Err(TransportError::ConnectionFailed("broker not connected".into()));
        }

        self.client
            .try_publish(self.topic.as_str(), QoS::AtLeastOnce, false, payload.as_bytes().to_vec())
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;

        self.published += 1;
        Ok(())
    }

    fn status(&self) -> TransportStatus {
        if self.is_connected() {
            TransportStatus::Ready
        } else {
            TransportStatus::Connecting
        }
    }
}
