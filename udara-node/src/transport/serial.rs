//! Eco serial: uma linha JSON por leitura

use std::io::Write;
use udara_core::traits::{Component, Transport, TransportError, TransportStatus};

/// Escreve cada payload como uma linha em qualquer `Write`
#[derive(Debug)]
pub struct SerialEcho<W: Write + Send + std::fmt::Debug> {
    out: W,
    lines: u64,
    status: TransportStatus,
}

impl SerialEcho<std::io::Stdout> {
    /// Eco na saída padrão
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send + std::fmt::Debug> SerialEcho<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            lines: 0,
            status: TransportStatus::Ready,
        }
    }

    /// Linhas escritas
    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send + std::fmt::Debug> Component for SerialEcho<W> {
    fn name(&self) -> &str {
        "serial"
    }
}

impl<W: Write + Send + std::fmt::Debug> Transport for SerialEcho<W> {
    fn send(&mut self, payload: &str) -> Result<(), TransportError> {
        let result = writeln!(self.out, "{payload}").and_then(|_| self.out.flush());
        match result {
            Ok(()) => {
                self.lines += 1;
                self.status = TransportStatus::Ready;
                Ok(())
            }
            Err(e) => {
                self.status = TransportStatus::Fault;
                Err(TransportError::SendFailed(e.to_string()))
            }
        }
    }

    fn status(&self) -> TransportStatus {
        self.status
    }
}
