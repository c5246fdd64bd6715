use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

use crate::config::Config;

/// Events surfaced from the front-end process.
#[derive(Debug, PartialEq)]
pub enum UiEvent {
    PttDown,
    PttUp,
}

/// Local UDP link to the front-end process.
///
/// The UI sends one-line commands (`ptt:down`, `ptt:up`); the core pushes
/// JSON state and presence strings back for display. Both directions are
/// datagrams on loopback, ports from the [ui] config section.
pub struct UiBridge {
    socket: Arc<UdpSocket>,
    target_addr: String,
    buffer_size: usize,
    tx: mpsc::Sender<UiEvent>,
}

impl UiBridge {
    pub async fn new(config: &Config, tx: mpsc::Sender<UiEvent>) -> anyhow::Result<Self> {
        let socket = UdpSocket::bind(format!("127.0.0.1:{}", config.ui_local_port)).await?;
        let target_addr = format!("127.0.0.1:{}", config.ui_remote_port);

        Ok(Self {
            socket: Arc::new(socket),
            target_addr,
            buffer_size: config.ui_buffer_size,
            tx,
        })
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let mut buf = vec![0u8; self.buffer_size];
        loop {
            let (len, _) = self.socket.recv_from(&mut buf).await?;
            if len == 0 {
                continue;
            }
            let Ok(msg) = std::str::from_utf8(&buf[..len]) else {
                log::warn!("Dropping non-UTF8 UI datagram ({} bytes)", len);
                continue;
            };
            let Some(event) = parse_command(msg) else {
                log::warn!("Unknown UI command: {}", msg.trim());
                continue;
            };
            if self.tx.send(event).await.is_err() {
                log::error!("UI event channel closed");
                break;
            }
        }
        Ok(())
    }

    /// Push a status/presence message to the UI process.
    pub async fn send_message(&self, msg: &str) -> anyhow::Result<()> {
        self.socket.send_to(msg.as_bytes(), &self.target_addr).await?;
        Ok(())
    }
}

fn parse_command(msg: &str) -> Option<UiEvent> {
    match msg.trim() {
        "ptt:down" => Some(UiEvent::PttDown),
        "ptt:up" => Some(UiEvent::PttUp),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ptt_commands() {
        assert_eq!(parse_command("ptt:down"), Some(UiEvent::PttDown));
        assert_eq!(parse_command("ptt:up\n"), Some(UiEvent::PttUp));
        assert_eq!(parse_command("volume:3"), None);
    }
}
