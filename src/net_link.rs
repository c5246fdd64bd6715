use crate::audio::{FRAME_SAMPLES, TARGET_SAMPLE_RATE};
use crate::config::Config;
use crate::protocol::HelloMessage;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use url::Url;

#[derive(Debug)]
pub enum NetEvent {
    Text(String),
    Binary(Vec<u8>),
    Connected,
    Disconnected,
}

#[derive(Debug)]
pub enum NetCommand {
    SendText(String),
    SendBinary(Vec<u8>),
}

/// WebSocket link to the channel server.
///
/// Text frames carry JSON control messages, binary frames carry raw voice
/// payloads. Retry/backoff for a broken connection lives here; the audio
/// pipeline only ever sees Connected/Disconnected edges.
pub struct NetLink {
    config: Config,
    tx: mpsc::Sender<NetEvent>,
    rx_cmd: mpsc::Receiver<NetCommand>,
}

impl NetLink {
    pub fn new(
        config: Config,
        tx: mpsc::Sender<NetEvent>,
        rx_cmd: mpsc::Receiver<NetCommand>,
    ) -> Self {
        Self { config, tx, rx_cmd }
    }

    /// Connect and serve until shutdown, reconnecting with exponential
    /// backoff (1 s doubling, capped at 60 s) after every drop.
    pub async fn run(mut self) {
        let mut retry_delay = 1;
        loop {
            match self.connect_and_loop().await {
                Err(e) => {
                    log::warn!("Connection error: {}. Retrying in {}s...", e, retry_delay);
                    let _ = self.tx.send(NetEvent::Disconnected).await;
                    tokio::time::sleep(tokio::time::Duration::from_secs(retry_delay)).await;
                    retry_delay = std::cmp::min(retry_delay * 2, 60);
                }
                // Ok means clean shutdown: the command channel closed.
                Ok(()) => break,
            }
        }
    }

    async fn connect_and_loop(&mut self) -> anyhow::Result<()> {
        let url = Url::parse(self.config.ws_url)?;
        let host = url.host_str().unwrap_or_default().to_string();

        let request = tokio_tungstenite::tungstenite::http::Request::builder()
            .method("GET")
            .uri(self.config.ws_url)
            .header("Host", host)
            .header("Connection", "Upgrade")
            .header("Upgrade", "websocket")
            .header("Sec-WebSocket-Version", "13")
            .header(
                "Sec-WebSocket-Key",
                tokio_tungstenite::tungstenite::handshake::client::generate_key(),
            )
            .header("Authorization", format!("Bearer {}", self.config.ws_token))
            .header("Device-Id", &self.config.device_id)
            .header("Client-Id", &self.config.client_id)
            .header("Protocol-Version", "1")
            .body(())?;

        log::info!("Connecting to {}...", self.config.ws_url);
        let (ws_stream, _) = connect_async(request).await?;
        log::info!("Connected");

        let (mut write, mut read) = ws_stream.split();

        self.tx.send(NetEvent::Connected).await?;

        // Declare identity and the wire audio format before any voice bytes
        let frame_duration_ms = (FRAME_SAMPLES as u32 * 1000) / TARGET_SAMPLE_RATE;
        let hello = HelloMessage::new(self.config.callsign, TARGET_SAMPLE_RATE, frame_duration_ms);
        let hello_json = serde_json::to_string(&hello)?;
        log::debug!("Sending hello: {}", hello_json);
        write.send(Message::Text(hello_json.into())).await?;

        loop {
            tokio::select! {
                msg = read.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            self.tx.send(NetEvent::Text(text.to_string())).await?;
                        }
                        Some(Ok(Message::Binary(data))) => {
                            self.tx.send(NetEvent::Binary(data.to_vec())).await?;
                        }
                        Some(Ok(Message::Close(frame))) => {
                            log::info!("Server closed connection: {:?}", frame);
                            return Err(anyhow::anyhow!("Connection closed"));
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => return Err(e.into()),
                        None => return Err(anyhow::anyhow!("Connection closed")),
                    }
                }
                cmd = self.rx_cmd.recv() => {
                    match cmd {
                        Some(NetCommand::SendText(text)) => {
                            write.send(Message::Text(text.into())).await?;
                        }
                        Some(NetCommand::SendBinary(data)) => {
                            write.send(Message::Binary(Bytes::from(data))).await?;
                        }
                        None => return Ok(()),
                    }
                }
            }
        }
    }
}
