use std::sync::Arc;

use tokio::sync::mpsc;

use crate::audio::{AudioSystem, PlayCommand};
use crate::net_link::{NetCommand, NetEvent};
use crate::protocol::ServerMessage;
use crate::ui_bridge::{UiBridge, UiEvent};

/// Half-duplex channel state as this client sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelState {
    Idle,
    /// We hold (or have optimistically requested) the floor.
    Transmitting,
    /// Another station holds the floor.
    Receiving,
}

/// Glue between the transport, the floor-control protocol, the UI bridge
/// and the audio pipeline. All handling runs on the main task; each audio
/// thread owns its own state, so nothing here needs a lock.
pub struct CoreController {
    state: ChannelState,
    net_tx: mpsc::Sender<NetCommand>,
    play_tx: mpsc::Sender<PlayCommand>,
    voice_tx: mpsc::Sender<Vec<u8>>,
    ui_bridge: Arc<UiBridge>,
    audio: AudioSystem,
}

impl CoreController {
    pub fn new(
        net_tx: mpsc::Sender<NetCommand>,
        play_tx: mpsc::Sender<PlayCommand>,
        voice_tx: mpsc::Sender<Vec<u8>>,
        ui_bridge: Arc<UiBridge>,
        audio: AudioSystem,
    ) -> Self {
        Self {
            state: ChannelState::Idle,
            net_tx,
            play_tx,
            voice_tx,
            ui_bridge,
            audio,
        }
    }

    pub async fn handle_net_event(&mut self, event: NetEvent) {
        match event {
            NetEvent::Text(text) => self.process_server_text(text).await,
            NetEvent::Binary(data) => {
                // Voice payload from whoever holds the floor; the playback
                // thread reassembles, decodes and schedules it.
                if let Err(e) = self.play_tx.send(PlayCommand::Payload(data)).await {
                    log::error!("Failed to forward voice payload: {}", e);
                }
            }
            NetEvent::Connected => {
                log::info!("Channel link up");
                self.state = ChannelState::Idle;
                self.notify_ui(r#"{"type":"link","state":"connected"}"#).await;
            }
            NetEvent::Disconnected => {
                log::info!("Channel link down");
                // A stale half-sample must never stitch onto the new stream
                self.audio.stop_capture();
                let _ = self.play_tx.send(PlayCommand::Reset).await;
                self.state = ChannelState::Idle;
                self.notify_ui(r#"{"type":"link","state":"disconnected"}"#).await;
            }
        }
    }

    async fn process_server_text(&mut self, text: String) {
        let msg: ServerMessage = match serde_json::from_str(&text) {
            Ok(msg) => msg,
            Err(e) => {
                log::warn!("Unparseable server message ({}): {}", e, text);
                return;
            }
        };

        match msg.msg_type.as_str() {
            "system:talking" => {
                if self.state != ChannelState::Transmitting {
                    self.state = ChannelState::Receiving;
                }
                log::info!(
                    "{} transmitting",
                    msg.callsign.as_deref().unwrap_or("unknown")
                );
            }
            "system:over" => {
                if self.state == ChannelState::Receiving {
                    self.state = ChannelState::Idle;
                }
                // Channel went idle; forget the schedule so the next
                // transmission starts from a fresh resync.
                let _ = self.play_tx.send(PlayCommand::Reset).await;
            }
            "ptt-denied" | "ptt-already" => {
                log::warn!(
                    "Floor denied: {}",
                    msg.reason.as_deref().unwrap_or("already transmitting")
                );
                self.audio.stop_capture();
                if self.state == ChannelState::Transmitting {
                    self.state = ChannelState::Idle;
                }
            }
            "system:join" | "system:out" | "online:list" => {
                // Presence only concerns the display
                if let Some(users) = &msg.users {
                    let roster: Vec<&str> = users.iter().map(|u| u.callsign.as_str()).collect();
                    log::debug!("Online: {:?}", roster);
                }
            }
            "error" => {
                log::error!(
                    "Server error: {}",
                    msg.error.as_deref().unwrap_or("unspecified")
                );
            }
            other => {
                log::debug!("Unhandled message type: {}", other);
            }
        }

        // The UI renders presence and floor events itself; forward verbatim
        self.notify_ui(&text).await;
    }

    /// PTT edge from the UI. Device acquisition failure is fatal to the
    /// session and propagates out of here.
    pub async fn handle_ui_event(&mut self, event: UiEvent) -> anyhow::Result<()> {
        match event {
            UiEvent::PttDown => {
                if self.state != ChannelState::Idle {
                    return Ok(());
                }
                // Request the floor and start capturing optimistically; on
                // denial the server answers ptt-denied and capture stops.
                self.send_control(r#"{"type":"request-talk"}"#).await;
                self.audio.start_capture(self.voice_tx.clone())?;
                self.state = ChannelState::Transmitting;
            }
            UiEvent::PttUp => {
                if self.state != ChannelState::Transmitting {
                    return Ok(());
                }
                self.send_control(r#"{"type":"release-talk"}"#).await;
                self.audio.stop_capture();
                self.state = ChannelState::Idle;
            }
        }
        Ok(())
    }

    /// One completed wire frame from the capture thread.
    pub async fn handle_capture_frame(&mut self, payload: Vec<u8>) {
        // Frames racing the stop edge are dropped; only a floor holder
        // transmits.
        if self.state != ChannelState::Transmitting {
            return;
        }
        if let Err(e) = self.net_tx.send(NetCommand::SendBinary(payload)).await {
            log::error!("Failed to send voice frame: {}", e);
        }
    }

    async fn send_control(&self, json: &str) {
        if let Err(e) = self.net_tx.send(NetCommand::SendText(json.to_string())).await {
            log::error!("Failed to send control message: {}", e);
        }
    }

    async fn notify_ui(&self, msg: &str) {
        if let Err(e) = self.ui_bridge.send_message(msg).await {
            log::warn!("Failed to notify UI: {}", e);
        }
    }

    /// Tear down the audio paths. Already-scheduled playback drains on its
    /// own; no new frames are accepted after this.
    pub fn shutdown(&mut self) {
        self.audio.stop();
    }
}
