mod audio;
mod config;
mod controller;
mod net_link;
mod protocol;
mod ui_bridge;

use std::sync::Arc;

use mac_address::get_mac_address;
use tokio::signal;
use tokio::sync::mpsc;
use uuid::Uuid;

use audio::{AudioConfig, AudioSystem, CaptureConstraints, PlayCommand};
use config::Config;
use controller::CoreController;
use net_link::{NetCommand, NetEvent, NetLink};
use ui_bridge::{UiBridge, UiEvent};

const CLIENT_ID_FILE: &str = "pttc_client_id.txt";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut config = Config::new().unwrap_or_default();

    // Device id defaults to the primary MAC so reconnects keep identity
    if config.device_id == "unknown-device" {
        config.device_id = match get_mac_address() {
            Ok(Some(mac)) => mac.to_string().to_lowercase(),
            _ => Uuid::new_v4().to_string(),
        };
    }

    // Client id is generated once and persisted across restarts
    if config.client_id == "unknown-client" {
        if let Ok(content) = std::fs::read_to_string(CLIENT_ID_FILE) {
            let trimmed = content.trim();
            if !trimmed.is_empty() {
                config.client_id = trimmed.to_string();
                log::info!("Loaded client id from {}", CLIENT_ID_FILE);
            }
        }
    }
    if config.client_id == "unknown-client" {
        config.client_id = Uuid::new_v4().to_string();
        log::info!("Generated new client id: {}", config.client_id);
        if let Err(e) = std::fs::write(CLIENT_ID_FILE, &config.client_id) {
            log::warn!("Failed to persist client id: {}", e);
        }
    }

    // Channel wiring between the components
    let (tx_net_event, mut rx_net_event) = mpsc::channel::<NetEvent>(100);
    let (tx_net_cmd, rx_net_cmd) = mpsc::channel::<NetCommand>(100);
    let (tx_ui_event, mut rx_ui_event) = mpsc::channel::<UiEvent>(100);
    let (tx_voice, mut rx_voice) = mpsc::channel::<Vec<u8>>(100);
    let (tx_play, rx_play) = mpsc::channel::<PlayCommand>(100);

    // UI bridge first, so connect progress is visible
    let ui_bridge = Arc::new(UiBridge::new(&config, tx_ui_event).await?);
    let ui_bridge_task = ui_bridge.clone();
    tokio::spawn(async move {
        if let Err(e) = ui_bridge_task.run().await {
            log::error!("UiBridge error: {}", e);
        }
    });

    // Playback device opens now; a missing output device is fatal
    let audio_config = AudioConfig {
        capture_device: config.capture_device.to_string(),
        playback_device: config.playback_device.to_string(),
        capture_sample_rate: config.capture_sample_rate,
        capture_channels: config.capture_channels,
        playback_period_size: config.playback_period_size,
        constraints: CaptureConstraints {
            echo_cancellation: config.echo_cancellation,
            noise_suppression: config.noise_suppression,
            auto_gain_control: config.auto_gain_control,
        },
    };
    let audio = AudioSystem::start(audio_config, rx_play)?;

    let net_link = NetLink::new(config.clone(), tx_net_event, rx_net_cmd);
    tokio::spawn(async move {
        net_link.run().await;
    });

    let mut controller = CoreController::new(tx_net_cmd, tx_play, tx_voice, ui_bridge, audio);
    log::info!("pttc core started as {}", config.callsign);

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                log::info!("Received Ctrl+C, shutting down...");
                break;
            }

            Some(event) = rx_net_event.recv() => {
                controller.handle_net_event(event).await;
            }

            Some(event) = rx_ui_event.recv() => {
                if let Err(e) = controller.handle_ui_event(event).await {
                    log::error!("Fatal audio error: {:#}", e);
                    break;
                }
            }

            Some(frame) = rx_voice.recv() => {
                controller.handle_capture_frame(frame).await;
            }
        }
    }

    controller.shutdown();
    Ok(())
}
