//! The AudioSystem that manages the capture and playback threads.
//!
//! Uses std::thread (NOT tokio tasks) for real-time audio I/O to avoid
//! contention with async network tasks. Playback lives for the whole
//! session; capture is opened on floor grant and released synchronously on
//! floor release.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc as std_mpsc;
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use super::alsa_device::{self, CaptureConstraints};
use super::play::{PlayCommand, play_thread};
use super::record::record_thread;
use super::TARGET_SAMPLE_RATE;

/// Audio system configuration.
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// ALSA capture device name (e.g. "default", "plughw:0,0")
    pub capture_device: String,
    /// ALSA playback device name
    pub playback_device: String,
    /// Desired ALSA capture rate (hardware may negotiate; the framer
    /// downsamples whatever is granted)
    pub capture_sample_rate: u32,
    /// Desired ALSA capture channel count (downmixed to mono)
    pub capture_channels: u32,
    /// Desired ALSA playback period size in frames
    pub playback_period_size: usize,
    /// Capture hints forwarded to the device layer
    pub constraints: CaptureConstraints,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            capture_device: "default".to_string(),
            playback_device: "default".to_string(),
            capture_sample_rate: 48000,
            capture_channels: 1,
            playback_period_size: 512,
            constraints: CaptureConstraints {
                echo_cancellation: true,
                noise_suppression: true,
                auto_gain_control: true,
            },
        }
    }
}

struct CaptureSession {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Manages the two realtime threads. Each thread owns its device and all of
/// its mutable pipeline state; the only cross-domain edges are channels.
pub struct AudioSystem {
    config: AudioConfig,
    play_running: Arc<AtomicBool>,
    play_handle: Option<JoinHandle<()>>,
    capture: Option<CaptureSession>,
}

impl AudioSystem {
    /// Open the playback device and start the playback thread feeding from
    /// `play_rx`. Device acquisition failure (or a device that will not run
    /// at exactly 16 kHz mono — the receive path never resamples) is
    /// returned as an error before anything else starts.
    pub fn start(config: AudioConfig, play_rx: mpsc::Receiver<PlayCommand>) -> Result<Self> {
        let play_running = Arc::new(AtomicBool::new(true));

        let (ready_tx, ready_rx) = std_mpsc::channel::<Result<()>>();
        let play_handle = {
            let running = play_running.clone();
            let device = config.playback_device.clone();
            let period_size = config.playback_period_size;
            thread::Builder::new().name("audio-play".into()).spawn(move || {
                let (pcm, params) =
                    match alsa_device::open_playback(&device, TARGET_SAMPLE_RATE, 1, Some(period_size)) {
                        Ok(v) => v,
                        Err(e) => {
                            let _ = ready_tx.send(Err(e));
                            return;
                        }
                    };
                if params.sample_rate != TARGET_SAMPLE_RATE || params.channels != 1 {
                    let _ = ready_tx.send(Err(anyhow::anyhow!(
                        "Playback device '{}' negotiated {} Hz / {} ch, need {} Hz mono",
                        device,
                        params.sample_rate,
                        params.channels,
                        TARGET_SAMPLE_RATE,
                    )));
                    return;
                }
                let _ = ready_tx.send(Ok(()));
                if let Err(e) = play_thread(&pcm, &params, play_rx, &running) {
                    log::error!("Playback thread error: {}", e);
                }
            })?
        };
        ready_rx
            .recv()
            .context("Playback thread exited before reporting device status")??;

        Ok(Self {
            config,
            play_running,
            play_handle: Some(play_handle),
            capture: None,
        })
    }

    /// Acquire the microphone and start streaming wire frames into
    /// `voice_tx`. A failed acquisition surfaces here, before the floor is
    /// used. No-op when capture is already running.
    pub fn start_capture(&mut self, voice_tx: mpsc::Sender<Vec<u8>>) -> Result<()> {
        if self.capture.is_some() {
            return Ok(());
        }

        let running = Arc::new(AtomicBool::new(true));
        let (ready_tx, ready_rx) = std_mpsc::channel::<Result<()>>();
        let handle = {
            let running = running.clone();
            let device = self.config.capture_device.clone();
            let rate = self.config.capture_sample_rate;
            let channels = self.config.capture_channels;
            let constraints = self.config.constraints;
            thread::Builder::new().name("audio-record".into()).spawn(move || {
                let (pcm, params) = match alsa_device::open_capture(&device, rate, channels, constraints)
                {
                    Ok(v) => v,
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(()));
                if let Err(e) = record_thread(&pcm, &params, voice_tx, &running) {
                    log::error!("Capture thread error: {}", e);
                }
            })?
        };
        ready_rx
            .recv()
            .context("Capture thread exited before reporting device status")??;

        self.capture = Some(CaptureSession { running, handle });
        Ok(())
    }

    /// Stop capture synchronously: clear the flag, join the thread. The
    /// device closes with the thread and any partial frame is discarded.
    pub fn stop_capture(&mut self) {
        if let Some(session) = self.capture.take() {
            session.running.store(false, Ordering::SeqCst);
            let _ = session.handle.join();
        }
    }

    /// Tear down both paths.
    pub fn stop(&mut self) {
        self.stop_capture();
        self.play_running.store(false, Ordering::SeqCst);
        // The playback thread exits when the command sender drops; detach
        // here instead of blocking on a thread stuck in recv.
        self.play_handle.take();
    }
}

impl Drop for AudioSystem {
    fn drop(&mut self) {
        self.stop();
    }
}
