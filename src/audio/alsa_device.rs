//! ALSA PCM device wrappers for audio capture and playback.

use alsa::pcm::{Access, Format, HwParams, PCM};
use alsa::{Direction, ValueOr};
use anyhow::{Context, Result};

/// Capture processing hints requested from the device layer: echo
/// cancellation, noise suppression, automatic gain control.
///
/// The pipeline does not implement this DSP itself; the flags are forwarded
/// opaquely so a backend with matching controls can honor them. Plain
/// "default"/"plughw" devices ignore them, which is logged at open.
#[derive(Debug, Clone, Copy)]
pub struct CaptureConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

/// Parameters actually negotiated with the hardware.
#[derive(Debug, Clone)]
pub struct DeviceParams {
    pub sample_rate: u32,
    pub channels: u32,
    /// Period size in frames; one ALSA read/write chunk.
    pub period_size: usize,
}

/// Open a PCM device for capture. Acquisition failure (device missing,
/// busy, or permission denied) is returned to the caller; it is fatal to
/// the session, never silently recovered.
pub fn open_capture(
    device: &str,
    sample_rate: u32,
    channels: u32,
    constraints: CaptureConstraints,
) -> Result<(PCM, DeviceParams)> {
    let opened = open_pcm(device, Direction::Capture, sample_rate, channels, None, "capture")?;
    log::info!(
        "Capture constraints requested (backend-dependent): aec={}, ns={}, agc={}",
        constraints.echo_cancellation,
        constraints.noise_suppression,
        constraints.auto_gain_control,
    );
    Ok(opened)
}

/// Open a PCM device for playback.
pub fn open_playback(
    device: &str,
    sample_rate: u32,
    channels: u32,
    period_size: Option<usize>,
) -> Result<(PCM, DeviceParams)> {
    open_pcm(device, Direction::Playback, sample_rate, channels, period_size, "playback")
}

fn open_pcm(
    device: &str,
    direction: Direction,
    sample_rate: u32,
    channels: u32,
    period_size: Option<usize>,
    dir_name: &str,
) -> Result<(PCM, DeviceParams)> {
    let pcm = PCM::new(device, direction, false)
        .with_context(|| format!("Failed to open PCM device '{}' for {}", device, dir_name))?;

    {
        let hwp = HwParams::any(&pcm).context("Failed to initialize HwParams")?;
        hwp.set_access(Access::RWInterleaved)?;
        hwp.set_format(Format::S16LE)?;
        hwp.set_channels(channels)?;
        hwp.set_rate_near(sample_rate, ValueOr::Nearest)?;
        if let Some(ps) = period_size {
            hwp.set_period_size_near(ps as alsa::pcm::Frames, ValueOr::Nearest)?;
        }
        pcm.hw_params(&hwp)?;
    }

    // Read back what the hardware actually agreed to
    let params = {
        let hwp = pcm.hw_params_current()?;
        DeviceParams {
            sample_rate: hwp.get_rate()?,
            channels: hwp.get_channels()?,
            period_size: hwp.get_period_size()? as usize,
        }
    };

    log::info!(
        "ALSA {}: device={}, rate={}, channels={}, period_size={}",
        dir_name,
        device,
        params.sample_rate,
        params.channels,
        params.period_size,
    );

    Ok((pcm, params))
}
