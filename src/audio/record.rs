use std::sync::atomic::{AtomicBool, Ordering};

use alsa::pcm::PCM;
use anyhow::Result;
use tokio::sync::mpsc;

use super::alsa_device::DeviceParams;
use super::capture::{AccumulatingFramer, CaptureStrategy};

/// Capture loop: read one ALSA period at a time, downmix to mono, normalize
/// to f32, and hand the block to the framing strategy. Completed wire frames
/// go out through `voice_tx` without ever blocking the hardware cadence.
///
/// Runs until `running` clears. The device closes when `pcm` drops with the
/// caller's closure, and any partly accumulated frame is discarded with the
/// framer.
pub fn record_thread(
    pcm: &PCM,
    params: &DeviceParams,
    voice_tx: mpsc::Sender<Vec<u8>>,
    running: &AtomicBool,
) -> Result<()> {
    let channels = params.channels as usize;
    let mut framer = AccumulatingFramer::new(params.sample_rate);

    // ALSA read buffer (interleaved i16, one period) and its mono form
    let mut read_buf = vec![0i16; params.period_size * channels];
    let mut block = vec![0f32; params.period_size];

    let io = pcm.io_i16()?;

    log::info!(
        "Capture started: rate={}, ch={}, period={}",
        params.sample_rate,
        params.channels,
        params.period_size,
    );

    while running.load(Ordering::Relaxed) {
        match io.readi(&mut read_buf) {
            Ok(frames) => {
                downmix_to_f32(&read_buf[..frames * channels], channels, &mut block[..frames]);
                for payload in framer.on_block(&block[..frames]) {
                    // Fire-and-forget: this loop runs on the hardware
                    // cadence and must never block on the transport side.
                    match voice_tx.try_send(payload) {
                        Ok(()) => {}
                        Err(mpsc::error::TrySendError::Full(_)) => {
                            log::warn!("Voice channel full, dropping frame");
                        }
                        Err(mpsc::error::TrySendError::Closed(_)) => {
                            log::warn!("Voice channel closed, stopping capture");
                            return Ok(());
                        }
                    }
                }
            }
            Err(e) => {
                log::warn!("ALSA capture error: {}, recovering...", e);
                if let Err(e2) = pcm.prepare() {
                    log::error!("Failed to recover PCM capture: {}", e2);
                    break;
                }
            }
        }
    }

    if framer.pending_samples() > 0 {
        log::debug!(
            "Capture stopped, discarding {} accumulated samples",
            framer.pending_samples()
        );
    }
    log::info!("Capture stopped");
    Ok(())
}

/// Average interleaved i16 channels down to normalized mono f32.
fn downmix_to_f32(interleaved: &[i16], channels: usize, out: &mut [f32]) {
    for (i, sample) in out.iter_mut().enumerate() {
        let mut sum = 0i32;
        for c in 0..channels {
            sum += interleaved[i * channels + c] as i32;
        }
        *sample = (sum / channels as i32) as f32 / 32768.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_mono_normalizes() {
        let mut out = vec![0f32; 3];
        downmix_to_f32(&[-32768, 0, 16384], 1, &mut out);
        assert_eq!(out, vec![-1.0, 0.0, 0.5]);
    }

    #[test]
    fn downmix_stereo_averages_channels() {
        let mut out = vec![0f32; 2];
        downmix_to_f32(&[16384, -16384, 8192, 8192], 2, &mut out);
        assert_eq!(out, vec![0.0, 0.25]);
    }
}
