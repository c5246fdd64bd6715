use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use alsa::pcm::{IO, PCM};
use anyhow::Result;
use tokio::sync::mpsc;

use super::alsa_device::DeviceParams;
use super::pcm as pcm_codec;
use super::reassembly::ReassemblyBuffer;
use super::scheduler::{JitterScheduler, PlaybackClock, silence_samples};
use super::JITTER_LEAD_SECS;

/// Commands accepted by the playback thread.
#[derive(Debug)]
pub enum PlayCommand {
    /// Raw transport payload; boundaries may fall mid-sample.
    Payload(Vec<u8>),
    /// Stream reset: drop the reassembly carry and the playback schedule.
    /// Sent when the channel goes idle and on transport reconnect.
    Reset,
}

/// Playback loop: reassemble transport payloads into whole samples, decode,
/// and write them to ALSA behind a jitter lead.
///
/// The timeline is wall-clock seconds since this thread started. `write_head`
/// tracks how much audio has been appended to the stream; a schedule decision
/// becomes zero-fill written ahead of the frame, so the device clock itself
/// enforces frame start times. Already-written audio is never flushed; on
/// shutdown it drains naturally.
pub fn play_thread(
    pcm: &PCM,
    params: &DeviceParams,
    mut play_rx: mpsc::Receiver<PlayCommand>,
    running: &AtomicBool,
) -> Result<()> {
    let rate = params.sample_rate;
    let mut reassembly = ReassemblyBuffer::new();
    let mut clock = PlaybackClock::new();
    let scheduler = JitterScheduler::new(JITTER_LEAD_SECS);

    let io = pcm.io_i16()?;
    let anchor = Instant::now();
    let mut write_head = 0.0f64;

    log::info!(
        "Playback started: rate={}, period={}, lead={}ms",
        rate,
        params.period_size,
        (JITTER_LEAD_SECS * 1000.0) as u32,
    );

    while running.load(Ordering::Relaxed) {
        match play_rx.blocking_recv() {
            Some(PlayCommand::Payload(payload)) => {
                let processable = reassembly.push(&payload);
                if processable.is_empty() {
                    continue;
                }
                let samples = pcm_codec::decode_pcm16(&processable);
                let duration = samples.len() as f64 / rate as f64;

                let now = anchor.elapsed().as_secs_f64();
                let sched = scheduler.schedule(&mut clock, now, duration);
                if sched.resynced {
                    // The device drained during the gap; writes resume from
                    // the present instead of chasing the stale head.
                    write_head = write_head.max(now);
                }

                let gap = silence_samples(sched.start, write_head, rate);
                if gap > 0 {
                    write_all(pcm, &io, &vec![0i16; gap])?;
                }
                write_all(pcm, &io, &pcm_codec::encode_pcm16(&samples))?;
                write_head = sched.start + duration;
            }
            Some(PlayCommand::Reset) => {
                reassembly.reset();
                clock.reset();
            }
            None => {
                log::info!("Playback channel closed");
                break;
            }
        }
    }

    log::info!("Playback stopped");
    Ok(())
}

/// Write interleaved PCM to ALSA, recovering from XRUN with `prepare()` and
/// a bounded retry so a persistently failing device cannot dead-loop.
fn write_all(pcm: &PCM, io: &IO<i16>, data: &[i16]) -> Result<()> {
    let total = data.len();
    let mut written = 0;
    let mut retry_count = 0u32;

    while written < total {
        match io.writei(&data[written..]) {
            Ok(n) => {
                written += n;
                retry_count = 0;
            }
            Err(e) => {
                log::warn!("ALSA playback error: {}, recovering...", e);
                retry_count += 1;
                pcm.prepare()
                    .map_err(|e2| anyhow::anyhow!("Failed to recover PCM playback: {}", e2))?;
                if retry_count >= 3 {
                    log::error!(
                        "Max recovery retries reached, dropping {} unwritten frames",
                        total - written
                    );
                    break;
                }
            }
        }
    }
    Ok(())
}
