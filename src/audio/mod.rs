//! audio - the realtime voice pipeline.
//!
//! Capture path: ALSA periods → mono f32 → block-average downsample to the
//! wire rate → PCM16 encode → fixed-size transport frames.
//! Receive path: transport payloads → odd-byte reassembly → PCM16 decode →
//! jitter-buffered scheduling → ALSA playback.

mod alsa_device;
mod audio_system;
pub mod capture;
pub mod downsample;
pub mod pcm;
mod play;
pub mod reassembly;
mod record;
pub mod scheduler;

pub use alsa_device::CaptureConstraints;
pub use audio_system::{AudioConfig, AudioSystem};
pub use play::PlayCommand;

/// Fixed wire sample rate. Rate conversion happens capture-side only; the
/// receive path assumes every payload is already at this rate.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Target-rate samples per wire frame: 128 ms of audio. The jitter lead is
/// tuned against this duration.
pub const FRAME_SAMPLES: usize = 2048;

/// Playback scheduling lead in seconds, absorbing delivery jitter while
/// staying conversational.
pub const JITTER_LEAD_SECS: f64 = 0.150;

#[cfg(test)]
mod tests {
    use super::capture::{AccumulatingFramer, CaptureStrategy};
    use super::downsample::downsample;
    use super::pcm::decode_pcm16;
    use super::reassembly::ReassemblyBuffer;
    use super::{FRAME_SAMPLES, TARGET_SAMPLE_RATE};

    // Whole send path against the whole receive path: frame a 48 kHz
    // capture, fragment the wire bytes at awkward boundaries, reassemble,
    // decode, and compare with downsampling the capture in one shot.
    #[test]
    fn capture_to_playback_equivalence() {
        let native_rate = 48000;
        let native: Vec<f32> = (0..FRAME_SAMPLES * 3 + 96)
            .map(|i| (i as f32 * 0.01).sin() * 0.4)
            .collect();

        // Send side: feed the framer in callback-sized blocks
        let mut framer = AccumulatingFramer::new(native_rate);
        let mut wire = Vec::new();
        for block in native.chunks(480) {
            for frame in framer.on_block(block) {
                wire.extend(frame);
            }
        }
        assert_eq!(wire.len(), FRAME_SAMPLES * 2);

        // Receive side: arbitrary fragmentation, including odd splits
        let mut reassembly = ReassemblyBuffer::new();
        let mut assembled = Vec::new();
        let mut rest = wire.as_slice();
        for size in [7usize, 501, 1, 64] {
            let (chunk, tail) = rest.split_at(size);
            assembled.extend(reassembly.push(chunk));
            rest = tail;
        }
        assembled.extend(reassembly.push(rest));
        assert_eq!(assembled, wire);
        assert!(!reassembly.has_pending());

        let decoded = decode_pcm16(&assembled);
        let expected = downsample(&native, native_rate, TARGET_SAMPLE_RATE);
        assert_eq!(decoded.len(), FRAME_SAMPLES);
        for (got, want) in decoded.iter().zip(&expected) {
            assert!((got - want).abs() <= 1.0 / 32768.0);
        }
    }
}
