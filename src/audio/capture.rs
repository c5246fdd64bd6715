//! Capture-side framing: native-rate blocks in, wire-ready frames out.

use super::downsample::downsample;
use super::pcm;
use super::{FRAME_SAMPLES, TARGET_SAMPLE_RATE};

/// Strategy seam for turning native capture blocks into transport frames.
///
/// The implementation used here accumulates downsampled audio and flushes
/// fixed-size frames (`AccumulatingFramer`). The alternative design, encoding
/// each native callback block as its own frame, trades transport efficiency
/// for lower latency; it fits the same seam but is not kept as code.
pub trait CaptureStrategy: Send {
    /// Feed one native-rate mono block; returns zero or more encoded
    /// PCM16 byte frames ready to send.
    fn on_block(&mut self, native: &[f32]) -> Vec<Vec<u8>>;
}

/// Downsamples each incoming block to the target rate and accumulates until
/// a full wire frame (FRAME_SAMPLES at 16 kHz, 128 ms) is available.
///
/// Dropping the framer discards whatever is accumulated, which is exactly
/// what stopping capture mid-frame should do.
pub struct AccumulatingFramer {
    source_rate: u32,
    buf: Vec<f32>,
}

impl AccumulatingFramer {
    pub fn new(source_rate: u32) -> Self {
        Self {
            source_rate,
            buf: Vec::with_capacity(FRAME_SAMPLES * 2),
        }
    }

    /// Target-rate samples waiting for the next flush.
    pub fn pending_samples(&self) -> usize {
        self.buf.len()
    }
}

impl CaptureStrategy for AccumulatingFramer {
    fn on_block(&mut self, native: &[f32]) -> Vec<Vec<u8>> {
        let down = downsample(native, self.source_rate, TARGET_SAMPLE_RATE);
        self.buf.extend_from_slice(&down);

        let mut frames = Vec::new();
        while self.buf.len() >= FRAME_SAMPLES {
            let frame: Vec<f32> = self.buf.drain(..FRAME_SAMPLES).collect();
            frames.push(pcm::pcm16_to_bytes(&pcm::encode_pcm16(&frame)));
        }
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_emission_below_threshold() {
        let mut framer = AccumulatingFramer::new(TARGET_SAMPLE_RATE);
        let frames = framer.on_block(&vec![0.1; FRAME_SAMPLES - 1]);
        assert!(frames.is_empty());
        assert_eq!(framer.pending_samples(), FRAME_SAMPLES - 1);
    }

    #[test]
    fn exact_frame_size_on_flush() {
        let mut framer = AccumulatingFramer::new(TARGET_SAMPLE_RATE);
        let frames = framer.on_block(&vec![0.1; FRAME_SAMPLES]);
        assert_eq!(frames.len(), 1);
        // 2 bytes per sample, even by construction
        assert_eq!(frames[0].len(), FRAME_SAMPLES * 2);
        assert_eq!(framer.pending_samples(), 0);
    }

    #[test]
    fn leftover_carries_into_next_block() {
        let mut framer = AccumulatingFramer::new(TARGET_SAMPLE_RATE);
        assert!(framer.on_block(&vec![0.0; 1500]).is_empty());
        let frames = framer.on_block(&vec![0.0; 1500]);
        assert_eq!(frames.len(), 1);
        assert_eq!(framer.pending_samples(), 3000 - FRAME_SAMPLES);
    }

    #[test]
    fn downsamples_native_blocks() {
        // 48 kHz native: three native samples become one target sample
        let mut framer = AccumulatingFramer::new(48000);
        let frames = framer.on_block(&vec![0.5; FRAME_SAMPLES * 3]);
        assert_eq!(frames.len(), 1);
        let decoded = pcm::decode_pcm16(&frames[0]);
        assert_eq!(decoded.len(), FRAME_SAMPLES);
        assert!((decoded[0] - 0.5).abs() < 1.0 / 32768.0);
    }

    #[test]
    fn multiple_frames_from_one_large_block() {
        let mut framer = AccumulatingFramer::new(TARGET_SAMPLE_RATE);
        let frames = framer.on_block(&vec![0.0; FRAME_SAMPLES * 2 + 10]);
        assert_eq!(frames.len(), 2);
        assert_eq!(framer.pending_samples(), 10);
    }
}
