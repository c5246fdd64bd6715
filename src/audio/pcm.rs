//! Linear PCM16 wire codec.
//!
//! The wire format is headerless little-endian signed 16-bit mono at the
//! fixed target rate. Out-of-range floats clamp silently; the realtime path
//! is never interrupted for a bad sample value.

/// Convert normalized f32 samples to signed 16-bit PCM.
///
/// Negative values scale by 32768 and non-negative values by 32767 so both
/// ends of the signed range are reachable without overflowing at +1.0.
pub fn encode_pcm16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| {
            let s = s.clamp(-1.0, 1.0);
            if s < 0.0 {
                (s * 32768.0).round() as i16
            } else {
                (s * 32767.0).round() as i16
            }
        })
        .collect()
}

/// Decode little-endian PCM16 bytes back to normalized f32 samples.
///
/// The storage is treated as raw unsigned 16-bit and the two's-complement
/// sign is recovered here. Normalization divides by 32768, mirroring the
/// negative-range encode scale. The caller guarantees even length (the
/// reassembly buffer runs first); a stray trailing byte would be ignored.
pub fn decode_pcm16(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|pair| {
            let raw = u16::from_le_bytes([pair[0], pair[1]]) as i32;
            let v = if raw >= 32768 { raw - 65536 } else { raw };
            v as f32 / 32768.0
        })
        .collect()
}

/// Serialize PCM16 samples into the little-endian wire layout.
pub fn pcm16_to_bytes(samples: &[i16]) -> Vec<u8> {
    let mut out = Vec::with_capacity(samples.len() * 2);
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_full_scale() {
        assert_eq!(encode_pcm16(&[1.0, -1.0, 0.0]), vec![32767, -32768, 0]);
    }

    #[test]
    fn encode_clamps_out_of_range() {
        assert_eq!(encode_pcm16(&[1.5, -2.0]), vec![32767, -32768]);
    }

    #[test]
    fn decode_full_scale() {
        let bytes = pcm16_to_bytes(&[32767, -32768, 0]);
        let decoded = decode_pcm16(&bytes);
        assert!((decoded[0] - 1.0).abs() <= 1.0 / 32768.0);
        assert!((decoded[1] + 1.0).abs() <= 1.0 / 32768.0);
        assert_eq!(decoded[2], 0.0);
    }

    #[test]
    fn decode_recovers_sign_from_raw_storage() {
        // 0x8000 little-endian is raw 32768, i.e. i16::MIN
        let decoded = decode_pcm16(&[0x00, 0x80]);
        assert_eq!(decoded, vec![-1.0]);
    }

    #[test]
    fn round_trip_within_one_quantization_step() {
        let samples: Vec<f32> = (0..1000).map(|i| ((i as f32) * 0.013).sin() * 0.45).collect();
        let bytes = pcm16_to_bytes(&encode_pcm16(&samples));
        let decoded = decode_pcm16(&bytes);
        assert_eq!(decoded.len(), samples.len());
        for (a, b) in samples.iter().zip(&decoded) {
            assert!((a - b).abs() <= 1.0 / 32768.0, "{} vs {}", a, b);
        }
    }

    #[test]
    fn wire_layout_is_little_endian() {
        assert_eq!(pcm16_to_bytes(&[0x0102]), vec![0x02, 0x01]);
    }
}
