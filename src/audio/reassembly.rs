//! Receiver-side byte-stream de-fragmentation.
//!
//! The transport is byte oriented and may split or coalesce deliveries, so
//! a 16-bit sample can straddle two payloads. At most one trailing byte is
//! carried to the next delivery so every run handed to the decoder has even
//! length.

#[derive(Debug, Default)]
pub struct ReassemblyBuffer {
    pending: Option<u8>,
}

impl ReassemblyBuffer {
    pub fn new() -> Self {
        Self { pending: None }
    }

    /// Absorb one transport payload and return the even-length prefix that
    /// is safe to decode. An odd trailing byte is held until the next call.
    pub fn push(&mut self, payload: &[u8]) -> Vec<u8> {
        let mut combined = Vec::with_capacity(payload.len() + 1);
        if let Some(b) = self.pending.take() {
            combined.push(b);
        }
        combined.extend_from_slice(payload);

        if combined.len() % 2 != 0 {
            self.pending = combined.pop();
        }
        combined
    }

    /// Drop any carried byte. Must run on stream reset (transport
    /// reconnect) so a stale half-sample is never stitched onto new bytes.
    pub fn reset(&mut self) {
        self.pending = None;
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_payload_passes_through() {
        let mut buf = ReassemblyBuffer::new();
        assert_eq!(buf.push(&[1, 2, 3, 4]), vec![1, 2, 3, 4]);
        assert!(!buf.has_pending());
    }

    #[test]
    fn odd_payload_holds_last_byte() {
        let mut buf = ReassemblyBuffer::new();
        assert_eq!(buf.push(&[1, 2, 3]), vec![1, 2]);
        assert!(buf.has_pending());
        assert_eq!(buf.push(&[4]), vec![3, 4]);
        assert!(!buf.has_pending());
    }

    #[test]
    fn single_byte_yields_nothing_yet() {
        let mut buf = ReassemblyBuffer::new();
        assert!(buf.push(&[9]).is_empty());
        assert_eq!(buf.push(&[7]), vec![9, 7]);
    }

    #[test]
    fn split_at_any_odd_offset_is_equivalent() {
        let stream: Vec<u8> = (0..64).collect();
        for split in (1..stream.len()).step_by(2) {
            let mut buf = ReassemblyBuffer::new();
            let mut out = buf.push(&stream[..split]);
            out.extend(buf.push(&stream[split..]));
            assert_eq!(out, stream, "split={}", split);
            assert!(!buf.has_pending());
        }
    }

    #[test]
    fn no_bytes_lost_or_duplicated_across_many_chunks() {
        let stream: Vec<u8> = (0..200).map(|i| (i * 7 % 251) as u8).collect();
        // Deliberately awkward chunk sizes, odd and even mixed
        let sizes = [1usize, 3, 2, 7, 1, 30, 5, 151];
        let mut buf = ReassemblyBuffer::new();
        let mut out = Vec::new();
        let mut offset = 0;
        for size in sizes {
            out.extend(buf.push(&stream[offset..offset + size]));
            offset += size;
        }
        assert_eq!(offset, stream.len());
        assert_eq!(out, stream);
        assert!(!buf.has_pending());
    }

    #[test]
    fn reset_discards_carry() {
        let mut buf = ReassemblyBuffer::new();
        buf.push(&[1, 2, 3]);
        assert!(buf.has_pending());
        buf.reset();
        assert!(!buf.has_pending());
        assert_eq!(buf.push(&[5, 6]), vec![5, 6]);
    }
}
