//! Multipart frame reassembly
//!
//! Large requests are split across an animated sequence of QR codes. The
//! camera may catch frames in any order and see the same frame many times,
//! so frames are keyed by index and the sequence completes as soon as every
//! index in `[0, frame_count)` has been seen.

use std::collections::BTreeMap;

use crate::config::MAX_FRAME_COUNT;
use crate::error::{DecodeError, Result};
use crate::frame::NormalizedFrame;

/// Concatenated frame bodies in index order
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReassembledPayload(Vec<u8>);

impl ReassembledPayload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for ReassembledPayload {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

/// Result of feeding one frame into a session
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reassembly {
    /// More frames are needed
    Incomplete { received: usize, total: u16 },
    /// Every frame has been seen
    Complete(ReassembledPayload),
}

/// Frames collected so far for one scanning session.
///
/// Owned by the caller and mutated only through [`ReassemblyState::ingest`]
/// and [`ReassemblyState::reset`].
#[derive(Clone, Debug, Default)]
pub struct ReassemblyState {
    frame_count: Option<u16>,
    frames: BTreeMap<u16, Vec<u8>>,
}

impl ReassemblyState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a frame using the default sequence size limit
    pub fn ingest(&mut self, frame: NormalizedFrame) -> Result<Reassembly> {
        self.ingest_bounded(frame, MAX_FRAME_COUNT)
    }

    /// Add a frame, rejecting sequences longer than `max_frame_count`
    pub fn ingest_bounded(
        &mut self,
        frame: NormalizedFrame,
        max_frame_count: u16,
    ) -> Result<Reassembly> {
        let total = frame.frame_count;

        if total > max_frame_count {
            tracing::warn!(
                frame_count = total,
                max = max_frame_count,
                "Rejecting oversized frame sequence"
            );
            return Err(DecodeError::SequenceTooLarge {
                frame_count: total,
                max: max_frame_count,
            });
        }

        if total <= 1 {
            return Ok(Reassembly::Complete(ReassembledPayload(frame.body)));
        }

        if let Some(expected) = self.frame_count {
            if expected != total {
                tracing::warn!(
                    expected,
                    got = total,
                    received = self.frames.len(),
                    "Frame from a different sequence, clearing session"
                );
                self.reset();
                return Err(DecodeError::InconsistentFrameCount {
                    expected,
                    got: total,
                });
            }
        }

        if frame.frame_index >= total {
            return Err(DecodeError::FrameIndexOutOfRange {
                frame_index: frame.frame_index,
                frame_count: total,
            });
        }

        self.frame_count = Some(total);
        let replaced = self
            .frames
            .insert(frame.frame_index, frame.body)
            .is_some();

        tracing::debug!(
            frame_index = frame.frame_index,
            frame_count = total,
            received = self.frames.len(),
            replaced,
            "Ingested frame"
        );

        // Keys are unique and all below `total`, so a full map covers every index.
        if self.frames.len() == total as usize {
            let payload: Vec<u8> = self.frames.values().flatten().copied().collect();
            return Ok(Reassembly::Complete(ReassembledPayload(payload)));
        }

        Ok(Reassembly::Incomplete {
            received: self.frames.len(),
            total,
        })
    }

    /// Number of distinct frames collected
    pub fn received(&self) -> usize {
        self.frames.len()
    }

    /// Frame count of the sequence being collected, if any
    pub fn frame_count(&self) -> Option<u16> {
        self.frame_count
    }

    /// Indices not yet scanned, ascending
    pub fn missing_frames(&self) -> Vec<u16> {
        match self.frame_count {
            Some(total) => (0..total)
                .filter(|index| !self.frames.contains_key(index))
                .collect(),
            None => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frame_count.is_none() && self.frames.is_empty()
    }

    /// Drop every collected frame
    pub fn reset(&mut self) {
        self.frame_count = None;
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(frame_count: u16, frame_index: u16, body: &[u8]) -> NormalizedFrame {
        NormalizedFrame {
            frame_count,
            frame_index,
            is_multipart: frame_count > 1,
            body: body.to_vec(),
        }
    }

    #[test]
    fn test_single_frame_fast_path() {
        let mut state = ReassemblyState::new();
        let result = state.ingest(frame(1, 0, b"abc")).unwrap();
        assert_eq!(result, Reassembly::Complete(b"abc".to_vec().into()));
        assert!(state.is_empty());

        let result = state.ingest(frame(0, 7, b"xyz")).unwrap();
        assert_eq!(result, Reassembly::Complete(b"xyz".to_vec().into()));
        assert!(state.is_empty());
    }

    #[test]
    fn test_out_of_order_completion() {
        let mut state = ReassemblyState::new();
        assert_eq!(
            state.ingest(frame(3, 2, b"cc")).unwrap(),
            Reassembly::Incomplete {
                received: 1,
                total: 3
            }
        );
        assert_eq!(state.missing_frames(), vec![0, 1]);

        state.ingest(frame(3, 0, b"aa")).unwrap();
        let result = state.ingest(frame(3, 1, b"bb")).unwrap();
        assert_eq!(result, Reassembly::Complete(b"aabbcc".to_vec().into()));
        assert!(state.missing_frames().is_empty());
    }

    #[test]
    fn test_duplicate_overwrites() {
        let mut state = ReassemblyState::new();
        state.ingest(frame(2, 0, b"old")).unwrap();
        let result = state.ingest(frame(2, 0, b"new")).unwrap();
        assert_eq!(
            result,
            Reassembly::Incomplete {
                received: 1,
                total: 2
            }
        );

        let result = state.ingest(frame(2, 1, b"!")).unwrap();
        assert_eq!(result, Reassembly::Complete(b"new!".to_vec().into()));
    }

    #[test]
    fn test_inconsistent_frame_count_clears_session() {
        let mut state = ReassemblyState::new();
        state.ingest(frame(3, 0, b"a")).unwrap();
        let result = state.ingest(frame(4, 1, b"b"));
        assert!(matches!(
            result,
            Err(DecodeError::InconsistentFrameCount {
                expected: 3,
                got: 4
            })
        ));
        assert!(state.is_empty());
        assert_eq!(state.frame_count(), None);
    }

    #[test]
    fn test_sequence_too_large() {
        let mut state = ReassemblyState::new();
        assert!(matches!(
            state.ingest(frame(51, 0, b"a")),
            Err(DecodeError::SequenceTooLarge {
                frame_count: 51,
                max: 50
            })
        ));
        assert!(state.ingest(frame(50, 0, b"a")).is_ok());
        assert!(matches!(
            state.ingest_bounded(frame(50, 1, b"a"), 10),
            Err(DecodeError::SequenceTooLarge { .. })
        ));
    }

    #[test]
    fn test_index_out_of_range() {
        let mut state = ReassemblyState::new();
        assert!(matches!(
            state.ingest(frame(3, 3, b"a")),
            Err(DecodeError::FrameIndexOutOfRange {
                frame_index: 3,
                frame_count: 3
            })
        ));
        assert!(state.is_empty());
    }

    #[test]
    fn test_foreign_frame_clears_before_index_check() {
        let mut state = ReassemblyState::new();
        state.ingest(frame(3, 0, b"a")).unwrap();
        assert!(matches!(
            state.ingest(frame(2, 5, b"b")),
            Err(DecodeError::InconsistentFrameCount {
                expected: 3,
                got: 2
            })
        ));
        assert!(state.is_empty());
    }

    #[test]
    fn test_out_of_range_index_keeps_session() {
        let mut state = ReassemblyState::new();
        state.ingest(frame(3, 0, b"a")).unwrap();
        assert!(matches!(
            state.ingest(frame(3, 7, b"b")),
            Err(DecodeError::FrameIndexOutOfRange { .. })
        ));
        assert_eq!(state.received(), 1);
        assert_eq!(state.frame_count(), Some(3));
    }

    #[test]
    fn test_reset() {
        let mut state = ReassemblyState::new();
        state.ingest(frame(5, 4, b"a")).unwrap();
        assert_eq!(state.received(), 1);
        assert_eq!(state.frame_count(), Some(5));
        state.reset();
        assert!(state.is_empty());
        assert!(state.missing_frames().is_empty());
    }
}
