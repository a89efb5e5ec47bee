//! Scan-to-request pipeline
//!
//! ```text
//! raw scan -> strip -> reassemble -> classify -> extract -> SigningRequest
//! ```

use crate::address::{AddressEncoder, Ss58Encoder};
use crate::classify::{classify, ClassifiedPayload};
use crate::config::DecoderConfig;
use crate::error::{DecodeError, Result};
use crate::frame::normalize;
use crate::hashing::{Blake2Hasher, PayloadHasher};
use crate::network::NetworkRegistry;
use crate::reassembly::{Reassembly, ReassemblyState};
use crate::request::SigningRequest;
use crate::{ethereum, substrate};

/// What happened to one scan
#[derive(Debug)]
pub enum DecodeOutcome {
    /// The scan was a frame of a sequence that is not complete yet
    NeedMoreFrames { received: usize, total: u16 },
    /// The request is fully decoded; a completed multipart session has been cleared
    Ready(SigningRequest),
    /// The scan was rejected
    Failed(DecodeError),
}

impl DecodeOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, DecodeOutcome::Ready(_))
    }

    /// Convert into a `Result`, mapping progress to `None`
    pub fn into_result(self) -> Result<Option<SigningRequest>> {
        match self {
            DecodeOutcome::NeedMoreFrames { .. } => Ok(None),
            DecodeOutcome::Ready(request) => Ok(Some(request)),
            DecodeOutcome::Failed(err) => Err(err),
        }
    }
}

/// Decoder with its limits and external collaborators
#[derive(Clone, Debug)]
pub struct Decoder<H = Blake2Hasher, E = Ss58Encoder> {
    config: DecoderConfig,
    hasher: H,
    encoder: E,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// Decoder with default limits, blake2b-256 and SS58
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    pub fn with_config(config: DecoderConfig) -> Self {
        Self::with_parts(config, Blake2Hasher, Ss58Encoder)
    }
}

impl<H, E> Decoder<H, E>
where
    H: PayloadHasher,
    E: AddressEncoder,
{
    /// Decoder with caller-supplied collaborators
    pub fn with_parts(config: DecoderConfig, hasher: H, encoder: E) -> Self {
        Self {
            config,
            hasher,
            encoder,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Feed one raw scan into the session.
    ///
    /// The session is cleared once a multipart sequence completes, whether
    /// or not the completed payload decodes. Single-frame scans leave it as is.
    pub fn decode_scan(
        &self,
        raw: &str,
        state: &mut ReassemblyState,
        networks: &NetworkRegistry,
    ) -> DecodeOutcome {
        match self.advance(raw, state, networks) {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(kind = err.kind(), error = %err, "Rejected scan");
                DecodeOutcome::Failed(err)
            }
        }
    }

    fn advance(
        &self,
        raw: &str,
        state: &mut ReassemblyState,
        networks: &NetworkRegistry,
    ) -> Result<DecodeOutcome> {
        let frame = normalize(raw)?;
        // single-frame scans complete without touching the session
        let from_session = frame.is_multipart;

        match state.ingest_bounded(frame, self.config.max_frame_count)? {
            Reassembly::Incomplete { received, total } => {
                Ok(DecodeOutcome::NeedMoreFrames { received, total })
            }
            Reassembly::Complete(payload) => {
                if from_session {
                    state.reset();
                }
                let request = self.decode_payload(payload.as_bytes(), networks)?;
                tracing::info!(
                    request = request.kind(),
                    is_hash = request.is_hash(),
                    "Decoded signing request"
                );
                Ok(DecodeOutcome::Ready(request))
            }
        }
    }

    /// Classify and extract an already reassembled payload
    pub fn decode_payload(
        &self,
        payload: &[u8],
        networks: &NetworkRegistry,
    ) -> Result<SigningRequest> {
        match classify(payload, networks)? {
            ClassifiedPayload::Ethereum(eth) => ethereum::extract(eth),
            ClassifiedPayload::Substrate(sub) => {
                substrate::extract(sub, &self.hasher, &self.encoder, &self.config)
            }
        }
    }

    /// Decode a batch of captured scans in one fresh session.
    ///
    /// Returns the first request that completes. Fails with
    /// [`DecodeError::IncompleteSequence`] when the batch runs out first.
    pub fn decode_sequence<I, S>(&self, scans: I, networks: &NetworkRegistry) -> Result<SigningRequest>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut state = ReassemblyState::new();
        let mut progress = (0, 0);

        for scan in scans {
            match self.decode_scan(scan.as_ref(), &mut state, networks) {
                DecodeOutcome::Ready(request) => return Ok(request),
                DecodeOutcome::Failed(err) => return Err(err),
                DecodeOutcome::NeedMoreFrames { received, total } => progress = (received, total),
            }
        }

        let (received, total) = progress;
        Err(DecodeError::IncompleteSequence { received, total })
    }
}

/// Feed one raw scan into the session with the default decoder
pub fn decode_scan(
    raw: &str,
    state: &mut ReassemblyState,
    networks: &NetworkRegistry,
) -> DecodeOutcome {
    Decoder::new().decode_scan(raw, state, networks)
}

/// Decode a batch of captured scans with the default decoder
pub fn decode_sequence<I, S>(scans: I, networks: &NetworkRegistry) -> Result<SigningRequest>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Decoder::new().decode_sequence(scans, networks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KUSAMA: &str = "b0a8d493285c2df73290dfb7e61f870f17b41801197a149ca93654499ea3dafe";

    fn wrap(payload: &[u8]) -> String {
        if payload.len() < 256 {
            format!("4{:02x}{}0ec11", payload.len(), hex::encode(payload))
        } else {
            format!("4{:04x}{}0ec", payload.len(), hex::encode(payload))
        }
    }

    fn frames(payload: &[u8], count: u16) -> Vec<String> {
        let chunk = payload.len().div_ceil(count as usize);
        payload
            .chunks(chunk)
            .enumerate()
            .map(|(index, body)| {
                let mut frame = vec![0x00];
                frame.extend_from_slice(&count.to_be_bytes());
                frame.extend_from_slice(&(index as u16).to_be_bytes());
                frame.extend_from_slice(body);
                wrap(&frame)
            })
            .collect()
    }

    fn message_payload(text: &[u8]) -> Vec<u8> {
        let mut payload = vec![0x53, 0x01, 0x03];
        payload.extend_from_slice(&[0x22; 32]);
        payload.extend_from_slice(text);
        payload.extend_from_slice(&hex::decode(KUSAMA).unwrap());
        payload
    }

    #[test]
    fn test_single_frame_message() {
        let registry = NetworkRegistry::with_defaults();
        let scans = frames(&message_payload(b"hello"), 1);
        let mut state = ReassemblyState::new();

        match decode_scan(&scans[0], &mut state, &registry) {
            DecodeOutcome::Ready(SigningRequest::SubstrateMessage(msg)) => {
                assert_eq!(msg.display_text(), "hello");
                assert_eq!(msg.network_key, format!("0x{KUSAMA}"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(state.is_empty());
    }

    #[test]
    fn test_multipart_clears_session_when_ready() {
        let registry = NetworkRegistry::with_defaults();
        let scans = frames(&message_payload(&[0x61; 200]), 3);
        let mut state = ReassemblyState::new();

        assert!(matches!(
            decode_scan(&scans[1], &mut state, &registry),
            DecodeOutcome::NeedMoreFrames {
                received: 1,
                total: 3
            }
        ));
        assert!(matches!(
            decode_scan(&scans[0], &mut state, &registry),
            DecodeOutcome::NeedMoreFrames {
                received: 2,
                total: 3
            }
        ));
        assert!(decode_scan(&scans[2], &mut state, &registry).is_ready());
        assert!(state.is_empty());
    }

    #[test]
    fn test_session_cleared_when_completed_payload_fails() {
        let registry = NetworkRegistry::new();
        let scans = frames(&message_payload(b"unknown chain"), 2);
        let mut state = ReassemblyState::new();

        decode_scan(&scans[0], &mut state, &registry);
        let outcome = decode_scan(&scans[1], &mut state, &registry);
        assert!(matches!(
            outcome,
            DecodeOutcome::Failed(DecodeError::UnknownNetwork(_))
        ));
        assert!(state.is_empty());
    }

    #[test]
    fn test_single_frame_scan_keeps_multipart_progress() {
        let registry = NetworkRegistry::with_defaults();
        let scans = frames(&message_payload(b"two frames"), 2);
        let mut state = ReassemblyState::new();

        assert!(matches!(
            decode_scan(&scans[0], &mut state, &registry),
            DecodeOutcome::NeedMoreFrames { received: 1, total: 2 }
        ));

        let stray = frames(&[0x99, 0x00], 1);
        assert!(matches!(
            decode_scan(&stray[0], &mut state, &registry),
            DecodeOutcome::Failed(DecodeError::UnknownProtocol(0x99))
        ));
        assert_eq!(state.received(), 1);
        assert_eq!(state.frame_count(), Some(2));

        let other = frames(&message_payload(b"single"), 1);
        assert!(decode_scan(&other[0], &mut state, &registry).is_ready());
        assert_eq!(state.missing_frames(), vec![1]);

        match decode_scan(&scans[1], &mut state, &registry) {
            DecodeOutcome::Ready(SigningRequest::SubstrateMessage(msg)) => {
                assert_eq!(msg.display_text(), "two frames");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(state.is_empty());
    }

    #[test]
    fn test_decode_sequence_incomplete() {
        let registry = NetworkRegistry::with_defaults();
        let scans = frames(&message_payload(&[0x61; 120]), 4);
        let result = decode_sequence(&scans[..3], &registry);
        assert!(matches!(
            result,
            Err(DecodeError::IncompleteSequence {
                received: 3,
                total: 4
            })
        ));

        let request = decode_sequence(scans.iter().rev(), &registry).unwrap();
        assert_eq!(request.signable_bytes(), &[0x61; 120][..]);
    }

    #[test]
    fn test_configured_frame_limit() {
        let registry = NetworkRegistry::with_defaults();
        let decoder = Decoder::with_config(DecoderConfig::new().with_max_frame_count(2));
        let scans = frames(&message_payload(b"abc"), 3);
        let mut state = ReassemblyState::new();

        assert!(matches!(
            decoder.decode_scan(&scans[0], &mut state, &registry),
            DecodeOutcome::Failed(DecodeError::SequenceTooLarge { max: 2, .. })
        ));
    }

    #[test]
    fn test_into_result() {
        let registry = NetworkRegistry::with_defaults();
        let mut state = ReassemblyState::new();
        assert!(decode_scan("zz", &mut state, &registry).into_result().is_err());

        let scans = frames(&message_payload(b"abc"), 2);
        let first = decode_scan(&scans[0], &mut state, &registry);
        assert!(matches!(first.into_result(), Ok(None)));
    }
}
