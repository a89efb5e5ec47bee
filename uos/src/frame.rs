//! QR envelope stripping and frame header parsing
//!
//! A raw scan is the hex dump of a QR code in binary mode:
//!
//! ```text
//! 4            binary mode indicator (one hex digit)
//! 25 | 0025    byte length (one or two bytes)
//! ..           payload bytes
//! 0            terminator (one hex digit)
//! ec11ec..     SQRC filler padding up to the symbol capacity
//! ```
//!
//! The payload itself starts with a five byte frame header:
//! a reserved multipart byte, the big-endian frame count and the
//! big-endian frame index.

use crate::error::{DecodeError, Result};

/// Single filler byte appended when padding has odd length
const FILLER_BYTE: &str = "ec";

/// Repeating filler pair
const FILLER_PAIR: &str = "ec11";

/// Leading hex digit of a binary-mode QR segment
const BINARY_MODE_INDICATOR: char = '4';

/// Trailing terminator digit
const TERMINATOR: char = '0';

/// Length of the multipart frame header in bytes
pub const FRAME_HEADER_LEN: usize = 5;

/// Remove filler and envelope from a raw scan, returning the payload bytes.
pub fn strip(raw: &str) -> Result<Vec<u8>> {
    if raw.is_empty() {
        return Err(DecodeError::MalformedHex("empty scan".into()));
    }
    if raw.len() % 2 != 0 {
        return Err(DecodeError::MalformedHex(format!(
            "odd length {}",
            raw.len()
        )));
    }
    if let Some(pos) = raw.bytes().position(|b| !b.is_ascii_hexdigit()) {
        return Err(DecodeError::MalformedHex(format!(
            "non-hex character at position {pos}"
        )));
    }

    let lowered = raw.to_ascii_lowercase();
    let mut data = lowered.as_str();

    if let Some(rest) = data.strip_suffix(FILLER_BYTE) {
        data = rest;
    }
    while let Some(rest) = data.strip_suffix(FILLER_PAIR) {
        data = rest;
    }

    if !data.starts_with(BINARY_MODE_INDICATOR) {
        return Err(DecodeError::InvalidEnvelope("missing binary mode indicator"));
    }
    if data.len() < 2 || !data.ends_with(TERMINATOR) {
        return Err(DecodeError::InvalidEnvelope("missing terminator"));
    }

    let inner = &data[1..data.len() - 1];
    let declared = |digits: usize| {
        inner
            .get(..digits)
            .and_then(|prefix| usize::from_str_radix(prefix, 16).ok())
            .filter(|len| len * 2 + digits == inner.len())
    };

    let body = if declared(2).is_some() {
        &inner[2..]
    } else if declared(4).is_some() {
        &inner[4..]
    } else {
        return Err(DecodeError::LengthMismatch {
            hex_len: inner.len(),
        });
    };

    let bytes = hex::decode(body).map_err(|err| DecodeError::MalformedHex(err.to_string()))?;

    tracing::debug!(
        scan_len = raw.len(),
        payload_len = bytes.len(),
        "Stripped QR envelope"
    );

    Ok(bytes)
}

/// One scanned frame with its header parsed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedFrame {
    /// Number of frames in the sequence (0 and 1 both mean single-frame)
    pub frame_count: u16,
    /// Position of this frame in the sequence
    pub frame_index: u16,
    /// True when the frame is part of a sequence of more than one frame.
    /// The header's multipart byte is reserved and not consulted.
    pub is_multipart: bool,
    /// Frame contents after the header
    pub body: Vec<u8>,
}

impl NormalizedFrame {
    /// Parse the frame header from stripped payload bytes
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < FRAME_HEADER_LEN {
            return Err(DecodeError::FrameTooShort {
                len: bytes.len(),
                needed: FRAME_HEADER_LEN,
            });
        }

        let frame_count = u16::from_be_bytes([bytes[1], bytes[2]]);
        let frame_index = u16::from_be_bytes([bytes[3], bytes[4]]);

        Ok(Self {
            frame_count,
            frame_index,
            is_multipart: frame_count > 1,
            body: bytes[FRAME_HEADER_LEN..].to_vec(),
        })
    }
}

/// Strip a raw scan and parse its frame header
pub fn normalize(raw: &str) -> Result<NormalizedFrame> {
    let bytes = strip(raw)?;
    NormalizedFrame::parse(&bytes)
}

/// Number of frames the sequence containing this scan declares.
///
/// Single-frame scans report 1.
pub fn frame_count(raw: &str) -> Result<u16> {
    let frame = normalize(raw)?;
    Ok(frame.frame_count.max(1))
}
