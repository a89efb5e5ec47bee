//! Error types for UOS decoding

use thiserror::Error;

/// Errors that can occur while turning scans into a signing request
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Scan is empty, has odd length, or contains non-hex characters
    #[error("malformed hex scan: {0}")]
    MalformedHex(String),

    /// Binary-mode indicator or terminator digit missing
    #[error("invalid QR envelope: {0}")]
    InvalidEnvelope(&'static str),

    /// Length prefix does not match the amount of data in the scan
    #[error("length prefix does not match scan data ({hex_len} hex chars after envelope)")]
    LengthMismatch { hex_len: usize },

    /// Normalized bytes are too short to hold the frame header
    #[error("frame too short: {len} bytes, header needs {needed}")]
    FrameTooShort { len: usize, needed: usize },

    /// Declared frame count exceeds the configured maximum
    #[error("sequence too large: {frame_count} frames (max {max})")]
    SequenceTooLarge { frame_count: u16, max: u16 },

    /// Frame index is not below the declared frame count
    #[error("frame index {frame_index} out of range for {frame_count} frames")]
    FrameIndexOutOfRange { frame_index: u16, frame_count: u16 },

    /// A frame belongs to a different sequence than the ones collected so far
    #[error("inconsistent frame count: session has {expected}, frame declares {got}")]
    InconsistentFrameCount { expected: u16, got: u16 },

    /// First payload byte is neither Ethereum nor Substrate
    #[error("unknown protocol byte 0x{0:02x}")]
    UnknownProtocol(u8),

    /// Substrate crypto byte is not ed25519 or sr25519
    #[error("unsupported crypto byte 0x{0:02x}")]
    UnsupportedCrypto(u8),

    /// Action byte is not recognized for the protocol family
    #[error("unsupported action byte 0x{0:02x}")]
    UnsupportedAction(u8),

    /// Payload ends before the fixed-width fields
    #[error("payload too short: {len} bytes, need at least {needed}")]
    PayloadTooShort { len: usize, needed: usize },

    /// Genesis hash is not in the supplied network registry
    #[error("unknown network with genesis hash 0x{}", hex::encode(.0))]
    UnknownNetwork([u8; 32]),

    /// Oversized extrinsic does not start with a SCALE compact length
    #[error("invalid SCALE compact prefix: {0}")]
    InvalidCompactPrefix(String),

    /// External hashing capability failed
    #[error("hashing failure: {0}")]
    HashingFailure(#[from] HashError),

    /// External address encoder failed
    #[error("address encoding failure: {0}")]
    AddressEncodingFailure(#[from] AddressError),

    /// A batch of scans did not cover every frame of the sequence
    #[error("incomplete sequence: {received} of {total} frames")]
    IncompleteSequence { received: usize, total: u16 },
}

impl DecodeError {
    /// Stable label for logs and diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::MalformedHex(_) => "MalformedHex",
            DecodeError::InvalidEnvelope(_) => "InvalidEnvelope",
            DecodeError::LengthMismatch { .. } => "LengthMismatch",
            DecodeError::FrameTooShort { .. } => "FrameTooShort",
            DecodeError::SequenceTooLarge { .. } => "SequenceTooLarge",
            DecodeError::FrameIndexOutOfRange { .. } => "FrameIndexOutOfRange",
            DecodeError::InconsistentFrameCount { .. } => "InconsistentFrameCount",
            DecodeError::UnknownProtocol(_) => "UnknownProtocol",
            DecodeError::UnsupportedCrypto(_) => "UnsupportedCrypto",
            DecodeError::UnsupportedAction(_) => "UnsupportedAction",
            DecodeError::PayloadTooShort { .. } => "PayloadTooShort",
            DecodeError::UnknownNetwork(_) => "UnknownNetwork",
            DecodeError::InvalidCompactPrefix(_) => "InvalidCompactPrefix",
            DecodeError::HashingFailure(_) => "HashingFailure",
            DecodeError::AddressEncodingFailure(_) => "AddressEncodingFailure",
            DecodeError::IncompleteSequence { .. } => "IncompleteSequence",
        }
    }

    /// Returns true for failures caused by a corrupted or partial scan,
    /// where asking the user to rescan is the right response.
    pub fn is_rescan_hint(&self) -> bool {
        matches!(
            self,
            DecodeError::MalformedHex(_)
                | DecodeError::InvalidEnvelope(_)
                | DecodeError::LengthMismatch { .. }
                | DecodeError::FrameTooShort { .. }
                | DecodeError::InconsistentFrameCount { .. }
                | DecodeError::IncompleteSequence { .. }
        )
    }
}

/// Failure reported by a [`crate::hashing::PayloadHasher`]
#[derive(Debug, Error)]
pub enum HashError {
    /// Input rejected by the hashing backend
    #[error("input rejected: {0}")]
    InputRejected(String),

    /// Backend unavailable
    #[error("hasher unavailable: {0}")]
    Unavailable(String),
}

/// Failure reported by a [`crate::address::AddressEncoder`]
#[derive(Debug, Error)]
pub enum AddressError {
    /// Network prefix cannot be represented in the address format
    #[error("unsupported address prefix {0}")]
    UnsupportedPrefix(u16),

    /// Backend-specific failure
    #[error("{0}")]
    Other(String),
}

/// Errors loading or building a network registry
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Genesis hash string is not 32 bytes of hex
    #[error("invalid genesis hash {0:?}")]
    InvalidGenesisHash(String),

    /// Two entries share a genesis hash
    #[error("duplicate network for genesis hash {0}")]
    Duplicate(String),

    /// JSON could not be parsed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for decoding operations
pub type Result<T> = std::result::Result<T, DecodeError>;
