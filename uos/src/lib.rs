//! Uniform Online Signer (UOS) request decoding
//!
//! This crate turns the hex strings produced by scanning one or more QR codes
//! into classified signing requests for an air-gapped signer:
//! - Frame stripping removes QR filler and the binary-mode envelope
//! - Reassembly collects the frames of an animated QR sequence in any order
//! - Classification reads the protocol, crypto and action bytes
//! - Extraction builds the final [`SigningRequest`] for Substrate or Ethereum
//!
//! # Payload Layout
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │ frame header   00 | frame_count(be16) | frame_index(be16)     │
//! ├───────────────────────────────────────────────────────────────┤
//! │ Substrate      53 | crypto | action | key(32) | body | gen(32)│
//! │ Ethereum       45 | action | account(20) | data               │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Substrate payloads are only accepted for networks present in the
//! [`NetworkRegistry`] passed with each call. Extrinsics longer than 256
//! bytes are replaced by their blake2b-256 hash before signing.
//!
//! # Example
//!
//! ```rust,ignore
//! use uos::{decode_scan, DecodeOutcome, NetworkRegistry, ReassemblyState};
//!
//! let networks = NetworkRegistry::with_defaults();
//! let mut session = ReassemblyState::new();
//!
//! for scan in camera_frames {
//!     match decode_scan(&scan, &mut session, &networks) {
//!         DecodeOutcome::NeedMoreFrames { received, total } => show_progress(received, total),
//!         DecodeOutcome::Ready(request) => return review(request),
//!         DecodeOutcome::Failed(err) => show_error(err),
//!     }
//! }
//! ```

pub mod address;
pub mod classify;
pub mod config;
pub mod decoder;
pub mod error;
pub mod ethereum;
pub mod frame;
pub mod hashing;
pub mod network;
pub mod reassembly;
pub mod request;
pub mod substrate;

pub use address::{AddressEncoder, Ss58Encoder};
pub use classify::{classify, ClassifiedPayload};
pub use config::{DecoderConfig, DecoderConfigBuilder};
pub use decoder::{decode_scan, decode_sequence, DecodeOutcome, Decoder};
pub use error::{AddressError, DecodeError, HashError, RegistryError, Result};
pub use frame::{frame_count, normalize, strip, NormalizedFrame};
pub use hashing::{Blake2Hasher, PayloadHasher};
pub use network::{NetworkInfo, NetworkRegistry};
pub use reassembly::{ReassembledPayload, Reassembly, ReassemblyState};
pub use request::{
    CryptoAlgorithm, Protocol, SigningRequest, SubstrateMessage, SubstrateOversizedTransaction,
    SubstrateTransaction,
};
