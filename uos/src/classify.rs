//! UOS payload classification
//!
//! The first bytes of a reassembled payload name the protocol family, the
//! crypto algorithm (Substrate only) and the requested action:
//!
//! ```text
//! Ethereum:  45 | action | account(20) | data
//! Substrate: 53 | crypto | action | public key(32) | body | genesis hash(32)
//! ```

use crate::error::{DecodeError, Result};
use crate::network::{NetworkInfo, NetworkRegistry};
use crate::request::CryptoAlgorithm;

pub const ETHEREUM_PROTOCOL: u8 = 0x45;
pub const SUBSTRATE_PROTOCOL: u8 = 0x53;

pub const ETHEREUM_SIGN_TRANSACTION: u8 = 0x00;
pub const ETHEREUM_SIGN_RAW_DATA: u8 = 0x01;

pub const CRYPTO_ED25519: u8 = 0x00;
pub const CRYPTO_SR25519: u8 = 0x01;

pub const SUBSTRATE_MORTAL_TRANSACTION: u8 = 0x00;
pub const SUBSTRATE_SIGN_HASH: u8 = 0x01;
pub const SUBSTRATE_IMMORTAL_TRANSACTION: u8 = 0x02;
pub const SUBSTRATE_SIGN_MESSAGE: u8 = 0x03;

const ETHEREUM_HEADER_LEN: usize = 2;
const SUBSTRATE_HEADER_LEN: usize = 3;
const PUBLIC_KEY_LEN: usize = 32;
const GENESIS_HASH_LEN: usize = 32;

/// Minimum Substrate payload: header, public key and genesis hash with an empty body
pub const SUBSTRATE_MIN_LEN: usize = SUBSTRATE_HEADER_LEN + PUBLIC_KEY_LEN + GENESIS_HASH_LEN;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EthereumAction {
    SignTransaction,
    SignRawData,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubstrateAction {
    MortalTransaction,
    SignHash,
    ImmortalTransaction,
    SignMessage,
}

/// Ethereum request with its header consumed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EthereumPayload {
    pub action: EthereumAction,
    /// Account followed by the data or RLP body
    pub data: Vec<u8>,
}

/// Substrate request split into its fixed fields
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubstratePayload {
    pub crypto_algorithm: CryptoAlgorithm,
    pub action: SubstrateAction,
    pub public_key: [u8; 32],
    pub body: Vec<u8>,
    pub genesis_hash: [u8; 32],
    /// Registry entry for `genesis_hash`
    pub network: NetworkInfo,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassifiedPayload {
    Ethereum(EthereumPayload),
    Substrate(SubstratePayload),
}

/// Classify a reassembled payload.
///
/// Substrate payloads are accepted only for networks present in `networks`.
pub fn classify(payload: &[u8], networks: &NetworkRegistry) -> Result<ClassifiedPayload> {
    let protocol = *payload.first().ok_or(DecodeError::PayloadTooShort {
        len: 0,
        needed: 1,
    })?;

    let classified = match protocol {
        ETHEREUM_PROTOCOL => ClassifiedPayload::Ethereum(classify_ethereum(payload)?),
        SUBSTRATE_PROTOCOL => ClassifiedPayload::Substrate(classify_substrate(payload, networks)?),
        other => return Err(DecodeError::UnknownProtocol(other)),
    };

    tracing::debug!(
        protocol,
        payload_len = payload.len(),
        "Classified payload"
    );

    Ok(classified)
}

fn classify_ethereum(payload: &[u8]) -> Result<EthereumPayload> {
    if payload.len() < ETHEREUM_HEADER_LEN {
        return Err(DecodeError::PayloadTooShort {
            len: payload.len(),
            needed: ETHEREUM_HEADER_LEN,
        });
    }

    let action = match payload[1] {
        ETHEREUM_SIGN_TRANSACTION => EthereumAction::SignTransaction,
        ETHEREUM_SIGN_RAW_DATA => EthereumAction::SignRawData,
        other => return Err(DecodeError::UnsupportedAction(other)),
    };

    Ok(EthereumPayload {
        action,
        data: payload[ETHEREUM_HEADER_LEN..].to_vec(),
    })
}

fn classify_substrate(payload: &[u8], networks: &NetworkRegistry) -> Result<SubstratePayload> {
    if payload.len() < SUBSTRATE_HEADER_LEN {
        return Err(DecodeError::PayloadTooShort {
            len: payload.len(),
            needed: SUBSTRATE_HEADER_LEN,
        });
    }

    let crypto_algorithm = match payload[1] {
        CRYPTO_ED25519 => CryptoAlgorithm::Ed25519,
        CRYPTO_SR25519 => CryptoAlgorithm::Sr25519,
        other => return Err(DecodeError::UnsupportedCrypto(other)),
    };

    let action = match payload[2] {
        SUBSTRATE_MORTAL_TRANSACTION => SubstrateAction::MortalTransaction,
        SUBSTRATE_SIGN_HASH => SubstrateAction::SignHash,
        SUBSTRATE_IMMORTAL_TRANSACTION => SubstrateAction::ImmortalTransaction,
        SUBSTRATE_SIGN_MESSAGE => SubstrateAction::SignMessage,
        other => return Err(DecodeError::UnsupportedAction(other)),
    };

    if payload.len() < SUBSTRATE_MIN_LEN {
        return Err(DecodeError::PayloadTooShort {
            len: payload.len(),
            needed: SUBSTRATE_MIN_LEN,
        });
    }

    let key_end = SUBSTRATE_HEADER_LEN + PUBLIC_KEY_LEN;
    let genesis_start = payload.len() - GENESIS_HASH_LEN;

    let mut public_key = [0u8; 32];
    public_key.copy_from_slice(&payload[SUBSTRATE_HEADER_LEN..key_end]);
    let mut genesis_hash = [0u8; 32];
    genesis_hash.copy_from_slice(&payload[genesis_start..]);

    let network = networks.get(&genesis_hash).cloned().ok_or_else(|| {
        tracing::warn!(
            genesis_hash = %hex::encode(genesis_hash),
            "Refusing payload for unknown network"
        );
        DecodeError::UnknownNetwork(genesis_hash)
    })?;

    Ok(SubstratePayload {
        crypto_algorithm,
        action,
        public_key,
        body: payload[key_end..genesis_start].to_vec(),
        genesis_hash,
        network,
    })
}
