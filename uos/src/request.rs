//! Decoded signing requests
//!
//! A [`SigningRequest`] is the final product of the decoder. It is built
//! once by an extractor and then only read: shown to the user for review
//! and handed to the signing primitive via [`SigningRequest::signable_bytes`].

use serde::{Deserialize, Serialize};

const BYTES_START: &[u8] = b"<Bytes>";
const BYTES_END: &[u8] = b"</Bytes>";

/// Protocol family of a request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Ethereum,
    Substrate,
}

/// Signature scheme named by a Substrate payload
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CryptoAlgorithm {
    Ed25519,
    Sr25519,
}

/// Extrinsic signed directly
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstrateTransaction {
    pub crypto_algorithm: CryptoAlgorithm,
    #[serde(with = "serde_hex")]
    pub public_key: [u8; 32],
    /// SS58 form of `public_key` under the network prefix
    pub address: String,
    #[serde(with = "serde_hex")]
    pub genesis_hash: [u8; 32],
    pub network_key: String,
    /// False for immortal extrinsics
    pub mortal: bool,
    #[serde(with = "serde_hex")]
    pub body: Vec<u8>,
}

/// Extrinsic whose body is too long to sign inline.
///
/// The signature covers `hashed_body`; `body` is kept for review.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstrateOversizedTransaction {
    pub crypto_algorithm: CryptoAlgorithm,
    #[serde(with = "serde_hex")]
    pub public_key: [u8; 32],
    pub address: String,
    #[serde(with = "serde_hex")]
    pub genesis_hash: [u8; 32],
    pub network_key: String,
    pub mortal: bool,
    #[serde(with = "serde_hex")]
    pub body: Vec<u8>,
    #[serde(with = "serde_hex")]
    pub hashed_body: [u8; 32],
}

/// Raw message or pre-computed hash
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstrateMessage {
    pub crypto_algorithm: CryptoAlgorithm,
    #[serde(with = "serde_hex")]
    pub public_key: [u8; 32],
    pub address: String,
    #[serde(with = "serde_hex")]
    pub genesis_hash: [u8; 32],
    pub network_key: String,
    /// True when `body` is a hash computed by the requesting application
    pub is_hash: bool,
    #[serde(with = "serde_hex")]
    pub body: Vec<u8>,
}

impl SubstrateMessage {
    /// Text to show the user before signing.
    ///
    /// A `<Bytes>..</Bytes>` wrapper is removed. Content that is not UTF-8,
    /// and every hash, is shown as lowercase hex.
    pub fn display_text(&self) -> String {
        if self.is_hash {
            return hex::encode(&self.body);
        }

        let inner = if self.body.starts_with(BYTES_START)
            && self.body.ends_with(BYTES_END)
            && self.body.len() >= BYTES_START.len() + BYTES_END.len()
        {
            &self.body[BYTES_START.len()..self.body.len() - BYTES_END.len()]
        } else {
            &self.body[..]
        };

        match std::str::from_utf8(inner) {
            Ok(text) => text.to_string(),
            Err(_) => hex::encode(inner),
        }
    }
}

/// A fully classified request, ready for review and signing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SigningRequest {
    EthereumRawData {
        /// EIP-55 checksummed account
        account: String,
        #[serde(with = "serde_hex")]
        data: Vec<u8>,
    },
    EthereumTransaction {
        account: String,
        /// RLP-encoded transaction, not interpreted by the decoder
        #[serde(with = "serde_hex")]
        rlp: Vec<u8>,
    },
    SubstrateTransaction(SubstrateTransaction),
    SubstrateOversizedTransaction(SubstrateOversizedTransaction),
    SubstrateMessage(SubstrateMessage),
}

impl SigningRequest {
    pub fn protocol(&self) -> Protocol {
        match self {
            SigningRequest::EthereumRawData { .. } | SigningRequest::EthereumTransaction { .. } => {
                Protocol::Ethereum
            }
            SigningRequest::SubstrateTransaction(_)
            | SigningRequest::SubstrateOversizedTransaction(_)
            | SigningRequest::SubstrateMessage(_) => Protocol::Substrate,
        }
    }

    /// Whether the signable bytes are a hash rather than the content itself
    pub fn is_hash(&self) -> bool {
        match self {
            SigningRequest::EthereumRawData { .. }
            | SigningRequest::EthereumTransaction { .. }
            | SigningRequest::SubstrateTransaction(_) => false,
            SigningRequest::SubstrateOversizedTransaction(_) => true,
            SigningRequest::SubstrateMessage(msg) => msg.is_hash,
        }
    }

    /// The exact bytes handed to the signing primitive
    pub fn signable_bytes(&self) -> &[u8] {
        match self {
            SigningRequest::EthereumRawData { data, .. } => data.as_slice(),
            SigningRequest::EthereumTransaction { rlp, .. } => rlp.as_slice(),
            SigningRequest::SubstrateTransaction(tx) => tx.body.as_slice(),
            SigningRequest::SubstrateOversizedTransaction(tx) => &tx.hashed_body[..],
            SigningRequest::SubstrateMessage(msg) => msg.body.as_slice(),
        }
    }

    /// Short name of the variant, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            SigningRequest::EthereumRawData { .. } => "EthereumRawData",
            SigningRequest::EthereumTransaction { .. } => "EthereumTransaction",
            SigningRequest::SubstrateTransaction(_) => "SubstrateTransaction",
            SigningRequest::SubstrateOversizedTransaction(_) => "SubstrateOversizedTransaction",
            SigningRequest::SubstrateMessage(_) => "SubstrateMessage",
        }
    }
}

/// `0x`-prefixed hex for byte fields
mod serde_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: AsRef<[u8]>,
    {
        serializer.serialize_str(&format!("0x{}", hex::encode(value.as_ref())))
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: TryFrom<Vec<u8>>,
    {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("0x").unwrap_or(&s);
        let bytes = hex::decode(digits).map_err(serde::de::Error::custom)?;
        T::try_from(bytes).map_err(|_| serde::de::Error::custom("unexpected byte length"))
    }
}
