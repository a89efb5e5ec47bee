//! Account address rendering
//!
//! Substrate public keys are shown in SS58 form under the prefix of the
//! network they are used on. Ethereum accounts are shown as EIP-55
//! mixed-case checksummed hex.

use blake2::{Blake2b512, Digest};
use sha3::Keccak256;

use crate::error::AddressError;

/// Largest prefix the two-byte SS58 form can carry
pub const MAX_SS58_PREFIX: u16 = 16383;

const SS58_CONTEXT: &[u8] = b"SS58PRE";

/// Renders a 32-byte public key as a network-specific address.
pub trait AddressEncoder {
    fn encode(&self, public_key: &[u8; 32], prefix: u16) -> Result<String, AddressError>;
}

/// SS58 address encoder
#[derive(Clone, Copy, Debug, Default)]
pub struct Ss58Encoder;

impl AddressEncoder for Ss58Encoder {
    fn encode(&self, public_key: &[u8; 32], prefix: u16) -> Result<String, AddressError> {
        ss58_encode(public_key, prefix)
    }
}

/// Encode a public key in SS58 format
pub fn ss58_encode(public_key: &[u8; 32], prefix: u16) -> Result<String, AddressError> {
    if prefix > MAX_SS58_PREFIX {
        return Err(AddressError::UnsupportedPrefix(prefix));
    }

    let mut payload = Vec::with_capacity(2 + 32 + 2);

    if prefix < 64 {
        payload.push(prefix as u8);
    } else {
        payload.push(((prefix & 0x00FC) >> 2) as u8 | 0x40);
        payload.push(((prefix >> 8) as u8) | ((prefix & 0x0003) << 6) as u8);
    }
    payload.extend_from_slice(public_key);

    let mut hasher = Blake2b512::new();
    hasher.update(SS58_CONTEXT);
    hasher.update(&payload);
    let checksum = hasher.finalize();
    payload.extend_from_slice(&checksum[..2]);

    Ok(bs58::encode(payload).into_string())
}

/// Format a 20-byte Ethereum account with the EIP-55 checksum casing
pub fn eip55_checksum(account: &[u8; 20]) -> String {
    let hex_lower = hex::encode(account);
    let hash = Keccak256::digest(hex_lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in hex_lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0F };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}
