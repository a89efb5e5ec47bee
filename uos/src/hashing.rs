//! Hashing capability used for oversized extrinsics

use blake2::{digest::consts::U32, Blake2b, Digest};

use crate::error::HashError;

/// Produces the 32-byte digest that replaces an oversized signable body.
///
/// Implementations are called synchronously, one call at a time.
pub trait PayloadHasher {
    fn hash(&self, data: &[u8]) -> Result<[u8; 32], HashError>;
}

/// blake2b with a 256-bit output, the hash Substrate signs for long payloads
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake2Hasher;

impl PayloadHasher for Blake2Hasher {
    fn hash(&self, data: &[u8]) -> Result<[u8; 32], HashError> {
        Ok(blake2_256(data))
    }
}

pub fn blake2_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Blake2b::<U32>::new();
    hasher.update(data);
    hasher.finalize().into()
}
