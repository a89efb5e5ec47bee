//! Substrate request extraction

use codec::{Compact, Decode};

use crate::address::AddressEncoder;
use crate::classify::{SubstrateAction, SubstratePayload};
use crate::config::DecoderConfig;
use crate::error::{DecodeError, Result};
use crate::hashing::PayloadHasher;
use crate::request::{
    SigningRequest, SubstrateMessage, SubstrateOversizedTransaction, SubstrateTransaction,
};

/// Build the signing request for a classified Substrate payload.
///
/// Extrinsics longer than `config.inline_signing_limit` are signed by hash:
/// the SCALE compact length prefix is dropped and the rest is hashed with
/// `hasher`. Messages and hashes are passed through unchanged.
pub fn extract<H, E>(
    payload: SubstratePayload,
    hasher: &H,
    encoder: &E,
    config: &DecoderConfig,
) -> Result<SigningRequest>
where
    H: PayloadHasher + ?Sized,
    E: AddressEncoder + ?Sized,
{
    let SubstratePayload {
        crypto_algorithm,
        action,
        public_key,
        body,
        genesis_hash,
        network,
    } = payload;

    let address = encoder.encode(&public_key, network.prefix)?;
    let network_key = network.network_key;

    let request = match action {
        SubstrateAction::MortalTransaction | SubstrateAction::ImmortalTransaction => {
            let mortal = action == SubstrateAction::MortalTransaction;

            if body.len() > config.inline_signing_limit {
                let hashed_body = hash_extrinsic(&body, hasher)?;
                tracing::debug!(
                    body_len = body.len(),
                    limit = config.inline_signing_limit,
                    "Extrinsic too long to sign inline, signing hash"
                );
                SigningRequest::SubstrateOversizedTransaction(SubstrateOversizedTransaction {
                    crypto_algorithm,
                    public_key,
                    address,
                    genesis_hash,
                    network_key,
                    mortal,
                    body,
                    hashed_body,
                })
            } else {
                SigningRequest::SubstrateTransaction(SubstrateTransaction {
                    crypto_algorithm,
                    public_key,
                    address,
                    genesis_hash,
                    network_key,
                    mortal,
                    body,
                })
            }
        }
        SubstrateAction::SignHash | SubstrateAction::SignMessage => {
            SigningRequest::SubstrateMessage(SubstrateMessage {
                crypto_algorithm,
                public_key,
                address,
                genesis_hash,
                network_key,
                is_hash: action == SubstrateAction::SignHash,
                body,
            })
        }
    };

    Ok(request)
}

/// Drop the compact length prefix and hash what follows
fn hash_extrinsic<H>(body: &[u8], hasher: &H) -> Result<[u8; 32]>
where
    H: PayloadHasher + ?Sized,
{
    let mut input = body;
    Compact::<u32>::decode(&mut input)
        .map_err(|err| DecodeError::InvalidCompactPrefix(err.to_string()))?;
    Ok(hasher.hash(input)?)
}
