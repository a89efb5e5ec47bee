//! Ethereum request extraction

use crate::address::eip55_checksum;
use crate::classify::{EthereumAction, EthereumPayload};
use crate::error::{DecodeError, Result};
use crate::request::SigningRequest;

/// Length of an Ethereum account
pub const ACCOUNT_LEN: usize = 20;

/// Split the account from the body and build the request.
///
/// Transaction bodies are RLP and are passed through without inspection.
pub fn extract(payload: EthereumPayload) -> Result<SigningRequest> {
    if payload.data.len() < ACCOUNT_LEN {
        return Err(DecodeError::PayloadTooShort {
            // count the two header bytes the classifier consumed
            len: payload.data.len() + 2,
            needed: ACCOUNT_LEN + 2,
        });
    }

    let mut data = payload.data;
    let body = data.split_off(ACCOUNT_LEN);
    let mut account = [0u8; ACCOUNT_LEN];
    account.copy_from_slice(&data);
    let account = eip55_checksum(&account);

    Ok(match payload.action {
        EthereumAction::SignRawData => SigningRequest::EthereumRawData { account, data: body },
        EthereumAction::SignTransaction => SigningRequest::EthereumTransaction { account, rlp: body },
    })
}
