//! Registry of networks the signer is willing to sign for
//!
//! Substrate payloads end with the genesis hash of the chain they target.
//! A payload for a chain missing from the registry is refused.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Display and encoding metadata for one network
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    /// Stable identifier, the `0x`-prefixed genesis hash for built-in networks
    pub network_key: String,
    /// SS58 address prefix
    pub prefix: u16,
    /// Human readable name
    pub title: String,
}

#[derive(Serialize, Deserialize)]
struct NetworkEntry {
    genesis_hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    network_key: Option<String>,
    prefix: u16,
    title: String,
}

/// Genesis hash to network lookup
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkRegistry {
    networks: BTreeMap<[u8; 32], NetworkInfo>,
}

const DEFAULT_NETWORKS: &[(&str, u16, &str)] = &[
    (
        "742a2ca70c2fda6cee4f8df98d64c4c670a052d9568058982dad9d5a7a135c5b",
        7,
        "Edgeware",
    ),
    (
        "f7a99d3cb92853d00d5275c971c132c074636256583fee53b3bbe60d7b8769ba",
        16,
        "Kulupu",
    ),
    (
        "b0a8d493285c2df73290dfb7e61f870f17b41801197a149ca93654499ea3dafe",
        2,
        "Kusama",
    ),
    (
        "91b171bb158e2d3848fa23a9f1c25182fb8e20313b2c1eb49219da7a70ce90c3",
        0,
        "Polkadot",
    ),
    (
        "78ae7dc7e64637e01fa6a6b6e4fa252c486f62af7aa71c471ad17f015bd375ce",
        0,
        "Rococo",
    ),
    (
        "e143f23803ac50e8f6f8e62695d1ce9e4e1d68aa36c1cd2cfd15340213f3423e",
        42,
        "Westend",
    ),
];

/// Parse a 32-byte genesis hash with or without `0x`
pub fn parse_genesis_hash(s: &str) -> Result<[u8; 32], RegistryError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(digits)
        .ok()
        .and_then(|bytes| <[u8; 32]>::try_from(bytes).ok())
        .ok_or_else(|| RegistryError::InvalidGenesisHash(s.to_string()))
}

impl NetworkRegistry {
    /// Empty registry; every Substrate payload will be refused
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the networks shipped with the signer
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (genesis, prefix, title) in DEFAULT_NETWORKS {
            let mut hash = [0u8; 32];
            if hex::decode_to_slice(genesis, &mut hash).is_ok() {
                registry.networks.insert(
                    hash,
                    NetworkInfo {
                        network_key: format!("0x{genesis}"),
                        prefix: *prefix,
                        title: (*title).to_string(),
                    },
                );
            }
        }
        registry
    }

    /// Add a network. Fails when the genesis hash is already registered.
    pub fn insert(
        &mut self,
        genesis_hash: [u8; 32],
        info: NetworkInfo,
    ) -> Result<(), RegistryError> {
        if self.networks.contains_key(&genesis_hash) {
            return Err(RegistryError::Duplicate(format!(
                "0x{}",
                hex::encode(genesis_hash)
            )));
        }
        self.networks.insert(genesis_hash, info);
        Ok(())
    }

    pub fn get(&self, genesis_hash: &[u8; 32]) -> Option<&NetworkInfo> {
        self.networks.get(genesis_hash)
    }

    pub fn contains(&self, genesis_hash: &[u8; 32]) -> bool {
        self.networks.contains_key(genesis_hash)
    }

    pub fn len(&self) -> usize {
        self.networks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.networks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[u8; 32], &NetworkInfo)> {
        self.networks.iter()
    }

    /// Load a registry from a JSON array of
    /// `{ "genesis_hash", "network_key"?, "prefix", "title" }` objects.
    ///
    /// A missing `network_key` defaults to the `0x`-prefixed genesis hash.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let entries: Vec<NetworkEntry> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for entry in entries {
            let hash = parse_genesis_hash(&entry.genesis_hash)?;
            let network_key = entry
                .network_key
                .unwrap_or_else(|| format!("0x{}", hex::encode(hash)));
            registry.insert(
                hash,
                NetworkInfo {
                    network_key,
                    prefix: entry.prefix,
                    title: entry.title,
                },
            )?;
        }
        tracing::debug!(networks = registry.len(), "Loaded network registry");
        Ok(registry)
    }

    /// Serialize the registry in the format accepted by [`Self::from_json`]
    pub fn to_json(&self) -> Result<String, RegistryError> {
        let entries: Vec<NetworkEntry> = self
            .networks
            .iter()
            .map(|(hash, info)| NetworkEntry {
                genesis_hash: format!("0x{}", hex::encode(hash)),
                network_key: Some(info.network_key.clone()),
                prefix: info.prefix,
                title: info.title.clone(),
            })
            .collect();
        Ok(serde_json::to_string_pretty(&entries)?)
    }
}
