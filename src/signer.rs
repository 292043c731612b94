//! Ed25519 keys in NEAR's `ed25519:<base58>` text form

use borsh::BorshSerialize;
use ed25519_dalek::{Signer as _, SigningKey};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::io;
use std::str::FromStr;

use crate::error::{AirdropError, Result};

const ED25519_PREFIX: &str = "ed25519:";
const ED25519_KEY_TYPE: u8 = 0;

fn decode_ed25519(text: &str) -> Result<Vec<u8>> {
    let encoded = text.strip_prefix(ED25519_PREFIX).unwrap_or(text);
    if encoded.contains(':') {
        return Err(AirdropError::InvalidKey(format!("Unsupported key type in '{}'", text)));
    }
    bs58::decode(encoded)
        .into_vec()
        .map_err(|e| AirdropError::InvalidKey(format!("Invalid base58: {}", e)))
}

/// Ed25519 public key
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl FromStr for PublicKey {
    type Err = AirdropError;

    fn from_str(s: &str) -> Result<Self> {
        let bytes: [u8; 32] = decode_ed25519(s)?
            .try_into()
            .map_err(|v: Vec<u8>| AirdropError::InvalidKey(format!("Public key must be 32 bytes, got {}", v.len())))?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", ED25519_PREFIX, bs58::encode(self.0).into_string())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self)
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl BorshSerialize for PublicKey {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        BorshSerialize::serialize(&ED25519_KEY_TYPE, writer)?;
        BorshSerialize::serialize(&self.0, writer)
    }
}

/// Ed25519 signature
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; 64]);

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({}{})", ED25519_PREFIX, bs58::encode(self.0).into_string())
    }
}

impl BorshSerialize for Signature {
    fn serialize<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        BorshSerialize::serialize(&ED25519_KEY_TYPE, writer)?;
        BorshSerialize::serialize(&self.0, writer)
    }
}

/// Signing authority for a single account
#[derive(Clone)]
pub struct InMemorySigner {
    account_id: String,
    key: SigningKey,
}

impl InMemorySigner {
    /// Build from an `ed25519:<base58>` secret key.
    ///
    /// Accepts both the 64 byte keypair form written by near-cli and a bare
    /// 32 byte seed.
    pub fn from_secret_key(account_id: impl Into<String>, secret_key: &str) -> Result<Self> {
        let bytes = decode_ed25519(secret_key)?;
        let key = match bytes.len() {
            64 => {
                let mut keypair = [0u8; 64];
                keypair.copy_from_slice(&bytes);
                SigningKey::from_keypair_bytes(&keypair)
                    .map_err(|e| AirdropError::InvalidKey(format!("Inconsistent keypair: {}", e)))?
            }
            32 => {
                let mut seed = [0u8; 32];
                seed.copy_from_slice(&bytes);
                SigningKey::from_bytes(&seed)
            }
            n => {
                return Err(AirdropError::InvalidKey(format!(
                    "Secret key must be 32 or 64 bytes, got {}",
                    n
                )))
            }
        };

        Ok(Self {
            account_id: account_id.into(),
            key,
        })
    }

    /// Build from a raw 32 byte seed
    pub fn from_seed(account_id: impl Into<String>, seed: [u8; 32]) -> Self {
        Self {
            account_id: account_id.into(),
            key: SigningKey::from_bytes(&seed),
        }
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.key.verifying_key().to_bytes())
    }

    pub fn sign(&self, message: &[u8]) -> Signature {
        Signature(self.key.sign(message).to_bytes())
    }

    /// Secret key in the 64 byte keypair text form
    pub fn secret_key_string(&self) -> String {
        format!(
            "{}{}",
            ED25519_PREFIX,
            bs58::encode(self.key.to_keypair_bytes()).into_string()
        )
    }
}

impl fmt::Debug for InMemorySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemorySigner")
            .field("account_id", &self.account_id)
            .field("public_key", &self.public_key())
            .finish_non_exhaustive()
    }
}
