//! Signing identity derived from configured key material.
//!
//! # Security
//! - The private key is parsed once and held only inside [`SigningIdentity`]
//! - Key material is never logged or serialized; `Debug` shows the address only

use ed25519_dalek::{Signer, SigningKey, VerifyingKey};
use sha3::{Digest, Sha3_256};
use std::fmt;

use crate::chain::address::AccountAddress;
use crate::chain::types::{ChainError, ChainResult};

/// Prefix marker for Ed25519 private keys (AIP-80 format).
pub const PRIVATE_KEY_PREFIX: &str = "ed25519-priv-";

/// Prefix marker for Ed25519 public keys.
pub const PUBLIC_KEY_PREFIX: &str = "ed25519-pub-";

/// Authentication scheme byte for single Ed25519 keys.
const ED25519_SCHEME: u8 = 0x00;

/// Ed25519 signing identity with its derived account address.
pub struct SigningIdentity {
    signing_key: SigningKey,
    public_key: VerifyingKey,
    address: AccountAddress,
}

impl SigningIdentity {
    /// Parse a private key.
    ///
    /// Accepts `ed25519-priv-0x<hex>`, `0x<hex>` or bare hex (64 digits).
    pub fn from_private_key(private_key: &str) -> ChainResult<Self> {
        let bytes = decode_key_hex(private_key, PRIVATE_KEY_PREFIX)
            .map_err(|e| ChainError::Configuration(format!("Invalid private key format: {}", e)))?;

        let signing_key = SigningKey::from_bytes(&bytes);
        let public_key = signing_key.verifying_key();
        let address = derive_address(&public_key);

        tracing::info!(address = %address, "Signing identity initialized");

        Ok(Self {
            signing_key,
            public_key,
            address,
        })
    }

    /// Parse a private key and check it against an expected public key.
    pub fn from_key_pair(private_key: &str, public_key: &str) -> ChainResult<Self> {
        let identity = Self::from_private_key(private_key)?;
        let expected = decode_key_hex(public_key, PUBLIC_KEY_PREFIX)
            .map_err(|e| ChainError::Configuration(format!("Invalid public key format: {}", e)))?;

        if identity.public_key.as_bytes() != &expected {
            return Err(ChainError::Configuration(
                "Public key does not match private key".to_string(),
            ));
        }
        Ok(identity)
    }

    /// Account address controlled by this identity.
    pub fn address(&self) -> AccountAddress {
        self.address
    }

    /// Public key as `0x`-prefixed hex.
    pub fn public_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.public_key.as_bytes()))
    }

    /// Sign a message, returning the 64-byte signature as `0x`-prefixed hex.
    pub fn sign(&self, message: &[u8]) -> String {
        let signature = self.signing_key.sign(message);
        format!("0x{}", hex::encode(signature.to_bytes()))
    }

    #[cfg(test)]
    pub(crate) fn verifying_key(&self) -> VerifyingKey {
        self.public_key
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Account address of a single-key Ed25519 account: `sha3_256(public_key || 0x00)`.
pub fn derive_address(public_key: &VerifyingKey) -> AccountAddress {
    let mut hasher = Sha3_256::new();
    hasher.update(public_key.as_bytes());
    hasher.update([ED25519_SCHEME]);
    let digest: [u8; 32] = hasher.finalize().into();
    AccountAddress::new(digest)
}

fn decode_key_hex(input: &str, prefix: &str) -> Result<[u8; 32], String> {
    let trimmed = input.trim();
    let without_marker = trimmed.strip_prefix(prefix).unwrap_or(trimmed);
    let digits = without_marker
        .strip_prefix("0x")
        .unwrap_or(without_marker);

    let decoded = hex::decode(digits).map_err(|e| e.to_string())?;
    decoded
        .try_into()
        .map_err(|v: Vec<u8>| format!("expected 32 bytes, got {}", v.len()))
}
