//! secp256k1 signing of forward-request digests.
//!
//! Signatures use deterministic nonces (RFC 6979), so signing the same
//! digest with the same key always yields the same `(r, s)`. The wire
//! format is the 65-byte `r ‖ s ‖ v` layout the forwarder contract
//! verifies, with `v` in the legacy `{27, 28}` convention.

use alloy_primitives::{Address, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use std::str::FromStr;

use crate::{Error, Result};

/// Length of the serialized signature: 32-byte `r`, 32-byte `s`, one
/// recovery byte.
pub const SIGNATURE_LEN: usize = 65;

/// Signs 32-byte digests with a secp256k1 private key.
#[derive(Clone)]
pub struct RequestSigner {
    inner: PrivateKeySigner,
}

impl RequestSigner {
    /// Create a signer from a hex-encoded private key (`0x` optional).
    ///
    /// Fails with [`Error::Signing`] if the key is not a valid non-zero
    /// scalar below the curve order.
    pub fn from_hex(private_key: &str) -> Result<Self> {
        let inner = PrivateKeySigner::from_str(private_key).map_err(|e| Error::Signing {
            message: format!("invalid secp256k1 private key: {e}"),
        })?;
        Ok(Self { inner })
    }

    /// The wallet address derived from the private key.
    pub fn address(&self) -> Address {
        self.inner.address()
    }

    /// Sign a 32-byte digest, returning the 65-byte `r ‖ s ‖ v` wire
    /// form.
    ///
    /// `r` and `s` are fixed-width big-endian; `v` is the recovery
    /// parity normalized to 27/28.
    pub fn sign_digest(&self, digest: B256) -> Result<[u8; SIGNATURE_LEN]> {
        let signature = self
            .inner
            .sign_hash_sync(&digest)
            .map_err(|e| Error::Signing {
                message: format!("failed to sign digest: {e}"),
            })?;

        let mut out = [0u8; SIGNATURE_LEN];
        out[..32].copy_from_slice(&signature.r().to_be_bytes::<32>());
        out[32..64].copy_from_slice(&signature.s().to_be_bytes::<32>());
        out[64] = 27 + signature.v() as u8;
        Ok(out)
    }

    /// Sign a digest and return the `0x`-prefixed 130-hex-char string
    /// form expected by the relay.
    pub fn sign_digest_hex(&self, digest: B256) -> Result<String> {
        Ok(format!("0x{}", hex::encode(self.sign_digest(digest)?)))
    }
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("address", &format!("{:?}", self.address()))
            .finish()
    }
}
