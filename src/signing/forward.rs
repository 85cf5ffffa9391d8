//! Forward requests: construction, hashing, signing.
//!
//! A `ForwardRequest` wraps encoded market-contract call data together
//! with the signer's address and an anti-replay nonce. The request is
//! hashed under the forwarder's EIP-712 domain and signed off-chain;
//! the resulting `{forwardRequest, signature}` pair is the complete
//! artifact the relay endpoint accepts.

use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use super::domain::ForwarderDomain;
use super::intent::{self, OrderIntent};
use super::signer::RequestSigner;
use crate::Result;

/// Canonical type string of the forwarder's request struct. Must match
/// the deployed contract byte for byte.
const FORWARD_REQUEST_TYPE: &[u8] =
    b"ForwardRequest(address from,address market,uint256 value,uint256 nonce,bytes data)";

/// The struct the forwarder contract verifies.
///
/// `value` is fixed at zero for all order operations. Constructed,
/// hashed, signed and transmitted within a single request; never
/// reused.
#[derive(Debug, Clone)]
pub struct ForwardRequest {
    /// Signer's wallet address.
    pub from: Address,
    /// Target market contract.
    pub market: Address,
    /// Native value forwarded with the call; always zero here.
    pub value: U256,
    /// Unique per `from` to prevent replay.
    pub nonce: U256,
    /// Encoded contract call (selector + ABI-encoded arguments).
    pub data: Bytes,
}

impl ForwardRequest {
    /// Create a request with `value = 0`.
    pub fn new(from: Address, market: Address, nonce: U256, data: Bytes) -> Self {
        Self {
            from,
            market,
            value: U256::ZERO,
            nonce,
            data,
        }
    }

    /// EIP-712 struct hash.
    ///
    /// The dynamic `data` field is represented by its own keccak hash
    /// inside the encoding, per the standard's encodeData rule.
    pub fn struct_hash(&self) -> B256 {
        let type_hash = alloy_primitives::keccak256(FORWARD_REQUEST_TYPE);
        let data_hash = alloy_primitives::keccak256(&self.data);

        // Addresses are left-padded from 20 to 32 bytes.
        let from_padded = B256::left_padding_from(self.from.as_slice());
        let market_padded = B256::left_padding_from(self.market.as_slice());

        let encoded = (
            type_hash,
            from_padded,
            market_padded,
            self.value,
            self.nonce,
            data_hash,
        )
            .abi_encode_packed();

        alloy_primitives::keccak256(&encoded)
    }

    /// Final signing digest:
    /// `keccak256(0x1901 ‖ domainSeparator ‖ structHash)`.
    pub fn signing_digest(&self, domain: &ForwarderDomain) -> B256 {
        let prefix = [0x19u8, 0x01];
        let encoded = (prefix, domain.separator(), self.struct_hash()).abi_encode_packed();
        alloy_primitives::keccak256(&encoded)
    }
}

/// Wire form of a [`ForwardRequest`] for the relay's JSON body:
/// addresses and `data` as `0x` hex strings, `value`/`nonce` as decimal
/// strings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForwardRequestPayload {
    pub from: String,
    pub market: String,
    pub value: String,
    pub nonce: String,
    pub data: String,
}

impl From<&ForwardRequest> for ForwardRequestPayload {
    fn from(request: &ForwardRequest) -> Self {
        Self {
            from: request.from.to_string(),
            market: request.market.to_string(),
            value: request.value.to_string(),
            nonce: request.nonce.to_string(),
            data: format!("0x{}", hex::encode(&request.data)),
        }
    }
}

/// A signed forward request, ready for relay submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignedForwardRequest {
    #[serde(rename = "forwardRequest")]
    pub forward_request: ForwardRequestPayload,
    /// 65-byte `r ‖ s ‖ v` signature as a `0x` hex string.
    pub signature: String,
}

/// Builds, hashes and signs forward requests for one wallet.
///
/// Performs no network I/O. Nonces are drawn from an atomic counter
/// seeded once from wall-clock milliseconds, so they are strictly
/// increasing within a process even under rapid submission (raw
/// timestamps can repeat).
#[derive(Debug)]
pub struct ForwardRequestBuilder {
    signer: RequestSigner,
    domain: ForwarderDomain,
    nonce: AtomicU64,
}

impl ForwardRequestBuilder {
    /// Create a builder for the given signer and forwarder domain.
    pub fn new(signer: RequestSigner, domain: ForwarderDomain) -> Self {
        Self {
            signer,
            domain,
            nonce: AtomicU64::new(unix_millis()),
        }
    }

    /// The wallet address requests are signed for.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Claim the next nonce.
    pub fn next_nonce(&self) -> u64 {
        self.nonce.fetch_add(1, Ordering::Relaxed)
    }

    /// Resolve, encode and sign an order intent against a market.
    pub fn build_order(&self, market: Address, order: &OrderIntent) -> Result<SignedForwardRequest> {
        let (spec, args) = intent::resolve(order)?;
        let data = spec.encode(&args)?;
        self.sign_request(market, data)
    }

    /// Encode and sign a batch cancel for the given order ids.
    pub fn build_cancel(&self, market: Address, order_ids: &[u64]) -> Result<SignedForwardRequest> {
        let (spec, args) = intent::resolve_cancel(order_ids)?;
        let data = spec.encode(&args)?;
        self.sign_request(market, data)
    }

    fn sign_request(&self, market: Address, data: Bytes) -> Result<SignedForwardRequest> {
        let request = ForwardRequest::new(
            self.address(),
            market,
            U256::from(self.next_nonce()),
            data,
        );
        let digest = request.signing_digest(&self.domain);
        let signature = self.signer.sign_digest_hex(digest)?;

        Ok(SignedForwardRequest {
            forward_request: ForwardRequestPayload::from(&request),
            signature,
        })
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
