//! Forward-request signing for the Kuru order book.
//!
//! Orders are not sent to the exchange directly: the wallet signs an
//! EIP-712 `ForwardRequest` off-chain and a relayer submits it to the
//! `KuruForwarder` contract, which verifies the signature and executes
//! the embedded call against the market contract.
//!
//! # Architecture
//!
//! ```text
//! OrderIntent ── resolve ──► CallSpec + args
//!                                 │ encode (calldata)
//!                                 ▼
//!                        ForwardRequest { from, market, 0, nonce, data }
//!                                 │ struct hash + domain separator
//!                                 ▼
//!                        keccak256(0x1901 ‖ domain ‖ struct)
//!                                 │ secp256k1 (RFC 6979)
//!                                 ▼
//!                        SignedForwardRequest ──► relay POST body
//! ```
//!
//! Every step is a pure, synchronous computation; any byte deviation in
//! the calldata or the typed-data hash produces a signature the
//! forwarder rejects.

pub mod calldata;
pub mod domain;
pub mod forward;
pub mod intent;
pub mod signer;

pub use calldata::{ParamType, ParamValue};
pub use domain::{
    ForwarderDomain, DEFAULT_CHAIN_ID, DEFAULT_FORWARDER_ADDRESS, FORWARDER_DOMAIN_NAME,
    FORWARDER_DOMAIN_VERSION,
};
pub use forward::{ForwardRequest, ForwardRequestBuilder, ForwardRequestPayload, SignedForwardRequest};
pub use intent::{CallSpec, OrderIntent, OrderSide, OrderType};
pub use signer::RequestSigner;

use crate::{Error, Result};
use alloy_primitives::B256;

/// keccak-256 over a hex string (`0x` prefix optional).
///
/// Validates the input before hashing: odd length or non-hex characters
/// fail with [`Error::MalformedHex`].
pub fn keccak256_hex(input: &str) -> Result<B256> {
    let stripped = input.strip_prefix("0x").unwrap_or(input);
    let bytes = hex::decode(stripped).map_err(|e| Error::MalformedHex {
        message: format!("cannot hash {input:?}: {e}"),
    })?;
    Ok(alloy_primitives::keccak256(bytes))
}
