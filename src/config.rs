//! Configuration for the Kuru client.
//!
//! All values are resolved once, at construction time. Switching modes
//! (e.g. sandbox) produces a new `KuruConfig` value; nothing is mutated
//! in place.

use crate::{Error, Result};
use alloy_primitives::Address;
use std::env;

use crate::signing::domain::{DEFAULT_CHAIN_ID, DEFAULT_FORWARDER_ADDRESS};

/// Default REST endpoint for both market data and order submission.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:9090";

/// Client configuration.
///
/// `wallet_address` and `private_key` are the exchange's required
/// credentials; there is no API key or secret. The forwarder address,
/// chain id and domain name/version must match the deployed
/// `KuruForwarder` contract exactly or every signature will be rejected.
#[derive(Debug, Clone)]
pub struct KuruConfig {
    /// Base URL of the Kuru REST API.
    pub base_url: String,
    /// Wallet address orders are signed for.
    pub wallet_address: Address,
    /// Hex-encoded secp256k1 private key (with or without `0x`).
    pub private_key: String,
    /// Address of the verifying `KuruForwarder` contract.
    pub forwarder_address: Address,
    /// Chain id of the deployment.
    pub chain_id: u64,
    /// Whether the client targets the sandbox deployment. Both
    /// deployments currently serve from [`DEFAULT_BASE_URL`], so the
    /// flag does not change the endpoint on its own; combine with
    /// [`KuruConfig::with_base_url`] once the hosts diverge.
    pub sandbox: bool,
}

impl KuruConfig {
    /// Create a configuration with the default endpoint, forwarder and
    /// chain id.
    pub fn new(wallet_address: Address, private_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            wallet_address,
            private_key: private_key.into(),
            forwarder_address: parse_address("forwarder_address", DEFAULT_FORWARDER_ADDRESS)
                .expect("default forwarder address is valid"),
            chain_id: DEFAULT_CHAIN_ID,
            sandbox: false,
        }
    }

    /// Load configuration from environment variables (reads `.env` if
    /// present).
    ///
    /// Required: `KURU_WALLET_ADDRESS`, `KURU_PRIVATE_KEY`.
    /// Optional: `KURU_BASE_URL`, `KURU_FORWARDER_ADDRESS`,
    /// `KURU_CHAIN_ID`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let wallet = env::var("KURU_WALLET_ADDRESS").map_err(|_| Error::Config {
            message: "KURU_WALLET_ADDRESS environment variable not set".to_string(),
        })?;
        let private_key = env::var("KURU_PRIVATE_KEY").map_err(|_| Error::Config {
            message: "KURU_PRIVATE_KEY environment variable not set".to_string(),
        })?;
        let forwarder = env::var("KURU_FORWARDER_ADDRESS")
            .unwrap_or_else(|_| DEFAULT_FORWARDER_ADDRESS.to_string());

        Ok(Self {
            base_url: env::var("KURU_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            wallet_address: parse_address("KURU_WALLET_ADDRESS", &wallet)?,
            private_key,
            forwarder_address: parse_address("KURU_FORWARDER_ADDRESS", &forwarder)?,
            chain_id: env::var("KURU_CHAIN_ID")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_CHAIN_ID),
            sandbox: false,
        })
    }

    /// Return a copy of this configuration with sandbox mode switched.
    pub fn with_sandbox(self, enabled: bool) -> Self {
        Self {
            sandbox: enabled,
            ..self
        }
    }

    /// Return a copy of this configuration with a different base URL.
    pub fn with_base_url(self, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..self
        }
    }
}

/// Parse a `0x`-prefixed address, naming the field on failure.
fn parse_address(field: &str, value: &str) -> Result<Address> {
    value.parse().map_err(|_| Error::MalformedHex {
        message: format!("{field}: {value:?} is not a valid address"),
    })
}
