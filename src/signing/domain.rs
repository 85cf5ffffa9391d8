//! EIP-712 domain for the Kuru forwarder.
//!
//! The domain separator binds every signature to a specific forwarder
//! deployment (name, version, chain, contract address); a request
//! signed under one domain verifies under no other.

use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::SolValue;
use std::sync::OnceLock;

/// Domain name of the verifying forwarder contract.
pub const FORWARDER_DOMAIN_NAME: &str = "KuruForwarder";

/// Domain version of the verifying forwarder contract.
pub const FORWARDER_DOMAIN_VERSION: &str = "1.0.0";

/// Default forwarder deployment address.
pub const DEFAULT_FORWARDER_ADDRESS: &str = "0x0165878A594ca255338adfa4d48449f69242Eb8F";

/// Default chain id (local devnet).
pub const DEFAULT_CHAIN_ID: u64 = 31337;

/// EIP-712 domain for forward-request signing.
///
/// The separator is a pure function of the four fields and is computed
/// once, lazily, behind a write-once guard.
#[derive(Debug, Clone)]
pub struct ForwarderDomain {
    pub name: String,
    pub version: String,
    pub chain_id: U256,
    pub verifying_contract: Address,
    separator: OnceLock<B256>,
}

impl ForwarderDomain {
    /// Create a domain with explicit parameters.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            chain_id: U256::from(chain_id),
            verifying_contract,
            separator: OnceLock::new(),
        }
    }

    /// The KuruForwarder domain for a given deployment.
    pub fn kuru(chain_id: u64, verifying_contract: Address) -> Self {
        Self::new(
            FORWARDER_DOMAIN_NAME,
            FORWARDER_DOMAIN_VERSION,
            chain_id,
            verifying_contract,
        )
    }

    /// The EIP-712 domain separator hash, memoized after first use.
    pub fn separator(&self) -> B256 {
        *self.separator.get_or_init(|| self.compute_separator())
    }

    fn compute_separator(&self) -> B256 {
        let domain_type_hash = alloy_primitives::keccak256(
            b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)",
        );

        let name_hash = alloy_primitives::keccak256(self.name.as_bytes());
        let version_hash = alloy_primitives::keccak256(self.version.as_bytes());

        // encodeData: every field occupies a full 32-byte word, so the
        // 20-byte contract address is left-padded before packing.
        let contract_padded = B256::left_padding_from(self.verifying_contract.as_slice());

        let encoded = (
            domain_type_hash,
            name_hash,
            version_hash,
            self.chain_id,
            contract_padded,
        )
            .abi_encode_packed();

        alloy_primitives::keccak256(&encoded)
    }
}
