//! Error types for the Kuru client.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The order intent is missing required fields or is contradictory.
    /// Raised before any encoding or cryptography runs.
    #[error("Invalid order intent: {message}")]
    InvalidIntent { message: String },

    /// A value does not fit its declared Solidity type, or calldata is
    /// malformed during decoding.
    #[error("ABI encoding error: {message}")]
    Encoding { message: String },

    /// Hex input with odd length or non-hex characters.
    #[error("Malformed hex input: {message}")]
    MalformedHex { message: String },

    /// Invalid private key or signature failure. Configuration-level;
    /// never retry with the same key.
    #[error("Signing error: {message}")]
    Signing { message: String },

    /// The exchange rejected the order (tick size, post-only match,
    /// insufficient margin, ...).
    #[error("Invalid order: {message}")]
    InvalidOrder { message: String },

    /// The order was never placed, already cancelled, or filled.
    #[error("Order not found: {message}")]
    OrderNotFound { message: String },

    #[error("API error: {message}")]
    Api { message: String, status: Option<u16> },
}

pub type Result<T> = std::result::Result<T, Error>;
