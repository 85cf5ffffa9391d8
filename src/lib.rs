//! Rust client for the Kuru on-chain order book.
//!
//! Kuru executes orders through a meta-transaction relay: the client
//! never sends a transaction itself. Instead it encodes the market
//! contract call, wraps it in an EIP-712 `ForwardRequest`, signs the
//! typed-data digest with the wallet key and POSTs the
//! `{forwardRequest, signature}` pair to the relay, which pays for gas
//! and submits it on-chain. Market data comes from the same relay over
//! plain REST.
//!
//! # Example
//!
//! ```no_run
//! use kuru_client::{KuruClient, KuruConfig};
//! use kuru_client::signing::{OrderIntent, OrderSide};
//!
//! # async fn run() -> kuru_client::Result<()> {
//! let config = KuruConfig::from_env()?;
//! let client = KuruClient::new(config)?;
//!
//! let markets = client.fetch_markets().await?;
//! let market = markets[0].address.parse().unwrap();
//!
//! let order = OrderIntent::limit(OrderSide::Buy, 150_000, 2_500_000_000, true);
//! let ack = client.create_order(market, &order).await?;
//! println!("relay ack: {ack}");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod signing;
pub mod types;

pub use api::KuruClient;
pub use config::{KuruConfig, DEFAULT_BASE_URL};
pub use error::{Error, Result};
