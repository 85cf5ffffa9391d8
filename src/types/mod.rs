//! Normalized exchange types returned by the REST client.

pub mod market;
pub mod order;

pub use market::{Candle, Market, OrderBook, PriceLevel};
pub use order::{Order, OrderStatus, Trade};
