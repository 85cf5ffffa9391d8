//! Market-related types for Kuru exchange data.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A spot trading market (one deployed order book contract).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Market {
    /// On-chain address of the market contract; used as the market id
    /// in every REST request.
    pub address: String,
    pub symbol: String,
    pub base: String,
    pub quote: String,
    pub base_address: String,
    pub quote_address: String,
    /// Taker fee in basis points.
    pub taker_fee_bps: Option<Decimal>,
    /// Maker fee in basis points.
    pub maker_fee_bps: Option<Decimal>,
    /// Number of price decimals, derived from the contract's tick
    /// multiplier.
    pub price_precision: u32,
    pub created: Option<DateTime<Utc>>,
}

/// Derive the number of price decimals from the contract's raw
/// precision multiplier: a multiplier of `100` means prices carry two
/// implied decimal places, so we count trailing zeros.
pub fn parse_price_precision(raw: &str) -> u32 {
    raw.chars().rev().take_while(|c| *c == '0').count() as u32
}

/// Order book snapshot for a single market.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderBook {
    pub symbol: String,
    pub timestamp: Option<DateTime<Utc>>,
    /// Bids sorted best (highest) first.
    pub bids: Vec<PriceLevel>,
    /// Asks sorted best (lowest) first.
    pub asks: Vec<PriceLevel>,
}

impl OrderBook {
    /// Returns the best bid price (highest buy order).
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|l| l.price)
    }

    /// Returns the best ask price (lowest sell order).
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|l| l.price)
    }

    /// Midpoint of best bid and best ask, if both sides have depth.
    pub fn mid_price(&self) -> Option<Decimal> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some((bid + ask) / Decimal::from(2)),
            _ => None,
        }
    }
}

/// A single price level in the order book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Decimal,
    pub size: Decimal,
}

/// A single OHLCV candle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candle {
    /// Interval start in unix milliseconds.
    pub start_time: i64,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}
