//! Order and trade types for the REST client.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::signing::OrderSide;

/// Lifecycle state of a resting order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Resting on the book with size remaining.
    Open,
    /// Fully filled.
    Closed,
    /// Cancelled before being fully filled.
    Canceled,
}

impl OrderStatus {
    /// Derive the status from the raw order record. Cancellation wins
    /// over fill state.
    pub fn from_raw(is_cancelled: bool, remaining_size: Decimal) -> Self {
        if is_cancelled {
            OrderStatus::Canceled
        } else if remaining_size.is_zero() {
            OrderStatus::Closed
        } else {
            OrderStatus::Open
        }
    }
}

/// A limit order as reported by the exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    /// Market contract address the order rests on.
    pub market: String,
    pub side: OrderSide,
    pub price: Decimal,
    /// Original order size.
    pub amount: Decimal,
    pub filled: Decimal,
    /// Size still resting on the book.
    pub remaining: Decimal,
    pub status: OrderStatus,
    pub fee: Option<Decimal>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// An executed fill belonging to the configured wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: String,
    pub order_id: Option<String>,
    pub market: String,
    pub side: OrderSide,
    pub price: Decimal,
    pub amount: Decimal,
    pub fee: Option<Decimal>,
    pub timestamp: Option<DateTime<Utc>>,
}
