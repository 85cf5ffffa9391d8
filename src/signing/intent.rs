//! Order intents and their mapping to forwarder-invoked calls.
//!
//! A trading intent resolves to one of five market-contract functions.
//! The table is closed: routing is an exhaustive match over
//! `(OrderType, OrderSide)`, so an unhandled combination is a compile
//! error rather than a missing-key failure at runtime.

use alloy_primitives::{Bytes, U256};
use serde::{Deserialize, Serialize};

use super::calldata::{self, ParamType, ParamValue};
use crate::{Error, Result};

/// Side of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Limit,
    Market,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Limit => write!(f, "limit"),
            OrderType::Market => write!(f, "market"),
        }
    }
}

/// A trading intent, consumed once when building a forward request.
///
/// Field presence is order-type-dependent: limit orders require `price`
/// and `post_only`; market orders require `is_margin`, `is_fill_or_kill`
/// and `min_amount_out`. Violations fail with
/// [`Error::InvalidIntent`] before any encoding runs.
#[derive(Debug, Clone)]
pub struct OrderIntent {
    pub order_type: OrderType,
    pub side: OrderSide,
    /// Limit price in ticks. Must fit `uint24`.
    pub price: Option<u64>,
    /// Order size in base units (`uint96`); for market buys this is the
    /// quote size (`uint24`).
    pub amount: u128,
    pub post_only: Option<bool>,
    pub is_margin: Option<bool>,
    pub is_fill_or_kill: Option<bool>,
    pub min_amount_out: Option<U256>,
}

impl OrderIntent {
    /// A limit order with all required fields populated.
    pub fn limit(side: OrderSide, price: u64, amount: u128, post_only: bool) -> Self {
        Self {
            order_type: OrderType::Limit,
            side,
            price: Some(price),
            amount,
            post_only: Some(post_only),
            is_margin: None,
            is_fill_or_kill: None,
            min_amount_out: None,
        }
    }

    /// A market order with all required fields populated.
    pub fn market(
        side: OrderSide,
        amount: u128,
        min_amount_out: U256,
        is_margin: bool,
        is_fill_or_kill: bool,
    ) -> Self {
        Self {
            order_type: OrderType::Market,
            side,
            price: None,
            amount,
            post_only: None,
            is_margin: Some(is_margin),
            is_fill_or_kill: Some(is_fill_or_kill),
            min_amount_out: Some(min_amount_out),
        }
    }

    fn require<T: Copy>(field: Option<T>, name: &str, order_type: OrderType) -> Result<T> {
        field.ok_or_else(|| Error::InvalidIntent {
            message: format!("{name} is required for {order_type} orders"),
        })
    }
}

/// The function a forward request invokes, with its ordered formal
/// parameter list.
#[derive(Debug, Clone, Copy)]
pub struct CallSpec {
    pub function: &'static str,
    pub params: &'static [(&'static str, ParamType)],
}

impl CallSpec {
    /// Canonical signature, e.g. `addBuyOrder(uint24,uint96,bool)`.
    pub fn signature(&self) -> String {
        calldata::canonical_signature(self.function, self.params)
    }

    /// 4-byte function selector.
    pub fn selector(&self) -> [u8; 4] {
        calldata::selector(self.function, self.params)
    }

    /// Encode a call to this function.
    pub fn encode(&self, args: &[ParamValue]) -> Result<Bytes> {
        calldata::encode_call(self.function, self.params, args)
    }
}

pub const ADD_BUY_ORDER: CallSpec = CallSpec {
    function: "addBuyOrder",
    params: &[
        ("_price", ParamType::Uint(24)),
        ("size", ParamType::Uint(96)),
        ("_postOnly", ParamType::Bool),
    ],
};

pub const ADD_SELL_ORDER: CallSpec = CallSpec {
    function: "addSellOrder",
    params: &[
        ("_price", ParamType::Uint(24)),
        ("size", ParamType::Uint(96)),
        ("_postOnly", ParamType::Bool),
    ],
};

pub const PLACE_MARKET_BUY: CallSpec = CallSpec {
    function: "placeAndExecuteMarketBuy",
    params: &[
        ("_quoteSize", ParamType::Uint(24)),
        ("_minAmountOut", ParamType::Uint(256)),
        ("_isMargin", ParamType::Bool),
        ("_isFillOrKill", ParamType::Bool),
    ],
};

pub const PLACE_MARKET_SELL: CallSpec = CallSpec {
    function: "placeAndExecuteMarketSell",
    params: &[
        ("_size", ParamType::Uint(96)),
        ("_minAmountOut", ParamType::Uint(256)),
        ("_isMargin", ParamType::Bool),
        ("_isFillOrKill", ParamType::Bool),
    ],
};

pub const BATCH_CANCEL_ORDERS: CallSpec = CallSpec {
    function: "batchCancelOrders",
    params: &[("_orderIds", ParamType::UintArray(40))],
};

/// Resolve an intent to its call spec and ordered argument tuple.
///
/// Validation precedes resolution; range checks against the declared
/// parameter widths happen later, at encoding time.
pub fn resolve(intent: &OrderIntent) -> Result<(&'static CallSpec, Vec<ParamValue>)> {
    match (intent.order_type, intent.side) {
        (OrderType::Limit, side) => {
            let price = OrderIntent::require(intent.price, "price", intent.order_type)?;
            let post_only = OrderIntent::require(intent.post_only, "post_only", intent.order_type)?;
            let args = vec![
                ParamValue::Uint(U256::from(price)),
                ParamValue::Uint(U256::from(intent.amount)),
                ParamValue::Bool(post_only),
            ];
            let spec = match side {
                OrderSide::Buy => &ADD_BUY_ORDER,
                OrderSide::Sell => &ADD_SELL_ORDER,
            };
            Ok((spec, args))
        }
        (OrderType::Market, side) => {
            let min_amount_out =
                OrderIntent::require(intent.min_amount_out, "min_amount_out", intent.order_type)?;
            let is_margin = OrderIntent::require(intent.is_margin, "is_margin", intent.order_type)?;
            let is_fill_or_kill =
                OrderIntent::require(intent.is_fill_or_kill, "is_fill_or_kill", intent.order_type)?;
            let args = vec![
                ParamValue::Uint(U256::from(intent.amount)),
                ParamValue::Uint(min_amount_out),
                ParamValue::Bool(is_margin),
                ParamValue::Bool(is_fill_or_kill),
            ];
            let spec = match side {
                OrderSide::Buy => &PLACE_MARKET_BUY,
                OrderSide::Sell => &PLACE_MARKET_SELL,
            };
            Ok((spec, args))
        }
    }
}

/// Resolve a batch cancel to its call spec and argument tuple.
pub fn resolve_cancel(order_ids: &[u64]) -> Result<(&'static CallSpec, Vec<ParamValue>)> {
    if order_ids.is_empty() {
        return Err(Error::InvalidIntent {
            message: "batch cancel requires at least one order id".to_string(),
        });
    }
    let ids = order_ids.iter().map(|id| U256::from(*id)).collect();
    Ok((&BATCH_CANCEL_ORDERS, vec![ParamValue::UintArray(ids)]))
}
