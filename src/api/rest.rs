//! Kuru relay REST client.
//!
//! Read endpoints return exchange data normalized into [`crate::types`];
//! write endpoints (`createOrder`, `cancelOrders`) submit signed forward
//! requests built by [`ForwardRequestBuilder`].

use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration as StdDuration;
use tracing::{debug, info, warn};

use crate::config::KuruConfig;
use crate::signing::{
    ForwardRequestBuilder, ForwarderDomain, OrderIntent, OrderSide, RequestSigner,
    SignedForwardRequest,
};
use crate::types::{Candle, Market, Order, OrderBook, OrderStatus, PriceLevel, Trade};
use crate::{Error, Result};

/// Default `since` for candle queries when the caller gives none
/// (unix milliseconds).
const DEFAULT_OHLCV_SINCE: i64 = 1_728_205_695_000;

/// Relay error fragments that indicate a rejected (but well-formed)
/// order. Matched as substrings because the relay varies the suffix.
const INVALID_ORDER_FRAGMENTS: &[&str] = &[
    "Price must be divisible by tick size.",
    "Order must have minimum value of $10",
    "Insufficient margin to place order.",
    "Reduce only order would increase position.",
    "Post only order would have immediately matched,",
    "Order could not immediately match against any resting orders.",
    "Invalid TP/SL price.",
    "No liquidity available for market order.",
    "User or API Wallet ",
    "Order has invalid size",
    "Order price cannot be more than 80% away from the reference price",
];

const ORDER_NOT_FOUND_FRAGMENT: &str = "Order was never placed, already canceled, or filled.";

/// Kuru relay client bound to one wallet.
#[derive(Debug)]
pub struct KuruClient {
    config: KuruConfig,
    builder: ForwardRequestBuilder,
    http_client: reqwest::Client,
}

impl KuruClient {
    /// Maximum retry attempts for read endpoints.
    const MAX_RETRIES: u32 = 3;

    /// Build a client from the given configuration.
    ///
    /// Fails if the private key is invalid or does not derive the
    /// configured wallet address.
    pub fn new(config: KuruConfig) -> Result<Self> {
        let signer = RequestSigner::from_hex(&config.private_key)?;
        if signer.address() != config.wallet_address {
            return Err(Error::Config {
                message: format!(
                    "private key derives {} but wallet_address is {}",
                    signer.address(),
                    config.wallet_address
                ),
            });
        }

        let domain = ForwarderDomain::kuru(config.chain_id, config.forwarder_address);
        let builder = ForwardRequestBuilder::new(signer, domain);

        let http_client = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(30))
            .connect_timeout(StdDuration::from_secs(10))
            .build()
            .map_err(Error::Http)?;

        debug!(
            base_url = %config.base_url,
            wallet = %config.wallet_address,
            sandbox = config.sandbox,
            "Initialized Kuru client"
        );

        Ok(Self {
            config,
            builder,
            http_client,
        })
    }

    /// The wallet this client signs and queries for.
    pub fn wallet_address(&self) -> Address {
        self.config.wallet_address
    }

    /// Fetch the list of deployed markets.
    pub async fn fetch_markets(&self) -> Result<Vec<Market>> {
        let url = format!("{}/fetchMarkets", self.config.base_url);
        let response = self.get_with_retry(&url).await?;
        let page: MarketsResponse = response.json().await?;

        let markets: Vec<Market> = page.data.into_iter().map(Into::into).collect();
        info!(count = markets.len(), "Fetched markets");
        Ok(markets)
    }

    /// Fetch the order book snapshot for a market.
    pub async fn fetch_order_book(
        &self,
        market_address: &str,
        limit: Option<u32>,
    ) -> Result<OrderBook> {
        let mut url = format!(
            "{}/fetchOrderbook?marketAddress={}",
            self.config.base_url, market_address
        );
        if let Some(limit) = limit {
            url.push_str(&format!("&limit={}", limit));
        }

        let response = self.get_with_retry(&url).await?;
        let book: ApiOrderBook = response.json().await?;
        Ok(book.into())
    }

    /// Fetch OHLCV candles for a market. `since` defaults to the
    /// exchange's genesis when not given.
    pub async fn fetch_ohlcv(
        &self,
        market_address: &str,
        timeframe: &str,
        since: Option<i64>,
    ) -> Result<Vec<Candle>> {
        let since = since.unwrap_or(DEFAULT_OHLCV_SINCE);
        let url = format!(
            "{}/fetchOHLCV?marketAddress={}&timeframe={}&since={}",
            self.config.base_url, market_address, timeframe, since
        );

        let response = self.get_with_retry(&url).await?;
        let rows: Vec<ApiCandle> = response.json().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Fetch a single order by id.
    pub async fn fetch_order(&self, market_address: &str, order_id: u64) -> Result<Order> {
        let url = format!(
            "{}/fetchOrder?marketAddress={}&orderId={}",
            self.config.base_url, market_address, order_id
        );
        let response = self.get_with_retry(&url).await?;
        let raw: ApiOrder = response.json().await?;
        Ok(raw.into_order(market_address))
    }

    /// Fetch the wallet's open orders on a market.
    pub async fn fetch_open_orders(
        &self,
        market_address: &str,
        query: &OrderQuery,
    ) -> Result<Vec<Order>> {
        self.fetch_order_list("fetchOpenOrders", market_address, query)
            .await
    }

    /// Fetch the wallet's fully filled orders on a market.
    pub async fn fetch_closed_orders(
        &self,
        market_address: &str,
        query: &OrderQuery,
    ) -> Result<Vec<Order>> {
        self.fetch_order_list("fetchClosedOrders", market_address, query)
            .await
    }

    /// Fetch the wallet's cancelled orders on a market.
    pub async fn fetch_cancelled_orders(
        &self,
        market_address: &str,
        query: &OrderQuery,
    ) -> Result<Vec<Order>> {
        self.fetch_order_list("fetchCancelledOrders", market_address, query)
            .await
    }

    /// Fetch the wallet's fills on a market.
    pub async fn fetch_my_trades(
        &self,
        market_address: &str,
        query: &OrderQuery,
    ) -> Result<Vec<Trade>> {
        let url = self.user_list_url("fetchMyTrades", market_address, query);
        let response = self.get_with_retry(&url).await?;
        let page: TradesResponse = response.json().await?;
        Ok(page
            .data
            .into_iter()
            .map(|t| t.into_trade(market_address))
            .collect())
    }

    /// Sign an order intent and submit it to the relay.
    ///
    /// The relay's acknowledgement shape is not stable, so the raw JSON
    /// body is returned.
    pub async fn create_order(
        &self,
        market_address: Address,
        order: &OrderIntent,
    ) -> Result<serde_json::Value> {
        let signed = self.builder.build_order(market_address, order)?;
        debug!(
            market = %market_address,
            nonce = %signed.forward_request.nonce,
            "Submitting order"
        );
        self.post_signed("createOrder", &signed).await
    }

    /// Sign a batch cancel and submit it to the relay.
    pub async fn cancel_orders(
        &self,
        market_address: Address,
        order_ids: &[u64],
    ) -> Result<serde_json::Value> {
        let signed = self.builder.build_cancel(market_address, order_ids)?;
        debug!(
            market = %market_address,
            count = order_ids.len(),
            "Submitting batch cancel"
        );
        self.post_signed("cancelOrders", &signed).await
    }

    async fn fetch_order_list(
        &self,
        endpoint: &str,
        market_address: &str,
        query: &OrderQuery,
    ) -> Result<Vec<Order>> {
        let url = self.user_list_url(endpoint, market_address, query);
        let response = self.get_with_retry(&url).await?;
        let page: OrdersResponse = response.json().await?;
        Ok(page
            .data
            .into_iter()
            .map(|o| o.into_order(market_address))
            .collect())
    }

    fn user_list_url(&self, endpoint: &str, market_address: &str, query: &OrderQuery) -> String {
        let mut url = format!(
            "{}/{}?marketAddress={}&userAddress={}&offset={}",
            self.config.base_url,
            endpoint,
            market_address,
            self.config.wallet_address,
            query.offset
        );
        if let Some(since) = query.since {
            url.push_str(&format!("&since={}", since));
        }
        if let Some(limit) = query.limit {
            url.push_str(&format!("&limit={}", limit));
        }
        url
    }

    /// Submit a signed forward request. Writes are never retried: a
    /// retry would need a fresh nonce and signature, and a duplicate
    /// submission is worse than a surfaced error.
    async fn post_signed(
        &self,
        endpoint: &str,
        signed: &SignedForwardRequest,
    ) -> Result<serde_json::Value> {
        let url = format!("{}/{}", self.config.base_url, endpoint);
        let response = self
            .http_client
            .post(&url)
            .json(signed)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(endpoint, status = %status, "Relay rejected request");
            return Err(classify_api_error(status.as_u16(), &body));
        }

        Ok(response.json().await?)
    }

    /// Execute an HTTP GET with retry and exponential backoff.
    ///
    /// Retries on 5xx server errors and 429 rate-limit responses (with
    /// a longer backoff for 429). All other 4xx errors fail
    /// immediately.
    async fn get_with_retry(&self, url: &str) -> Result<reqwest::Response> {
        let mut last_error = None;

        for attempt in 0..Self::MAX_RETRIES {
            match self.http_client.get(url).send().await {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response)
                    if response.status().as_u16() == 429 || response.status().is_server_error() =>
                {
                    let status = response.status();
                    let is_rate_limited = status.as_u16() == 429;
                    warn!(
                        attempt = attempt + 1,
                        status = %status,
                        url = url,
                        rate_limited = is_rate_limited,
                        "Retryable API error, backing off"
                    );
                    last_error = Some(Error::Api {
                        message: format!(
                            "{}: {}",
                            if is_rate_limited {
                                "Rate limited"
                            } else {
                                "Server error"
                            },
                            status
                        ),
                        status: Some(status.as_u16()),
                    });

                    if attempt + 1 < Self::MAX_RETRIES {
                        let backoff = if is_rate_limited {
                            StdDuration::from_millis(2000 * 2u64.pow(attempt))
                        } else {
                            StdDuration::from_millis(500 * 2u64.pow(attempt))
                        };
                        tokio::time::sleep(backoff).await;
                    }
                    continue;
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    return Err(classify_api_error(status, &body));
                }
                Err(e) => {
                    warn!(
                        attempt = attempt + 1,
                        error = %e,
                        url = url,
                        "HTTP request failed, backing off"
                    );
                    last_error = Some(Error::Http(e));
                }
            }

            if attempt + 1 < Self::MAX_RETRIES {
                let backoff = StdDuration::from_millis(500 * 2u64.pow(attempt));
                tokio::time::sleep(backoff).await;
            }
        }

        Err(last_error.unwrap_or(Error::Api {
            message: "Max retries exceeded".to_string(),
            status: None,
        }))
    }
}

/// Pagination parameters shared by the per-user list endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderQuery {
    /// Unix milliseconds lower bound.
    pub since: Option<i64>,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Map a relay error body onto a typed error using the relay's known
/// message fragments.
fn classify_api_error(status: u16, body: &str) -> Error {
    if body.contains(ORDER_NOT_FOUND_FRAGMENT) {
        return Error::OrderNotFound {
            message: body.to_string(),
        };
    }
    for fragment in INVALID_ORDER_FRAGMENTS {
        if body.contains(fragment) {
            return Error::InvalidOrder {
                message: body.to_string(),
            };
        }
    }
    Error::Api {
        message: if body.is_empty() {
            format!("API error: {}", status)
        } else {
            format!("API error: {} ({})", status, body)
        },
        status: Some(status),
    }
}

// Raw wire shapes, converted into crate::types before they leave this
// module.

#[derive(Debug, Deserialize)]
struct MarketsResponse {
    data: Vec<ApiMarket>,
}

#[derive(Debug, Deserialize)]
struct OrdersResponse {
    data: Vec<ApiOrder>,
}

#[derive(Debug, Deserialize)]
struct TradesResponse {
    data: Vec<ApiTrade>,
}

#[derive(Debug, Deserialize)]
struct ApiMarket {
    market_address: String,
    symbol: String,
    base: String,
    quote: String,
    base_address: String,
    quote_address: String,
    taker_fee_bps: Option<Decimal>,
    maker_fee_bps: Option<Decimal>,
    precision: ApiPrecision,
    #[serde(default)]
    created: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct ApiPrecision {
    /// Tick multiplier; the relay sends it as either a number or a
    /// string.
    price: serde_json::Value,
}

impl ApiPrecision {
    fn raw_price(&self) -> String {
        match &self.price {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl From<ApiMarket> for Market {
    fn from(raw: ApiMarket) -> Self {
        let price_precision = crate::types::market::parse_price_precision(&raw.precision.raw_price());
        Market {
            address: raw.market_address,
            symbol: raw.symbol,
            base: raw.base,
            quote: raw.quote,
            base_address: raw.base_address,
            quote_address: raw.quote_address,
            taker_fee_bps: raw.taker_fee_bps,
            maker_fee_bps: raw.maker_fee_bps,
            price_precision,
            created: raw.created,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiOrderBook {
    symbol: String,
    #[serde(default)]
    timestamp: Option<i64>,
    bids: Vec<(Decimal, Decimal)>,
    asks: Vec<(Decimal, Decimal)>,
}

impl From<ApiOrderBook> for OrderBook {
    fn from(raw: ApiOrderBook) -> Self {
        let to_levels = |side: Vec<(Decimal, Decimal)>| {
            side.into_iter()
                .map(|(price, size)| PriceLevel { price, size })
                .collect()
        };
        OrderBook {
            symbol: raw.symbol,
            timestamp: raw.timestamp.and_then(DateTime::from_timestamp_millis),
            bids: to_levels(raw.bids),
            asks: to_levels(raw.asks),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiCandle {
    start_time: i64,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
}

impl From<ApiCandle> for Candle {
    fn from(raw: ApiCandle) -> Self {
        Candle {
            start_time: raw.start_time,
            open: raw.open,
            high: raw.high,
            low: raw.low,
            close: raw.close,
            volume: raw.volume,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiOrder {
    order_id: u64,
    #[serde(default)]
    market_address: Option<String>,
    is_buy: bool,
    price: Decimal,
    size: Decimal,
    #[serde(default)]
    filled: Option<Decimal>,
    remaining_size: Decimal,
    #[serde(default)]
    is_cancelled: bool,
    #[serde(default)]
    fee: Option<Decimal>,
    #[serde(default)]
    trigger_time: Option<DateTime<Utc>>,
}

impl ApiOrder {
    fn into_order(self, fallback_market: &str) -> Order {
        let status = OrderStatus::from_raw(self.is_cancelled, self.remaining_size);
        let filled = self.filled.unwrap_or(self.size - self.remaining_size);
        Order {
            id: self.order_id.to_string(),
            market: self
                .market_address
                .unwrap_or_else(|| fallback_market.to_string()),
            side: if self.is_buy {
                OrderSide::Buy
            } else {
                OrderSide::Sell
            },
            price: self.price,
            amount: self.size,
            filled,
            remaining: self.remaining_size,
            status,
            fee: self.fee,
            timestamp: self.trigger_time,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiTrade {
    trade_id: u64,
    #[serde(default)]
    order_id: Option<u64>,
    is_buy: bool,
    price: Decimal,
    size: Decimal,
    #[serde(default)]
    fee: Option<Decimal>,
    #[serde(default)]
    timestamp: Option<i64>,
}

impl ApiTrade {
    fn into_trade(self, market: &str) -> Trade {
        Trade {
            id: self.trade_id.to_string(),
            order_id: self.order_id.map(|id| id.to_string()),
            market: market.to_string(),
            side: if self.is_buy {
                OrderSide::Buy
            } else {
                OrderSide::Sell
            },
            price: self.price,
            amount: self.size,
            fee: self.fee,
            timestamp: self.timestamp.and_then(DateTime::from_timestamp_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn test_config() -> KuruConfig {
        KuruConfig::new(Address::from_str(TEST_ADDRESS).unwrap(), TEST_PRIVATE_KEY)
    }

    #[test]
    fn test_client_accepts_matching_key_and_wallet() {
        let client = KuruClient::new(test_config()).unwrap();
        assert_eq!(
            client.wallet_address(),
            Address::from_str(TEST_ADDRESS).unwrap()
        );
    }

    #[test]
    fn test_client_rejects_mismatched_wallet() {
        let mut config = test_config();
        config.wallet_address =
            Address::from_str("0x0000000000000000000000000000000000000001").unwrap();
        let err = KuruClient::new(config).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }

    #[tokio::test]
    async fn test_create_order_rejects_incomplete_intent() {
        let client = KuruClient::new(test_config()).unwrap();
        let mut order = OrderIntent::limit(OrderSide::Buy, 1, 1, true);
        order.post_only = None;

        // Fails during intent resolution, before any request is sent.
        let err = client
            .create_order(Address::ZERO, &order)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidIntent { .. }));
    }

    #[tokio::test]
    async fn test_cancel_orders_rejects_empty_list() {
        let client = KuruClient::new(test_config()).unwrap();
        let err = client.cancel_orders(Address::ZERO, &[]).await.unwrap_err();
        assert!(matches!(err, Error::InvalidIntent { .. }));
    }

    #[test]
    fn test_classify_order_not_found() {
        let err = classify_api_error(
            400,
            "Order was never placed, already canceled, or filled.",
        );
        assert!(matches!(err, Error::OrderNotFound { .. }));
    }

    #[test]
    fn test_classify_invalid_order_fragments() {
        let err = classify_api_error(400, "error: Price must be divisible by tick size.");
        assert!(matches!(err, Error::InvalidOrder { .. }));

        let err = classify_api_error(400, "Post only order would have immediately matched, id=4");
        assert!(matches!(err, Error::InvalidOrder { .. }));
    }

    #[test]
    fn test_classify_unknown_error_keeps_status() {
        let err = classify_api_error(502, "bad gateway");
        match err {
            Error::Api { status, .. } => assert_eq!(status, Some(502)),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_market_row() {
        let raw: ApiMarket = serde_json::from_value(serde_json::json!({
            "market_address": "0xabc",
            "symbol": "MON/USDC",
            "base": "MON",
            "quote": "USDC",
            "base_address": "0x1",
            "quote_address": "0x2",
            "taker_fee_bps": "30",
            "maker_fee_bps": "10",
            "precision": { "price": 100 }
        }))
        .unwrap();

        let market: Market = raw.into();
        assert_eq!(market.address, "0xabc");
        assert_eq!(market.price_precision, 2);
        assert_eq!(market.taker_fee_bps, Some(Decimal::from(30)));
    }

    #[test]
    fn test_parse_order_row_remaining_and_status() {
        let raw: ApiOrder = serde_json::from_value(serde_json::json!({
            "order_id": 42,
            "is_buy": true,
            "price": "1.50",
            "size": "10",
            "remaining_size": "4",
            "is_cancelled": false
        }))
        .unwrap();

        let order = raw.into_order("0xmarket");
        assert_eq!(order.id, "42");
        assert_eq!(order.market, "0xmarket");
        assert_eq!(order.side, OrderSide::Buy);
        assert_eq!(order.remaining, Decimal::from(4));
        assert_eq!(order.filled, Decimal::from(6));
        assert_eq!(order.status, OrderStatus::Open);
    }

    #[test]
    fn test_parse_cancelled_order_row() {
        let raw: ApiOrder = serde_json::from_value(serde_json::json!({
            "order_id": 7,
            "is_buy": false,
            "price": "2",
            "size": "5",
            "remaining_size": "5",
            "is_cancelled": true
        }))
        .unwrap();

        let order = raw.into_order("0xmarket");
        assert_eq!(order.status, OrderStatus::Canceled);
        assert_eq!(order.side, OrderSide::Sell);
    }

    #[test]
    fn test_parse_order_book_levels() {
        let raw: ApiOrderBook = serde_json::from_value(serde_json::json!({
            "symbol": "MON/USDC",
            "timestamp": 1728205695000i64,
            "bids": [["1.50", "10"], ["1.49", "4"]],
            "asks": [["1.52", "3"]]
        }))
        .unwrap();

        let book: OrderBook = raw.into();
        assert_eq!(book.best_bid(), Some(Decimal::from_str("1.50").unwrap()));
        assert_eq!(book.best_ask(), Some(Decimal::from_str("1.52").unwrap()));
        assert!(book.timestamp.is_some());
    }
}
