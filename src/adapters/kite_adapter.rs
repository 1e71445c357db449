//! Zerodha Kite Connect adapter: quote polling feed and order sink.
//!
//! Talks to the Kite Connect v3 REST API. Every response is an envelope
//! `{"status": "success", "data": ...}` or
//! `{"status": "error", "message": ..., "error_type": ...}`.

use crate::adapters::polling::PollingStream;
use crate::domain::bar::Bar;
use crate::domain::error::AlgotraderError;
use crate::domain::signal::Action;
use crate::ports::order_port::OrderSink;
use serde_json::Value;
use std::time::Duration;

pub const KITE_API_URL: &str = "https://api.kite.trade";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct KiteCredentials {
    pub api_key: String,
    pub access_token: String,
}

/// Order routing parameters sent with every order.
#[derive(Debug, Clone, PartialEq)]
pub struct KiteOrderParams {
    pub exchange: String,
    pub product: String,
    pub order_type: String,
    pub variety: String,
}

impl Default for KiteOrderParams {
    fn default() -> Self {
        KiteOrderParams {
            exchange: "NSE".into(),
            product: "CNC".into(),
            order_type: "MARKET".into(),
            variety: "regular".into(),
        }
    }
}

struct KiteSession {
    client: reqwest::blocking::Client,
    base_url: String,
    authorization: String,
}

impl KiteSession {
    fn new(credentials: &KiteCredentials, base_url: &str) -> Result<Self, AlgotraderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AlgotraderError::Http {
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(KiteSession {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            authorization: format!(
                "token {}:{}",
                credentials.api_key, credentials.access_token
            ),
        })
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder) -> Result<Value, AlgotraderError> {
        let response = request
            .header("X-Kite-Version", "3")
            .header("Authorization", &self.authorization)
            .send()
            .map_err(|e| AlgotraderError::Http {
                reason: e.to_string(),
            })?;
        let status = response.status();
        let body = response.text().map_err(|e| AlgotraderError::Http {
            reason: e.to_string(),
        })?;
        parse_envelope(&body).map_err(|reason| AlgotraderError::Http {
            reason: format!("{status}: {reason}"),
        })
    }

    fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, AlgotraderError> {
        self.send(self.client.get(format!("{}{path}", self.base_url)).query(query))
    }

    fn post(&self, path: &str, form: &[(&str, String)]) -> Result<Value, AlgotraderError> {
        self.send(self.client.post(format!("{}{path}", self.base_url)).form(form))
    }
}

/// Unwrap the `data` member of a Kite response, or the error message.
pub fn parse_envelope(body: &str) -> Result<Value, String> {
    let mut envelope: Value =
        serde_json::from_str(body).map_err(|e| format!("invalid JSON response: {e}"))?;
    match envelope.get("status").and_then(Value::as_str) {
        Some("success") => Ok(envelope.get_mut("data").map(Value::take).unwrap_or(Value::Null)),
        _ => Err(envelope
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string()),
    }
}

/// Build a bar from the `/quote` payload for `instrument` (`EXCHANGE:SYMBOL`).
/// `None` when the instrument or its `last_price` is absent.
pub fn parse_quote(data: &Value, instrument: &str) -> Option<Bar> {
    let quote = data.get(instrument)?;
    let close = quote.get("last_price")?.as_f64()?;
    let timestamp = ["timestamp", "last_trade_time"]
        .iter()
        .filter_map(|key| quote.get(*key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string());
    Some(Bar::new(timestamp, close))
}

/// Extract the order id from a successful `/orders` payload.
pub fn parse_order_id(data: &Value) -> Option<String> {
    match data.get("order_id")? {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Polls the last traded price of one instrument.
pub struct KiteLiveFeed {
    session: KiteSession,
    instrument: String,
    interval: Duration,
}

impl KiteLiveFeed {
    pub fn new(
        credentials: &KiteCredentials,
        exchange: &str,
        symbol: &str,
        interval: Duration,
    ) -> Result<Self, AlgotraderError> {
        Self::with_base_url(credentials, exchange, symbol, interval, KITE_API_URL)
    }

    pub fn with_base_url(
        credentials: &KiteCredentials,
        exchange: &str,
        symbol: &str,
        interval: Duration,
        base_url: &str,
    ) -> Result<Self, AlgotraderError> {
        Ok(KiteLiveFeed {
            session: KiteSession::new(credentials, base_url)?,
            instrument: format!("{exchange}:{symbol}"),
            interval,
        })
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn poll(&self) -> Result<Option<Bar>, AlgotraderError> {
        let data = self.session.get("/quote", &[("i", self.instrument.as_str())])?;
        Ok(parse_quote(&data, &self.instrument))
    }

    pub fn stream(&self) -> PollingStream<impl FnMut() -> Result<Option<Bar>, AlgotraderError> + '_> {
        PollingStream::new(self.interval, move || self.poll())
    }
}

/// Places market orders through Kite Connect.
pub struct KiteBroker {
    session: KiteSession,
    params: KiteOrderParams,
}

impl KiteBroker {
    pub fn new(credentials: &KiteCredentials, params: KiteOrderParams) -> Result<Self, AlgotraderError> {
        Self::with_base_url(credentials, params, KITE_API_URL)
    }

    pub fn with_base_url(
        credentials: &KiteCredentials,
        params: KiteOrderParams,
        base_url: &str,
    ) -> Result<Self, AlgotraderError> {
        Ok(KiteBroker {
            session: KiteSession::new(credentials, base_url)?,
            params,
        })
    }

    pub fn params(&self) -> &KiteOrderParams {
        &self.params
    }

    fn order_form(&self, symbol: &str, action: Action, quantity: u64) -> Vec<(&'static str, String)> {
        let transaction_type = match action {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
        };
        vec![
            ("tradingsymbol", symbol.to_string()),
            ("exchange", self.params.exchange.clone()),
            ("transaction_type", transaction_type.to_string()),
            ("quantity", quantity.to_string()),
            ("order_type", self.params.order_type.clone()),
            ("product", self.params.product.clone()),
            ("validity", "DAY".to_string()),
        ]
    }
}

impl OrderSink for KiteBroker {
    fn execute(
        &mut self,
        symbol: &str,
        action: Action,
        quantity: u64,
    ) -> Result<String, AlgotraderError> {
        let rejected = |reason: String| AlgotraderError::Broker {
            symbol: symbol.to_string(),
            action: action.to_string(),
            quantity,
            reason,
        };
        let form = self.order_form(symbol, action, quantity);
        let data = self
            .session
            .post(&format!("/orders/{}", self.params.variety), &form)
            .map_err(|e| rejected(e.to_string()))?;
        parse_order_id(&data).ok_or_else(|| rejected("response has no order_id".into()))
    }
}
