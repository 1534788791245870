//! Exchange rate data model and the day-range fetch loop.

use async_trait::async_trait;
use chrono::{Days, Local, NaiveDate};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Rendered in place of a rate the upstream did not return.
pub const NOT_AVAILABLE: &str = "N/A";

/// Upstream's native date format, used both for requests and result keys.
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// A single sale or purchase rate as reported by the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rate {
    Value(String),
    NotAvailable,
}

impl Rate {
    fn from_json(value: Option<&Value>) -> Self {
        match value {
            None | Some(Value::Null) => Rate::NotAvailable,
            Some(Value::String(text)) => Rate::Value(text.clone()),
            Some(other) => Rate::Value(other.to_string()),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Rate::Value(_))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rate::Value(value) => f.write_str(value),
            Rate::NotAvailable => f.write_str(NOT_AVAILABLE),
        }
    }
}

impl Serialize for Rate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Quote {
    pub currency: String,
    pub sale: Rate,
    pub purchase: Rate,
}

/// Quotes for the requested currencies on one date, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyRates {
    pub date: String,
    pub quotes: Vec<Quote>,
}

impl DailyRates {
    pub fn quote(&self, currency: &str) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.currency == currency)
    }
}

/// Upstream response body for a single date. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPayload {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, rename = "exchangeRate")]
    pub exchange_rate: Option<Vec<RawRate>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRate {
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default, rename = "saleRate")]
    pub sale_rate: Option<Value>,
    #[serde(default, rename = "purchaseRate")]
    pub purchase_rate: Option<Value>,
}

#[async_trait]
pub trait ExchangeRateProvider: Send + Sync {
    /// Fetches the raw payload for `date` (DD.MM.YYYY). Returns `None` when the
    /// day produced no usable data; failures are never propagated.
    async fn fetch_one(&self, date: &str) -> Option<RawPayload>;
}

/// Builds the quotes for `currencies` out of one upstream payload.
///
/// Currencies missing from the payload yield quotes with both rates set to
/// [`Rate::NotAvailable`]. A code requested twice is reported once.
pub fn parse(payload: &RawPayload, currencies: &[String]) -> DailyRates {
    let date = payload
        .date
        .clone()
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let by_currency: HashMap<&str, &RawRate> = payload
        .exchange_rate
        .iter()
        .flatten()
        .filter_map(|rate| rate.currency.as_deref().map(|code| (code, rate)))
        .collect();

    let mut quotes: Vec<Quote> = Vec::with_capacity(currencies.len());
    for code in currencies {
        if quotes.iter().any(|q| &q.currency == code) {
            continue;
        }
        let entry = by_currency.get(code.as_str());
        quotes.push(Quote {
            currency: code.clone(),
            sale: Rate::from_json(entry.and_then(|e| e.sale_rate.as_ref())),
            purchase: Rate::from_json(entry.and_then(|e| e.purchase_rate.as_ref())),
        });
    }

    DailyRates { date, quotes }
}

/// The `days` dates ending at `today`, most recent first.
pub fn candidate_dates(today: NaiveDate, days: u32) -> Vec<String> {
    (0..u64::from(days))
        .filter_map(|offset| today.checked_sub_days(Days::new(offset)))
        .map(|date| date.format(DATE_FORMAT).to_string())
        .collect()
}

/// Fetches one payload per day going back from today. Days without data are
/// skipped, so the result never holds more than `days` entries.
pub async fn fetch_range(
    provider: &dyn ExchangeRateProvider,
    days: u32,
    currencies: &[String],
) -> Vec<DailyRates> {
    fetch_range_from(provider, Local::now().date_naive(), days, currencies).await
}

pub async fn fetch_range_from(
    provider: &dyn ExchangeRateProvider,
    today: NaiveDate,
    days: u32,
    currencies: &[String],
) -> Vec<DailyRates> {
    let mut results = Vec::new();
    for date in candidate_dates(today, days) {
        match provider.fetch_one(&date).await {
            Some(payload) => results.push(parse(&payload, currencies)),
            None => debug!(%date, "Skipping day without rates"),
        }
    }
    results
}
