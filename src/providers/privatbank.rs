use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

use crate::core::rates::{ExchangeRateProvider, RawPayload};

pub const DEFAULT_BASE_URL: &str = "https://api.privatbank.ua";

/// Archive rates endpoint of the PrivatBank public API.
pub struct PrivatBankProvider {
    base_url: String,
}

impl PrivatBankProvider {
    pub fn new(base_url: &str) -> Self {
        PrivatBankProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, date: &str) -> String {
        format!("{}/p24api/exchange_rates?json&date={}", self.base_url, date)
    }
}

#[async_trait]
impl ExchangeRateProvider for PrivatBankProvider {
    #[instrument(name = "PrivatBankFetch", skip(self), fields(date = %date))]
    async fn fetch_one(&self, date: &str) -> Option<RawPayload> {
        let url = self.url_for(date);
        debug!("Requesting exchange rates from {}", url);

        let client = match reqwest::Client::builder().user_agent("fxchat/1.0").build() {
            Ok(client) => client,
            Err(e) => {
                error!("Failed to build HTTP client: {}", e);
                return None;
            }
        };

        let response = match client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Connection error: {} for {}", e, url);
                return None;
            }
        };

        if response.status() != StatusCode::OK {
            error!("Error status: {} for {}", response.status(), url);
            return None;
        }

        let body = match response.json::<Value>().await {
            Ok(body) => body,
            Err(e) => {
                warn!("Failed to parse JSON response for {}: {}", date, e);
                return None;
            }
        };

        if body.as_object().is_some_and(|fields| fields.is_empty()) {
            debug!("Empty payload for {}", date);
            return None;
        }

        match serde_json::from_value::<RawPayload>(body) {
            Ok(payload) => Some(payload),
            Err(e) => {
                warn!("Unexpected payload shape for {}: {}", date, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::{Rate, fetch_range, parse};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    const RATES_PATH: &str = "/p24api/exchange_rates";

    async fn create_mock_server(date: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(RATES_PATH))
            .and(query_param("date", date))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    /// Replies with a payload dated after the `date` query parameter.
    struct EchoDate;

    impl Respond for EchoDate {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let date = request
                .url
                .query_pairs()
                .find(|(key, _)| key == "date")
                .map(|(_, value)| value.into_owned())
                .unwrap_or_default();
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "date": date,
                "exchangeRate": [
                    {"baseCurrency": "UAH", "currency": "USD", "saleRate": 41.5, "purchaseRate": 40.9}
                ]
            }))
        }
    }

    #[tokio::test]
    async fn test_successful_fetch() {
        let body = r#"{
            "date": "01.12.2024",
            "bank": "PB",
            "baseCurrency": 980,
            "baseCurrencyLit": "UAH",
            "exchangeRate": [
                {"baseCurrency": "UAH", "currency": "EUR", "saleRateNB": 43.9, "purchaseRateNB": 43.9, "saleRate": 44.2, "purchaseRate": 43.6}
            ]
        }"#;
        let mock_server = create_mock_server("01.12.2024", 200, body).await;
        let provider = PrivatBankProvider::new(&mock_server.uri());

        let payload = provider.fetch_one("01.12.2024").await.unwrap();
        let rates = parse(&payload, &["EUR".to_string()]);

        assert_eq!(rates.date, "01.12.2024");
        assert_eq!(
            rates.quote("EUR").unwrap().sale,
            Rate::Value("44.2".to_string())
        );
    }

    #[tokio::test]
    async fn test_error_status_yields_no_data() {
        let mock_server = create_mock_server("01.12.2024", 500, "").await;
        let provider = PrivatBankProvider::new(&mock_server.uri());

        assert!(provider.fetch_one("01.12.2024").await.is_none());
    }

    #[tokio::test]
    async fn test_non_ok_success_status_yields_no_data() {
        let mock_server = create_mock_server("01.12.2024", 204, "").await;
        let provider = PrivatBankProvider::new(&mock_server.uri());

        assert!(provider.fetch_one("01.12.2024").await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_and_empty_bodies_yield_no_data() {
        let mock_server = create_mock_server("01.12.2024", 200, "<html>busy</html>").await;
        let provider = PrivatBankProvider::new(&mock_server.uri());
        assert!(provider.fetch_one("01.12.2024").await.is_none());

        let mock_server = create_mock_server("01.12.2024", 200, "{}").await;
        let provider = PrivatBankProvider::new(&mock_server.uri());
        assert!(provider.fetch_one("01.12.2024").await.is_none());
    }

    #[tokio::test]
    async fn test_connection_error_yields_no_data() {
        let mock_server = MockServer::start().await;
        let uri = mock_server.uri();
        drop(mock_server);

        let provider = PrivatBankProvider::new(&uri);
        assert!(provider.fetch_one("01.12.2024").await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_range_against_mock_upstream() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(RATES_PATH))
            .respond_with(EchoDate)
            .expect(3)
            .mount(&mock_server)
            .await;
        let provider = PrivatBankProvider::new(&mock_server.uri());

        let results = fetch_range(&provider, 3, &["USD".to_string(), "GBP".to_string()]).await;

        assert_eq!(results.len(), 3);
        for day in &results {
            assert_eq!(
                day.quote("USD").unwrap().purchase,
                Rate::Value("40.9".to_string())
            );
            assert_eq!(day.quote("GBP").unwrap().sale, Rate::NotAvailable);
        }
    }
}
