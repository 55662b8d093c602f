use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::event::Event;

const API_URL: &str = "https://api.coingecko.com/api/v3/simple/price";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Currency {
    Eur,
    Usd,
}

impl Currency {
    pub fn code(self) -> &'static str {
        match self {
            Currency::Eur => "eur",
            Currency::Usd => "usd",
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Currency::Eur => "\u{20AC}",
            Currency::Usd => "$",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Currency::Eur => "EUR",
            Currency::Usd => "USD",
        }
    }

    pub fn from_str_config(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "usd" => Currency::Usd,
            _ => Currency::Eur,
        }
    }
}

#[derive(Debug, Clone)]
pub enum PriceResult {
    Updated(f64),
    Failed(String),
}

#[derive(Debug, Error)]
pub enum PriceError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("quote for {0} missing from response")]
    MissingQuote(&'static str),
}

#[derive(Debug, Deserialize)]
struct SimplePriceResponse {
    bitcoin: HashMap<String, f64>,
}

fn request_url(currency: Currency) -> String {
    format!("{API_URL}?ids=bitcoin&vs_currencies={}", currency.code())
}

async fn fetch_price(client: &reqwest::Client, currency: Currency) -> Result<f64, PriceError> {
    let response: SimplePriceResponse = client
        .get(request_url(currency))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    response
        .bitcoin
        .get(currency.code())
        .copied()
        .ok_or(PriceError::MissingQuote(currency.label()))
}

/// Spawns the background quote fetcher: one fetch immediately, then one per
/// refresh interval, plus one for every message on `refresh_rx` (manual
/// refresh). Each outcome is forwarded into the app's event channel; the
/// task exits when either channel closes.
pub fn spawn_price_task(
    tx: mpsc::UnboundedSender<Event>,
    mut refresh_rx: mpsc::UnboundedReceiver<()>,
    currency: Currency,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        let mut interval = tokio::time::interval(every);
        loop {
            tokio::select! {
                _ = interval.tick() => {}
                refresh = refresh_rx.recv() => {
                    if refresh.is_none() {
                        break;
                    }
                    interval.reset();
                }
            }
            let result = match fetch_price(&client, currency).await {
                Ok(quote) => PriceResult::Updated(quote),
                Err(err) => PriceResult::Failed(err.to_string()),
            };
            if tx.send(Event::Price(result)).is_err() {
                break;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_carries_the_currency() {
        assert_eq!(
            request_url(Currency::Eur),
            "https://api.coingecko.com/api/v3/simple/price?ids=bitcoin&vs_currencies=eur"
        );
        assert!(request_url(Currency::Usd).ends_with("vs_currencies=usd"));
    }

    #[test]
    fn deserializes_simple_price_response() {
        let json = r#"{ "bitcoin": { "eur": 61234.5 } }"#;
        let response: SimplePriceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.bitcoin.get("eur"), Some(&61234.5));
    }

    #[test]
    fn currency_config_parsing() {
        assert_eq!(Currency::from_str_config("usd"), Currency::Usd);
        assert_eq!(Currency::from_str_config("USD"), Currency::Usd);
        assert_eq!(Currency::from_str_config("eur"), Currency::Eur);
        assert_eq!(Currency::from_str_config("anything"), Currency::Eur);
    }
}
