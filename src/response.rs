//! Response shapes for the `latest` and `history` endpoints.
//!
//! Both shapes expose the same accessors through [`ExchangeResponse`], so printing code
//! does not care which endpoint produced the data. [`Response`] picks the shape from the
//! [`Command`] before the request is sent.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use serde::Deserialize;

use crate::error::Result;
use crate::request::Command;

/// Currency code to rate, for a single date.
pub type RateSet = BTreeMap<String, f64>;

/// Rates carried by a response, borrowed in the shape the endpoint returned them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RatesPayload<'a> {
    Latest(&'a RateSet),
    /// Rate sets keyed by ISO date.
    Historical(&'a BTreeMap<String, RateSet>),
}

/// Accessors shared by every response shape.
pub trait ExchangeResponse: Display {
    fn base_currency(&self) -> &str;

    /// Dates describing the response, keyed by label (`date`, or `start` and `end`).
    fn date_info(&self) -> BTreeMap<&'static str, &str>;

    fn rates_payload(&self) -> RatesPayload<'_>;

    /// Human-readable report of the response.
    fn render(&self) -> String {
        self.to_string()
    }
}

/// Body of the `latest` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LatestRates {
    pub base: String,
    pub date: String,
    pub rates: RateSet,
}

impl LatestRates {
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(raw)?)
    }

    /// Rate for `currency`, if the response carries it.
    pub fn rate(&self, currency: &str) -> Option<f64> {
        self.rates.get(currency).copied()
    }
}

impl ExchangeResponse for LatestRates {
    fn base_currency(&self) -> &str {
        &self.base
    }

    fn date_info(&self) -> BTreeMap<&'static str, &str> {
        BTreeMap::from([("date", self.date.as_str())])
    }

    fn rates_payload(&self) -> RatesPayload<'_> {
        RatesPayload::Latest(&self.rates)
    }
}

impl Display for LatestRates {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "Base Currency: {}", self.base)?;
        writeln!(f)?;
        writeln!(f, "Date: {}", self.date)?;
        writeln!(f)?;
        write_rate_set(f, &self.rates)
    }
}

/// Body of the `history` endpoint.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoricalRates {
    pub base: String,
    #[serde(rename = "start_at", alias = "start_date")]
    pub start: String,
    #[serde(rename = "end_at", alias = "end_date")]
    pub end: String,
    pub rates: BTreeMap<String, RateSet>,
}

impl HistoricalRates {
    pub fn from_bytes(raw: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(raw)?)
    }

    /// Rate for `currency` on `date` (`YYYY-MM-DD`), if the response carries it.
    pub fn rate_on(&self, date: &str, currency: &str) -> Option<f64> {
        self.rates.get(date)?.get(currency).copied()
    }
}

impl ExchangeResponse for HistoricalRates {
    fn base_currency(&self) -> &str {
        &self.base
    }

    fn date_info(&self) -> BTreeMap<&'static str, &str> {
        BTreeMap::from([("start", self.start.as_str()), ("end", self.end.as_str())])
    }

    fn rates_payload(&self) -> RatesPayload<'_> {
        RatesPayload::Historical(&self.rates)
    }
}

impl Display for HistoricalRates {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        writeln!(f, "Base Currency: {}", self.base)?;
        writeln!(f, "Start Date: {}", self.start)?;
        writeln!(f, "End Date: {}", self.end)?;
        for (date, rates) in &self.rates {
            writeln!(f)?;
            writeln!(f, "Rates on the date of: {date}")?;
            writeln!(f)?;
            write_rate_set(f, rates)?;
        }
        Ok(())
    }
}

fn write_rate_set(f: &mut Formatter, rates: &RateSet) -> fmt::Result {
    for (currency, rate) in rates {
        writeln!(f, "Currency {currency} = {rate}")?;
    }
    Ok(())
}

/// A response of either shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    Latest(LatestRates),
    Historical(HistoricalRates),
}

impl Response {
    /// Empty response of the shape `command` returns, ready to [`parse`](Self::parse) into.
    pub fn for_command(command: Command) -> Self {
        match command {
            Command::Latest => Response::Latest(LatestRates::default()),
            Command::History => Response::Historical(HistoricalRates::default()),
        }
    }

    /// Parses a raw body into the same shape as `self`.
    pub fn parse(&self, raw: &[u8]) -> Result<Self> {
        Ok(match self {
            Response::Latest(_) => Response::Latest(LatestRates::from_bytes(raw)?),
            Response::Historical(_) => Response::Historical(HistoricalRates::from_bytes(raw)?),
        })
    }

    fn inner(&self) -> &dyn ExchangeResponse {
        match self {
            Response::Latest(latest) => latest,
            Response::Historical(historical) => historical,
        }
    }
}

impl ExchangeResponse for Response {
    fn base_currency(&self) -> &str {
        self.inner().base_currency()
    }

    fn date_info(&self) -> BTreeMap<&'static str, &str> {
        self.inner().date_info()
    }

    fn rates_payload(&self) -> RatesPayload<'_> {
        self.inner().rates_payload()
    }
}

impl Display for Response {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(self.inner(), f)
    }
}
