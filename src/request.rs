//! Request URL construction for the `latest` and `history` endpoints.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use clap::Args;
use jiff::civil::Date;

use crate::error::{Error, Result};

/// Default API root, used when `--api-url` is not given.
pub const DEFAULT_API_URL: &str = "https://api.exchangeratesapi.io/";

/// API endpoint selected by the positional command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Most recent published rates.
    Latest,
    /// Rates for every published date between a start and end date.
    History,
}

impl Command {
    pub fn as_str(self) -> &'static str {
        match self {
            Command::Latest => "latest",
            Command::History => "history",
        }
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "latest" => Ok(Command::Latest),
            "history" => Ok(Command::History),
            other => Err(Error::InvalidCommand(other.to_string())),
        }
    }
}

/// Query parameters for a single rates request.
#[derive(Args, Debug, Clone, Default)]
pub struct Query {
    /// Endpoint to query: `latest` or `history`
    #[arg(value_name = "COMMAND")]
    pub command: String,

    /// Base currency the rates are quoted against
    #[arg(long, value_name = "CODE")]
    pub base: Option<String>,

    /// Start date of a time series (format: YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start: Option<Date>,
    /// End date of a time series (format: YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub end: Option<Date>,

    /// Comma separated list of currencies to return
    #[arg(long = "currency", value_name = "CODES", value_delimiter = ',')]
    pub symbols: Vec<String>,
}

impl Query {
    pub fn command(&self) -> Result<Command> {
        self.command.parse()
    }

    /// Both ends of the date range, if given. Supplying only one end is an error.
    pub fn date_range(&self) -> Result<Option<(Date, Date)>> {
        match (self.start, self.end) {
            (None, None) => Ok(None),
            (Some(_), None) => Err(Error::IncompleteDateRange { missing: "end" }),
            (None, Some(_)) => Err(Error::IncompleteDateRange { missing: "start" }),
            (Some(start), Some(end)) => Ok(Some((start, end))),
        }
    }

    fn base_param(&self) -> Result<Option<String>> {
        self.base
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
            .map(currency_code)
            .transpose()
    }

    fn symbols_param(&self) -> Result<Option<String>> {
        let symbols = self
            .symbols
            .iter()
            .map(|symbol| symbol.trim())
            .filter(|symbol| !symbol.is_empty())
            .map(currency_code)
            .collect::<Result<Vec<_>>>()?;
        Ok((!symbols.is_empty()).then(|| symbols.join(",")))
    }
}

/// Upper-cased currency code; anything but ASCII letters would leak into the query string.
fn currency_code(code: &str) -> Result<String> {
    if code.bytes().all(|b| b.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(Error::InvalidCurrencyCode(code.to_string()))
    }
}

/// Builds the request URL for `query` against the API rooted at `api`.
///
/// Parameters are appended in a fixed order: `start_at`, `end_at`, `symbols`, `base`.
/// Currency codes are upper-cased, and absent values never produce an empty parameter.
pub fn build_request_url(api: &str, query: &Query) -> Result<String> {
    let command = query.command()?;
    let range = query.date_range()?;

    let is_history = command == Command::History;
    if is_history {
        match range {
            None => return Err(Error::MissingDateRange),
            Some((start, end)) if end < start => {
                return Err(Error::ReversedDateRange { start, end });
            }
            Some(_) => {}
        }
    }

    let params = [
        ("start_at", range.map(|(start, _)| start.to_string()), is_history),
        ("end_at", range.map(|(_, end)| end.to_string()), is_history),
        ("symbols", query.symbols_param()?, true),
        ("base", query.base_param()?, true),
    ];

    let mut url = format!("{}/{command}", api.trim_end_matches('/'));
    let mut separator = '?';
    for (name, value, applies) in params {
        let Some(value) = value.filter(|_| applies) else {
            continue;
        };
        url.push(separator);
        url.push_str(name);
        url.push('=');
        url.push_str(&value);
        separator = '&';
    }

    Ok(url)
}
