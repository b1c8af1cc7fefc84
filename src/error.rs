//! Errors raised while building the request, fetching rates, or parsing the response.

use jiff::civil::Date;
use thiserror::Error;

/// Crate-wide `Result` with [`Error`] as the default error.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid command {0:?}, expected `latest` or `history`")]
    InvalidCommand(String),

    /// Only one end of a date range was given.
    #[error("please provide the {missing} flag when doing a time query")]
    IncompleteDateRange { missing: &'static str },

    #[error("end date {end} is before start date {start}")]
    ReversedDateRange { start: Date, end: Date },

    #[error("invalid currency code {0:?}, expected ASCII letters only")]
    InvalidCurrencyCode(String),

    /// `history` was requested without any date range, so no request can be formed.
    #[error("unexpected request: `history` needs both --start and --end")]
    MissingDateRange,

    #[error("failure while accessing the exchange rates API: {0}")]
    Transport(#[from] ureq::Error),

    #[error("exchange rates API returned HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("failed to parse exchange data: {0}")]
    MalformedResponse(#[from] serde_json::Error),
}
