use std::time::Duration;

use clap::Parser;
use log::debug;
use serde_json::Value;
use ureq::Agent;

pub mod error;
pub mod request;
pub mod response;

pub use error::{Error, Result};
pub use request::{Command, DEFAULT_API_URL, Query, build_request_url};
pub use response::{ExchangeResponse, HistoricalRates, LatestRates, RateSet, RatesPayload, Response};

/// Get the latest currency exchange rates, or a history of rates between two dates.
///
/// Flags go before or after the command, e.g. `fxrates --base usd --currency gbp,eur latest`.
#[derive(Parser, Debug, Clone)]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub query: Query,

    /// Root URL of the exchange rates API
    #[arg(long, value_name = "URL", env = "FXRATES_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Request timeout
    #[arg(long, value_name = "SECONDS", env = "FXRATES_TIMEOUT", default_value_t = 30)]
    pub timeout: u64,
}

/// Builds the request for `args`, sends it, and parses the body into the matching response shape.
pub fn retrieve_rates(args: &Cli) -> Result<Response> {
    let target = Response::for_command(args.query.command()?);
    let request_url = build_request_url(&args.api_url, &args.query)?;

    debug!("requesting {request_url}");
    let body = fetch(&request_url, Duration::from_secs(args.timeout))?;
    debug!("received {} bytes", body.len());

    target.parse(&body)
}

/// Issues a single GET and returns the raw body of a successful response.
fn fetch(request_url: &str, timeout: Duration) -> Result<Vec<u8>> {
    let agent: Agent = Agent::config_builder()
        .timeout_global(Some(timeout))
        .http_status_as_error(false)
        .build()
        .into();

    let mut resp = agent.get(request_url).call()?;
    let status = resp.status();
    let body = resp.body_mut().read_to_vec()?;
    debug!("HTTP {status}");

    if status.is_success() {
        Ok(body)
    } else {
        // The API reports failures as a JSON object; fall back to raw text otherwise
        let body = serde_json::from_slice::<Value>(&body)
            .ok()
            .and_then(|value| serde_json::to_string_pretty(&value).ok())
            .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
        Err(Error::HttpStatus {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use jiff::civil::date;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LATEST: &str = include_str!("../testdata/latest.json");
    const HISTORY: &str = include_str!("../testdata/historical_range.json");

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("fxrates").chain(args.iter().copied()))
            .expect("arguments should parse")
    }

    /// Runs the blocking request off the async runtime driving the mock server.
    async fn retrieve(args: Cli) -> Result<Response> {
        tokio::task::spawn_blocking(move || retrieve_rates(&args))
            .await
            .expect("retrieve task panicked")
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parsing() {
        let args = cli(&[
            "--base", "eur", "--start", "2019-01-01", "--end", "2019-01-20", "--currency",
            "gbp,usd", "history",
        ]);
        assert_eq!(args.query.command, "history");
        assert_eq!(args.query.base.as_deref(), Some("eur"));
        assert_eq!(args.query.start, Some(date(2019, 1, 1)));
        assert_eq!(args.query.end, Some(date(2019, 1, 20)));
        assert_eq!(args.query.symbols, ["gbp", "usd"]);
        assert_eq!(args.timeout, 30);
        assert_eq!(
            build_request_url(&args.api_url, &args.query).unwrap(),
            "https://api.exchangeratesapi.io/history?start_at=2019-01-01&end_at=2019-01-20&symbols=GBP,USD&base=EUR"
        );
    }

    #[test]
    fn test_cli_rejects_bad_date() {
        let err = Cli::try_parse_from(["fxrates", "--start", "2019-13-01", "--end", "2019-01-20", "history"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[tokio::test]
    async fn test_validation_before_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LATEST))
            .expect(0)
            .mount(&server)
            .await;

        let mut args = cli(&["--api-url", &server.uri(), "convert"]);
        assert!(matches!(retrieve(args.clone()).await, Err(Error::InvalidCommand(_))));

        args.query.command = "history".to_string();
        args.query.start = Some(date(2019, 1, 1));
        assert!(matches!(
            retrieve(args).await,
            Err(Error::IncompleteDateRange { missing: "end" })
        ));
    }

    #[tokio::test]
    async fn test_retrieve_latest() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("symbols", "GBP,USD"))
            .and(query_param("base", "EUR"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LATEST))
            .expect(1)
            .mount(&server)
            .await;

        let args = cli(&["--api-url", &server.uri(), "--base", "eur", "--currency", "gbp,usd", "latest"]);
        let response = retrieve(args).await.expect("latest rates");

        assert_eq!(response.base_currency(), "EUR");
        assert!(matches!(response.rates_payload(), RatesPayload::Latest(rates) if rates.len() == 32));
    }

    #[tokio::test]
    async fn test_retrieve_history() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/history"))
            .and(query_param("start_at", "2018-01-01"))
            .and(query_param("end_at", "2018-01-05"))
            .and(query_param_is_missing("base"))
            .and(query_param_is_missing("symbols"))
            .respond_with(ResponseTemplate::new(200).set_body_string(HISTORY))
            .expect(1)
            .mount(&server)
            .await;

        let args = cli(&[
            "--api-url", &server.uri(), "--start", "2018-01-01", "--end", "2018-01-05", "history",
        ]);
        let response = retrieve(args).await.expect("historical rates");

        assert!(matches!(response, Response::Historical(_)));
        assert_eq!(response.date_info()["start"], "2018-01-01");
        assert_eq!(response.date_info()["end"], "2018-01-05");
    }

    #[tokio::test]
    async fn test_retrieve_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"error":"Symbols 'XYZ' are invalid for date 2019-03-29."}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let args = cli(&["--api-url", &server.uri(), "--currency", "xyz", "latest"]);
        match retrieve(args).await {
            Err(Error::HttpStatus { status, body }) => {
                assert_eq!(status, 400);
                assert!(body.contains("Symbols 'XYZ' are invalid"));
            }
            other => panic!("expected HttpStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_retrieve_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let args = cli(&["--api-url", &server.uri(), "latest"]);
        assert!(matches!(retrieve(args).await, Err(Error::MalformedResponse(_))));
    }
}
