//! command line interface
use crate::{
    error::{Error, ErrorKind},
    request::{Request, RequestBuilder, DEFAULT_METHOD, DEFAULT_PATH, DEFAULT_PORT},
};
use clap::{ArgAction, Parser};
use log::LevelFilter;

#[cfg(feature = "auth")]
use crate::request::Authentication;

pub const EXIT_INVALID_ARGUMENT: u8 = 2;
pub const EXIT_CONNECTION: u8 = 3;
pub const EXIT_TIMEOUT: u8 = 4;

///Maps an error category to the process exit code.
pub fn exit_code(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::InvalidArgument => EXIT_INVALID_ARGUMENT,
        ErrorKind::Connection => EXIT_CONNECTION,
        ErrorKind::Timeout => EXIT_TIMEOUT,
    }
}

/// Minimal HTTP response checker.
///
/// Sends one hand-built HTTP/1.1 request over a plain TCP connection and
/// prints the raw response.
#[derive(Debug, Parser)]
#[command(name = "httpcheck", version)]
pub struct Cli {
    /// Target host or IP address
    pub host: String,

    /// Port where the server listens
    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Resource path to request
    #[arg(long, default_value = DEFAULT_PATH)]
    pub path: String,

    /// HTTP method to use
    #[arg(short = 'X', long, default_value = DEFAULT_METHOD)]
    pub method: String,

    /// Additional header line to send, as "Name: Value" (can be repeated)
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Request body
    #[arg(short, long)]
    pub data: Option<String>,

    /// Basic authentication credentials
    #[arg(short, long, value_name = "USER:PASS")]
    pub user: Option<String>,

    /// Bearer token for the Authorization header
    #[arg(long, value_name = "TOKEN", conflicts_with = "user")]
    pub bearer: Option<String>,

    /// Timeout in seconds, applied to connecting and to the exchange
    #[arg(
        long,
        default_value_t = 5.0,
        env = "HTTPCHECK_TIMEOUT",
        allow_negative_numbers = true
    )]
    pub timeout: f64,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    ///Builds the request described by the arguments.
    pub fn to_request(&self) -> Result<Request, Error> {
        let mut builder = RequestBuilder::new(&self.host);
        builder
            .port(self.port)
            .path(&self.path)
            .method(&self.method.to_uppercase())
            .timeout(self.timeout);

        for line in &self.headers {
            builder.raw_header(line);
        }

        if let Some(data) = &self.data {
            builder.body(data.as_bytes());
        }

        #[cfg(feature = "auth")]
        if let Some(auth) = self.authentication() {
            builder.authentication(auth);
        }

        #[cfg(not(feature = "auth"))]
        if self.user.is_some() || self.bearer.is_some() {
            return Err(Error::InvalidArgument(
                "built without authentication support".to_string(),
            ));
        }

        builder.build()
    }

    #[cfg(feature = "auth")]
    fn authentication(&self) -> Option<Authentication> {
        if let Some(token) = &self.bearer {
            return Some(Authentication::bearer(token));
        }

        self.user.as_ref().map(|user| match user.split_once(':') {
            Some((name, pass)) => Authentication::basic(name, pass),
            None => Authentication::basic(user, ""),
        })
    }

    ///Returns the log level selected with `-v`.
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{error::ErrorKind as ClapErrorKind, CommandFactory};
    use std::time::Duration;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn cli_defaults() {
        let cli = parse(&["httpcheck", "exemplo.com"]);
        let req = cli.to_request().unwrap();

        assert_eq!(req.host(), "exemplo.com");
        assert_eq!(req.port(), 80);
        assert_eq!(req.path(), "/");
        assert_eq!(req.method().as_ref(), "GET");
        assert_eq!(req.timeout(), Duration::from_secs(5));
        assert_eq!(cli.log_level(), LevelFilter::Warn);
    }

    #[test]
    fn cli_all_options() {
        let cli = parse(&[
            "httpcheck",
            "localhost",
            "-p",
            "8080",
            "--path",
            "/health",
            "-X",
            "post",
            "-H",
            "Accept: */*",
            "--header",
            "X-Trace: 1",
            "-d",
            "ping",
            "--timeout",
            "0.5",
            "-vv",
        ]);
        let req = cli.to_request().unwrap();

        assert_eq!(req.port(), 8080);
        assert_eq!(req.path(), "/health");
        assert_eq!(req.method().as_ref(), "POST");
        assert_eq!(req.body(), Some(&b"ping"[..]));
        assert_eq!(req.timeout(), Duration::from_millis(500));
        assert_eq!(cli.log_level(), LevelFilter::Debug);

        let headers: Vec<_> = req.headers().iter().collect();
        assert_eq!(headers, [("Accept", "*/*"), ("X-Trace", "1")]);
    }

    #[test]
    fn cli_version_exits_before_anything_else() {
        let err = Cli::try_parse_from(["httpcheck", "--version"]).unwrap_err();
        assert_eq!(err.kind(), ClapErrorKind::DisplayVersion);
        assert_eq!(err.exit_code(), 0);

        let err = Cli::try_parse_from(["httpcheck", "-V"]).unwrap_err();
        assert_eq!(err.kind(), ClapErrorKind::DisplayVersion);
    }

    #[test]
    fn cli_non_numeric_port() {
        let err = Cli::try_parse_from(["httpcheck", "localhost", "--port", "http"]).unwrap_err();
        assert_eq!(err.kind(), ClapErrorKind::ValueValidation);
        assert_eq!(err.exit_code(), EXIT_INVALID_ARGUMENT as i32);
    }

    #[test]
    fn cli_invalid_values() {
        for args in [
            ["httpcheck", "localhost", "--path", "health"],
            ["httpcheck", "localhost", "--timeout", "-1"],
            ["httpcheck", "localhost", "--port", "0"],
            ["httpcheck", "localhost", "-H", "Accept"],
        ] {
            let err = parse(&args).to_request().unwrap_err();
            assert_eq!(exit_code(err.kind()), EXIT_INVALID_ARGUMENT);
        }
    }

    #[cfg(feature = "auth")]
    #[test]
    fn cli_basic_auth() {
        let cli = parse(&["httpcheck", "localhost", "-u", "foo:bar"]);
        let req = cli.to_request().unwrap();

        assert_eq!(req.headers().get("authorization"), Some("Basic Zm9vOmJhcg=="));
    }

    #[cfg(feature = "auth")]
    #[test]
    fn cli_bearer_conflicts_with_user() {
        let err = Cli::try_parse_from(["httpcheck", "h", "-u", "a:b", "--bearer", "t"]).unwrap_err();
        assert_eq!(err.kind(), ClapErrorKind::ArgumentConflict);
    }

    #[test]
    fn exit_codes_are_distinct() {
        assert_eq!(exit_code(ErrorKind::InvalidArgument), 2);
        assert_eq!(exit_code(ErrorKind::Connection), 3);
        assert_eq!(exit_code(ErrorKind::Timeout), 4);
    }
}
