//! creating and sending HTTP requests
use crate::{error::Error, response::Response, stream::Stream};
use log::debug;
use std::{fmt, net::Ipv6Addr, slice, str::FromStr, time::Duration};
use unicase::Ascii;

#[cfg(feature = "auth")]
use base64::prelude::*;
#[cfg(feature = "auth")]
use zeroize::{Zeroize, ZeroizeOnDrop};

const CR_LF: &str = "\r\n";
const HTTP_V: &str = "HTTP/1.1";

/// Port used when none is given.
pub const DEFAULT_PORT: u16 = 80;
/// Path used when none is given.
pub const DEFAULT_PATH: &str = "/";
/// Method used when none is given.
pub const DEFAULT_METHOD: &str = "GET";
/// Timeout used when none is given.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Characters allowed in a token (RFC 7230, section 3.2.6).
fn is_tchar(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c)
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(is_tchar)
}

///HTTP request method.
///
///Any token is accepted and sent exactly as given.
///# Example
///```
///use httpcheck::request::Method;
///
///let method: Method = "PATCH".parse().unwrap();
///assert_eq!(method.as_ref(), "PATCH");
///assert!("GE T".parse::<Method>().is_err());
///```
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Method(String);

impl Method {
    pub fn get() -> Method {
        Method(DEFAULT_METHOD.to_string())
    }
}

impl Default for Method {
    fn default() -> Self {
        Method::get()
    }
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Method, Error> {
        if is_token(s) {
            Ok(Method(s.to_string()))
        } else {
            Err(Error::invalid(format!("invalid method {:?}", s)))
        }
    }
}

impl AsRef<str> for Method {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

///Ordered collection of request headers.
///
///Unlike a map, `Headers` keeps insertion order and allows repeated names.
///Lookups compare names case-insensitively.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct Headers(Vec<(Ascii<String>, String)>);

impl Headers {
    ///Creates new empty `Headers`.
    pub fn new() -> Headers {
        Headers(Vec::new())
    }

    ///Appends a header after validating its name and value.
    pub fn insert<T, U>(&mut self, key: &T, val: &U) -> Result<&mut Self, Error>
    where
        T: ToString + ?Sized,
        U: ToString + ?Sized,
    {
        let key = key.to_string();
        let val = val.to_string();

        if !is_token(&key) {
            return Err(Error::invalid(format!("invalid header name {:?}", key)));
        }
        if val.contains(['\r', '\n']) {
            return Err(Error::invalid(format!(
                "header {:?} has a line break in its value",
                key
            )));
        }

        self.0.push((Ascii::new(key), val));
        Ok(self)
    }

    ///Parses a `Name: Value` line and appends it.
    ///
    ///Only the single space after the colon is dropped, the rest of the value
    ///is kept as given.
    pub fn insert_raw(&mut self, line: &str) -> Result<&mut Self, Error> {
        match line.split_once(':') {
            Some((key, val)) => {
                self.insert(key.trim(), val.strip_prefix(' ').unwrap_or(val))
            }
            None => Err(Error::invalid(format!(
                "header {:?} is not in `Name: Value` form",
                line
            ))),
        }
    }

    ///Returns the value of the first header named `key`, ignoring case.
    pub fn get<T: AsRef<str>>(&self, key: T) -> Option<&str> {
        let key = Ascii::new(key.as_ref());
        self.0
            .iter()
            .find(|(k, _)| Ascii::new(k.as_str()) == key)
            .map(|(_, v)| v.as_str())
    }

    ///Checks whether a header named `key` is present, ignoring case.
    pub fn contains<T: AsRef<str>>(&self, key: T) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    ///Iterates over headers in insertion order.
    pub fn iter(&self) -> Iter {
        Iter(self.0.iter())
    }
}

impl<'a> IntoIterator for &'a Headers {
    type Item = (&'a str, &'a str);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}

pub struct Iter<'a>(slice::Iter<'a, (Ascii<String>, String)>);

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (key, val) in self.iter() {
            write!(f, "{}: {}{}", key, val, CR_LF)?;
        }

        Ok(())
    }
}

///Authentication details sent in the `Authorization` header.
///
///Secrets are wiped from memory when the value is dropped.
///# Example
///```
///use httpcheck::request::Authentication;
///
///let auth = Authentication::basic("foo", "bar");
///assert_eq!(auth.header(), "Basic Zm9vOmJhcg==");
///```
#[cfg(feature = "auth")]
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub enum Authentication {
    Basic { username: String, password: String },
    Bearer(String),
}

#[cfg(feature = "auth")]
impl Authentication {
    ///Creates HTTP Basic authentication.
    pub fn basic<T, U>(username: &T, password: &U) -> Authentication
    where
        T: ToString + ?Sized,
        U: ToString + ?Sized,
    {
        Authentication::Basic {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    ///Creates bearer token authentication.
    pub fn bearer<T: ToString + ?Sized>(token: &T) -> Authentication {
        Authentication::Bearer(token.to_string())
    }

    ///Returns value of the `Authorization` header.
    pub fn header(&self) -> String {
        match self {
            Authentication::Basic { username, password } => {
                let mut credentials = format!("{}:{}", username, password);
                let encoded = BASE64_STANDARD.encode(credentials.as_bytes());
                credentials.zeroize();

                format!("Basic {}", encoded)
            }
            Authentication::Bearer(token) => format!("Bearer {}", token),
        }
    }
}

#[cfg(feature = "auth")]
impl fmt::Debug for Authentication {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Authentication::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Authentication::Bearer(_) => f.write_str("Bearer(..)"),
        }
    }
}

///Builds a validated [`Request`].
///
///Starts from the defaults: port 80, path `/`, method `GET`, no headers and
///a 5 second timeout. Nothing is checked until [`RequestBuilder::build`].
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    host: String,
    port: u16,
    path: String,
    method: String,
    headers: Vec<String>,
    body: Option<Vec<u8>>,
    timeout: f64,
    #[cfg(feature = "auth")]
    auth: Option<Authentication>,
}

impl RequestBuilder {
    ///Creates new `RequestBuilder` with default parameters
    pub fn new<T: ToString + ?Sized>(host: &T) -> RequestBuilder {
        RequestBuilder {
            host: host.to_string(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
            method: DEFAULT_METHOD.to_string(),
            headers: Vec::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT.as_secs_f64(),
            #[cfg(feature = "auth")]
            auth: None,
        }
    }

    pub fn port(&mut self, port: u16) -> &mut Self {
        self.port = port;
        self
    }

    pub fn path<T: ToString + ?Sized>(&mut self, path: &T) -> &mut Self {
        self.path = path.to_string();
        self
    }

    pub fn method<T: ToString + ?Sized>(&mut self, method: &T) -> &mut Self {
        self.method = method.to_string();
        self
    }

    ///Adds a header. Order of calls is the order on the wire.
    pub fn header<T, U>(&mut self, key: &T, val: &U) -> &mut Self
    where
        T: ToString + ?Sized,
        U: ToString + ?Sized,
    {
        self.headers
            .push(format!("{}: {}", key.to_string(), val.to_string()));
        self
    }

    ///Adds a header given as a single `Name: Value` line.
    pub fn raw_header<T: ToString + ?Sized>(&mut self, line: &T) -> &mut Self {
        self.headers.push(line.to_string());
        self
    }

    ///Sets body for request
    pub fn body<T: Into<Vec<u8>>>(&mut self, body: T) -> &mut Self {
        self.body = Some(body.into());
        self
    }

    ///Sets timeout in seconds, applied to connecting and to the exchange.
    pub fn timeout(&mut self, secs: f64) -> &mut Self {
        self.timeout = secs;
        self
    }

    ///Adds authentication to the request.
    #[cfg(feature = "auth")]
    pub fn authentication(&mut self, auth: Authentication) -> &mut Self {
        self.auth = Some(auth);
        self
    }

    ///Validates collected parameters and creates the `Request`.
    pub fn build(&self) -> Result<Request, Error> {
        let host = self.host.trim();
        if host.is_empty() {
            return Err(Error::invalid("host must not be empty"));
        }
        if host.contains(|c: char| c.is_whitespace() || c == '/') {
            return Err(Error::invalid(format!("invalid host {:?}", host)));
        }
        // only IPv6 literals may contain a colon, the port is given separately
        if host.contains(':') && host.parse::<Ipv6Addr>().is_err() {
            return Err(Error::invalid(format!(
                "invalid host {:?}, pass the port with --port",
                host
            )));
        }
        if self.port == 0 {
            return Err(Error::invalid("port must be within 1-65535"));
        }
        if !self.path.starts_with('/') {
            return Err(Error::invalid(format!(
                "path {:?} must start with '/'",
                self.path
            )));
        }
        if self.path.contains(|c: char| c.is_whitespace() || c.is_control()) {
            return Err(Error::invalid(format!(
                "path {:?} contains whitespace",
                self.path
            )));
        }

        let timeout = Duration::try_from_secs_f64(self.timeout)
            .ok()
            .filter(|t| !t.is_zero())
            .ok_or_else(|| {
                Error::invalid(format!(
                    "timeout must be a positive number of seconds, got {}",
                    self.timeout
                ))
            })?;

        let mut headers = Headers::new();
        for line in &self.headers {
            headers.insert_raw(line)?;
        }

        #[cfg(feature = "auth")]
        if let Some(auth) = &self.auth {
            headers.insert("Authorization", &auth.header())?;
        }

        Ok(Request {
            host: host.to_string(),
            port: self.port,
            path: self.path.clone(),
            method: self.method.parse()?,
            headers,
            body: self.body.clone(),
            timeout,
        })
    }
}

///Immutable description of one HTTP request.
///
///# Example
///```
///use httpcheck::request::RequestBuilder;
///
///let request = RequestBuilder::new("example.com")
///    .path("/index.html")
///    .header("Accept", "text/html")
///    .build()
///    .unwrap();
///
///assert_eq!(
///    request.to_bytes(),
///    b"GET /index.html HTTP/1.1\r\n\
///      Host: example.com\r\n\
///      Connection: close\r\n\
///      Accept: text/html\r\n\r\n"
///);
///```
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    host: String,
    port: u16,
    path: String,
    method: Method,
    headers: Headers,
    body: Option<Vec<u8>>,
    timeout: Duration,
}

impl Request {
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    ///Returns headers supplied by the caller, without the automatic ones.
    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    ///Returns value of the automatic `Host` header: the bare host, with
    ///IPv6 literals in brackets.
    pub fn host_header(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }

    ///Serializes the request message exactly as it is sent.
    pub fn to_bytes(&self) -> Vec<u8> {
        let request_line = format!(
            "{} {} {}{}",
            self.method.as_ref(),
            self.path,
            HTTP_V,
            CR_LF
        );

        let mut head = request_line;

        if !self.headers.contains("Host") {
            head += &format!("Host: {}{}", self.host_header(), CR_LF);
        }
        if !self.headers.contains("Connection") {
            head += &format!("Connection: close{}", CR_LF);
        }

        head += &self.headers.to_string();

        if let Some(b) = &self.body {
            if !self.headers.contains("Content-Length") {
                head += &format!("Content-Length: {}{}", b.len(), CR_LF);
            }
        }

        let mut request_msg = (head + CR_LF).into_bytes();

        if let Some(b) = &self.body {
            request_msg.extend(b);
        }

        request_msg
    }

    ///Sends HTTP request.
    ///
    ///Opens one TCP connection, writes the request message, then reads until
    ///the server closes the connection. Returns everything the server sent.
    pub fn send(&self) -> Result<Response, Error> {
        debug!(
            "{} {} to {}:{} (timeout {:?})",
            self.method, self.path, self.host, self.port, self.timeout
        );

        let mut stream = Stream::connect(&self.host, self.port, self.timeout)?;
        stream.send_all(&self.to_bytes())?;
        let raw = stream.read_to_close()?;

        Ok(Response::from(raw))
    }
}

///Sends `request` and returns the raw response.
pub fn send(request: &Request) -> Result<Response, Error> {
    request.send()
}

///Creates and sends GET request to `host`. Returns the raw response.
pub fn get<T: ToString + ?Sized, U: ToString + ?Sized>(
    host: &T,
    path: &U,
) -> Result<Response, Error> {
    RequestBuilder::new(host).path(path).build()?.send()
}
