use crate::router::split_path;
use crate::spec::ParameterSource;
use http::Method;
use smallvec::SmallVec;
use std::collections::HashMap;
use tracing::debug;

/// Maximum inline headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Header storage for the request and response paths.
pub type HeaderVec = SmallVec<[(String, String); MAX_INLINE_HEADERS]>;

/// Inbound request capability.
///
/// The dispatcher depends only on this trait; each transport (CGI, FastCGI, a
/// socket listener, an in-process harness) provides an adapter implementing it.
pub trait GatewayRequest {
    fn method(&self) -> &Method;

    /// Percent-decoded path elements; empty for `/`.
    fn path_segments(&self) -> &[String];

    /// Key-value lookup for [`ParameterSource::Query`], [`ParameterSource::Header`]
    /// and [`ParameterSource::Cookie`]. Header names compare case-insensitively.
    /// Cookie values are returned exactly as sent; URL-decoding is the binder's job.
    /// Returns `None` for the URL and body sources.
    fn lookup(&self, source: ParameterSource, key: &str) -> Option<&str>;

    /// Raw request body bytes (empty when there is no body).
    fn body(&self) -> &[u8];

    fn header(&self, name: &str) -> Option<&str> {
        self.lookup(ParameterSource::Header, name)
    }

    fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    fn accept(&self) -> Option<&str> {
        self.header("accept")
    }
}

/// In-memory request, the adapter used by tests, the CLI `probe` command and any
/// host that already has the request fully in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRequest {
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    pub segments: Vec<String>,
    pub headers: HeaderVec,
    pub cookies: HashMap<String, String>,
    pub query_params: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Parse the `Cookie` header into name → raw value pairs.
pub fn parse_cookies(header: &str) -> HashMap<String, String> {
    header
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").trim();
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// Parse the query string of a request target (everything after `?`), URL-decoded.
pub fn parse_query_params(target: &str) -> Vec<(String, String)> {
    match target.split_once('?') {
        Some((_, query)) => {
            let query = query.split('#').next().unwrap_or_default();
            url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        }
        None => Vec::new(),
    }
}

impl ParsedRequest {
    /// Build a request from a method and a request target such as `/users?limit=10`.
    pub fn new(method: Method, target: &str) -> Self {
        let path = target
            .split(['?', '#'])
            .next()
            .unwrap_or("/")
            .to_string();
        let segments = split_path(&path);
        let query_params = parse_query_params(target);
        debug!(
            method = %method,
            path = %path,
            segments = segments.len(),
            param_count = query_params.len(),
            "Request target parsed"
        );
        Self {
            method,
            path,
            segments,
            headers: HeaderVec::new(),
            cookies: HashMap::new(),
            query_params,
            body: Vec::new(),
        }
    }

    /// Add a header. A `Cookie` header also refreshes the parsed cookies.
    ///
    /// Repeating a header name appends to the earlier value, joined with `", "`
    /// (`"; "` for `Cookie`).
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        let is_cookie = name.eq_ignore_ascii_case("cookie");
        if is_cookie {
            self.cookies.extend(parse_cookies(value));
        }
        match self
            .headers
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some((_, joined)) => {
                joined.push_str(if is_cookie { "; " } else { ", " });
                joined.push_str(value);
            }
            None => self.headers.push((name.to_string(), value.to_string())),
        }
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Adapt an [`http::Request`] whose body is already in memory.
    pub fn from_http<B: AsRef<[u8]>>(req: &http::Request<B>) -> Self {
        let target = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let mut parsed = Self::new(req.method().clone(), target);
        for (name, value) in req.headers() {
            let value = String::from_utf8_lossy(value.as_bytes());
            parsed = parsed.with_header(name.as_str(), &value);
        }
        parsed.body = req.body().as_ref().to_vec();
        parsed
    }
}

impl GatewayRequest for ParsedRequest {
    fn method(&self) -> &Method {
        &self.method
    }

    fn path_segments(&self) -> &[String] {
        &self.segments
    }

    fn lookup(&self, source: ParameterSource, key: &str) -> Option<&str> {
        match source {
            // last occurrence wins for repeated query keys
            ParameterSource::Query => self
                .query_params
                .iter()
                .rfind(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            ParameterSource::Header => self
                .headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_str()),
            ParameterSource::Cookie => self.cookies.get(key).map(String::as_str),
            ParameterSource::Url | ParameterSource::Body => None,
        }
    }

    fn body(&self) -> &[u8] {
        &self.body
    }
}
