use super::request::HeaderVec;
use http::StatusCode;
use serde_json::{json, Value};

/// Response produced by the gateway, handed back to the transport adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct GatewayResponse {
    pub status: StatusCode,
    pub headers: HeaderVec,
    pub body: Vec<u8>,
}

impl GatewayResponse {
    pub fn new(status: StatusCode, content_type: &str, body: Vec<u8>) -> Self {
        let mut headers = HeaderVec::new();
        headers.push(("Content-Type".to_string(), content_type.to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// JSON error body `{"error": kind, "message": text}`. `message` is omitted when `None`.
    pub fn json_error(status: StatusCode, kind: &str, message: Option<&str>) -> Self {
        let body = match message {
            Some(message) => json!({ "error": kind, "message": message }),
            None => json!({ "error": kind }),
        };
        Self::new(status, "application/json", body.to_string().into_bytes())
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// First header named `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body parsed as JSON, `None` if it is not JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Convert into an [`http::Response`] for hosts built on the `http` types.
    pub fn into_http(self) -> http::Response<Vec<u8>> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                http::header::HeaderName::from_bytes(name.as_bytes()),
                http::header::HeaderValue::from_str(value),
            ) {
                response.headers_mut().append(name, value);
            }
        }
        response
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_json_error_shape() {
        let res = GatewayResponse::json_error(StatusCode::NOT_FOUND, "route_not_found", Some("no route"));
        assert_eq!(res.content_type(), Some("application/json"));
        assert_eq!(
            res.json().unwrap(),
            json!({"error": "route_not_found", "message": "no route"})
        );

        let hidden = GatewayResponse::json_error(StatusCode::INTERNAL_SERVER_ERROR, "backend_fault", None);
        assert!(hidden.json().unwrap().get("message").is_none());
    }

    #[test]
    fn test_into_http_keeps_headers() {
        let res = GatewayResponse::new(StatusCode::METHOD_NOT_ALLOWED, "application/json", b"{}".to_vec())
            .with_header("Allow", "GET, DELETE");
        let http_res = res.into_http();
        assert_eq!(http_res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(http_res.headers()["allow"], "GET, DELETE");
    }
}
