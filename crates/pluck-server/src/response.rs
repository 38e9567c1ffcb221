//! Response construction for the gateway
//!
//! Every response the gateway sends is built here, so status codes and
//! headers for each outcome live in one place.

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Body as _;
use hyper::header::{HeaderValue, ALLOW, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Response, StatusCode};
use pluck_content::SniffResult;
use pluck_core::error::{ErrorKind, PluckError};

/// Body type of every gateway response
pub type Body = Full<Bytes>;

/// Cache policy for successfully served files and listings
pub const CACHE_CONTROL_VALUE: &str = "public, max-age=86400";

const LISTING_CONTENT_TYPE: &str = "text/html;charset=utf-8";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const WELCOME_PAGE: &str = "<h1>Welcome to pluck</h1>";

fn build(status: StatusCode, content_type: HeaderValue, body: impl Into<Bytes>) -> Response<Body> {
    let mut response = Response::new(Full::new(body.into()));
    *response.status_mut() = status;
    response.headers_mut().insert(CONTENT_TYPE, content_type);
    response
}

/// Static landing page served at `/`
pub fn welcome() -> Response<Body> {
    build(StatusCode::OK, HeaderValue::from_static("text/html"), WELCOME_PAGE)
}

/// A file pulled out of a package, typed by sniffing
pub fn file(content: Vec<u8>, sniffed: &SniffResult) -> Response<Body> {
    let content_type = HeaderValue::from_str(&sniffed.content_type())
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let mut response = build(StatusCode::OK, content_type, content);
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL_VALUE));
    response
}

/// A rendered directory listing
pub fn listing(html: String) -> Response<Body> {
    let mut response = build(
        StatusCode::OK,
        HeaderValue::from_static(LISTING_CONTENT_TYPE),
        html,
    );
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL_VALUE));
    response
}

/// Status code for an error class
pub fn status_for(error: &PluckError) -> StatusCode {
    match error.kind() {
        ErrorKind::UpstreamUnavailable => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// One-line plain text error naming the failure class
pub fn error(error: &PluckError) -> Response<Body> {
    let status = status_for(error);
    build(
        status,
        HeaderValue::from_static(TEXT_CONTENT_TYPE),
        format!("{} {}", status.as_u16(), error.class_name()),
    )
}

/// Anything other than GET or HEAD
pub fn method_not_allowed() -> Response<Body> {
    let mut response = build(
        StatusCode::METHOD_NOT_ALLOWED,
        HeaderValue::from_static(TEXT_CONTENT_TYPE),
        "405 MethodNotAllowed",
    );
    response
        .headers_mut()
        .insert(ALLOW, HeaderValue::from_static("GET, HEAD"));
    response
}

/// Drop the body of a response while keeping the headers GET would send
pub fn without_body(response: Response<Body>) -> Response<Body> {
    let (mut parts, body) = response.into_parts();
    let size = body.size_hint().exact().unwrap_or(0);
    parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(size));
    Response::from_parts(parts, Full::new(Bytes::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_text(response: Response<Body>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        let upstream = PluckError::upstream_status("http://registry/x", 500);
        assert_eq!(status_for(&upstream), StatusCode::GATEWAY_TIMEOUT);

        let missing = PluckError::ArchiveEntryNotFound {
            path: "/nope.js".to_string(),
        };
        assert_eq!(status_for(&missing), StatusCode::NOT_FOUND);

        let corrupt = PluckError::ArchiveCorrupt {
            message: "bad gzip".to_string(),
            source: None,
        };
        assert_eq!(status_for(&corrupt), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_error_body_names_class_only() {
        let err = PluckError::VersionNotFound {
            package: "left-pad".to_string(),
            specifier: "^9".to_string(),
        };
        let response = error(&err);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], TEXT_CONTENT_TYPE);
        assert_eq!(body_text(response).await, "404 VersionNotFound");
    }

    #[tokio::test]
    async fn test_file_headers() {
        let sniffed = SniffResult {
            mime_type: "application/json",
            charset: "utf-8".to_string(),
        };
        let response = file(b"{}".to_vec(), &sniffed);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json; charset=utf-8");
        assert_eq!(response.headers()[CACHE_CONTROL], CACHE_CONTROL_VALUE);
        assert_eq!(body_text(response).await, "{}");
    }

    #[tokio::test]
    async fn test_without_body_keeps_headers() {
        let response = without_body(listing("<ul></ul>".to_string()));
        assert_eq!(response.headers()[CONTENT_TYPE], LISTING_CONTENT_TYPE);
        assert_eq!(response.headers()[CONTENT_LENGTH], "9");
        assert!(body_text(response).await.is_empty());
    }

    #[test]
    fn test_method_not_allowed() {
        let response = method_not_allowed();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET, HEAD");
    }
}
