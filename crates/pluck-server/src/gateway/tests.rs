use super::*;
use bytes::Bytes;
use flate2::write::GzEncoder;
use flate2::Compression;
use http_body_util::BodyExt;
use hyper::header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Gzipped tarball with every file under `package/`
fn package_tarball(files: &[(&str, &[u8])]) -> Vec<u8> {
    let mut tarball_data = Vec::new();
    {
        let gz_encoder = GzEncoder::new(&mut tarball_data, Compression::default());
        let mut tar_builder = tar::Builder::new(gz_encoder);
        for (name, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_path(format!("package/{}", name)).unwrap();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            tar_builder.append(&header, *data).unwrap();
        }
        tar_builder.into_inner().unwrap().finish().unwrap();
    }
    tarball_data
}

struct Registry {
    server: MockServer,
    gateway: Gateway,
}

impl Registry {
    async fn start() -> Self {
        Self::with_timeout(RegistryConfig::default().timeout).await
    }

    async fn with_timeout(timeout: Duration) -> Self {
        let server = MockServer::start().await;
        let client = RegistryClient::new(RegistryConfig {
            base_url: server.uri(),
            timeout,
            ..RegistryConfig::default()
        })
        .unwrap();
        Self {
            server,
            gateway: Gateway::with_client(client),
        }
    }

    /// Publish a package: packument, one manifest per version, one tarball per version
    async fn publish(
        &self,
        name: &str,
        latest: &str,
        versions: &[&str],
        manifest_extra: serde_json::Value,
        files: &[(&str, &[u8])],
    ) {
        let encoded = name.replacen('/', "%2f", 1);
        let tarball = package_tarball(files);

        let version_map: serde_json::Map<String, serde_json::Value> = versions
            .iter()
            .map(|v| (v.to_string(), json!({ "version": v })))
            .collect();
        Mock::given(method("GET"))
            .and(path(format!("/{}", encoded)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": name,
                "dist-tags": { "latest": latest },
                "versions": version_map,
            })))
            .mount(&self.server)
            .await;

        for version in versions {
            let tarball_path = format!("/{}/-/pkg-{}.tgz", encoded, version);
            let mut manifest = json!({
                "name": name,
                "version": version,
                "dist": { "tarball": format!("{}{}", self.server.uri(), tarball_path) },
            });
            if let (Some(target), Some(extra)) = (manifest.as_object_mut(), manifest_extra.as_object()) {
                target.extend(extra.clone());
            }

            Mock::given(method("GET"))
                .and(path(format!("/{}/{}", encoded, version)))
                .respond_with(ResponseTemplate::new(200).set_body_json(manifest))
                .mount(&self.server)
                .await;
            Mock::given(method("GET"))
                .and(path(tarball_path))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(tarball.clone()))
                .mount(&self.server)
                .await;
        }
    }

    async fn get(&self, uri: &str) -> (StatusCode, hyper::HeaderMap, Bytes) {
        self.send(Method::GET, uri).await
    }

    async fn send(&self, method: Method, uri: &str) -> (StatusCode, hyper::HeaderMap, Bytes) {
        let request = Request::builder().method(method).uri(uri).body(()).unwrap();
        let response = self.gateway.handle(request).await;
        let (parts, body) = response.into_parts();
        let body = body.collect().await.unwrap().to_bytes();
        (parts.status, parts.headers, body)
    }
}

const LEFT_PAD_JS: &[u8] = b"function leftPad(str, len, ch) {\n  return str;\n}\n";

async fn left_pad() -> Registry {
    let registry = Registry::start().await;
    registry
        .publish(
            "left-pad",
            "1.3.0",
            &["1.2.0", "1.3.0"],
            json!({ "main": "index.js" }),
            &[
                ("package.json", br#"{"name":"left-pad","version":"1.3.0"}"#),
                ("index.js", LEFT_PAD_JS),
                ("perf/perf-test.js", b"bench();"),
                ("README.md", b"# left-pad\n"),
            ],
        )
        .await;
    registry
}

#[tokio::test]
async fn test_welcome_page() {
    let registry = Registry::start().await;
    let (status, headers, body) = registry.get("/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[CONTENT_TYPE], "text/html");
    assert_eq!(body, "<h1>Welcome to pluck</h1>");
}

#[tokio::test]
async fn test_entry_point_of_latest() {
    let registry = left_pad().await;
    let (status, headers, body) = registry.get("/left-pad").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[CONTENT_TYPE], "application/javascript; charset=utf-8");
    assert_eq!(headers[CACHE_CONTROL], "public, max-age=86400");
    assert_eq!(body, LEFT_PAD_JS);
}

#[tokio::test]
async fn test_npm_prefix_and_exact_version() {
    let registry = left_pad().await;
    let (status, _, body) = registry.get("/npm/left-pad@1.2.0/index.js").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, LEFT_PAD_JS);
}

#[tokio::test]
async fn test_range_and_sub_path() {
    let registry = Registry::start().await;
    registry
        .publish(
            "lodash",
            "4.17.21",
            &["3.10.1", "4.17.20", "4.17.21"],
            json!({ "main": "lodash.js" }),
            &[
                ("package.json", br#"{"name":"lodash","version":"4.17.21"}"#),
                ("lodash.js", b"var _ = {};"),
            ],
        )
        .await;

    let (status, headers, body) = registry.get("/lodash@%5E4.0.0/package.json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[CONTENT_TYPE], "application/json; charset=utf-8");
    assert_eq!(body, r#"{"name":"lodash","version":"4.17.21"}"#);
}

#[tokio::test]
async fn test_missing_sub_path_is_404() {
    let registry = left_pad().await;
    let (status, headers, body) = registry.get("/left-pad@1.3.0/nope.js").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(headers[CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(body, "404 ArchiveEntryNotFound");
}

#[tokio::test]
async fn test_unknown_version_is_404() {
    let registry = left_pad().await;
    let (status, _, body) = registry.get("/left-pad@%5E2.0.0").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "404 VersionNotFound");
}

#[tokio::test]
async fn test_malformed_path_is_404() {
    let registry = Registry::start().await;
    let (status, _, body) = registry.get("/@scope-only").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "404 InvalidRequestPath");
}

#[tokio::test]
async fn test_listing() {
    let registry = left_pad().await;
    let (status, headers, body) = registry.get("/left-pad@1.3.0/").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[CONTENT_TYPE], "text/html;charset=utf-8");
    assert_eq!(headers[CACHE_CONTROL], "public, max-age=86400");

    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("<h1>left-pad@1.3.0</h1>"));
    assert!(html.contains(
        "<li><a href=\"package.json\">package.json</a></li>\n\
         <li><a href=\"index.js\">index.js</a></li>\n\
         <li><a href=\"README.md\">README.md</a></li>"
    ));
    assert!(!html.contains("perf-test.js"));
}

#[tokio::test]
async fn test_scoped_package_with_jsdelivr_entry() {
    let registry = Registry::start().await;
    registry
        .publish(
            "@scope/widget",
            "2.0.0",
            &["2.0.0"],
            json!({ "main": "index.js", "jsdelivr": "./dist/widget.min.js" }),
            &[
                ("index.js", b"const unused = 1;"),
                ("dist/widget.min.js", b"// widget\n!function(){}();"),
            ],
        )
        .await;

    let (status, headers, body) = registry.get("/@scope/widget").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[CONTENT_TYPE], "application/javascript; charset=utf-8");
    assert_eq!(body, "// widget\n!function(){}();");
}

#[tokio::test]
async fn test_no_entry_point_is_404() {
    let registry = Registry::start().await;
    registry
        .publish("bare", "1.0.0", &["1.0.0"], json!({}), &[("index.js", b"x")])
        .await;

    let (status, _, body) = registry.get("/bare").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "404 EntryPointNotFound");
}

#[tokio::test]
async fn test_registry_failure_is_504() {
    let registry = Registry::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&registry.server)
        .await;

    let (status, headers, body) = registry.get("/left-pad").await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(headers[CONTENT_TYPE], "text/plain; charset=utf-8");
    assert_eq!(body, "504 UpstreamUnavailable");
}

#[tokio::test]
async fn test_slow_registry_is_504() {
    let registry = Registry::with_timeout(Duration::from_secs(1)).await;
    Mock::given(method("GET"))
        .and(path("/left-pad"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "dist-tags": { "latest": "1.3.0" }, "versions": {} }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&registry.server)
        .await;

    let (status, _, body) = registry.get("/left-pad").await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body, "504 UpstreamUnavailable");
}

#[tokio::test]
async fn test_oversized_range_component_is_404() {
    let registry = left_pad().await;
    let (status, _, body) = registry.get("/left-pad@%5E18446744073709551615").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "404 VersionNotFound");
}

#[tokio::test]
async fn test_manifest_without_tarball_is_500() {
    let registry = Registry::start().await;
    Mock::given(method("GET"))
        .and(path("/ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "dist-tags": { "latest": "1.0.0" },
            "versions": { "1.0.0": {} }
        })))
        .mount(&registry.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/ghost/1.0.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "ghost" })))
        .mount(&registry.server)
        .await;

    let (status, _, body) = registry.get("/ghost").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, "500 MalformedRegistryData");
}

#[tokio::test]
async fn test_head_has_headers_but_no_body() {
    let registry = left_pad().await;
    let (status, headers, body) = registry.send(Method::HEAD, "/left-pad").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[CONTENT_TYPE], "application/javascript; charset=utf-8");
    assert_eq!(headers[CONTENT_LENGTH], LEFT_PAD_JS.len().to_string());
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_other_methods_are_rejected() {
    let registry = Registry::start().await;
    let (status, _, _) = registry.send(Method::DELETE, "/left-pad").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}
