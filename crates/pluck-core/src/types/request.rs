//! Incoming gateway request parsing.
//!
//! Maps a request path such as `/@scope/name@^1.2/dist/index.js` onto the
//! package name, version specifier and in-archive sub-path it names.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PluckError, PluckResult};

/// Specifier used when the request names no version
pub const DEFAULT_SPECIFIER: &str = "latest";

static REQUEST_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/(?:npm/)?((?:@[^/]+/)?[^/@]+)(?:@([^/]+))?(/.*)?$")
        .expect("request path pattern is valid")
});

/// One parsed gateway request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    /// Package name, including any `@scope/` prefix
    pub package_name: String,
    /// Exact version, range or dist-tag
    pub version_specifier: String,
    /// Percent-decoded sub-path; `None` when the path ends at the package
    pub sub_path: Option<String>,
}

/// What the request asks for once the package is resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestMode<'a> {
    /// No sub-path: serve the manifest's default entry point
    EntryPoint,
    /// `/` sub-path: list the package's top-level files
    Listing,
    /// Any other sub-path: serve that file
    File(&'a str),
}

impl PackageRequest {
    /// Parse a request path (without query string)
    pub fn parse(path: &str) -> PluckResult<Self> {
        let invalid = || PluckError::InvalidRequestPath {
            path: path.to_string(),
        };

        let captures = REQUEST_PATH.captures(path).ok_or_else(invalid)?;

        let package_name = captures
            .get(1)
            .map(|m| m.as_str().to_string())
            .ok_or_else(invalid)?;

        let version_specifier = match captures.get(2) {
            Some(spec) => urlencoding::decode(spec.as_str())
                .map_err(|_| invalid())?
                .into_owned(),
            None => DEFAULT_SPECIFIER.to_string(),
        };

        let sub_path = match captures.get(3) {
            Some(sub) => Some(
                urlencoding::decode(sub.as_str())
                    .map_err(|_| invalid())?
                    .into_owned(),
            ),
            None => None,
        };

        Ok(Self {
            package_name,
            version_specifier,
            sub_path,
        })
    }

    /// Decide which of the three serving modes applies
    pub fn mode(&self) -> RequestMode<'_> {
        match self.sub_path.as_deref() {
            None => RequestMode::EntryPoint,
            Some("") | Some("/") => RequestMode::Listing,
            Some(path) => RequestMode::File(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_package() {
        let req = PackageRequest::parse("/left-pad").unwrap();
        assert_eq!(req.package_name, "left-pad");
        assert_eq!(req.version_specifier, "latest");
        assert_eq!(req.sub_path, None);
        assert_eq!(req.mode(), RequestMode::EntryPoint);
    }

    #[test]
    fn test_versioned_file() {
        let req = PackageRequest::parse("/lodash@^4.0.0/package.json").unwrap();
        assert_eq!(req.package_name, "lodash");
        assert_eq!(req.version_specifier, "^4.0.0");
        assert_eq!(req.mode(), RequestMode::File("/package.json"));
    }

    #[test]
    fn test_scoped_package_listing() {
        let req = PackageRequest::parse("/@types/node@20/").unwrap();
        assert_eq!(req.package_name, "@types/node");
        assert_eq!(req.version_specifier, "20");
        assert_eq!(req.mode(), RequestMode::Listing);
    }

    #[test]
    fn test_npm_prefix_and_encoding() {
        let req = PackageRequest::parse("/npm/jquery@%3E%3D3.0.0/dist/jquery%20min.js").unwrap();
        assert_eq!(req.package_name, "jquery");
        assert_eq!(req.version_specifier, ">=3.0.0");
        assert_eq!(req.sub_path.as_deref(), Some("/dist/jquery min.js"));
    }

    #[test]
    fn test_invalid_paths() {
        assert!(matches!(
            PackageRequest::parse("//"),
            Err(PluckError::InvalidRequestPath { .. })
        ));
        assert!(PackageRequest::parse("no-leading-slash").is_err());
        assert!(PackageRequest::parse("/@scope-only").is_err());
    }
}
