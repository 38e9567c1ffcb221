//! Version selection against a package's published versions
//!
//! Pure functions over registry metadata: no I/O, so every rule of
//! specifier resolution is testable without a registry.

use std::collections::BTreeMap;
use std::str::FromStr;

use pluck_core::types::{Version, VersionReq};
use pluck_registry::PackageMetadataResponse;
use tracing::debug;

/// Published versions, parsed and ordered
#[derive(Debug, Clone)]
pub struct VersionSelector<'a> {
    /// Parsed version to the exact registry key it came from
    available_versions: BTreeMap<Version, &'a str>,
}

impl<'a> VersionSelector<'a> {
    /// Create a selector over registry version keys; keys that are not semver are skipped
    pub fn new<I>(versions: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let available_versions = versions
            .into_iter()
            .filter_map(|key| Version::from_str(key).ok().map(|parsed| (parsed, key)))
            .collect();
        Self { available_versions }
    }

    /// Select the highest version matching the requirement
    pub fn max_satisfying(&self, req: &VersionReq) -> Option<&'a str> {
        self.available_versions
            .iter()
            .rev() // Start with highest versions
            .find(|(version, _)| req.matches(version))
            .map(|(_, key)| *key)
    }

    /// Select the highest version matching a specifier string; unparsable specifiers match nothing
    pub fn max_satisfying_str(&self, specifier: &str) -> Option<&'a str> {
        let req = VersionReq::parse(specifier).ok()?;
        self.max_satisfying(&req)
    }

    /// Number of usable versions
    pub fn len(&self) -> usize {
        self.available_versions.len()
    }

    /// Whether no version parsed
    pub fn is_empty(&self) -> bool {
        self.available_versions.is_empty()
    }
}

/// Resolve a specifier against metadata: range first, then dist-tag re-resolved as a range
pub fn select_version<'a>(metadata: &'a PackageMetadataResponse, specifier: &str) -> Option<&'a str> {
    let selector = VersionSelector::new(metadata.version_keys());

    if let Some(version) = selector.max_satisfying_str(specifier) {
        debug!("'{}' matched {} as a range", specifier, version);
        return Some(version);
    }

    let tagged = metadata.tag(specifier)?;
    let version = selector.max_satisfying_str(tagged);
    debug!("dist-tag '{}' -> '{}' resolved to {:?}", specifier, tagged, version);
    version
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn exact_specifier_resolves_to_itself(
            versions in prop::collection::btree_set((0u64..5, 0u64..5, 0u64..5), 1..20),
            pick in any::<prop::sample::Index>(),
        ) {
            let keys: Vec<String> = versions
                .iter()
                .map(|(a, b, c)| format!("{}.{}.{}", a, b, c))
                .collect();
            let chosen = pick.get(&keys).clone();

            let selector = VersionSelector::new(keys.iter().map(String::as_str));
            prop_assert_eq!(selector.max_satisfying_str(&chosen), Some(chosen.as_str()));
        }

        #[test]
        fn range_result_is_maximum_match(
            versions in prop::collection::btree_set((0u64..4, 0u64..4, 0u64..4), 1..20),
            major in 0u64..4,
        ) {
            let keys: Vec<String> = versions
                .iter()
                .map(|(a, b, c)| format!("{}.{}.{}", a, b, c))
                .collect();
            let selector = VersionSelector::new(keys.iter().map(String::as_str));
            let req = VersionReq::parse(&format!("{}.x", major)).unwrap();

            let expected = versions
                .iter()
                .filter(|(a, _, _)| *a == major)
                .max()
                .map(|(a, b, c)| format!("{}.{}.{}", a, b, c));
            prop_assert_eq!(selector.max_satisfying(&req).map(str::to_string), expected);
        }
    }
}
