//! Version matrix expansion.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};

use crate::core::types::VersionIdentifier;

/// Numeric range template for library version directories.
///
/// The default expands to `gdata-2.0.1` through `gdata-2.0.17`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct VersionRange {
    pub prefix: String,
    pub first: u32,
    pub last: u32,
}

impl Default for VersionRange {
    fn default() -> Self {
        Self {
            prefix: "gdata-2.0.".to_string(),
            first: 1,
            last: 17,
        }
    }
}

impl VersionRange {
    pub fn validate(&self) -> Result<()> {
        if self.prefix.trim().is_empty() {
            bail!("versions.prefix must be non-empty");
        }
        if self.prefix.contains('/') || self.prefix.contains('\\') {
            bail!("versions.prefix must not contain path separators");
        }
        if self.first == 0 {
            bail!("versions.first must be > 0");
        }
        if self.first > self.last {
            bail!(
                "versions.first ({}) must be <= versions.last ({})",
                self.first,
                self.last
            );
        }
        Ok(())
    }

    /// Identifiers in ascending numeric order. Each call starts a fresh pass.
    pub fn iter(&self) -> impl Iterator<Item = VersionIdentifier> + '_ {
        (self.first..=self.last).map(|number| VersionIdentifier::new(&self.prefix, number))
    }

    pub fn len(&self) -> usize {
        if self.first > self.last {
            0
        } else {
            (self.last - self.first + 1) as usize
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_range_has_seventeen_versions_in_order() {
        let range = VersionRange::default();
        let versions: Vec<String> = range.iter().map(|v| v.to_string()).collect();
        assert_eq!(versions.len(), 17);
        assert_eq!(range.len(), 17);
        assert_eq!(versions[0], "gdata-2.0.1");
        assert_eq!(versions[9], "gdata-2.0.10");
        assert_eq!(versions[16], "gdata-2.0.17");
    }

    #[test]
    fn iteration_is_restartable() {
        let range = VersionRange::default();
        let first: Vec<_> = range.iter().collect();
        let second: Vec<_> = range.iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_inverted_range() {
        let range = VersionRange {
            first: 5,
            last: 4,
            ..VersionRange::default()
        };
        let err = range.validate().expect_err("inverted");
        assert!(err.to_string().contains("versions.first"));
        assert!(range.is_empty());
    }

    #[test]
    fn rejects_zero_first() {
        let range = VersionRange {
            first: 0,
            ..VersionRange::default()
        };
        assert!(range.validate().is_err());
    }
}
