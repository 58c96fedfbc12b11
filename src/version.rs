//! Loose semver parsing for Kubernetes version tags
//!
//! Container tags in the wild are almost-but-not-quite semver: the tag
//! grammar forbids "+", so build metadata shows up behind "_" instead
//! ("v1.2.16_foo-1"). This parser extracts the numeric triple and discards
//! everything after it.

use std::fmt;

use crate::{Error, Result};

/// A parsed (major, minor, patch) triple
///
/// Pre-release and build metadata are discarded at parse time and not
/// modeled. Ordering is plain numeric field order, which is what upgrade
/// logic wants once metadata is gone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Major version number
    pub major: u64,
    /// Minor version number
    pub minor: u64,
    /// Patch version number
    pub patch: u64,
}

impl Version {
    /// Create a version from its three components
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Parse a loosely-semver-compliant tag into its numeric triple.
///
/// A single leading "v" is stripped. The string must open with three
/// dot-separated numeric components; whatever follows the patch number
/// (semver pre-release/build metadata, OCI-style "_N" suffixes) is
/// ignored. Fewer than three numeric components is an error:
///
/// ```
/// use capi_utils::version::{parse_major_minor_patch, Version};
///
/// assert_eq!(
///     parse_major_minor_patch("v1.2.16_foo-1").unwrap(),
///     Version::new(1, 2, 16)
/// );
/// assert!(parse_major_minor_patch("v1.16+foobar-0").is_err());
/// ```
pub fn parse_major_minor_patch(tag: &str) -> Result<Version> {
    let trimmed = tag.strip_prefix('v').unwrap_or(tag);
    let bytes = trimmed.as_bytes();

    let mut parts = [0u64; 3];
    let mut pos = 0;
    for (index, part) in parts.iter_mut().enumerate() {
        let start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
        if pos == start {
            return Err(Error::invalid_version(
                tag,
                format!("missing {} component", ["major", "minor", "patch"][index]),
            ));
        }
        *part = trimmed[start..pos]
            .parse()
            .map_err(|_| Error::invalid_version(tag, "numeric component out of range"))?;

        if index < 2 {
            if pos < bytes.len() && bytes[pos] == b'.' {
                pos += 1;
            } else {
                return Err(Error::invalid_version(
                    tag,
                    format!("missing {} component", ["minor", "patch"][index]),
                ));
            }
        }
    }

    Ok(Version::new(parts[0], parts[1], parts[2]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_an_oci_compliant_string() {
        assert_eq!(
            parse_major_minor_patch("v1.2.16_foo-1").unwrap(),
            Version::new(1, 2, 16)
        );
    }

    #[test]
    fn parses_a_valid_semver() {
        assert_eq!(
            parse_major_minor_patch("v1.16.6+foobar-0").unwrap(),
            Version::new(1, 16, 6)
        );
    }

    #[test]
    fn parses_without_v_prefix_or_metadata() {
        assert_eq!(
            parse_major_minor_patch("1.17.3").unwrap(),
            Version::new(1, 17, 3)
        );
    }

    #[test]
    fn errors_if_there_is_no_patch_version() {
        assert!(parse_major_minor_patch("v1.16+foobar-0").is_err());
    }

    #[test]
    fn errors_if_there_is_no_minor_and_patch() {
        assert!(parse_major_minor_patch("v1+foobar-0").is_err());
    }

    #[test]
    fn errors_on_empty_and_non_numeric_input() {
        assert!(parse_major_minor_patch("").is_err());
        assert!(parse_major_minor_patch("v").is_err());
        assert!(parse_major_minor_patch("latest").is_err());
        assert!(parse_major_minor_patch("v1..3").is_err());
    }

    #[test]
    fn trailing_remainder_is_discarded_not_validated() {
        // "1.2.3.4" is not semver, but three numeric components are present
        assert_eq!(
            parse_major_minor_patch("1.2.3.4").unwrap(),
            Version::new(1, 2, 3)
        );
    }

    #[test]
    fn versions_order_numerically() {
        assert!(Version::new(1, 9, 0) < Version::new(1, 10, 0));
        assert!(Version::new(2, 0, 0) > Version::new(1, 99, 99));
    }
}
