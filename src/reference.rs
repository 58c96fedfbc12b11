//! Container image reference rewriting
//!
//! Upgrade and rollout logic needs to repoint an image at a new tag or a
//! mirror registry without producing an unpullable reference. Both
//! rewriters here round-trip through the canonical `repository[:tag]`
//! string form and validate against the distribution-reference grammar:
//! an optional registry host (detected by a dot, port or "localhost" in
//! the first path segment), lower-case slash-separated path components,
//! a constrained tag character set and a total name length ceiling.

use crate::{Error, Result};

/// Total length ceiling for a repository name (registry host included)
const NAME_TOTAL_LENGTH_MAX: usize = 255;

/// Maximum tag length after the separating colon
const TAG_MAX_LENGTH: usize = 128;

/// A parsed image reference, borrowed from the input string.
///
/// Never persisted as a structured value; constructed at rewrite time and
/// immediately re-rendered.
struct Reference<'a> {
    /// Repository name, registry host included when present
    name: &'a str,
    /// Registry host, when the name is canonical
    domain: Option<&'a str>,
    /// Tag, when the reference is pinned
    tag: Option<&'a str>,
}

/// Rewrite the tag of an image reference.
///
/// The new tag is sanitized by replacing "+" with "_" (the tag grammar
/// forbids "+", but semver build metadata shows up in version strings fed
/// to rollouts). Any existing tag is discarded.
///
/// ```
/// use capi_utils::reference::modify_image_tag;
///
/// assert_eq!(
///     modify_image_tag("example.com/image:1.17.3", "v1.17.4+build1").unwrap(),
///     "example.com/image:v1.17.4_build1"
/// );
/// ```
pub fn modify_image_tag(image: &str, new_tag: &str) -> Result<String> {
    let reference = parse(image)?;
    let tag = new_tag.replace('+', "_");
    if !is_valid_tag(&tag) {
        return Err(Error::InvalidTag { tag });
    }
    Ok(format!("{}:{}", reference.name, tag))
}

/// Rewrite the repository of an already-pinned image reference.
///
/// Only the final path segment (basename) of the original repository
/// survives; intermediate path segments are discarded:
///
/// ```
/// use capi_utils::reference::modify_image_repository;
///
/// assert_eq!(
///     modify_image_repository("example.com/subpaths/are/okay/image:1.17.3", "example.com/new")
///         .unwrap(),
///     "example.com/new/image:1.17.3"
/// );
/// ```
///
/// Fails when `image` is untagged (this rewriter repoints pinned
/// references, never widens scope to a floating one), when its repository
/// is not registry-qualified, or when the rewritten name violates the
/// repository grammar or its length ceiling.
pub fn modify_image_repository(image: &str, new_repository: &str) -> Result<String> {
    let reference = parse(image)?;
    if reference.domain.is_none() {
        return Err(Error::NameNotCanonical {
            name: reference.name.to_string(),
        });
    }
    let Some(tag) = reference.tag else {
        return Err(Error::ImageNotTagged {
            image: image.to_string(),
        });
    };

    // rsplit on a non-empty validated name always yields a segment
    let basename = reference.name.rsplit('/').next().unwrap_or(reference.name);
    let renamed = format!("{}/{}", new_repository, basename);
    if renamed.len() > NAME_TOTAL_LENGTH_MAX {
        return Err(Error::NameTooLong { name: renamed });
    }
    if !is_valid_repository(&renamed) {
        return Err(Error::invalid_image_name(renamed));
    }
    Ok(format!("{}:{}", renamed, tag))
}

/// Parse an image string into repository and optional tag, validating both
/// against the grammar.
fn parse(image: &str) -> Result<Reference<'_>> {
    let (name, tag) = split_tag(image);
    if let Some(tag) = tag {
        if !is_valid_tag(tag) {
            return Err(Error::invalid_image_name(image));
        }
    }
    if name.len() > NAME_TOTAL_LENGTH_MAX {
        return Err(Error::NameTooLong {
            name: name.to_string(),
        });
    }
    if name.is_empty() || !is_valid_repository(name) {
        return Err(Error::invalid_image_name(image));
    }
    let (domain, _) = split_domain(name);
    Ok(Reference { name, domain, tag })
}

/// Split `repository[:tag]`. A colon inside the registry host ("host:5000")
/// is not a tag separator: anything right of the candidate colon containing
/// a slash is still part of the name.
fn split_tag(image: &str) -> (&str, Option<&str>) {
    match image.rfind(':') {
        Some(i) if !image[i + 1..].contains('/') => (&image[..i], Some(&image[i + 1..])),
        _ => (image, None),
    }
}

/// Split off the registry host, when the first path segment looks like one.
fn split_domain(name: &str) -> (Option<&str>, &str) {
    match name.find('/') {
        Some(i) => {
            let first = &name[..i];
            let looks_like_host = first.contains('.')
                || first.contains(':')
                || first == "localhost"
                || first.chars().any(|c| c.is_ascii_uppercase());
            if looks_like_host {
                (Some(first), &name[i + 1..])
            } else {
                (None, name)
            }
        }
        None => (None, name),
    }
}

/// Validate a full repository name: optional registry host followed by one
/// or more path components.
fn is_valid_repository(name: &str) -> bool {
    let (domain, path) = split_domain(name);
    if let Some(domain) = domain {
        if !is_valid_domain(domain) {
            return false;
        }
    }
    !path.is_empty() && path.split('/').all(is_valid_path_component)
}

/// Registry host: dot-separated alphanumeric components ('-' allowed
/// inside), with an optional numeric ":port".
fn is_valid_domain(domain: &str) -> bool {
    let (host, port) = match domain.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (domain, None),
    };
    if let Some(port) = port {
        if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
    }
    !host.is_empty()
        && host.split('.').all(|component| {
            !component.is_empty()
                && component.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-')
                && !component.starts_with('-')
                && !component.ends_with('-')
        })
}

/// Path component: runs of lower-case alphanumerics joined by a single
/// '.', one or two '_', or one or more '-'. No leading or trailing
/// separator.
fn is_valid_path_component(component: &str) -> bool {
    let bytes = component.as_bytes();
    let is_alnum = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    let mut pos = 0;
    loop {
        let start = pos;
        while pos < bytes.len() && is_alnum(bytes[pos]) {
            pos += 1;
        }
        if pos == start {
            // empty component or separator not followed by an alnum run
            return false;
        }
        if pos == bytes.len() {
            return true;
        }
        match bytes[pos] {
            b'.' => pos += 1,
            b'_' => {
                pos += 1;
                if pos < bytes.len() && bytes[pos] == b'_' {
                    pos += 1;
                }
            }
            b'-' => {
                while pos < bytes.len() && bytes[pos] == b'-' {
                    pos += 1;
                }
            }
            _ => return false,
        }
    }
}

/// Tag: `[A-Za-z0-9_]` opener, then up to 127 of `[A-Za-z0-9._-]`.
fn is_valid_tag(tag: &str) -> bool {
    if tag.is_empty() || tag.len() > TAG_MAX_LENGTH {
        return false;
    }
    let bytes = tag.as_bytes();
    let first_ok = bytes[0].is_ascii_alphanumeric() || bytes[0] == b'_';
    first_ok
        && bytes[1..]
            .iter()
            .all(|&b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.' || b == b'-')
}
