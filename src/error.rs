//! Error types for the reference-resolution toolkit
//!
//! Every error is returned to the immediate caller, never logged and
//! swallowed. "No match found" (no owner of a requested kind, no object
//! carrying a grouping label) is a valid empty result, not an error, and
//! is never represented here. Whether a returned error is worth retrying
//! is the surrounding reconciliation framework's decision.

use thiserror::Error;

/// Main error type for reference resolution operations
#[derive(Debug, Error)]
pub enum Error {
    /// A version tag could not be reduced to a (major, minor, patch) triple
    #[error("failed to parse version {input:?}: {message}")]
    InvalidVersion {
        /// The tag string as given by the caller
        input: String,
        /// Description of what's missing or malformed
        message: String,
    },

    /// An image string does not satisfy the distribution-reference grammar
    #[error("failed to parse image name {image:?}")]
    InvalidImageName {
        /// The offending image string
        image: String,
    },

    /// A tag violates the tag character set or length limit
    #[error("invalid tag {tag:?}")]
    InvalidTag {
        /// The offending tag
        tag: String,
    },

    /// Repository rewriting requires an already-pinned reference
    #[error("image must be tagged")]
    ImageNotTagged {
        /// The untagged image reference
        image: String,
    },

    /// Repository rewriting requires a registry-qualified source reference
    #[error("repository name must be canonical")]
    NameNotCanonical {
        /// The repository name missing a registry host
        name: String,
    },

    /// A repository name exceeds the grammar's total length ceiling
    #[error("repository name must not be more than 255 characters")]
    NameTooLong {
        /// The over-long repository name
        name: String,
    },

    /// Kubernetes API error from an object store lookup
    ///
    /// NotFound on a name taken from an existing owner reference lands
    /// here too: a dangling reference is a fatal inconsistency, surfaced
    /// rather than treated as "no owner".
    #[error("kubernetes error: {source}")]
    Kube {
        /// The underlying kube-rs error
        #[from]
        source: kube::Error,
    },

    /// A fan-out mapper was constructed for a kind the scheme doesn't know
    #[error("no kind {kind:?} is registered for version {api_version:?} in scheme")]
    KindNotRegistered {
        /// apiVersion the caller asked for
        api_version: String,
        /// Kind the caller asked for
        kind: String,
    },
}

impl Error {
    /// Create a version parse error
    pub fn invalid_version(input: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidVersion {
            input: input.into(),
            message: msg.into(),
        }
    }

    /// Create an image parse error
    pub fn invalid_image_name(image: impl Into<String>) -> Self {
        Self::InvalidImageName {
            image: image.into(),
        }
    }
}
