//! Reference-resolution toolkit for Cluster API style controllers
//!
//! This crate answers the three questions a declarative reconciliation
//! controller asks over and over:
//!
//! - does an object already carry an ownership relationship with a given
//!   kind/group ([`ownership`])?
//! - given a watched object's change, which higher-level objects must be
//!   re-reconciled ([`mapper`])?
//! - how do I rewrite a container image's tag or repository without
//!   producing an unpullable reference ([`reference`])?
//!
//! It owns no reconcile loops, no watch machinery, and no transport. The
//! only external capability it consumes is an object store ([`store`]),
//! abstracted behind a trait so controllers can wire in a real
//! `kube::Client` and tests can wire in fakes.

#![deny(missing_docs)]

pub mod crd;
pub mod error;
pub mod mapper;
pub mod ordinal;
pub mod ownership;
pub mod reference;
pub mod scheme;
pub mod store;
pub mod version;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// API group of the cluster hierarchy types this toolkit resolves
pub const GROUP: &str = "cluster.x-k8s.io";

/// API version the crate's CRD types are served at
pub const VERSION: &str = "v1beta1";

/// Full apiVersion string for the crate's CRD types
pub const API_VERSION: &str = "cluster.x-k8s.io/v1beta1";

/// Grouping label: set on Machines, MachineDeployments and other dependent
/// objects, with the owning Cluster's name as its value. Used for
/// label-selector fan-out where no direct back-reference exists.
pub const CLUSTER_NAME_LABEL: &str = "cluster.x-k8s.io/cluster-name";
