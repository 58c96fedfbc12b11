//! Cluster Custom Resource Definition
//!
//! The top-level object of the hierarchy. Machines and MachineDeployments
//! associate with a Cluster either through an owner reference or through
//! the `cluster.x-k8s.io/cluster-name` grouping label.

use k8s_openapi::api::core::v1::ObjectReference;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Specification for a Cluster
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "cluster.x-k8s.io",
    version = "v1beta1",
    kind = "Cluster",
    plural = "clusters",
    namespaced
)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    /// Forward pointer to the provider-specific infrastructure object
    /// backing this cluster. Namespace is inherited from the Cluster; this
    /// is not an ownership relation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub infrastructure_ref: Option<ObjectReference>,
}
