//! Watch-event fan-out mapping
//!
//! A changed object is turned into zero or more reconcile requests for
//! the objects that depend on it, either by following a direct reference
//! field backwards (machine → its infrastructure object) or by listing
//! siblings carrying the grouping label (cluster → its machines or
//! deployments). Mappers are side-effect-free, safe to call concurrently
//! from many watch workers, and return empty rather than failing on
//! malformed input: the watch framework they plug into offers no error
//! channel.

use std::sync::Arc;

use k8s_openapi::api::core::v1::ObjectReference;
use kube::api::GroupVersionKind;
use kube::discovery::ApiResource;
use tracing::warn;

use crate::crd::{Cluster, Machine};
use crate::scheme::Scheme;
use crate::store::ObjectStore;
use crate::{Error, Result, CLUSTER_NAME_LABEL};

/// Identifier instructing the surrounding control loop to re-evaluate one
/// object's desired-vs-actual state
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ReconcileRequest {
    /// Namespace of the object to re-reconcile, absent for cluster-scoped
    /// objects
    pub namespace: Option<String>,
    /// Name of the object to re-reconcile
    pub name: String,
}

/// Reverse-map a changed Machine to its infrastructure object.
///
/// The configured GVK must match the machine's infrastructure reference
/// exactly, group, version and kind alike. Unlike ownership checks this
/// comparison is not skew-tolerant: a reference to a same-kind type in a
/// different group or version yields no request.
pub fn machine_to_infrastructure_map_func(
    gvk: GroupVersionKind,
) -> impl Fn(&Machine) -> Vec<ReconcileRequest> {
    let api_version = gvk.api_version();
    move |machine| {
        requests_for_reference(
            Some(&machine.spec.infrastructure_ref),
            &api_version,
            &gvk.kind,
            machine.metadata.namespace.clone(),
        )
    }
}

/// Reverse-map a changed Cluster to its infrastructure object.
///
/// Same exact-match contract as [`machine_to_infrastructure_map_func`];
/// a cluster without an infrastructure reference maps to nothing.
pub fn cluster_to_infrastructure_map_func(
    gvk: GroupVersionKind,
) -> impl Fn(&Cluster) -> Vec<ReconcileRequest> {
    let api_version = gvk.api_version();
    move |cluster| {
        requests_for_reference(
            cluster.spec.infrastructure_ref.as_ref(),
            &api_version,
            &gvk.kind,
            cluster.metadata.namespace.clone(),
        )
    }
}

fn requests_for_reference(
    reference: Option<&ObjectReference>,
    api_version: &str,
    kind: &str,
    namespace: Option<String>,
) -> Vec<ReconcileRequest> {
    let Some(reference) = reference else {
        return Vec::new();
    };
    if reference.api_version.as_deref() != Some(api_version)
        || reference.kind.as_deref() != Some(kind)
    {
        return Vec::new();
    }
    let Some(name) = reference.name.clone() else {
        return Vec::new();
    };
    // namespace is inherited from the referencing object
    vec![ReconcileRequest { namespace, name }]
}

/// Label fan-out from a changed Cluster to every object of a configured
/// type carrying the cluster's grouping label.
///
/// The listing `ApiResource` is resolved from the supplied [`Scheme`]
/// once, at construction; construction fails if the target type is not
/// registered. `map` then performs one store list per event, across all
/// namespaces, and emits requests in listing order.
pub struct ClusterToObjectsMapper {
    store: Arc<dyn ObjectStore>,
    resource: ApiResource,
}

impl ClusterToObjectsMapper {
    /// Build a mapper fanning out to objects of the given GVK
    pub fn new(store: Arc<dyn ObjectStore>, gvk: &GroupVersionKind, scheme: &Scheme) -> Result<Self> {
        let resource = scheme.resolve(gvk).cloned().ok_or_else(|| Error::KindNotRegistered {
            api_version: gvk.api_version(),
            kind: gvk.kind.clone(),
        })?;
        Ok(Self { store, resource })
    }

    /// Map a changed cluster to reconcile requests for every labeled
    /// object of the configured type.
    ///
    /// A store failure yields an empty result: the watch framework this
    /// plugs into has no error channel, and the next event retriggers the
    /// list anyway.
    pub async fn map(&self, cluster: &Cluster) -> Vec<ReconcileRequest> {
        let Some(name) = cluster.metadata.name.as_deref() else {
            return Vec::new();
        };
        let selector = format!("{}={}", CLUSTER_NAME_LABEL, name);
        match self.store.list(&self.resource, None, Some(selector)).await {
            Ok(objects) => objects
                .into_iter()
                .filter_map(|object| {
                    object.metadata.name.map(|name| ReconcileRequest {
                        namespace: object.metadata.namespace,
                        name,
                    })
                })
                .collect(),
            Err(error) => {
                warn!(
                    cluster = %name,
                    kind = %self.resource.kind,
                    %error,
                    "listing objects for cluster fan-out failed"
                );
                Vec::new()
            }
        }
    }
}
