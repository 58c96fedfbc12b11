//! Ownership-reference queries and typed owner resolution
//!
//! Ownership references are plain value records; identity checks are free
//! functions over the reference list, not methods on the objects. Getting
//! this wrong orphans or duplicates control loops, so the rules are
//! deliberately narrow:
//!
//! - [`has_owner`] and the resolvers match on kind plus apiVersion *group*
//!   only. The version component is ignored on purpose: during a rolling
//!   API upgrade the same logical owner exists under two versions at once,
//!   and a version-exact check would silently stop resolving it.
//! - [`points_to`] is purely UID-based; kind and name are never consulted.
//! - [`ensure_owner_ref`] upserts keyed by `(kind, name)` so an owner's
//!   apiVersion migration refreshes the stored entry instead of appending
//!   a duplicate.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use tracing::debug;

use crate::crd::{Cluster, Machine};
use crate::store::ObjectStore;
use crate::{Result, CLUSTER_NAME_LABEL, GROUP};

/// Split an apiVersion into its (group, version) components.
///
/// Core-group apiVersions ("v1") have an empty group:
///
/// ```
/// use capi_utils::ownership::parse_api_version;
///
/// assert_eq!(parse_api_version("cluster.x-k8s.io/v1beta1"), ("cluster.x-k8s.io", "v1beta1"));
/// assert_eq!(parse_api_version("v1"), ("", "v1"));
/// ```
pub fn parse_api_version(api_version: &str) -> (&str, &str) {
    match api_version.split_once('/') {
        Some((group, version)) => (group, version),
        None => ("", api_version),
    }
}

/// True iff some reference in `refs` has a kind in `kinds` and an
/// apiVersion whose group component matches `api_version`'s group.
///
/// The version component is ignored (group/version skew tolerance).
/// An empty reference list never matches.
pub fn has_owner(refs: &[OwnerReference], api_version: &str, kinds: &[&str]) -> bool {
    let (group, _) = parse_api_version(api_version);
    refs.iter().any(|r| {
        let (ref_group, _) = parse_api_version(&r.api_version);
        ref_group == group && kinds.contains(&r.kind.as_str())
    })
}

/// True iff some reference's UID equals `target`'s UID.
///
/// Purely identity-based; a target without a UID matches nothing.
pub fn points_to(refs: &[OwnerReference], target: &ObjectMeta) -> bool {
    let Some(uid) = target.uid.as_deref() else {
        return false;
    };
    refs.iter().any(|r| r.uid == uid)
}

/// Idempotent owner-reference upsert keyed by `(kind, name)`.
///
/// An existing entry with the same kind and name is replaced in place,
/// preserving its position, so a changed apiVersion or UID on the same
/// logical owner updates the stored entry. Otherwise the reference is
/// appended. The result never holds two entries with the same
/// `(kind, name)`.
pub fn ensure_owner_ref(mut refs: Vec<OwnerReference>, new_ref: OwnerReference) -> Vec<OwnerReference> {
    match refs
        .iter_mut()
        .find(|r| r.kind == new_ref.kind && r.name == new_ref.name)
    {
        Some(existing) => *existing = new_ref,
        None => refs.push(new_ref),
    }
    refs
}

/// Resolve the owning Cluster of the object described by `meta`, if any.
///
/// Returns `Ok(None)` when no Cluster-kind owner reference is present;
/// "no owner of this kind" is a normal outcome. A store failure, including
/// NotFound on a reference that exists (a dangling reference), is an
/// error.
pub async fn get_owner_cluster(
    store: &dyn ObjectStore,
    meta: &ObjectMeta,
) -> Result<Option<Cluster>> {
    match find_owner(meta, "Cluster") {
        Some(reference) => {
            let namespace = meta.namespace.as_deref().unwrap_or_default();
            debug!(namespace, owner = %reference.name, "resolving owner cluster");
            store.get_cluster(namespace, &reference.name).await.map(Some)
        }
        None => Ok(None),
    }
}

/// Resolve the owning Machine of the object described by `meta`, if any.
///
/// Same contract as [`get_owner_cluster`].
pub async fn get_owner_machine(
    store: &dyn ObjectStore,
    meta: &ObjectMeta,
) -> Result<Option<Machine>> {
    match find_owner(meta, "Machine") {
        Some(reference) => {
            let namespace = meta.namespace.as_deref().unwrap_or_default();
            debug!(namespace, owner = %reference.name, "resolving owner machine");
            store.get_machine(namespace, &reference.name).await.map(Some)
        }
        None => Ok(None),
    }
}

/// List the Machines belonging to `cluster`: same namespace AND grouping
/// label equal to the cluster's name. A same-named cluster elsewhere, or a
/// neighbor machine labeled for a different cluster, never appears.
pub async fn get_machines_for_cluster(
    store: &dyn ObjectStore,
    cluster: &Cluster,
) -> Result<Vec<Machine>> {
    let name = cluster.metadata.name.as_deref().unwrap_or_default();
    let namespace = cluster.metadata.namespace.as_deref().unwrap_or_default();
    let selector = format!("{}={}", CLUSTER_NAME_LABEL, name);
    store.list_machines(namespace, &selector).await
}

/// First owner reference on `meta` with the given kind and our API group.
fn find_owner<'a>(meta: &'a ObjectMeta, kind: &str) -> Option<&'a OwnerReference> {
    meta.owner_references.iter().flatten().find(|r| {
        let (group, _) = parse_api_version(&r.api_version);
        r.kind == kind && group == GROUP
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fake::{not_found, FakeStore};
    use crate::store::MockObjectStore;
    use crate::API_VERSION;
    use std::collections::BTreeMap;

    fn owner_ref(api_version: &str, kind: &str, name: &str, uid: &str) -> OwnerReference {
        OwnerReference {
            api_version: api_version.to_string(),
            kind: kind.to_string(),
            name: name.to_string(),
            uid: uid.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn has_owner_cases() {
        let kinds = ["MachineDeployment", "Cluster"];

        // no ownership
        assert!(!has_owner(&[], API_VERSION, &kinds));

        // owned by cluster
        let refs = vec![owner_ref(API_VERSION, "Cluster", "c", "")];
        assert!(has_owner(&refs, API_VERSION, &kinds));

        // owned by something else
        let refs = vec![
            owner_ref("v1", "Pod", "p", ""),
            owner_ref("apps/v1", "Deployment", "d", ""),
        ];
        assert!(!has_owner(&refs, API_VERSION, &kinds));

        // owned by a deployment
        let refs = vec![owner_ref(API_VERSION, "MachineDeployment", "md", "")];
        assert!(has_owner(&refs, API_VERSION, &kinds));

        // right kind, wrong group
        let refs = vec![owner_ref("wrong/v2", "MachineDeployment", "md", "")];
        assert!(!has_owner(&refs, API_VERSION, &kinds));

        // right group, wrong kind
        let refs = vec![owner_ref(API_VERSION, "Machine", "m", "")];
        assert!(!has_owner(&refs, API_VERSION, &kinds));
    }

    #[test]
    fn has_owner_ignores_version_skew() {
        let refs = vec![owner_ref("cluster.x-k8s.io/v1alpha3", "Cluster", "c", "")];
        assert!(has_owner(&refs, "cluster.x-k8s.io/v1beta1", &["Cluster"]));
    }

    #[test]
    fn points_to_matches_on_uid_only() {
        let target_uid = "fri3ndsh1p";
        let target = ObjectMeta {
            uid: Some(target_uid.to_string()),
            ..Default::default()
        };

        let refs_for = |uids: &[&str]| -> Vec<OwnerReference> {
            uids.iter().map(|u| owner_ref("", "", "", u)).collect()
        };

        assert!(!points_to(&refs_for(&[]), &target));
        assert!(!points_to(&refs_for(&["m4g1c"]), &target));
        assert!(points_to(&refs_for(&[target_uid]), &target));
        assert!(!points_to(&refs_for(&["m4g1c", "h4rm0ny"]), &target));
        assert!(points_to(&refs_for(&["m4g1c", target_uid]), &target));
    }

    #[test]
    fn points_to_without_target_uid_matches_nothing() {
        let target = ObjectMeta::default();
        let refs = vec![owner_ref("", "", "", "")];
        assert!(!points_to(&refs, &target));
    }

    #[test]
    fn ensure_owner_ref_sets_on_empty_list() {
        let reference = owner_ref(API_VERSION, "Cluster", "test-cluster", "");
        let refs = ensure_owner_ref(Vec::new(), reference.clone());
        assert_eq!(refs, vec![reference]);
    }

    #[test]
    fn ensure_owner_ref_does_not_duplicate() {
        let reference = owner_ref(API_VERSION, "Cluster", "test-cluster", "");
        let refs = ensure_owner_ref(vec![reference.clone()], reference.clone());
        assert_eq!(refs.len(), 1);
        assert!(refs.contains(&reference));
    }

    #[test]
    fn ensure_owner_ref_updates_api_version_in_place() {
        let old = owner_ref("cluster.x-k8s.io/v1alpha2", "Cluster", "test-cluster", "");
        let new = owner_ref(API_VERSION, "Cluster", "test-cluster", "");
        let other = owner_ref("apps/v1", "Deployment", "d", "");

        let refs = ensure_owner_ref(vec![old, other.clone()], new.clone());
        assert_eq!(refs.len(), 2);
        // replaced in place, position preserved
        assert_eq!(refs[0], new);
        assert_eq!(refs[1], other);
    }

    fn meta_owned_by(kind: &str, name: &str, namespace: &str) -> ObjectMeta {
        ObjectMeta {
            name: Some("owned-resource".to_string()),
            namespace: Some(namespace.to_string()),
            owner_references: Some(vec![owner_ref(API_VERSION, kind, name, "")]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn get_owner_cluster_success_by_name() {
        let store = FakeStore::new().with_cluster("my-ns", "my-cluster");
        let meta = meta_owned_by("Cluster", "my-cluster", "my-ns");

        let cluster = get_owner_cluster(&store, &meta).await.unwrap();
        assert_eq!(
            cluster.unwrap().metadata.name.as_deref(),
            Some("my-cluster")
        );
    }

    #[tokio::test]
    async fn get_owner_machine_success_by_name() {
        let store = FakeStore::new().with_machine("my-ns", "my-machine", None);
        let meta = meta_owned_by("Machine", "my-machine", "my-ns");

        let machine = get_owner_machine(&store, &meta).await.unwrap();
        assert_eq!(
            machine.unwrap().metadata.name.as_deref(),
            Some("my-machine")
        );
    }

    #[tokio::test]
    async fn get_owner_cluster_returns_none_without_matching_ref() {
        let store = FakeStore::new();

        // no references at all
        let meta = ObjectMeta {
            namespace: Some("my-ns".to_string()),
            ..Default::default()
        };
        assert!(get_owner_cluster(&store, &meta).await.unwrap().is_none());

        // references of other kinds or groups only
        let meta = ObjectMeta {
            namespace: Some("my-ns".to_string()),
            owner_references: Some(vec![
                owner_ref("apps/v1", "Deployment", "d", ""),
                owner_ref("wrong.group/v1beta1", "Cluster", "impostor", ""),
            ]),
            ..Default::default()
        };
        assert!(get_owner_cluster(&store, &meta).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_owner_cluster_surfaces_dangling_reference() {
        // the reference exists, the object behind it does not
        let store = FakeStore::new();
        let meta = meta_owned_by("Cluster", "gone", "my-ns");

        let err = get_owner_cluster(&store, &meta).await.unwrap_err();
        assert!(matches!(err, crate::Error::Kube { .. }));
    }

    #[tokio::test]
    async fn get_owner_cluster_queries_the_owned_objects_namespace() {
        let mut store = MockObjectStore::new();
        store
            .expect_get_cluster()
            .withf(|namespace, name| namespace == "my-ns" && name == "my-cluster")
            .once()
            .returning(|_, _| Err(not_found("clusters", "my-cluster")));

        let meta = meta_owned_by("Cluster", "my-cluster", "my-ns");
        let result = get_owner_cluster(&store, &meta).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn get_machines_for_cluster_filters_on_namespace_and_label() {
        let labels = |cluster: &str| -> BTreeMap<String, String> {
            BTreeMap::from([(CLUSTER_NAME_LABEL.to_string(), cluster.to_string())])
        };

        let store = FakeStore::new()
            .with_machine("my-ns", "my-machine", Some(labels("my-cluster")))
            .with_machine("my-ns", "other-machine", Some(labels("other-cluster")))
            .with_machine("other-ns", "far-machine", Some(labels("my-cluster")))
            .with_machine("my-ns", "unlabeled-machine", None);

        let mut cluster = Cluster::new("my-cluster", crate::crd::ClusterSpec::default());
        cluster.metadata.namespace = Some("my-ns".to_string());

        let machines = get_machines_for_cluster(&store, &cluster).await.unwrap();
        assert_eq!(machines.len(), 1);
        assert_eq!(machines[0].metadata.name.as_deref(), Some("my-machine"));
    }
}
