//! Object store abstraction
//!
//! Everything in this crate reads the cluster state through this trait,
//! never through a concrete client, so resolvers and mappers can be tested
//! against mocks and fakes while production wires in [`KubeStore`].
//!
//! Every read is a point-in-time snapshot with no ordering guarantee
//! relative to concurrent writers; callers must tolerate staleness. A
//! dropped/canceled request surfaces as a failed call, never a hang.

use async_trait::async_trait;
use kube::api::{Api, DynamicObject, ListParams};
use kube::discovery::ApiResource;
use kube::Client;
use tracing::trace;

#[cfg(test)]
use mockall::automock;

use crate::crd::{Cluster, Machine};
use crate::Result;

/// Read-only access to the typed object store
///
/// Errors distinguish NotFound from transient failure through the wrapped
/// `kube::Error`; "zero objects matched a list" is an empty Vec, not an
/// error.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch a Cluster by namespace and name
    async fn get_cluster(&self, namespace: &str, name: &str) -> Result<Cluster>;

    /// Fetch a Machine by namespace and name
    async fn get_machine(&self, namespace: &str, name: &str) -> Result<Machine>;

    /// List Machines in a namespace matching a label selector
    async fn list_machines(&self, namespace: &str, label_selector: &str) -> Result<Vec<Machine>>;

    /// List objects of an arbitrary resource type, optionally restricted
    /// to a namespace and a label selector
    async fn list(
        &self,
        resource: &ApiResource,
        namespace: Option<String>,
        label_selector: Option<String>,
    ) -> Result<Vec<DynamicObject>>;
}

/// Production [`ObjectStore`] backed by a `kube::Client`
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    /// Wrap a Kubernetes client
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for KubeStore {
    async fn get_cluster(&self, namespace: &str, name: &str) -> Result<Cluster> {
        let api: Api<Cluster> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get(name).await?)
    }

    async fn get_machine(&self, namespace: &str, name: &str) -> Result<Machine> {
        let api: Api<Machine> = Api::namespaced(self.client.clone(), namespace);
        Ok(api.get(name).await?)
    }

    async fn list_machines(&self, namespace: &str, label_selector: &str) -> Result<Vec<Machine>> {
        let api: Api<Machine> = Api::namespaced(self.client.clone(), namespace);
        let params = ListParams::default().labels(label_selector);
        let machines = api.list(&params).await?;
        trace!(namespace, label_selector, count = machines.items.len(), "listed machines");
        Ok(machines.items)
    }

    async fn list(
        &self,
        resource: &ApiResource,
        namespace: Option<String>,
        label_selector: Option<String>,
    ) -> Result<Vec<DynamicObject>> {
        let api: Api<DynamicObject> = match namespace.as_deref() {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, resource),
            None => Api::all_with(self.client.clone(), resource),
        };
        let mut params = ListParams::default();
        if let Some(selector) = label_selector.as_deref() {
            params = params.labels(selector);
        }
        let objects = api.list(&params).await?;
        trace!(kind = %resource.kind, count = objects.items.len(), "listed objects");
        Ok(objects.items)
    }
}
