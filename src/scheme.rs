//! Explicit type registry for dynamic listing
//!
//! The one dynamic-dispatch point in this crate, fan-out over an
//! arbitrary listed type, resolves its `ApiResource` from this registry
//! exactly once, at mapper construction. The registry is a plain value
//! passed in by the caller: no global scheme, no reflection, and tests get
//! a fresh scoped one each.

use kube::api::GroupVersionKind;
use kube::discovery::ApiResource;
use kube::Resource;

/// A scoped registry mapping group/version/kind identities to the
/// [`ApiResource`] used to list them
#[derive(Clone, Debug, Default)]
pub struct Scheme {
    types: Vec<ApiResource>,
}

impl Scheme {
    /// Create an empty scheme
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource type from its `ApiResource`
    pub fn register(&mut self, resource: ApiResource) {
        if self.resolve_parts(&resource.group, &resource.version, &resource.kind).is_none() {
            self.types.push(resource);
        }
    }

    /// Register a statically-typed resource, deriving its `ApiResource`
    /// from the type's trait metadata
    pub fn register_kind<K>(&mut self)
    where
        K: Resource<DynamicType = ()>,
    {
        self.register(ApiResource::erase::<K>(&()));
    }

    /// Look up the `ApiResource` for a GVK, if registered
    pub fn resolve(&self, gvk: &GroupVersionKind) -> Option<&ApiResource> {
        self.resolve_parts(&gvk.group, &gvk.version, &gvk.kind)
    }

    /// True iff the GVK has been registered
    pub fn is_registered(&self, gvk: &GroupVersionKind) -> bool {
        self.resolve(gvk).is_some()
    }

    fn resolve_parts(&self, group: &str, version: &str, kind: &str) -> Option<&ApiResource> {
        self.types
            .iter()
            .find(|r| r.group == group && r.version == version && r.kind == kind)
    }
}
