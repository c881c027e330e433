//! Kubernetes adapters
//!
//! Privilege grant and Multus attachments backed by the API server. The
//! reconcile core is synchronous, so each call drives the async client to
//! completion on a runtime [`Handle`].

use k8s_openapi::api::apps::v1::StatefulSet;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::api::{ApiResource, DynamicObject, GroupVersionKind, Patch, PatchParams};
use kube::{Api, Client};
use tokio::runtime::Handle;
use tracing::{debug, info};

use super::resources::{
    privilege_patch, AttachmentPlan, NAD_CRD_NAME, NAD_GROUP, NAD_KIND, NAD_PLURAL, NAD_VERSION,
    NETWORK_ANNOTATION,
};
use super::types::{NetworkAttachments, PrivilegeGrant};
use crate::error::Result;

/// Field manager used for server-side apply
const FIELD_MANAGER: &str = "ran-cu-operator";

/// Where the workload lives in the cluster
#[derive(Clone)]
pub struct ClusterTarget {
    client: Client,
    handle: Handle,
    namespace: String,
    statefulset: String,
}

impl ClusterTarget {
    pub fn new(
        client: Client,
        handle: Handle,
        namespace: impl Into<String>,
        statefulset: impl Into<String>,
    ) -> Self {
        Self {
            client,
            handle,
            namespace: namespace.into(),
            statefulset: statefulset.into(),
        }
    }

    fn statefulsets(&self) -> Api<StatefulSet> {
        Api::namespaced(self.client.clone(), &self.namespace)
    }

    fn get_statefulset(&self) -> Result<StatefulSet> {
        Ok(self
            .handle
            .block_on(self.statefulsets().get(&self.statefulset))?)
    }

    fn patch_statefulset(&self, patch: &serde_json::Value) -> Result<()> {
        self.handle.block_on(self.statefulsets().patch(
            &self.statefulset,
            &PatchParams::default(),
            &Patch::Strategic(patch),
        ))?;
        Ok(())
    }
}

/// Whether `container` runs privileged in `statefulset`
pub fn container_privileged(statefulset: &StatefulSet, container: &str) -> bool {
    statefulset
        .spec
        .as_ref()
        .and_then(|spec| spec.template.spec.as_ref())
        .is_some_and(|pod| {
            pod.containers.iter().any(|c| {
                c.name == container
                    && c.security_context
                        .as_ref()
                        .and_then(|context| context.privileged)
                        == Some(true)
            })
        })
}

/// Pod template annotation of `statefulset`
pub fn template_annotation<'a>(statefulset: &'a StatefulSet, key: &str) -> Option<&'a str> {
    statefulset
        .spec
        .as_ref()?
        .template
        .metadata
        .as_ref()?
        .annotations
        .as_ref()?
        .get(key)
        .map(String::as_str)
}

/// Privileged security context through a StatefulSet patch
#[derive(Clone)]
pub struct K8sPrivileged {
    target: ClusterTarget,
}

impl K8sPrivileged {
    pub fn new(target: ClusterTarget) -> Self {
        Self { target }
    }
}

impl PrivilegeGrant for K8sPrivileged {
    fn is_privileged(&self, container: &str) -> Result<bool> {
        let statefulset = self.target.get_statefulset()?;
        Ok(container_privileged(&statefulset, container))
    }

    fn grant(&self, container: &str) -> Result<()> {
        self.target.patch_statefulset(&privilege_patch(container))?;
        info!(
            "Container {} of statefulset {}/{} patched as privileged",
            container, self.target.namespace, self.target.statefulset
        );
        Ok(())
    }
}

/// `NetworkAttachmentDefinition`s and the pod network annotation
#[derive(Clone)]
pub struct MultusAttachments {
    target: ClusterTarget,
}

impl MultusAttachments {
    pub fn new(target: ClusterTarget) -> Self {
        Self { target }
    }

    fn definitions(&self) -> Api<DynamicObject> {
        let gvk = GroupVersionKind::gvk(NAD_GROUP, NAD_VERSION, NAD_KIND);
        let resource = ApiResource::from_gvk_with_plural(&gvk, NAD_PLURAL);
        Api::namespaced_with(self.target.client.clone(), &self.target.namespace, &resource)
    }
}

impl NetworkAttachments for MultusAttachments {
    fn is_available(&self) -> Result<bool> {
        let crds: Api<CustomResourceDefinition> = Api::all(self.target.client.clone());
        let crd = self.target.handle.block_on(crds.get_opt(NAD_CRD_NAME))?;
        Ok(crd.is_some())
    }

    fn is_ready(&self, desired: &AttachmentPlan) -> Result<bool> {
        let api = self.definitions();
        for definition in &desired.definitions {
            let existing = self.target.handle.block_on(api.get_opt(&definition.name))?;
            let config = existing
                .as_ref()
                .and_then(|object| object.data["spec"]["config"].as_str());
            if !definition.matches(config) {
                debug!(name = %definition.name, "Network attachment definition out of date");
                return Ok(false);
            }
        }

        let statefulset = self.target.get_statefulset()?;
        Ok(desired.annotation_matches(template_annotation(&statefulset, NETWORK_ANNOTATION)))
    }

    fn configure(&self, desired: &AttachmentPlan) -> Result<()> {
        let api = self.definitions();
        let params = PatchParams::apply(FIELD_MANAGER).force();
        for definition in &desired.definitions {
            let object: DynamicObject =
                serde_json::from_value(definition.manifest(&self.target.namespace))?;
            self.target
                .handle
                .block_on(api.patch(&definition.name, &params, &Patch::Apply(&object)))?;
            info!("Network attachment definition {} applied", definition.name);
        }

        self.target.patch_statefulset(&desired.annotation_patch()?)
    }
}
