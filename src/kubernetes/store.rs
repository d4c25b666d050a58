// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespaced object stores backed by the Kubernetes API

use crate::error::{Result, SamplesError};
use async_trait::async_trait;
use k8s_openapi::NamespaceResourceScope;
use kube::{
    api::{DeleteParams, PostParams},
    Api, Client, Resource, ResourceExt,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use std::marker::PhantomData;
use tracing::{debug, instrument};

/// CRUD access to one kind of namespaced object.
///
/// Misses, optimistic-concurrency collisions and create races come back as
/// `SamplesError::NotFound`, `SamplesError::Conflict` and
/// `SamplesError::AlreadyExists` so callers can branch on them.
#[async_trait]
pub trait ObjectStore<K>: Send + Sync {
    async fn get(&self, namespace: &str, name: &str) -> Result<K>;
    async fn create(&self, namespace: &str, obj: &K) -> Result<K>;
    /// Replace the stored object; a set resourceVersion must match the stored one
    async fn update(&self, namespace: &str, obj: &K) -> Result<K>;
    /// Replace only the status of the stored object, with the same resourceVersion check
    async fn update_status(&self, namespace: &str, obj: &K) -> Result<K>;
    async fn delete(&self, namespace: &str, name: &str) -> Result<()>;
}

/// Object store talking to the API server through a `kube::Api`
pub struct KubeStore<K> {
    client: Client,
    _kind: PhantomData<fn() -> K>,
}

impl<K> KubeStore<K> {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            _kind: PhantomData,
        }
    }
}

impl<K> KubeStore<K>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>,
    K: Clone + DeserializeOwned + Debug,
{
    fn api(&self, namespace: &str) -> Api<K> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl<K> ObjectStore<K> for KubeStore<K>
where
    K: Resource<Scope = NamespaceResourceScope, DynamicType = ()>,
    K: Clone + DeserializeOwned + Serialize + Debug + Send + Sync + 'static,
{
    #[instrument(skip(self), fields(kind = %K::kind(&())))]
    async fn get(&self, namespace: &str, name: &str) -> Result<K> {
        self.api(namespace)
            .get(name)
            .await
            .map_err(|e| classify::<K>(e, namespace, name))
    }

    #[instrument(skip(self, obj), fields(kind = %K::kind(&()), name = %obj.name_any()))]
    async fn create(&self, namespace: &str, obj: &K) -> Result<K> {
        self.api(namespace)
            .create(&PostParams::default(), obj)
            .await
            .map_err(|e| classify::<K>(e, namespace, &obj.name_any()))
    }

    #[instrument(skip(self, obj), fields(kind = %K::kind(&()), name = %obj.name_any()))]
    async fn update(&self, namespace: &str, obj: &K) -> Result<K> {
        let name = obj.name_any();
        self.api(namespace)
            .replace(&name, &PostParams::default(), obj)
            .await
            .map_err(|e| classify::<K>(e, namespace, &name))
    }

    #[instrument(skip(self, obj), fields(kind = %K::kind(&()), name = %obj.name_any()))]
    async fn update_status(&self, namespace: &str, obj: &K) -> Result<K> {
        let name = obj.name_any();
        let data = serde_json::to_vec(obj)?;
        self.api(namespace)
            .replace_status(&name, &PostParams::default(), data)
            .await
            .map_err(|e| classify::<K>(e, namespace, &name))
    }

    #[instrument(skip(self), fields(kind = %K::kind(&())))]
    async fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        self.api(namespace)
            .delete(name, &DeleteParams::default())
            .await
            .map_err(|e| classify::<K>(e, namespace, name))?;
        debug!("Deleted {} {}/{}", K::kind(&()), namespace, name);
        Ok(())
    }
}

/// Map API status codes onto the error kinds the reconciler branches on
fn classify<K: Resource<DynamicType = ()>>(err: kube::Error, namespace: &str, name: &str) -> SamplesError {
    let what = format!("{} {}/{}", K::kind(&()), namespace, name);
    match err {
        kube::Error::Api(resp) if resp.code == 404 => SamplesError::NotFound(what),
        kube::Error::Api(resp) if resp.code == 409 && resp.reason == "AlreadyExists" => {
            SamplesError::AlreadyExists(what)
        }
        kube::Error::Api(resp) if resp.code == 409 => SamplesError::Conflict(what),
        e => SamplesError::KubeError(e),
    }
}

/// Numeric value of an object's resourceVersion; missing or unparsable versions count as 0
pub fn resource_version<K: Resource>(obj: &K) -> u64 {
    obj.meta()
        .resource_version
        .as_deref()
        .and_then(|v| v.parse().ok())
        .unwrap_or(0)
}
