// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities: a mock API server for `kube::Client`, an in-memory object
//! store with failure injection, and a content tree builder.

use crate::config::Config;
use crate::content::FsDefinitionSource;
use crate::error::{Result, SamplesError};
use crate::kubernetes::ObjectStore;
use crate::sync::{Stores, SyncContext};
use crate::types::{ImageStream, SamplesResource, Template};
use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use http_body_util::BodyExt;
use k8s_openapi::api::core::v1::Secret;
use kube::client::Body;
use kube::core::ErrorResponse;
use kube::{Client, Resource, ResourceExt};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tempfile::TempDir;
use tower::Service;

/// A mock HTTP service that returns predefined responses based on request paths.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), (u16, String)>>>,
    requests: Arc<Mutex<Vec<(String, String, Bytes)>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.on("GET", path, status, body)
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.on("POST", path, status, body)
    }

    /// Add a response for PUT requests matching the exact path
    pub fn on_put(self, path: &str, status: u16, body: &str) -> Self {
        self.on("PUT", path, status, body)
    }

    fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), (status, body.to_string()));
        self
    }

    /// Requests seen so far as (method, path, body)
    pub fn requests(&self) -> Vec<(String, String, Bytes)> {
        self.requests.lock().unwrap().clone()
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "https://kubernetes.default.svc")
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let responses = self.responses.lock().unwrap();

        // Try exact match first
        if let Some(resp) = responses.get(&(method.to_string(), path.to_string())) {
            return Some(resp.clone());
        }

        // Try prefix match for paths like /api/v1/namespaces/foo
        for ((m, p), resp) in responses.iter() {
            if m == method && path.starts_with(p) {
                return Some(resp.clone());
            }
        }

        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let method = req.method().to_string();
        let path = req.uri().path().to_string();

        let response = self.find_response(&method, &path);
        let requests = self.requests.clone();

        Box::pin(async move {
            let body = req.into_body().collect().await?.to_bytes();
            requests.lock().unwrap().push((method, path, body));

            // Unmatched requests get a 404
            let (status, body) = response.unwrap_or_else(|| (404, not_found_json("resource", "unknown")));
            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Create a Status failure response body
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(404, "NotFound", &format!("{} \"{}\" not found", resource, name))
}

/// Store operations recorded by `MemoryStore`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Get,
    Create,
    Update,
    Delete,
}

/// Errors `MemoryStore` can be told to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    NotFound,
    Conflict,
    AlreadyExists,
    Server,
}

impl Failure {
    fn into_error(self, what: String) -> SamplesError {
        match self {
            Failure::NotFound => SamplesError::NotFound(what),
            Failure::Conflict => SamplesError::Conflict(what),
            Failure::AlreadyExists => SamplesError::AlreadyExists(what),
            Failure::Server => SamplesError::KubeError(kube::Error::Api(ErrorResponse {
                status: "Failure".to_string(),
                message: format!("internal error on {}", what),
                reason: "InternalError".to_string(),
                code: 500,
            })),
        }
    }
}

struct MemoryState<K> {
    objects: BTreeMap<(String, String), K>,
    next_version: u64,
    calls: Vec<(Op, String)>,
    failures: VecDeque<(Op, Failure)>,
}

/// In-memory object store enforcing resourceVersion checks like the API server
pub struct MemoryStore<K> {
    state: Mutex<MemoryState<K>>,
}

impl<K: Resource + Clone> MemoryStore<K> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState {
                objects: BTreeMap::new(),
                next_version: 1,
                calls: Vec::new(),
                failures: VecDeque::new(),
            }),
        }
    }

    /// Seed an object without recording a call; returns it as stored
    pub fn insert(&self, namespace: &str, mut obj: K) -> K {
        let mut state = self.state.lock().unwrap();
        let version = state.next_version;
        state.next_version += 1;
        obj.meta_mut().namespace = Some(namespace.to_string());
        obj.meta_mut().resource_version = Some(version.to_string());
        state
            .objects
            .insert((namespace.to_string(), obj.name_any()), obj.clone());
        obj
    }

    /// Make the next call of `op` fail; queued failures are used in order
    pub fn fail_next(&self, op: Op, failure: Failure) {
        self.state.lock().unwrap().failures.push_back((op, failure));
    }

    pub fn stored(&self, namespace: &str, name: &str) -> Option<K> {
        self.state
            .lock()
            .unwrap()
            .objects
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn names(&self, namespace: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .objects
            .keys()
            .filter(|(ns, _)| ns == namespace)
            .map(|(_, name)| name.clone())
            .collect()
    }

    /// Calls as (operation, object name)
    pub fn calls(&self) -> Vec<(Op, String)> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls().iter().filter(|(o, _)| *o == op).count()
    }

    fn begin(&self, state: &mut MemoryState<K>, op: Op, namespace: &str, name: &str) -> Result<()> {
        state.calls.push((op, name.to_string()));
        match state.failures.iter().position(|(o, _)| *o == op) {
            Some(idx) => {
                let (_, failure) = state.failures.remove(idx).unwrap();
                Err(failure.into_error(format!("{}/{}", namespace, name)))
            }
            None => Ok(()),
        }
    }
}

impl<K: Resource + Clone> Default for MemoryStore<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K> ObjectStore<K> for MemoryStore<K>
where
    K: Resource + Clone + Send + Sync + 'static,
{
    async fn get(&self, namespace: &str, name: &str) -> Result<K> {
        let mut state = self.state.lock().unwrap();
        self.begin(&mut state, Op::Get, namespace, name)?;
        state
            .objects
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| SamplesError::NotFound(format!("{}/{}", namespace, name)))
    }

    async fn create(&self, namespace: &str, obj: &K) -> Result<K> {
        let name = obj.name_any();
        let mut state = self.state.lock().unwrap();
        self.begin(&mut state, Op::Create, namespace, &name)?;
        let key = (namespace.to_string(), name.clone());
        if state.objects.contains_key(&key) {
            return Err(SamplesError::AlreadyExists(format!("{}/{}", namespace, name)));
        }
        let mut created = obj.clone();
        created.meta_mut().namespace = Some(namespace.to_string());
        created.meta_mut().resource_version = Some(state.next_version.to_string());
        state.next_version += 1;
        state.objects.insert(key, created.clone());
        Ok(created)
    }

    async fn update(&self, namespace: &str, obj: &K) -> Result<K> {
        let name = obj.name_any();
        let mut state = self.state.lock().unwrap();
        self.begin(&mut state, Op::Update, namespace, &name)?;
        let key = (namespace.to_string(), name.clone());
        let Some(current) = state.objects.get(&key) else {
            return Err(SamplesError::NotFound(format!("{}/{}", namespace, name)));
        };
        if let Some(expected) = obj.meta().resource_version.as_ref() {
            if current.meta().resource_version.as_ref() != Some(expected) {
                return Err(SamplesError::Conflict(format!("{}/{}", namespace, name)));
            }
        }
        let mut updated = obj.clone();
        updated.meta_mut().namespace = Some(namespace.to_string());
        updated.meta_mut().resource_version = Some(state.next_version.to_string());
        state.next_version += 1;
        state.objects.insert(key, updated.clone());
        Ok(updated)
    }

    // Objects here carry no separate status, so a status write is a whole-object write
    async fn update_status(&self, namespace: &str, obj: &K) -> Result<K> {
        self.update(namespace, obj).await
    }

    async fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        self.begin(&mut state, Op::Delete, namespace, name)?;
        state
            .objects
            .remove(&(namespace.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| SamplesError::NotFound(format!("{}/{}", namespace, name)))
    }
}

/// Operator namespace used throughout the tests
pub const OPERATOR_NAMESPACE: &str = "openshift-samples-operator";

/// A sync context wired to in-memory stores and a temporary content directory
pub struct Harness {
    pub ctx: Arc<SyncContext>,
    pub image_streams: Arc<MemoryStore<ImageStream>>,
    pub templates: Arc<MemoryStore<Template>>,
    pub secrets: Arc<MemoryStore<Secret>>,
    pub instances: Arc<MemoryStore<SamplesResource>>,
    pub content: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        let content = TempDir::new().unwrap();
        let image_streams: Arc<MemoryStore<ImageStream>> = Arc::new(MemoryStore::new());
        let templates: Arc<MemoryStore<Template>> = Arc::new(MemoryStore::new());
        let secrets: Arc<MemoryStore<Secret>> = Arc::new(MemoryStore::new());
        let instances: Arc<MemoryStore<SamplesResource>> = Arc::new(MemoryStore::new());

        let stores = Stores {
            image_streams: image_streams.clone(),
            templates: templates.clone(),
            secrets: secrets.clone(),
            instances: instances.clone(),
            definitions: Arc::new(FsDefinitionSource),
        };
        let config = Config {
            namespace: OPERATOR_NAMESPACE.to_string(),
            content_dir: content.path().to_path_buf(),
            bootstrap_delay: Duration::from_secs(5),
            requeue_delay: Duration::from_secs(60),
        };

        Self {
            ctx: Arc::new(SyncContext::new(stores, config)),
            image_streams,
            templates,
            secrets,
            instances,
            content,
        }
    }

    /// Write an image stream definition at `rel` below the content directory
    pub fn write_image_stream(&self, rel: &str, name: &str, repository: &str, tags: &[(&str, &str, &str)]) {
        let tags: Vec<_> = tags
            .iter()
            .map(|(tag, kind, from)| {
                serde_json::json!({"name": tag, "from": {"kind": kind, "name": from}})
            })
            .collect();
        self.write(
            rel,
            serde_json::json!({
                "apiVersion": "image.openshift.io/v1",
                "kind": "ImageStream",
                "metadata": {"name": name},
                "spec": {"dockerImageRepository": repository, "tags": tags}
            }),
        );
    }

    /// Write a template definition at `rel` below the content directory
    pub fn write_template(&self, rel: &str, name: &str) {
        self.write(
            rel,
            serde_json::json!({
                "apiVersion": "template.openshift.io/v1",
                "kind": "Template",
                "metadata": {"name": name},
                "objects": [{"apiVersion": "v1", "kind": "Service", "metadata": {"name": name}}]
            }),
        );
    }

    pub fn write_raw(&self, rel: &str, contents: &str) {
        let path = self.content.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn write(&self, rel: &str, value: serde_json::Value) {
        self.write_raw(rel, &value.to_string());
    }

    pub fn content_path(&self, rel: &str) -> std::path::PathBuf {
        self.content.path().join(rel)
    }

    /// Total number of store calls across all stores
    pub fn total_calls(&self) -> usize {
        self.image_streams.calls().len()
            + self.templates.calls().len()
            + self.secrets.calls().len()
            + self.instances.calls().len()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// A SamplesResource as the watch would deliver it
pub fn make_instance(resource_version: u64, architectures: &[&str], install_type: &str) -> SamplesResource {
    let mut instance = SamplesResource::default_instance(OPERATOR_NAMESPACE);
    instance.spec.architectures = architectures.iter().map(|a| a.to_string()).collect();
    instance.spec.install_type = install_type.to_string();
    instance.metadata.resource_version = Some(resource_version.to_string());
    instance
}

/// The registry credential secret as the watch would deliver it
pub fn make_registry_secret(name: &str, resource_version: u64) -> Secret {
    let mut secret = Secret {
        type_: Some("kubernetes.io/dockerconfigjson".to_string()),
        data: Some(BTreeMap::from([(
            ".dockerconfigjson".to_string(),
            k8s_openapi::ByteString(br#"{"auths":{}}"#.to_vec()),
        )])),
        ..Default::default()
    };
    secret.metadata.name = Some(name.to_string());
    secret.metadata.namespace = Some(OPERATOR_NAMESPACE.to_string());
    secret.metadata.uid = Some("5a1d7f0e-0000-4000-8000-000000000001".to_string());
    secret.metadata.resource_version = Some(resource_version.to_string());
    secret
}
