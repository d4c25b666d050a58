// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Shared reconciliation state and the stores it works against.

use crate::config::Config;
use crate::content::{DefinitionSource, FsDefinitionSource};
use crate::kubernetes::{KubeStore, ObjectStore};
use crate::status::StatusManager;
use crate::types::{ImageStream, SamplesResource, SamplesResourceSpec, Template};
use k8s_openapi::api::core::v1::Secret;
use kube::Client;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Everything the reconciler reads from or writes to
#[derive(Clone)]
pub struct Stores {
    pub image_streams: Arc<dyn ObjectStore<ImageStream>>,
    pub templates: Arc<dyn ObjectStore<Template>>,
    pub secrets: Arc<dyn ObjectStore<Secret>>,
    pub instances: Arc<dyn ObjectStore<SamplesResource>>,
    pub definitions: Arc<dyn DefinitionSource>,
}

impl Stores {
    /// Stores backed by the API server and content on the local filesystem
    pub fn kube(client: Client) -> Self {
        Self {
            image_streams: Arc::new(KubeStore::<ImageStream>::new(client.clone())),
            templates: Arc::new(KubeStore::<Template>::new(client.clone())),
            secrets: Arc::new(KubeStore::<Secret>::new(client.clone())),
            instances: Arc::new(KubeStore::<SamplesResource>::new(client)),
            definitions: Arc::new(FsDefinitionSource),
        }
    }
}

/// State carried from one event to the next
#[derive(Debug, Default)]
pub struct SyncState {
    /// Last SamplesResource that was fully processed (or created by the bootstrapper)
    pub last_applied: Option<SamplesResource>,
    /// Registry credential, held until it can be mirrored and kept afterwards for version checks
    pub registry_secret: Option<Secret>,
    /// Names only ever get added; a name removed from the SamplesResource stays skipped
    pub skipped_imagestreams: BTreeSet<String>,
    pub skipped_templates: BTreeSet<String>,
}

impl SyncState {
    pub fn merge_skip_filters(&mut self, spec: &SamplesResourceSpec) {
        self.skipped_templates
            .extend(spec.skipped_templates.iter().cloned());
        self.skipped_imagestreams
            .extend(spec.skipped_imagestreams.iter().cloned());
    }
}

/// Reconciliation context shared by the event loop and the bootstrapper.
///
/// The state mutex is held for the whole of an instance reconciliation and for
/// the bootstrapper's check-then-create, so the two never interleave.
pub struct SyncContext {
    pub(crate) stores: Stores,
    pub(crate) status: StatusManager,
    pub(crate) config: Config,
    pub(crate) state: Mutex<SyncState>,
}

impl SyncContext {
    pub fn new(stores: Stores, config: Config) -> Self {
        let status = StatusManager::new(stores.instances.clone());
        Self {
            stores,
            status,
            config,
            state: Mutex::new(SyncState::default()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The last fully processed SamplesResource, if any
    pub async fn last_applied(&self) -> Option<SamplesResource> {
        self.state.lock().await.last_applied.clone()
    }
}
