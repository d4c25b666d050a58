// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Secret reconciler - watches the registry credential and notifies the sync manager.

use crate::constants::names::REGISTRY_CREDENTIALS;
use crate::reconcilers::object_change;
use crate::sync::{SyncEvent, SyncManagerHandle};
use futures::StreamExt;
use k8s_openapi::api::core::v1::Secret;
use kube::{
    runtime::{watcher, WatchStreamExt},
    Api, Client, ResourceExt,
};
use kube_runtime::watcher::Config as WatcherConfig;
use tracing::{debug, info, warn};

pub struct SecretReconciler {
    client: Client,
    namespace: String,
    sync_handle: SyncManagerHandle,
}

impl SecretReconciler {
    pub fn new(client: Client, namespace: &str, sync_handle: SyncManagerHandle) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
            sync_handle,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let secrets: Api<Secret> = Api::namespaced(self.client.clone(), &self.namespace);
        let config = WatcherConfig::default().fields(&format!("metadata.name={}", REGISTRY_CREDENTIALS));
        info!("Watching secret {}/{}", self.namespace, REGISTRY_CREDENTIALS);

        let mut events = watcher(secrets, config).default_backoff().boxed();
        while let Some(event) = events.next().await {
            match event {
                Ok(event) => {
                    if let Some((secret, deleted)) = object_change(event) {
                        debug!("Secret {} changed (deleted: {})", secret.name_any(), deleted);
                        self.sync_handle
                            .send(SyncEvent::SecretChanged { secret, deleted })
                            .await;
                    }
                }
                Err(e) => warn!("Secret watch error: {}", e),
            }
        }

        Ok(())
    }
}
