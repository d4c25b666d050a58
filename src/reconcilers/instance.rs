// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! SamplesResource reconciler - watches the singleton and notifies the sync manager.

use crate::reconcilers::object_change;
use crate::sync::{SyncEvent, SyncManagerHandle};
use crate::types::SamplesResource;
use futures::StreamExt;
use kube::{
    runtime::{watcher, WatchStreamExt},
    Api, Client, ResourceExt,
};
use tracing::{debug, info, warn};

pub struct InstanceReconciler {
    client: Client,
    namespace: String,
    sync_handle: SyncManagerHandle,
}

impl InstanceReconciler {
    pub fn new(client: Client, namespace: &str, sync_handle: SyncManagerHandle) -> Self {
        Self {
            client,
            namespace: namespace.to_string(),
            sync_handle,
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let instances: Api<SamplesResource> = Api::namespaced(self.client.clone(), &self.namespace);
        info!("Watching SamplesResources in namespace {}", self.namespace);

        let mut events = watcher(instances, watcher::Config::default())
            .default_backoff()
            .boxed();
        while let Some(event) = events.next().await {
            match event {
                Ok(event) => {
                    if let Some((instance, deleted)) = object_change(event) {
                        debug!(
                            "SamplesResource {} changed (deleted: {})",
                            instance.name_any(),
                            deleted
                        );
                        self.sync_handle
                            .send(SyncEvent::InstanceChanged { instance, deleted })
                            .await;
                    }
                }
                Err(e) => warn!("SamplesResource watch error: {}", e),
            }
        }

        Ok(())
    }
}
