// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Serial event loop in front of the reconciliation context.

use crate::sync::context::SyncContext;
use crate::types::SamplesResource;
use k8s_openapi::api::core::v1::Secret;
use kube::ResourceExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events that reconcilers send to the SyncManager
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// The SamplesResource was applied or deleted
    InstanceChanged { instance: SamplesResource, deleted: bool },
    /// The registry credential secret was applied or deleted
    SecretChanged { secret: Secret, deleted: bool },
}

impl SyncEvent {
    fn describe(&self) -> String {
        match self {
            SyncEvent::InstanceChanged { instance, deleted } => {
                format!("SamplesResource {} (deleted: {})", instance.name_any(), deleted)
            }
            SyncEvent::SecretChanged { secret, deleted } => {
                format!("Secret {} (deleted: {})", secret.name_any(), deleted)
            }
        }
    }
}

/// Receives events from reconcilers and hands them to the context one at a time.
/// Failed events are sent again after the requeue delay.
pub struct SyncManager {
    ctx: Arc<SyncContext>,
    event_rx: mpsc::Receiver<SyncEvent>,
    // Weak so the loop ends once every reconciler handle is gone
    requeue_tx: mpsc::WeakSender<SyncEvent>,
    requeue_delay: Duration,
}

/// Handle to send events to the SyncManager
#[derive(Clone)]
pub struct SyncManagerHandle {
    event_tx: mpsc::Sender<SyncEvent>,
}

impl SyncManagerHandle {
    pub async fn send(&self, event: SyncEvent) {
        if let Err(e) = self.event_tx.send(event).await {
            error!("Failed to send event to SyncManager: {}", e);
        }
    }
}

impl SyncManager {
    pub fn new(ctx: Arc<SyncContext>) -> (Self, SyncManagerHandle) {
        let (event_tx, event_rx) = mpsc::channel(256);
        let requeue_tx = event_tx.downgrade();
        let requeue_delay = ctx.config().requeue_delay;

        let manager = Self {
            ctx,
            event_rx,
            requeue_tx,
            requeue_delay,
        };
        let handle = SyncManagerHandle { event_tx };
        (manager, handle)
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        info!("SyncManager started, listening for events...");

        while let Some(event) = self.event_rx.recv().await {
            self.handle_event(event).await;
        }

        warn!("SyncManager event channel closed");
        Ok(())
    }

    async fn handle_event(&self, event: SyncEvent) {
        debug!("Handling event: {}", event.describe());

        if let Err(e) = self.ctx.handle(&event).await {
            error!(
                "Failed to handle {}, retrying in {:?}: {}",
                event.describe(),
                self.requeue_delay,
                e
            );
            self.requeue(event);
        }
    }

    fn requeue(&self, event: SyncEvent) {
        let Some(event_tx) = self.requeue_tx.upgrade() else {
            warn!("SyncManager is shutting down, dropping {}", event.describe());
            return;
        };
        let handle = SyncManagerHandle { event_tx };
        let delay = self.requeue_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            handle.send(event).await;
        });
    }
}
