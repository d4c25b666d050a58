// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Creates the default SamplesResource when none shows up on its own.

use crate::constants::bootstrap::{RETRY_INTERVAL_SECS, RETRY_MAX_INTERVAL_SECS};
use crate::error::Result;
use crate::status::FailureKind;
use crate::sync::SyncContext;
use crate::types::{ConditionStatus, ConditionType, SamplesResource};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

impl SyncContext {
    /// Create the default SamplesResource unless one has already been processed.
    ///
    /// Losing the create race to another writer is not an error.
    #[instrument(skip(self))]
    pub async fn create_default_if_needed(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.last_applied.is_some() {
            info!("SamplesResource already present, not creating the default");
            return Ok(());
        }

        let namespace = &self.config.namespace;
        let mut default = SamplesResource::default_instance(namespace);
        match self.stores.instances.create(namespace, &default).await {
            Ok(created) => {
                info!("Created default SamplesResource in namespace {}", namespace);
                let updated = self
                    .status
                    .set_condition(created, ConditionType::SamplesExist, ConditionStatus::True)
                    .await?;
                state.last_applied = Some(updated);
                Ok(())
            }
            Err(e) if e.is_already_exists() => {
                info!("Default SamplesResource was created concurrently, leaving it to the watch");
                Ok(())
            }
            Err(e) => Err(self
                .status
                .report_failure(
                    &mut default,
                    FailureKind::SamplesUpdateFailed,
                    e,
                    "failed to create default samples resource",
                )
                .await),
        }
    }
}

/// One-shot task that waits, then makes sure a SamplesResource exists
pub struct Bootstrapper {
    ctx: Arc<SyncContext>,
    delay: Duration,
}

impl Bootstrapper {
    pub fn new(ctx: Arc<SyncContext>) -> Self {
        let delay = ctx.config().bootstrap_delay;
        Self { ctx, delay }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    pub async fn run(self) {
        info!("Default SamplesResource check scheduled in {:?}", self.delay);
        sleep(self.delay).await;

        let mut interval = RETRY_INTERVAL_SECS;
        loop {
            match self.ctx.create_default_if_needed().await {
                Ok(()) => return,
                Err(e) => warn!(
                    "Failed to create default SamplesResource: {}, retrying in {} seconds...",
                    e, interval
                ),
            }

            sleep(Duration::from_secs(interval)).await;

            // Exponential backoff with max cap
            interval = (interval * 2).min(RETRY_MAX_INTERVAL_SECS);
        }
    }
}
