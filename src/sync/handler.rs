// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Event dispatch and the SamplesResource reconciliation pipeline.

use crate::constants::names::SAMPLES_RESOURCE;
use crate::content::content_dir;
use crate::error::Result;
use crate::kubernetes::resource_version;
use crate::status::FailureKind;
use crate::sync::context::SyncContext;
use crate::sync::manager::SyncEvent;
use crate::types::{ConditionStatus, ConditionType, SamplesResource};
use kube::ResourceExt;
use tracing::{debug, info, instrument, warn};

impl SyncContext {
    /// Process one watch event
    pub async fn handle(&self, event: &SyncEvent) -> Result<()> {
        match event {
            SyncEvent::InstanceChanged { instance, deleted } => {
                self.handle_instance_changed(instance, *deleted).await
            }
            SyncEvent::SecretChanged { secret, deleted } => {
                self.handle_secret_changed(secret, *deleted).await
            }
        }
    }

    #[instrument(skip(self, instance), fields(instance = %instance.name_any(), rv = %resource_version(instance)))]
    async fn handle_instance_changed(&self, instance: &SamplesResource, deleted: bool) -> Result<()> {
        if instance.name_any() != SAMPLES_RESOURCE {
            debug!("Ignoring SamplesResource not named {}", SAMPLES_RESOURCE);
            return Ok(());
        }

        if deleted {
            info!("SamplesResource deleted, recreating the default instance");
            self.state.lock().await.last_applied = None;
            return self.create_default_if_needed().await;
        }

        let mut state = self.state.lock().await;

        if let Some(last) = state.last_applied.as_ref() {
            if resource_version(instance) <= resource_version(last) {
                debug!(
                    "SamplesResource version {} already processed (last {}), skipping",
                    resource_version(instance),
                    resource_version(last)
                );
                return Ok(());
            }
        }

        let mut current = instance.clone();

        // A credential that arrived before any instance was known is mirrored now
        if let Some(secret) = state.registry_secret.clone() {
            if !current.is_condition_true(ConditionType::ImportCredentialsExist) {
                info!("Mirroring cached registry secret");
                if let Err(e) = self.mirror_registry_secret(&mut state, &mut current, &secret).await {
                    warn!("Could not mirror cached registry secret, continuing: {}", e);
                }
            }
        }

        state.merge_skip_filters(&current.spec);
        let spec = current.spec.with_defaults();

        for architecture in &spec.architectures {
            let root = match content_dir(&self.config.content_dir, architecture, &spec.install_type) {
                Ok(root) => root,
                Err(e) => {
                    return Err(self
                        .status
                        .report_failure(
                            &mut current,
                            FailureKind::SamplesUpdateFailed,
                            e,
                            "error determining distro/type",
                        )
                        .await)
                }
            };

            if let Err(e) = self.sync_content(&state, &spec, &root).await {
                return Err(self
                    .status
                    .report_failure(
                        &mut current,
                        FailureKind::SamplesUpdateFailed,
                        e,
                        "error processing content",
                    )
                    .await);
            }
        }

        let updated = self
            .status
            .set_condition(current, ConditionType::SamplesExist, ConditionStatus::True)
            .await?;
        info!("SamplesResource processed");
        state.last_applied = Some(updated);
        Ok(())
    }
}
