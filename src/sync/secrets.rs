// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Registry credential caching and mirroring into the shared namespace

use crate::constants::names::{REGISTRY_CREDENTIALS, SHARED_NAMESPACE};
use crate::error::Result;
use crate::kubernetes::resource_version;
use crate::status::FailureKind;
use crate::sync::context::{SyncContext, SyncState};
use crate::types::{ConditionStatus, ConditionType, SamplesResource};
use k8s_openapi::api::core::v1::Secret;
use kube::{api::ObjectMeta, ResourceExt};
use tracing::{debug, info, instrument};

/// Whether this is the registry credential secret the operator mirrors
pub fn is_registry_secret(secret: &Secret) -> bool {
    secret.name_any() == REGISTRY_CREDENTIALS
}

/// Copy of a secret without the namespace, resourceVersion, uid and other
/// server-populated fields, ready to be written elsewhere
pub fn mirrored_secret(secret: &Secret) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: secret.metadata.name.clone(),
            labels: secret.metadata.labels.clone(),
            annotations: secret.metadata.annotations.clone(),
            ..Default::default()
        },
        data: secret.data.clone(),
        string_data: secret.string_data.clone(),
        type_: secret.type_.clone(),
        immutable: secret.immutable,
    }
}

impl SyncContext {
    /// React to a change of the registry credential secret
    #[instrument(skip(self, secret), fields(secret = %secret.name_any()))]
    pub(crate) async fn handle_secret_changed(&self, secret: &Secret, deleted: bool) -> Result<()> {
        if !is_registry_secret(secret) {
            debug!("Ignoring secret that is not the registry credential");
            return Ok(());
        }

        let mut state = self.state.lock().await;

        // The shared namespace is not known to be ready before a SamplesResource shows up
        let Some(mut instance) = state.last_applied.clone() else {
            if deleted {
                debug!("Registry secret deleted before any SamplesResource, dropping cached copy");
                state.registry_secret = None;
            } else {
                info!("No SamplesResource yet, caching registry secret");
                state.registry_secret = Some(secret.clone());
            }
            return Ok(());
        };

        if deleted {
            instance = self.remove_registry_secret(&mut state, instance, secret).await?;
        } else {
            if let Some(cached) = state.registry_secret.as_ref() {
                if resource_version(secret) <= resource_version(cached) {
                    debug!(
                        "Registry secret version {} is not newer than {}, skipping",
                        resource_version(secret),
                        resource_version(cached)
                    );
                    return Ok(());
                }
            }
            self.mirror_registry_secret(&mut state, &mut instance, secret).await?;
        }

        state.last_applied = Some(instance);
        Ok(())
    }

    /// Create or update the mirrored copy and mark ImportCredentialsExist.
    ///
    /// `instance` follows every write made to the SamplesResource, failed or not.
    pub(crate) async fn mirror_registry_secret(
        &self,
        state: &mut SyncState,
        instance: &mut SamplesResource,
        secret: &Secret,
    ) -> Result<()> {
        let name = secret.name_any();
        let mirror = mirrored_secret(secret);
        let secrets = &self.stores.secrets;

        let existing = match secrets.get(SHARED_NAMESPACE, &name).await {
            Ok(existing) => Some(existing),
            Err(e) if e.is_not_found() => None,
            Err(e) => {
                return Err(self
                    .status
                    .report_failure(
                        instance,
                        FailureKind::SecretUpdateFailed,
                        e,
                        "failed to get registry secret in the shared namespace",
                    )
                    .await)
            }
        };

        let written = if existing.is_some() {
            info!("Updating registry secret {} in namespace {}", name, SHARED_NAMESPACE);
            secrets.update(SHARED_NAMESPACE, &mirror).await
        } else {
            info!("Creating registry secret {} in namespace {}", name, SHARED_NAMESPACE);
            secrets.create(SHARED_NAMESPACE, &mirror).await
        };
        if let Err(e) = written {
            return Err(self
                .status
                .report_failure(
                    instance,
                    FailureKind::SecretUpdateFailed,
                    e,
                    "failed to create/update registry secret in the shared namespace",
                )
                .await);
        }

        state.registry_secret = Some(secret.clone());
        *instance = self
            .status
            .set_condition(instance.clone(), ConditionType::ImportCredentialsExist, ConditionStatus::True)
            .await?;
        Ok(())
    }

    async fn remove_registry_secret(
        &self,
        state: &mut SyncState,
        mut instance: SamplesResource,
        secret: &Secret,
    ) -> Result<SamplesResource> {
        let name = secret.name_any();
        match self.stores.secrets.delete(SHARED_NAMESPACE, &name).await {
            Ok(()) => info!("Registry secret {} deleted from namespace {}", name, SHARED_NAMESPACE),
            Err(e) if e.is_not_found() => debug!("Registry secret {} already gone", name),
            Err(e) => {
                return Err(self
                    .status
                    .report_failure(
                        &mut instance,
                        FailureKind::SecretUpdateFailed,
                        e,
                        "failed to delete registry secret in the shared namespace",
                    )
                    .await)
            }
        }

        state.registry_secret = None;
        self.status
            .set_condition(instance, ConditionType::ImportCredentialsExist, ConditionStatus::False)
            .await
    }
}
