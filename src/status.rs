// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Condition bookkeeping on the SamplesResource.

use crate::error::{Result, SamplesError};
use crate::kubernetes::ObjectStore;
use crate::types::{ConditionStatus, ConditionType, SamplesResource};
use chrono::{SecondsFormat, Utc};
use kube::ResourceExt;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// What went wrong, and therefore which condition records it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    SamplesUpdateFailed,
    SecretUpdateFailed,
}

impl FailureKind {
    pub fn condition(self) -> ConditionType {
        match self {
            FailureKind::SamplesUpdateFailed => ConditionType::SamplesExist,
            FailureKind::SecretUpdateFailed => ConditionType::ImportCredentialsExist,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::SamplesUpdateFailed => write!(f, "SamplesUpdateFailed"),
            FailureKind::SecretUpdateFailed => write!(f, "SecretUpdateFailed"),
        }
    }
}

/// Writes condition changes to the SamplesResource
#[derive(Clone)]
pub struct StatusManager {
    instances: Arc<dyn ObjectStore<SamplesResource>>,
}

impl StatusManager {
    pub fn new(instances: Arc<dyn ObjectStore<SamplesResource>>) -> Self {
        Self { instances }
    }

    /// Move a condition to `status` and persist it, returning the stored instance.
    ///
    /// Nothing is written when the condition already has that status. A
    /// conflicting write is retried once against a freshly fetched instance.
    #[instrument(skip(self, instance), fields(instance = %instance.name_any()))]
    pub async fn set_condition(
        &self,
        mut instance: SamplesResource,
        condition_type: ConditionType,
        status: ConditionStatus,
    ) -> Result<SamplesResource> {
        if instance.condition_status(condition_type) == Some(status) {
            debug!("Condition {} already {:?}, not updating", condition_type, status);
            return Ok(instance);
        }

        let namespace = instance.namespace().unwrap_or_default();
        let now = timestamp();
        instance.transition_condition(condition_type, status, None, &now);

        match self.instances.update_status(&namespace, &instance).await {
            Ok(updated) => {
                info!("Condition {} set to {:?}", condition_type, status);
                Ok(updated)
            }
            Err(e) if e.is_conflict() => {
                warn!("Conflict setting condition {}, retrying once: {}", condition_type, e);
                let mut latest = match self.instances.get(&namespace, &instance.name_any()).await {
                    Ok(latest) => latest,
                    Err(e) => {
                        return Err(self
                            .report_failure(
                                &mut instance,
                                FailureKind::SamplesUpdateFailed,
                                e,
                                "failed to retrieve samples resource after update conflict",
                            )
                            .await)
                    }
                };
                latest.transition_condition(condition_type, status, None, &now);

                match self.instances.update_status(&namespace, &latest).await {
                    Ok(updated) => {
                        info!("Condition {} set to {:?} after retry", condition_type, status);
                        Ok(updated)
                    }
                    // The stored record moved again; writing an error condition would conflict too
                    Err(e) if e.is_conflict() => {
                        error!("Giving up on condition {} after conflict retry: {}", condition_type, e);
                        Err(e)
                    }
                    Err(e) => Err(self
                        .report_failure(
                            &mut latest,
                            FailureKind::SamplesUpdateFailed,
                            e,
                            "failed to update status after conflict retry",
                        )
                        .await),
                }
            }
            Err(e) => Err(self
                .report_failure(
                    &mut instance,
                    FailureKind::SamplesUpdateFailed,
                    e,
                    "failed adding success condition to config",
                )
                .await),
        }
    }

    /// Record `err` as an Unknown condition with a message and hand the error back.
    ///
    /// The write is best effort: if it fails the failure is only logged. When it
    /// succeeds `instance` becomes the stored copy, so later writes carry the
    /// current resourceVersion.
    pub async fn report_failure(
        &self,
        instance: &mut SamplesResource,
        failure: FailureKind,
        err: SamplesError,
        context: &str,
    ) -> SamplesError {
        let message = format!("{}: {}", context, err);
        error!("{} ({})", message, failure);

        let condition_type = failure.condition();
        if instance.condition_status(condition_type) == Some(ConditionStatus::Unknown) {
            return err;
        }

        let mut failed = instance.clone();
        failed.transition_condition(
            condition_type,
            ConditionStatus::Unknown,
            Some(message),
            &timestamp(),
        );
        let namespace = failed.namespace().unwrap_or_default();
        match self.instances.update_status(&namespace, &failed).await {
            Ok(written) => *instance = written,
            Err(e) => warn!("Failed to add error condition to SamplesResource status: {}", e),
        }

        err
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}
