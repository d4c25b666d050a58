// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{arch, install_type, names};
use kube::api::ObjectMeta;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(
    group = "samplesoperator.config.openshift.io",
    version = "v1alpha1",
    kind = "SamplesResource"
)]
#[kube(namespaced)]
#[kube(status = "SamplesResourceStatus")]
#[serde(rename_all = "camelCase")]
pub struct SamplesResourceSpec {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub architectures: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub install_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub samples_registry: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_templates: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_imagestreams: Vec<String>,
}

impl SamplesResourceSpec {
    /// Copy of this spec with an empty architecture list or install type filled in
    pub fn with_defaults(&self) -> Self {
        let mut spec = self.clone();
        if spec.architectures.is_empty() {
            spec.architectures.push(arch::X86_64.to_string());
        }
        if spec.install_type.is_empty() {
            spec.install_type = install_type::CENTOS.to_string();
        }
        spec
    }

    /// The registry override, if one is configured
    pub fn registry_override(&self) -> Option<&str> {
        self.samples_registry
            .as_deref()
            .map(|r| r.trim_end_matches('/'))
            .filter(|r| !r.is_empty())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SamplesResourceStatus {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<SamplesResourceCondition>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum ConditionType {
    SamplesExist,
    ImportCredentialsExist,
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConditionType::SamplesExist => write!(f, "SamplesExist"),
            ConditionType::ImportCredentialsExist => write!(f, "ImportCredentialsExist"),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum ConditionStatus {
    True,
    False,
    Unknown,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SamplesResourceCondition {
    #[serde(rename = "type")]
    pub condition_type: ConditionType,
    pub status: ConditionStatus,
    /// RFC 3339 timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<String>,
    /// RFC 3339 timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SamplesResource {
    /// The instance created when nothing else has shown up: x86_64 content from the community distribution
    pub fn default_instance(namespace: &str) -> Self {
        let mut instance = SamplesResource::new(
            names::SAMPLES_RESOURCE,
            SamplesResourceSpec {
                architectures: vec![arch::X86_64.to_string()],
                install_type: install_type::CENTOS.to_string(),
                ..Default::default()
            },
        );
        instance.metadata = ObjectMeta {
            name: Some(names::SAMPLES_RESOURCE.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        };
        instance
    }

    pub fn condition(&self, condition_type: ConditionType) -> Option<&SamplesResourceCondition> {
        self.status
            .as_ref()
            .and_then(|s| s.conditions.iter().find(|c| c.condition_type == condition_type))
    }

    pub fn condition_status(&self, condition_type: ConditionType) -> Option<ConditionStatus> {
        self.condition(condition_type).map(|c| c.status)
    }

    pub fn is_condition_true(&self, condition_type: ConditionType) -> bool {
        self.condition_status(condition_type) == Some(ConditionStatus::True)
    }

    /// Record a status transition for a condition, adding the condition if it is not there yet
    pub fn transition_condition(
        &mut self,
        condition_type: ConditionType,
        status: ConditionStatus,
        message: Option<String>,
        now: &str,
    ) {
        let updated = SamplesResourceCondition {
            condition_type,
            status,
            last_update_time: Some(now.to_string()),
            last_transition_time: Some(now.to_string()),
            message,
        };

        let conditions = &mut self.status.get_or_insert_with(Default::default).conditions;
        match conditions.iter_mut().find(|c| c.condition_type == condition_type) {
            Some(existing) => *existing = updated,
            None => conditions.push(updated),
        }
    }
}
