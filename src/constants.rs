// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Well-known object names and namespaces
pub mod names {
    /// The only SamplesResource the operator acts on
    pub const SAMPLES_RESOURCE: &str = "openshift-samples";
    /// Registry pull secret mirrored into the shared namespace
    pub const REGISTRY_CREDENTIALS: &str = "samples-registry-credentials";
    /// Namespace that receives image streams, templates and the mirrored secret
    pub const SHARED_NAMESPACE: &str = "openshift";
}

/// Supported architectures
pub mod arch {
    pub const X86_64: &str = "x86_64";
    pub const PPC64LE: &str = "ppc64le";
}

/// Supported install types
pub mod install_type {
    /// Community distribution, content pulled from docker.io
    pub const CENTOS: &str = "centos";
    /// Red Hat distribution, content pulled from the Red Hat registries
    pub const RHEL: &str = "rhel";
}

/// Content layout on disk
pub mod content {
    pub const DEFAULT_BASE_DIR: &str = "/opt/openshift/operator";
    pub const OCP_X86_64_DIR: &str = "ocp-x86_64";
    pub const OKD_X86_64_DIR: &str = "okd-x86_64";
    pub const OCP_PPC64LE_DIR: &str = "ocp-ppc64le";
    pub const IMAGESTREAMS_DIR: &str = "imagestreams";
    pub const TEMPLATES_DIR: &str = "templates";
}

/// Upstream registries rewritten when a registry override is configured
pub mod registries {
    pub const CENTOS: &[&str] = &["docker.io"];
    pub const RHEL: &[&str] = &["registry.redhat.io", "registry.access.redhat.com"];
}

/// CRD polling configuration
pub mod crd {
    /// Initial polling interval in seconds when waiting for CRD
    pub const POLL_INTERVAL_SECS: u64 = 10;
    /// Maximum polling interval in seconds (exponential backoff cap)
    pub const POLL_MAX_INTERVAL_SECS: u64 = 60;
}

/// Default instance bootstrap timing
pub mod bootstrap {
    pub const DEFAULT_DELAY_SECS: u64 = 5;
    pub const RETRY_INTERVAL_SECS: u64 = 5;
    pub const RETRY_MAX_INTERVAL_SECS: u64 = 60;
}

/// Delay before a failed event is handed to the sync manager again
pub const DEFAULT_REQUEUE_DELAY_SECS: u64 = 60;
