// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for CRD discovery and object storage.

pub mod crd;
pub mod store;

pub use crd::{crd_served, wait_for_crd};
pub use store::{resource_version, KubeStore, ObjectStore};
