// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Reconciliation of the SamplesResource, its content and the registry secret.

pub mod content;
pub mod context;
mod handler;
pub mod manager;
pub mod secrets;

pub use content::{rewrite_pull_specs, upstream_registries};
pub use context::{Stores, SyncContext, SyncState};
pub use manager::{SyncEvent, SyncManager, SyncManagerHandle};
pub use secrets::{is_registry_secret, mirrored_secret};
