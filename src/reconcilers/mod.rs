// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Watches that turn Kubernetes changes into sync events.

pub mod instance;
pub mod secret;

pub use instance::InstanceReconciler;
pub use secret::SecretReconciler;

use kube::runtime::watcher;

/// The object carried by a watch event and whether it was deleted.
/// Markers around the initial listing carry nothing.
pub(crate) fn object_change<K>(event: watcher::Event<K>) -> Option<(K, bool)> {
    match event {
        watcher::Event::Apply(obj) | watcher::Event::InitApply(obj) => Some((obj, false)),
        watcher::Event::Delete(obj) => Some((obj, true)),
        watcher::Event::Init | watcher::Event::InitDone => None,
    }
}
