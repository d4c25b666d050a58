// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Waiting for custom resource definitions to be served

use crate::constants::crd::{POLL_INTERVAL_SECS, POLL_MAX_INTERVAL_SECS};
use crate::error::Result;
use kube::{discovery::Discovery, Client, Resource};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Block until the API server serves `K`, polling with capped exponential backoff
pub async fn wait_for_crd<K: Resource<DynamicType = ()>>(client: &Client) -> Result<()> {
    let api_version = K::api_version(&());
    let kind = K::kind(&());
    let mut interval = Duration::from_secs(POLL_INTERVAL_SECS);
    let max_interval = Duration::from_secs(POLL_MAX_INTERVAL_SECS);

    loop {
        match crd_served::<K>(client).await {
            Ok(true) => {
                info!("{} ({}) is served", kind, api_version);
                return Ok(());
            }
            Ok(false) => info!("{} ({}) not served yet, next check in {:?}", kind, api_version, interval),
            Err(e) => warn!("Discovery of {} failed: {}, next check in {:?}", api_version, e, interval),
        }

        sleep(interval).await;
        interval = (interval * 2).min(max_interval);
    }
}

/// Whether discovery lists `K` under its group and version
pub async fn crd_served<K: Resource<DynamicType = ()>>(client: &Client) -> Result<bool> {
    let group = K::group(&());
    let version = K::version(&());
    let kind = K::kind(&());

    let discovery = Discovery::new(client.clone())
        .filter(&[group.as_ref()])
        .run()
        .await?;

    let Some(api_group) = discovery.get(&group) else {
        debug!("API group {} not found", group);
        return Ok(false);
    };
    Ok(api_group
        .versioned_resources(&version)
        .iter()
        .any(|(resource, _)| resource.kind == kind))
}
