// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use kube::Client;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use samples_operator::bootstrap::Bootstrapper;
use samples_operator::config::Config;
use samples_operator::kubernetes::wait_for_crd;
use samples_operator::reconcilers::{InstanceReconciler, SecretReconciler};
use samples_operator::sync::{Stores, SyncContext, SyncManager};
use samples_operator::types::SamplesResource;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Starting samples operator");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: namespace={}, content_dir={}",
        config.namespace,
        config.content_dir.display()
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    // Wait for the SamplesResource CRD before starting reconcilers
    info!("Waiting for SamplesResource CRD to become available...");
    wait_for_crd::<SamplesResource>(&client).await?;

    let namespace = config.namespace.clone();
    let ctx = Arc::new(SyncContext::new(Stores::kube(client.clone()), config));

    // Create the sync manager and get a handle for reconcilers
    let (sync_manager, sync_handle) = SyncManager::new(ctx.clone());

    let instance_reconciler = InstanceReconciler::new(client.clone(), &namespace, sync_handle.clone());
    let secret_reconciler = SecretReconciler::new(client, &namespace, sync_handle);

    // Make sure a SamplesResource exists even if nobody creates one
    Bootstrapper::new(ctx).spawn();

    info!("Starting reconcilers...");

    // Run sync manager and both reconcilers concurrently
    tokio::try_join!(
        sync_manager.run(),
        instance_reconciler.run(),
        secret_reconciler.run()
    )?;

    // This should never be reached as reconcilers run forever
    warn!("All reconcilers stopped unexpectedly");
    Ok(())
}
