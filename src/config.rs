// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{bootstrap, content, DEFAULT_REQUEUE_DELAY_SECS};
use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const SERVICE_ACCOUNT_NAMESPACE_FILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/namespace";

/// Operator configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace the operator runs in; the SamplesResource and the registry secret live here
    pub namespace: String,
    /// Directory holding the per architecture/distribution content trees
    pub content_dir: PathBuf,
    pub bootstrap_delay: Duration,
    pub requeue_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let namespace = match env::var("OPERATOR_NAMESPACE") {
            Ok(ns) => ns,
            Err(_) => std::fs::read_to_string(SERVICE_ACCOUNT_NAMESPACE_FILE)
                .map(|ns| ns.trim().to_string())
                .context("OPERATOR_NAMESPACE not set and service account namespace not readable")?,
        };
        let content_dir = env::var("SAMPLES_CONTENT_DIR")
            .unwrap_or_else(|_| content::DEFAULT_BASE_DIR.to_string())
            .into();
        let bootstrap_delay = secs_from_env("BOOTSTRAP_DELAY_SECS", bootstrap::DEFAULT_DELAY_SECS)?;
        let requeue_delay = secs_from_env("REQUEUE_DELAY_SECS", DEFAULT_REQUEUE_DELAY_SECS)?;

        Ok(Config {
            namespace,
            content_dir,
            bootstrap_delay,
            requeue_delay,
        })
    }
}

fn secs_from_env(key: &str, default: u64) -> Result<Duration> {
    parse_secs(key, env::var(key).ok(), default)
}

fn parse_secs(key: &str, value: Option<String>, default: u64) -> Result<Duration> {
    let secs = match value {
        Some(v) => v
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number of seconds, got '{}'", key, v))?,
        None => default,
    };
    Ok(Duration::from_secs(secs))
}
