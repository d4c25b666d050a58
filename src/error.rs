// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SamplesError {
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Conflict updating {0}")]
    Conflict(String),

    #[error("{0} already exists")]
    AlreadyExists(String),

    #[error("{0}")]
    Unsupported(String),

    #[error("Failed to read {}: {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {reason}", path.display())]
    ParseError { path: PathBuf, reason: String },

    #[error("Failed to serialize object: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl SamplesError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SamplesError::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, SamplesError::Conflict(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, SamplesError::AlreadyExists(_))
    }
}

pub type Result<T> = std::result::Result<T, SamplesError>;
