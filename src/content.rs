// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Sample content on disk: locating the content tree for an architecture and
//! reading the definitions inside it.

use crate::constants::{arch, content, install_type};
use crate::error::{Result, SamplesError};
use crate::types::{ImageStream, Template};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One entry of a content directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// Read access to a tree of image stream and template definitions
pub trait DefinitionSource: Send + Sync {
    /// Entries of `dir`, sorted by name
    fn list(&self, dir: &Path) -> Result<Vec<DirEntry>>;
    fn read_image_stream(&self, path: &Path) -> Result<ImageStream>;
    fn read_template(&self, path: &Path) -> Result<Template>;
}

/// Reads definitions from the local filesystem. `.yaml`/`.yml` files are
/// parsed as YAML, anything else as JSON.
#[derive(Debug, Default, Clone)]
pub struct FsDefinitionSource;

impl FsDefinitionSource {
    fn read<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let raw = std::fs::read(path).map_err(|source| SamplesError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_error = |reason: String| SamplesError::ParseError {
            path: path.to_path_buf(),
            reason,
        };

        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => serde_yaml::from_slice(&raw).map_err(|e| parse_error(e.to_string())),
            _ => serde_json::from_slice(&raw).map_err(|e| parse_error(e.to_string())),
        }
    }
}

impl DefinitionSource for FsDefinitionSource {
    fn list(&self, dir: &Path) -> Result<Vec<DirEntry>> {
        let read_error = |source| SamplesError::ReadError {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(read_error)? {
            let entry = entry.map_err(read_error)?;
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                is_dir: entry.file_type().map_err(read_error)?.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        debug!("Listed {} entries in {}", entries.len(), dir.display());
        Ok(entries)
    }

    fn read_image_stream(&self, path: &Path) -> Result<ImageStream> {
        self.read(path)
    }

    fn read_template(&self, path: &Path) -> Result<Template> {
        self.read(path)
    }
}

/// Kind of definition a file holds, decided by the directories it sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    ImageStream,
    Template,
}

impl DefinitionKind {
    /// The kind for a file in `dir`, judged by the deepest `imagestreams` or
    /// `templates` segment of `dir` below `root`
    pub fn for_dir(root: &Path, dir: &Path) -> Option<Self> {
        let relative = dir.strip_prefix(root).ok()?;
        relative
            .components()
            .rev()
            .find_map(|component| match component.as_os_str().to_str() {
                Some(content::IMAGESTREAMS_DIR) => Some(DefinitionKind::ImageStream),
                Some(content::TEMPLATES_DIR) => Some(DefinitionKind::Template),
                _ => None,
            })
    }
}

/// Content tree for an architecture and install type under `base`
pub fn content_dir(base: &Path, architecture: &str, install: &str) -> Result<PathBuf> {
    let dir = match (architecture, install) {
        (arch::X86_64, install_type::RHEL) => content::OCP_X86_64_DIR,
        (arch::X86_64, install_type::CENTOS) => content::OKD_X86_64_DIR,
        (arch::PPC64LE, install_type::RHEL) => content::OCP_PPC64LE_DIR,
        (arch::PPC64LE, install_type::CENTOS) => {
            return Err(SamplesError::Unsupported(format!(
                "{} architecture and {} install are not currently supported",
                arch::PPC64LE,
                install_type::CENTOS
            )))
        }
        (arch::X86_64 | arch::PPC64LE, other) => {
            return Err(SamplesError::Unsupported(format!(
                "invalid install type {} specified, should be {} or {}",
                other,
                install_type::RHEL,
                install_type::CENTOS
            )))
        }
        (other, _) => {
            return Err(SamplesError::Unsupported(format!(
                "architecture {} unsupported; only support {} and {}",
                other,
                arch::X86_64,
                arch::PPC64LE
            )))
        }
    };
    Ok(base.join(dir))
}
