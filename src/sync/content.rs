// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Applying the image stream and template definitions of a content tree to
//! the shared namespace.

use crate::constants::{install_type, names::SHARED_NAMESPACE, registries};
use crate::content::DefinitionKind;
use crate::error::Result;
use crate::kubernetes::ObjectStore;
use crate::sync::context::{SyncContext, SyncState};
use crate::types::{ImageStream, SamplesResourceSpec};
use futures::future::{BoxFuture, FutureExt};
use kube::{Resource, ResourceExt};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

impl SyncContext {
    /// Walk `root` in lexical order and create or update every definition found
    #[instrument(skip(self, state, spec), fields(root = %root.display()))]
    pub(crate) async fn sync_content(
        &self,
        state: &SyncState,
        spec: &SamplesResourceSpec,
        root: &Path,
    ) -> Result<()> {
        info!("Processing content in {}", root.display());
        self.sync_dir(state, spec, root, root.to_path_buf()).await
    }

    fn sync_dir<'a>(
        &'a self,
        state: &'a SyncState,
        spec: &'a SamplesResourceSpec,
        root: &'a Path,
        dir: PathBuf,
    ) -> BoxFuture<'a, Result<()>> {
        async move {
            let kind = DefinitionKind::for_dir(root, &dir);
            for entry in self.stores.definitions.list(&dir)? {
                let path = dir.join(&entry.name);
                if entry.is_dir {
                    self.sync_dir(state, spec, root, path).await?;
                    continue;
                }

                match kind {
                    Some(DefinitionKind::ImageStream) => {
                        self.sync_image_stream(state, spec, &path).await?
                    }
                    Some(DefinitionKind::Template) => self.sync_template(state, &path).await?,
                    None => debug!("Ignoring {}, not below imagestreams or templates", path.display()),
                }
            }
            Ok(())
        }
        .boxed()
    }

    async fn sync_image_stream(&self, state: &SyncState, spec: &SamplesResourceSpec, path: &Path) -> Result<()> {
        let mut image_stream = self.stores.definitions.read_image_stream(path)?;
        let name = image_stream.name_any();
        if state.skipped_imagestreams.contains(&name) {
            info!("Skipping image stream {}", name);
            return Ok(());
        }

        if let Some(registry) = spec.registry_override() {
            rewrite_pull_specs(&mut image_stream, registry, upstream_registries(&spec.install_type));
        }

        apply(self.stores.image_streams.as_ref(), image_stream).await
    }

    async fn sync_template(&self, state: &SyncState, path: &Path) -> Result<()> {
        let template = self.stores.definitions.read_template(path)?;
        let name = template.name_any();
        if state.skipped_templates.contains(&name) {
            info!("Skipping template {}", name);
            return Ok(());
        }

        apply(self.stores.templates.as_ref(), template).await
    }
}

/// Create `obj` in the shared namespace, or update it in place carrying the
/// stored resourceVersion
async fn apply<K>(store: &dyn ObjectStore<K>, mut obj: K) -> Result<()>
where
    K: Resource<DynamicType = ()> + Clone + Send + Sync + 'static,
{
    let name = obj.name_any();
    match store.get(SHARED_NAMESPACE, &name).await {
        Ok(existing) => {
            obj.meta_mut().resource_version = existing.meta().resource_version.clone();
            store.update(SHARED_NAMESPACE, &obj).await?;
            info!("Updated {} {}", K::kind(&()), name);
        }
        Err(e) if e.is_not_found() => {
            store.create(SHARED_NAMESPACE, &obj).await?;
            info!("Created {} {}", K::kind(&()), name);
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

/// Registries whose references are redirected for an install type
pub fn upstream_registries(install: &str) -> &'static [&'static str] {
    match install {
        install_type::RHEL => registries::RHEL,
        _ => registries::CENTOS,
    }
}

/// Point the repository and every DockerImage tag of `image_stream` at `registry`
pub fn rewrite_pull_specs(image_stream: &mut ImageStream, registry: &str, upstream: &[&str]) {
    if let Some(repository) = image_stream.spec.docker_image_repository.as_mut() {
        rewrite_reference(repository, registry, upstream);
    }
    for tag in image_stream.spec.tags.iter_mut() {
        if let Some(reference) = tag.docker_image_mut() {
            rewrite_reference(reference, registry, upstream);
        }
    }
}

fn rewrite_reference(reference: &mut String, registry: &str, upstream: &[&str]) {
    if reference.is_empty() {
        return;
    }

    let rewritten = match upstream.iter().find(|prefix| reference.starts_with(*prefix)) {
        Some(prefix) => format!("{}{}", registry, &reference[prefix.len()..]),
        None => format!("{}/{}", registry, reference),
    };
    debug!("Rewriting {} to {}", reference, rewritten);
    *reference = rewritten;
}
