use async_trait::async_trait;
use lexical_sort::natural_lexical_cmp;
use tokio::fs::File;
use tokio::io::AsyncReadExt;
use walkdir::WalkDir;

use super::site_interface::{AbstractSite, ErrorDetails, ErrorLayer, Result, SiteError};

use crate::file_format::config::{load, SnapshotConfigPaths};
use crate::file_format::hierarchy::{parse_hierarchy_js, HierarchyForest};
use crate::file_format::implementors::{
    parse_implementors_js, trait_key_from_path, ImplementorRecord,
};

async fn read_file_to_string(path: &str) -> Result<String> {
    let mut f = File::open(path).await?;
    let mut raw_str = String::new();
    f.read_to_string(&mut raw_str).await?;
    Ok(raw_str)
}

#[derive(Debug)]
struct LocalSnapshot {
    config_paths: SnapshotConfigPaths,
    snapshot_name: String,
}

impl LocalSnapshot {
    fn trait_impl_root(&self) -> String {
        format!(
            "{}/{}",
            self.config_paths.nav_path, self.config_paths.trait_impl_subdir
        )
    }
}

#[async_trait]
impl AbstractSite for LocalSnapshot {
    fn snapshot_name(&self) -> &str {
        &self.snapshot_name
    }

    async fn fetch_hierarchy(&self, nav_file: &str) -> Result<HierarchyForest> {
        let full_path = format!("{}/{}", self.config_paths.nav_path, nav_file);
        let raw_str = read_file_to_string(&full_path).await?;
        parse_hierarchy_js(&raw_str)
    }

    async fn fetch_default_hierarchy(&self) -> Result<HierarchyForest> {
        let mut roots = vec![];
        for nav_file in &self.config_paths.hierarchy_files {
            let full_path = format!("{}/{}", self.config_paths.nav_path, nav_file);
            // The generator only emits the forest files the project calls
            // for; a configured-but-absent file contributes nothing.
            if std::fs::metadata(&full_path).is_err() {
                info!("No hierarchy file at [{}]", full_path);
                continue;
            }
            let raw_str = read_file_to_string(&full_path).await?;
            roots.extend(parse_hierarchy_js(&raw_str)?.into_roots());
        }
        Ok(HierarchyForest::from_roots(roots))
    }

    async fn list_trait_impl_files(&self) -> Result<Vec<String>> {
        let root = self.trait_impl_root();
        // Hierarchy-only output has no trait.impl subtree at all; that's an
        // empty listing, not an error.
        if std::fs::metadata(&root).is_err() {
            info!("No trait.impl directory at [{}]", root);
            return Ok(vec![]);
        }
        let mut rel_paths = vec![];
        for entry in WalkDir::new(&root) {
            let entry = entry.map_err(|err| {
                SiteError::StickyProblem(ErrorDetails {
                    layer: ErrorLayer::SiteLayer,
                    message: err.to_string(),
                })
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            // The generator also drops sibling non-registration files in this
            // subtree; only `trait.<Name>.js` files are registrations.
            if !file_name.starts_with("trait.") || !file_name.ends_with(".js") {
                continue;
            }
            let rel_path = entry
                .path()
                .strip_prefix(&root)
                .map_err(|err| {
                    SiteError::StickyProblem(ErrorDetails {
                        layer: ErrorLayer::RuntimeInvariantViolation,
                        message: format!("walked outside the trait.impl root: {}", err),
                    })
                })?
                .to_string_lossy()
                .into_owned();
            rel_paths.push(rel_path);
        }
        rel_paths.sort_by(|a, b| natural_lexical_cmp(a, b));
        Ok(rel_paths)
    }

    async fn fetch_trait_impl(&self, rel_path: &str) -> Result<ImplementorRecord> {
        let full_path = format!("{}/{}", self.trait_impl_root(), rel_path);
        let raw_str = read_file_to_string(&full_path).await?;
        parse_implementors_js(&raw_str, &trait_key_from_path(rel_path))
    }
}

/// Build an `AbstractSite` over local generated output.  `config_path` is
/// either a config.json describing one or more snapshots, or directly the
/// root directory of a single snapshot (in which case default paths are
/// assumed and the snapshot name is the requested one or "local").
pub fn make_local_site(
    config_path: &str,
    snapshot_name: &str,
) -> Result<Box<dyn AbstractSite + Send + Sync>> {
    if std::fs::metadata(config_path)?.is_dir() {
        let name = if snapshot_name.is_empty() {
            "local".to_string()
        } else {
            snapshot_name.to_string()
        };
        return Ok(Box::new(LocalSnapshot {
            config_paths: SnapshotConfigPaths::for_bare_directory(config_path),
            snapshot_name: name,
        }));
    }

    let mut config = load(config_path)?;

    let name = if !snapshot_name.is_empty() {
        snapshot_name.to_string()
    } else if let Some(default_name) = config.default_snapshot.clone() {
        default_name
    } else if config.snapshots.len() == 1 {
        // Only one choice, no need to make the caller spell it out.
        config.snapshots.keys().next().unwrap().clone()
    } else {
        return Err(SiteError::StickyProblem(ErrorDetails {
            layer: ErrorLayer::BadInput,
            message: "config has multiple snapshots and no default; name one".to_string(),
        }));
    };

    let config_paths = match config.snapshots.remove(&name) {
        Some(paths) => paths,
        None => {
            return Err(SiteError::StickyProblem(ErrorDetails {
                layer: ErrorLayer::BadInput,
                message: format!("bad snapshot name: {}", name),
            }));
        }
    };

    Ok(Box::new(LocalSnapshot {
        config_paths,
        snapshot_name: name,
    }))
}
