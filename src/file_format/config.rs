use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;

use serde::{Deserialize, Serialize};
use serde_json::from_reader;

use crate::abstract_site::{ErrorDetails, ErrorLayer, Result, SiteError};

/// Schema for the config.json files for loading; used to derive the actual
/// `Config` instance.
#[derive(Clone, Debug, Deserialize)]
pub struct ConfigJson {
    /// Which snapshot to use when a pipeline doesn't name one.
    pub default_snapshot: Option<String>,
    /// The documentation snapshots this config knows about.  A site that has
    /// been generated more than once shows up here once per snapshot; the
    /// snapshots hold overlapping-but-distinct forests and are never merged.
    pub snapshots: BTreeMap<String, SnapshotConfigPaths>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SnapshotConfigPaths {
    /// Absolute path to the root of the generated documentation output; the
    /// directory holding hierarchy.js and the trait.impl/ subtree.
    pub nav_path: String,
    /// Hierarchy forest files available under `nav_path`.  Each file is an
    /// independent forest (Doxygen emits several, ex: `namespaces_dup.js`).
    #[serde(default = "default_hierarchy_files")]
    pub hierarchy_files: Vec<String>,
    /// Subdirectory of `nav_path` holding the rustdoc implementor
    /// registration files.
    #[serde(default = "default_trait_impl_subdir")]
    pub trait_impl_subdir: String,
}

fn default_hierarchy_files() -> Vec<String> {
    vec!["hierarchy.js".to_string(), "namespaces_dup.js".to_string()]
}

fn default_trait_impl_subdir() -> String {
    "trait.impl".to_string()
}

impl SnapshotConfigPaths {
    /// Paths for a snapshot named only by its root directory, with the
    /// generator's default file layout.
    pub fn for_bare_directory(nav_path: &str) -> SnapshotConfigPaths {
        SnapshotConfigPaths {
            nav_path: nav_path.trim_end_matches('/').to_string(),
            hierarchy_files: default_hierarchy_files(),
            trait_impl_subdir: default_trait_impl_subdir(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub default_snapshot: Option<String>,
    pub snapshots: BTreeMap<String, SnapshotConfigPaths>,
}

pub fn load(config_path: &str) -> Result<Config> {
    let file = File::open(config_path).map_err(|err| {
        SiteError::StickyProblem(ErrorDetails {
            layer: ErrorLayer::BadInput,
            message: format!("unable to open config file [{}]: {}", config_path, err),
        })
    })?;
    let config_json: ConfigJson = from_reader(BufReader::new(file))?;

    if let Some(default_name) = &config_json.default_snapshot {
        if !config_json.snapshots.contains_key(default_name) {
            return Err(SiteError::StickyProblem(ErrorDetails {
                layer: ErrorLayer::BadInput,
                message: format!("default_snapshot [{}] is not a snapshot", default_name),
            }));
        }
    }

    Ok(Config {
        default_snapshot: config_json.default_snapshot,
        snapshots: config_json.snapshots,
    })
}
