// SPDX-License-Identifier: Apache-2.0

//! File-set discovery: tracked Markdown and shell files from the git index,
//! plus manifest directories found by walking the platform roots.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::model::ManifestDirectory;
use crate::ports::{Git, Walk};

/// File names recognized as a manifest-composition descriptor.
pub const KUSTOMIZATION_NAMES: [&str; 3] =
    ["kustomization.yaml", "kustomization.yml", "Kustomization"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Fixed roots walked for manifest directories.
    pub manifest_roots: Vec<PathBuf>,
    /// Generated file excluded from the Markdown set.
    pub changelog: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            manifest_roots: vec![PathBuf::from("bootstrap"), PathBuf::from("deploy")],
            changelog: "CHANGELOG.md".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoveredInputs {
    pub markdown: Vec<PathBuf>,
    pub shell: Vec<PathBuf>,
    pub manifest_dirs: Vec<ManifestDirectory>,
}

/// Enumerates the three input sets once per run. An unreadable git index
/// degrades to empty lint sets (the checkers report skipped); it never
/// aborts the run.
pub fn discover_inputs(
    git: &dyn Git,
    walk: &dyn Walk,
    repo_root: &Path,
    cfg: &DiscoveryConfig,
) -> DiscoveredInputs {
    let tracked = git.tracked_files(repo_root).unwrap_or_default();

    let markdown = tracked
        .iter()
        .filter(|path| {
            path.ends_with(".md")
                && Path::new(path)
                    .file_name()
                    .is_some_and(|name| name != cfg.changelog.as_str())
        })
        .map(PathBuf::from)
        .collect();
    let shell = tracked
        .iter()
        .filter(|path| path.ends_with(".sh"))
        .map(PathBuf::from)
        .collect();

    let mut dirs = BTreeSet::new();
    for root in &cfg.manifest_roots {
        let files = walk.walk_files(repo_root, root).unwrap_or_default();
        for file in files {
            let is_descriptor = file
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| KUSTOMIZATION_NAMES.contains(&name));
            if !is_descriptor {
                continue;
            }
            if let Some(parent) = file.parent() {
                // Report directories relative to the repo root; the walk
                // hands back absolute paths.
                let dir = parent.strip_prefix(repo_root).unwrap_or(parent);
                dirs.insert(dir.to_path_buf());
            }
        }
    }
    let manifest_dirs = dirs.into_iter().map(ManifestDirectory::new).collect();

    DiscoveredInputs {
        markdown,
        shell,
        manifest_dirs,
    }
}
