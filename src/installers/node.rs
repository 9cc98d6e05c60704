//! Node dependencies via yarn.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;

use super::{glob_paths, Ecosystem, InstallContext};
use crate::error::{DotrunError, Result};
use crate::shell::argv;
use crate::state::hash_file;

/// Fingerprint persisted under the `yarn` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFingerprint {
    /// Hash of `yarn.lock`, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_hash: Option<String>,

    /// `dependencies` merged with `devDependencies`.
    #[serde(default)]
    pub dependencies: BTreeMap<String, String>,

    /// Installed package name to version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packages: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    #[serde(default)]
    dependencies: BTreeMap<String, Value>,

    #[serde(default, rename = "devDependencies")]
    dev_dependencies: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
struct InstalledPackage {
    name: String,
    version: String,
}

/// The Node/yarn ecosystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct Node;

impl Node {
    pub const KEY: &'static str = "yarn";
    pub const MANIFEST: &'static str = "package.json";
    pub const LOCKFILE: &'static str = "yarn.lock";

    /// Read the declared dependencies from `package.json`.
    pub fn declared_dependencies(ctx: &InstallContext<'_>) -> Result<BTreeMap<String, String>> {
        let path = ctx.root.join(Self::MANIFEST);
        let parse_error = |message: String| DotrunError::ManifestParse {
            path: path.clone(),
            message,
        };

        let content = fs::read_to_string(&path).map_err(|e| parse_error(e.to_string()))?;
        let manifest: PackageManifest =
            serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?;

        let mut dependencies: BTreeMap<String, String> = manifest
            .dependencies
            .into_iter()
            .map(|(name, version)| (name, version_string(version)))
            .collect();
        dependencies.extend(
            manifest
                .dev_dependencies
                .into_iter()
                .map(|(name, version)| (name, version_string(version))),
        );

        Ok(dependencies)
    }

    /// Installed packages, read from each package's own manifest.
    pub fn installed_packages(ctx: &InstallContext<'_>) -> BTreeMap<String, String> {
        let mut manifests = glob_paths(ctx.root, "node_modules/*/package.json");
        manifests.extend(glob_paths(ctx.root, "node_modules/@*/*/package.json"));

        manifests
            .iter()
            .filter_map(|path| fs::read_to_string(path).ok())
            .filter_map(|content| serde_json::from_str::<InstalledPackage>(&content).ok())
            .map(|package| (package.name, package.version))
            .collect()
    }
}

fn version_string(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

impl Ecosystem for Node {
    type Fingerprint = NodeFingerprint;

    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn manifest(&self) -> &'static str {
        Self::MANIFEST
    }

    fn declare(&self, ctx: &InstallContext<'_>) -> Result<NodeFingerprint> {
        Ok(NodeFingerprint {
            lock_hash: hash_file(&ctx.root.join(Self::LOCKFILE)),
            dependencies: Self::declared_dependencies(ctx)?,
            packages: None,
        })
    }

    fn snapshot(&self, ctx: &InstallContext<'_>, fingerprint: &mut NodeFingerprint) {
        fingerprint.packages = Some(Self::installed_packages(ctx));
    }

    fn install_commands(&self, _ctx: &InstallContext<'_>) -> Vec<Vec<String>> {
        vec![argv(&["yarn", "--no-default-rc", "install"])]
    }

    fn refresh(&self, ctx: &InstallContext<'_>, fingerprint: &mut NodeFingerprint) {
        self.snapshot(ctx, fingerprint);
        fingerprint.lock_hash = hash_file(&ctx.root.join(Self::LOCKFILE));
    }
}
