//! Ruby dependencies via bundler, installed into `vendor`.

use serde::{Deserialize, Serialize};
use std::fs;

use super::{glob_names, parse_gemfile, Ecosystem, GemDependency, InstallContext};
use crate::error::{DotrunError, Result};
use crate::shell::argv;
use crate::state::hash_file;

/// Fingerprint persisted under the `ruby` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubyFingerprint {
    /// Hash of `Gemfile.lock`, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_hash: Option<String>,

    /// Runtime gems declared in the Gemfile.
    #[serde(default)]
    pub dependencies: Vec<GemDependency>,

    /// Gem directories installed under `vendor`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gems: Option<Vec<String>>,
}

/// The Ruby/bundler ecosystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ruby;

impl Ruby {
    pub const KEY: &'static str = "ruby";
    pub const MANIFEST: &'static str = "Gemfile";
    pub const LOCKFILE: &'static str = "Gemfile.lock";

    pub fn installed_gems(ctx: &InstallContext<'_>) -> Vec<String> {
        glob_names(ctx.root, "vendor/ruby/*/gems/*")
    }
}

impl Ecosystem for Ruby {
    type Fingerprint = RubyFingerprint;

    fn key(&self) -> &'static str {
        Self::KEY
    }

    fn manifest(&self) -> &'static str {
        Self::MANIFEST
    }

    fn declare(&self, ctx: &InstallContext<'_>) -> Result<RubyFingerprint> {
        let path = ctx.root.join(Self::MANIFEST);
        let content = fs::read_to_string(&path).map_err(|e| DotrunError::ManifestParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(RubyFingerprint {
            lock_hash: hash_file(&ctx.root.join(Self::LOCKFILE)),
            dependencies: parse_gemfile(&content),
            gems: None,
        })
    }

    fn snapshot(&self, ctx: &InstallContext<'_>, fingerprint: &mut RubyFingerprint) {
        fingerprint.gems = Some(Self::installed_gems(ctx));
    }

    fn install_commands(&self, _ctx: &InstallContext<'_>) -> Vec<Vec<String>> {
        vec![argv(&["bundle", "install"])]
    }

    fn refresh(&self, ctx: &InstallContext<'_>, fingerprint: &mut RubyFingerprint) {
        self.snapshot(ctx, fingerprint);
        fingerprint.lock_hash = hash_file(&ctx.root.join(Self::LOCKFILE));
    }
}
