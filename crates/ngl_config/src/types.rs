//! Configuration types deserialized from `ngl.toml`.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The top-level project configuration parsed from `ngl.toml`.
#[derive(Debug, Deserialize)]
pub struct ProjectConfig {
    /// Core project metadata.
    pub project: ProjectMeta,
    /// Lint settings (deny/allow/warn rules, per-rule options).
    #[serde(default)]
    pub lint: LintConfig,
    /// Where the Ionic component declarations live.
    #[serde(default)]
    pub ionic: IonicConfig,
}

impl ProjectConfig {
    /// The configuration used when a project has no `ngl.toml`.
    ///
    /// The project is named after its directory.
    pub fn for_directory(project_dir: &Path) -> Self {
        let name = project_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "project".to_string());
        Self {
            project: ProjectMeta {
                name,
                src: default_src(),
            },
            lint: LintConfig::default(),
            ionic: IonicConfig::default(),
        }
    }
}

/// Core project metadata.
#[derive(Debug, Deserialize)]
pub struct ProjectMeta {
    /// The project name.
    pub name: String,
    /// Source directory walked by `ngl lint`, relative to the project root.
    #[serde(default = "default_src")]
    pub src: String,
}

fn default_src() -> String {
    "src".to_string()
}

/// Lint settings: severity overrides and rule options.
///
/// The level lists take rule names (`signal-usage`) or codes (`W105`).
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LintConfig {
    /// Rules to treat as errors.
    #[serde(default)]
    pub deny: Vec<String>,
    /// Rules to suppress.
    #[serde(default)]
    pub allow: Vec<String>,
    /// Rules to enable as warnings, including rules that are off by default.
    #[serde(default)]
    pub warn: Vec<String>,
    /// Per-rule option tables.
    #[serde(default)]
    pub rules: RuleOptions,
}

/// Option tables keyed by rule name under `[lint.rules]`.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RuleOptions {
    /// `[lint.rules.deny-element]`.
    #[serde(default, rename = "deny-element")]
    pub deny_element: Option<DenyElementOptions>,
    /// `[lint.rules.prefer-readonly]`.
    #[serde(default, rename = "prefer-readonly")]
    pub prefer_readonly: PreferReadonlyOptions,
}

/// Options for the `deny-element` rule.
///
/// `elements` stays optional here so that a table without the key can be
/// reported as a rule setup error rather than a parse error.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DenyElementOptions {
    /// Tag names that must not appear in templates.
    #[serde(default)]
    pub elements: Option<Vec<String>>,
}

/// Options for the `prefer-readonly` rule.
#[derive(Debug, Default, Clone, Copy, Deserialize)]
pub struct PreferReadonlyOptions {
    /// Skip members declared `private` or with a `#` name.
    ///
    /// `ignorePrivateProperties` is accepted as well.
    #[serde(default, alias = "ignorePrivateProperties")]
    pub ignore_private_properties: bool,
}

/// Location of the Ionic declaration files and oracle cache sizing.
#[derive(Debug, Deserialize)]
pub struct IonicConfig {
    /// Root of the `@ionic/core` package, relative to the project root.
    #[serde(default = "default_core")]
    pub core: PathBuf,
    /// Capacity of the bounded raw caches (file contents, parsed declarations).
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
}

impl IonicConfig {
    /// Path of the interface root `components.d.ts` for a project.
    pub fn components_dts(&self, project_root: &Path) -> PathBuf {
        project_root
            .join(&self.core)
            .join("dist")
            .join("types")
            .join("components.d.ts")
    }
}

impl Default for IonicConfig {
    fn default() -> Self {
        Self {
            core: default_core(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

fn default_core() -> PathBuf {
    PathBuf::from("node_modules/@ionic/core")
}

fn default_cache_capacity() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_directory_uses_dir_name() {
        let config = ProjectConfig::for_directory(Path::new("/work/shop-app"));
        assert_eq!(config.project.name, "shop-app");
        assert_eq!(config.project.src, "src");
        assert!(config.lint.rules.deny_element.is_none());
        assert!(!config.lint.rules.prefer_readonly.ignore_private_properties);
    }

    #[test]
    fn components_dts_path() {
        let ionic = IonicConfig::default();
        assert_eq!(
            ionic.components_dts(Path::new("/work/app")),
            PathBuf::from("/work/app/node_modules/@ionic/core/dist/types/components.d.ts")
        );
        assert_eq!(ionic.cache_capacity, 256);
    }
}
