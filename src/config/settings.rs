use super::ConfigError;
use crate::definitions::DefinitionRules;
use crate::paths::{is_system_variable, CanonicalPath, Roots};
use crate::shared::ids::VariableName;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CORE_DIR: &str = "core";
pub const DEFAULT_BUNDLES_DIR: &str = "bundles";

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub project_root: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub core_root: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundles_root: Option<PathBuf>,
    pub output_root: PathBuf,
    #[serde(default)]
    pub definitions: DefinitionRules,
    #[serde(default)]
    pub variables: BTreeMap<VariableName, PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    pub require_roots_exist: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            require_roots_exist: true,
        }
    }
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn resolved_core_root(&self) -> PathBuf {
        self.core_root
            .clone()
            .unwrap_or_else(|| self.project_root.join(DEFAULT_CORE_DIR))
    }

    pub fn resolved_bundles_root(&self) -> PathBuf {
        self.bundles_root
            .clone()
            .unwrap_or_else(|| self.project_root.join(DEFAULT_BUNDLES_DIR))
    }

    /// The four configured roots in canonical form.
    pub fn roots(&self) -> Result<Roots, ConfigError> {
        Ok(Roots {
            project_root: canonical_root("project_root", &self.project_root)?,
            core_root: canonical_root("core_root", &self.resolved_core_root())?,
            bundles_root: canonical_root("bundles_root", &self.resolved_bundles_root())?,
            output_root: canonical_root("output_root", &self.output_root)?,
        })
    }

    pub fn validate(&self, options: ValidationOptions) -> Result<(), ConfigError> {
        let roots = self.roots()?;

        if roots.project_root.is_within(&roots.output_root) {
            return Err(ConfigError::Settings(format!(
                "`output_root` `{}` must not be or contain `project_root` `{}`",
                roots.output_root, roots.project_root
            )));
        }
        for (field, read_root) in [
            ("core_root", &roots.core_root),
            ("bundles_root", &roots.bundles_root),
        ] {
            if roots.output_root.is_within(read_root) || read_root.is_within(&roots.output_root)
            {
                return Err(ConfigError::Settings(format!(
                    "`output_root` `{}` must not overlap `{field}` `{read_root}`",
                    roots.output_root
                )));
            }
        }

        for (name, path) in &self.variables {
            if is_system_variable(name.as_str()) {
                return Err(ConfigError::Settings(format!(
                    "variable `{name}` shadows a system variable"
                )));
            }
            canonical_root(&format!("variables.{name}"), path)?;
        }

        self.definitions
            .validate()
            .map_err(|err| ConfigError::Settings(format!("`definitions`: {err}")))?;

        if options.require_roots_exist && !self.project_root.is_dir() {
            return Err(ConfigError::Settings(format!(
                "`project_root` `{}` is missing or not a directory",
                self.project_root.display()
            )));
        }

        Ok(())
    }
}

fn canonical_root(field: &str, path: &Path) -> Result<CanonicalPath, ConfigError> {
    CanonicalPath::from_path(path)
        .map_err(|err| ConfigError::Settings(format!("`{field}` is invalid: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Settings {
        serde_yaml::from_str(yaml).expect("parse settings")
    }

    #[test]
    fn optional_roots_default_under_project_root() {
        let settings = parse(
            r#"
project_root: /proj
output_root: /proj/agent-outputs
"#,
        );
        let roots = settings.roots().expect("roots");
        assert_eq!(roots.core_root.as_str(), "/proj/core");
        assert_eq!(roots.bundles_root.as_str(), "/proj/bundles");
        assert_eq!(settings.definitions, DefinitionRules::default());
    }

    #[test]
    fn roots_are_normalized() {
        let settings = parse(
            r#"
project_root: /proj//
core_root: /proj/./shared/core
output_root: /proj/out/
"#,
        );
        let roots = settings.roots().expect("roots");
        assert_eq!(roots.project_root.as_str(), "/proj");
        assert_eq!(roots.core_root.as_str(), "/proj/shared/core");
        assert_eq!(roots.output_root.as_str(), "/proj/out");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = serde_yaml::from_str::<Settings>(
            r#"
project_root: /proj
output_root: /proj/out
write_roots: [/tmp]
"#,
        )
        .expect_err("unknown field");
        assert!(err.to_string().contains("unknown field"));
    }
}
