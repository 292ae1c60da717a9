use crate::paths::canonical::CanonicalPath;
use crate::paths::error::AccessError;
use crate::paths::roots::Roots;
use crate::shared::ids::{BundleId, VariableName};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const BUNDLE_ROOT: &str = "bundle-root";
pub const CORE_ROOT: &str = "core-root";
pub const PROJECT_ROOT: &str = "project-root";
pub const OUTPUT_ROOT: &str = "output-root";

pub const SYSTEM_VARIABLES: [&str; 4] = [BUNDLE_ROOT, CORE_ROOT, PROJECT_ROOT, OUTPUT_ROOT];

pub fn is_system_variable(name: &str) -> bool {
    SYSTEM_VARIABLES.contains(&name)
}

/// Immutable name -> directory mapping used for one resolution scope.
///
/// Values are canonical absolute paths. Construction consumes and returns
/// the context, so once a context is shared it cannot change, and a name
/// is never rebound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableContext {
    variables: BTreeMap<String, CanonicalPath>,
}

impl VariableContext {
    /// System variables for `bundle`: `bundle-root`, `core-root`,
    /// `project-root` and `output-root`.
    pub fn for_bundle(roots: &Roots, bundle: Option<&BundleId>) -> Result<Self, AccessError> {
        let mut variables = BTreeMap::new();
        variables.insert(BUNDLE_ROOT.to_string(), roots.bundle_root(bundle)?);
        variables.insert(CORE_ROOT.to_string(), roots.core_root.clone());
        variables.insert(PROJECT_ROOT.to_string(), roots.project_root.clone());
        variables.insert(OUTPUT_ROOT.to_string(), roots.output_root.clone());
        Ok(Self { variables })
    }

    /// Builds a context from raw pairs. Names are validated; values must be
    /// absolute and traversal-free.
    pub fn from_pairs<I, N, V>(pairs: I) -> Result<Self, AccessError>
    where
        I: IntoIterator<Item = (N, V)>,
        N: AsRef<str>,
        V: AsRef<str>,
    {
        pairs
            .into_iter()
            .try_fold(Self::default(), |context, (name, value)| {
                let name = VariableName::parse(name.as_ref()).map_err(|reason| {
                    AccessError::InvalidVariable {
                        name: name.as_ref().to_string(),
                        reason,
                    }
                })?;
                context.with_variable(&name, value.as_ref())
            })
    }

    /// Adds one variable. Fails if `name` is already bound.
    pub fn with_variable(mut self, name: &VariableName, value: &str) -> Result<Self, AccessError> {
        if self.variables.contains_key(name.as_str()) {
            return Err(AccessError::InvalidVariable {
                name: name.to_string(),
                reason: "variable is already defined in this context".to_string(),
            });
        }
        if value.contains(['{', '}']) {
            return Err(AccessError::InvalidVariable {
                name: name.to_string(),
                reason: "variable values must not contain placeholder braces".to_string(),
            });
        }
        let path = CanonicalPath::parse(value).map_err(|err| AccessError::InvalidVariable {
            name: name.to_string(),
            reason: err.to_string(),
        })?;
        self.variables.insert(name.to_string(), path);
        Ok(self)
    }

    /// Layers configured custom variables on top of the current ones.
    pub fn with_custom_variables(
        self,
        custom: &BTreeMap<VariableName, PathBuf>,
    ) -> Result<Self, AccessError> {
        custom.iter().try_fold(self, |context, (name, path)| {
            let value = path.to_str().ok_or_else(|| AccessError::InvalidVariable {
                name: name.to_string(),
                reason: "path is not valid UTF-8".to_string(),
            })?;
            context.with_variable(name, value)
        })
    }

    pub fn get(&self, name: &str) -> Option<&CanonicalPath> {
        self.variables.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CanonicalPath)> {
        self.variables.iter().map(|(name, path)| (name.as_str(), path))
    }

    /// Every directory bound in this context; these are the read roots.
    pub fn roots(&self) -> impl Iterator<Item = &CanonicalPath> {
        self.variables.values()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
