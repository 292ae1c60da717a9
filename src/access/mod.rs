//! Filesystem reads and writes gated by the path resolver and the write
//! guard.
//!
//! The lexical checks in [`crate::paths`] never touch the disk. This module
//! adds the on-disk half: after a path passes lexically it is canonicalized
//! and re-checked, so a symlink inside an allowed root cannot alias a
//! location outside it.

use crate::config::{ConfigError, Settings};
use crate::paths::{
    resolve_path, AccessError, AccessKind, CanonicalPath, Roots, VariableContext, WriteGuard,
};
use crate::shared::fs_atomic::{atomic_write_file, canonicalize_existing_prefix};
use crate::shared::ids::{BundleId, VariableName};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct BundleFs {
    roots: Roots,
    variables: BTreeMap<VariableName, PathBuf>,
    guard: WriteGuard,
}

impl BundleFs {
    pub fn new(roots: Roots) -> Self {
        let guard = WriteGuard::new(&roots);
        Self {
            roots,
            variables: BTreeMap::new(),
            guard,
        }
    }

    pub fn with_variables(mut self, variables: BTreeMap<VariableName, PathBuf>) -> Self {
        self.variables = variables;
        self
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        Ok(Self::new(settings.roots()?).with_variables(settings.variables.clone()))
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    pub fn guard(&self) -> &WriteGuard {
        &self.guard
    }

    /// System variables for `bundle` plus the configured custom variables.
    pub fn context(&self, bundle: Option<&BundleId>) -> Result<VariableContext, AccessError> {
        VariableContext::for_bundle(&self.roots, bundle)?.with_custom_variables(&self.variables)
    }

    /// Resolves `expression` and requires the result to lie under one of the
    /// directories bound in `context`.
    pub fn resolve_read(
        &self,
        expression: &str,
        context: &VariableContext,
    ) -> Result<CanonicalPath, AccessError> {
        let path = resolve_path(expression, context)?;
        if !context.roots().any(|root| path.is_within(root)) {
            warn!(expression, path = %path, "rejected read outside every configured root");
            return Err(AccessError::denied(
                AccessKind::Read,
                path.as_str(),
                "outside every configured root",
            ));
        }
        Ok(path)
    }

    pub fn read_to_string(
        &self,
        expression: &str,
        context: &VariableContext,
    ) -> Result<String, AccessError> {
        let path = self.resolve_read(expression, context)?;
        let on_disk = fs::canonicalize(path.as_path()).map_err(|source| io_error(&path, source))?;
        let allowed = context
            .roots()
            .filter_map(|root| canonicalize_existing_prefix(root.as_path()).ok())
            .any(|root| on_disk.starts_with(&root));
        if !allowed {
            return Err(symlink_escape(&path, &on_disk));
        }

        debug!(path = %path, "reading file");
        fs::read_to_string(&on_disk).map_err(|source| io_error(&path, source))
    }

    /// Resolves `expression`, runs the write guard and writes `content`
    /// atomically. Nothing touches the disk until every check has passed.
    pub fn write(
        &self,
        expression: &str,
        context: &VariableContext,
        content: &[u8],
    ) -> Result<CanonicalPath, AccessError> {
        let resolved = resolve_path(expression, context)?;
        let path = self.guard.validate_write_path(resolved.as_str())?;
        if path == *self.guard.output_root() {
            return Err(AccessError::denied(
                AccessKind::Write,
                path.as_str(),
                "the output root itself is a directory",
            ));
        }

        let output_root = self.guard.output_root();
        let on_disk_root = canonicalize_existing_prefix(output_root.as_path())
            .map_err(|source| io_error(output_root, source))?;
        let on_disk = canonicalize_existing_prefix(path.as_path())
            .map_err(|source| io_error(&path, source))?;
        if !on_disk.starts_with(&on_disk_root) || on_disk == on_disk_root {
            return Err(symlink_escape(&path, &on_disk));
        }

        if let Some(parent) = on_disk.parent() {
            fs::create_dir_all(parent).map_err(|source| io_error(&path, source))?;
        }
        atomic_write_file(&on_disk, content).map_err(|source| io_error(&path, source))?;
        debug!(path = %path, bytes = content.len(), "wrote file");
        Ok(path)
    }
}

fn io_error(path: &CanonicalPath, source: std::io::Error) -> AccessError {
    AccessError::Io {
        path: path.to_string(),
        source,
    }
}

fn symlink_escape(path: &CanonicalPath, target: &Path) -> AccessError {
    warn!(
        path = %path,
        target = %target.display(),
        "rejected path resolving through a symlink outside the allowed roots"
    );
    AccessError::SymlinkEscape {
        path: path.to_string(),
        target: target.display().to_string(),
    }
}
