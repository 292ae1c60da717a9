use crate::definitions::sanitize::sanitize;
use crate::definitions::validator::{inspect_definition, DefinitionRules, Inspection};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("failed to read definitions directory {path}: {source}")]
    ReadDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to resolve current directory for {path}: {source}")]
    CurrentDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Display-ready metadata of one accepted definition. Every string has been
/// through [`sanitize`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentDefinition {
    pub id: String,
    pub name: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub group: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectedDefinition {
    pub path: PathBuf,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiscoveryReport {
    pub definitions: Vec<AgentDefinition>,
    pub rejected: Vec<RejectedDefinition>,
}

/// Scans `base/*.<ext>` and `base/<group>/*.<ext>` in sorted order and
/// validates every candidate. A missing `base` yields an empty report.
/// Unreadable groups, unreadable or non-UTF-8 files and symbolic links are
/// rejected, not fatal; only a failure to list `base` itself is an error.
pub fn discover_definitions(
    base: &Path,
    rules: &DefinitionRules,
) -> Result<DiscoveryReport, DiscoveryError> {
    let base = absolute_base(base)?;
    let mut report = DiscoveryReport::default();
    if !base.is_dir() {
        debug!(base = %base.display(), "definitions directory does not exist");
        return Ok(report);
    }

    for entry in sorted_entries(&base)? {
        if is_hidden(&entry) {
            continue;
        }
        match entry_kind(&entry) {
            Ok(EntryKind::Dir) => {
                let group = entry
                    .file_name()
                    .and_then(|v| v.to_str())
                    .unwrap_or_default();
                if rules.is_excluded_dir(group) {
                    debug!(group, "skipping excluded definitions directory");
                    continue;
                }
                scan_group(&entry, &base, rules, &mut report);
            }
            Ok(EntryKind::File | EntryKind::Other) if !rules.has_extension(&entry) => {}
            kind => visit_candidate(entry, kind, &base, rules, &mut report),
        }
    }

    info!(
        base = %base.display(),
        accepted = report.definitions.len(),
        rejected = report.rejected.len(),
        "agent definition discovery finished"
    );
    Ok(report)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    Dir,
    File,
    Symlink,
    Other,
}

/// Classifies without following symbolic links.
fn entry_kind(path: &Path) -> std::io::Result<EntryKind> {
    let file_type = fs::symlink_metadata(path)?.file_type();
    Ok(if file_type.is_symlink() {
        EntryKind::Symlink
    } else if file_type.is_dir() {
        EntryKind::Dir
    } else if file_type.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    })
}

fn scan_group(group: &Path, base: &Path, rules: &DefinitionRules, report: &mut DiscoveryReport) {
    let entries = match sorted_entries(group) {
        Ok(entries) => entries,
        Err(err) => {
            reject(report, group.to_path_buf(), vec![err.to_string()]);
            return;
        }
    };
    for path in entries {
        if is_hidden(&path) || !rules.has_extension(&path) {
            continue;
        }
        let kind = entry_kind(&path);
        visit_candidate(path, kind, base, rules, report);
    }
}

fn visit_candidate(
    path: PathBuf,
    kind: std::io::Result<EntryKind>,
    base: &Path,
    rules: &DefinitionRules,
    report: &mut DiscoveryReport,
) {
    match kind {
        Ok(EntryKind::File) => match load_definition(&path, base, rules) {
            Ok(definition) => report.definitions.push(definition),
            Err(errors) => reject(report, path, errors),
        },
        Ok(EntryKind::Symlink) => reject(
            report,
            path,
            vec!["symbolic links are not followed".to_string()],
        ),
        Ok(EntryKind::Dir | EntryKind::Other) => {}
        Err(err) => reject(report, path, vec![format!("failed to inspect entry: {err}")]),
    }
}

fn reject(report: &mut DiscoveryReport, path: PathBuf, errors: Vec<String>) {
    warn!(path = %path.display(), ?errors, "rejected agent definition");
    report.rejected.push(RejectedDefinition { path, errors });
}

fn absolute_base(base: &Path) -> Result<PathBuf, DiscoveryError> {
    if base.is_absolute() {
        return Ok(base.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(|source| DiscoveryError::CurrentDir {
        path: base.display().to_string(),
        source,
    })?;
    Ok(cwd.join(base))
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let read_dir_error = |source| DiscoveryError::ReadDir {
        path: dir.display().to_string(),
        source,
    };
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_dir_error)? {
        entries.push(entry.map_err(read_dir_error)?.path());
    }
    entries.sort();
    Ok(entries)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|v| v.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn load_definition(
    path: &Path,
    base: &Path,
    rules: &DefinitionRules,
) -> Result<AgentDefinition, Vec<String>> {
    let bytes = fs::read(path).map_err(|err| vec![format!("failed to read file: {err}")])?;
    let content =
        String::from_utf8(bytes).map_err(|_| vec!["file is not valid UTF-8".to_string()])?;

    let inspection = inspect_definition(path, base, &content, rules);
    if !inspection.result.valid {
        return Err(inspection.result.errors);
    }
    Ok(to_definition(path, &inspection))
}

fn to_definition(path: &Path, inspection: &Inspection) -> AgentDefinition {
    let field = |name: &str| sanitize(inspection.attribute(name).unwrap_or_default());
    AgentDefinition {
        id: field("id"),
        name: field("name"),
        title: field("title"),
        icon: inspection.attribute("icon").map(sanitize),
        group: inspection.group.clone().unwrap_or_default(),
        path: path.to_path_buf(),
    }
}
