//! Structural and security checks for untrusted agent definition files.
//!
//! A definition lives at `<definitions dir>/<group>/<file>.md` and carries a
//! single `<agent id="…" name="…" title="…" icon="…">` tag. The checks never
//! fail hard: every problem found is reported in [`ValidationResult::errors`].

use crate::paths::canonical::{normalize_lexical, CanonicalPath};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

pub const AGENT_TAG: &str = "agent";
pub const REQUIRED_ATTRIBUTES: [&str; 3] = ["id", "name", "title"];
pub const OPTIONAL_ATTRIBUTES: [&str; 1] = ["icon"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DefinitionRules {
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,
}

fn default_extension() -> String {
    "md".to_string()
}

fn default_excluded_dirs() -> Vec<String> {
    ["workflows", "templates", "data"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

impl Default for DefinitionRules {
    fn default() -> Self {
        Self {
            extension: default_extension(),
            excluded_dirs: default_excluded_dirs(),
        }
    }
}

impl DefinitionRules {
    pub fn validate(&self) -> Result<(), String> {
        let extension = self.extension.trim();
        if extension.is_empty() {
            return Err("definition extension must be non-empty".to_string());
        }
        if extension.starts_with('.') || extension.contains(['/', '\\']) {
            return Err(format!(
                "definition extension `{extension}` must be a bare extension such as `md`"
            ));
        }
        if self.excluded_dirs.iter().any(|dir| dir.trim().is_empty()) {
            return Err("excluded definition directories must be non-empty".to_string());
        }
        Ok(())
    }

    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.excluded_dirs.iter().any(|dir| dir == name)
    }

    pub fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == self.extension)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Everything learned while validating one file; discovery builds its
/// metadata from `attributes` when the result is valid.
#[derive(Debug, Clone)]
pub(crate) struct Inspection {
    pub(crate) result: ValidationResult,
    pub(crate) group: Option<String>,
    pub(crate) attributes: Vec<(String, String)>,
}

impl Inspection {
    pub(crate) fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

static AGENT_OPEN: OnceLock<Regex> = OnceLock::new();
static AGENT_TAG_RE: OnceLock<Regex> = OnceLock::new();
static ATTRIBUTE: OnceLock<Regex> = OnceLock::new();
static SIGNATURES: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();

fn agent_open() -> &'static Regex {
    AGENT_OPEN.get_or_init(|| Regex::new(r"(?i)<agent[\s/>]").expect("static regex"))
}

fn agent_tag() -> &'static Regex {
    AGENT_TAG_RE.get_or_init(|| {
        Regex::new(
            r#"(?i)<agent((?:\s+[A-Za-z_:][-A-Za-z0-9_:.]*\s*=\s*(?:"[^"]*"|'[^']*'))*)\s*/?>"#,
        )
        .expect("static regex")
    })
}

fn attribute() -> &'static Regex {
    ATTRIBUTE.get_or_init(|| {
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .expect("static regex")
    })
}

fn injection_signatures() -> &'static [(&'static str, Regex)] {
    SIGNATURES.get_or_init(|| {
        [
            ("script tag", r"(?i)<\s*script\b"),
            ("javascript: URI", r"(?i)javascript\s*:"),
            ("inline event handler", r"(?i)\bon[a-z]+\s*="),
        ]
        .into_iter()
        .map(|(label, pattern)| (label, Regex::new(pattern).expect("static regex")))
        .collect()
    })
}

/// Validates with the default [`DefinitionRules`].
pub fn validate_definition_file(
    file_path: &Path,
    base_path: &Path,
    content: &str,
) -> ValidationResult {
    validate_definition_file_with(file_path, base_path, content, &DefinitionRules::default())
}

pub fn validate_definition_file_with(
    file_path: &Path,
    base_path: &Path,
    content: &str,
    rules: &DefinitionRules,
) -> ValidationResult {
    inspect_definition(file_path, base_path, content, rules).result
}

pub(crate) fn inspect_definition(
    file_path: &Path,
    base_path: &Path,
    content: &str,
    rules: &DefinitionRules,
) -> Inspection {
    let segments = match relative_segments(file_path, base_path) {
        Ok(segments) => segments,
        Err(error) => {
            return Inspection {
                result: ValidationResult::from_errors(vec![error]),
                group: None,
                attributes: Vec::new(),
            };
        }
    };

    let mut errors = check_location(&segments, rules);
    let attributes = check_agent_tag(content, &mut errors);
    if let Some(error) = scan_for_injection(&attributes) {
        errors.push(error);
    }

    let group = (segments.len() == 2).then(|| segments[0].clone());
    Inspection {
        result: ValidationResult::from_errors(errors),
        group,
        attributes,
    }
}

/// Path of `file_path` below `base_path`, split into segments. Relative
/// file paths are taken relative to `base_path`.
fn relative_segments(file_path: &Path, base_path: &Path) -> Result<Vec<String>, String> {
    let base = normalize_lexical(&base_path.to_string_lossy());
    if !base.absolute || base.has_parent_segment {
        return Err(format!(
            "Definitions directory `{}` must be an absolute path without `..` segments",
            base_path.display()
        ));
    }
    let base = CanonicalPath::from_normalized(base);

    let raw_file = file_path.to_string_lossy();
    let file = if file_path.is_absolute() {
        normalize_lexical(&raw_file)
    } else {
        normalize_lexical(&format!("{base}/{raw_file}"))
    };
    if file.has_parent_segment || !file.absolute {
        return Err(format!(
            "Path traversal in definition file path `{}`",
            file_path.display()
        ));
    }
    let file = CanonicalPath::from_normalized(file);

    if file == base || !file.is_within(&base) {
        return Err(format!(
            "File `{}` is outside the definitions directory `{base}`",
            file_path.display()
        ));
    }

    let rest = file
        .as_str()
        .strip_prefix(base.as_str())
        .unwrap_or(file.as_str());
    Ok(rest
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect())
}

fn check_location(segments: &[String], rules: &DefinitionRules) -> Vec<String> {
    let mut errors = Vec::new();
    let relative = segments.join("/");

    if segments.len() != 2 {
        errors.push(format!(
            "Invalid definition location `{relative}`: expected `<group>/<file>.{}` exactly one directory below the definitions directory",
            rules.extension
        ));
    }

    if let Some(file_name) = segments.last() {
        if !rules.has_extension(Path::new(file_name)) {
            errors.push(format!(
                "Invalid file extension for `{file_name}`: expected `.{}`",
                rules.extension
            ));
        }
    }

    if segments.len() >= 2 {
        let parent = &segments[segments.len() - 2];
        if rules.is_excluded_dir(parent) {
            errors.push(format!(
                "Directory `{parent}` is excluded from definition discovery: it holds non-definition assets"
            ));
        }
    }

    errors
}

fn check_agent_tag(content: &str, errors: &mut Vec<String>) -> Vec<(String, String)> {
    let tag_count = agent_open().find_iter(content).count();
    if tag_count == 0 {
        errors.push(format!("Missing required <{AGENT_TAG}> tag"));
        return Vec::new();
    }
    if tag_count > 1 {
        errors.push(format!(
            "Found {tag_count} <{AGENT_TAG}> tags; exactly one is allowed"
        ));
    }

    let Some(captures) = agent_tag().captures(content) else {
        errors.push(format!(
            "Malformed <{AGENT_TAG}> tag: attributes must be quoted name=\"value\" pairs"
        ));
        return Vec::new();
    };
    let raw_attributes = captures.get(1).map_or("", |m| m.as_str());
    let attributes: Vec<(String, String)> = attribute()
        .captures_iter(raw_attributes)
        .filter_map(|attr| {
            let name = attr.get(1)?.as_str().to_string();
            let value = attr.get(2).or_else(|| attr.get(3))?.as_str().to_string();
            Some((name, value))
        })
        .collect();

    for required in REQUIRED_ATTRIBUTES {
        match attributes.iter().find(|(name, _)| name == required) {
            None => errors.push(format!(
                "Missing required attribute `{required}` on <{AGENT_TAG}> tag"
            )),
            Some((_, value)) if value.trim().is_empty() => errors.push(format!(
                "Empty required attribute `{required}` on <{AGENT_TAG}> tag"
            )),
            Some(_) => {}
        }
    }

    attributes
}

/// First injection signature found in any attribute value. Scanning stops
/// at the first hit.
fn scan_for_injection(attributes: &[(String, String)]) -> Option<String> {
    attributes.iter().find_map(|(name, value)| {
        injection_signatures()
            .iter()
            .find(|(_, pattern)| pattern.is_match(value))
            .map(|(label, _)| {
                format!("Security: potential XSS in `{name}` attribute ({label})")
            })
    })
}
