use crate::app::command_support::parse_args;
use crate::definitions::{
    discover_definitions, validate_definition_file_with, DefinitionRules, DiscoveryReport,
    ValidationResult,
};
use std::fs;
use std::path::{Path, PathBuf};

fn absolute(path: &str) -> Result<PathBuf, String> {
    let path = Path::new(path);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()
        .map_err(|e| format!("failed to resolve current directory: {e}"))?;
    Ok(cwd.join(path))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("failed to encode json: {e}"))
}

pub fn cmd_validate(args: &[String]) -> Result<String, String> {
    let parsed = parse_args(args, &["--base"], &["--json"])?;
    let ([file], Some(base)) = (parsed.positionals.as_slice(), parsed.value("--base")) else {
        return Err("usage: validate <file> --base <definitions-dir> [--json]".to_string());
    };

    let file = absolute(file)?;
    let base = absolute(base)?;
    let content = fs::read_to_string(&file)
        .map_err(|e| format!("failed to read {}: {e}", file.display()))?;
    let result =
        validate_definition_file_with(&file, &base, &content, &DefinitionRules::default());

    if parsed.switch("--json") {
        return to_json(&result);
    }
    Ok(render_validation(&result))
}

fn render_validation(result: &ValidationResult) -> String {
    let mut lines = vec![format!("valid={}", result.valid)];
    lines.extend(result.errors.iter().map(|error| format!("error={error}")));
    lines.join("\n")
}

pub fn cmd_discover(args: &[String]) -> Result<String, String> {
    let parsed = parse_args(args, &[], &["--json"])?;
    let [dir] = parsed.positionals.as_slice() else {
        return Err("usage: discover <definitions-dir> [--json]".to_string());
    };

    let report = discover_definitions(&absolute(dir)?, &DefinitionRules::default())
        .map_err(|e| e.to_string())?;
    if parsed.switch("--json") {
        return to_json(&report);
    }
    Ok(render_report(&report))
}

fn render_report(report: &DiscoveryReport) -> String {
    let mut lines = vec![
        format!("definitions={}", report.definitions.len()),
        format!("rejected={}", report.rejected.len()),
    ];
    for definition in &report.definitions {
        let key = format!("definition:{}", definition.id);
        lines.push(format!("{key}.name={}", definition.name));
        lines.push(format!("{key}.title={}", definition.title));
        if let Some(icon) = &definition.icon {
            lines.push(format!("{key}.icon={icon}"));
        }
        lines.push(format!("{key}.group={}", definition.group));
        lines.push(format!("{key}.path={}", definition.path.display()));
    }
    for rejected in &report.rejected {
        for error in &rejected.errors {
            lines.push(format!("rejected:{}.error={error}", rejected.path.display()));
        }
    }
    lines.join("\n")
}
