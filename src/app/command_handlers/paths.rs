use crate::app::command_support::{
    load_bundle_fs, load_settings, map_access_err, map_config_err, parse_args,
};
use crate::paths::{resolve_path, WriteGuard};
use crate::shared::ids::VariableName;
use std::fs;

pub fn cmd_resolve(args: &[String]) -> Result<String, String> {
    let parsed = parse_args(args, &["--bundle", "--var"], &[])?;
    let [expression] = parsed.positionals.as_slice() else {
        return Err(
            "usage: resolve <expression> [--bundle <id>] [--var name=/abs/path]...".to_string(),
        );
    };

    let bundle_fs = load_bundle_fs()?;
    let mut context = bundle_fs
        .context(parsed.bundle()?.as_ref())
        .map_err(map_access_err)?;
    for raw in parsed.values("--var") {
        let (name, value) = raw
            .split_once('=')
            .ok_or_else(|| "--var requires name=/abs/path".to_string())?;
        let name = VariableName::parse(name)?;
        context = context.with_variable(&name, value).map_err(map_access_err)?;
    }

    let resolved = resolve_path(expression, &context).map_err(map_access_err)?;
    Ok(format!("resolved={resolved}"))
}

pub fn cmd_check_write(args: &[String]) -> Result<String, String> {
    let [candidate] = args else {
        return Err("usage: check-write <path>".to_string());
    };
    let settings = load_settings()?;
    let roots = settings.roots().map_err(map_config_err)?;
    let allowed = WriteGuard::new(&roots)
        .validate_write_path(candidate)
        .map_err(map_access_err)?;
    Ok(format!("allowed={allowed}"))
}

pub fn cmd_read(args: &[String]) -> Result<String, String> {
    let parsed = parse_args(args, &["--bundle"], &[])?;
    let [expression] = parsed.positionals.as_slice() else {
        return Err("usage: read <expression> [--bundle <id>]".to_string());
    };
    let bundle_fs = load_bundle_fs()?;
    let context = bundle_fs
        .context(parsed.bundle()?.as_ref())
        .map_err(map_access_err)?;
    bundle_fs
        .read_to_string(expression, &context)
        .map_err(map_access_err)
}

pub fn cmd_write(args: &[String]) -> Result<String, String> {
    let parsed = parse_args(args, &["--bundle"], &[])?;
    let [expression, source] = parsed.positionals.as_slice() else {
        return Err("usage: write <expression> <source-file> [--bundle <id>]".to_string());
    };
    let bundle_fs = load_bundle_fs()?;
    let context = bundle_fs
        .context(parsed.bundle()?.as_ref())
        .map_err(map_access_err)?;
    let content = fs::read(source).map_err(|e| format!("failed to read {source}: {e}"))?;
    let written = bundle_fs
        .write(expression, &context, &content)
        .map_err(map_access_err)?;
    Ok(format!("written={written}\nbytes={}", content.len()))
}
