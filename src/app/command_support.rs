use crate::access::BundleFs;
use crate::config::{load_global_settings, ConfigError, Settings};
use crate::paths::AccessError;
use crate::shared::ids::BundleId;
use std::collections::BTreeMap;

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

/// Security rejections are reduced to the generic public message; the
/// detail was already logged where the rejection happened.
pub fn map_access_err(err: AccessError) -> String {
    err.public_message()
}

pub fn load_settings() -> Result<Settings, String> {
    load_global_settings().map_err(map_config_err)
}

pub fn load_bundle_fs() -> Result<BundleFs, String> {
    let settings = load_settings()?;
    BundleFs::from_settings(&settings).map_err(map_config_err)
}

/// Positional arguments plus `--flag value` options and bare `--switch`es.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedArgs {
    pub positionals: Vec<String>,
    pub options: BTreeMap<String, Vec<String>>,
    pub switches: Vec<String>,
}

impl ParsedArgs {
    pub fn value(&self, flag: &str) -> Option<&str> {
        self.options
            .get(flag)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    pub fn values(&self, flag: &str) -> &[String] {
        self.options.get(flag).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn switch(&self, flag: &str) -> bool {
        self.switches.iter().any(|s| s == flag)
    }

    pub fn bundle(&self) -> Result<Option<BundleId>, String> {
        self.value("--bundle").map(BundleId::parse).transpose()
    }
}

pub fn parse_args(
    args: &[String],
    value_flags: &[&str],
    switch_flags: &[&str],
) -> Result<ParsedArgs, String> {
    let mut parsed = ParsedArgs::default();
    let mut i = 0usize;
    while i < args.len() {
        let arg = args[i].as_str();
        if value_flags.contains(&arg) {
            if i + 1 >= args.len() {
                return Err(format!("missing value for {arg}"));
            }
            parsed
                .options
                .entry(arg.to_string())
                .or_default()
                .push(args[i + 1].clone());
            i += 2;
        } else if switch_flags.contains(&arg) {
            parsed.switches.push(arg.to_string());
            i += 1;
        } else if arg.starts_with("--") {
            return Err(format!("unknown option `{arg}`"));
        } else {
            parsed.positionals.push(arg.to_string());
            i += 1;
        }
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn parse_args_splits_positionals_options_and_switches() {
        let parsed = parse_args(
            &args(&["a.md", "--base", "/defs", "--json", "--var", "x=/a", "--var", "y=/b"]),
            &["--base", "--var"],
            &["--json"],
        )
        .expect("parse");
        assert_eq!(parsed.positionals, vec!["a.md".to_string()]);
        assert_eq!(parsed.value("--base"), Some("/defs"));
        assert_eq!(parsed.values("--var").len(), 2);
        assert!(parsed.switch("--json"));
        assert!(parsed.values("--missing").is_empty());
    }

    #[test]
    fn parse_args_rejects_unknown_and_incomplete_options() {
        let err = parse_args(&args(&["--nope"]), &[], &[]).expect_err("unknown");
        assert!(err.contains("unknown option"));
        let err = parse_args(&args(&["x", "--base"]), &["--base"], &[]).expect_err("missing");
        assert_eq!(err, "missing value for --base");
    }

    #[test]
    fn bundle_flag_is_validated() {
        let parsed = parse_args(&args(&["--bundle", "bad/id"]), &["--bundle"], &[]).expect("parse");
        assert!(parsed.bundle().is_err());
    }

    #[test]
    fn access_errors_hide_security_detail() {
        let err = AccessError::PathTraversal {
            path: "/proj/../etc".to_string(),
        };
        assert_eq!(map_access_err(err), "Security violation: access denied");
    }
}
