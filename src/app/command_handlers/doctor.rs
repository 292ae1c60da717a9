use crate::access::BundleFs;
use crate::app::command_support::{load_settings, map_config_err};
use crate::config::{default_global_config_path, Settings};
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

struct Check {
    id: &'static str,
    outcome: Result<String, String>,
    remediation: &'static str,
}

#[derive(Default)]
struct DoctorReport {
    checks: Vec<Check>,
}

impl DoctorReport {
    fn record(
        &mut self,
        id: &'static str,
        outcome: Result<String, String>,
        remediation: &'static str,
    ) {
        self.checks.push(Check {
            id,
            outcome,
            remediation,
        });
    }

    fn render(&self) -> String {
        let failed = self.checks.iter().filter(|c| c.outcome.is_err()).count();
        let mut lines = vec![
            format!(
                "summary={}",
                if failed == 0 { "healthy" } else { "unhealthy" }
            ),
            format!("checks_total={}", self.checks.len()),
            format!("checks_failed={failed}"),
        ];
        for check in &self.checks {
            match &check.outcome {
                Ok(detail) => {
                    lines.push(format!("check:{}=ok", check.id));
                    lines.push(format!("check:{}.detail={detail}", check.id));
                }
                Err(detail) => {
                    lines.push(format!("check:{}=fail", check.id));
                    lines.push(format!("check:{}.detail={detail}", check.id));
                    lines.push(format!("check:{}.remediation={}", check.id, check.remediation));
                }
            }
        }
        lines.join("\n")
    }
}

fn existing_dir(path: &Path) -> Result<String, String> {
    let detail = format!("dir={}", path.display());
    if path.is_dir() {
        Ok(detail)
    } else {
        Err(detail)
    }
}

/// Writes and removes a probe file through the guarded write path.
fn probe_output_root(settings: &Settings) -> Result<String, String> {
    let bundle_fs = BundleFs::from_settings(settings).map_err(map_config_err)?;
    let output_root = &bundle_fs.roots().output_root;
    fs::create_dir_all(output_root.as_path())
        .map_err(|e| format!("failed to create {output_root}: {e}"))?;

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let context = bundle_fs.context(None).map_err(|e| e.to_string())?;
    let probe = bundle_fs
        .write(
            &format!("{{output-root}}/.bundlefs-doctor-{nanos}"),
            &context,
            b"ok",
        )
        .map_err(|e| e.to_string())?;
    fs::remove_file(probe.as_path()).map_err(|e| format!("failed to remove {probe}: {e}"))?;
    Ok(format!("writable={output_root}"))
}

pub fn cmd_doctor() -> Result<String, String> {
    let mut report = DoctorReport::default();
    let config_path = default_global_config_path().map_err(map_config_err)?;
    let config_detail = format!("config={}", config_path.display());
    report.record(
        "config.path",
        if config_path.exists() {
            Ok(config_detail)
        } else {
            Err(config_detail)
        },
        "create the config file or point BUNDLEFS_CONFIG at one",
    );

    let settings = load_settings();
    report.record(
        "config.parse",
        settings
            .as_ref()
            .map(|_| "settings parsed and validated".to_string())
            .map_err(|err| format!("settings load failed: {err}")),
        "fix the config file and retry `bundlefs doctor`",
    );

    if let Ok(settings) = &settings {
        report.record(
            "roots.core",
            existing_dir(&settings.resolved_core_root()),
            "create core_root or fix it in the config file",
        );
        report.record(
            "roots.bundles",
            existing_dir(&settings.resolved_bundles_root()),
            "create bundles_root or fix it in the config file",
        );
        report.record(
            "roots.output",
            probe_output_root(settings),
            "grant write permission to output_root",
        );
    }

    Ok(report.render())
}
