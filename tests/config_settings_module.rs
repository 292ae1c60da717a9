use bundlefs::config::{load_settings_from, ConfigError, Settings, ValidationOptions};
use std::fs;
use tempfile::tempdir;

fn parse(yaml: &str) -> Settings {
    serde_yaml::from_str(yaml).expect("parse settings")
}

fn lenient() -> ValidationOptions {
    ValidationOptions {
        require_roots_exist: false,
    }
}

fn settings_message(err: ConfigError) -> String {
    match err {
        ConfigError::Settings(message) => message,
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn settings_with_custom_variables_validate() {
    let settings = parse(
        r#"
project_root: /proj
output_root: /proj/agent-outputs
definitions:
  extension: md
  excluded_dirs: [workflows, templates, data, assets]
variables:
  docs-root: /proj/docs
"#,
    );
    settings.validate(lenient()).expect("valid settings");
    assert_eq!(settings.definitions.excluded_dirs.len(), 4);
    assert_eq!(settings.variables.len(), 1);
}

#[test]
fn relative_or_traversing_roots_are_rejected() {
    for yaml in [
        "project_root: proj\noutput_root: /proj/out\n",
        "project_root: /proj\noutput_root: /proj/../out\n",
        "project_root: /proj\ncore_root: core\noutput_root: /proj/out\n",
    ] {
        let err = parse(yaml).validate(lenient()).expect_err(yaml);
        assert!(settings_message(err).contains("is invalid"), "{yaml}");
    }
}

#[test]
fn output_root_must_not_contain_project_or_overlap_core() {
    let err = parse("project_root: /proj\noutput_root: /proj\n")
        .validate(lenient())
        .expect_err("output equals project");
    assert!(settings_message(err).contains("must not be or contain `project_root`"));

    let err = parse("project_root: /proj\noutput_root: /proj/core/out\n")
        .validate(lenient())
        .expect_err("output inside core");
    assert!(settings_message(err).contains("must not overlap `core_root`"));
}

#[test]
fn custom_variables_cannot_shadow_system_variables() {
    let err = parse(
        r#"
project_root: /proj
output_root: /proj/out
variables:
  core-root: /elsewhere
"#,
    )
    .validate(lenient())
    .expect_err("shadowing");
    assert!(settings_message(err).contains("shadows a system variable"));
}

#[test]
fn invalid_variable_names_fail_at_parse() {
    let err = serde_yaml::from_str::<Settings>(
        r#"
project_root: /proj
output_root: /proj/out
variables:
  "bad name": /proj/docs
"#,
    )
    .expect_err("invalid name");
    assert!(err.to_string().contains("invalid variable name"));
}

#[test]
fn dotted_extension_is_rejected() {
    let err = parse(
        r#"
project_root: /proj
output_root: /proj/out
definitions:
  extension: .md
"#,
    )
    .validate(lenient())
    .expect_err("dotted extension");
    assert!(settings_message(err).contains("`definitions`"));
}

#[test]
fn load_requires_existing_project_root() {
    let temp = tempdir().expect("tempdir");
    let config = temp.path().join("config.yaml");
    let missing = temp.path().join("missing");
    fs::write(
        &config,
        format!(
            "project_root: {}\noutput_root: {}\n",
            missing.display(),
            missing.join("out").display()
        ),
    )
    .expect("write config");
    let err = load_settings_from(&config).expect_err("missing project root");
    assert!(settings_message(err).contains("missing or not a directory"));

    fs::create_dir_all(&missing).expect("create project");
    let settings = load_settings_from(&config).expect("load");
    assert_eq!(settings.project_root, missing);
}

#[test]
fn unreadable_and_malformed_files_have_distinct_errors() {
    let temp = tempdir().expect("tempdir");
    let err = Settings::from_path(&temp.path().join("absent.yaml")).expect_err("absent");
    assert!(matches!(err, ConfigError::Read { .. }));

    let bad = temp.path().join("bad.yaml");
    fs::write(&bad, "project_root: [unterminated").expect("write");
    let err = Settings::from_path(&bad).expect_err("malformed");
    assert!(matches!(err, ConfigError::Parse { .. }));
}
