pub mod error;
pub mod load;
pub mod paths;
pub mod settings;

pub use error::ConfigError;
pub use load::{load_global_settings, load_settings_from};
pub use paths::{
    default_global_config_path, CONFIG_PATH_ENV, GLOBAL_SETTINGS_FILE_NAME, GLOBAL_STATE_DIR,
};
pub use settings::{Settings, ValidationOptions, DEFAULT_BUNDLES_DIR, DEFAULT_CORE_DIR};

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn restore_env(key: &str, old: Option<std::ffi::OsString>) {
        if let Some(value) = old {
            std::env::set_var(key, value);
        } else {
            std::env::remove_var(key);
        }
    }

    #[test]
    fn default_global_config_path_targets_home_bundlefs_config_yaml() {
        let _guard = ENV_LOCK.lock().expect("env lock");
        let temp = tempdir().expect("temp dir");
        let old_home = std::env::var_os("HOME");
        let old_explicit = std::env::var_os(CONFIG_PATH_ENV);
        std::env::remove_var(CONFIG_PATH_ENV);
        std::env::set_var("HOME", temp.path());

        let path = default_global_config_path().expect("resolve global config path");
        assert_eq!(path, temp.path().join(".bundlefs/config.yaml"));

        restore_env("HOME", old_home);
        restore_env(CONFIG_PATH_ENV, old_explicit);
    }

    #[test]
    fn explicit_config_env_wins_over_home() {
        let _guard = ENV_LOCK.lock().expect("env lock");
        let temp = tempdir().expect("temp dir");
        let explicit = temp.path().join("custom.yaml");
        let old_explicit = std::env::var_os(CONFIG_PATH_ENV);
        std::env::set_var(CONFIG_PATH_ENV, &explicit);

        let path = default_global_config_path().expect("resolve explicit path");
        assert_eq!(path, explicit);

        restore_env(CONFIG_PATH_ENV, old_explicit);
    }

    #[test]
    fn load_global_settings_reads_bundlefs_config_yaml() {
        let _guard = ENV_LOCK.lock().expect("env lock");
        let temp = tempdir().expect("temp dir");
        let project = temp.path().join("project");
        fs::create_dir_all(&project).expect("create project");
        fs::create_dir_all(temp.path().join(".bundlefs")).expect("create config dir");
        fs::write(
            temp.path().join(".bundlefs/config.yaml"),
            format!(
                "project_root: {}\noutput_root: {}\n",
                project.display(),
                project.join("agent-outputs").display()
            ),
        )
        .expect("write global config");

        let old_home = std::env::var_os("HOME");
        let old_explicit = std::env::var_os(CONFIG_PATH_ENV);
        std::env::remove_var(CONFIG_PATH_ENV);
        std::env::set_var("HOME", temp.path());
        let settings = load_global_settings().expect("load global settings");
        assert_eq!(settings.project_root, project);

        restore_env("HOME", old_home);
        restore_env(CONFIG_PATH_ENV, old_explicit);
    }
}
