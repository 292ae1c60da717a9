use super::{default_global_config_path, ConfigError, Settings, ValidationOptions};
use std::path::Path;

pub fn load_global_settings() -> Result<Settings, ConfigError> {
    let path = default_global_config_path()?;
    load_settings_from(&path)
}

pub fn load_settings_from(path: &Path) -> Result<Settings, ConfigError> {
    let settings = Settings::from_path(path)?;
    settings.validate(ValidationOptions::default())?;
    Ok(settings)
}
